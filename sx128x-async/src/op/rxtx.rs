//! Transmit (TX) and Receive (RX) operation parameters.

/// Crystal frequency of the SX128x.
pub const XTAL_FREQ_HZ: u64 = 52_000_000;

/// Converts an RF frequency in Hz into the 24-bit `SetRfFrequency` word,
/// `freq * 2^18 / 52 MHz`.
pub const fn rf_frequency_word(frequency_hz: u32) -> u32 {
    (((frequency_hz as u64) << 18) / XTAL_FREQ_HZ) as u32 & 0x00FF_FFFF
}

/// Time step of an [`RxTxTimeout`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeriodBase {
    /// 15.625 µs
    Us15_625 = 0x00,
    /// 62.5 µs
    Us62_5 = 0x01,
    /// 1 ms
    Ms1 = 0x02,
    /// 4 ms
    Ms4 = 0x03,
}

/// A timeout value for RX and TX operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RxTxTimeout {
    period_base: PeriodBase,
    count: u16,
}

impl From<RxTxTimeout> for [u8; 3] {
    fn from(val: RxTxTimeout) -> Self {
        let count = val.count.to_be_bytes();
        [val.period_base as u8, count[0], count[1]]
    }
}

impl RxTxTimeout {
    pub const fn new(period_base: PeriodBase, count: u16) -> Self {
        Self { period_base, count }
    }

    /// A timeout in milliseconds, saturating below the continuous value.
    pub const fn from_ms(ms: u16) -> Self {
        let count = if ms == u16::MAX { u16::MAX - 1 } else { ms };
        Self::new(PeriodBase::Ms1, count)
    }

    /// No timeout: TX until done, RX until a packet arrives.
    pub const fn single() -> Self {
        Self::new(PeriodBase::Ms1, 0x0000)
    }

    /// RX stays on after each packet.
    pub const fn continuous_rx() -> Self {
        Self::new(PeriodBase::Ms1, 0xFFFF)
    }

    /// Returns `true` for a continuous receive timeout.
    pub const fn is_continuous(self) -> bool {
        self.count == 0xFFFF
    }
}

/// Power amplifier ramp time.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RampTime {
    Ramp02u = 0x00,
    Ramp04u = 0x20,
    Ramp06u = 0x40,
    Ramp08u = 0x60,
    #[default]
    Ramp10u = 0x80,
    Ramp12u = 0xA0,
    Ramp16u = 0xC0,
    Ramp20u = 0xE0,
}

/// Lowest output power in dBm.
pub const MIN_POWER_DBM: i8 = -18;
/// Highest output power in dBm.
pub const MAX_POWER_DBM: i8 = 13;

/// A builder for transmit (TX) parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TxParams {
    power_dbm: i8,
    ramp_time: RampTime,
}

impl Default for TxParams {
    fn default() -> Self {
        Self {
            power_dbm: 0,
            ramp_time: RampTime::default(),
        }
    }
}

impl From<TxParams> for [u8; 2] {
    fn from(val: TxParams) -> Self {
        [(val.power_dbm - MIN_POWER_DBM) as u8, val.ramp_time as u8]
    }
}

impl TxParams {
    /// Sets the output power in dBm, clamped to -18..=13 dBm.
    pub fn set_power_dbm(mut self, power_dbm: i8) -> Self {
        self.power_dbm = power_dbm.clamp(MIN_POWER_DBM, MAX_POWER_DBM);
        self
    }

    /// Sets the power amplifier ramp time.
    pub fn set_ramp_time(mut self, ramp_time: RampTime) -> Self {
        self.ramp_time = ramp_time;
        self
    }

    pub fn power_dbm(&self) -> i8 {
        self.power_dbm
    }
}
