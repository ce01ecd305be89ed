//! Register addresses used by the driver.

/// Registers accessed through `WriteRegister`/`ReadRegister`.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    /// Firmware version, two bytes.
    FirmwareVersion = 0x0153,
    /// LNA gain mode. Bits 7:6 set to `11` select high sensitivity.
    RxGain = 0x0891,
    /// Spreading-factor dependent demodulator setting.
    SfAdditionalConfig = 0x0925,
    /// Frequency error compensation mode.
    FreqErrorCorrection = 0x093C,
    /// LoRa sync word, upper nibble of the register holds the MSB nibble.
    LoRaSyncWordMsb = 0x0944,
    /// LoRa sync word, upper nibble of the register holds the LSB nibble.
    LoRaSyncWordLsb = 0x0945,
}

impl From<Register> for u16 {
    fn from(val: Register) -> Self {
        val as u16
    }
}

/// Bits of [`Register::RxGain`] that select the LNA mode.
pub const RX_GAIN_MODE_MASK: u8 = 0xC0;
/// Value of [`RX_GAIN_MODE_MASK`] for high sensitivity.
pub const RX_GAIN_HIGH_SENSITIVITY: u8 = 0xC0;
/// Value written to [`Register::FreqErrorCorrection`] after the modulation is set.
pub const FREQ_ERROR_CORRECTION: u8 = 0x01;
/// The sync word nibble lives in bits 7:4 of both sync word registers.
pub const SYNC_WORD_NIBBLE_MASK: u8 = 0xF0;
