//! Receiver configuration.
//!
//! `Config::registers` turns a configuration into the values of R0..R9 and
//! R16..R19. The wake-up pattern (R5/R6) is written separately.

use sensor_bus_async::PollConfig;

use crate::register::*;

/// Enabled input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    pub ch1: bool,
    pub ch2: bool,
    pub ch3: bool,
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            ch1: true,
            ch2: true,
            ch3: true,
        }
    }
}

impl Channels {
    pub(crate) fn bits(self) -> u8 {
        let mut value = 0;
        if self.ch1 {
            value |= EN_A1;
        }
        if self.ch2 {
            value |= EN_A2;
        }
        if self.ch3 {
            value |= EN_A3;
        }
        value
    }

    fn any(self) -> bool {
        self.ch1 || self.ch2 || self.ch3
    }
}

/// One of the three input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ch1 = 0,
    Ch2 = 1,
    Ch3 = 2,
}

/// How the enabled channels listen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningMode {
    /// All enabled channels listen at the same time.
    #[default]
    Standard,
    /// The channels listen one after the other.
    Scanning,
    /// Listening is duty-cycled, see `Config::off_time`.
    OnOff,
}

/// Length of the wake-up pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternLength {
    #[default]
    Bits16,
    /// The pattern is sent twice back to back.
    Bits32,
}

/// What wakes the receiver up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeUpMode {
    /// Any carrier in the band, no pattern correlation.
    FrequencyDetection,
    /// The programmed pattern.
    SinglePattern(PatternLength),
    /// The programmed pattern or its inverse.
    DoublePattern(PatternLength),
}

impl Default for WakeUpMode {
    fn default() -> Self {
        Self::SinglePattern(PatternLength::Bits16)
    }
}

/// Carrier frequency band (BAND_SEL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Band {
    #[default]
    Khz95To150 = 0b000,
    Khz65To95 = 0b001,
    Khz40To65 = 0b010,
    Khz23To40 = 0b011,
    Khz15To23 = 0b100,
}

/// Frequency detection tolerance (S_WU1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tolerance {
    #[default]
    Relaxed = 0b00,
    Medium = 0b01,
    Tight = 0b10,
}

/// Gain reduction (GR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GainReduction {
    #[default]
    None = 0b0000,
    Db4 = 0b0100,
    Db8 = 0b0110,
    Db12 = 0b1000,
    Db16 = 0b1010,
    Db20 = 0b1100,
    Db24 = 0b1110,
}

/// Antenna damper shunt resistor (D_RES).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamperResistor {
    KOhm1 = 0b00,
    KOhm3 = 0b01,
    KOhm9 = 0b10,
    KOhm27 = 0b11,
}

/// Off time in ON/OFF mode (T_OFF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffTime {
    #[default]
    Ms1 = 0b00,
    Ms2 = 0b01,
    Ms4 = 0b10,
    Ms8 = 0b11,
}

/// Clock generator reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Internal RC oscillator; calibrated during `init`.
    #[default]
    RcOscillator,
    /// 32.768 kHz crystal.
    Crystal,
    /// External clock on the XIN pin.
    External,
}

/// Automatic gain control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Agc {
    /// AGC acts only on the first carrier burst.
    pub time_limited: bool,
    /// AGC may also increase the gain.
    pub up_and_down: bool,
    /// Freeze the AGC after the preamble.
    pub block: bool,
    /// +3 dB gain boost.
    pub gain_boost: bool,
}

/// Data slicer and envelope detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slicer {
    /// Absolute threshold instead of a threshold relative to the average.
    pub absolute_reference: bool,
    /// Lower absolute threshold.
    pub threshold_reduction: bool,
    /// 20 mV hysteresis instead of 40 mV.
    pub hysteresis_20mv: bool,
    /// Hysteresis on positive edges only.
    pub hysteresis_positive_only: bool,
    /// FS_SLC, 0..=7.
    pub slicer_time_constant: u8,
    /// FS_ENV, 0..=7.
    pub envelope_time_constant: u8,
}

/// Receiver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub channels: Channels,
    pub listening: ListeningMode,
    pub off_time: OffTime,
    pub wake_up: WakeUpMode,
    /// Manchester-decode the data after wake-up.
    pub manchester: bool,
    /// Mask DAT while no wake-up happened.
    pub mask_data: bool,
    pub pattern: u16,
    pub band: Band,
    /// Duration of one pattern bit in RC oscillator periods minus one
    /// (T_HBIT), 3..=31.
    pub bit_duration: u8,
    pub tolerance: Tolerance,
    pub gain_reduction: GainReduction,
    pub agc: Agc,
    /// `None` disables the antenna damper.
    pub damper: Option<DamperResistor>,
    pub slicer: Slicer,
    /// Automatic return to listening mode, in 50 ms steps (T_OUT), 0..=7.
    pub data_timeout: u8,
    /// Automatic false wake-up counter reset period (T_AUTO), 0..=7.
    pub false_wakeup_clear: u8,
    pub clock: ClockSource,
    /// Output the clock generator on DAT (DISPLAY_CLK).
    pub display_clock: bool,
    /// Tuning capacitance per channel, 0..=31 pF.
    pub tuning: [u8; 3],
    /// Bound of the RC oscillator calibration.
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channels: Channels::default(),
            listening: ListeningMode::default(),
            off_time: OffTime::default(),
            wake_up: WakeUpMode::default(),
            manchester: false,
            mask_data: false,
            pattern: 0x6996,
            band: Band::default(),
            bit_duration: 0x0B,
            tolerance: Tolerance::default(),
            gain_reduction: GainReduction::default(),
            agc: Agc::default(),
            damper: None,
            slicer: Slicer::default(),
            data_timeout: 1,
            false_wakeup_clear: 0,
            clock: ClockSource::default(),
            display_clock: false,
            tuning: [0; 3],
            poll: PollConfig::default(),
        }
    }
}

/// Register values derived from a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Registers {
    /// R0..R4.
    pub front: [u8; 5],
    /// R7..R9.
    pub timing: [u8; 3],
    pub r16: u8,
    /// R17..R19.
    pub tuning: [u8; 3],
}

impl Config {
    pub fn set_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    pub fn set_listening(mut self, listening: ListeningMode) -> Self {
        self.listening = listening;
        self
    }

    pub fn set_off_time(mut self, off_time: OffTime) -> Self {
        self.off_time = off_time;
        self
    }

    pub fn set_wake_up(mut self, wake_up: WakeUpMode) -> Self {
        self.wake_up = wake_up;
        self
    }

    pub fn set_manchester(mut self, enabled: bool) -> Self {
        self.manchester = enabled;
        self
    }

    pub fn set_pattern(mut self, pattern: u16) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn set_band(mut self, band: Band) -> Self {
        self.band = band;
        self
    }

    pub fn set_bit_duration(mut self, periods: u8) -> Self {
        self.bit_duration = periods;
        self
    }

    pub fn set_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn set_gain_reduction(mut self, gain_reduction: GainReduction) -> Self {
        self.gain_reduction = gain_reduction;
        self
    }

    pub fn set_agc(mut self, agc: Agc) -> Self {
        self.agc = agc;
        self
    }

    pub fn set_damper(mut self, damper: Option<DamperResistor>) -> Self {
        self.damper = damper;
        self
    }

    pub fn set_slicer(mut self, slicer: Slicer) -> Self {
        self.slicer = slicer;
        self
    }

    pub fn set_timeouts(mut self, data_timeout: u8, false_wakeup_clear: u8) -> Self {
        self.data_timeout = data_timeout;
        self.false_wakeup_clear = false_wakeup_clear;
        self
    }

    pub fn set_clock(mut self, clock: ClockSource) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_display_clock(mut self, enabled: bool) -> Self {
        self.display_clock = enabled;
        self
    }

    pub fn set_tuning(mut self, tuning: [u8; 3]) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn set_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Checks every field against its register width.
    pub fn is_valid(&self) -> bool {
        self.channels.any()
            && (3..=MAX_5BIT).contains(&self.bit_duration)
            && self.slicer.slicer_time_constant <= MAX_3BIT
            && self.slicer.envelope_time_constant <= MAX_3BIT
            && self.data_timeout <= MAX_3BIT
            && self.false_wakeup_clear <= MAX_3BIT
            && self.tuning.iter().all(|pf| *pf <= MAX_5BIT)
    }

    pub(crate) fn registers(&self) -> Registers {
        let mut r0 = self.channels.bits();
        match self.listening {
            ListeningMode::Standard => {}
            ListeningMode::Scanning => r0 |= MUX_123,
            ListeningMode::OnOff => r0 |= ON_OFF,
        }
        if self.mask_data {
            r0 |= DAT_MASK;
        }

        let mut r1 = 0;
        match self.wake_up {
            WakeUpMode::FrequencyDetection => {}
            WakeUpMode::SinglePattern(length) => {
                r1 |= EN_WPAT;
                r0 |= pattern_bits(length);
            }
            WakeUpMode::DoublePattern(length) => {
                r1 |= EN_WPAT | EN_PAT2;
                r0 |= pattern_bits(length);
            }
        }
        if self.manchester {
            r1 |= EN_MANCH;
        }
        if self.damper.is_some() {
            r1 |= ATT_ON;
        }
        if self.agc.up_and_down {
            r1 |= AGC_UD;
        }
        if self.agc.time_limited {
            r1 |= AGC_TLIM;
        }
        if self.slicer.absolute_reference {
            r1 |= ABS_HY;
        }
        if self.clock == ClockSource::Crystal {
            r1 |= EN_XTAL;
        }

        let mut r2 = self.tolerance as u8;
        if self.agc.gain_boost {
            r2 |= G_BOOST;
        }
        if self.clock == ClockSource::External {
            r2 |= EN_EXT_CLK;
        }
        if self.slicer.threshold_reduction {
            r2 |= S_ABSH;
        }
        if self.display_clock {
            r2 |= DISPLAY_CLK_MASK;
        }

        let mut r3 = (self.slicer.slicer_time_constant << FS_SLC_SHIFT)
            | self.slicer.envelope_time_constant;
        if self.slicer.hysteresis_20mv {
            r3 |= HY_20M;
        }
        if self.slicer.hysteresis_positive_only {
            r3 |= HY_POS;
        }

        let damper = self.damper.map_or(0, |d| d as u8);
        let r4 = ((self.off_time as u8) << T_OFF_SHIFT)
            | (damper << D_RES_SHIFT)
            | self.gain_reduction as u8;

        let r7 = (self.data_timeout << T_OUT_SHIFT) | (self.bit_duration & T_HBIT_MASK);
        let r8 = ((self.band as u8) << BAND_SEL_SHIFT) | self.false_wakeup_clear;
        let r9 = if self.agc.block { BLOCK_AGC } else { 0 };

        Registers {
            front: [r0, r1, r2, r3, r4],
            timing: [r7, r8, r9],
            r16: 0,
            tuning: self.tuning,
        }
    }
}

fn pattern_bits(length: PatternLength) -> u8 {
    match length {
        PatternLength::Bits16 => 0,
        PatternLength::Bits32 => PAT32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_registers() {
        let regs = Config::default().registers();
        assert_eq!(regs.front, [0x0E, 0x02, 0x00, 0x00, 0x00]);
        assert_eq!(regs.timing, [0x2B, 0x00, 0x00]);
    }

    #[test]
    fn scanning_double_pattern_crystal() {
        let regs = Config::default()
            .set_listening(ListeningMode::Scanning)
            .set_wake_up(WakeUpMode::DoublePattern(PatternLength::Bits32))
            .set_manchester(true)
            .set_clock(ClockSource::Crystal)
            .set_damper(Some(DamperResistor::KOhm27))
            .set_gain_reduction(GainReduction::Db12)
            .set_band(Band::Khz15To23)
            .registers();
        assert_eq!(regs.front[0], 0x9E);
        assert_eq!(regs.front[1], 0x1F);
        assert_eq!(regs.front[4], 0x38);
        assert_eq!(regs.timing[1], 0x80);
    }

    #[test]
    fn clock_output_on_dat() {
        let regs = Config::default()
            .set_display_clock(true)
            .set_tolerance(Tolerance::Tight)
            .registers();
        assert_eq!(regs.front[2], 0x0E);
    }

    #[test]
    fn out_of_range_fields_are_invalid() {
        assert!(Config::default().is_valid());
        assert!(!Config::default().set_bit_duration(2).is_valid());
        assert!(!Config::default().set_tuning([0, 32, 0]).is_valid());
        assert!(!Config::default().set_timeouts(8, 0).is_valid());
        let none = Channels {
            ch1: false,
            ch2: false,
            ch3: false,
        };
        assert!(!Config::default().set_channels(none).is_valid());
    }
}
