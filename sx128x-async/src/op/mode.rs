//! Operating mode parameters: standby, sleep, regulator and CAD.

/// Standby mode configuration.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum StandbyConfig {
    /// Standby on the 13 MHz RC oscillator.
    #[default]
    StbyRc = 0x00,
    /// Standby on the 52 MHz crystal oscillator.
    StbyXosc = 0x01,
}

/// Power regulator used by the chip.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RegulatorMode {
    /// Linear regulator, works on every board.
    #[default]
    Ldo = 0x00,
    /// DC-DC converter, needs the external inductor.
    DcDc = 0x01,
}

/// What is kept while sleeping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct SleepConfig {
    /// Keep the instruction RAM (and so the configuration).
    pub retain_ram: bool,
    /// Keep the 256-byte data buffer.
    pub retain_buffer: bool,
}

impl From<SleepConfig> for u8 {
    fn from(val: SleepConfig) -> Self {
        u8::from(val.retain_ram) | (u8::from(val.retain_buffer) << 1)
    }
}

/// Number of symbols a channel activity detection listens for.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CadSymbols {
    On1 = 0x00,
    On2 = 0x20,
    #[default]
    On4 = 0x40,
    On8 = 0x60,
    On16 = 0x80,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_config_bits() {
        assert_eq!(u8::from(SleepConfig::default()), 0x00);
        let keep_all = SleepConfig {
            retain_ram: true,
            retain_buffer: true,
        };
        assert_eq!(u8::from(keep_all), 0x03);
        let keep_buffer = SleepConfig {
            retain_buffer: true,
            ..Default::default()
        };
        assert_eq!(u8::from(keep_buffer), 0x02);
    }
}
