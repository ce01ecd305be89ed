//! The SHT3x command set.

use embassy_time::Duration;

/// Measurement repeatability. Higher repeatability takes longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeatability {
    #[default]
    High,
    Medium,
    Low,
}

impl Repeatability {
    /// Longest single-shot conversion time.
    pub const fn max_duration(self) -> Duration {
        match self {
            Self::High => Duration::from_micros(15_500),
            Self::Medium => Duration::from_micros(6_500),
            Self::Low => Duration::from_micros(4_500),
        }
    }
}

/// Measurements per second in periodic mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rate {
    Mps0_5,
    #[default]
    Mps1,
    Mps2,
    Mps4,
    Mps10,
}

/// A 16-bit command word, sent MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Single shot measurement without clock stretching.
    SingleShot(Repeatability),
    Periodic(Rate, Repeatability),
    FetchData,
    /// Accelerated response time: 4 measurements per second.
    Art,
    Break,
    SoftReset,
    HeaterOn,
    HeaterOff,
    ReadStatus,
    ClearStatus,
    ReadSerialNumber,
}

impl Command {
    pub const fn code(self) -> u16 {
        use Repeatability::{High, Low, Medium};
        match self {
            Self::SingleShot(High) => 0x2400,
            Self::SingleShot(Medium) => 0x240B,
            Self::SingleShot(Low) => 0x2416,
            Self::Periodic(Rate::Mps0_5, High) => 0x2032,
            Self::Periodic(Rate::Mps0_5, Medium) => 0x2024,
            Self::Periodic(Rate::Mps0_5, Low) => 0x202F,
            Self::Periodic(Rate::Mps1, High) => 0x2130,
            Self::Periodic(Rate::Mps1, Medium) => 0x2126,
            Self::Periodic(Rate::Mps1, Low) => 0x212D,
            Self::Periodic(Rate::Mps2, High) => 0x2236,
            Self::Periodic(Rate::Mps2, Medium) => 0x2220,
            Self::Periodic(Rate::Mps2, Low) => 0x222B,
            Self::Periodic(Rate::Mps4, High) => 0x2334,
            Self::Periodic(Rate::Mps4, Medium) => 0x2322,
            Self::Periodic(Rate::Mps4, Low) => 0x2329,
            Self::Periodic(Rate::Mps10, High) => 0x2737,
            Self::Periodic(Rate::Mps10, Medium) => 0x2721,
            Self::Periodic(Rate::Mps10, Low) => 0x272A,
            Self::FetchData => 0xE000,
            Self::Art => 0x2B32,
            Self::Break => 0x3093,
            Self::SoftReset => 0x30A2,
            Self::HeaterOn => 0x306D,
            Self::HeaterOff => 0x3066,
            Self::ReadStatus => 0xF32D,
            Self::ClearStatus => 0x3041,
            Self::ReadSerialNumber => 0x3780,
        }
    }
}

impl From<Command> for [u8; 2] {
    fn from(command: Command) -> Self {
        command.code().to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_big_endian() {
        let bytes: [u8; 2] = Command::SingleShot(Repeatability::Medium).into();
        assert_eq!(bytes, [0x24, 0x0B]);
        let bytes: [u8; 2] = Command::Periodic(Rate::Mps10, Repeatability::Low).into();
        assert_eq!(bytes, [0x27, 0x2A]);
    }

    #[test]
    fn high_repeatability_takes_longest() {
        assert!(Repeatability::High.max_duration() > Repeatability::Medium.max_duration());
        assert_eq!(Repeatability::Low.max_duration(), Duration::from_micros(4_500));
    }
}
