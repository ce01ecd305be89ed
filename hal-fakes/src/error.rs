//! The single error type returned by every fake.

use embedded_hal::i2c::NoAcknowledgeSource;

/// A failure injected into a fake peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeError {
    /// The addressed I2C device did not acknowledge.
    Nack,
    /// Any other bus failure.
    Bus,
}

impl embedded_hal::i2c::Error for FakeError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Self::Nack => embedded_hal::i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Self::Bus => embedded_hal::i2c::ErrorKind::Bus,
        }
    }
}

impl embedded_hal::spi::Error for FakeError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

impl embedded_hal::digital::Error for FakeError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl embedded_io::Error for FakeError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}
