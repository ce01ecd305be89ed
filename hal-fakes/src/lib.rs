//! Fake peripherals for exercising the drivers on the host.
//!
//! Every fake is a cheap handle around shared state: clone it, hand one
//! clone to the driver under test and keep the other to script responses
//! and inspect what the driver did.

pub mod delay;
pub mod error;
pub mod i2c;
pub mod pin;
pub mod serial;
pub mod spi;

pub use delay::FakeDelay;
pub use error::FakeError;
pub use i2c::{AutoIncrement, FakeI2c, I2cEvent, Response};
pub use pin::FakePin;
pub use serial::FakeUart;
pub use spi::{FakeSpi, FakeSpiBus, Framing};
