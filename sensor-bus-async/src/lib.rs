#![no_std]
#![doc = "Shared bus devices, register access and bounded polling for async embedded-hal drivers."]

// Note: The shared bus devices were written to navigate dependency version
// conflicts and API churn in the async embedded ecosystem.
//
// For the official Embassy implementation, see:
// - https://github.com/embassy-rs/embassy/tree/main/embassy-embedded-hal/src/shared_bus

extern crate alloc;

pub mod i2c;
pub mod poll;
pub mod regs;
pub mod spi;

pub use poll::{PollConfig, Poller, Timeout};
pub use regs::{AddressScheme, I2cRegisters, ModeBits, MsbReadFlag, SpiRegisters};
