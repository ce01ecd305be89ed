//! Typed command parameters and responses.

pub mod irq;
pub mod mode;
pub mod modulation;
pub mod packet;
pub mod rxtx;
pub mod status;

pub use irq::*;
pub use mode::*;
pub use modulation::*;
pub use packet::*;
pub use rxtx::*;
pub use status::*;
