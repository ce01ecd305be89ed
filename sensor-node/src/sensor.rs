//! The sampling side of a node.

use core::fmt::{Debug, Display};

/// Something that produces one reading per wake-up.
///
/// Waiting for data-ready, and the bound on that wait, belong to the
/// implementation.
#[allow(async_fn_in_trait)]
pub trait Sensor {
    /// A reading, rendered as one report line.
    type Reading: Display;
    type Error: Debug;

    /// Takes one reading.
    async fn sample(&mut self) -> Result<Self::Reading, Self::Error>;
}
