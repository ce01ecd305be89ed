//! A delay that returns immediately and records how long it was asked to wait.

use std::cell::Cell;
use std::rc::Rc;

/// Fake `DelayNs` provider.
#[derive(Clone, Default)]
pub struct FakeDelay {
    total_ns: Rc<Cell<u64>>,
    calls: Rc<Cell<u32>>,
}

impl FakeDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested delays, in nanoseconds.
    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    /// Sum of all requested delays, in microseconds.
    pub fn total_us(&self) -> u64 {
        self.total_ns.get() / 1_000
    }

    /// Number of delay calls.
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    fn record(&self, ns: u64) {
        self.total_ns.set(self.total_ns.get() + ns);
        self.calls.set(self.calls.get() + 1);
    }
}

impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.record(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(u64::from(ms) * 1_000_000);
    }
}
