//! Interrupt-to-main-loop wake-up signalling.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// What woke the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The periodic wake-up timer expired.
    Timer,
    /// An external line (data-ready, wake-up receiver) fired.
    External,
}

/// A single-slot wake-up signal between one interrupt handler and the main
/// loop.
///
/// Only the latest reason is kept. Wake-ups raised while an earlier one was
/// still pending are counted as missed.
pub struct WakeSignal {
    signal: Signal<CriticalSectionRawMutex, WakeReason>,
    missed: Mutex<Cell<u32>>,
}

impl WakeSignal {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
            missed: Mutex::new(Cell::new(0)),
        }
    }

    /// Wakes the main loop. Safe to call from an interrupt handler.
    pub fn wake(&self, reason: WakeReason) {
        critical_section::with(|cs| {
            if self.signal.signaled() {
                let missed = self.missed.borrow(cs);
                missed.set(missed.get().wrapping_add(1));
            }
            self.signal.signal(reason);
        });
    }

    /// Waits for the next wake-up.
    pub async fn sleep(&self) -> WakeReason {
        self.signal.wait().await
    }

    /// Returns `true` if a wake-up is pending.
    pub fn pending(&self) -> bool {
        self.signal.signaled()
    }

    /// Number of wake-ups overwritten before the main loop got to them.
    pub fn missed(&self) -> u32 {
        critical_section::with(|cs| self.missed.borrow(cs).get())
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}
