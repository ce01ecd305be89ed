//! A UART transmitter that collects everything written to it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::FakeError;

#[derive(Default)]
struct UartState {
    bytes: Vec<u8>,
    flushes: usize,
    fail_next: bool,
}

/// Fake `embedded_io_async::Write` implementation.
#[derive(Clone, Default)]
pub struct FakeUart {
    state: Rc<RefCell<UartState>>,
}

impl FakeUart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.state.borrow().bytes.clone()
    }

    /// Everything written so far, as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.state.borrow().bytes).into_owned()
    }

    pub fn flushes(&self) -> usize {
        self.state.borrow().flushes
    }

    pub fn clear(&self) {
        self.state.borrow_mut().bytes.clear();
    }

    /// Makes the next write fail.
    pub fn fail_next(&self) {
        self.state.borrow_mut().fail_next = true;
    }
}

impl embedded_io_async::ErrorType for FakeUart {
    type Error = FakeError;
}

impl embedded_io_async::Write for FakeUart {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_next {
            state.fail_next = false;
            return Err(FakeError::Bus);
        }
        state.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().flushes += 1;
        Ok(())
    }
}
