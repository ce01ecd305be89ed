//! A GPIO pin usable as input or output.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::FakeError;

#[derive(Default)]
struct PinState {
    level: bool,
    script: VecDeque<bool>,
    history: Vec<bool>,
    fail_next: bool,
}

/// Fake GPIO pin.
///
/// As an input it returns the scripted levels first, then keeps returning
/// the last level. As an output it records every level it was driven to.
#[derive(Clone, Default)]
pub struct FakePin {
    state: Rc<RefCell<PinState>>,
}

impl FakePin {
    pub fn new(level: bool) -> Self {
        let pin = Self::default();
        pin.state.borrow_mut().level = level;
        pin
    }

    pub fn low() -> Self {
        Self::new(false)
    }

    pub fn high() -> Self {
        Self::new(true)
    }

    /// Sets the current level, dropping any scripted levels.
    pub fn set_level(&self, level: bool) {
        let mut state = self.state.borrow_mut();
        state.script.clear();
        state.level = level;
    }

    /// Levels returned by the next reads, in order.
    pub fn script(&self, levels: &[bool]) {
        self.state.borrow_mut().script.extend(levels.iter().copied());
    }

    pub fn level(&self) -> bool {
        self.state.borrow().level
    }

    /// Every level the pin was driven to, oldest first.
    pub fn history(&self) -> Vec<bool> {
        self.state.borrow().history.clone()
    }

    /// Makes the next pin access fail.
    pub fn fail_next(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    fn check(&self) -> Result<(), FakeError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next {
            state.fail_next = false;
            return Err(FakeError::Bus);
        }
        Ok(())
    }

    fn sample(&self) -> Result<bool, FakeError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        if let Some(level) = state.script.pop_front() {
            state.level = level;
        }
        Ok(state.level)
    }

    fn drive(&self, level: bool) -> Result<(), FakeError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        state.level = level;
        state.history.push(level);
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for FakePin {
    type Error = FakeError;
}

impl embedded_hal::digital::InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.sample()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.sample().map(|level| !level)
    }
}

impl embedded_hal::digital::OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}
