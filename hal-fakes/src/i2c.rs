//! A fake I2C bus with any number of devices on it.
//!
//! Register devices model the usual sub-address protocol: the first byte
//! of a write frame sets the register pointer, further bytes are stored,
//! reads return bytes from the pointer on. Command devices record what was
//! written and answer reads from a queue.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use embedded_hal::i2c::{Operation, SevenBitAddress};

use crate::FakeError;

/// How a register device advances its pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrement {
    /// After every byte.
    Always,
    /// Only when the sub-address had this flag set. The flag is not part
    /// of the register address.
    WithFlag(u8),
    /// Never.
    Never,
}

/// One answer of a command device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Bytes returned by the next read.
    Data(Vec<u8>),
    /// The next read is not acknowledged.
    Nack,
}

/// Something that happened on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2cEvent {
    Write { address: u8, bytes: Vec<u8> },
    Read { address: u8, len: usize },
}

type WriteHook = Box<dyn FnMut(&mut [u8; 256], u8, u8)>;
type ReadHook = Box<dyn FnMut(&mut [u8; 256], u8)>;

struct RegisterModel {
    regs: [u8; 256],
    pointer: u8,
    increment: bool,
    auto_increment: AutoIncrement,
    on_write: Option<WriteHook>,
    on_read: Option<ReadHook>,
}

impl RegisterModel {
    fn start_frame(&mut self, sub_address: u8) {
        match self.auto_increment {
            AutoIncrement::Always => {
                self.pointer = sub_address;
                self.increment = true;
            }
            AutoIncrement::WithFlag(flag) => {
                self.pointer = sub_address & !flag;
                self.increment = sub_address & flag != 0;
            }
            AutoIncrement::Never => {
                self.pointer = sub_address;
                self.increment = false;
            }
        }
    }

    fn store(&mut self, value: u8) {
        let register = self.pointer;
        self.regs[usize::from(register)] = value;
        if let Some(hook) = self.on_write.as_mut() {
            hook(&mut self.regs, register, value);
        }
        self.advance();
    }

    fn load(&mut self) -> u8 {
        let register = self.pointer;
        let value = self.regs[usize::from(register)];
        if let Some(hook) = self.on_read.as_mut() {
            hook(&mut self.regs, register);
        }
        self.advance();
        value
    }

    fn advance(&mut self) {
        if self.increment {
            self.pointer = self.pointer.wrapping_add(1);
        }
    }
}

enum Model {
    Registers(RegisterModel),
    Commands(VecDeque<Response>),
}

#[derive(Default)]
struct BusState {
    devices: BTreeMap<u8, Model>,
    log: Vec<I2cEvent>,
    fail_next: Option<FakeError>,
}

/// Fake I2C bus.
#[derive(Clone, Default)]
pub struct FakeI2c {
    state: Rc<RefCell<BusState>>,
}

impl FakeI2c {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a register device at `address`.
    pub fn with_register_device(self, address: u8, auto_increment: AutoIncrement) -> Self {
        self.state.borrow_mut().devices.insert(
            address,
            Model::Registers(RegisterModel {
                regs: [0; 256],
                pointer: 0,
                increment: false,
                auto_increment,
                on_write: None,
                on_read: None,
            }),
        );
        self
    }

    /// Adds a command device at `address`.
    pub fn with_command_device(self, address: u8) -> Self {
        self.state
            .borrow_mut()
            .devices
            .insert(address, Model::Commands(VecDeque::new()));
        self
    }

    /// Runs `hook(regs, register, value)` after every register write.
    pub fn on_write(&self, address: u8, hook: impl FnMut(&mut [u8; 256], u8, u8) + 'static) {
        self.with_registers(address, |model| model.on_write = Some(Box::new(hook)));
    }

    /// Runs `hook(regs, register)` after every register byte read.
    pub fn on_read(&self, address: u8, hook: impl FnMut(&mut [u8; 256], u8) + 'static) {
        self.with_registers(address, |model| model.on_read = Some(Box::new(hook)));
    }

    pub fn set_reg(&self, address: u8, register: u8, value: u8) {
        self.with_registers(address, |model| model.regs[usize::from(register)] = value);
    }

    pub fn set_regs(&self, address: u8, start: u8, values: &[u8]) {
        self.with_registers(address, |model| {
            for (offset, value) in values.iter().enumerate() {
                model.regs[(usize::from(start) + offset) & 0xFF] = *value;
            }
        });
    }

    pub fn reg(&self, address: u8, register: u8) -> u8 {
        let mut value = 0;
        self.with_registers(address, |model| value = model.regs[usize::from(register)]);
        value
    }

    /// Queues the answer to the next read from a command device.
    pub fn push_response(&self, address: u8, response: Response) {
        if let Some(Model::Commands(queue)) = self.state.borrow_mut().devices.get_mut(&address) {
            queue.push_back(response);
        }
    }

    /// Makes the next transaction fail with `error`.
    pub fn fail_next(&self, error: FakeError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    /// Everything that happened on the bus, oldest first.
    pub fn log(&self) -> Vec<I2cEvent> {
        self.state.borrow().log.clone()
    }

    /// The write frames sent to `address`.
    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .log
            .iter()
            .filter_map(|event| match event {
                I2cEvent::Write { address: a, bytes } if *a == address => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    fn with_registers(&self, address: u8, f: impl FnOnce(&mut RegisterModel)) {
        if let Some(Model::Registers(model)) = self.state.borrow_mut().devices.get_mut(&address) {
            f(model);
        }
    }

    fn run(&self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), FakeError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        let model = state.devices.get_mut(&address).ok_or(FakeError::Nack)?;

        let mut frame: Option<Vec<u8>> = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    let frame = frame.get_or_insert_with(Vec::new);
                    for byte in bytes.iter() {
                        if let Model::Registers(regs) = model {
                            if frame.is_empty() {
                                regs.start_frame(*byte);
                            } else {
                                regs.store(*byte);
                            }
                        }
                        frame.push(*byte);
                    }
                }
                Operation::Read(buf) => {
                    if let Some(bytes) = frame.take() {
                        state.log.push(I2cEvent::Write { address, bytes });
                    }
                    state.log.push(I2cEvent::Read {
                        address,
                        len: buf.len(),
                    });
                    match model {
                        Model::Registers(regs) => buf.iter_mut().for_each(|b| *b = regs.load()),
                        Model::Commands(queue) => match queue.pop_front() {
                            Some(Response::Data(data)) => {
                                for (i, b) in buf.iter_mut().enumerate() {
                                    *b = data.get(i).copied().unwrap_or(0xFF);
                                }
                            }
                            Some(Response::Nack) | None => return Err(FakeError::Nack),
                        },
                    }
                }
            }
        }
        if let Some(bytes) = frame.take() {
            state.log.push(I2cEvent::Write { address, bytes });
        }
        Ok(())
    }
}

impl embedded_hal_async::i2c::ErrorType for FakeI2c {
    type Error = FakeError;
}

impl embedded_hal_async::i2c::I2c<SevenBitAddress> for FakeI2c {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(address, operations)
    }
}
