//! Fake SPI devices and a fake SPI bus.
//!
//! [`FakeSpi`] is a whole device behind its chip select: every transaction
//! is one frame. The device is clocked byte by byte, so MISO may depend on
//! what was sent earlier in the same frame, as on real hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::spi::Operation;

use crate::FakeError;

/// Address framing of a register-file device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Bit 7 set reads, clear writes, bits 6:0 address (ST sensors).
    MsbRead,
    /// Bits 7:6 select write (`00`), read (`01`) or command (`11`), bits
    /// 5:0 address or command code (AS3933).
    ModeBits,
}

#[derive(Debug, Clone, Copy)]
enum Access {
    Idle,
    Read(u8),
    Write(u8),
    Command,
    Ignore,
}

type WriteHook = Box<dyn FnMut(&mut [u8; 256], u8, u8)>;
type CommandHook = Box<dyn FnMut(&mut [u8; 256], u8)>;

struct RegisterFile {
    framing: Framing,
    regs: [u8; 256],
    access: Access,
    commands: Vec<u8>,
    on_write: Option<WriteHook>,
    on_command: Option<CommandHook>,
}

impl RegisterFile {
    fn clock(&mut self, mosi: u8) -> u8 {
        match self.access {
            Access::Idle => {
                self.access = self.decode(mosi);
                if let Access::Command = self.access {
                    let code = mosi & 0x3F;
                    self.commands.push(code);
                    if let Some(hook) = self.on_command.as_mut() {
                        hook(&mut self.regs, code);
                    }
                }
                0
            }
            Access::Read(register) => {
                self.access = Access::Read(self.next(register));
                self.regs[usize::from(register)]
            }
            Access::Write(register) => {
                self.regs[usize::from(register)] = mosi;
                if let Some(hook) = self.on_write.as_mut() {
                    hook(&mut self.regs, register, mosi);
                }
                self.access = Access::Write(self.next(register));
                0
            }
            Access::Command | Access::Ignore => 0,
        }
    }

    fn decode(&self, first: u8) -> Access {
        match self.framing {
            Framing::MsbRead if first & 0x80 != 0 => Access::Read(first & 0x7F),
            Framing::MsbRead => Access::Write(first & 0x7F),
            Framing::ModeBits => match first >> 6 {
                0b00 => Access::Write(first & 0x3F),
                0b01 => Access::Read(first & 0x3F),
                0b11 => Access::Command,
                _ => Access::Ignore,
            },
        }
    }

    fn next(&self, register: u8) -> u8 {
        match self.framing {
            Framing::MsbRead => register.wrapping_add(1) & 0x7F,
            Framing::ModeBits => register.wrapping_add(1) & 0x3F,
        }
    }
}

enum Model {
    Registers(RegisterFile),
    Scripted {
        responses: VecDeque<Vec<u8>>,
        current: Vec<u8>,
        position: usize,
    },
}

impl Model {
    fn begin(&mut self) {
        match self {
            Self::Registers(file) => file.access = Access::Idle,
            Self::Scripted {
                responses,
                current,
                position,
            } => {
                *current = responses.pop_front().unwrap_or_default();
                *position = 0;
            }
        }
    }

    fn clock(&mut self, mosi: u8) -> u8 {
        match self {
            Self::Registers(file) => file.clock(mosi),
            Self::Scripted {
                current, position, ..
            } => {
                let miso = current.get(*position).copied().unwrap_or(0);
                *position += 1;
                miso
            }
        }
    }
}

struct DeviceState {
    model: Model,
    transactions: Vec<Vec<u8>>,
    fail_next: bool,
}

/// Fake SPI device.
#[derive(Clone)]
pub struct FakeSpi {
    state: Rc<RefCell<DeviceState>>,
}

impl FakeSpi {
    fn from_model(model: Model) -> Self {
        Self {
            state: Rc::new(RefCell::new(DeviceState {
                model,
                transactions: Vec::new(),
                fail_next: false,
            })),
        }
    }

    /// A register-file device with the given address framing.
    pub fn registers(framing: Framing) -> Self {
        Self::from_model(Model::Registers(RegisterFile {
            framing,
            regs: [0; 256],
            access: Access::Idle,
            commands: Vec::new(),
            on_write: None,
            on_command: None,
        }))
    }

    /// A device answering every transaction with the next queued MISO
    /// stream, or zeros when the queue is empty.
    pub fn scripted() -> Self {
        Self::from_model(Model::Scripted {
            responses: VecDeque::new(),
            current: Vec::new(),
            position: 0,
        })
    }

    /// Queues the MISO bytes of the next transaction.
    pub fn push_response(&self, miso: &[u8]) {
        if let Model::Scripted { responses, .. } = &mut self.state.borrow_mut().model {
            responses.push_back(miso.to_vec());
        }
    }

    /// Runs `hook(regs, register, value)` after every register write.
    pub fn on_write(&self, hook: impl FnMut(&mut [u8; 256], u8, u8) + 'static) {
        self.with_registers(|file| file.on_write = Some(Box::new(hook)));
    }

    /// Runs `hook(regs, code)` on every direct command.
    pub fn on_command(&self, hook: impl FnMut(&mut [u8; 256], u8) + 'static) {
        self.with_registers(|file| file.on_command = Some(Box::new(hook)));
    }

    pub fn set_reg(&self, register: u8, value: u8) {
        self.with_registers(|file| file.regs[usize::from(register)] = value);
    }

    pub fn set_regs(&self, start: u8, values: &[u8]) {
        self.with_registers(|file| {
            for (offset, value) in values.iter().enumerate() {
                file.regs[(usize::from(start) + offset) & 0xFF] = *value;
            }
        });
    }

    pub fn reg(&self, register: u8) -> u8 {
        let mut value = 0;
        self.with_registers(|file| value = file.regs[usize::from(register)]);
        value
    }

    /// Direct command codes received, oldest first.
    pub fn commands(&self) -> Vec<u8> {
        let mut commands = Vec::new();
        self.with_registers(|file| commands = file.commands.clone());
        commands
    }

    /// MOSI bytes of every transaction, oldest first.
    pub fn transactions(&self) -> Vec<Vec<u8>> {
        self.state.borrow().transactions.clone()
    }

    /// MOSI bytes of the most recent transaction.
    pub fn last_transaction(&self) -> Option<Vec<u8>> {
        self.state.borrow().transactions.last().cloned()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().transactions.clear();
    }

    /// Makes the next transaction fail.
    pub fn fail_next(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    fn with_registers(&self, f: impl FnOnce(&mut RegisterFile)) {
        if let Model::Registers(file) = &mut self.state.borrow_mut().model {
            f(file);
        }
    }

    fn run(&self, operations: &mut [Operation<'_, u8>]) -> Result<(), FakeError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next {
            state.fail_next = false;
            return Err(FakeError::Bus);
        }
        let model = &mut state.model;
        model.begin();

        let mut mosi_log = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = model.clock(0x00);
                        mosi_log.push(0x00);
                    }
                }
                Operation::Write(buf) => {
                    for b in buf.iter() {
                        model.clock(*b);
                        mosi_log.push(*b);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..read.len().max(write.len()) {
                        let mosi = write.get(i).copied().unwrap_or(0x00);
                        let miso = model.clock(mosi);
                        if let Some(b) = read.get_mut(i) {
                            *b = miso;
                        }
                        mosi_log.push(mosi);
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for b in buf.iter_mut() {
                        let mosi = *b;
                        *b = model.clock(mosi);
                        mosi_log.push(mosi);
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        state.transactions.push(mosi_log);
        Ok(())
    }
}

impl embedded_hal_async::spi::ErrorType for FakeSpi {
    type Error = FakeError;
}

impl embedded_hal_async::spi::SpiDevice<u8> for FakeSpi {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.run(operations)
    }
}

#[derive(Default)]
struct BusState {
    written: Vec<u8>,
    miso: VecDeque<u8>,
    flushes: usize,
    fail_next: bool,
}

/// Fake SPI bus: records MOSI and returns queued MISO bytes (or zeros).
///
/// Chip select is outside the bus, so there are no frame boundaries here.
#[derive(Clone, Default)]
pub struct FakeSpiBus {
    state: Rc<RefCell<BusState>>,
}

impl FakeSpiBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes to be clocked in.
    pub fn push_miso(&self, bytes: &[u8]) {
        self.state.borrow_mut().miso.extend(bytes.iter().copied());
    }

    /// Every MOSI byte clocked out.
    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    pub fn flushes(&self) -> usize {
        self.state.borrow().flushes
    }

    /// Makes the next bus call fail.
    pub fn fail_next(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    fn exchange(&self, mosi: u8) -> u8 {
        let mut state = self.state.borrow_mut();
        state.written.push(mosi);
        state.miso.pop_front().unwrap_or(0)
    }

    fn check(&self) -> Result<(), FakeError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next {
            state.fail_next = false;
            return Err(FakeError::Bus);
        }
        Ok(())
    }
}

impl embedded_hal_async::spi::ErrorType for FakeSpiBus {
    type Error = FakeError;
}

impl embedded_hal_async::spi::SpiBus<u8> for FakeSpiBus {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.check()?;
        words.iter_mut().for_each(|w| *w = self.exchange(0x00));
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.check()?;
        words.iter().for_each(|w| {
            self.exchange(*w);
        });
        Ok(())
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.check()?;
        for i in 0..read.len().max(write.len()) {
            let miso = self.exchange(write.get(i).copied().unwrap_or(0x00));
            if let Some(r) = read.get_mut(i) {
                *r = miso;
            }
        }
        Ok(())
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.check()?;
        words.iter_mut().for_each(|w| *w = self.exchange(*w));
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().flushes += 1;
        Ok(())
    }
}
