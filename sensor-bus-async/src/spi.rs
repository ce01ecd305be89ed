//! A shared SPI bus implementation using `RwLock` for exclusive access.
//!
//! This module provides `SharedSpiDevice`, a wrapper that allows several
//! drivers to share a single `SpiBus` instance. Each `SharedSpiDevice` owns
//! its own Chip Select (CS) pin, and only one device talks on the bus at a
//! time.

use embassy_sync::{blocking_mutex::raw::RawMutex, rwlock::RwLock};

use alloc::rc::Rc;
use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error, ErrorKind};
use embedded_hal::spi::{ErrorType, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{SpiBus, SpiDevice};

/// Electrical polarity of a chip-select line.
///
/// Most parts select on a low level. Some, like the AS3933 wake-up receiver,
/// select on a high level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChipSelect {
    /// CS is asserted by driving the pin low.
    #[default]
    ActiveLow,
    /// CS is asserted by driving the pin high.
    ActiveHigh,
}

impl ChipSelect {
    fn assert<CS: OutputPin>(self, cs: &mut CS) -> Result<(), CS::Error> {
        match self {
            Self::ActiveLow => cs.set_low(),
            Self::ActiveHigh => cs.set_high(),
        }
    }

    fn deassert<CS: OutputPin>(self, cs: &mut CS) -> Result<(), CS::Error> {
        match self {
            Self::ActiveLow => cs.set_high(),
            Self::ActiveHigh => cs.set_low(),
        }
    }
}

/// A `RwLock`-based shared bus [`SpiDevice`] implementation.
///
/// This struct allows for sharing a single `SpiBus` among multiple device drivers.
/// It uses an `RwLock` to ensure exclusive access to the bus for each transaction.
/// Each `SharedSpiDevice` instance manages its own Chip Select (CS) pin.
pub struct SharedSpiDevice<M: RawMutex, BUS, CS, D> {
    bus: Rc<RwLock<M, BUS>>,
    cs: CS,
    polarity: ChipSelect,
    delay: D,
}

impl<M: RawMutex, BUS, CS: OutputPin, D> SharedSpiDevice<M, BUS, CS, D> {
    /// Creates a new `SharedSpiDevice` with an active-low chip select.
    ///
    /// # Arguments
    ///
    /// * `bus` - An `Rc<RwLock<...>>` wrapped SPI bus instance.
    /// * `cs` - The Chip Select output pin for this device.
    /// * `delay` - A delay provider that implements `DelayNs`.
    ///
    /// The CS pin is deasserted before the device is returned.
    #[inline]
    pub fn new(bus: Rc<RwLock<M, BUS>>, cs: CS, delay: D) -> Result<Self, CS::Error> {
        Self::with_polarity(bus, cs, delay, ChipSelect::ActiveLow)
    }

    /// Creates a new `SharedSpiDevice` with the given chip-select polarity.
    pub fn with_polarity(
        bus: Rc<RwLock<M, BUS>>,
        mut cs: CS,
        delay: D,
        polarity: ChipSelect,
    ) -> Result<Self, CS::Error> {
        polarity.deassert(&mut cs)?;
        Ok(Self {
            bus,
            cs,
            polarity,
            delay,
        })
    }

    /// Releases the chip-select pin and delay provider.
    pub fn release(self) -> (CS, D) {
        (self.cs, self.delay)
    }
}

impl<M, BUS, CS, D> ErrorType for SharedSpiDevice<M, BUS, CS, D>
where
    M: RawMutex,
    BUS: ErrorType,
    CS: OutputPin,
{
    type Error = DeviceError<BUS::Error, CS::Error>;
}

impl<M, BUS, CS, D> SpiDevice<u8> for SharedSpiDevice<M, BUS, CS, D>
where
    M: RawMutex,
    BUS: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    /// Performs an SPI transaction.
    ///
    /// This method acquires a write lock on the shared SPI bus, asserts the
    /// Chip Select pin, executes the provided operations, and then de-asserts
    /// the CS pin.
    #[inline]
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        let bus = &mut *self.bus.write().await;

        let result = transaction(
            operations,
            bus,
            &mut self.delay,
            &mut self.cs,
            self.polarity,
        )
        .await;

        if let Err(err) = &result {
            log::warn!("Error communicating with the SPI device: {err:?}");
        }

        result
    }
}

/// A common implementation to perform a transaction against the device.
///
/// This function handles the low-level details of an SPI transaction, including
/// asserting/de-asserting the CS pin and processing each operation.
#[inline]
pub async fn transaction<Word, BUS, D, CS>(
    operations: &mut [Operation<'_, Word>],
    bus: &mut BUS,
    delay: &mut D,
    cs: &mut CS,
    polarity: ChipSelect,
) -> Result<(), DeviceError<BUS::Error, CS::Error>>
where
    BUS: SpiBus<Word> + ErrorType,
    D: DelayNs,
    CS: OutputPin,
    Word: Copy + 'static,
{
    polarity.assert(cs).map_err(DeviceError::Cs)?;

    let mut op_res = Ok(());
    for op in operations {
        if let Err(err) = process_op::<BUS, D, Word>(bus, delay, op).await {
            op_res = Err(err);
            break;
        }
    }

    // On failure, it's important to still flush and deassert CS.
    let flush_res = bus.flush().await;
    let cs_res = polarity.deassert(cs);

    op_res.map_err(DeviceError::Spi)?;
    flush_res.map_err(DeviceError::Spi)?;
    cs_res.map_err(DeviceError::Cs)?;

    Ok(())
}

/// An error type for `SharedSpiDevice` operations.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DeviceError<BUS, CS> {
    /// An inner SPI bus operation failed.
    Spi(BUS),
    /// Asserting or deasserting the CS pin failed.
    Cs(CS),
}

impl<BUS, CS> Error for DeviceError<BUS, CS>
where
    BUS: Error + Debug,
    CS: Debug,
{
    #[inline]
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Spi(e) => e.kind(),
            Self::Cs(_) => ErrorKind::ChipSelectFault,
        }
    }
}

/// Processes a single SPI operation.
async fn process_op<BUS: SpiBus<Word> + ErrorType, D: DelayNs, Word: Copy + 'static>(
    bus: &mut BUS,
    delay: &mut D,
    op: &mut Operation<'_, Word>,
) -> Result<(), <BUS as ErrorType>::Error> {
    match op {
        Operation::Read(buf) => bus.read(buf).await,
        Operation::Write(buf) => bus.write(buf).await,
        Operation::Transfer(read, write) => bus.transfer(read, write).await,
        Operation::TransferInPlace(buf) => bus.transfer_in_place(buf).await,
        Operation::DelayNs(ns) => {
            bus.flush().await?;
            delay.delay_ns(*ns).await;
            Ok(())
        }
    }
}
