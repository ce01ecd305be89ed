use alloc::rc::Rc;
use embassy_sync::{blocking_mutex::raw::RawMutex, rwlock::RwLock};
use embedded_hal::i2c::{Operation, SevenBitAddress};
use embedded_hal_async::i2c::{self, I2c};

/// `RwLock`-based shared bus [`I2c`] implementation.
///
/// Several sensors usually hang off one I2C bus. Each driver gets its own
/// `SharedI2c` handle; the handles take turns on the bus, one transaction
/// at a time.
pub struct SharedI2c<M: RawMutex, BUS> {
    bus: Rc<RwLock<M, BUS>>,
}

impl<M: RawMutex, BUS> SharedI2c<M, BUS> {
    /// Create a new [`SharedI2c`] handle for the given bus.
    pub fn new(bus: Rc<RwLock<M, BUS>>) -> Self {
        Self { bus }
    }
}

impl<M: RawMutex, BUS> Clone for SharedI2c<M, BUS> {
    fn clone(&self) -> Self {
        Self {
            bus: Rc::clone(&self.bus),
        }
    }
}

impl<M: RawMutex, BUS: i2c::ErrorType> i2c::ErrorType for SharedI2c<M, BUS> {
    type Error = BUS::Error;
}

impl<M, BUS> I2c<SevenBitAddress> for SharedI2c<M, BUS>
where
    M: RawMutex,
    BUS: I2c<SevenBitAddress>,
{
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut bus = self.bus.write().await;
        let result = bus.transaction(address, operations).await;
        if let Err(err) = &result {
            log::warn!("I2C transaction with {address:#04x} failed: {err:?}");
        }
        result
    }
}
