//! Register access over I2C and SPI.
//!
//! Every driver in this workspace talks to a register map: write a register
//! address, then read or write one or more register values. The address
//! framing differs per bus and per vendor, the rest is identical.

use core::marker::PhantomData;

use embedded_hal_async::i2c::{I2c, Operation as I2cOperation, SevenBitAddress};
use embedded_hal_async::spi::{Operation as SpiOperation, SpiDevice};

/// Register access on an I2C device.
pub struct I2cRegisters<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
    auto_increment: u8,
}

impl<I2C> I2cRegisters<I2C> {
    /// Creates register access for the device at `address`.
    pub const fn new(i2c: I2C, address: SevenBitAddress) -> Self {
        Self {
            i2c,
            address,
            auto_increment: 0,
        }
    }

    /// Sets the flag OR-ed into the sub-address of multi-byte transfers.
    ///
    /// ST sensors such as the HTS221 only advance their register pointer
    /// when the MSB of the sub-address is set.
    pub const fn with_auto_increment(mut self, flag: u8) -> Self {
        self.auto_increment = flag;
        self
    }

    /// The 7-bit device address.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Direct access to the underlying bus, for command-style transfers.
    pub fn bus(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the register access and returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn sub_address(&self, register: u8, len: usize) -> u8 {
        if len > 1 {
            register | self.auto_increment
        } else {
            register
        }
    }
}

impl<I2C: I2c<SevenBitAddress>> I2cRegisters<I2C> {
    /// Reads `buf.len()` consecutive registers starting at `register`.
    pub async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), I2C::Error> {
        let sub_address = self.sub_address(register, buf.len());
        self.i2c.write_read(self.address, &[sub_address], buf).await
    }

    /// Reads a single register.
    pub async fn read_u8(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.read(register, &mut buf).await?;
        Ok(buf[0])
    }

    /// Reads a little-endian 16-bit value from two consecutive registers.
    pub async fn read_u16_le(&mut self, register: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.read(register, &mut buf).await?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Writes consecutive registers starting at `register`.
    ///
    /// The sub-address and data go out in a single transaction.
    pub async fn write(&mut self, register: u8, data: &[u8]) -> Result<(), I2C::Error> {
        let sub_address = [self.sub_address(register, data.len())];
        let mut ops = [I2cOperation::Write(&sub_address), I2cOperation::Write(data)];
        self.i2c.transaction(self.address, &mut ops).await
    }

    /// Writes a single register.
    pub async fn write_u8(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value]).await
    }

    /// Read-modify-write of a single register. Returns the written value.
    pub async fn modify<F>(&mut self, register: u8, f: F) -> Result<u8, I2C::Error>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = f(self.read_u8(register).await?);
        self.write_u8(register, value).await?;
        Ok(value)
    }

    /// Replaces the bits selected by `mask` with `value`.
    pub async fn update_bits(&mut self, register: u8, mask: u8, value: u8) -> Result<(), I2C::Error> {
        self.modify(register, |old| (old & !mask) | (value & mask))
            .await
            .map(|_| ())
    }
}

/// Maps a register address to the first byte of an SPI frame.
pub trait AddressScheme {
    /// Address byte that starts a register read.
    fn read_address(register: u8) -> u8;
    /// Address byte that starts a register write.
    fn write_address(register: u8) -> u8;
}

/// The MSB of the address byte selects a read (ST sensors, e.g. LIS3DHH).
pub struct MsbReadFlag;

impl AddressScheme for MsbReadFlag {
    fn read_address(register: u8) -> u8 {
        0x80 | register
    }

    fn write_address(register: u8) -> u8 {
        register & 0x7F
    }
}

/// The two MSBs of the address byte select the access mode (AS3933):
/// `00` write, `01` read, `11` direct command. The register address takes
/// the remaining six bits.
pub struct ModeBits;

impl ModeBits {
    const ADDRESS_MASK: u8 = 0x3F;
    const READ: u8 = 0b01 << 6;
    const COMMAND: u8 = 0b11 << 6;

    /// Frame byte of a direct command.
    pub const fn command(code: u8) -> u8 {
        Self::COMMAND | (code & Self::ADDRESS_MASK)
    }
}

impl AddressScheme for ModeBits {
    fn read_address(register: u8) -> u8 {
        Self::READ | (register & Self::ADDRESS_MASK)
    }

    fn write_address(register: u8) -> u8 {
        register & Self::ADDRESS_MASK
    }
}

/// Register access on an SPI device.
pub struct SpiRegisters<SPI, A> {
    spi: SPI,
    _scheme: PhantomData<A>,
}

impl<SPI, A: AddressScheme> SpiRegisters<SPI, A> {
    /// Creates register access on top of an SPI device.
    pub const fn new(spi: SPI) -> Self {
        Self {
            spi,
            _scheme: PhantomData,
        }
    }

    /// Direct access to the underlying device, for command frames.
    pub fn bus(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the register access and returns the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice, A: AddressScheme> SpiRegisters<SPI, A> {
    /// Reads `buf.len()` consecutive registers starting at `register`.
    pub async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), SPI::Error> {
        let address = [A::read_address(register)];
        let mut ops = [SpiOperation::Write(&address), SpiOperation::Read(buf)];
        self.spi.transaction(&mut ops).await
    }

    /// Reads a single register.
    pub async fn read_u8(&mut self, register: u8) -> Result<u8, SPI::Error> {
        let mut buf = [0u8; 1];
        self.read(register, &mut buf).await?;
        Ok(buf[0])
    }

    /// Writes consecutive registers starting at `register`.
    pub async fn write(&mut self, register: u8, data: &[u8]) -> Result<(), SPI::Error> {
        let address = [A::write_address(register)];
        let mut ops = [SpiOperation::Write(&address), SpiOperation::Write(data)];
        self.spi.transaction(&mut ops).await
    }

    /// Writes a single register.
    pub async fn write_u8(&mut self, register: u8, value: u8) -> Result<(), SPI::Error> {
        self.spi.write(&[A::write_address(register), value]).await
    }

    /// Read-modify-write of a single register. Returns the written value.
    pub async fn modify<F>(&mut self, register: u8, f: F) -> Result<u8, SPI::Error>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = f(self.read_u8(register).await?);
        self.write_u8(register, value).await?;
        Ok(value)
    }

    /// Replaces the bits selected by `mask` with `value`.
    pub async fn update_bits(&mut self, register: u8, mask: u8, value: u8) -> Result<(), SPI::Error> {
        self.modify(register, |old| (old & !mask) | (value & mask))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_read_flag_framing() {
        assert_eq!(MsbReadFlag::read_address(0x0F), 0x8F);
        assert_eq!(MsbReadFlag::write_address(0x20), 0x20);
        assert_eq!(MsbReadFlag::write_address(0xA0), 0x20);
    }

    #[test]
    fn mode_bits_framing() {
        assert_eq!(ModeBits::read_address(0x0A), 0x4A);
        assert_eq!(ModeBits::write_address(0x13), 0x13);
        assert_eq!(ModeBits::write_address(0x7F), 0x3F);
        assert_eq!(ModeBits::command(0x04), 0xC4);
    }
}
