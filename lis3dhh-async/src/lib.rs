//! An asynchronous, `no_std` driver for the ST LIS3DHH 3-axis
//! high-accuracy accelerometer.
//!
//! The LIS3DHH talks SPI only. Bit 7 of the first byte selects a read;
//! multi-byte transfers advance the register address when `IF_ADD_INC` is
//! set, which `init` always does.
//!
//! # Usage
//!
//! ```ignore
//! let spi = SharedSpiDevice::new(bus, cs, Delay)?;
//! let mut accel = Lis3dhh::new(spi, Delay, Config::default());
//! accel.init().await?;
//! let a = accel.acceleration().await?;
//! ```

#![no_std]

pub mod config;
pub mod register;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;
use log::{debug, trace, warn};
use sensor_bus_async::{MsbReadFlag, SpiRegisters};

pub use config::{
    Bandwidth, Config, FifoConfig, FifoMode, FilterType, InterruptRouting, SelfTest,
};
use register::*;

/// Sensitivity in mg per LSB.
pub const SENSITIVITY_MG: f32 = 0.076;

/// FIFO depth in samples.
pub const FIFO_DEPTH: usize = 32;

/// Errors returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// SPI bus error.
    Bus(E),
    /// WHO_AM_I returned an unexpected value.
    InvalidDevice(u8),
    /// A status bit did not change in time.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// Decoded STATUS register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// A new X, Y, Z sample is available.
    pub data_available: bool,
    /// A sample was overwritten before it was read.
    pub overrun: bool,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self {
            data_available: value & ZYXDA != 0,
            overrun: value & ZYXOR != 0,
        }
    }
}

/// Decoded FIFO_SRC register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoStatus {
    pub threshold_reached: bool,
    pub overrun: bool,
    /// Samples stored, 0..=32.
    pub samples: u8,
}

impl From<u8> for FifoStatus {
    fn from(value: u8) -> Self {
        Self {
            threshold_reached: value & FIFO_SRC_FTH != 0,
            overrun: value & FIFO_SRC_OVRN != 0,
            samples: value & FSS_MASK,
        }
    }
}

/// Raw output registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawAcceleration {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawAcceleration {
    fn from_le_bytes(buf: &[u8; 6]) -> Self {
        Self {
            x: i16::from_le_bytes([buf[0], buf[1]]),
            y: i16::from_le_bytes([buf[2], buf[3]]),
            z: i16::from_le_bytes([buf[4], buf[5]]),
        }
    }
}

/// Acceleration in g.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<RawAcceleration> for Acceleration {
    fn from(raw: RawAcceleration) -> Self {
        let g = |v: i16| f32::from(v) * SENSITIVITY_MG / 1000.0;
        Self {
            x: g(raw.x),
            y: g(raw.y),
            z: g(raw.z),
        }
    }
}

/// Converts OUT_TEMP to °C: 12 bits, left-aligned, 16 LSB/°C, 0 at 25 °C.
pub fn temperature_from_raw(raw: i16) -> f32 {
    25.0 + f32::from(raw >> 4) / 16.0
}

/// LIS3DHH driver.
pub struct Lis3dhh<SPI, D> {
    regs: SpiRegisters<SPI, MsbReadFlag>,
    delay: D,
    config: Config,
}

impl<SPI, D> Lis3dhh<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    pub fn new(spi: SPI, delay: D, config: Config) -> Self {
        Self {
            regs: SpiRegisters::new(spi),
            delay,
            config,
        }
    }

    /// Checks WHO_AM_I and applies the configuration. The sensor is left
    /// in normal mode.
    pub async fn init(&mut self) -> Result<(), Error<SPI::Error>> {
        let id = self.device_id().await?;
        if id != DEVICE_ID {
            warn!("LIS3DHH: unexpected WHO_AM_I {id:#04x}");
            return Err(Error::InvalidDevice(id));
        }

        let config = self.config;
        self.regs.write_u8(CTRL_REG1, config.ctrl_reg1()).await?;
        self.regs.write_u8(INT1_CTRL, config.int1.into()).await?;
        self.regs.write_u8(INT2_CTRL, config.int2.into()).await?;
        self.regs.write_u8(CTRL_REG4, config.ctrl_reg4()).await?;
        self.regs.write_u8(CTRL_REG5, config.ctrl_reg5()).await?;
        let fifo_ctrl = config.fifo.map(u8::from).unwrap_or(0);
        self.regs.write_u8(FIFO_CTRL, fifo_ctrl).await?;
        trace!("LIS3DHH: configured {config:?}");
        Ok(())
    }

    pub async fn device_id(&mut self) -> Result<u8, Error<SPI::Error>> {
        Ok(self.regs.read_u8(WHO_AM_I).await?)
    }

    /// Switches between normal mode and power-down.
    pub async fn set_enabled(&mut self, enabled: bool) -> Result<(), Error<SPI::Error>> {
        let value = if enabled { NORM_MOD_EN } else { 0 };
        self.regs.update_bits(CTRL_REG1, NORM_MOD_EN, value).await?;
        Ok(())
    }

    /// Software reset. Waits for SW_RESET to clear.
    pub async fn reset(&mut self) -> Result<(), Error<SPI::Error>> {
        self.set_and_wait(SW_RESET).await
    }

    /// Reloads the trimming parameters. Waits for BOOT to clear.
    pub async fn reboot(&mut self) -> Result<(), Error<SPI::Error>> {
        self.set_and_wait(BOOT).await
    }

    async fn set_and_wait(&mut self, bit: u8) -> Result<(), Error<SPI::Error>> {
        self.regs.update_bits(CTRL_REG1, bit, bit).await?;
        let mut poller = self.config.poll.start();
        while self.regs.read_u8(CTRL_REG1).await? & bit != 0 {
            poller
                .wait(&mut self.delay)
                .await
                .map_err(|_| Error::Timeout)?;
        }
        Ok(())
    }

    pub async fn status(&mut self) -> Result<Status, Error<SPI::Error>> {
        Ok(self.regs.read_u8(STATUS).await?.into())
    }

    /// Waits until a new sample is available.
    pub async fn wait_for_data(&mut self) -> Result<(), Error<SPI::Error>> {
        let mut poller = self.config.poll.start();
        loop {
            let status = self.status().await?;
            if status.overrun {
                debug!("LIS3DHH: sample overrun");
            }
            if status.data_available {
                return Ok(());
            }
            if poller.wait(&mut self.delay).await.is_err() {
                warn!("LIS3DHH: no data after {} attempts", self.config.poll.attempts);
                return Err(Error::Timeout);
            }
        }
    }

    /// Reads the output registers without waiting.
    pub async fn read_raw(&mut self) -> Result<RawAcceleration, Error<SPI::Error>> {
        let mut buf = [0u8; 6];
        self.regs.read(OUT_X_L, &mut buf).await?;
        Ok(RawAcceleration::from_le_bytes(&buf))
    }

    /// Waits for a new sample and returns it in g.
    pub async fn acceleration(&mut self) -> Result<Acceleration, Error<SPI::Error>> {
        self.wait_for_data().await?;
        let raw = self.read_raw().await?;
        let acceleration = Acceleration::from(raw);
        debug!("LIS3DHH: {raw:?} -> {acceleration:?}");
        Ok(acceleration)
    }

    /// Die temperature in °C.
    pub async fn temperature(&mut self) -> Result<f32, Error<SPI::Error>> {
        let mut buf = [0u8; 2];
        self.regs.read(OUT_TEMP_L, &mut buf).await?;
        Ok(temperature_from_raw(i16::from_le_bytes(buf)))
    }

    pub async fn set_self_test(&mut self, mode: SelfTest) -> Result<(), Error<SPI::Error>> {
        self.regs
            .update_bits(CTRL_REG4, ST_MASK, (mode as u8) << ST_SHIFT)
            .await?;
        Ok(())
    }

    pub async fn fifo_status(&mut self) -> Result<FifoStatus, Error<SPI::Error>> {
        Ok(self.regs.read_u8(FIFO_SRC).await?.into())
    }

    /// Drains up to `buf.len()` samples from the FIFO. Returns how many
    /// were read.
    pub async fn read_fifo(
        &mut self,
        buf: &mut [RawAcceleration],
    ) -> Result<usize, Error<SPI::Error>> {
        let stored = usize::from(self.fifo_status().await?.samples);
        let count = stored.min(buf.len());
        for sample in buf.iter_mut().take(count) {
            *sample = self.read_raw().await?;
        }
        trace!("LIS3DHH: read {count} of {stored} FIFO samples");
        Ok(count)
    }

    pub fn release(self) -> (SPI, D) {
        (self.regs.release(), self.delay)
    }
}
