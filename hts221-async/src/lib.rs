//! An asynchronous, `no_std` driver for the ST HTS221 humidity and
//! temperature sensor.
//!
//! The sensor is read over I2C at address `0x5F`. Multi-byte reads set the
//! MSB of the sub-address so the register pointer advances.
//!
//! # Usage
//!
//! ```ignore
//! let mut sensor = Hts221::new(i2c, Delay, Config::default());
//! sensor.init().await?;
//! let sample = sensor.measure().await?;
//! log::info!("{} °C, {} %RH", sample.temperature, sample.humidity);
//! ```

#![no_std]

pub mod calibration;
pub mod config;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use log::{debug, trace, warn};
use sensor_bus_async::I2cRegisters;

pub use calibration::{Calibration, InvalidCalibration, CALIBRATION_LEN};
pub use config::{Config, DataReadyPin, HumidityAverage, OutputDataRate, TemperatureAverage};

// --- Device ---
pub const HTS221_I2C_ADDR: u8 = 0x5F;
pub const HTS221_DEVICE_ID: u8 = 0xBC;
const AUTO_INCREMENT: u8 = 0x80;

// --- Register Addresses ---
const WHO_AM_I: u8 = 0x0F;
const AV_CONF: u8 = 0x10;
const CTRL_REG1: u8 = 0x20;
const CTRL_REG2: u8 = 0x21;
const CTRL_REG3: u8 = 0x22;
const STATUS_REG: u8 = 0x27;
const HUMIDITY_OUT_L: u8 = 0x28;
const CALIB_START: u8 = 0x30;

// --- CTRL_REG1 ---
const CTRL1_PD: u8 = 0b1000_0000;
const CTRL1_BDU: u8 = 0b0000_0100;

// --- CTRL_REG2 ---
const CTRL2_BOOT: u8 = 0b1000_0000;
const CTRL2_HEATER: u8 = 0b0000_0010;
const CTRL2_ONE_SHOT: u8 = 0b0000_0001;

// --- STATUS_REG ---
const STATUS_H_DA: u8 = 0b0000_0010;
const STATUS_T_DA: u8 = 0b0000_0001;

/// Errors returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C bus error.
    Bus(E),
    /// WHO_AM_I returned an unexpected value.
    InvalidDevice(u8),
    /// The factory calibration cannot be used.
    InvalidCalibration,
    /// A status bit did not change in time.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// Data-available flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub humidity_available: bool,
    pub temperature_available: bool,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self {
            humidity_available: value & STATUS_H_DA != 0,
            temperature_available: value & STATUS_T_DA != 0,
        }
    }
}

/// Raw output registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub humidity: i16,
    pub temperature: i16,
}

/// A converted measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Temperature in °C.
    pub temperature: f32,
    /// Relative humidity in %RH.
    pub humidity: f32,
}

/// HTS221 driver.
pub struct Hts221<I2C, D> {
    regs: I2cRegisters<I2C>,
    delay: D,
    config: Config,
    calibration: Option<Calibration>,
}

impl<I2C, D> Hts221<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: Config) -> Self {
        Self {
            regs: I2cRegisters::new(i2c, HTS221_I2C_ADDR).with_auto_increment(AUTO_INCREMENT),
            delay,
            config,
            calibration: None,
        }
    }

    /// Checks the device ID, applies the configuration, powers the sensor
    /// up and loads the calibration.
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        let id = self.device_id().await?;
        if id != HTS221_DEVICE_ID {
            warn!("HTS221: unexpected WHO_AM_I {id:#04x}");
            return Err(Error::InvalidDevice(id));
        }

        self.regs.write_u8(AV_CONF, self.config.av_conf()).await?;
        self.regs
            .write_u8(CTRL_REG3, self.config.data_ready.into())
            .await?;

        let mut ctrl1 = CTRL1_PD | self.config.data_rate as u8;
        if self.config.block_data_update {
            ctrl1 |= CTRL1_BDU;
        }
        self.regs.write_u8(CTRL_REG1, ctrl1).await?;
        trace!("HTS221: CTRL_REG1 = {ctrl1:#04x}");

        self.load_calibration().await?;
        Ok(())
    }

    /// Reads WHO_AM_I.
    pub async fn device_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.regs.read_u8(WHO_AM_I).await?)
    }

    pub async fn status(&mut self) -> Result<Status, Error<I2C::Error>> {
        Ok(self.regs.read_u8(STATUS_REG).await?.into())
    }

    /// Clears PD; the sensor stops converting until `init` runs again.
    pub async fn power_down(&mut self) -> Result<(), Error<I2C::Error>> {
        self.regs.update_bits(CTRL_REG1, CTRL1_PD, 0).await?;
        Ok(())
    }

    pub async fn set_heater(&mut self, on: bool) -> Result<(), Error<I2C::Error>> {
        let value = if on { CTRL2_HEATER } else { 0 };
        self.regs.update_bits(CTRL_REG2, CTRL2_HEATER, value).await?;
        Ok(())
    }

    /// Reloads the trimming registers from flash and re-reads the
    /// calibration.
    pub async fn reboot(&mut self) -> Result<(), Error<I2C::Error>> {
        self.regs.update_bits(CTRL_REG2, CTRL2_BOOT, CTRL2_BOOT).await?;
        let mut poller = self.config.poll.start();
        while self.regs.read_u8(CTRL_REG2).await? & CTRL2_BOOT != 0 {
            poller
                .wait(&mut self.delay)
                .await
                .map_err(|_| Error::Timeout)?;
        }
        self.load_calibration().await?;
        Ok(())
    }

    /// Starts a single conversion.
    pub async fn trigger_one_shot(&mut self) -> Result<(), Error<I2C::Error>> {
        self.regs
            .update_bits(CTRL_REG2, CTRL2_ONE_SHOT, CTRL2_ONE_SHOT)
            .await?;
        Ok(())
    }

    /// Waits until both humidity and temperature are available.
    pub async fn wait_for_data(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut poller = self.config.poll.start();
        loop {
            let status = self.status().await?;
            if status.humidity_available && status.temperature_available {
                return Ok(());
            }
            if poller.wait(&mut self.delay).await.is_err() {
                warn!("HTS221: no data after {} attempts", self.config.poll.attempts);
                return Err(Error::Timeout);
            }
        }
    }

    /// Reads the humidity and temperature output registers.
    pub async fn read_raw(&mut self) -> Result<RawSample, Error<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.regs.read(HUMIDITY_OUT_L, &mut buf).await?;
        Ok(RawSample {
            humidity: i16::from_le_bytes([buf[0], buf[1]]),
            temperature: i16::from_le_bytes([buf[2], buf[3]]),
        })
    }

    /// Takes a measurement. In one-shot mode a conversion is triggered
    /// first.
    pub async fn measure(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        if self.config.data_rate == OutputDataRate::OneShot {
            self.trigger_one_shot().await?;
        }
        self.wait_for_data().await?;
        let raw = self.read_raw().await?;
        let calibration = self.calibration().await?;

        let measurement = Measurement {
            temperature: calibration.temperature(raw.temperature),
            humidity: calibration.humidity(raw.humidity),
        };
        debug!("HTS221: {raw:?} -> {measurement:?}");
        Ok(measurement)
    }

    /// The calibration, read from the sensor on first use.
    pub async fn calibration(&mut self) -> Result<Calibration, Error<I2C::Error>> {
        match self.calibration {
            Some(calibration) => Ok(calibration),
            None => self.load_calibration().await,
        }
    }

    async fn load_calibration(&mut self) -> Result<Calibration, Error<I2C::Error>> {
        let mut raw = [0u8; CALIBRATION_LEN];
        self.regs.read(CALIB_START, &mut raw).await?;
        let calibration = Calibration::from_bytes(&raw).map_err(|_| {
            warn!("HTS221: degenerate calibration table {raw:02x?}");
            Error::InvalidCalibration
        })?;
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    /// Releases the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.regs.release(), self.delay)
    }
}
