//! An asynchronous, `no_std` driver for the TI HDC2080 humidity and
//! temperature sensor.
//!
//! The HDC2080 converts on demand (a write to `MEAS_TRIG`) or periodically
//! (auto measurement mode), and flags finished conversions with `DRDY`.
//! `DRDY` clears when the status register is read.
//!
//! # Usage
//!
//! ```ignore
//! let mut sensor = Hdc2080::new(i2c, Address::Low, Delay, Config::default());
//! sensor.init().await?;
//! let sample = sensor.measure().await?;
//! ```

#![no_std]

pub mod convert;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use log::{debug, trace, warn};
use sensor_bus_async::{I2cRegisters, PollConfig};

// --- Register Addresses ---
const TEMPERATURE_LOW: u8 = 0x00;
const INTERRUPT_DRDY: u8 = 0x04;
const TEMPERATURE_MAX: u8 = 0x05;
const INTERRUPT_ENABLE: u8 = 0x07;
const TEMP_OFFSET_ADJUST: u8 = 0x08;
const HUM_OFFSET_ADJUST: u8 = 0x09;
const TEMP_THR_L: u8 = 0x0A;
const RH_THR_L: u8 = 0x0C;
const DEVICE_CONFIG: u8 = 0x0E;
const MEASUREMENT_CONFIG: u8 = 0x0F;
const MANUFACTURER_ID_LOW: u8 = 0xFC;
const DEVICE_ID_LOW: u8 = 0xFE;

pub const MANUFACTURER_ID: u16 = 0x5449;
pub const DEVICE_ID: u16 = 0x07D0;

// --- DEVICE_CONFIG ---
const SOFT_RES: u8 = 0b1000_0000;
const AMM_SHIFT: u8 = 4;
const HEAT_EN: u8 = 0b0000_1000;
const DRDY_INT_EN: u8 = 0b0000_0100;
const INT_POL: u8 = 0b0000_0010;
const INT_MODE: u8 = 0b0000_0001;

// --- MEASUREMENT_CONFIG ---
const TRES_SHIFT: u8 = 6;
const HRES_SHIFT: u8 = 4;
const MEAS_CONF_SHIFT: u8 = 1;
const MEAS_TRIG: u8 = 0b0000_0001;

// --- INTERRUPT_DRDY / INTERRUPT_ENABLE ---
const DRDY: u8 = 0b1000_0000;
const TH: u8 = 0b0100_0000;
const TL: u8 = 0b0010_0000;
const HH: u8 = 0b0001_0000;
const HL: u8 = 0b0000_1000;

/// I2C address, selected by the ADDR pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Address {
    /// ADDR tied to GND, 0x40.
    #[default]
    Low = 0x40,
    /// ADDR tied to VDD, 0x41.
    High = 0x41,
}

/// Conversion resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Bits14 = 0,
    Bits11 = 1,
    Bits9 = 2,
}

/// What a conversion measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementMode {
    #[default]
    TemperatureAndHumidity = 0,
    TemperatureOnly = 1,
}

/// Auto measurement mode (AMM) rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoMeasurement {
    /// Conversions only on trigger.
    #[default]
    Disabled = 0,
    Every2Minutes = 1,
    EveryMinute = 2,
    Every10Seconds = 3,
    Every5Seconds = 4,
    Hz1 = 5,
    Hz2 = 6,
    Hz5 = 7,
}

/// DRDY/INT pin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptPin {
    pub enabled: bool,
    pub active_high: bool,
    /// Comparator mode instead of level-sensitive mode.
    pub comparator: bool,
}

/// Interrupt sources, also used for the interrupt status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interrupts {
    pub data_ready: bool,
    pub temperature_high: bool,
    pub temperature_low: bool,
    pub humidity_high: bool,
    pub humidity_low: bool,
}

impl From<u8> for Interrupts {
    fn from(value: u8) -> Self {
        Self {
            data_ready: value & DRDY != 0,
            temperature_high: value & TH != 0,
            temperature_low: value & TL != 0,
            humidity_high: value & HH != 0,
            humidity_low: value & HL != 0,
        }
    }
}

impl From<Interrupts> for u8 {
    fn from(i: Interrupts) -> Self {
        let mut value = 0;
        for (set, bit) in [
            (i.data_ready, DRDY),
            (i.temperature_high, TH),
            (i.temperature_low, TL),
            (i.humidity_high, HH),
            (i.humidity_low, HL),
        ] {
            if set {
                value |= bit;
            }
        }
        value
    }
}

/// Sensor configuration applied by `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub temperature_resolution: Resolution,
    pub humidity_resolution: Resolution,
    pub mode: MeasurementMode,
    pub auto_measurement: AutoMeasurement,
    pub heater: bool,
    pub interrupt_pin: InterruptPin,
    pub interrupts: Interrupts,
    pub poll: PollConfig,
}

impl Config {
    pub fn set_resolution(mut self, temperature: Resolution, humidity: Resolution) -> Self {
        self.temperature_resolution = temperature;
        self.humidity_resolution = humidity;
        self
    }

    pub fn set_mode(mut self, mode: MeasurementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_auto_measurement(mut self, rate: AutoMeasurement) -> Self {
        self.auto_measurement = rate;
        self
    }

    pub fn set_heater(mut self, on: bool) -> Self {
        self.heater = on;
        self
    }

    pub fn set_interrupt_pin(mut self, pin: InterruptPin) -> Self {
        self.interrupt_pin = pin;
        self
    }

    pub fn set_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }

    pub fn set_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    fn device_config(&self) -> u8 {
        let mut value = (self.auto_measurement as u8) << AMM_SHIFT;
        if self.heater {
            value |= HEAT_EN;
        }
        if self.interrupt_pin.enabled {
            value |= DRDY_INT_EN;
        }
        if self.interrupt_pin.active_high {
            value |= INT_POL;
        }
        if self.interrupt_pin.comparator {
            value |= INT_MODE;
        }
        value
    }

    fn measurement_config(&self) -> u8 {
        ((self.temperature_resolution as u8) << TRES_SHIFT)
            | ((self.humidity_resolution as u8) << HRES_SHIFT)
            | ((self.mode as u8) << MEAS_CONF_SHIFT)
    }
}

/// Errors returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C bus error.
    Bus(E),
    /// An ID register returned an unexpected value.
    InvalidDevice(u16),
    /// A status bit did not change in time.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// Manufacturer and device ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ids {
    pub manufacturer: u16,
    pub device: u16,
}

/// Raw output registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub temperature: u16,
    pub humidity: u16,
}

/// A converted measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Temperature in °C.
    pub temperature: f32,
    /// Relative humidity in %RH, `None` in temperature-only mode.
    pub humidity: Option<f32>,
}

/// Highest values seen since power-up, 8-bit resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peaks {
    pub temperature: f32,
    pub humidity: f32,
}

/// HDC2080 driver.
pub struct Hdc2080<I2C, D> {
    regs: I2cRegisters<I2C>,
    delay: D,
    config: Config,
}

impl<I2C, D> Hdc2080<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    pub fn new(i2c: I2C, address: Address, delay: D, config: Config) -> Self {
        Self {
            regs: I2cRegisters::new(i2c, address as u8),
            delay,
            config,
        }
    }

    /// Checks the IDs, resets the sensor and applies the configuration.
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        let ids = self.ids().await?;
        if ids.manufacturer != MANUFACTURER_ID {
            warn!("HDC2080: unexpected manufacturer {:#06x}", ids.manufacturer);
            return Err(Error::InvalidDevice(ids.manufacturer));
        }
        if ids.device != DEVICE_ID {
            warn!("HDC2080: unexpected device {:#06x}", ids.device);
            return Err(Error::InvalidDevice(ids.device));
        }

        self.soft_reset().await?;

        self.regs
            .write_u8(DEVICE_CONFIG, self.config.device_config())
            .await?;
        self.regs
            .write_u8(INTERRUPT_ENABLE, self.config.interrupts.into())
            .await?;
        self.regs
            .write_u8(MEASUREMENT_CONFIG, self.config.measurement_config())
            .await?;
        trace!("HDC2080: configured {:?}", self.config);
        Ok(())
    }

    pub async fn ids(&mut self) -> Result<Ids, Error<I2C::Error>> {
        Ok(Ids {
            manufacturer: self.regs.read_u16_le(MANUFACTURER_ID_LOW).await?,
            device: self.regs.read_u16_le(DEVICE_ID_LOW).await?,
        })
    }

    /// Resets all registers; SOFT_RES clears itself when done.
    pub async fn soft_reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.regs.write_u8(DEVICE_CONFIG, SOFT_RES).await?;
        let mut poller = self.config.poll.start();
        while self.regs.read_u8(DEVICE_CONFIG).await? & SOFT_RES != 0 {
            poller
                .wait(&mut self.delay)
                .await
                .map_err(|_| Error::Timeout)?;
        }
        Ok(())
    }

    /// Starts a conversion.
    pub async fn trigger(&mut self) -> Result<(), Error<I2C::Error>> {
        self.regs
            .update_bits(MEASUREMENT_CONFIG, MEAS_TRIG, MEAS_TRIG)
            .await?;
        Ok(())
    }

    /// Reads and clears DRDY.
    pub async fn data_ready(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.regs.read_u8(INTERRUPT_DRDY).await? & DRDY != 0)
    }

    pub async fn wait_for_data(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut poller = self.config.poll.start();
        while !self.data_ready().await? {
            if poller.wait(&mut self.delay).await.is_err() {
                warn!("HDC2080: DRDY not set after {} attempts", self.config.poll.attempts);
                return Err(Error::Timeout);
            }
        }
        Ok(())
    }

    pub async fn read_raw(&mut self) -> Result<RawSample, Error<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.regs.read(TEMPERATURE_LOW, &mut buf).await?;
        Ok(RawSample {
            temperature: u16::from_le_bytes([buf[0], buf[1]]),
            humidity: u16::from_le_bytes([buf[2], buf[3]]),
        })
    }

    /// Takes a measurement, triggering it first unless auto measurement
    /// mode is on.
    pub async fn measure(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        if self.config.auto_measurement == AutoMeasurement::Disabled {
            self.trigger().await?;
        }
        self.wait_for_data().await?;
        let raw = self.read_raw().await?;

        let humidity = match self.config.mode {
            MeasurementMode::TemperatureAndHumidity => Some(convert::humidity(raw.humidity)),
            MeasurementMode::TemperatureOnly => None,
        };
        let measurement = Measurement {
            temperature: convert::temperature(raw.temperature),
            humidity,
        };
        debug!("HDC2080: {raw:?} -> {measurement:?}");
        Ok(measurement)
    }

    /// Reads the peak detector registers.
    pub async fn peak_values(&mut self) -> Result<Peaks, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.regs.read(TEMPERATURE_MAX, &mut buf).await?;
        Ok(Peaks {
            temperature: convert::temperature_u8(buf[0]),
            humidity: convert::humidity_u8(buf[1]),
        })
    }

    /// Sets the temperature interrupt thresholds, in °C.
    pub async fn set_temperature_thresholds(
        &mut self,
        low: f32,
        high: f32,
    ) -> Result<(), Error<I2C::Error>> {
        let values = [
            convert::temperature_threshold(low),
            convert::temperature_threshold(high),
        ];
        self.regs.write(TEMP_THR_L, &values).await?;
        Ok(())
    }

    /// Sets the humidity interrupt thresholds, in %RH.
    pub async fn set_humidity_thresholds(&mut self, low: f32, high: f32) -> Result<(), Error<I2C::Error>> {
        let values = [convert::humidity_threshold(low), convert::humidity_threshold(high)];
        self.regs.write(RH_THR_L, &values).await?;
        Ok(())
    }

    /// Adds `celsius` to every temperature result.
    pub async fn set_temperature_offset(&mut self, celsius: f32) -> Result<(), Error<I2C::Error>> {
        let value = convert::offset(celsius, convert::TEMP_OFFSET_LSB);
        self.regs.write_u8(TEMP_OFFSET_ADJUST, value).await?;
        Ok(())
    }

    /// Adds `rh` to every humidity result.
    pub async fn set_humidity_offset(&mut self, rh: f32) -> Result<(), Error<I2C::Error>> {
        let value = convert::offset(rh, convert::RH_OFFSET_LSB);
        self.regs.write_u8(HUM_OFFSET_ADJUST, value).await?;
        Ok(())
    }

    pub async fn set_heater(&mut self, on: bool) -> Result<(), Error<I2C::Error>> {
        let value = if on { HEAT_EN } else { 0 };
        self.regs.update_bits(DEVICE_CONFIG, HEAT_EN, value).await?;
        self.config.heater = on;
        Ok(())
    }

    /// Reads the interrupt flags. Reading clears them.
    pub async fn interrupt_status(&mut self) -> Result<Interrupts, Error<I2C::Error>> {
        Ok(self.regs.read_u8(INTERRUPT_DRDY).await?.into())
    }

    pub fn release(self) -> (I2C, D) {
        (self.regs.release(), self.delay)
    }
}
