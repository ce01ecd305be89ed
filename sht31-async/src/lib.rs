//! An asynchronous, `no_std` driver for the Sensirion SHT31 humidity and
//! temperature sensor.
//!
//! The SHT3x has no register map: the host sends 16-bit commands and reads
//! back 16-bit words, each followed by a CRC-8. While a conversion is in
//! progress the sensor does not acknowledge its read header.
//!
//! # Usage
//!
//! ```ignore
//! let mut sensor = Sht31::new(i2c, Address::Low, Delay, Config::default());
//! sensor.soft_reset().await?;
//! let sample = sensor.measure().await?;
//! ```

#![no_std]

pub mod command;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorKind, I2c, SevenBitAddress};
use log::{debug, trace, warn};
use sensor_bus_async::PollConfig;

pub use command::{Command, Rate, Repeatability};

const SOFT_RESET_US: u32 = 1_500;
const BREAK_US: u32 = 1_000;

// --- Status register ---
const STATUS_ALERT_PENDING: u16 = 1 << 15;
const STATUS_HEATER_ON: u16 = 1 << 13;
const STATUS_RH_ALERT: u16 = 1 << 11;
const STATUS_T_ALERT: u16 = 1 << 10;
const STATUS_RESET_DETECTED: u16 = 1 << 4;
const STATUS_COMMAND_FAILED: u16 = 1 << 1;
const STATUS_WRITE_CRC_FAILED: u16 = 1 << 0;

/// CRC-8 with polynomial 0x31 and initial value 0xFF, as used by every
/// Sensirion data word.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// I2C address, selected by the ADDR pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Address {
    #[default]
    Low = 0x44,
    High = 0x45,
}

/// Errors returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C bus error.
    Bus(E),
    /// A data word failed its checksum.
    Crc,
    /// The sensor did not deliver data in time.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Repeatability of `measure`.
    pub repeatability: Repeatability,
    /// Retries of a not-yet-acknowledged read after the conversion time.
    pub poll: PollConfig,
}

impl Config {
    pub fn set_repeatability(mut self, repeatability: Repeatability) -> Self {
        self.repeatability = repeatability;
        self
    }

    pub fn set_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

/// A converted measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Temperature in °C.
    pub temperature: f32,
    /// Relative humidity in %RH.
    pub humidity: f32,
}

impl Measurement {
    fn from_raw(temperature: u16, humidity: u16) -> Self {
        Self {
            temperature: -45.0 + 175.0 * f32::from(temperature) / 65535.0,
            humidity: 100.0 * f32::from(humidity) / 65535.0,
        }
    }
}

/// Decoded status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub alert_pending: bool,
    pub heater_on: bool,
    pub humidity_alert: bool,
    pub temperature_alert: bool,
    pub reset_detected: bool,
    pub command_failed: bool,
    pub write_crc_failed: bool,
}

impl From<u16> for Status {
    fn from(value: u16) -> Self {
        Self {
            alert_pending: value & STATUS_ALERT_PENDING != 0,
            heater_on: value & STATUS_HEATER_ON != 0,
            humidity_alert: value & STATUS_RH_ALERT != 0,
            temperature_alert: value & STATUS_T_ALERT != 0,
            reset_detected: value & STATUS_RESET_DETECTED != 0,
            command_failed: value & STATUS_COMMAND_FAILED != 0,
            write_crc_failed: value & STATUS_WRITE_CRC_FAILED != 0,
        }
    }
}

/// SHT31 driver.
pub struct Sht31<I2C, D> {
    i2c: I2C,
    address: u8,
    delay: D,
    config: Config,
}

impl<I2C, D> Sht31<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    pub fn new(i2c: I2C, address: Address, delay: D, config: Config) -> Self {
        Self {
            i2c,
            address: address as u8,
            delay,
            config,
        }
    }

    async fn command(&mut self, command: Command) -> Result<(), Error<I2C::Error>> {
        trace!("SHT31: command {:#06x}", command.code());
        let bytes: [u8; 2] = command.into();
        self.i2c.write(self.address, &bytes).await?;
        Ok(())
    }

    /// Reads `N` CRC-protected words.
    async fn read_words<const N: usize>(&mut self) -> Result<[u16; N], ReadError<I2C::Error>> {
        // Three bytes per word; six words is more than any command returns.
        let mut buf = [0u8; 18];
        let buf = &mut buf[..N * 3];
        self.i2c
            .read(self.address, buf)
            .await
            .map_err(ReadError::from_bus)?;

        let mut words = [0u16; N];
        for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
            if crc8(&chunk[..2]) != chunk[2] {
                warn!("SHT31: CRC mismatch on {chunk:02x?}");
                return Err(ReadError::Failed(Error::Crc));
            }
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Ok(words)
    }

    /// Resets the sensor and waits for it to come back.
    pub async fn soft_reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(Command::SoftReset).await?;
        self.delay.delay_us(SOFT_RESET_US).await;
        Ok(())
    }

    /// Takes a single shot measurement with the configured repeatability.
    ///
    /// The read is attempted after the longest conversion time and, while
    /// the sensor keeps not acknowledging, retried within the poll budget.
    pub async fn measure(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        let repeatability = self.config.repeatability;
        self.command(Command::SingleShot(repeatability)).await?;
        let wait_us = u32::try_from(repeatability.max_duration().as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(wait_us).await;

        let mut poller = self.config.poll.start();
        loop {
            match self.read_words::<2>().await {
                Ok([t, rh]) => {
                    let measurement = Measurement::from_raw(t, rh);
                    debug!("SHT31: {measurement:?}");
                    return Ok(measurement);
                }
                Err(ReadError::NotReady) => {
                    if poller.wait(&mut self.delay).await.is_err() {
                        warn!("SHT31: no data after {} retries", self.config.poll.attempts);
                        return Err(Error::Timeout);
                    }
                }
                Err(ReadError::Failed(e)) => return Err(e),
            }
        }
    }

    /// Starts periodic measurements.
    pub async fn start_periodic(
        &mut self,
        rate: Rate,
        repeatability: Repeatability,
    ) -> Result<(), Error<I2C::Error>> {
        self.command(Command::Periodic(rate, repeatability)).await
    }

    /// Starts periodic measurements at 4 Hz with accelerated response time.
    pub async fn start_art(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(Command::Art).await
    }

    /// Fetches the latest periodic measurement, `None` if there is no new
    /// one yet.
    pub async fn fetch(&mut self) -> Result<Option<Measurement>, Error<I2C::Error>> {
        self.command(Command::FetchData).await?;
        match self.read_words::<2>().await {
            Ok([t, rh]) => Ok(Some(Measurement::from_raw(t, rh))),
            Err(ReadError::NotReady) => Ok(None),
            Err(ReadError::Failed(e)) => Err(e),
        }
    }

    /// Stops periodic measurements.
    pub async fn stop_periodic(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(Command::Break).await?;
        self.delay.delay_us(BREAK_US).await;
        Ok(())
    }

    pub async fn set_heater(&mut self, on: bool) -> Result<(), Error<I2C::Error>> {
        let command = if on { Command::HeaterOn } else { Command::HeaterOff };
        self.command(command).await
    }

    pub async fn status(&mut self) -> Result<Status, Error<I2C::Error>> {
        self.command(Command::ReadStatus).await?;
        let [status] = self.read_words::<1>().await.map_err(ReadError::into_error)?;
        Ok(status.into())
    }

    pub async fn clear_status(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(Command::ClearStatus).await
    }

    /// Reads the 32-bit electronic identification code.
    pub async fn serial_number(&mut self) -> Result<u32, Error<I2C::Error>> {
        self.command(Command::ReadSerialNumber).await?;
        let [high, low] = self.read_words::<2>().await.map_err(ReadError::into_error)?;
        Ok((u32::from(high) << 16) | u32::from(low))
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

/// Result of a data read: a NACK is not an error while data is pending.
enum ReadError<E> {
    NotReady,
    Failed(Error<E>),
}

impl<E: embedded_hal_async::i2c::Error> ReadError<E> {
    fn from_bus(e: E) -> Self {
        match e.kind() {
            ErrorKind::NoAcknowledge(_) => Self::NotReady,
            _ => Self::Failed(Error::Bus(e)),
        }
    }

    fn into_error(self) -> Error<E> {
        match self {
            Self::NotReady => Error::Timeout,
            Self::Failed(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_matches_datasheet_example() {
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn conversion_formulas() {
        let m = Measurement::from_raw(0x6666, 0xCCCC);
        assert_eq!(m.temperature, 25.0);
        assert_eq!(m.humidity, 80.0);
    }

    #[test]
    fn status_bits() {
        let status = Status::from(0x8010);
        assert!(status.alert_pending);
        assert!(status.reset_detected);
        assert!(!status.heater_on);
    }
}
