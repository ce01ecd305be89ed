//! [`Sensor`] implementations for the drivers in this workspace.

use core::fmt::Debug;

use as3933_async::As3933;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use embedded_hal_async::spi::SpiDevice;
use hdc2080_async::Hdc2080;
use hts221_async::Hts221;
use lis3dhh_async::Lis3dhh;
use sht31_async::Sht31;
use sx128x_async::radio::{LoraRadio, MAX_PAYLOAD};
use sx128x_async::SxError;

use crate::report::{ClimateReport, LinkReport, MotionReport, WakeReport};
use crate::sensor::Sensor;

impl<I2C, D> Sensor for Hts221<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    type Reading = ClimateReport;
    type Error = hts221_async::Error<I2C::Error>;

    async fn sample(&mut self) -> Result<ClimateReport, Self::Error> {
        let m = self.measure().await?;
        Ok(ClimateReport {
            temperature: m.temperature,
            humidity: Some(m.humidity),
        })
    }
}

impl<I2C, D> Sensor for Hdc2080<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    type Reading = ClimateReport;
    type Error = hdc2080_async::Error<I2C::Error>;

    async fn sample(&mut self) -> Result<ClimateReport, Self::Error> {
        let m = self.measure().await?;
        Ok(ClimateReport {
            temperature: m.temperature,
            humidity: m.humidity,
        })
    }
}

impl<I2C, D> Sensor for Sht31<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    type Reading = ClimateReport;
    type Error = sht31_async::Error<I2C::Error>;

    async fn sample(&mut self) -> Result<ClimateReport, Self::Error> {
        let m = self.measure().await?;
        Ok(ClimateReport {
            temperature: m.temperature,
            humidity: Some(m.humidity),
        })
    }
}

impl<SPI, D> Sensor for Lis3dhh<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    type Reading = MotionReport;
    type Error = lis3dhh_async::Error<SPI::Error>;

    async fn sample(&mut self) -> Result<MotionReport, Self::Error> {
        let a = self.acceleration().await?;
        let temperature = self.temperature().await?;
        Ok(MotionReport {
            x: a.x,
            y: a.y,
            z: a.z,
            temperature: Some(temperature),
        })
    }
}

/// Reads the channel RSSI after a wake-up, then re-arms the receiver.
impl<SPI, D> Sensor for As3933<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    type Reading = WakeReport;
    type Error = as3933_async::Error<SPI::Error>;

    async fn sample(&mut self) -> Result<WakeReport, Self::Error> {
        let rssi = self.rssi().await?;
        let false_wakeups = self.false_wakeups().await?;
        self.clear_wake().await?;
        Ok(WakeReport {
            rssi: [rssi.ch1, rssi.ch2, rssi.ch3],
            false_wakeups,
        })
    }
}

/// Listens for one LoRa packet per round and reports the link quality.
pub struct LinkMonitor<SPI, NRST, BUSY, DIO1, D> {
    radio: LoraRadio<SPI, NRST, BUSY, DIO1, D>,
    packets: u32,
    buffer: [u8; MAX_PAYLOAD],
    last_len: usize,
}

impl<SPI, NRST, BUSY, DIO1, D> LinkMonitor<SPI, NRST, BUSY, DIO1, D> {
    /// Wraps an initialized radio.
    pub fn new(radio: LoraRadio<SPI, NRST, BUSY, DIO1, D>) -> Self {
        Self {
            radio,
            packets: 0,
            buffer: [0; MAX_PAYLOAD],
            last_len: 0,
        }
    }

    /// Payload of the last received packet, empty before the first one.
    pub fn last_payload(&self) -> &[u8] {
        &self.buffer[..self.last_len]
    }

    pub fn release(self) -> LoraRadio<SPI, NRST, BUSY, DIO1, D> {
        self.radio
    }
}

impl<SPI, NRST, BUSY, DIO1, D, SPIERR, PINERR> Sensor for LinkMonitor<SPI, NRST, BUSY, DIO1, D>
where
    SPIERR: Debug,
    PINERR: Debug,
    SPI: SpiDevice<Error = SPIERR>,
    NRST: OutputPin<Error = PINERR>,
    BUSY: InputPin<Error = PINERR>,
    DIO1: InputPin<Error = PINERR>,
    D: DelayNs,
{
    type Reading = LinkReport;
    type Error = SxError<SPIERR, PINERR>;

    async fn sample(&mut self) -> Result<LinkReport, Self::Error> {
        let received = self.radio.receive(&mut self.buffer).await?;
        if let Some(packet) = received {
            self.packets = self.packets.wrapping_add(1);
            self.last_len = packet.len;
        }
        Ok(LinkReport {
            packets: self.packets,
            rssi: received.map(|r| r.rssi),
            snr: received.map(|r| r.snr),
        })
    }
}
