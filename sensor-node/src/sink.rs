//! Where report lines go.

use core::fmt::Debug;

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;
use embedded_io_async::Write;
use sx128x_async::radio::LoraRadio;
use sx128x_async::SxError;

/// A byte-oriented output for report lines.
#[allow(async_fn_in_trait)]
pub trait Sink {
    type Error: Debug;

    /// Sends `data` completely.
    async fn send(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Writes reports to a serial port.
pub struct UartSink<W> {
    uart: W,
}

impl<W: Write> UartSink<W> {
    pub fn new(uart: W) -> Self {
        Self { uart }
    }

    pub fn release(self) -> W {
        self.uart
    }
}

impl<W: Write> Sink for UartSink<W> {
    type Error = W::Error;

    /// Writes all bytes, then flushes so the line is on the wire before the
    /// node goes back to sleep.
    async fn send(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.uart.write_all(data).await?;
        self.uart.flush().await
    }
}

/// Sends each report as one LoRa packet.
pub struct RadioSink<SPI, NRST, BUSY, DIO1, D> {
    radio: LoraRadio<SPI, NRST, BUSY, DIO1, D>,
}

impl<SPI, NRST, BUSY, DIO1, D> RadioSink<SPI, NRST, BUSY, DIO1, D> {
    /// Wraps an initialized radio.
    pub fn new(radio: LoraRadio<SPI, NRST, BUSY, DIO1, D>) -> Self {
        Self { radio }
    }

    pub fn radio(&mut self) -> &mut LoraRadio<SPI, NRST, BUSY, DIO1, D> {
        &mut self.radio
    }

    pub fn release(self) -> LoraRadio<SPI, NRST, BUSY, DIO1, D> {
        self.radio
    }
}

impl<SPI, NRST, BUSY, DIO1, D, SPIERR, PINERR> Sink for RadioSink<SPI, NRST, BUSY, DIO1, D>
where
    SPIERR: Debug,
    PINERR: Debug,
    SPI: SpiDevice<Error = SPIERR>,
    NRST: OutputPin<Error = PINERR>,
    BUSY: InputPin<Error = PINERR>,
    DIO1: InputPin<Error = PINERR>,
    D: DelayNs,
{
    type Error = SxError<SPIERR, PINERR>;

    async fn send(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.radio.send(data).await
    }
}
