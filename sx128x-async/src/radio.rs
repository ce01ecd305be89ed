//! A send/receive interface on top of [`SX128x`].

use core::fmt::Debug;

use embassy_time::Duration;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;
use sensor_bus_async::PollConfig;

use crate::conf::Config;
use crate::op::*;
use crate::{SX128x, SxError};

/// Largest LoRa payload.
pub const MAX_PAYLOAD: usize = 255;

/// Configuration for the LoRa radio.
#[derive(Debug, Clone)]
pub struct LoraConfig {
    /// RF frequency in Hz.
    pub frequency: u32,
    /// Spreading factor
    pub spreading_factor: LoRaSpreadFactor,
    /// Bandwidth
    pub bandwidth: LoRaBandWidth,
    /// Coding rate
    pub coding_rate: LoraCodingRate,
    /// Preamble length in symbols, rounded up to an encodable value.
    pub preamble_symbols: u32,
    /// Append and check a payload CRC.
    pub crc: bool,
    /// Output power in dBm, -18..=13.
    pub power_dbm: i8,
    /// Power amplifier ramp time.
    pub ramp_time: RampTime,
    /// Sync word
    pub sync_word: u8,
    /// Power regulator
    pub regulator: RegulatorMode,
    /// Timeout programmed into the modem for a transmission.
    pub tx_timeout: RxTxTimeout,
    /// Timeout programmed into the modem for a reception.
    pub rx_timeout: RxTxTimeout,
    /// Bound on waiting for DIO1 after starting TX or RX. Should exceed the
    /// modem timeouts.
    pub done_poll: PollConfig,
}

impl Default for LoraConfig {
    fn default() -> Self {
        Self {
            frequency: 2_400_000_000,
            spreading_factor: LoRaSpreadFactor::SF9,
            bandwidth: LoRaBandWidth::BW800,
            coding_rate: LoraCodingRate::CR4_6,
            preamble_symbols: 12,
            crc: true,
            power_dbm: 13,
            ramp_time: RampTime::Ramp10u,
            sync_word: 0x12, // private network
            regulator: RegulatorMode::Ldo,
            tx_timeout: RxTxTimeout::from_ms(2000),
            rx_timeout: RxTxTimeout::from_ms(5000),
            done_poll: PollConfig::new(600, Duration::from_millis(10)),
        }
    }
}

impl LoraConfig {
    fn packet_params(&self) -> LoRaPacketParams {
        let crc_type = if self.crc {
            LoRaCrcType::CrcOn
        } else {
            LoRaCrcType::CrcOff
        };
        LoRaPacketParams::default()
            .set_preamble_len(PreambleLength::from_symbols(self.preamble_symbols))
            .set_header_type(LoRaHeaderType::Explicit)
            .set_crc_type(crc_type)
    }

    fn modem_config(&self) -> Config {
        let mod_params = LoraModParams::default()
            .set_spread_factor(self.spreading_factor)
            .set_bandwidth(self.bandwidth)
            .set_coding_rate(self.coding_rate);
        let tx_params = TxParams::default()
            .set_power_dbm(self.power_dbm)
            .set_ramp_time(self.ramp_time);

        Config::default()
            .set_regulator(self.regulator)
            .set_rf_frequency(self.frequency)
            .set_mod_params(mod_params)
            .set_packet_params(self.packet_params())
            .set_tx_params(tx_params)
            .set_irq_mask(IrqMask::tx_rx())
            .set_sync_word(self.sync_word)
    }
}

/// A packet taken out of the modem buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Received {
    /// Number of payload bytes written to the caller's buffer.
    pub len: usize,
    /// RSSI in dBm.
    pub rssi: f32,
    /// SNR in dB.
    pub snr: f32,
}

/// A high-level interface for the SX1280 LoRa radio.
///
/// This struct encapsulates the [`SX128x`] device and provides methods
/// for initialization, sending, and receiving data.
pub struct LoraRadio<SPI, NRST, BUSY, DIO1, D> {
    /// The underlying device instance.
    pub device: SX128x<SPI, NRST, BUSY, DIO1, D>,
    packet_params: LoRaPacketParams,
    tx_timeout: RxTxTimeout,
    rx_timeout: RxTxTimeout,
    done_poll: PollConfig,
}

impl<SPI, NRST, BUSY, DIO1, D, SPIERR, PINERR> LoraRadio<SPI, NRST, BUSY, DIO1, D>
where
    SPIERR: Debug,
    PINERR: Debug,
    SPI: SpiDevice<Error = SPIERR>,
    NRST: OutputPin<Error = PINERR>,
    BUSY: InputPin<Error = PINERR>,
    DIO1: InputPin<Error = PINERR>,
    D: DelayNs,
{
    /// Creates a new `LoraRadio`.
    ///
    /// # Arguments
    ///
    /// * `spi` - The SPI device for communicating with the LoRa module.
    /// * `pins` - The reset output, busy input and DIO1 interrupt input pins.
    /// * `delay` - A delay provider.
    pub fn new(spi: SPI, pins: (NRST, BUSY, DIO1), delay: D) -> Self {
        Self::from_device(SX128x::new(spi, pins, delay))
    }

    /// Wraps an already constructed device.
    pub fn from_device(device: SX128x<SPI, NRST, BUSY, DIO1, D>) -> Self {
        let defaults = LoraConfig::default();
        Self {
            device,
            packet_params: defaults.packet_params(),
            tx_timeout: defaults.tx_timeout,
            rx_timeout: defaults.rx_timeout,
            done_poll: defaults.done_poll,
        }
    }

    /// Resets the LoRa module.
    pub async fn reset(&mut self) -> Result<(), SxError<SPIERR, PINERR>> {
        self.device
            .reset()
            .await
            .inspect_err(|err| log::warn!("Error resetting device: {err:?}"))
    }

    /// Resets the modem and configures it for LoRa.
    pub async fn init(&mut self, config: &LoraConfig) -> Result<(), SxError<SPIERR, PINERR>> {
        self.packet_params = config.packet_params();
        self.tx_timeout = config.tx_timeout;
        self.rx_timeout = config.rx_timeout;
        self.done_poll = config.done_poll;

        self.device
            .init(&config.modem_config())
            .await
            .inspect_err(|err| log::warn!("Error initializing device: {err:?}"))?;

        let version = self.device.firmware_version().await?;
        let status = self.device.get_status().await?;
        log::debug!("LoRa radio firmware: {version:#06x}, status: {status:?}");
        Ok(())
    }

    /// Sends a data packet and waits until the modem reports the end of the
    /// transmission.
    ///
    /// # Arguments
    ///
    /// * `data` - A byte slice containing the data to send, at most 255 bytes.
    pub async fn send(&mut self, data: &[u8]) -> Result<(), SxError<SPIERR, PINERR>> {
        if data.len() > MAX_PAYLOAD {
            log::warn!("lora::send payload of {} bytes is too large", data.len());
            return Err(SxError::PayloadTooLarge);
        }
        log::trace!("lora::send {data:?}");

        self.device.clear_irq_status(IrqMask::all()).await?;
        self.device.write_buffer(0x00, data).await?;
        let params = self.packet_params.set_payload_len(data.len() as u8);
        self.device.set_packet_params(params).await?;

        let status = self.device.set_tx(self.tx_timeout).await?;
        log::trace!("lora::send tx mode set, status: {status:?}");

        let irq_status = self.wait_for_irq().await?;
        log::trace!("lora::send irq status: {irq_status:?}");

        if irq_status.tx_done() {
            Ok(())
        } else {
            log::warn!("lora::send did not complete: {irq_status:?}");
            Err(SxError::Timeout)
        }
    }

    /// Listens for one packet.
    ///
    /// Returns `None` when the receive timeout expired or the packet was
    /// dropped for a CRC or header error.
    ///
    /// # Arguments
    ///
    /// * `buffer` - A mutable byte slice to store the received data.
    pub async fn receive(
        &mut self,
        buffer: &mut [u8],
    ) -> Result<Option<Received>, SxError<SPIERR, PINERR>> {
        log::trace!("lora::receive waiting for message");
        self.device.clear_irq_status(IrqMask::all()).await?;
        let params = self.packet_params.set_payload_len(MAX_PAYLOAD as u8);
        self.device.set_packet_params(params).await?;
        self.device.set_rx(self.rx_timeout).await?;

        let irq_status = self.wait_for_irq().await?;
        log::trace!("lora::receive irq status: {irq_status:?}");

        if irq_status.rx_tx_timeout() {
            log::trace!("lora::receive timeout");
            return Ok(None);
        }
        if irq_status.crc_error() || irq_status.header_error() {
            log::warn!("lora::receive dropped a corrupt packet: {irq_status:?}");
            return Ok(None);
        }
        if !irq_status.rx_done() {
            log::warn!("lora::receive unexpected interrupt: {irq_status:?}");
            return Ok(None);
        }

        let rx_status = self.device.get_rx_buffer_status().await?;
        let len = usize::from(rx_status.payload_length_rx());
        let offset = rx_status.rx_start_buffer_pointer();
        log::trace!("lora::receive rx status: len={len}, offset={offset}");

        if len > buffer.len() {
            log::warn!("lora::receive received payload larger than buffer");
            return Err(SxError::PayloadTooLarge);
        }

        self.device
            .read_buffer(offset, &mut buffer[..len])
            .await?;
        let packet_status = self.device.get_packet_status().await?;

        Ok(Some(Received {
            len,
            rssi: packet_status.rssi(),
            snr: packet_status.snr(),
        }))
    }

    /// Puts the modem to sleep, keeping its configuration.
    pub async fn sleep(&mut self) -> Result<(), SxError<SPIERR, PINERR>> {
        let config = SleepConfig {
            retain_ram: true,
            retain_buffer: false,
        };
        self.device.set_sleep(config).await
    }

    /// Wakes the modem after [`LoraRadio::sleep`].
    pub async fn wake(&mut self) -> Result<(), SxError<SPIERR, PINERR>> {
        self.device.wake().await?;
        self.device.set_standby(StandbyConfig::StbyRc).await
    }

    /// Access to the underlying device.
    pub fn device(&mut self) -> &mut SX128x<SPI, NRST, BUSY, DIO1, D> {
        &mut self.device
    }

    /// Consumes the radio and returns the device.
    pub fn release(self) -> SX128x<SPI, NRST, BUSY, DIO1, D> {
        self.device
    }

    /// Waits for DIO1, then reads and clears the IRQ flags.
    async fn wait_for_irq(&mut self) -> Result<IrqStatus, SxError<SPIERR, PINERR>> {
        self.device
            .wait_on_dio1(self.done_poll)
            .await
            .inspect_err(|err| log::warn!("Error waiting for dio1: {err:?}"))?;
        let irq_status = self.device.get_irq_status().await?;
        self.device.clear_irq_status(IrqMask::all()).await?;
        Ok(irq_status)
    }
}
