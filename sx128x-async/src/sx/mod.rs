//! The core implementation of the SX128x driver.

pub mod err;

use core::fmt::Debug;

use embassy_time::Duration;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{Operation, SpiDevice};
use sensor_bus_async::PollConfig;

use crate::conf::Config;
use crate::op::*;
use crate::reg::*;

pub use self::err::{PinError, SpiError, SxError};

type Pins<TNRST, TBUSY, TDIO1> = (TNRST, TBUSY, TDIO1);

const NOP: u8 = 0x00;

// --- Opcodes ---
const GET_STATUS: u8 = 0xC0;
const WRITE_REGISTER: u8 = 0x18;
const READ_REGISTER: u8 = 0x19;
const WRITE_BUFFER: u8 = 0x1A;
const READ_BUFFER: u8 = 0x1B;
const SET_SLEEP: u8 = 0x84;
const SET_STANDBY: u8 = 0x80;
const SET_FS: u8 = 0xC1;
const SET_TX: u8 = 0x83;
const SET_RX: u8 = 0x82;
const SET_RX_DUTY_CYCLE: u8 = 0x94;
const SET_CAD: u8 = 0xC5;
const SET_TX_CONTINUOUS_WAVE: u8 = 0xD1;
const SET_PACKET_TYPE: u8 = 0x8A;
const GET_PACKET_TYPE: u8 = 0x03;
const SET_RF_FREQUENCY: u8 = 0x86;
const SET_TX_PARAMS: u8 = 0x8E;
const SET_CAD_PARAMS: u8 = 0x88;
const SET_BUFFER_BASE_ADDRESS: u8 = 0x8F;
const SET_MODULATION_PARAMS: u8 = 0x8B;
const SET_PACKET_PARAMS: u8 = 0x8C;
const GET_RX_BUFFER_STATUS: u8 = 0x17;
const GET_PACKET_STATUS: u8 = 0x1D;
const GET_RSSI_INST: u8 = 0x1F;
const SET_DIO_IRQ_PARAMS: u8 = 0x8D;
const GET_IRQ_STATUS: u8 = 0x15;
const CLR_IRQ_STATUS: u8 = 0x97;
const SET_REGULATOR_MODE: u8 = 0x96;
const SET_AUTO_FS: u8 = 0x9E;

/// NRESET is held low this long.
const RESET_PULSE_US: u32 = 100;

/// Default BUSY wait: 10 ms in 10 µs steps.
pub const BUSY_POLL: PollConfig = PollConfig::new(1000, Duration::from_micros(10));

/// A wrapper around a Semtech SX1280/SX1281 LoRa modem.
pub struct SX128x<TSPI, TNRST, TBUSY, TDIO1, TDELAY> {
    spi: TSPI,
    nrst_pin: TNRST,
    busy_pin: TBUSY,
    dio1_pin: TDIO1,
    delay: TDELAY,
    busy_poll: PollConfig,
}

impl<TSPI, TNRST, TBUSY, TDIO1, TDELAY, TSPIERR, TPINERR> SX128x<TSPI, TNRST, TBUSY, TDIO1, TDELAY>
where
    TSPIERR: Debug,
    TPINERR: Debug,
    TSPI: SpiDevice<Error = TSPIERR>,
    TNRST: OutputPin<Error = TPINERR>,
    TBUSY: InputPin<Error = TPINERR>,
    TDIO1: InputPin<Error = TPINERR>,
    TDELAY: DelayNs,
{
    /// Creates a new `SX128x` driver instance.
    ///
    /// # Arguments
    ///
    /// * `spi` - An asynchronous SPI device.
    /// * `pins` - A tuple containing the required GPIO pins: (NRESET, BUSY, DIO1).
    /// * `delay` - Used for the reset pulse and for polling BUSY and DIO1.
    pub fn new(spi: TSPI, pins: Pins<TNRST, TBUSY, TDIO1>, delay: TDELAY) -> Self {
        let (nrst_pin, busy_pin, dio1_pin) = pins;
        Self {
            spi,
            nrst_pin,
            busy_pin,
            dio1_pin,
            delay,
            busy_poll: BUSY_POLL,
        }
    }

    /// Replaces the bound on waiting for BUSY to go low.
    pub fn with_busy_poll(mut self, busy_poll: PollConfig) -> Self {
        self.busy_poll = busy_poll;
        self
    }

    /// Resets and configures the modem for LoRa.
    pub async fn init(&mut self, conf: &Config) -> Result<(), SxError<TSPIERR, TPINERR>> {
        log::trace!("sx128x::init start");
        self.reset().await?;
        self.set_standby(StandbyConfig::StbyRc).await?;
        self.set_regulator_mode(conf.regulator).await?;
        self.set_packet_type(PacketType::LoRa).await?;
        log::trace!("sx128x::init packet type set");

        self.set_rf_frequency(conf.rf_frequency).await?;
        self.set_buffer_base_address(0x00, 0x00).await?;
        self.set_mod_params(conf.mod_params).await?;
        self.set_packet_params(conf.packet_params).await?;
        log::trace!("sx128x::init modem parameters set");

        self.set_tx_params(conf.tx_params).await?;
        self.set_dio_irq_params(
            conf.irq_mask,
            conf.dio1_irq_mask,
            conf.dio2_irq_mask,
            conf.dio3_irq_mask,
        )
        .await?;
        self.set_sync_word(conf.sync_word).await?;
        if conf.high_sensitivity {
            self.set_high_sensitivity(true).await?;
        }

        log::trace!("sx128x::init done. busy: {}, dio1: {}", self.is_busy(), self.is_dio1_high());
        Ok(())
    }

    /// Resets the device by pulsing the NRESET pin low, then waits for the
    /// boot to finish.
    pub async fn reset(&mut self) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.nrst_pin.set_low().map_err(PinError::Output)?;
        self.delay.delay_us(RESET_PULSE_US).await;
        self.nrst_pin.set_high().map_err(PinError::Output)?;
        self.wait_on_busy().await
    }

    /// Sends an opcode without parameters.
    async fn command(&mut self, opcode: u8) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        self.spi
            .write(&[opcode])
            .await
            .map_err(SpiError::Write)
            .map_err(Into::into)
    }

    /// Sends an opcode followed by its parameters in one transfer.
    async fn command_with(
        &mut self,
        opcode: u8,
        params: &[u8],
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        let opcode = [opcode];
        let mut ops = [Operation::Write(&opcode), Operation::Write(params)];
        self.spi
            .transaction(&mut ops)
            .await
            .map_err(SpiError::Write)
            .map_err(Into::into)
    }

    /// Sends an opcode followed by NOPs and returns all MISO bytes.
    async fn query<const N: usize>(
        &mut self,
        opcode: u8,
    ) -> Result<[u8; N], SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        let mut buf = [NOP; N];
        buf[0] = opcode;
        self.spi
            .transfer_in_place(&mut buf)
            .await
            .map_err(SpiError::Transfer)?;
        Ok(buf)
    }

    /// Gets the current status of the modem.
    pub async fn get_status(&mut self) -> Result<Status, SxError<TSPIERR, TPINERR>> {
        let result = self.query::<1>(GET_STATUS).await?;
        log::trace!("sx128x::get_status raw response: {result:?}");
        Ok(result[0].into())
    }

    /// Wakes the modem from sleep.
    ///
    /// Any falling edge of NSS wakes the chip, so a status request is sent
    /// without waiting for BUSY, which stays high while sleeping.
    pub async fn wake(&mut self) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.spi
            .write(&[GET_STATUS])
            .await
            .map_err(SpiError::Write)?;
        self.wait_on_busy().await
    }

    /// Puts the modem to sleep. BUSY stays high until [`SX128x::wake`].
    pub async fn set_sleep(&mut self, config: SleepConfig) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(SET_SLEEP, &[u8::from(config)]).await
    }

    /// Puts the modem in a specified standby mode.
    pub async fn set_standby(
        &mut self,
        standby_config: StandbyConfig,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(SET_STANDBY, &[standby_config as u8]).await
    }

    /// Sets the modem to frequency synthesis mode.
    pub async fn set_fs(&mut self) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command(SET_FS).await
    }

    /// Puts the device in TX mode. The payload must already be in the buffer.
    pub async fn set_tx(
        &mut self,
        timeout: RxTxTimeout,
    ) -> Result<Status, SxError<TSPIERR, TPINERR>> {
        self.set_rx_tx(SET_TX, timeout).await
    }

    /// Puts the device in RX mode.
    pub async fn set_rx(
        &mut self,
        timeout: RxTxTimeout,
    ) -> Result<Status, SxError<TSPIERR, TPINERR>> {
        self.set_rx_tx(SET_RX, timeout).await
    }

    async fn set_rx_tx(
        &mut self,
        opcode: u8,
        timeout: RxTxTimeout,
    ) -> Result<Status, SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        let timeout: [u8; 3] = timeout.into();
        let mut buf = [opcode, timeout[0], timeout[1], timeout[2]];
        self.spi
            .transfer_in_place(&mut buf)
            .await
            .map_err(SpiError::Transfer)?;
        Ok(buf[0].into())
    }

    /// Alternates between RX for `rx_count` and sleep for `sleep_count`
    /// periods until a packet is received.
    pub async fn set_rx_duty_cycle(
        &mut self,
        period_base: PeriodBase,
        rx_count: u16,
        sleep_count: u16,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let rx = rx_count.to_be_bytes();
        let sleep = sleep_count.to_be_bytes();
        let params = [period_base as u8, rx[0], rx[1], sleep[0], sleep[1]];
        self.command_with(SET_RX_DUTY_CYCLE, &params).await
    }

    /// Starts a channel activity detection. Ends with `CadDone`.
    pub async fn set_cad(&mut self) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command(SET_CAD).await
    }

    /// Sets how many symbols a CAD listens for.
    pub async fn set_cad_params(
        &mut self,
        symbols: CadSymbols,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(SET_CAD_PARAMS, &[symbols as u8]).await
    }

    /// Transmits an unmodulated carrier, for test purposes.
    pub async fn set_tx_continuous_wave(&mut self) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command(SET_TX_CONTINUOUS_WAVE).await
    }

    /// Sets the modem packet type.
    pub async fn set_packet_type(
        &mut self,
        packet_type: PacketType,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(SET_PACKET_TYPE, &[packet_type as u8]).await
    }

    /// Reads back the packet type, `None` for an unknown value.
    pub async fn get_packet_type(
        &mut self,
    ) -> Result<Option<PacketType>, SxError<TSPIERR, TPINERR>> {
        let result = self.query::<3>(GET_PACKET_TYPE).await?;
        Ok(PacketType::try_from(result[2]).ok())
    }

    /// Sets the RF frequency in Hz.
    pub async fn set_rf_frequency(
        &mut self,
        frequency_hz: u32,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let word = rf_frequency_word(frequency_hz).to_be_bytes();
        self.command_with(SET_RF_FREQUENCY, &word[1..]).await
    }

    /// Sets the TX parameters (output power, ramp time).
    pub async fn set_tx_params(
        &mut self,
        params: TxParams,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let params: [u8; 2] = params.into();
        self.command_with(SET_TX_PARAMS, &params).await
    }

    /// Sets where TX and RX payloads start in the 256-byte data buffer.
    pub async fn set_buffer_base_address(
        &mut self,
        tx_base_addr: u8,
        rx_base_addr: u8,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(SET_BUFFER_BASE_ADDRESS, &[tx_base_addr, rx_base_addr])
            .await
    }

    /// Sets the modulation parameters, followed by the spreading-factor
    /// dependent register settings the modem needs after every change.
    pub async fn set_mod_params(
        &mut self,
        params: LoraModParams,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let raw: [u8; 3] = params.into();
        self.command_with(SET_MODULATION_PARAMS, &raw).await?;
        self.write_register(
            Register::SfAdditionalConfig,
            &[params.spread_factor().additional_config()],
        )
        .await?;
        self.write_register(Register::FreqErrorCorrection, &[FREQ_ERROR_CORRECTION])
            .await
    }

    /// Sets the packet parameters.
    pub async fn set_packet_params(
        &mut self,
        params: LoRaPacketParams,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let params: [u8; 7] = params.into();
        self.command_with(SET_PACKET_PARAMS, &params).await
    }

    /// Gets the length and start pointer of the last received packet.
    pub async fn get_rx_buffer_status(
        &mut self,
    ) -> Result<RxBufferStatus, SxError<TSPIERR, TPINERR>> {
        let result = self.query::<4>(GET_RX_BUFFER_STATUS).await?;
        log::trace!("sx128x::get_rx_buffer_status raw response: {result:?}");
        Ok([result[2], result[3]].into())
    }

    /// Gets the status of the last received packet (RSSI, SNR).
    pub async fn get_packet_status(&mut self) -> Result<PacketStatus, SxError<TSPIERR, TPINERR>> {
        let result = self.query::<7>(GET_PACKET_STATUS).await?;
        Ok([result[2], result[3]].into())
    }

    /// Instantaneous RSSI in dBm, valid in RX mode.
    pub async fn get_rssi_inst(&mut self) -> Result<f32, SxError<TSPIERR, TPINERR>> {
        let result = self.query::<3>(GET_RSSI_INST).await?;
        Ok(-f32::from(result[2]) / 2.0)
    }

    /// Configures which interrupts are raised, and on which DIO pins.
    pub async fn set_dio_irq_params(
        &mut self,
        irq_mask: IrqMask,
        dio1_mask: IrqMask,
        dio2_mask: IrqMask,
        dio3_mask: IrqMask,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let mut params = [0u8; 8];
        for (chunk, mask) in params
            .chunks_exact_mut(2)
            .zip([irq_mask, dio1_mask, dio2_mask, dio3_mask])
        {
            chunk.copy_from_slice(&u16::from(mask).to_be_bytes());
        }
        self.command_with(SET_DIO_IRQ_PARAMS, &params).await
    }

    /// Gets the current IRQ status.
    pub async fn get_irq_status(&mut self) -> Result<IrqStatus, SxError<TSPIERR, TPINERR>> {
        let result = self.query::<4>(GET_IRQ_STATUS).await?;
        Ok(u16::from_be_bytes([result[2], result[3]]).into())
    }

    /// Clears the specified IRQ status flags.
    pub async fn clear_irq_status(
        &mut self,
        mask: IrqMask,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(CLR_IRQ_STATUS, &u16::from(mask).to_be_bytes())
            .await
    }

    /// Selects the LDO or the DC-DC converter.
    pub async fn set_regulator_mode(
        &mut self,
        mode: RegulatorMode,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(SET_REGULATOR_MODE, &[mode as u8]).await
    }

    /// Makes the modem return to FS instead of standby after TX or RX.
    pub async fn set_auto_fs(&mut self, enabled: bool) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.command_with(SET_AUTO_FS, &[u8::from(enabled)]).await
    }

    /// Writes data to consecutive registers.
    pub async fn write_register(
        &mut self,
        register: Register,
        data: &[u8],
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        let addr = u16::from(register).to_be_bytes();
        let header = [WRITE_REGISTER, addr[0], addr[1]];
        let mut ops = [Operation::Write(&header), Operation::Write(data)];
        self.spi
            .transaction(&mut ops)
            .await
            .map_err(SpiError::Write)?;
        Ok(())
    }

    /// Reads data from consecutive registers.
    pub async fn read_register(
        &mut self,
        register: Register,
        result: &mut [u8],
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        let addr = u16::from(register).to_be_bytes();
        let header = [READ_REGISTER, addr[0], addr[1], NOP];
        let mut ops = [Operation::Write(&header), Operation::Read(result)];
        self.spi
            .transaction(&mut ops)
            .await
            .map_err(SpiError::Transfer)?;
        Ok(())
    }

    /// Read-modify-write of a single register.
    async fn modify_register<F>(
        &mut self,
        register: Register,
        f: F,
    ) -> Result<(), SxError<TSPIERR, TPINERR>>
    where
        F: FnOnce(u8) -> u8,
    {
        let mut value = [0u8];
        self.read_register(register, &mut value).await?;
        self.write_register(register, &[f(value[0])]).await
    }

    /// Writes data to the modem's buffer at a given offset.
    pub async fn write_buffer(
        &mut self,
        offset: u8,
        data: &[u8],
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        let header = [WRITE_BUFFER, offset];
        let mut ops = [Operation::Write(&header), Operation::Write(data)];
        self.spi
            .transaction(&mut ops)
            .await
            .map_err(SpiError::Write)
            .map_err(Into::into)
    }

    /// Reads data from the modem's buffer at a given offset.
    pub async fn read_buffer(
        &mut self,
        offset: u8,
        result: &mut [u8],
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.wait_on_busy().await?;
        let header = [READ_BUFFER, offset, NOP];
        let mut ops = [Operation::Write(&header), Operation::Read(result)];
        self.spi
            .transaction(&mut ops)
            .await
            .map_err(SpiError::Transfer)
            .map_err(Into::into)
    }

    /// Reads the firmware version register.
    pub async fn firmware_version(&mut self) -> Result<u16, SxError<TSPIERR, TPINERR>> {
        let mut version = [0u8; 2];
        self.read_register(Register::FirmwareVersion, &mut version)
            .await?;
        Ok(u16::from_be_bytes(version))
    }

    /// Sets the LoRa sync word. Use `0x12` for private and `0x34` for
    /// public networks.
    ///
    /// Each nibble goes into the upper half of its own register, the lower
    /// halves are preserved.
    pub async fn set_sync_word(&mut self, sync_word: u8) -> Result<(), SxError<TSPIERR, TPINERR>> {
        self.modify_register(Register::LoRaSyncWordMsb, |old| {
            (old & !SYNC_WORD_NIBBLE_MASK) | (sync_word & SYNC_WORD_NIBBLE_MASK)
        })
        .await?;
        self.modify_register(Register::LoRaSyncWordLsb, |old| {
            (old & !SYNC_WORD_NIBBLE_MASK) | (sync_word << 4)
        })
        .await
    }

    /// Switches the LNA between the default and the high-sensitivity mode.
    pub async fn set_high_sensitivity(
        &mut self,
        enabled: bool,
    ) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let mode = if enabled { RX_GAIN_HIGH_SENSITIVITY } else { 0 };
        self.modify_register(Register::RxGain, |old| (old & !RX_GAIN_MODE_MASK) | mode)
            .await
    }

    /// Checks if the modem's BUSY pin is high.
    pub fn is_busy(&mut self) -> bool {
        self.busy_pin.is_high().unwrap_or(true)
    }

    /// Checks if the modem's DIO1 pin is high.
    pub fn is_dio1_high(&mut self) -> bool {
        self.dio1_pin.is_high().unwrap_or(false)
    }

    /// Waits until the BUSY pin goes low, or fails with [`SxError::Busy`].
    pub async fn wait_on_busy(&mut self) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let mut poller = self.busy_poll.start();
        while self.busy_pin.is_high().map_err(PinError::Input)? {
            if poller.wait(&mut self.delay).await.is_err() {
                log::warn!("sx128x: BUSY stuck high");
                return Err(SxError::Busy);
            }
        }
        Ok(())
    }

    /// Waits until the DIO1 pin goes high, or fails with [`SxError::Timeout`].
    pub async fn wait_on_dio1(&mut self, poll: PollConfig) -> Result<(), SxError<TSPIERR, TPINERR>> {
        let mut poller = poll.start();
        while !self.dio1_pin.is_high().map_err(PinError::Input)? {
            poller
                .wait(&mut self.delay)
                .await
                .map_err(|_| SxError::Timeout)?;
        }
        Ok(())
    }

    /// Releases the SPI device, the pins and the delay.
    pub fn release(self) -> (TSPI, Pins<TNRST, TBUSY, TDIO1>, TDELAY) {
        (
            self.spi,
            (self.nrst_pin, self.busy_pin, self.dio1_pin),
            self.delay,
        )
    }
}
