//! An asynchronous, `no_std` driver for the ams AS3933 3-channel
//! low-frequency wake-up receiver.
//!
//! The AS3933 uses SPI mode 1 with an active-high chip select. The two MSBs
//! of the first byte select the access mode (write, read, direct command),
//! see [`sensor_bus_async::ModeBits`]. When sharing a bus, create the device
//! with [`ChipSelect::ActiveHigh`](sensor_bus_async::spi::ChipSelect).
//!
//! # Usage
//!
//! ```ignore
//! let spi = SharedSpiDevice::with_polarity(bus, cs, Delay, ChipSelect::ActiveHigh)?;
//! let mut rx = As3933::new(spi, Delay, Config::default().set_pattern(0x96A5));
//! rx.init().await?;
//! // after the WAKE pin went high:
//! let rssi = rx.rssi().await?;
//! rx.clear_wake().await?;
//! ```

#![no_std]

pub mod config;
pub mod register;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;
use log::{debug, trace, warn};
use sensor_bus_async::{ModeBits, SpiRegisters};

pub use config::{
    Agc, Band, Channel, Channels, ClockSource, Config, DamperResistor, GainReduction,
    ListeningMode, OffTime, PatternLength, Slicer, Tolerance, WakeUpMode,
};
pub use register::DirectCommand;
use register::*;

/// Errors returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// SPI bus error.
    Bus(E),
    /// The RC oscillator calibration reported failure.
    Calibration,
    /// A calibration did not finish in time.
    Timeout,
    /// A configuration value does not fit its register field.
    InvalidConfig,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// Received signal strength per channel, 0..=31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rssi {
    pub ch1: u8,
    pub ch2: u8,
    pub ch3: u8,
}

impl Rssi {
    /// Strongest channel and its RSSI.
    pub fn strongest(&self) -> (Channel, u8) {
        [
            (Channel::Ch1, self.ch1),
            (Channel::Ch2, self.ch2),
            (Channel::Ch3, self.ch3),
        ]
        .into_iter()
        .fold((Channel::Ch1, 0), |best, (ch, rssi)| {
            if rssi > best.1 {
                (ch, rssi)
            } else {
                best
            }
        })
    }
}

/// AS3933 driver.
pub struct As3933<SPI, D> {
    regs: SpiRegisters<SPI, ModeBits>,
    delay: D,
    config: Config,
}

impl<SPI, D> As3933<SPI, D>
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

    /// Restores the defaults, writes the configuration and calibrates the
    /// RC oscillator when it is the clock source.
    pub async fn init(&mut self) -> Result<(), Error<SPI::Error>> {
        if !self.config.is_valid() {
            warn!("AS3933: invalid configuration {:?}", self.config);
            return Err(Error::InvalidConfig);
        }
        let values = self.config.registers();

        self.command(DirectCommand::PresetDefault).await?;
        self.regs.write(R0, &values.front).await?;
        self.set_wakeup_pattern(self.config.pattern).await?;
        self.regs.write(R7, &values.timing).await?;
        self.regs.write_u8(R16, values.r16).await?;
        self.regs.write(R17, &values.tuning).await?;
        trace!("AS3933: configured {values:?}");

        if self.config.clock == ClockSource::RcOscillator {
            self.calibrate_rc_oscillator().await?;
        }
        self.clear_wake().await
    }

    pub async fn read_register(&mut self, register: u8) -> Result<u8, Error<SPI::Error>> {
        Ok(self.regs.read_u8(register).await?)
    }

    pub async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<SPI::Error>> {
        self.regs.write_u8(register, value).await?;
        Ok(())
    }

    /// Sends a direct command.
    pub async fn command(&mut self, command: DirectCommand) -> Result<(), Error<SPI::Error>> {
        trace!("AS3933: {command:?}");
        self.regs
            .bus()
            .write(&[ModeBits::command(command as u8)])
            .await?;
        Ok(())
    }

    /// Returns to listening mode after a wake-up.
    pub async fn clear_wake(&mut self) -> Result<(), Error<SPI::Error>> {
        self.command(DirectCommand::ClearWake).await
    }

    pub async fn reset_rssi(&mut self) -> Result<(), Error<SPI::Error>> {
        self.command(DirectCommand::ResetRssi).await
    }

    pub async fn clear_false_wakeups(&mut self) -> Result<(), Error<SPI::Error>> {
        self.command(DirectCommand::ClearFalse).await
    }

    /// Wake-ups by a carrier that did not carry the pattern.
    pub async fn false_wakeups(&mut self) -> Result<u8, Error<SPI::Error>> {
        self.read_register(R13).await
    }

    pub async fn rssi(&mut self) -> Result<Rssi, Error<SPI::Error>> {
        let mut buf = [0u8; 3];
        self.regs.read(R10, &mut buf).await?;
        let rssi = Rssi {
            ch1: buf[0] & RSSI_MASK,
            ch3: buf[1] & RSSI_MASK,
            ch2: buf[2] & RSSI_MASK,
        };
        debug!("AS3933: {rssi:?}");
        Ok(rssi)
    }

    /// Programs the 16-bit wake-up pattern; TS1 is the high byte.
    pub async fn set_wakeup_pattern(&mut self, pattern: u16) -> Result<(), Error<SPI::Error>> {
        let [ts1, ts2] = pattern.to_be_bytes();
        self.regs.write(R5, &[ts2, ts1]).await?;
        self.config.pattern = pattern;
        Ok(())
    }

    pub async fn set_channels(&mut self, channels: Channels) -> Result<(), Error<SPI::Error>> {
        if channels.bits() == 0 {
            return Err(Error::InvalidConfig);
        }
        self.regs
            .update_bits(R0, CHANNELS_MASK, channels.bits())
            .await?;
        self.config.channels = channels;
        Ok(())
    }

    /// Sets the tuning capacitance of one channel, 0..=31 pF.
    pub async fn set_tuning_capacitance(
        &mut self,
        channel: Channel,
        pf: u8,
    ) -> Result<(), Error<SPI::Error>> {
        if pf > MAX_5BIT {
            return Err(Error::InvalidConfig);
        }
        self.regs.write_u8(R17 + channel as u8, pf).await?;
        self.config.tuning[channel as usize] = pf;
        Ok(())
    }

    /// Calibrates the RC oscillator and waits for RC_CAL_OK or RC_CAL_KO.
    /// Returns the oscillator taps.
    pub async fn calibrate_rc_oscillator(&mut self) -> Result<u8, Error<SPI::Error>> {
        self.command(DirectCommand::CalibrateRcOscillator).await?;
        let mut poller = self.config.poll.start();
        loop {
            let r14 = self.read_register(R14).await?;
            if r14 & RC_CAL_KO != 0 {
                warn!("AS3933: RC oscillator calibration failed");
                return Err(Error::Calibration);
            }
            if r14 & RC_CAL_OK != 0 {
                let taps = r14 & RC_OSC_TAPS_MASK;
                debug!("AS3933: RC oscillator calibrated, taps {taps}");
                return Ok(taps);
            }
            poller
                .wait(&mut self.delay)
                .await
                .map_err(|_| Error::Timeout)?;
        }
    }

    /// Routes the LC resonator of `channel` to the DAT pin for antenna
    /// tuning, with the clock generator disabled. `None` restores normal
    /// operation.
    pub async fn route_lc_oscillator(
        &mut self,
        channel: Option<Channel>,
    ) -> Result<(), Error<SPI::Error>> {
        let value = match channel {
            Some(ch) => CLOCK_GEN_DIS | (1 << ch as u8),
            None => 0,
        };
        self.regs
            .update_bits(R16, CLOCK_GEN_DIS | LC_TO_DAT_MASK, value)
            .await?;
        Ok(())
    }

    pub fn release(self) -> (SPI, D) {
        (self.regs.release(), self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strongest_channel() {
        let rssi = Rssi {
            ch1: 4,
            ch2: 17,
            ch3: 9,
        };
        assert_eq!(rssi.strongest(), (Channel::Ch2, 17));
        assert_eq!(Rssi::default().strongest(), (Channel::Ch1, 0));
    }
}
