use sensor_bus_async::PollConfig;

use crate::register::*;

/// Digital low-pass filter type (DSP_LP_TYPE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    Fir,
    Iir,
}

/// Low-pass filter bandwidth (DSP_BW_SEL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bandwidth {
    #[default]
    Hz440,
    Hz235,
}

/// Self-test excitation (ST bits of CTRL_REG4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfTest {
    #[default]
    Off = 0,
    Positive = 1,
    Negative = 2,
}

/// FIFO operating mode (FMODE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FifoMode {
    #[default]
    Bypass = 0b000,
    Fifo = 0b001,
    ContinuousToFifo = 0b011,
    BypassToContinuous = 0b100,
    Continuous = 0b110,
}

/// FIFO mode and watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FifoConfig {
    pub mode: FifoMode,
    /// Watermark level, 0..=31.
    pub threshold: u8,
    /// Enables the high-speed SPI FIFO read mode.
    pub high_speed_spi: bool,
}

impl From<FifoConfig> for u8 {
    fn from(fifo: FifoConfig) -> Self {
        ((fifo.mode as u8) << FMODE_SHIFT) | (fifo.threshold & FTH_MASK)
    }
}

/// Events routed to an interrupt pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptRouting {
    pub data_ready: bool,
    pub boot: bool,
    pub fifo_overrun: bool,
    pub fifo_full: bool,
    pub fifo_threshold: bool,
}

impl From<InterruptRouting> for u8 {
    fn from(routing: InterruptRouting) -> Self {
        [
            (routing.data_ready, INT_DRDY),
            (routing.boot, INT_BOOT),
            (routing.fifo_overrun, INT_OVR),
            (routing.fifo_full, INT_FSS5),
            (routing.fifo_threshold, INT_FTH),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, bit)| acc | bit)
    }
}

/// Sensor configuration applied by `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub block_data_update: bool,
    /// DRDY is a pulse instead of a latched level.
    pub pulsed_data_ready: bool,
    pub filter: FilterType,
    pub bandwidth: Bandwidth,
    pub int1: InterruptRouting,
    pub int2: InterruptRouting,
    pub int1_open_drain: bool,
    pub int2_open_drain: bool,
    /// `None` keeps the FIFO disabled.
    pub fifo: Option<FifoConfig>,
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_data_update: true,
            pulsed_data_ready: false,
            filter: FilterType::default(),
            bandwidth: Bandwidth::default(),
            int1: InterruptRouting::default(),
            int2: InterruptRouting::default(),
            int1_open_drain: false,
            int2_open_drain: false,
            fifo: None,
            poll: PollConfig::default(),
        }
    }
}

impl Config {
    pub fn set_block_data_update(mut self, enabled: bool) -> Self {
        self.block_data_update = enabled;
        self
    }

    pub fn set_pulsed_data_ready(mut self, pulsed: bool) -> Self {
        self.pulsed_data_ready = pulsed;
        self
    }

    pub fn set_filter(mut self, filter: FilterType, bandwidth: Bandwidth) -> Self {
        self.filter = filter;
        self.bandwidth = bandwidth;
        self
    }

    pub fn set_int1(mut self, routing: InterruptRouting, open_drain: bool) -> Self {
        self.int1 = routing;
        self.int1_open_drain = open_drain;
        self
    }

    pub fn set_int2(mut self, routing: InterruptRouting, open_drain: bool) -> Self {
        self.int2 = routing;
        self.int2_open_drain = open_drain;
        self
    }

    pub fn set_fifo(mut self, fifo: Option<FifoConfig>) -> Self {
        self.fifo = fifo;
        self
    }

    pub fn set_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub(crate) fn ctrl_reg1(&self) -> u8 {
        let mut value = NORM_MOD_EN | IF_ADD_INC;
        if self.pulsed_data_ready {
            value |= DRDY_PULSE;
        }
        if self.block_data_update {
            value |= BDU;
        }
        value
    }

    pub(crate) fn ctrl_reg4(&self) -> u8 {
        let mut value = CTRL4_ONE;
        if self.filter == FilterType::Iir {
            value |= DSP_LP_TYPE;
        }
        if self.bandwidth == Bandwidth::Hz235 {
            value |= DSP_BW_SEL;
        }
        if self.int2_open_drain {
            value |= PP_OD_INT2;
        }
        if self.int1_open_drain {
            value |= PP_OD_INT1;
        }
        if self.fifo.is_some() {
            value |= FIFO_EN;
        }
        value
    }

    pub(crate) fn ctrl_reg5(&self) -> u8 {
        match self.fifo {
            Some(fifo) if fifo.high_speed_spi => FIFO_SPI_HS_ON,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_ctrl4_bit_is_always_set() {
        assert_eq!(Config::default().ctrl_reg4(), 0x01);
        let config = Config::default()
            .set_filter(FilterType::Iir, Bandwidth::Hz235)
            .set_fifo(Some(FifoConfig::default()));
        assert_eq!(config.ctrl_reg4(), 0xC3);
    }

    #[test]
    fn fifo_control_packs_mode_and_threshold() {
        let fifo = FifoConfig {
            mode: FifoMode::Continuous,
            threshold: 40,
            high_speed_spi: false,
        };
        assert_eq!(u8::from(fifo), 0b1100_1000);
    }

    #[test]
    fn interrupt_routing_bits() {
        let routing = InterruptRouting {
            data_ready: true,
            fifo_threshold: true,
            ..Default::default()
        };
        assert_eq!(u8::from(routing), 0x88);
    }
}
