use sensor_bus_async::PollConfig;

/// Number of internal humidity samples averaged per output value (AVGH).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HumidityAverage {
    X4 = 0,
    X8 = 1,
    X16 = 2,
    #[default]
    X32 = 3,
    X64 = 4,
    X128 = 5,
    X256 = 6,
    X512 = 7,
}

/// Number of internal temperature samples averaged per output value (AVGT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureAverage {
    X2 = 0,
    X4 = 1,
    X8 = 2,
    #[default]
    X16 = 3,
    X32 = 4,
    X64 = 5,
    X128 = 6,
    X256 = 7,
}

/// Output data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputDataRate {
    /// Conversions run only when triggered.
    #[default]
    OneShot = 0,
    Hz1 = 1,
    Hz7 = 2,
    Hz12_5 = 3,
}

/// Behaviour of the DRDY pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataReadyPin {
    /// Signal data-ready on the pin.
    pub enabled: bool,
    /// Drive the pin low on data-ready.
    pub active_low: bool,
    /// Open-drain output instead of push-pull.
    pub open_drain: bool,
}

impl From<DataReadyPin> for u8 {
    fn from(pin: DataReadyPin) -> Self {
        (u8::from(pin.active_low) << 7) | (u8::from(pin.open_drain) << 6) | (u8::from(pin.enabled) << 2)
    }
}

/// Sensor configuration applied by `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub humidity_average: HumidityAverage,
    pub temperature_average: TemperatureAverage,
    pub data_rate: OutputDataRate,
    /// Output registers are not updated until both bytes were read.
    pub block_data_update: bool,
    pub data_ready: DataReadyPin,
    /// Bound of the data-ready and reboot waits.
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            humidity_average: HumidityAverage::default(),
            temperature_average: TemperatureAverage::default(),
            data_rate: OutputDataRate::default(),
            block_data_update: true,
            data_ready: DataReadyPin::default(),
            poll: PollConfig::default(),
        }
    }
}

impl Config {
    pub fn set_humidity_average(mut self, average: HumidityAverage) -> Self {
        self.humidity_average = average;
        self
    }

    pub fn set_temperature_average(mut self, average: TemperatureAverage) -> Self {
        self.temperature_average = average;
        self
    }

    pub fn set_data_rate(mut self, data_rate: OutputDataRate) -> Self {
        self.data_rate = data_rate;
        self
    }

    pub fn set_block_data_update(mut self, enabled: bool) -> Self {
        self.block_data_update = enabled;
        self
    }

    pub fn set_data_ready(mut self, data_ready: DataReadyPin) -> Self {
        self.data_ready = data_ready;
        self
    }

    pub fn set_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// AV_CONF register value.
    pub(crate) fn av_conf(&self) -> u8 {
        ((self.temperature_average as u8) << 3) | self.humidity_average as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_averaging_matches_reset_value() {
        assert_eq!(Config::default().av_conf(), 0x1B);
    }

    #[test]
    fn data_ready_pin_bits() {
        let pin = DataReadyPin {
            enabled: true,
            active_low: true,
            open_drain: false,
        };
        assert_eq!(u8::from(pin), 0x84);
    }
}
