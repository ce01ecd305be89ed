//! LoRa modulation parameters.

/// LoRa spreading factor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LoRaSpreadFactor {
    SF5 = 0x50,
    SF6 = 0x60,
    SF7 = 0x70,
    SF8 = 0x80,
    SF9 = 0x90,
    SF10 = 0xA0,
    SF11 = 0xB0,
    SF12 = 0xC0,
}

impl LoRaSpreadFactor {
    /// Value of the SF-dependent demodulator register
    /// ([`Register::SfAdditionalConfig`](crate::reg::Register::SfAdditionalConfig)),
    /// written after every modulation change.
    pub const fn additional_config(self) -> u8 {
        match self {
            Self::SF5 | Self::SF6 => 0x1E,
            Self::SF7 | Self::SF8 => 0x37,
            _ => 0x32,
        }
    }
}

impl TryFrom<u8> for LoRaSpreadFactor {
    type Error = u8;

    /// Converts a plain spreading factor (5..=12).
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::SF5),
            6 => Ok(Self::SF6),
            7 => Ok(Self::SF7),
            8 => Ok(Self::SF8),
            9 => Ok(Self::SF9),
            10 => Ok(Self::SF10),
            11 => Ok(Self::SF11),
            12 => Ok(Self::SF12),
            other => Err(other),
        }
    }
}

/// LoRa bandwidth.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LoRaBandWidth {
    /// 203.125 kHz
    BW200 = 0x34,
    /// 406.25 kHz
    BW400 = 0x26,
    /// 812.5 kHz
    BW800 = 0x18,
    /// 1625 kHz
    BW1600 = 0x0A,
}

/// LoRa coding rate, with or without long interleaving.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LoraCodingRate {
    CR4_5 = 0x01,
    CR4_6 = 0x02,
    CR4_7 = 0x03,
    CR4_8 = 0x04,
    /// 4/5 with long interleaving.
    CrLi4_5 = 0x05,
    /// 4/6 with long interleaving.
    CrLi4_6 = 0x06,
    /// 4/8 with long interleaving.
    CrLi4_8 = 0x07,
}

/// A builder for LoRa modulation parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoraModParams {
    spread_factor: LoRaSpreadFactor,
    bandwidth: LoRaBandWidth,
    coding_rate: LoraCodingRate,
}

impl Default for LoraModParams {
    fn default() -> Self {
        Self {
            spread_factor: LoRaSpreadFactor::SF7,
            bandwidth: LoRaBandWidth::BW800,
            coding_rate: LoraCodingRate::CR4_5,
        }
    }
}

impl From<LoraModParams> for [u8; 3] {
    fn from(val: LoraModParams) -> Self {
        [
            val.spread_factor as u8,
            val.bandwidth as u8,
            val.coding_rate as u8,
        ]
    }
}

impl LoraModParams {
    /// Sets the spreading factor.
    pub fn set_spread_factor(mut self, spread_factor: LoRaSpreadFactor) -> Self {
        self.spread_factor = spread_factor;
        self
    }

    /// Sets the bandwidth.
    pub fn set_bandwidth(mut self, bandwidth: LoRaBandWidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Sets the coding rate.
    pub fn set_coding_rate(mut self, coding_rate: LoraCodingRate) -> Self {
        self.coding_rate = coding_rate;
        self
    }

    pub fn spread_factor(&self) -> LoRaSpreadFactor {
        self.spread_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_command_order() {
        let params = LoraModParams::default()
            .set_spread_factor(LoRaSpreadFactor::SF9)
            .set_bandwidth(LoRaBandWidth::BW1600)
            .set_coding_rate(LoraCodingRate::CrLi4_8);
        assert_eq!(<[u8; 3]>::from(params), [0x90, 0x0A, 0x07]);
    }

    #[test]
    fn additional_config_follows_spreading_factor() {
        assert_eq!(LoRaSpreadFactor::SF5.additional_config(), 0x1E);
        assert_eq!(LoRaSpreadFactor::SF6.additional_config(), 0x1E);
        assert_eq!(LoRaSpreadFactor::SF8.additional_config(), 0x37);
        assert_eq!(LoRaSpreadFactor::SF9.additional_config(), 0x32);
        assert_eq!(LoRaSpreadFactor::SF12.additional_config(), 0x32);
    }

    #[test]
    fn plain_spreading_factor() {
        assert_eq!(LoRaSpreadFactor::try_from(10), Ok(LoRaSpreadFactor::SF10));
        assert_eq!(LoRaSpreadFactor::try_from(4), Err(4));
    }
}
