//! Packet type and LoRa packet parameters.

/// The packet type used by the modem. Only LoRa is configured by this crate.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PacketType {
    Gfsk = 0x00,
    LoRa = 0x01,
    Ranging = 0x02,
    Flrc = 0x03,
    Ble = 0x04,
}

impl TryFrom<u8> for PacketType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Gfsk),
            0x01 => Ok(Self::LoRa),
            0x02 => Ok(Self::Ranging),
            0x03 => Ok(Self::Flrc),
            0x04 => Ok(Self::Ble),
            other => Err(other),
        }
    }
}

/// LoRa preamble length, encoded as `mantissa * 2^exponent` symbols.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PreambleLength {
    mantissa: u8,
    exponent: u8,
}

impl PreambleLength {
    /// The shortest encodable length of at least `symbols` symbols.
    pub const fn from_symbols(symbols: u32) -> Self {
        let mut mantissa = if symbols == 0 { 1 } else { symbols };
        let mut exponent = 0u8;
        while mantissa > 15 && exponent < 15 {
            mantissa = mantissa.div_ceil(2);
            exponent += 1;
        }
        if mantissa > 15 {
            mantissa = 15;
        }
        Self {
            mantissa: mantissa as u8,
            exponent,
        }
    }

    /// Length in symbols.
    pub const fn symbols(self) -> u32 {
        (self.mantissa as u32) << self.exponent
    }
}

impl Default for PreambleLength {
    fn default() -> Self {
        Self::from_symbols(12)
    }
}

impl From<PreambleLength> for u8 {
    fn from(val: PreambleLength) -> Self {
        (val.exponent << 4) | val.mantissa
    }
}

/// LoRa header type.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoRaHeaderType {
    /// Variable length packet (explicit header).
    Explicit = 0x00,
    /// Fixed length packet (implicit header).
    Implicit = 0x80,
}

/// LoRa CRC (Cyclic Redundancy Check) type.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoRaCrcType {
    /// CRC disabled.
    CrcOff = 0x00,
    /// CRC enabled.
    CrcOn = 0x20,
}

/// LoRa IQ (In-phase/Quadrature) inversion setting.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoRaInvertIq {
    /// Standard IQ setup.
    Standard = 0x40,
    /// Inverted IQ setup.
    Inverted = 0x00,
}

/// A builder for LoRa packet parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoRaPacketParams {
    /// Preamble length.
    pub preamble_len: PreambleLength,
    /// Header type (variable or fixed length).
    pub header_type: LoRaHeaderType,
    /// Size of the payload in bytes.
    pub payload_len: u8,
    /// CRC type (on or off).
    pub crc_type: LoRaCrcType,
    /// Invert IQ setting.
    pub invert_iq: LoRaInvertIq,
}

impl From<LoRaPacketParams> for [u8; 7] {
    fn from(val: LoRaPacketParams) -> Self {
        [
            val.preamble_len.into(),
            val.header_type as u8,
            val.payload_len,
            val.crc_type as u8,
            val.invert_iq as u8,
            0x00,
            0x00,
        ]
    }
}

impl Default for LoRaPacketParams {
    fn default() -> Self {
        Self {
            preamble_len: PreambleLength::default(),
            header_type: LoRaHeaderType::Explicit,
            payload_len: 0xFF,
            crc_type: LoRaCrcType::CrcOn,
            invert_iq: LoRaInvertIq::Standard,
        }
    }
}

impl LoRaPacketParams {
    /// Sets the preamble length.
    pub fn set_preamble_len(mut self, preamble_len: PreambleLength) -> Self {
        self.preamble_len = preamble_len;
        self
    }

    /// Sets the header type.
    pub fn set_header_type(mut self, header_type: LoRaHeaderType) -> Self {
        self.header_type = header_type;
        self
    }

    /// Sets the payload length.
    pub fn set_payload_len(mut self, payload_len: u8) -> Self {
        self.payload_len = payload_len;
        self
    }

    /// Sets the CRC type.
    pub fn set_crc_type(mut self, crc_type: LoRaCrcType) -> Self {
        self.crc_type = crc_type;
        self
    }

    /// Sets the IQ inversion mode.
    pub fn set_invert_iq(mut self, invert_iq: LoRaInvertIq) -> Self {
        self.invert_iq = invert_iq;
        self
    }
}
