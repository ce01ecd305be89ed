//! Conversions between register values and physical units.

const TEMP_SPAN: f32 = 165.0;
const TEMP_OFFSET: f32 = 40.0;
const RH_SPAN: f32 = 100.0;

/// LSB of the temperature offset adjustment register, in °C.
pub const TEMP_OFFSET_LSB: f32 = 165.0 / 1024.0;
/// LSB of the humidity offset adjustment register, in %RH.
pub const RH_OFFSET_LSB: f32 = 100.0 / 512.0;

/// 16-bit temperature output to °C.
pub fn temperature(raw: u16) -> f32 {
    f32::from(raw) * TEMP_SPAN / 65536.0 - TEMP_OFFSET
}

/// 16-bit humidity output to %RH.
pub fn humidity(raw: u16) -> f32 {
    f32::from(raw) * RH_SPAN / 65536.0
}

/// 8-bit peak or threshold temperature to °C.
pub fn temperature_u8(raw: u8) -> f32 {
    f32::from(raw) * TEMP_SPAN / 256.0 - TEMP_OFFSET
}

/// 8-bit peak or threshold humidity to %RH.
pub fn humidity_u8(raw: u8) -> f32 {
    f32::from(raw) * RH_SPAN / 256.0
}

/// °C to an 8-bit threshold register value.
pub fn temperature_threshold(celsius: f32) -> u8 {
    saturate_u8((celsius + TEMP_OFFSET) * 256.0 / TEMP_SPAN)
}

/// %RH to an 8-bit threshold register value.
pub fn humidity_threshold(rh: f32) -> u8 {
    saturate_u8(rh * 256.0 / RH_SPAN)
}

/// An offset to the signed 8-bit adjustment register value.
pub fn offset(value: f32, lsb: f32) -> u8 {
    let steps = round(value / lsb).clamp(i8::MIN as i32, i8::MAX as i32);
    steps as i8 as u8
}

fn saturate_u8(value: f32) -> u8 {
    round(value).clamp(0, 255) as u8
}

fn round(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_bit_outputs() {
        assert_eq!(temperature(0x8000), 42.5);
        assert_eq!(temperature(0x0000), -40.0);
        assert_eq!(humidity(0x8000), 50.0);
    }

    #[test]
    fn eight_bit_registers() {
        assert_eq!(temperature_u8(0x80), 42.5);
        assert_eq!(humidity_u8(0x40), 25.0);
    }

    #[test]
    fn thresholds_invert_the_eight_bit_formula() {
        assert_eq!(temperature_threshold(42.5), 0x80);
        assert_eq!(temperature_threshold(1.25), 0x40);
        assert_eq!(humidity_threshold(75.0), 0xC0);
        assert_eq!(temperature_threshold(-60.0), 0x00);
        assert_eq!(humidity_threshold(150.0), 0xFF);
    }

    #[test]
    fn offsets_are_signed() {
        assert_eq!(offset(-1.0, TEMP_OFFSET_LSB), 0xFA);
        assert_eq!(offset(1.0, RH_OFFSET_LSB), 0x05);
        assert_eq!(offset(-100.0, TEMP_OFFSET_LSB), 0x80);
    }
}
