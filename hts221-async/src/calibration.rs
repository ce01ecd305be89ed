//! Factory calibration and the conversion of raw samples.
//!
//! Every HTS221 stores two calibration points for humidity and two for
//! temperature in registers 0x30..0x3F. Raw ADC values are converted by
//! linear interpolation between those points.

/// Length of the calibration block.
pub const CALIBRATION_LEN: usize = 16;

/// The calibration table cannot be used for interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCalibration;

/// Interpolation points read from the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Relative humidity of the first point, in %RH.
    pub h0_rh: f32,
    /// Relative humidity of the second point, in %RH.
    pub h1_rh: f32,
    /// Raw humidity output at `h0_rh`.
    pub h0_out: i16,
    /// Raw humidity output at `h1_rh`.
    pub h1_out: i16,
    /// Temperature of the first point, in °C.
    pub t0_degc: f32,
    /// Temperature of the second point, in °C.
    pub t1_degc: f32,
    /// Raw temperature output at `t0_degc`.
    pub t0_out: i16,
    /// Raw temperature output at `t1_degc`.
    pub t1_out: i16,
}

impl Calibration {
    /// Parses the calibration block read from 0x30.
    pub fn from_bytes(raw: &[u8; CALIBRATION_LEN]) -> Result<Self, InvalidCalibration> {
        let le = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);

        let t0_x8 = u16::from(raw[2]) | (u16::from(raw[5] & 0x03) << 8);
        let t1_x8 = u16::from(raw[3]) | (u16::from(raw[5] & 0x0C) << 6);

        let calibration = Self {
            h0_rh: f32::from(raw[0]) / 2.0,
            h1_rh: f32::from(raw[1]) / 2.0,
            h0_out: le(6),
            h1_out: le(10),
            t0_degc: f32::from(t0_x8) / 8.0,
            t1_degc: f32::from(t1_x8) / 8.0,
            t0_out: le(12),
            t1_out: le(14),
        };

        if calibration.h0_out == calibration.h1_out || calibration.t0_out == calibration.t1_out {
            return Err(InvalidCalibration);
        }
        Ok(calibration)
    }

    /// Relative humidity in %RH, clamped to 0..=100.
    pub fn humidity(&self, raw: i16) -> f32 {
        let rh = interpolate(
            raw,
            (self.h0_out, self.h0_rh),
            (self.h1_out, self.h1_rh),
        );
        rh.clamp(0.0, 100.0)
    }

    /// Temperature in °C.
    pub fn temperature(&self, raw: i16) -> f32 {
        interpolate(
            raw,
            (self.t0_out, self.t0_degc),
            (self.t1_out, self.t1_degc),
        )
    }
}

fn interpolate(raw: i16, (x0, y0): (i16, f32), (x1, y1): (i16, f32)) -> f32 {
    let dx = f32::from(x1) - f32::from(x0);
    y0 + (y1 - y0) * (f32::from(raw) - f32::from(x0)) / dx
}
