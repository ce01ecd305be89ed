//! Text reports sent by a node, one per wake-up.

use core::fmt::{self, Display};

/// Temperature and humidity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReport {
    /// °C
    pub temperature: f32,
    /// %RH, `None` when the sensor only measured temperature.
    pub humidity: Option<f32>,
}

impl Display for ClimateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T={:.2} C", self.temperature)?;
        if let Some(humidity) = self.humidity {
            write!(f, " RH={humidity:.2} %")?;
        }
        Ok(())
    }
}

/// Acceleration in g, with the die temperature when available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionReport {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub temperature: Option<f32>,
}

impl Display for MotionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X={:.3} Y={:.3} Z={:.3} g", self.x, self.y, self.z)?;
        if let Some(temperature) = self.temperature {
            write!(f, " T={temperature:.1} C")?;
        }
        Ok(())
    }
}

/// Signal strength seen by the wake-up receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeReport {
    /// RSSI of channels 1 to 3, 0..=31.
    pub rssi: [u8; 3],
    /// False wake-ups counted by the receiver.
    pub false_wakeups: u8,
}

impl Display for WakeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [ch1, ch2, ch3] = self.rssi;
        write!(f, "WAKE RSSI={ch1}/{ch2}/{ch3} FALSE={}", self.false_wakeups)
    }
}

/// Link quality of a LoRa receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkReport {
    /// Packets received so far.
    pub packets: u32,
    /// dBm, `None` when nothing was received this round.
    pub rssi: Option<f32>,
    /// dB, `None` when nothing was received this round.
    pub snr: Option<f32>,
}

impl Display for LinkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PKT={}", self.packets)?;
        match (self.rssi, self.snr) {
            (Some(rssi), Some(snr)) => write!(f, " RSSI={rssi:.1} dBm SNR={snr:.1} dB"),
            _ => write!(f, " NO SIGNAL"),
        }
    }
}
