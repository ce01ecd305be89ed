//! Status byte and response structures.

/// Chip mode, bits 7:5 of the status byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CircuitMode {
    StbyRc,
    StbyXosc,
    Fs,
    Rx,
    Tx,
}

/// Outcome of the last command, bits 4:2 of the status byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command was processed.
    Processed,
    /// A packet was received and is waiting in the buffer.
    DataAvailable,
    /// The command timed out.
    Timeout,
    /// The opcode or its parameters were invalid.
    ProcessingError,
    /// The command could not be executed.
    Failure,
    /// A transmission finished.
    TxDone,
}

/// The status byte returned as the first MISO byte of every command.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Status {
    inner: u8,
}

impl From<u8> for Status {
    fn from(status: u8) -> Self {
        Self { inner: status }
    }
}

impl From<Status> for u8 {
    fn from(val: Status) -> Self {
        val.inner
    }
}

impl Status {
    /// The chip mode, or `None` for reserved values.
    pub fn circuit_mode(self) -> Option<CircuitMode> {
        match (self.inner >> 5) & 0x07 {
            0x2 => Some(CircuitMode::StbyRc),
            0x3 => Some(CircuitMode::StbyXosc),
            0x4 => Some(CircuitMode::Fs),
            0x5 => Some(CircuitMode::Rx),
            0x6 => Some(CircuitMode::Tx),
            _ => None,
        }
    }

    /// The outcome of the last command, or `None` for reserved values.
    pub fn command_status(self) -> Option<CommandStatus> {
        match (self.inner >> 2) & 0x07 {
            0x1 => Some(CommandStatus::Processed),
            0x2 => Some(CommandStatus::DataAvailable),
            0x3 => Some(CommandStatus::Timeout),
            0x4 => Some(CommandStatus::ProcessingError),
            0x5 => Some(CommandStatus::Failure),
            0x6 => Some(CommandStatus::TxDone),
            _ => None,
        }
    }
}

impl core::fmt::Debug for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Status")
            .field("circuit_mode", &self.circuit_mode())
            .field("command_status", &self.command_status())
            .finish()
    }
}

/// Length and position of the last received payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RxBufferStatus {
    payload_length_rx: u8,
    rx_start_buffer_pointer: u8,
}

impl From<[u8; 2]> for RxBufferStatus {
    fn from(raw: [u8; 2]) -> Self {
        Self {
            payload_length_rx: raw[0],
            rx_start_buffer_pointer: raw[1],
        }
    }
}

impl RxBufferStatus {
    pub fn payload_length_rx(self) -> u8 {
        self.payload_length_rx
    }

    pub fn rx_start_buffer_pointer(self) -> u8 {
        self.rx_start_buffer_pointer
    }
}

/// Signal quality of the last received LoRa packet.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PacketStatus {
    rssi_sync: u8,
    snr: i8,
}

impl From<[u8; 2]> for PacketStatus {
    fn from(raw: [u8; 2]) -> Self {
        Self {
            rssi_sync: raw[0],
            snr: raw[1] as i8,
        }
    }
}

impl PacketStatus {
    /// RSSI at sync word detection in dBm.
    pub fn rssi(self) -> f32 {
        -f32::from(self.rssi_sync) / 2.0
    }

    /// Signal-to-noise ratio in dB.
    pub fn snr(self) -> f32 {
        f32::from(self.snr) / 4.0
    }
}

impl core::fmt::Debug for PacketStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PacketStatus")
            .field("rssi", &self.rssi())
            .field("snr", &self.snr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_fields() {
        // Standby RC, command processed.
        let status = Status::from(0b010_001_00);
        assert_eq!(status.circuit_mode(), Some(CircuitMode::StbyRc));
        assert_eq!(status.command_status(), Some(CommandStatus::Processed));

        // TX, transmission done.
        let status = Status::from(0b110_110_00);
        assert_eq!(status.circuit_mode(), Some(CircuitMode::Tx));
        assert_eq!(status.command_status(), Some(CommandStatus::TxDone));

        assert_eq!(Status::from(0x00).circuit_mode(), None);
        assert_eq!(Status::from(0x00).command_status(), None);
    }

    #[test]
    fn packet_status_scaling() {
        let status = PacketStatus::from([0xA0, 0xF8]);
        assert_eq!(status.rssi(), -80.0);
        assert_eq!(status.snr(), -2.0);

        let status = PacketStatus::from([0x3C, 0x28]);
        assert_eq!(status.rssi(), -30.0);
        assert_eq!(status.snr(), 10.0);
    }
}
