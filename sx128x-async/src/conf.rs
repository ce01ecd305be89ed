//! Wrapper for modem configuration parameters.

use super::op::*;

/// Configuration parameters used to initialize the SX128x modem.
#[derive(Copy, Clone, Debug)]
pub struct Config {
    /// Power regulator, LDO unless the board has the DC-DC inductor.
    pub regulator: RegulatorMode,
    /// The RF frequency in Hz, 2400..2500 MHz.
    pub rf_frequency: u32,
    /// Modulation parameters (spreading factor, bandwidth, coding rate).
    pub mod_params: LoraModParams,
    /// Packet parameters (preamble, header type, CRC, IQ).
    pub packet_params: LoRaPacketParams,
    /// TX power and ramp time.
    pub tx_params: TxParams,
    /// Interrupts raised in the IRQ status register.
    pub irq_mask: IrqMask,
    /// Interrupts routed to DIO1.
    pub dio1_irq_mask: IrqMask,
    /// Interrupts routed to DIO2.
    pub dio2_irq_mask: IrqMask,
    /// Interrupts routed to DIO3.
    pub dio3_irq_mask: IrqMask,
    /// The LoRa sync word. `0x12` is private, `0x34` public.
    pub sync_word: u8,
    /// Boosts the LNA gain for better sensitivity at a higher current.
    pub high_sensitivity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regulator: RegulatorMode::Ldo,
            rf_frequency: 2_400_000_000,
            mod_params: LoraModParams::default(),
            packet_params: LoRaPacketParams::default(),
            tx_params: TxParams::default(),
            irq_mask: IrqMask::tx_rx(),
            dio1_irq_mask: IrqMask::tx_rx(),
            dio2_irq_mask: IrqMask::none(),
            dio3_irq_mask: IrqMask::none(),
            sync_word: 0x12,
            high_sensitivity: false,
        }
    }
}

impl Config {
    pub fn set_regulator(mut self, regulator: RegulatorMode) -> Self {
        self.regulator = regulator;
        self
    }

    pub fn set_rf_frequency(mut self, rf_frequency: u32) -> Self {
        self.rf_frequency = rf_frequency;
        self
    }

    pub fn set_mod_params(mut self, mod_params: LoraModParams) -> Self {
        self.mod_params = mod_params;
        self
    }

    pub fn set_packet_params(mut self, packet_params: LoRaPacketParams) -> Self {
        self.packet_params = packet_params;
        self
    }

    pub fn set_tx_params(mut self, tx_params: TxParams) -> Self {
        self.tx_params = tx_params;
        self
    }

    /// Sets the IRQ mask and routes the same interrupts to DIO1.
    pub fn set_irq_mask(mut self, irq_mask: IrqMask) -> Self {
        self.irq_mask = irq_mask;
        self.dio1_irq_mask = irq_mask;
        self
    }

    pub fn set_sync_word(mut self, sync_word: u8) -> Self {
        self.sync_word = sync_word;
        self
    }

    pub fn set_high_sensitivity(mut self, high_sensitivity: bool) -> Self {
        self.high_sensitivity = high_sensitivity;
        self
    }
}
