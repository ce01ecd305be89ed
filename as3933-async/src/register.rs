//! Register map and direct commands.

pub const R0: u8 = 0;
pub const R1: u8 = 1;
pub const R2: u8 = 2;
pub const R3: u8 = 3;
pub const R4: u8 = 4;
/// Second byte of the wake-up pattern (TS2).
pub const R5: u8 = 5;
/// First byte of the wake-up pattern (TS1).
pub const R6: u8 = 6;
pub const R7: u8 = 7;
pub const R8: u8 = 8;
pub const R9: u8 = 9;
/// RSSI of channel 1.
pub const R10: u8 = 10;
/// RSSI of channel 3.
pub const R11: u8 = 11;
/// RSSI of channel 2.
pub const R12: u8 = 12;
/// False wake-up counter.
pub const R13: u8 = 13;
pub const R14: u8 = 14;
pub const R16: u8 = 16;
/// Tuning capacitance of channel 1; channels 2 and 3 follow.
pub const R17: u8 = 17;

// --- R0 ---
pub const PAT32: u8 = 1 << 7;
pub const DAT_MASK: u8 = 1 << 6;
pub const ON_OFF: u8 = 1 << 5;
pub const MUX_123: u8 = 1 << 4;
pub const EN_A2: u8 = 1 << 3;
pub const EN_A3: u8 = 1 << 2;
pub const EN_A1: u8 = 1 << 1;
pub const CHANNELS_MASK: u8 = EN_A1 | EN_A2 | EN_A3;

// --- R1 ---
pub const ABS_HY: u8 = 1 << 7;
pub const AGC_TLIM: u8 = 1 << 6;
pub const AGC_UD: u8 = 1 << 5;
pub const ATT_ON: u8 = 1 << 4;
pub const EN_MANCH: u8 = 1 << 3;
pub const EN_PAT2: u8 = 1 << 2;
pub const EN_WPAT: u8 = 1 << 1;
pub const EN_XTAL: u8 = 1 << 0;

// --- R2 ---
pub const S_ABSH: u8 = 1 << 7;
pub const EN_EXT_CLK: u8 = 1 << 6;
pub const G_BOOST: u8 = 1 << 5;
pub const DISPLAY_CLK_MASK: u8 = 0b11 << 2;

// --- R3 ---
pub const HY_20M: u8 = 1 << 7;
pub const HY_POS: u8 = 1 << 6;
pub const FS_SLC_SHIFT: u8 = 3;

// --- R4 ---
pub const T_OFF_SHIFT: u8 = 6;
pub const D_RES_SHIFT: u8 = 4;

// --- R7 ---
pub const T_OUT_SHIFT: u8 = 5;
pub const T_HBIT_MASK: u8 = 0x1F;

// --- R8 ---
pub const BAND_SEL_SHIFT: u8 = 5;

// --- R9 ---
pub const BLOCK_AGC: u8 = 1 << 7;

// --- R10..R12 ---
pub const RSSI_MASK: u8 = 0x1F;

// --- R14 ---
pub const RC_CAL_KO: u8 = 1 << 7;
pub const RC_CAL_OK: u8 = 1 << 6;
pub const RC_OSC_TAPS_MASK: u8 = 0x3F;

// --- R16 ---
pub const CLOCK_GEN_DIS: u8 = 1 << 7;
pub const LC_TO_DAT_MASK: u8 = 0b0000_0111;

/// Largest value of a 3-bit field.
pub const MAX_3BIT: u8 = 7;
/// Largest value of a 5-bit field.
pub const MAX_5BIT: u8 = 31;

/// Direct commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectCommand {
    /// Leaves the data-receiving state and clears the WAKE output.
    ClearWake = 0x00,
    /// Resets the RSSI measurement.
    ResetRssi = 0x01,
    /// Calibrates the RC oscillator.
    CalibrateRcOscillator = 0x02,
    /// Resets the false wake-up register.
    ClearFalse = 0x03,
    /// Sets all registers to their default values.
    PresetDefault = 0x04,
    /// Calibrates the RC oscillator against the LC resonators.
    CalibrateRcoLc = 0x05,
}
