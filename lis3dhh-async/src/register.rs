//! Register addresses and bit-fields.

pub const WHO_AM_I: u8 = 0x0F;
pub const CTRL_REG1: u8 = 0x20;
pub const INT1_CTRL: u8 = 0x21;
pub const INT2_CTRL: u8 = 0x22;
pub const CTRL_REG4: u8 = 0x23;
pub const CTRL_REG5: u8 = 0x24;
pub const OUT_TEMP_L: u8 = 0x25;
pub const STATUS: u8 = 0x27;
pub const OUT_X_L: u8 = 0x28;
pub const FIFO_CTRL: u8 = 0x2E;
pub const FIFO_SRC: u8 = 0x2F;

pub const DEVICE_ID: u8 = 0x11;

// --- CTRL_REG1 ---
pub const NORM_MOD_EN: u8 = 0b1000_0000;
pub const IF_ADD_INC: u8 = 0b0100_0000;
pub const BOOT: u8 = 0b0000_1000;
pub const SW_RESET: u8 = 0b0000_0100;
pub const DRDY_PULSE: u8 = 0b0000_0010;
pub const BDU: u8 = 0b0000_0001;

// --- CTRL_REG4 ---
pub const DSP_LP_TYPE: u8 = 0b1000_0000;
pub const DSP_BW_SEL: u8 = 0b0100_0000;
pub const ST_MASK: u8 = 0b0011_0000;
pub const ST_SHIFT: u8 = 4;
pub const PP_OD_INT2: u8 = 0b0000_1000;
pub const PP_OD_INT1: u8 = 0b0000_0100;
pub const FIFO_EN: u8 = 0b0000_0010;
/// Must always be written as 1.
pub const CTRL4_ONE: u8 = 0b0000_0001;

// --- CTRL_REG5 ---
pub const FIFO_SPI_HS_ON: u8 = 0b0000_0001;

// --- INT1_CTRL / INT2_CTRL ---
pub const INT_DRDY: u8 = 0b1000_0000;
pub const INT_BOOT: u8 = 0b0100_0000;
pub const INT_OVR: u8 = 0b0010_0000;
pub const INT_FSS5: u8 = 0b0001_0000;
pub const INT_FTH: u8 = 0b0000_1000;

// --- STATUS ---
pub const ZYXOR: u8 = 0b1000_0000;
pub const ZYXDA: u8 = 0b0000_1000;

// --- FIFO_CTRL ---
pub const FMODE_SHIFT: u8 = 5;
pub const FTH_MASK: u8 = 0b0001_1111;

// --- FIFO_SRC ---
pub const FIFO_SRC_FTH: u8 = 0b1000_0000;
pub const FIFO_SRC_OVRN: u8 = 0b0100_0000;
pub const FSS_MASK: u8 = 0b0011_1111;
