//! Interrupt (IRQ) configuration and status structures.

/// A bitmask for individual interrupt flags.
#[repr(u16)]
#[derive(Copy, Clone, Debug)]
pub enum IrqMaskBit {
    /// No interrupt.
    None = 0x0000,
    /// Transmit operation done.
    TxDone = 1 << 0,
    /// Receive operation done.
    RxDone = 1 << 1,
    /// Sync word valid.
    SyncWordValid = 1 << 2,
    /// Sync word error.
    SyncWordError = 1 << 3,
    /// Header valid.
    HeaderValid = 1 << 4,
    /// Header error.
    HeaderError = 1 << 5,
    /// CRC error.
    CrcError = 1 << 6,
    /// Channel Activity Detection (CAD) done.
    CadDone = 1 << 12,
    /// Channel activity detected.
    CadDetected = 1 << 13,
    /// RX or TX timeout.
    RxTxTimeout = 1 << 14,
    /// Preamble detected.
    PreambleDetected = 1 << 15,
    /// All interrupts.
    All = 0xFFFF,
}

/// A builder for creating an interrupt mask.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IrqMask {
    inner: u16,
}

impl IrqMask {
    /// Creates a new, empty `IrqMask`.
    pub const fn none() -> Self {
        Self {
            inner: IrqMaskBit::None as u16,
        }
    }

    /// Creates a new `IrqMask` with all interrupts enabled.
    pub const fn all() -> Self {
        Self {
            inner: IrqMaskBit::All as u16,
        }
    }

    /// Adds an interrupt flag to the mask.
    pub const fn combine(self, bit: IrqMaskBit) -> Self {
        let inner = self.inner | bit as u16;
        Self { inner }
    }

    /// TX done, RX done, CRC error and timeout: what a send/receive loop needs.
    pub const fn tx_rx() -> Self {
        Self::none()
            .combine(IrqMaskBit::TxDone)
            .combine(IrqMaskBit::RxDone)
            .combine(IrqMaskBit::HeaderError)
            .combine(IrqMaskBit::CrcError)
            .combine(IrqMaskBit::RxTxTimeout)
    }
}

impl From<IrqMask> for u16 {
    fn from(val: IrqMask) -> Self {
        val.inner
    }
}

impl From<u16> for IrqMask {
    fn from(mask: u16) -> Self {
        Self { inner: mask }
    }
}

impl Default for IrqMask {
    fn default() -> Self {
        Self::none()
    }
}

/// Represents the interrupt status flags read from the device.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct IrqStatus {
    inner: u16,
}

impl From<u16> for IrqStatus {
    fn from(status: u16) -> Self {
        Self { inner: status }
    }
}

impl core::fmt::Debug for IrqStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IrqStatus")
            .field("tx_done", &self.tx_done())
            .field("rx_done", &self.rx_done())
            .field("sync_word_valid", &self.sync_word_valid())
            .field("sync_word_error", &self.sync_word_error())
            .field("header_valid", &self.header_valid())
            .field("header_error", &self.header_error())
            .field("crc_error", &self.crc_error())
            .field("cad_done", &self.cad_done())
            .field("cad_detected", &self.cad_detected())
            .field("rx_tx_timeout", &self.rx_tx_timeout())
            .field("preamble_detected", &self.preamble_detected())
            .finish()
    }
}

impl IrqStatus {
    fn is_set(self, bit: IrqMaskBit) -> bool {
        self.inner & bit as u16 != 0
    }

    /// The raw flags.
    pub fn bits(self) -> u16 {
        self.inner
    }

    /// Returns `true` if no flag is set.
    pub fn is_empty(self) -> bool {
        self.inner == 0
    }

    pub fn tx_done(self) -> bool {
        self.is_set(IrqMaskBit::TxDone)
    }

    pub fn rx_done(self) -> bool {
        self.is_set(IrqMaskBit::RxDone)
    }

    pub fn sync_word_valid(self) -> bool {
        self.is_set(IrqMaskBit::SyncWordValid)
    }

    pub fn sync_word_error(self) -> bool {
        self.is_set(IrqMaskBit::SyncWordError)
    }

    pub fn header_valid(self) -> bool {
        self.is_set(IrqMaskBit::HeaderValid)
    }

    pub fn header_error(self) -> bool {
        self.is_set(IrqMaskBit::HeaderError)
    }

    pub fn crc_error(self) -> bool {
        self.is_set(IrqMaskBit::CrcError)
    }

    pub fn cad_done(self) -> bool {
        self.is_set(IrqMaskBit::CadDone)
    }

    pub fn cad_detected(self) -> bool {
        self.is_set(IrqMaskBit::CadDetected)
    }

    pub fn rx_tx_timeout(self) -> bool {
        self.is_set(IrqMaskBit::RxTxTimeout)
    }

    pub fn preamble_detected(self) -> bool {
        self.is_set(IrqMaskBit::PreambleDetected)
    }
}
