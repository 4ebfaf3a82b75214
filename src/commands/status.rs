//! Status byte decoding
//!
//! The CC1100 shifts a status byte out on SO while the header byte of every
//! SPI transaction is shifted in. Its layout is:
//!
//! - Bit 7: CHIP_RDYn, low once the crystal is running and the chip accepts
//!   commands
//! - Bits 6:4: main state machine state
//! - Bits 3:0: FIFO_BYTES_AVAILABLE, RX FIFO bytes for read accesses or free
//!   TX FIFO bytes for write accesses, saturating at 15
//!
//! Values read from the FIFO status registers reuse the byte differently:
//! `RXBYTES`/`TXBYTES` hold a 7 bit count with an overflow flag in bit 7, and
//! `PKTSTATUS` holds CRC_OK in bit 7. [`decode`] is context free and returns
//! every interpretation; the caller knows which register was addressed and
//! picks the meaningful field.

/// Mask for the byte count in `RXBYTES`/`TXBYTES`
pub const BYTES_IN_FIFO: u8 = 0x7F;
/// CRC_OK flag in `PKTSTATUS` and in the appended LQI byte
pub const CRC_OK: u8 = 0x80;
/// CHIP_RDYn flag in the header status byte
pub const CHIP_RDYN: u8 = 0x80;

const STATE_SHIFT: u8 = 4;
const STATE_MASK: u8 = 0x7;
const HEADER_FIFO_MASK: u8 = 0x0F;

/// Error type for invalid chip state values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipStateError {
    /// The value does not correspond to a valid chip state
    InvalidValue(u8),
}

/// Main radio state machine state
///
/// Extracted from status byte bits 6:4.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipState {
    /// IDLE state, also reported for some transitional states
    Idle = 0x0,
    /// Receive mode
    Rx = 0x1,
    /// Transmit mode
    Tx = 0x2,
    /// Fast TX ready
    Fstxon = 0x3,
    /// Frequency synthesizer calibration is running
    Calibrate = 0x4,
    /// PLL is settling
    Settling = 0x5,
    /// RX FIFO has overflowed, flush with SFRX
    RxFifoOverflow = 0x6,
    /// TX FIFO has underflowed, acknowledge with SFTX
    TxFifoUnderflow = 0x7,
}

impl ChipState {
    /// Decodes a state from the three state bits.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & STATE_MASK {
            0x0 => ChipState::Idle,
            0x1 => ChipState::Rx,
            0x2 => ChipState::Tx,
            0x3 => ChipState::Fstxon,
            0x4 => ChipState::Calibrate,
            0x5 => ChipState::Settling,
            0x6 => ChipState::RxFifoOverflow,
            _ => ChipState::TxFifoUnderflow,
        }
    }
}

impl TryFrom<u8> for ChipState {
    type Error = ChipStateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > STATE_MASK {
            return Err(ChipStateError::InvalidValue(value));
        }
        Ok(Self::from_bits(value))
    }
}

/// Raw status byte.
///
/// This is returned by every strobe and recorded for every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusByte(u8);

impl From<u8> for StatusByte {
    fn from(x: u8) -> Self {
        StatusByte(x)
    }
}

impl From<StatusByte> for u8 {
    fn from(x: StatusByte) -> Self {
        x.0
    }
}

impl StatusByte {
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Whether CHIP_RDYn is low.
    ///
    /// Garbage on an unpowered or still resetting bus reads as `0xFF`, which
    /// reports not ready.
    pub const fn chip_ready(&self) -> bool {
        self.0 & CHIP_RDYN == 0
    }

    /// Main state machine state
    pub const fn state(&self) -> ChipState {
        ChipState::from_bits(self.0 >> STATE_SHIFT)
    }

    /// FIFO_BYTES_AVAILABLE from a transaction header, saturating at 15
    pub const fn header_fifo_bytes(&self) -> u8 {
        self.0 & HEADER_FIFO_MASK
    }

    /// Byte count when this byte was read from `RXBYTES` or `TXBYTES`
    pub const fn fifo_bytes_available(&self) -> u8 {
        self.0 & BYTES_IN_FIFO
    }

    /// CRC flag when this byte was read from `PKTSTATUS`
    pub const fn crc_ok(&self) -> bool {
        self.0 & CRC_OK != 0
    }
}

impl core::fmt::Display for StatusByte {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Status")
            .field("ready", &self.chip_ready())
            .field("state", &self.state())
            .field("fifo", &self.header_fifo_bytes())
            .finish()
    }
}

/// Every interpretation of a status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub chip_state: ChipState,
    /// Meaningful only for bytes read from `RXBYTES`/`TXBYTES`
    pub fifo_bytes_available: u8,
    /// Meaningful only for bytes read from `PKTSTATUS`
    pub crc_ok: bool,
}

/// Decodes a status byte.
///
/// Pure: the same byte always yields the same [`Status`].
pub const fn decode(status: u8) -> Status {
    let status = StatusByte::new(status);
    Status {
        chip_state: status.state(),
        fifo_bytes_available: status.fifo_bytes_available(),
        crc_ok: status.crc_ok(),
    }
}
