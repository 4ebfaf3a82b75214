//! Status registers
//!
//! Addresses 0x30-0x3D double as strobe opcodes. The chip treats a header in
//! this range as a status register read only when both the read and the burst
//! bits are set; anything else executes the strobe. [`StatusRegister`] is the
//! read side of that split and [`crate::commands::Strobe`] the write side, so
//! the two can never be confused at a call site.
//!
//! Status registers are read only and are read one byte per transaction.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister};

use crate::commands::{BYTES_IN_FIFO, CRC_OK};

/// Status register identity
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusRegister {
    /// Part number, 0x00 for the CC1100
    Partnum = 0x30,
    /// Current version number
    Version = 0x31,
    /// Frequency offset estimate
    Freqest = 0x32,
    /// Demodulator estimate for link quality
    Lqi = 0x33,
    /// Received signal strength indication
    Rssi = 0x34,
    /// Control state machine state
    Marcstate = 0x35,
    /// WOR timer, high byte
    Wortime1 = 0x36,
    /// WOR timer, low byte
    Wortime0 = 0x37,
    /// Current GDOx status and packet status
    Pktstatus = 0x38,
    /// Current setting from PLL calibration module
    VcoVcDac = 0x39,
    /// Underflow flag and number of bytes in the TX FIFO
    Txbytes = 0x3A,
    /// Overflow flag and number of bytes in the RX FIFO
    Rxbytes = 0x3B,
}

impl StatusRegister {
    pub const fn address(self) -> u8 {
        self as u8
    }
}

/// Part number register (address: 0x30)
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct PartNumber {
    pub value: u8,
}

impl FromByteArray for PartNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

/// Chip version register (address: 0x31)
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct ChipVersion {
    pub value: u8,
}

impl FromByteArray for ChipVersion {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

/// Frequency offset estimate register (address: 0x32)
///
/// Two's complement estimate of the carrier offset, in units of
/// f_XOSC / 2^14. Valid once a packet has been received.
#[register(0x32u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct FrequencyOffset {
    pub estimate: i8,
}

impl FromByteArray for FrequencyOffset {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            estimate: bytes[0] as i8,
        })
    }
}

/// Link quality register (address: 0x33)
#[register(0x33u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct LinkQuality {
    /// Lower is better
    pub quality: u8,
    /// CRC check of the last received packet
    pub crc_ok: bool,
}

impl FromByteArray for LinkQuality {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            quality: bytes[0] & !CRC_OK,
            crc_ok: bytes[0] & CRC_OK != 0,
        })
    }
}

/// Received signal strength register (address: 0x34)
#[register(0x34u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct SignalStrength {
    /// Two's complement, in 0.5 dB steps
    pub raw: i8,
}

impl SignalStrength {
    /// Signal power in dBm.
    ///
    /// `offset` depends on data rate and band, typically 74 dB at 433 MHz.
    pub const fn dbm(&self, offset: i16) -> i16 {
        self.raw as i16 / 2 - offset
    }
}

impl FromByteArray for SignalStrength {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            raw: bytes[0] as i8,
        })
    }
}

/// Error type for invalid MARCSTATE values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MarcStateError {
    /// The value does not correspond to a documented state
    InvalidValue(u8),
}

/// Detailed main radio control state machine state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MarcState {
    Sleep = 0x00,
    Idle = 0x01,
    Xoff = 0x02,
    VcoonMc = 0x03,
    RegonMc = 0x04,
    Mancal = 0x05,
    Vcoon = 0x06,
    Regon = 0x07,
    Startcal = 0x08,
    Bwboost = 0x09,
    FsLock = 0x0A,
    Ifadcon = 0x0B,
    Endcal = 0x0C,
    Rx = 0x0D,
    RxEnd = 0x0E,
    RxRst = 0x0F,
    TxrxSwitch = 0x10,
    RxFifoOverflow = 0x11,
    Fstxon = 0x12,
    Tx = 0x13,
    TxEnd = 0x14,
    RxtxSwitch = 0x15,
    TxFifoUnderflow = 0x16,
}

impl TryFrom<u8> for MarcState {
    type Error = MarcStateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use MarcState::*;

        match value & 0x1F {
            0x00 => Ok(Sleep),
            0x01 => Ok(Idle),
            0x02 => Ok(Xoff),
            0x03 => Ok(VcoonMc),
            0x04 => Ok(RegonMc),
            0x05 => Ok(Mancal),
            0x06 => Ok(Vcoon),
            0x07 => Ok(Regon),
            0x08 => Ok(Startcal),
            0x09 => Ok(Bwboost),
            0x0A => Ok(FsLock),
            0x0B => Ok(Ifadcon),
            0x0C => Ok(Endcal),
            0x0D => Ok(Rx),
            0x0E => Ok(RxEnd),
            0x0F => Ok(RxRst),
            0x10 => Ok(TxrxSwitch),
            0x11 => Ok(RxFifoOverflow),
            0x12 => Ok(Fstxon),
            0x13 => Ok(Tx),
            0x14 => Ok(TxEnd),
            0x15 => Ok(RxtxSwitch),
            0x16 => Ok(TxFifoUnderflow),
            _ => Err(MarcStateError::InvalidValue(value)),
        }
    }
}

/// Main radio control state register (address: 0x35)
#[register(0x35u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct RadioState {
    pub state: MarcState,
}

impl FromByteArray for RadioState {
    type Error = MarcStateError;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            state: MarcState::try_from(bytes[0])?,
        })
    }
}

/// WOR timer, high byte (address: 0x36)
#[register(0x36u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct WorTimeHigh {
    pub value: u8,
}

impl FromByteArray for WorTimeHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

/// WOR timer, low byte (address: 0x37)
///
/// The timer keeps running between the two reads. Combine with
/// [`WorTimeHigh`] through [`wor_time`] only when both were read back to back.
#[register(0x37u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct WorTimeLow {
    pub value: u8,
}

impl FromByteArray for WorTimeLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

/// 16 bit WOR timer value from its two halves
pub const fn wor_time(high: WorTimeHigh, low: WorTimeLow) -> u16 {
    u16::from_be_bytes([high.value, low.value])
}

bitflags! {
    /// Packet status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PacketStatusFlags: u8 {
        /// The last CRC comparison matched
        const CRC_OK = 1 << 7;
        /// Carrier sense
        const CARRIER_SENSE = 1 << 6;
        /// Preamble quality reached
        const PQT_REACHED = 1 << 5;
        /// Channel is clear
        const CHANNEL_CLEAR = 1 << 4;
        /// Start of frame delimiter, sync word found
        const SFD = 1 << 3;
        /// Current GDO2 value
        const GDO2 = 1 << 2;
        /// Current GDO0 value
        const GDO0 = 1;
    }
}

/// Packet status register (address: 0x38)
#[register(0x38u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct PacketStatus {
    pub flags: PacketStatusFlags,
}

impl PacketStatus {
    pub fn crc_ok(&self) -> bool {
        self.flags.contains(PacketStatusFlags::CRC_OK)
    }
}

impl FromByteArray for PacketStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: PacketStatusFlags::from_bits_retain(bytes[0]),
        })
    }
}

/// PLL calibration result (address: 0x39)
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct VcoVcDac {
    pub value: u8,
}

impl FromByteArray for VcoVcDac {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

/// TX FIFO status register (address: 0x3A)
#[register(0x3Au8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct TxBytes {
    /// Bytes queued in the TX FIFO
    pub count: u8,
    /// The TX FIFO has underflowed, flush with SFTX
    pub underflow: bool,
}

impl FromByteArray for TxBytes {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            count: bytes[0] & BYTES_IN_FIFO,
            underflow: bytes[0] & !BYTES_IN_FIFO != 0,
        })
    }
}

/// RX FIFO status register (address: 0x3B)
#[register(0x3Bu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct RxBytes {
    /// Bytes waiting in the RX FIFO
    pub count: u8,
    /// The RX FIFO has overflowed, flush with SFRX
    pub overflow: bool,
}

impl FromByteArray for RxBytes {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            count: bytes[0] & BYTES_IN_FIFO,
            overflow: bytes[0] & !BYTES_IN_FIFO != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use regiface::Register as _;

    use super::*;

    #[test]
    fn ids_match_status_register_addresses() {
        assert_eq!(PartNumber::id(), StatusRegister::Partnum.address());
        assert_eq!(ChipVersion::id(), StatusRegister::Version.address());
        assert_eq!(RadioState::id(), StatusRegister::Marcstate.address());
        assert_eq!(WorTimeHigh::id(), StatusRegister::Wortime1.address());
        assert_eq!(WorTimeLow::id(), StatusRegister::Wortime0.address());
        assert_eq!(PacketStatus::id(), StatusRegister::Pktstatus.address());
        assert_eq!(VcoVcDac::id(), StatusRegister::VcoVcDac.address());
        assert_eq!(TxBytes::id(), StatusRegister::Txbytes.address());
        assert_eq!(RxBytes::id(), StatusRegister::Rxbytes.address());
    }

    #[test]
    fn fifo_counts() {
        let rx = RxBytes::from_bytes([0x83]).unwrap();
        assert_eq!(rx.count, 3);
        assert!(rx.overflow);

        let tx = TxBytes::from_bytes([0x40]).unwrap();
        assert_eq!(tx.count, 0x40);
        assert!(!tx.underflow);
    }

    #[test]
    fn packet_status_crc() {
        let status = PacketStatus::from_bytes([0x90]).unwrap();
        assert!(status.crc_ok());
        assert!(status.flags.contains(PacketStatusFlags::CHANNEL_CLEAR));
        assert!(!PacketStatus::from_bytes([0x10]).unwrap().crc_ok());
    }

    #[test]
    fn marcstate_decoding() {
        assert_eq!(RadioState::from_bytes([0x0D]).unwrap().state, MarcState::Rx);
        assert_eq!(RadioState::from_bytes([0x01]).unwrap().state, MarcState::Idle);
        assert_eq!(
            RadioState::from_bytes([0x17]).unwrap_err(),
            MarcStateError::InvalidValue(0x17)
        );
    }

    #[test]
    fn wor_time_halves() {
        let high = WorTimeHigh::from_bytes([0x12]).unwrap();
        let low = WorTimeLow::from_bytes([0x34]).unwrap();
        assert_eq!(wor_time(high, low), 0x1234);
    }

    #[test]
    fn signal_strength_in_dbm() {
        let rssi = SignalStrength::from_bytes([0xEC]).unwrap();
        assert_eq!(rssi.raw, -20);
        assert_eq!(rssi.dbm(74), -84);
    }

    #[test]
    fn link_quality_splits_crc() {
        let lqi = LinkQuality::from_bytes([0x85]).unwrap();
        assert_eq!(lqi.quality, 0x05);
        assert!(lqi.crc_ok);
    }
}
