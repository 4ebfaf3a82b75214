//! SPI bus transactions
//!
//! Every exchange with the CC1100 has the same shape: assert CSn, shift out a
//! header byte while the chip shifts out its status byte, exchange zero or more
//! data bytes, release CSn. The header combines a six bit address with two
//! access mode bits:
//!
//! | Bits 7:6 | Mode         |
//! |----------|--------------|
//! | `00`     | write single |
//! | `01`     | write burst  |
//! | `10`     | read single  |
//! | `11`     | read burst   |
//!
//! [`Transaction`] validates that the mode agrees with the data buffer before
//! anything touches the bus, then runs the whole exchange as one
//! `SpiDevice::transaction`. The `SpiDevice` contract keeps CSn asserted for
//! exactly that call and releases it on every exit path, including transport
//! errors. There are no retries at this layer.

use bitflags::bitflags;
use embedded_hal::spi::Operation;

use crate::commands::StatusByte;
use crate::errors::{bus, Error};

/// Mask for the address bits of a header byte
pub const ADDRESS_MASK: u8 = 0x3F;
/// Burst write flag
pub const WRITE_BURST: u8 = 0x40;
/// Single read flag
pub const READ_SINGLE: u8 = 0x80;
/// Burst read flag
pub const READ_BURST: u8 = 0xC0;

const FIRST_STROBE: u8 = 0x30;
const LAST_STROBE: u8 = 0x3D;

bitflags! {
    /// Access mode bits of a header byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u8 {
        /// Read when set, write when clear
        const READ = 1 << 7;
        /// Burst when set, single byte when clear
        const BURST = 1 << 6;
    }
}

/// Header access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessMode {
    WriteSingle,
    WriteBurst,
    ReadSingle,
    ReadBurst,
}

impl AccessMode {
    pub const fn flags(self) -> AccessFlags {
        match self {
            AccessMode::WriteSingle => AccessFlags::empty(),
            AccessMode::WriteBurst => AccessFlags::BURST,
            AccessMode::ReadSingle => AccessFlags::READ,
            AccessMode::ReadBurst => AccessFlags::READ.union(AccessFlags::BURST),
        }
    }

    pub const fn from_flags(flags: AccessFlags) -> Self {
        match (
            flags.contains(AccessFlags::READ),
            flags.contains(AccessFlags::BURST),
        ) {
            (false, false) => AccessMode::WriteSingle,
            (false, true) => AccessMode::WriteBurst,
            (true, false) => AccessMode::ReadSingle,
            (true, true) => AccessMode::ReadBurst,
        }
    }

    pub const fn is_read(self) -> bool {
        matches!(self, AccessMode::ReadSingle | AccessMode::ReadBurst)
    }

    pub const fn is_burst(self) -> bool {
        matches!(self, AccessMode::WriteBurst | AccessMode::ReadBurst)
    }
}

/// Transaction header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandByte(u8);

impl CommandByte {
    /// Combines an address with an access mode.
    ///
    /// Address bits above bit 5 are discarded, so the address can never bleed
    /// into the mode bits.
    ///
    /// ```
    /// use cc1100::transaction::{AccessMode, CommandByte};
    ///
    /// assert_eq!(CommandByte::encode(0x3F, AccessMode::ReadBurst).bits(), 0xFF);
    /// assert_eq!(CommandByte::encode(0x0D, AccessMode::WriteBurst).bits(), 0x4D);
    /// ```
    pub const fn encode(address: u8, mode: AccessMode) -> Self {
        Self((address & ADDRESS_MASK) | mode.flags().bits())
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn address(self) -> u8 {
        self.0 & ADDRESS_MASK
    }

    pub const fn mode(self) -> AccessMode {
        AccessMode::from_flags(AccessFlags::from_bits_truncate(self.0))
    }

    /// Whether the chip executes this header as a command strobe
    pub const fn is_strobe(self) -> bool {
        let address = self.address();
        address >= FIRST_STROBE
            && address <= LAST_STROBE
            && !self.mode().is_burst()
    }

    /// Whether the chip treats this header as a status register read
    pub const fn is_status_read(self) -> bool {
        let address = self.address();
        address >= FIRST_STROBE
            && address <= LAST_STROBE
            && matches!(self.mode(), AccessMode::ReadBurst)
    }
}

impl From<CommandByte> for u8 {
    fn from(command: CommandByte) -> Self {
        command.0
    }
}

/// Data phase of a transaction
#[derive(Debug)]
pub enum Payload<'a> {
    /// Header only
    None,
    /// Bytes shifted out after the header
    Write(&'a [u8]),
    /// Buffer filled with bytes shifted in after the header
    Read(&'a mut [u8]),
}

impl Payload<'_> {
    pub fn len(&self) -> usize {
        match self {
            Payload::None => 0,
            Payload::Write(bytes) => bytes.len(),
            Payload::Read(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One chip-select-framed exchange with the radio.
///
/// Built and consumed within a single driver call.
#[derive(Debug)]
pub struct Transaction<'a> {
    command: CommandByte,
    payload: Payload<'a>,
}

impl<'a> Transaction<'a> {
    /// Checks the header flags against the payload.
    ///
    /// # Errors
    /// * `Error::InvalidAccessMode` - header only for a non strobe, a data
    ///   phase for a strobe, a read flag with a write payload or the reverse,
    ///   a single access without exactly one byte, or an empty burst
    pub fn new(command: CommandByte, payload: Payload<'a>) -> Result<Self, Error> {
        let mode = command.mode();
        let valid = match &payload {
            Payload::None => command.is_strobe(),
            _ if command.is_strobe() => false,
            Payload::Write(_) if mode.is_read() => false,
            Payload::Read(_) if !mode.is_read() => false,
            _ if command.is_status_read() => payload.len() == 1,
            _ if mode.is_burst() => !payload.is_empty(),
            _ => payload.len() == 1,
        };

        if !valid {
            warn!("rejected header {:#x} with {} data bytes", command.bits(), payload.len());
            return Err(Error::InvalidAccessMode);
        }

        Ok(Self { command, payload })
    }

    pub fn command(&self) -> CommandByte {
        self.command
    }

    /// Runs the transaction on a blocking SPI device.
    ///
    /// Exactly `1 + payload.len()` bytes are exchanged under a single chip
    /// select.
    ///
    /// # Errors
    /// * `Error::Bus` - the transport failed; chip select has been released
    pub fn execute<SPI>(self, spi: &mut SPI) -> Result<StatusByte, Error>
    where
        SPI: embedded_hal::spi::SpiDevice,
    {
        let mut header = [self.command.bits()];

        let result = match self.payload {
            Payload::None => spi.transaction(&mut [Operation::TransferInPlace(&mut header)]),
            Payload::Write(bytes) => spi.transaction(&mut [
                Operation::TransferInPlace(&mut header),
                Operation::Write(bytes),
            ]),
            Payload::Read(bytes) => spi.transaction(&mut [
                Operation::TransferInPlace(&mut header),
                Operation::Read(bytes),
            ]),
        };
        result.map_err(bus)?;

        trace!("header {:#x} -> status {:#x}", self.command.bits(), header[0]);
        Ok(StatusByte::new(header[0]))
    }

    /// Runs the transaction on an async SPI device.
    ///
    /// This is the async version of [`execute`](Transaction::execute).
    pub async fn execute_async<SPI>(self, spi: &mut SPI) -> Result<StatusByte, Error>
    where
        SPI: embedded_hal_async::spi::SpiDevice,
    {
        let mut header = [self.command.bits()];

        let result = match self.payload {
            Payload::None => {
                spi.transaction(&mut [Operation::TransferInPlace(&mut header)])
                    .await
            }
            Payload::Write(bytes) => {
                spi.transaction(&mut [
                    Operation::TransferInPlace(&mut header),
                    Operation::Write(bytes),
                ])
                .await
            }
            Payload::Read(bytes) => {
                spi.transaction(&mut [
                    Operation::TransferInPlace(&mut header),
                    Operation::Read(bytes),
                ])
                .await
            }
        };
        result.map_err(bus)?;

        trace!("header {:#x} -> status {:#x}", self.command.bits(), header[0]);
        Ok(StatusByte::new(header[0]))
    }
}
