//! Command strobes
//!
//! A strobe is a single header byte in the 0x30-0x3D range sent without the
//! burst bit. It carries no data and triggers an internal chip action. The same
//! addresses read with the burst bit set are status registers instead, see
//! [`crate::registers::StatusRegister`].
//!
//! # Important Notes
//! - SRX, STX and SFSTXON calibrate first when MCSM0.FS_AUTOCAL says so
//! - SFRX and SFTX are only valid in IDLE or in the overflow/underflow states
//! - SPWD and SXOFF take effect when CSn goes high
//! - After SRES the chip holds CHIP_RDYn high until the crystal is stable

/// Error type for values outside the strobe range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrobeError {
    /// The value is not a strobe opcode
    InvalidValue(u8),
}

/// Strobe command opcode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Strobe {
    /// Reset chip
    Sres = 0x30,
    /// Enable and calibrate frequency synthesizer.
    ///
    /// From RX/TX this parks the chip with only the synthesizer running for a
    /// quick RX/TX turnaround.
    Sfstxon = 0x31,
    /// Turn off crystal oscillator
    Sxoff = 0x32,
    /// Calibrate frequency synthesizer and turn it off
    Scal = 0x33,
    /// Enable RX
    Srx = 0x34,
    /// Enable TX.
    ///
    /// From RX with CCA enabled this only goes to TX if the channel is clear.
    Stx = 0x35,
    /// Exit RX/TX, turn off the frequency synthesizer and leave Wake-On-Radio
    Sidle = 0x36,
    /// Perform AFC adjustment of the frequency synthesizer
    Safc = 0x37,
    /// Start the Wake-On-Radio polling sequence
    Swor = 0x38,
    /// Enter power down mode when CSn goes high
    Spwd = 0x39,
    /// Flush the RX FIFO
    Sfrx = 0x3A,
    /// Flush the TX FIFO
    Sftx = 0x3B,
    /// Reset the Wake-On-Radio real time clock
    Sworrst = 0x3C,
    /// No operation, returns the status byte
    Snop = 0x3D,
}

impl Strobe {
    /// Header byte for the strobe
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Whether the strobe leaves RX FIFO contents unchanged
    pub const fn preserves_rx_fifo(self) -> bool {
        !matches!(self, Strobe::Sres | Strobe::Sfrx)
    }

    /// Whether the strobe leaves TX FIFO contents unchanged
    pub const fn preserves_tx_fifo(self) -> bool {
        !matches!(self, Strobe::Sres | Strobe::Sftx)
    }
}

impl TryFrom<u8> for Strobe {
    type Error = StrobeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x30 => Ok(Self::Sres),
            0x31 => Ok(Self::Sfstxon),
            0x32 => Ok(Self::Sxoff),
            0x33 => Ok(Self::Scal),
            0x34 => Ok(Self::Srx),
            0x35 => Ok(Self::Stx),
            0x36 => Ok(Self::Sidle),
            0x37 => Ok(Self::Safc),
            0x38 => Ok(Self::Swor),
            0x39 => Ok(Self::Spwd),
            0x3A => Ok(Self::Sfrx),
            0x3B => Ok(Self::Sftx),
            0x3C => Ok(Self::Sworrst),
            0x3D => Ok(Self::Snop),
            invalid => Err(StrobeError::InvalidValue(invalid)),
        }
    }
}
