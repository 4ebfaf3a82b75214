//! Register definitions for the CC1100 radio
//!
//! The six bit address space is split by function:
//!
//! - 0x00-0x2E: configuration registers, see [`Register`]
//! - 0x30-0x3D: strobes when written, status registers when read with the
//!   burst bit, see [`StatusRegister`]
//! - 0x3E: PATABLE
//! - 0x3F: TX FIFO when written, RX FIFO when read

mod config;
mod status;

pub use config::*;
pub use status::*;

/// PATABLE address
pub const PA_TABLE_ADDRESS: u8 = 0x3E;
/// TX/RX FIFO address
pub const FIFO_ADDRESS: u8 = 0x3F;
/// Capacity of each of the TX and RX FIFOs
pub const FIFO_LEN: u8 = 64;

/// Target of a register or burst access.
///
/// Strobes and status registers are deliberately absent; they have their own
/// access paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// A configuration register, bursts auto-increment from here
    Config(Register),
    /// The eight byte power table
    PaTable,
    /// The TX FIFO for writes, the RX FIFO for reads
    Fifo,
}

impl Address {
    pub const fn bits(self) -> u8 {
        match self {
            Address::Config(register) => register.address(),
            Address::PaTable => PA_TABLE_ADDRESS,
            Address::Fifo => FIFO_ADDRESS,
        }
    }

    /// Longest burst that stays inside the addressed space.
    ///
    /// Configuration bursts stop at TEST0 and PATABLE bursts at its last slot.
    /// FIFO bursts are bounded by the FIFO fill level instead.
    pub const fn max_burst(self) -> Option<usize> {
        match self {
            Address::Config(register) => {
                Some((LAST_CONFIG_ADDRESS - register.address()) as usize + 1)
            }
            Address::PaTable => Some(PA_TABLE_LEN),
            Address::Fifo => None,
        }
    }
}

impl From<Register> for Address {
    fn from(register: Register) -> Self {
        Address::Config(register)
    }
}
