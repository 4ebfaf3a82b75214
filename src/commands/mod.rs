//! Radio command implementations
//!
//! # Command Categories
//! - [`strobe`]: single byte command strobes
//!   - Reset, calibrate, enter RX/TX/IDLE
//!   - Flush FIFOs
//!   - Wake-On-Radio and power down control
//!
//! - [`status`]: status byte decoding
//!   - Chip ready flag
//!   - Main state machine state
//!   - FIFO occupancy and CRC flags
//!
//! # Important Notes
//! - Every transaction returns a status byte, strobes return nothing else
//! - SRX/STX must not be issued before the configuration registers are written
//! - After SRES, wait for CHIP_RDYn to clear before the next command

pub mod status;
pub mod strobe;

pub use status::*;
pub use strobe::*;
