#![no_std]
//! CC1100 Radio Driver
//!
//! This crate provides a type-safe interface for the Texas Instruments CC1100
//! sub-GHz transceiver. The CC1100 is a low cost, low power radio for the 315,
//! 433, 868 and 915 MHz ISM bands, controlled entirely over a four wire SPI
//! bus.
//!
//! # Features
//! - Bit exact header byte encoding for single and burst register access
//! - Status byte decoding on every transaction
//! - All 14 command strobes
//! - Typed status registers (MARCSTATE, PKTSTATUS, RXBYTES, ...)
//! - TX/RX FIFO access bounded by the FIFO fill levels
//! - PATABLE loading and read-back
//! - A configuration sequencer from power-up to RX/TX
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`transaction`]: one chip-select-framed SPI exchange
//!   - Header byte encoding and access mode validation
//!
//! - [`commands`]: strobes and status byte decoding
//!
//! - [`registers`]: register definitions
//!   - Configuration registers, [`RegisterMap`] and [`PaTable`]
//!   - Typed status registers
//!
//! - [`device`]: command interface built on transactions
//!   - Register, burst, strobe, FIFO and PATABLE access
//!   - Blocking and async variants
//!
//! - [`radio`]: configuration sequencer
//!   - Reset, configure, verify, enter RX/TX
//!
//! # Usage
//! Configuration follows a specific sequence:
//!
//! 1. Create a [`Radio`] with your SPI device
//! 2. Reset the chip with SRES
//! 3. Wait for CHIP_RDYn to go low
//! 4. Write all configuration registers, then the PATABLE
//! 5. Optionally read the registers back
//! 6. Enter RX or TX
//!
//! # Important Notes
//! - SRX/STX must not be sent before all registers are written
//! - Status registers share addresses with strobes and are only reachable with
//!   the burst read bit
//! - FIFO bursts never move more bytes than the chip reported room for
//! - After any error, resynchronize with SIDLE or SRES
//!
//! # Example
//! ```no_run
//! use cc1100::{Error, Radio, RadioConfig};
//! use embedded_hal::{delay::DelayNs, spi::SpiDevice};
//!
//! fn start_receiving<SPI: SpiDevice, D: DelayNs>(
//!     spi: SPI,
//!     delay: &mut D,
//! ) -> Result<Radio<SPI>, Error> {
//!     let mut radio = Radio::new(spi);
//!     radio.initialize(delay, &RadioConfig::default())?;
//!     radio.start_rx()?;
//!     Ok(radio)
//! }
//! ```

mod fmt;

pub mod commands;
pub mod device;
pub mod errors;
pub mod radio;
pub mod registers;
pub mod transaction;

pub use commands::*;
pub use device::{Deadline, Device};
pub use errors::Error;
pub use radio::{Radio, RadioConfig, State};
pub use registers::*;
