//! Driver error type

use core::fmt;

use embedded_hal::spi::ErrorKind;

use crate::registers::Register;

/// Errors returned by the CC1100 driver.
///
/// No error is recovered from internally. After any failure the caller is
/// expected to resynchronize the chip with `SIDLE` or `SRES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The SPI transport failed
    Bus(ErrorKind),
    /// The chip did not report ready before the deadline expired
    BusTimeout,
    /// Command byte flags disagree with the transfer buffers.
    ///
    /// This is a driver bug, never a runtime condition of the chip.
    InvalidAccessMode,
    /// A FIFO burst asked for more bytes than the chip reported.
    ///
    /// For the RX FIFO that is the bytes waiting to be read, for the TX FIFO
    /// the free space left.
    InsufficientData {
        /// Bytes asked for
        requested: usize,
        /// Bytes the chip reported as readable or free
        available: u8,
    },
    /// A configuration register read back a value other than the one written
    ConfigurationVerificationFailed {
        /// First register that did not match
        register: Register,
        /// Value written
        expected: u8,
        /// Value read back
        actual: u8,
    },
    /// A strobe was issued before the radio was configured
    NotConfigured,
    /// A status register value could not be decoded
    Deserialization,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(kind) => write!(f, "SPI transport error: {kind}"),
            Error::BusTimeout => f.write_str("chip did not become ready before the deadline"),
            Error::InvalidAccessMode => f.write_str("command byte inconsistent with transfer"),
            Error::InsufficientData {
                requested,
                available,
            } => write!(
                f,
                "requested {requested} bytes but only {available} are available"
            ),
            Error::ConfigurationVerificationFailed {
                register,
                expected,
                actual,
            } => write!(
                f,
                "register {register:?} read back {actual:#04x}, expected {expected:#04x}"
            ),
            Error::NotConfigured => f.write_str("radio is not configured"),
            Error::Deserialization => f.write_str("status register value could not be decoded"),
        }
    }
}

impl core::error::Error for Error {}

pub(crate) fn bus<E: embedded_hal::spi::Error>(error: E) -> Error {
    Error::Bus(error.kind())
}
