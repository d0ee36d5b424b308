//! Error types for spinor-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
///
/// The error surface is deliberately narrow. The chip itself has no error
/// reporting channel beyond its status bits, so the only failures the driver
/// can observe are a faulting bus transport, an exhausted busy-wait, and a
/// handful of caller mistakes the driver chooses to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The bus transport reported a fault while a transaction was in flight
    SpiTransferFailed,
    /// The busy bit did not clear within the allotted polling window
    Timeout,
    /// No chip answered the identification command (bus reads all-0 or all-1)
    ChipNotFound,
    /// JEDEC ID does not match the expected value
    JedecIdMismatch,
    /// Data length is invalid for the operation (e.g. empty page program,
    /// or more than one page of data)
    InvalidLength,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpiTransferFailed => write!(f, "SPI transfer failed"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::ChipNotFound => write!(f, "flash chip not found"),
            Self::JedecIdMismatch => write!(f, "JEDEC ID mismatch"),
            Self::InvalidLength => write!(f, "invalid data length"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
