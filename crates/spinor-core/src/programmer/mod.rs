//! Programmer abstractions
//!
//! A programmer is whatever executes SPI transactions against the chip:
//! the [`SpiMaster`] trait is the command-level boundary, and
//! [`transport`](self::transport) provides the generic byte-level encoder
//! for transports that only expose chip select and single-byte transfers.

#[cfg(feature = "embedded-hal")]
pub mod hal;
pub mod transport;
mod traits;

pub use traits::SpiMaster;
pub use transport::{SpiTransport, TransportMaster};
