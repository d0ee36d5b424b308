//! spinor-core - Driver for W25Q32JV-class serial NOR flash chips
//!
//! This crate translates high-level memory operations (read, program, erase,
//! identify, lock, power-manage) into the chip's fixed command protocol over
//! a 4-wire SPI bus with a single chip-select line, while respecting the
//! write-enable latch and busy-state rules. It is `no_std` compatible for
//! use in embedded environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support
//! - `is_sync` - Compile the async surface as blocking/synchronous code
//! - `embedded-hal` - Adapter from `embedded-hal` 1.x traits to the
//!   byte-level transport
//!
//! # Example
//!
//! ```ignore
//! use spinor_core::flash::Flash;
//! use spinor_core::programmer::TransportMaster;
//!
//! let mut flash = Flash::new(TransportMaster::new(transport));
//! let id = flash.init()?;
//! println!("found chip: {:02x?}", id.bytes());
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "std")]
extern crate std;

pub mod chip;
pub mod error;
pub mod flash;
pub mod programmer;
pub mod protocol;
pub mod spi;

pub use error::{Error, Result};
