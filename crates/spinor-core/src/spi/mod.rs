//! SPI types and command structures
//!
//! This module provides types for representing SPI transactions,
//! status register views, and the chip's command opcodes.

mod address;
mod command;
pub mod opcodes;
mod status;

pub use address::AddressWidth;
pub use command::SpiCommand;
pub use status::{Status1, Status2, Status3};
