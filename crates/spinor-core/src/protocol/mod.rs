//! Flash protocol implementations

pub mod spi25;

pub use spi25::*;
