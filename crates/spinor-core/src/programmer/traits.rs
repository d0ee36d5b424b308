//! Programmer trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use crate::spi::SpiCommand;
use maybe_async::maybe_async;

/// SPI Master trait (sync or async depending on `is_sync` feature)
///
/// This trait represents whatever can execute SPI commands against the
/// flash chip. The bus and chip-select line are exclusively owned by the
/// implementation for the duration of each `execute` call; nothing else may
/// drive them while a transaction is in flight.
#[maybe_async(AFIT)]
pub trait SpiMaster {
    /// Execute a single SPI command
    ///
    /// The command contains all the information needed for the transaction:
    /// - `opcode`: The SPI command opcode
    /// - `address`: Optional 24-bit address (sent MSB first)
    /// - `write_data`: Data to write after the header
    /// - `read_buf`: Buffer to read data into
    ///
    /// The whole command is framed by one chip-select assertion, which must
    /// be released on every exit path, including errors.
    async fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()>;

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);
}
