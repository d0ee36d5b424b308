//! Generic byte-level SPI transport and transaction encoder
//!
//! Many hosts expose SPI to software as three primitives: drive chip select,
//! release chip select, and exchange one full-duplex byte. [`SpiTransport`]
//! captures that boundary, and [`TransportMaster`] turns any such transport
//! into a [`SpiMaster`] by encoding each [`SpiCommand`] as a chip-select
//! bracketed byte sequence:
//!
//! 1. assert CS
//! 2. transfer the opcode byte
//! 3. transfer the 3 address bytes, most-significant first (if any)
//! 4. write phase: transfer each data byte in order, discarding responses;
//!    read phase: transfer fill bytes and collect the responses in order
//! 5. release CS
//!
//! CS release is handled by a drop guard, so it happens on every exit path -
//! a transport fault mid-phase must not leave the bus locked up.

use crate::error::Result;
use crate::programmer::SpiMaster;
use crate::spi::SpiCommand;
use maybe_async::maybe_async;

/// Byte clocked out during the read phase while the chip drives data back
const FILL_BYTE: u8 = 0x00;

/// Byte-level SPI transport owning the chip-select line
///
/// All methods are blocking. The transfer is full-duplex and MSB-first.
/// Errors model a catastrophic bus fault; a well-behaved transport never
/// fails, and the protocol layer has no retry - a fault aborts the
/// transaction (after CS release).
pub trait SpiTransport {
    /// Drive chip select low, opening a transaction
    fn assert_cs(&mut self) -> Result<()>;

    /// Drive chip select high, closing the transaction
    fn release_cs(&mut self) -> Result<()>;

    /// Exchange one byte: shift `out` to the chip, return what it drove back
    fn transfer_byte(&mut self, out: u8) -> Result<u8>;

    /// Busy-wait for the given number of microseconds
    fn delay_us(&mut self, us: u32);
}

/// Scoped chip-select assertion
///
/// Asserts CS on construction and releases it on drop, covering error and
/// early-return paths uniformly. A release failure at drop time cannot be
/// propagated; it is logged and swallowed.
struct CsGuard<'a, T: SpiTransport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: SpiTransport + ?Sized> CsGuard<'a, T> {
    fn new(transport: &'a mut T) -> Result<Self> {
        transport.assert_cs()?;
        Ok(Self { transport })
    }

    fn transfer(&mut self, out: u8) -> Result<u8> {
        self.transport.transfer_byte(out)
    }
}

impl<T: SpiTransport + ?Sized> Drop for CsGuard<'_, T> {
    fn drop(&mut self) {
        if self.transport.release_cs().is_err() {
            log::warn!("chip select release failed");
        }
    }
}

/// [`SpiMaster`] built on top of a byte-level [`SpiTransport`]
pub struct TransportMaster<T> {
    transport: T,
}

impl<T: SpiTransport> TransportMaster<T> {
    /// Wrap a transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the master and return the transport
    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[maybe_async(AFIT)]
impl<T: SpiTransport> SpiMaster for TransportMaster<T> {
    async fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        let mut bus = CsGuard::new(&mut self.transport)?;

        bus.transfer(cmd.opcode)?;

        if let Some(address) = cmd.address {
            let mut addr = [0u8; 3];
            cmd.address_width.encode(address, &mut addr);
            for &byte in &addr[..cmd.address_width.bytes() as usize] {
                bus.transfer(byte)?;
            }
        }

        for &byte in cmd.write_data {
            bus.transfer(byte)?;
        }

        for slot in cmd.read_buf.iter_mut() {
            *slot = bus.transfer(FILL_BYTE)?;
        }

        Ok(())
    }

    async fn delay_us(&mut self, us: u32) {
        self.transport.delay_us(us);
    }
}
