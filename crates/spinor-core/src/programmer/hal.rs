//! Adapter from `embedded-hal` 1.x traits to [`SpiTransport`]
//!
//! Use this when the host exposes the SPI peripheral through the standard
//! [`embedded_hal::spi::SpiBus`] trait and the chip-select line as a plain
//! [`embedded_hal::digital::OutputPin`]. The constructor configures CS into
//! its resting state (deasserted, logic high) before any transaction runs.
//!
//! The chip has no error channel of its own, so every HAL-level fault is
//! collapsed into [`Error::SpiTransferFailed`].

use crate::error::{Error, Result};
use crate::programmer::SpiTransport;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// [`SpiTransport`] over an `embedded-hal` bus, CS pin and delay provider
pub struct HalTransport<B, P, D> {
    bus: B,
    cs: P,
    delay: D,
}

impl<B, P, D> HalTransport<B, P, D>
where
    B: SpiBus<u8>,
    P: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the bus, CS pin and delay; CS is driven high
    pub fn new(bus: B, mut cs: P, delay: D) -> Result<Self> {
        cs.set_high().map_err(|_| Error::SpiTransferFailed)?;
        Ok(Self { bus, cs, delay })
    }

    /// Release the bus, CS pin and delay provider
    pub fn release(self) -> (B, P, D) {
        (self.bus, self.cs, self.delay)
    }
}

impl<B, P, D> SpiTransport for HalTransport<B, P, D>
where
    B: SpiBus<u8>,
    P: OutputPin,
    D: DelayNs,
{
    fn assert_cs(&mut self) -> Result<()> {
        self.cs.set_low().map_err(|_| Error::SpiTransferFailed)
    }

    fn release_cs(&mut self) -> Result<()> {
        // SpiBus requires a flush before CS may change state
        self.bus.flush().map_err(|_| Error::SpiTransferFailed)?;
        self.cs.set_high().map_err(|_| Error::SpiTransferFailed)
    }

    fn transfer_byte(&mut self, out: u8) -> Result<u8> {
        let mut buf = [out];
        self.bus
            .transfer_in_place(&mut buf)
            .map_err(|_| Error::SpiTransferFailed)?;
        Ok(buf[0])
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
