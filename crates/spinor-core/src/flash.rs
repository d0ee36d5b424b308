//! Flash device handle
//!
//! [`Flash`] owns the programmer for one physical chip and exposes the full
//! operation catalog. Exactly one handle exists per chip; it holds exclusive
//! access to the bus during every transaction.
//!
//! Status bits are chip-owned state that changes asynchronously (an erase
//! completes on its own clock), so the handle never caches them: every query
//! re-reads the register.

use crate::chip::{EraseSize, JedecId, StatusRegister};
use crate::error::{Error, Result};
use crate::programmer::SpiMaster;
use crate::protocol::spi25;
use crate::spi::Status1;
use maybe_async::maybe_async;

/// Handle for a single W25Q32JV-class flash chip
pub struct Flash<M> {
    master: M,
}

impl<M> Flash<M> {
    /// Create a handle over the given programmer
    ///
    /// No bus traffic happens here; call [`Flash::init`] to probe the chip.
    pub fn new(master: M) -> Self {
        Self { master }
    }

    /// Access the underlying programmer
    pub fn master(&self) -> &M {
        &self.master
    }

    /// Mutable access to the underlying programmer
    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    /// Consume the handle and return the programmer
    pub fn into_inner(self) -> M {
        self.master
    }
}

impl<M: SpiMaster> Flash<M> {
    /// Probe the chip and wait until it is idle
    ///
    /// A bus with no chip (or a chip held in reset) reads back all-0 or
    /// all-1; either answer is rejected as [`Error::ChipNotFound`].
    #[maybe_async]
    pub async fn init(&mut self) -> Result<JedecId> {
        let id = self.jedec_id().await?;
        let bytes = id.bytes();
        if bytes == [0x00; 3] || bytes == [0xFF; 3] {
            return Err(Error::ChipNotFound);
        }
        log::debug!(
            "detected flash: mfr={:#04x} type={:#04x} capacity={:#04x}",
            id.manufacturer_id,
            id.memory_type,
            id.capacity
        );
        self.wait_idle().await?;
        Ok(id)
    }

    // =========================================================================
    // Identification
    // =========================================================================

    /// Read the JEDEC ID
    #[maybe_async]
    pub async fn jedec_id(&mut self) -> Result<JedecId> {
        let bytes = spi25::read_jedec_id(&mut self.master).await?;
        Ok(JedecId::from_bytes(bytes))
    }

    /// Read the raw Manufacturer/Device ID response window
    #[maybe_async]
    pub async fn manufacturer_device_id(&mut self) -> Result<[u8; 5]> {
        spi25::read_manufacturer_device_id(&mut self.master).await
    }

    /// Read the raw Unique ID response window
    #[maybe_async]
    pub async fn unique_id(&mut self) -> Result<[u8; 5]> {
        spi25::read_unique_id(&mut self.master).await
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Take a fresh snapshot of status register 1
    #[maybe_async]
    pub async fn status1(&mut self) -> Result<Status1> {
        Ok(Status1::from_byte(spi25::read_status1(&mut self.master).await?))
    }

    /// True while an internal erase/program/register-write cycle runs
    #[maybe_async]
    pub async fn is_busy(&mut self) -> Result<bool> {
        spi25::is_busy(&mut self.master).await
    }

    /// True if the write enable latch is currently set
    #[maybe_async]
    pub async fn is_write_enabled(&mut self) -> Result<bool> {
        spi25::check_wel(&mut self.master).await
    }

    /// The three block protect bits as a value in 0..=7
    #[maybe_async]
    pub async fn block_protect_bits(&mut self) -> Result<u8> {
        Ok(self.status1().await?.block_protect())
    }

    /// Read one of the three status registers
    #[maybe_async]
    pub async fn read_status(&mut self, register: StatusRegister) -> Result<u8> {
        match register {
            StatusRegister::Sr1 => spi25::read_status1(&mut self.master).await,
            StatusRegister::Sr2 => spi25::read_status2(&mut self.master).await,
            StatusRegister::Sr3 => spi25::read_status3(&mut self.master).await,
        }
    }

    /// Write one of the three status registers
    #[maybe_async]
    pub async fn write_status(&mut self, register: StatusRegister, value: u8) -> Result<()> {
        match register {
            StatusRegister::Sr1 => spi25::write_status1(&mut self.master, value).await,
            StatusRegister::Sr2 => spi25::write_status2(&mut self.master, value).await,
            StatusRegister::Sr3 => spi25::write_status3(&mut self.master, value).await,
        }
    }

    /// Block until the busy bit clears (bounded by the chip-erase worst case)
    #[maybe_async]
    pub async fn wait_idle(&mut self) -> Result<()> {
        spi25::wait_ready(
            &mut self.master,
            spi25::POLL_INTERVAL_US,
            spi25::IDLE_TIMEOUT_US,
        )
        .await
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// Addresses are 24-bit; the caller is responsible for staying within
    /// the chip capacity.
    #[maybe_async]
    pub async fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        spi25::read_3b(&mut self.master, addr, buf).await
    }

    /// Fast Read variant of [`Flash::read`]
    #[maybe_async]
    pub async fn fast_read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        spi25::fast_read_3b(&mut self.master, addr, buf).await
    }

    // =========================================================================
    // Program and erase
    // =========================================================================

    /// Program up to 256 bytes within one page
    ///
    /// The caller must not cross a 256-byte page boundary; the chip wraps
    /// within the page if it does.
    #[maybe_async]
    pub async fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        spi25::program_page_3b(&mut self.master, addr, data).await
    }

    /// Erase the aligned region of the given size containing `addr`
    #[maybe_async]
    pub async fn erase(&mut self, size: EraseSize, addr: u32) -> Result<()> {
        log::debug!("erasing {} bytes at {:#08x}", size.len(), addr);
        spi25::erase_block(
            &mut self.master,
            size.opcode(),
            addr,
            spi25::POLL_INTERVAL_US,
            size.timeout_us(),
        )
        .await
    }

    /// Erase the entire chip
    #[maybe_async]
    pub async fn chip_erase(&mut self) -> Result<()> {
        log::debug!("erasing entire chip");
        spi25::chip_erase(&mut self.master).await
    }

    // =========================================================================
    // Block protection
    // =========================================================================

    /// Set all block protect bits
    #[maybe_async]
    pub async fn global_lock(&mut self) -> Result<()> {
        spi25::global_block_lock(&mut self.master).await
    }

    /// Clear all block protect bits
    #[maybe_async]
    pub async fn global_unlock(&mut self) -> Result<()> {
        spi25::global_block_unlock(&mut self.master).await
    }

    // =========================================================================
    // Power and reset
    // =========================================================================

    /// Enter the power-down state
    #[maybe_async]
    pub async fn power_down(&mut self) -> Result<()> {
        spi25::power_down(&mut self.master).await
    }

    /// Wake the chip from power-down
    #[maybe_async]
    pub async fn release_power_down(&mut self) -> Result<()> {
        spi25::release_power_down(&mut self.master).await
    }

    /// Wake the chip from power-down and capture the device ID
    ///
    /// Returns the raw 4-byte response window; the device ID is the last
    /// byte.
    #[maybe_async]
    pub async fn release_power_down_id(&mut self) -> Result<[u8; 4]> {
        spi25::release_power_down_id(&mut self.master).await
    }

    /// Software-reset the chip (Enable Reset, delay, Reset Device)
    #[maybe_async]
    pub async fn reset(&mut self) -> Result<()> {
        spi25::software_reset(&mut self.master).await
    }
}
