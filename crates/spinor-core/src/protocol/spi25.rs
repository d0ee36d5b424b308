//! SPI25 protocol implementation
//!
//! This module implements the W25Q32JV command sequences as free functions
//! over any [`SpiMaster`]. Every entry is one or two transactions; mutating
//! operations are bracketed by the write-enable-latch discipline and a
//! busy-poll to quiescence.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async (for Embassy, tokio)
//!
//! ## Write enable latch
//!
//! The chip refuses program, erase and register-write commands unless the
//! latch was set by a Write Enable immediately before, and it clears the
//! latch itself after every such cycle completes. [`write_enable`] is
//! issue-then-trust: it does not read the status register back, mirroring
//! the chip's guarantee that the latch is set synchronously with the
//! command. Callers wanting certainty can follow up with [`check_wel`].
//!
//! ## Busy polling
//!
//! Operations that start an internal cycle poll status register 1 until the
//! busy bit clears, with a fixed 1 ms inter-poll delay and a per-operation
//! timeout sized from the datasheet maximum cycle times. The bound is a
//! deliberate hardening over the chip vendor's reference flow, which spins
//! forever on a hung part.

use crate::chip::PAGE_SIZE;
use crate::error::{Error, Result};
use crate::programmer::SpiMaster;
use crate::spi::{opcodes, SpiCommand, Status1};
use maybe_async::maybe_async;

/// Fixed delay between busy-bit polls
pub const POLL_INTERVAL_US: u32 = 1_000;

/// Page program timeout (datasheet max 3 ms)
pub const PAGE_PROGRAM_TIMEOUT_US: u32 = 10_000;
/// Status register write timeout (datasheet max 15 ms)
pub const STATUS_WRITE_TIMEOUT_US: u32 = 100_000;
/// Chip erase timeout (datasheet max 25 s)
pub const CHIP_ERASE_TIMEOUT_US: u32 = 50_000_000;
/// Bound for waiting out whatever operation may still be in flight;
/// chip erase is the worst case
pub const IDLE_TIMEOUT_US: u32 = CHIP_ERASE_TIMEOUT_US;
/// Delay between Enable Reset and Reset Device
pub const RESET_DELAY_US: u32 = 1_000;

// ============================================================================
// Identification
// ============================================================================

/// Read the JEDEC ID (9Fh): manufacturer, memory type, capacity
#[maybe_async]
pub async fn read_jedec_id<M: SpiMaster + ?Sized>(master: &mut M) -> Result<[u8; 3]> {
    let mut buf = [0u8; 3];
    let mut cmd = SpiCommand::read_reg(opcodes::RDID, &mut buf);
    master.execute(&mut cmd).await?;
    Ok(buf)
}

/// Read the Manufacturer/Device ID (90h)
///
/// Returns the raw 5-byte response window in chip transmission order. The
/// manufacturer and device ID sit in the last two bytes; the leading bytes
/// are the dummy/address field of the instruction.
#[maybe_async]
pub async fn read_manufacturer_device_id<M: SpiMaster + ?Sized>(
    master: &mut M,
) -> Result<[u8; 5]> {
    let mut buf = [0u8; 5];
    let mut cmd = SpiCommand::read_reg(opcodes::REMS, &mut buf);
    master.execute(&mut cmd).await?;
    Ok(buf)
}

/// Read the Unique ID Number (48h)
///
/// Returns the raw 5-byte response window in chip transmission order.
#[maybe_async]
pub async fn read_unique_id<M: SpiMaster + ?Sized>(master: &mut M) -> Result<[u8; 5]> {
    let mut buf = [0u8; 5];
    let mut cmd = SpiCommand::read_reg(opcodes::RDUID, &mut buf);
    master.execute(&mut cmd).await?;
    Ok(buf)
}

// ============================================================================
// Status registers
// ============================================================================

/// Read the status register 1
#[maybe_async]
pub async fn read_status1<M: SpiMaster + ?Sized>(master: &mut M) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(opcodes::RDSR, &mut buf);
    master.execute(&mut cmd).await?;
    Ok(buf[0])
}

/// Read the status register 2
#[maybe_async]
pub async fn read_status2<M: SpiMaster + ?Sized>(master: &mut M) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(opcodes::RDSR2, &mut buf);
    master.execute(&mut cmd).await?;
    Ok(buf[0])
}

/// Read the status register 3
#[maybe_async]
pub async fn read_status3<M: SpiMaster + ?Sized>(master: &mut M) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(opcodes::RDSR3, &mut buf);
    master.execute(&mut cmd).await?;
    Ok(buf[0])
}

/// Write a status register value through its write opcode
///
/// Register writes wait for the chip to be idle first, rather than polling
/// after: the write itself starts a short internal cycle that the next
/// mutating operation will wait out.
#[maybe_async]
async fn write_register<M: SpiMaster + ?Sized>(master: &mut M, opcode: u8, value: u8) -> Result<()> {
    wait_ready(master, POLL_INTERVAL_US, IDLE_TIMEOUT_US).await?;
    write_enable(master).await?;
    let data = [value];
    let mut cmd = SpiCommand::write_reg(opcode, &data);
    master.execute(&mut cmd).await
}

/// Write the status register 1
#[maybe_async]
pub async fn write_status1<M: SpiMaster + ?Sized>(master: &mut M, value: u8) -> Result<()> {
    write_register(master, opcodes::WRSR, value).await
}

/// Write the status register 2
#[maybe_async]
pub async fn write_status2<M: SpiMaster + ?Sized>(master: &mut M, value: u8) -> Result<()> {
    write_register(master, opcodes::WRSR2, value).await
}

/// Write the status register 3
#[maybe_async]
pub async fn write_status3<M: SpiMaster + ?Sized>(master: &mut M, value: u8) -> Result<()> {
    write_register(master, opcodes::WRSR3, value).await
}

// ============================================================================
// Write enable latch
// ============================================================================

/// Send the Write Enable command
///
/// Issue-then-trust: the latch state is not read back.
#[maybe_async]
pub async fn write_enable<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WREN);
    master.execute(&mut cmd).await
}

/// Send the Write Disable command
#[maybe_async]
pub async fn write_disable<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WRDI);
    master.execute(&mut cmd).await
}

/// Send the Volatile SR Write Enable command
///
/// Permits the next status register write to change the volatile copy only.
#[maybe_async]
pub async fn volatile_sr_write_enable<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::VSRWE);
    master.execute(&mut cmd).await
}

/// Check if the Write Enable Latch is set
#[maybe_async]
pub async fn check_wel<M: SpiMaster + ?Sized>(master: &mut M) -> Result<bool> {
    let status = Status1::from_byte(read_status1(master).await?);
    Ok(status.write_enable_latch())
}

/// Check if a write or erase operation is in progress
#[maybe_async]
pub async fn is_busy<M: SpiMaster + ?Sized>(master: &mut M) -> Result<bool> {
    let status = Status1::from_byte(read_status1(master).await?);
    Ok(status.busy())
}

/// Wait for the busy bit to clear
///
/// Polls status register 1 until the busy bit clears. The `poll_delay_us`
/// parameter specifies the delay between polls and `timeout_us` the maximum
/// time to wait before returning [`Error::Timeout`].
#[maybe_async]
pub async fn wait_ready<M: SpiMaster + ?Sized>(
    master: &mut M,
    poll_delay_us: u32,
    timeout_us: u32,
) -> Result<()> {
    let max_polls = if poll_delay_us > 0 {
        timeout_us / poll_delay_us
    } else {
        timeout_us // Fall back to polling once per microsecond
    };

    for _ in 0..max_polls {
        let status = Status1::from_byte(read_status1(master).await?);
        if !status.busy() {
            return Ok(());
        }
        if poll_delay_us > 0 {
            master.delay_us(poll_delay_us).await;
        }
    }

    Err(Error::Timeout)
}

// ============================================================================
// Read
// ============================================================================

/// Read data with 3-byte addressing (03h)
#[maybe_async]
pub async fn read_3b<M: SpiMaster + ?Sized>(
    master: &mut M,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    let mut cmd = SpiCommand::read_3b(opcodes::READ, addr, buf);
    master.execute(&mut cmd).await
}

/// Fast Read with 3-byte addressing (0Bh)
///
/// Same framing as [`read_3b`]; the distinct opcode allows the chip to run
/// at its maximum clock rate.
#[maybe_async]
pub async fn fast_read_3b<M: SpiMaster + ?Sized>(
    master: &mut M,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    let mut cmd = SpiCommand::read_3b(opcodes::FAST_READ, addr, buf);
    master.execute(&mut cmd).await
}

// ============================================================================
// Program and erase
// ============================================================================

/// Program a single page (02h, up to 256 bytes)
///
/// The data must not cross a 256-byte page boundary; the chip wraps within
/// the page if it does, and the driver does not check. Only the length is
/// validated here.
#[maybe_async]
pub async fn program_page_3b<M: SpiMaster + ?Sized>(
    master: &mut M,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    if data.is_empty() || data.len() > PAGE_SIZE {
        return Err(Error::InvalidLength);
    }

    write_enable(master).await?;

    let mut cmd = SpiCommand::write_3b(opcodes::PP, addr, data);
    master.execute(&mut cmd).await?;

    wait_ready(master, POLL_INTERVAL_US, PAGE_PROGRAM_TIMEOUT_US).await
}

/// Erase a sector or block at the given address
///
/// The opcode selects the granularity (20h = 4 KiB, 52h = 32 KiB,
/// D8h = 64 KiB); the chip erases the aligned region containing `addr`.
/// The timeout should match the expected erase time for the granularity.
#[maybe_async]
pub async fn erase_block<M: SpiMaster + ?Sized>(
    master: &mut M,
    opcode: u8,
    addr: u32,
    poll_delay_us: u32,
    timeout_us: u32,
) -> Result<()> {
    write_enable(master).await?;

    let mut cmd = SpiCommand::erase_3b(opcode, addr);
    master.execute(&mut cmd).await?;

    wait_ready(master, poll_delay_us, timeout_us).await
}

/// Erase the entire chip (60h)
#[maybe_async]
pub async fn chip_erase<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    write_enable(master).await?;

    let mut cmd = SpiCommand::simple(opcodes::CE);
    master.execute(&mut cmd).await?;

    wait_ready(master, POLL_INTERVAL_US, CHIP_ERASE_TIMEOUT_US).await
}

// ============================================================================
// Block protection
// ============================================================================

/// Set all block protect bits (7Eh)
#[maybe_async]
pub async fn global_block_lock<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::GBL);
    master.execute(&mut cmd).await
}

/// Clear all block protect bits (98h)
#[maybe_async]
pub async fn global_block_unlock<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::GBUL);
    master.execute(&mut cmd).await
}

// ============================================================================
// Power management
// ============================================================================

/// Enter the power-down state (B9h)
///
/// While powered down the chip ignores every instruction except Release
/// Power-down.
#[maybe_async]
pub async fn power_down<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::DP);
    master.execute(&mut cmd).await
}

/// Release the chip from power-down without reading the device ID (ABh)
#[maybe_async]
pub async fn release_power_down<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::RDP);
    master.execute(&mut cmd).await
}

/// Release the chip from power-down and read the device ID (ABh)
///
/// Returns the raw 4-byte response window; the device ID is the last byte.
#[maybe_async]
pub async fn release_power_down_id<M: SpiMaster + ?Sized>(master: &mut M) -> Result<[u8; 4]> {
    let mut buf = [0u8; 4];
    let mut cmd = SpiCommand::read_reg(opcodes::RDP, &mut buf);
    master.execute(&mut cmd).await?;
    Ok(buf)
}

// ============================================================================
// Software Reset
// ============================================================================

/// Arm the software reset (66h)
#[maybe_async]
pub async fn enable_reset<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::RSTEN);
    master.execute(&mut cmd).await
}

/// Reset the device (99h); only valid directly after [`enable_reset`]
#[maybe_async]
pub async fn reset_device<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::RST);
    master.execute(&mut cmd).await
}

/// Send the full software reset sequence: Enable Reset, delay, Reset Device
///
/// Resets all volatile state, including the write enable latch.
#[maybe_async]
pub async fn software_reset<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    enable_reset(master).await?;
    master.delay_us(RESET_DELAY_US).await;
    reset_device(master).await
}
