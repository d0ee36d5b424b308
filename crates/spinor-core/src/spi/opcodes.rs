//! W25Q32JV command opcodes
//!
//! This module defines the instruction set of the W25Q32JV as fixed in the
//! datasheet. The table is the wire protocol: the byte values must match
//! exactly for the chip to respond.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;
/// Volatile SR Write Enable - the next status register write is volatile only
pub const VSRWE: u8 = 0x50;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Status Register 2
pub const RDSR2: u8 = 0x35;
/// Read Status Register 3
pub const RDSR3: u8 = 0x15;
/// Write Status Register 1
pub const WRSR: u8 = 0x01;
/// Write Status Register 2
pub const WRSR2: u8 = 0x31;
/// Write Status Register 3
pub const WRSR3: u8 = 0x11;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;
/// Read Electronic Manufacturer & Device ID (legacy)
pub const REMS: u8 = 0x90;
/// Read Unique ID Number
pub const RDUID: u8 = 0x48;

// ============================================================================
// Read commands
// ============================================================================

/// Read Data (up to ~33 MHz)
pub const READ: u8 = 0x03;
/// Fast Read (same framing, usable at the maximum clock)
pub const FAST_READ: u8 = 0x0B;

// ============================================================================
// Page Program
// ============================================================================

/// Page Program (up to 256 bytes, must not cross a page boundary)
pub const PP: u8 = 0x02;

// ============================================================================
// Erase commands
// ============================================================================

/// Sector Erase (4 KiB)
pub const SE: u8 = 0x20;
/// Block Erase 32 KiB
pub const BE_52: u8 = 0x52;
/// Block Erase 64 KiB
pub const BE_D8: u8 = 0xD8;
/// Chip Erase (entire device)
pub const CE: u8 = 0x60;

// ============================================================================
// Block protection
// ============================================================================

/// Global Block Lock - sets all protect bits
pub const GBL: u8 = 0x7E;
/// Global Block Unlock - clears all protect bits
pub const GBUL: u8 = 0x98;

// ============================================================================
// Power management
// ============================================================================

/// Power Down - only Release Power-down wakes the chip again
pub const DP: u8 = 0xB9;
/// Release Power-down / Device ID
pub const RDP: u8 = 0xAB;

// ============================================================================
// Software Reset
// ============================================================================

/// Enable Reset - must immediately precede Reset Device
pub const RSTEN: u8 = 0x66;
/// Reset Device - only valid directly after Enable Reset
pub const RST: u8 = 0x99;
