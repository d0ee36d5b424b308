//! Chip geometry and identification types
//!
//! Parameters of the W25Q32JV: a 32 Mbit (4 MiB) serial NOR flash with
//! 256-byte program pages and 4 KiB / 32 KiB / 64 KiB erase granularities.
//!
//! The driver itself does not bounds-check addresses against these values;
//! they are provided for callers and emulators.

use crate::spi::opcodes;

/// Program page size in bytes
pub const PAGE_SIZE: usize = 256;
/// Smallest erase granularity in bytes
pub const SECTOR_SIZE: usize = 4 * 1024;
/// 32 KiB erase block size in bytes
pub const BLOCK_32K: usize = 32 * 1024;
/// 64 KiB erase block size in bytes
pub const BLOCK_64K: usize = 64 * 1024;
/// Total chip size in bytes (32 Mbit)
pub const CHIP_SIZE: usize = 4 * 1024 * 1024;

/// JEDEC manufacturer ID for Winbond
pub const MANUFACTURER_WINBOND: u8 = 0xEF;

/// JEDEC manufacturer and device identification (RDID 9Fh response)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JedecId {
    /// Manufacturer ID (0xEF for Winbond)
    pub manufacturer_id: u8,
    /// Memory type (0x40 for the JV family)
    pub memory_type: u8,
    /// Capacity code (0x16 = 32 Mbit)
    pub capacity: u8,
}

impl JedecId {
    /// Build from the 3 bytes returned after the RDID opcode
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self {
            manufacturer_id: bytes[0],
            memory_type: bytes[1],
            capacity: bytes[2],
        }
    }

    /// The raw 3-byte ID in chip transmission order
    pub const fn bytes(&self) -> [u8; 3] {
        [self.manufacturer_id, self.memory_type, self.capacity]
    }
}

/// Erase granularity, with the opcode and timing bound for each size
///
/// The 32 KiB and 64 KiB erases share one routine; only the opcode differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseSize {
    /// 4 KiB sector erase
    Sector4K,
    /// 32 KiB block erase
    Block32K,
    /// 64 KiB block erase
    Block64K,
}

impl EraseSize {
    /// The erase opcode for this granularity
    pub const fn opcode(&self) -> u8 {
        match self {
            Self::Sector4K => opcodes::SE,
            Self::Block32K => opcodes::BE_52,
            Self::Block64K => opcodes::BE_D8,
        }
    }

    /// The number of bytes erased
    pub const fn len(&self) -> usize {
        match self {
            Self::Sector4K => SECTOR_SIZE,
            Self::Block32K => BLOCK_32K,
            Self::Block64K => BLOCK_64K,
        }
    }

    /// Polling timeout, sized from the datasheet maximum erase times
    /// (400 ms / 1.6 s / 2 s) with headroom
    pub const fn timeout_us(&self) -> u32 {
        match self {
            Self::Sector4K => 1_000_000,
            Self::Block32K => 3_000_000,
            Self::Block64K => 4_000_000,
        }
    }
}

/// One of the three 8-bit status registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRegister {
    /// Status Register 1 (busy, WEL, block protect bits)
    Sr1,
    /// Status Register 2 (QE, security register locks)
    Sr2,
    /// Status Register 3 (WPS, driver strength)
    Sr3,
}

impl StatusRegister {
    /// The read opcode for this register
    pub const fn read_opcode(&self) -> u8 {
        match self {
            Self::Sr1 => opcodes::RDSR,
            Self::Sr2 => opcodes::RDSR2,
            Self::Sr3 => opcodes::RDSR3,
        }
    }

    /// The write opcode for this register
    pub const fn write_opcode(&self) -> u8 {
        match self {
            Self::Sr1 => opcodes::WRSR,
            Self::Sr2 => opcodes::WRSR2,
            Self::Sr3 => opcodes::WRSR3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_opcodes_match_wire_table() {
        assert_eq!(EraseSize::Sector4K.opcode(), 0x20);
        assert_eq!(EraseSize::Block32K.opcode(), 0x52);
        assert_eq!(EraseSize::Block64K.opcode(), 0xD8);
    }

    #[test]
    fn status_register_opcode_pairs() {
        assert_eq!(StatusRegister::Sr1.read_opcode(), 0x05);
        assert_eq!(StatusRegister::Sr1.write_opcode(), 0x01);
        assert_eq!(StatusRegister::Sr2.read_opcode(), 0x35);
        assert_eq!(StatusRegister::Sr2.write_opcode(), 0x31);
        assert_eq!(StatusRegister::Sr3.read_opcode(), 0x15);
        assert_eq!(StatusRegister::Sr3.write_opcode(), 0x11);
    }

    #[test]
    fn jedec_id_round_trip() {
        let id = JedecId::from_bytes([0xEF, 0x40, 0x16]);
        assert_eq!(id.manufacturer_id, MANUFACTURER_WINBOND);
        assert_eq!(id.bytes(), [0xEF, 0x40, 0x16]);
    }
}
