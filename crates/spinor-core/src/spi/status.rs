//! Status register views
//!
//! The chip owns these bits; a value of one of these types is a snapshot of
//! a single register read and is never cached by the driver. Busy and
//! write-enable-latch are both derived from the same status register 1 byte.

use bitflags::bitflags;

bitflags! {
    /// Status Register 1
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status1: u8 {
        /// Erase/program/register-write cycle in progress
        const BUSY = 1 << 0;
        /// Write Enable Latch
        const WEL = 1 << 1;
        /// Block Protect bit 0
        const BP0 = 1 << 2;
        /// Block Protect bit 1
        const BP1 = 1 << 3;
        /// Block Protect bit 2
        const BP2 = 1 << 4;
        /// Top/Bottom Protect
        const TB = 1 << 5;
        /// Sector/Block Protect
        const SEC = 1 << 6;
        /// Status Register Protect 0
        const SRP = 1 << 7;
    }
}

bitflags! {
    /// Status Register 2
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status2: u8 {
        /// Status Register Lock
        const SRL = 1 << 0;
        /// Quad Enable
        const QE = 1 << 1;
        /// Security Register Lock bit 1
        const LB1 = 1 << 3;
        /// Security Register Lock bit 2
        const LB2 = 1 << 4;
        /// Security Register Lock bit 3
        const LB3 = 1 << 5;
        /// Complement Protect
        const CMP = 1 << 6;
        /// Erase/Program Suspend Status
        const SUS = 1 << 7;
    }
}

bitflags! {
    /// Status Register 3
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status3: u8 {
        /// Write Protect Selection
        const WPS = 1 << 2;
        /// Output Driver Strength bit 0
        const DRV0 = 1 << 5;
        /// Output Driver Strength bit 1
        const DRV1 = 1 << 6;
    }
}

impl Status1 {
    /// Build a snapshot from a raw register read, keeping reserved bits
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// True while an internal erase/program/register-write cycle runs
    pub const fn busy(&self) -> bool {
        self.bits() & Self::BUSY.bits() != 0
    }

    /// True if the write enable latch is set
    pub const fn write_enable_latch(&self) -> bool {
        self.bits() & Self::WEL.bits() != 0
    }

    /// The three block protect bits (BP2..BP0) as a value in 0..=7
    pub const fn block_protect(&self) -> u8 {
        (self.bits() >> 2) & 0x07
    }
}

impl Status2 {
    /// Build a snapshot from a raw register read, keeping reserved bits
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }
}

impl Status3 {
    /// Build a snapshot from a raw register read, keeping reserved bits
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_and_wel_come_from_one_byte() {
        let status = Status1::from_byte(0x03);
        assert!(status.busy());
        assert!(status.write_enable_latch());

        let status = Status1::from_byte(0x00);
        assert!(!status.busy());
        assert!(!status.write_enable_latch());
    }

    #[test]
    fn block_protect_bits() {
        assert_eq!(Status1::from_byte(0b0001_1100).block_protect(), 0b111);
        assert_eq!(Status1::from_byte(0b0000_1000).block_protect(), 0b010);
        assert_eq!(Status1::from_byte(0x03).block_protect(), 0);
    }

    #[test]
    fn reserved_bits_survive_round_trip() {
        let status = Status2::from_byte(0xFF);
        assert_eq!(status.bits(), 0xFF);
    }
}
