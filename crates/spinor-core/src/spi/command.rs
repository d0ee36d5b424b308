//! SPI command structure

use super::AddressWidth;

/// A single SPI transaction
///
/// Designed to avoid allocation - uses slices for data.
/// The lifetime parameter `'a` ties the command to the buffers it references.
///
/// A transaction lives for exactly one chip-select assertion: opcode,
/// optional 3-byte address, then either a write phase or a read phase.
pub struct SpiCommand<'a> {
    /// The opcode byte
    pub opcode: u8,

    /// Address (if any)
    pub address: Option<u32>,

    /// Address width
    pub address_width: AddressWidth,

    /// Data to write after opcode/address
    pub write_data: &'a [u8],

    /// Buffer to read into (mutable)
    pub read_buf: &'a mut [u8],
}

impl<'a> SpiCommand<'a> {
    /// Create a simple command with no address or data (e.g., WREN, RSTEN)
    pub fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::None,
            write_data: &[],
            read_buf: &mut [],
        }
    }

    /// Create a read register command with no address (e.g., RDSR, RDID)
    pub fn read_reg(opcode: u8, buf: &'a mut [u8]) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::None,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a write register command with no address (e.g., WRSR)
    pub fn write_reg(opcode: u8, data: &'a [u8]) -> Self {
        Self {
            opcode,
            address: None,
            address_width: AddressWidth::None,
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Create a read command with 3-byte address (e.g., READ)
    pub fn read_3b(opcode: u8, addr: u32, buf: &'a mut [u8]) -> Self {
        Self {
            opcode,
            address: Some(addr),
            address_width: AddressWidth::ThreeByte,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a write command with 3-byte address (e.g., PP)
    pub fn write_3b(opcode: u8, addr: u32, data: &'a [u8]) -> Self {
        Self {
            opcode,
            address: Some(addr),
            address_width: AddressWidth::ThreeByte,
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Create an erase command with 3-byte address and no data phase
    pub fn erase_3b(opcode: u8, addr: u32) -> Self {
        Self {
            opcode,
            address: Some(addr),
            address_width: AddressWidth::ThreeByte,
            write_data: &[],
            read_buf: &mut [],
        }
    }

    /// Returns true if this command has a read phase
    pub fn has_read(&self) -> bool {
        !self.read_buf.is_empty()
    }

    /// Returns true if this command has a write phase
    pub fn has_write(&self) -> bool {
        !self.write_data.is_empty()
    }

    /// Returns true if this command has an address phase
    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// Number of header bytes (opcode + address)
    pub fn header_len(&self) -> usize {
        1 + self.address_width.bytes() as usize
    }

    /// Encode the header (opcode + address) into the given buffer
    ///
    /// The buffer must be at least `header_len()` bytes long.
    pub fn encode_header(&self, buf: &mut [u8]) {
        buf[0] = self.opcode;
        if let Some(address) = self.address {
            self.address_width.encode(address, &mut buf[1..]);
        }
    }

    /// Calculate the total number of bytes transferred while CS is asserted
    pub fn total_bytes(&self) -> usize {
        self.header_len() + self.write_data.len() + self.read_buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::opcodes;

    #[test]
    fn simple_command_is_one_byte() {
        let cmd = SpiCommand::simple(opcodes::WREN);
        assert_eq!(cmd.header_len(), 1);
        assert_eq!(cmd.total_bytes(), 1);
        assert!(!cmd.has_address());
        assert!(!cmd.has_read());
        assert!(!cmd.has_write());
    }

    #[test]
    fn read_header_encodes_opcode_then_address() {
        let mut buf = [0u8; 8];
        let cmd = SpiCommand::read_3b(opcodes::READ, 0x00AB_CDEF, &mut buf);
        let mut header = [0u8; 4];
        cmd.encode_header(&mut header);
        assert_eq!(header, [0x03, 0xAB, 0xCD, 0xEF]);
        assert_eq!(cmd.total_bytes(), 4 + 8);
    }

    #[test]
    fn erase_has_address_but_no_data() {
        let cmd = SpiCommand::erase_3b(opcodes::SE, 0x1000);
        assert!(cmd.has_address());
        assert!(!cmd.has_read());
        assert!(!cmd.has_write());
        assert_eq!(cmd.total_bytes(), 4);
    }
}
