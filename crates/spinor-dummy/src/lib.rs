//! spinor-dummy - In-memory flash emulator for testing
//!
//! This crate provides a dummy flash chip that emulates a W25Q32JV at the
//! wire level. It implements [`SpiTransport`], so it sits below the
//! transaction encoder and sees exactly the bytes a real chip would see:
//! chip-select edges, opcodes, address bytes and data, in order. Every frame
//! is journalled for tests to inspect.
//!
//! The emulation covers the protocol rules the driver has to respect:
//! the write-enable latch (set by 06h, auto-cleared after every completed
//! cycle, mutations silently ignored without it), the busy bit (readable as
//! set for a configurable number of status polls after each internal cycle),
//! power-down gating (only ABh is honored), and reset arming (99h acts only
//! directly after 66h).

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use spinor_core::chip::{BLOCK_32K, BLOCK_64K, CHIP_SIZE, PAGE_SIZE, SECTOR_SIZE};
use spinor_core::error::Result;
use spinor_core::programmer::SpiTransport;
use spinor_core::spi::{opcodes, Status1};

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC manufacturer ID (first RDID byte)
    pub manufacturer_id: u8,
    /// JEDEC memory type (second RDID byte)
    pub memory_type: u8,
    /// JEDEC capacity code (third RDID byte)
    pub capacity: u8,
    /// Device ID byte returned by REMS (90h) and Release Power-down (ABh)
    pub device_id: u8,
    /// Unique ID response window (48h)
    pub unique_id: [u8; 5],
    /// Flash size in bytes
    pub size: usize,
    /// Number of status polls that read busy after each internal cycle
    pub busy_polls: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: 0xEF, // Winbond
            memory_type: 0x40,
            capacity: 0x16, // 32 Mbit
            device_id: 0x15,
            unique_id: [0xD8, 0x6A, 0x01, 0x42, 0x33],
            size: CHIP_SIZE,
            busy_polls: 2,
        }
    }
}

/// One chip-select bracketed frame as seen on the bus
///
/// `bytes` holds every MOSI byte transferred while CS was low, opcode first;
/// fill bytes clocked during a read phase are included.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// MOSI bytes in transfer order
    pub bytes: Vec<u8>,
}

#[cfg(feature = "alloc")]
impl Transaction {
    /// The opcode byte of the frame
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Everything after the opcode byte
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..]
    }
}

/// Dummy flash chip
///
/// Emulates a W25Q32JV in memory for testing purposes.
#[cfg(feature = "alloc")]
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    sr1: u8,
    sr2: u8,
    sr3: u8,
    /// Remaining status polls that still read the busy bit as set
    busy_polls: u32,
    powered_down: bool,
    reset_armed: bool,
    volatile_wren: bool,
    /// When set, WREN does not set the latch (for issue-then-trust tests)
    force_wel_clear: bool,
    cs_low: bool,
    /// MOSI bytes of the transaction currently in flight
    mosi: Vec<u8>,
    journal: Vec<Transaction>,
    delays: Vec<u32>,
    status_reads: u32,
}

#[cfg(feature = "alloc")]
impl DummyFlash {
    /// Create a new dummy flash with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            sr1: 0,
            sr2: 0,
            sr3: 0,
            busy_polls: 0,
            powered_down: false,
            reset_armed: false,
            volatile_wren: false,
            force_wel_clear: false,
            cs_low: false,
            mosi: Vec::new(),
            journal: Vec::new(),
            delays: Vec::new(),
            status_reads: 0,
        }
    }

    /// Create a new dummy flash with default configuration (W25Q32JV)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// All frames seen so far, oldest first
    pub fn journal(&self) -> &[Transaction] {
        &self.journal
    }

    /// Forget all recorded frames and delays
    pub fn clear_journal(&mut self) {
        self.journal.clear();
        self.delays.clear();
        self.status_reads = 0;
    }

    /// Delays requested by the driver, in microseconds, in order
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Number of status register 1 reads answered
    pub fn status_reads(&self) -> u32 {
        self.status_reads
    }

    /// When set, Write Enable no longer sets the latch
    pub fn force_wel_clear(&mut self, force: bool) {
        self.force_wel_clear = force;
    }

    /// True if the write enable latch is currently set
    pub fn wel(&self) -> bool {
        self.sr1 & Status1::WEL.bits() != 0
    }

    /// True while the chip is in the power-down state
    pub fn powered_down(&self) -> bool {
        self.powered_down
    }

    /// True while chip select is asserted (low)
    pub fn cs_asserted(&self) -> bool {
        self.cs_low
    }

    fn start_cycle(&mut self) {
        self.sr1 &= !Status1::WEL.bits();
        self.volatile_wren = false;
        self.busy_polls = self.config.busy_polls;
    }

    /// MISO byte for the transfer currently being clocked
    ///
    /// `self.mosi` holds the bytes received so far, so its length is the
    /// position of the byte in flight.
    fn respond(&mut self) -> u8 {
        let pos = self.mosi.len();
        if pos == 0 {
            // The opcode byte itself; the chip drives nothing meaningful
            return 0x00;
        }
        let opcode = self.mosi[0];

        if self.powered_down && opcode != opcodes::RDP {
            return 0x00;
        }

        match opcode {
            opcodes::RDSR => {
                if pos == 1 {
                    self.status_reads += 1;
                    let mut value = self.sr1 & !Status1::BUSY.bits();
                    if self.busy_polls > 0 {
                        value |= Status1::BUSY.bits();
                        self.busy_polls -= 1;
                    }
                    value
                } else {
                    0x00
                }
            }
            opcodes::RDSR2 => self.sr2,
            opcodes::RDSR3 => self.sr3,
            opcodes::RDID => match pos {
                1 => self.config.manufacturer_id,
                2 => self.config.memory_type,
                3 => self.config.capacity,
                _ => 0x00,
            },
            // 5-byte window: dummy/address field, then manufacturer + device
            opcodes::REMS => match pos {
                4 => self.config.manufacturer_id,
                5 => self.config.device_id,
                _ => 0x00,
            },
            opcodes::RDUID => {
                if (1..=5).contains(&pos) {
                    self.config.unique_id[pos - 1]
                } else {
                    0x00
                }
            }
            opcodes::READ | opcodes::FAST_READ => {
                if pos >= 4 {
                    let addr = self.frame_address() as usize + (pos - 4);
                    self.data.get(addr).copied().unwrap_or(0xFF)
                } else {
                    0x00
                }
            }
            // 4-byte window: three dummy bytes, then the device ID
            opcodes::RDP => match pos {
                4 => self.config.device_id,
                _ => 0x00,
            },
            _ => 0x00,
        }
    }

    /// 24-bit address from the bytes following the opcode
    fn frame_address(&self) -> u32 {
        u32::from_be_bytes([0, self.mosi[1], self.mosi[2], self.mosi[3]])
    }

    /// Interpret a completed frame at chip-select release
    fn finish_transaction(&mut self) {
        let frame = core::mem::take(&mut self.mosi);
        if frame.is_empty() {
            return;
        }
        let opcode = frame[0];

        if self.powered_down {
            // Only Release Power-down is honored in this state
            if opcode == opcodes::RDP {
                log::trace!("dummy: release from power-down");
                self.powered_down = false;
            }
            self.journal.push(Transaction { bytes: frame });
            return;
        }

        // A busy chip only answers status reads
        if self.busy_polls > 0 {
            self.journal.push(Transaction { bytes: frame });
            return;
        }

        // Any instruction other than Enable Reset disarms the reset
        let reset_armed = self.reset_armed;
        self.reset_armed = false;

        match opcode {
            opcodes::WREN => {
                if !self.force_wel_clear {
                    self.sr1 |= Status1::WEL.bits();
                }
            }
            opcodes::WRDI => self.sr1 &= !Status1::WEL.bits(),
            opcodes::VSRWE => self.volatile_wren = true,
            opcodes::WRSR | opcodes::WRSR2 | opcodes::WRSR3 => {
                self.handle_status_write(opcode, &frame)
            }
            opcodes::PP => self.handle_page_program(&frame),
            opcodes::SE => self.handle_erase(&frame, SECTOR_SIZE),
            opcodes::BE_52 => self.handle_erase(&frame, BLOCK_32K),
            opcodes::BE_D8 => self.handle_erase(&frame, BLOCK_64K),
            opcodes::CE => self.handle_chip_erase(),
            opcodes::GBL => self.sr1 |= Status1::BP0.bits() | Status1::BP1.bits() | Status1::BP2.bits(),
            opcodes::GBUL => {
                self.sr1 &= !(Status1::BP0.bits() | Status1::BP1.bits() | Status1::BP2.bits())
            }
            opcodes::DP => {
                log::trace!("dummy: entering power-down");
                self.powered_down = true;
            }
            opcodes::RSTEN => self.reset_armed = true,
            opcodes::RST => {
                if reset_armed {
                    log::trace!("dummy: device reset");
                    self.sr1 &= !(Status1::BUSY.bits() | Status1::WEL.bits());
                    self.busy_polls = 0;
                    self.volatile_wren = false;
                }
            }
            // Read-type opcodes were answered during the transfer
            _ => {}
        }

        self.journal.push(Transaction { bytes: frame });
    }

    fn handle_status_write(&mut self, opcode: u8, frame: &[u8]) {
        if frame.len() < 2 {
            return;
        }
        if !self.wel() && !self.volatile_wren {
            return;
        }
        let value = frame[1];
        match opcode {
            // Busy and WEL are read-only
            opcodes::WRSR => {
                self.sr1 = (value & !0x03) | (self.sr1 & 0x03);
            }
            opcodes::WRSR2 => self.sr2 = value,
            opcodes::WRSR3 => self.sr3 = value,
            _ => unreachable!(),
        }
        self.start_cycle();
    }

    fn handle_page_program(&mut self, frame: &[u8]) {
        if frame.len() < 5 || !self.wel() {
            return;
        }
        let addr = u32::from_be_bytes([0, frame[1], frame[2], frame[3]]) as usize;
        let base = addr & !(PAGE_SIZE - 1);
        let offset = addr & (PAGE_SIZE - 1);
        // Programming can only clear bits, and wraps within the page
        for (i, &byte) in frame[4..].iter().enumerate() {
            let index = base + ((offset + i) % PAGE_SIZE);
            if let Some(cell) = self.data.get_mut(index) {
                *cell &= byte;
            }
        }
        log::trace!("dummy: programmed {} bytes at {:#08x}", frame.len() - 4, addr);
        self.start_cycle();
    }

    fn handle_erase(&mut self, frame: &[u8], erase_size: usize) {
        if frame.len() < 4 || !self.wel() {
            return;
        }
        let addr = u32::from_be_bytes([0, frame[1], frame[2], frame[3]]) as usize;
        let base = addr & !(erase_size - 1);
        let end = core::cmp::min(base + erase_size, self.data.len());
        if base < self.data.len() {
            for byte in &mut self.data[base..end] {
                *byte = 0xFF;
            }
        }
        log::trace!("dummy: erased {} bytes at {:#08x}", erase_size, base);
        self.start_cycle();
    }

    fn handle_chip_erase(&mut self) {
        if !self.wel() {
            return;
        }
        for byte in &mut self.data {
            *byte = 0xFF;
        }
        log::trace!("dummy: chip erased");
        self.start_cycle();
    }
}

#[cfg(feature = "alloc")]
impl SpiTransport for DummyFlash {
    fn assert_cs(&mut self) -> Result<()> {
        self.cs_low = true;
        self.mosi.clear();
        Ok(())
    }

    fn release_cs(&mut self) -> Result<()> {
        self.cs_low = false;
        self.finish_transaction();
        Ok(())
    }

    fn transfer_byte(&mut self, out: u8) -> Result<u8> {
        debug_assert!(self.cs_low, "transfer without chip select");
        let response = self.respond();
        self.mosi.push(out);
        Ok(response)
    }

    fn delay_us(&mut self, us: u32) {
        self.delays.push(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinor_core::chip::{EraseSize, StatusRegister};
    use spinor_core::error::Error;
    use spinor_core::flash::Flash;
    use spinor_core::programmer::{SpiMaster, TransportMaster};
    use spinor_core::protocol::spi25;
    use spinor_core::spi::SpiCommand;

    fn flash_with(config: DummyConfig) -> Flash<TransportMaster<DummyFlash>> {
        Flash::new(TransportMaster::new(DummyFlash::new(config)))
    }

    fn flash_default() -> Flash<TransportMaster<DummyFlash>> {
        flash_with(DummyConfig::default())
    }

    fn chip(flash: Flash<TransportMaster<DummyFlash>>) -> DummyFlash {
        flash.into_inner().into_inner()
    }

    #[test]
    fn read_returns_pattern_with_big_endian_address() {
        let mut dummy = DummyFlash::new_default();
        for i in 0..16 {
            dummy.data_mut()[0x0123AB + i] = (i as u8) ^ 0x5A;
        }
        let mut flash = Flash::new(TransportMaster::new(dummy));

        let mut buf = [0u8; 16];
        flash.read(0x0123AB, &mut buf).unwrap();
        for (i, &byte) in buf.iter().enumerate() {
            assert_eq!(byte, (i as u8) ^ 0x5A);
        }

        let dummy = chip(flash);
        let txn = dummy.journal().last().unwrap();
        assert_eq!(txn.opcode(), 0x03);
        assert_eq!(&txn.bytes[1..4], &[0x01, 0x23, 0xAB]);
        // 16 fill bytes were clocked for the read phase
        assert_eq!(txn.bytes.len(), 4 + 16);
        assert!(txn.bytes[4..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn fast_read_uses_its_own_opcode_with_same_framing() {
        let mut dummy = DummyFlash::new_default();
        dummy.data_mut()[0x40] = 0xC3;
        let mut flash = Flash::new(TransportMaster::new(dummy));

        let mut buf = [0u8; 1];
        flash.fast_read(0x40, &mut buf).unwrap();
        assert_eq!(buf, [0xC3]);

        let dummy = chip(flash);
        let txn = dummy.journal().last().unwrap();
        assert_eq!(&txn.bytes[..4], &[0x0B, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn addresses_are_masked_to_24_bits() {
        let mut flash = flash_default();
        let mut buf = [0u8; 1];
        flash.read(0xFF12_3456, &mut buf).unwrap();

        let dummy = chip(flash);
        let txn = dummy.journal().last().unwrap();
        assert_eq!(&txn.bytes[..4], &[0x03, 0x12, 0x34, 0x56]);
    }

    #[test]
    fn page_program_waits_for_busy_to_clear() {
        let config = DummyConfig {
            busy_polls: 3,
            ..DummyConfig::default()
        };
        let mut flash = flash_with(config);
        flash.page_program(0x100, &[0xAA; 4]).unwrap();

        let dummy = chip(flash);
        assert_eq!(&dummy.data()[0x100..0x104], &[0xAA; 4]);
        // 3 polls saw busy, the 4th saw idle
        assert_eq!(dummy.status_reads(), 4);
        let rdsr_frames = dummy.journal().iter().filter(|t| t.opcode() == 0x05).count();
        assert_eq!(rdsr_frames, 4);
        // Every busy poll was followed by the fixed inter-poll delay
        assert_eq!(dummy.delays(), &[1_000, 1_000, 1_000]);
    }

    #[test]
    fn page_program_sets_latch_before_the_program_frame() {
        let mut flash = flash_default();
        flash.page_program(0x200, &[0x11, 0x22]).unwrap();

        let dummy = chip(flash);
        let opcodes_seen: Vec<u8> = dummy.journal().iter().map(|t| t.opcode()).collect();
        let wren = opcodes_seen.iter().position(|&op| op == 0x06).unwrap();
        let pp = opcodes_seen.iter().position(|&op| op == 0x02).unwrap();
        assert!(wren < pp);
        // The latch auto-cleared when the cycle completed
        assert!(!dummy.wel());
    }

    #[test]
    fn page_program_rejects_oversized_and_empty_data() {
        let mut flash = flash_default();
        let too_big = [0u8; PAGE_SIZE + 1];
        assert_eq!(
            flash.page_program(0, &too_big).unwrap_err(),
            Error::InvalidLength
        );
        assert_eq!(flash.page_program(0, &[]).unwrap_err(), Error::InvalidLength);
        // Neither attempt reached the bus
        assert!(chip(flash).journal().is_empty());
    }

    #[test]
    fn page_program_wraps_within_the_page() {
        let mut flash = flash_default();
        flash.page_program(0x1FE, &[0x01, 0x02, 0x03, 0x04]).unwrap();

        let dummy = chip(flash);
        assert_eq!(&dummy.data()[0x1FE..0x200], &[0x01, 0x02]);
        // The tail wrapped to the start of the same page, not into 0x200
        assert_eq!(&dummy.data()[0x100..0x102], &[0x03, 0x04]);
        assert_eq!(dummy.data()[0x200], 0xFF);
    }

    #[test]
    fn mutating_op_transmitted_even_with_wel_forced_clear() {
        let mut dummy = DummyFlash::new_default();
        dummy.force_wel_clear(true);
        let mut flash = Flash::new(TransportMaster::new(dummy));

        // Issue-then-trust: the driver does not verify the latch and must
        // transmit the program command bit-for-bit anyway
        flash.page_program(0x40, &[0x00, 0x00]).unwrap();

        let dummy = chip(flash);
        assert!(dummy.journal().iter().any(|t| t.opcode() == 0x06));
        let pp = dummy
            .journal()
            .iter()
            .find(|t| t.opcode() == 0x02)
            .expect("page program frame transmitted");
        assert_eq!(&pp.bytes[..], &[0x02, 0x00, 0x00, 0x40, 0x00, 0x00]);
        // The chip ignored the program: no cycle, memory untouched
        assert_eq!(dummy.data()[0x40], 0xFF);
    }

    #[test]
    fn sector_erase_resets_the_aligned_sector() {
        let mut dummy = DummyFlash::new_default();
        dummy.data_mut()[0x0000..0x2000].fill(0x00);
        let mut flash = Flash::new(TransportMaster::new(dummy));

        flash.erase(EraseSize::Sector4K, 0x0FFF).unwrap();

        let dummy = chip(flash);
        assert!(dummy.data()[0x0000..0x1000].iter().all(|&b| b == 0xFF));
        assert!(dummy.data()[0x1000..0x2000].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn block_erase_32k_and_64k_share_framing() {
        for (size, opcode, span) in [
            (EraseSize::Block32K, 0x52u8, BLOCK_32K),
            (EraseSize::Block64K, 0xD8u8, BLOCK_64K),
        ] {
            let mut dummy = DummyFlash::new_default();
            dummy.data_mut().fill(0x00);
            let mut flash = Flash::new(TransportMaster::new(dummy));

            flash.erase(size, 0x018000).unwrap();

            let dummy = chip(flash);
            let txn = dummy
                .journal()
                .iter()
                .find(|t| t.opcode() == opcode)
                .expect("erase frame transmitted");
            assert_eq!(&txn.bytes[..], &[opcode, 0x01, 0x80, 0x00]);

            let base = 0x018000 & !(span - 1);
            assert!(dummy.data()[base..base + span].iter().all(|&b| b == 0xFF));
            assert_eq!(dummy.data()[base + span], 0x00);
            // Both granularities poll to idle afterwards
            assert!(dummy.status_reads() >= 1);
        }
    }

    #[test]
    fn chip_erase_resets_everything() {
        let mut dummy = DummyFlash::new_default();
        dummy.data_mut().fill(0x5A);
        let mut flash = Flash::new(TransportMaster::new(dummy));

        flash.chip_erase().unwrap();

        let dummy = chip(flash);
        assert!(dummy.data().iter().all(|&b| b == 0xFF));
        let ce = dummy.journal().iter().find(|t| t.opcode() == 0x60).unwrap();
        assert_eq!(&ce.bytes[..], &[0x60]);
    }

    #[test]
    fn jedec_id_bytes() {
        let mut flash = flash_default();
        let id = flash.jedec_id().unwrap();
        assert_eq!(id.bytes(), [0xEF, 0x40, 0x16]);
    }

    #[test]
    fn manufacturer_and_unique_id_windows() {
        let mut flash = flash_default();
        let rems = flash.manufacturer_device_id().unwrap();
        assert_eq!(rems[3], 0xEF);
        assert_eq!(rems[4], 0x15);

        let uid = flash.unique_id().unwrap();
        assert_eq!(uid, DummyConfig::default().unique_id);
    }

    #[test]
    fn status_register_write_read_round_trip() {
        let mut flash = flash_default();
        flash.write_status(StatusRegister::Sr1, 0x1C).unwrap();
        // The register write runs a short internal cycle of its own
        flash.wait_idle().unwrap();
        assert_eq!(flash.read_status(StatusRegister::Sr1).unwrap(), 0x1C);
        assert_eq!(flash.block_protect_bits().unwrap(), 0b111);

        flash.write_status(StatusRegister::Sr2, 0x42).unwrap();
        flash.wait_idle().unwrap();
        assert_eq!(flash.read_status(StatusRegister::Sr2).unwrap(), 0x42);
    }

    #[test]
    fn status_write_polls_idle_then_enables_before_writing() {
        let mut flash = flash_default();
        flash.write_status(StatusRegister::Sr1, 0x0C).unwrap();

        let dummy = chip(flash);
        let opcodes_seen: Vec<u8> = dummy.journal().iter().map(|t| t.opcode()).collect();
        let rdsr = opcodes_seen.iter().position(|&op| op == 0x05).unwrap();
        let wren = opcodes_seen.iter().position(|&op| op == 0x06).unwrap();
        let wrsr = opcodes_seen.iter().position(|&op| op == 0x01).unwrap();
        assert!(rdsr < wren && wren < wrsr);
        // No polling after the write itself
        assert_eq!(opcodes_seen.last(), Some(&0x01));
    }

    #[test]
    fn write_enable_and_disable_drive_the_latch() {
        let mut flash = flash_default();
        assert!(!flash.is_write_enabled().unwrap());

        spi25::write_enable(flash.master_mut()).unwrap();
        assert!(flash.is_write_enabled().unwrap());

        spi25::write_disable(flash.master_mut()).unwrap();
        assert!(!flash.is_write_enabled().unwrap());
    }

    #[test]
    fn global_lock_and_unlock_toggle_protect_bits() {
        let mut flash = flash_default();
        flash.global_lock().unwrap();
        assert_eq!(flash.block_protect_bits().unwrap(), 0b111);
        flash.global_unlock().unwrap();
        assert_eq!(flash.block_protect_bits().unwrap(), 0);
    }

    #[test]
    fn volatile_sr_write_enable_permits_one_register_write() {
        let mut master = TransportMaster::new(DummyFlash::new_default());
        spi25::volatile_sr_write_enable(&mut master).unwrap();

        // A register write straight after VSRWE needs no WREN
        let data = [0x0C];
        let mut cmd = SpiCommand::write_reg(0x01, &data);
        master.execute(&mut cmd).unwrap();

        spi25::wait_ready(&mut master, 1_000, 100_000).unwrap();
        assert_eq!(spi25::read_status1(&mut master).unwrap(), 0x0C);
        // The permission was consumed by the write
        let data = [0x00];
        let mut cmd = SpiCommand::write_reg(0x01, &data);
        master.execute(&mut cmd).unwrap();
        spi25::wait_ready(&mut master, 1_000, 100_000).unwrap();
        assert_eq!(spi25::read_status1(&mut master).unwrap(), 0x0C);
    }

    #[test]
    fn reset_sends_enable_then_reset_with_delay() {
        let mut flash = flash_default();
        flash.reset().unwrap();

        let dummy = chip(flash);
        let frames: Vec<&[u8]> = dummy.journal().iter().map(|t| &t.bytes[..]).collect();
        assert_eq!(frames, [&[0x66][..], &[0x99][..]]);
        assert_eq!(dummy.delays(), &[1_000]);
    }

    #[test]
    fn reset_device_without_arming_is_ignored() {
        let mut flash = flash_default();
        spi25::write_enable(flash.master_mut()).unwrap();
        spi25::reset_device(flash.master_mut()).unwrap();
        // The stray 99h did nothing: the latch survived
        assert!(flash.is_write_enabled().unwrap());

        flash.reset().unwrap();
        assert!(!flash.is_write_enabled().unwrap());
    }

    #[test]
    fn power_down_gates_everything_but_release() {
        let mut flash = flash_default();
        flash.power_down().unwrap();
        assert!(flash.master().transport().powered_down());

        // The chip no longer answers identification
        assert_eq!(flash.jedec_id().unwrap().bytes(), [0x00, 0x00, 0x00]);
        assert_eq!(flash.init().unwrap_err(), Error::ChipNotFound);

        let window = flash.release_power_down_id().unwrap();
        assert_eq!(window[3], 0x15);
        assert!(!flash.master().transport().powered_down());
        assert_eq!(flash.jedec_id().unwrap().bytes(), [0xEF, 0x40, 0x16]);
    }

    #[test]
    fn init_probes_and_reports_the_chip() {
        let mut flash = flash_default();
        let id = flash.init().unwrap();
        assert_eq!(id.bytes(), [0xEF, 0x40, 0x16]);
    }

    #[test]
    fn wait_ready_times_out_on_a_stuck_chip() {
        let config = DummyConfig {
            busy_polls: u32::MAX,
            ..DummyConfig::default()
        };
        let mut master = TransportMaster::new(DummyFlash::new(config));
        // 5 polls at 1 ms each, then give up
        assert_eq!(
            spi25::wait_ready(&mut master, 1_000, 5_000).unwrap_err(),
            Error::Timeout
        );
        assert_eq!(master.transport().status_reads(), 5);
    }

    /// Transport that fails partway through a transfer, for the CS guard
    struct FailingTransport {
        inner: DummyFlash,
        transfers_left: usize,
    }

    impl SpiTransport for FailingTransport {
        fn assert_cs(&mut self) -> Result<()> {
            self.inner.assert_cs()
        }

        fn release_cs(&mut self) -> Result<()> {
            self.inner.release_cs()
        }

        fn transfer_byte(&mut self, out: u8) -> Result<u8> {
            if self.transfers_left == 0 {
                return Err(Error::SpiTransferFailed);
            }
            self.transfers_left -= 1;
            self.inner.transfer_byte(out)
        }

        fn delay_us(&mut self, us: u32) {
            self.inner.delay_us(us);
        }
    }

    #[test]
    fn chip_select_released_when_transport_faults_mid_phase() {
        let transport = FailingTransport {
            inner: DummyFlash::new_default(),
            transfers_left: 2, // fails inside the address phase
        };
        let mut master = TransportMaster::new(transport);

        let mut buf = [0u8; 4];
        let mut cmd = SpiCommand::read_3b(0x03, 0x1234, &mut buf);
        assert_eq!(master.execute(&mut cmd).unwrap_err(), Error::SpiTransferFailed);
        assert!(!master.transport().inner.cs_asserted());
    }
}
