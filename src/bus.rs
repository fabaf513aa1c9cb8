//! Memory bus and address decoding for the Game Boy.
//!
//! Maps CPU addresses to the two ROM windows, video/cartridge/internal RAM, sprite
//! attribute memory, I/O registers, high RAM, and the interrupt-enable byte.

use std::sync::Arc;

use tracing::debug;

use crate::cartridge::cartridge::{Cartridge, RomBank};

/// Trait for memory-mapped access used by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);
    /// Called by the CPU after every instruction with its cycle cost.
    fn tick(&mut self, _cycles: u32) {}
}

pub const VRAM_SIZE: usize = 0x2000;
pub const CART_RAM_SIZE: usize = 0x2000;
pub const WRAM_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0x100;
pub const IO_SIZE: usize = 0x80;
pub const HRAM_SIZE: usize = 0x7F;

pub const INTERRUPT_ENABLE: u16 = 0xFFFF;

/// Distance between an echo RAM address and the internal RAM byte it aliases.
const ECHO_OFFSET: u16 = 0x2000;

/// Address-space regions, in decoding order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    RomBank0,
    RomBankN,
    VideoRam,
    CartridgeRam,
    InternalRam,
    EchoRam,
    SpriteRam,
    Unusable,
    Io,
    HighRam,
    InterruptEnable,
}

/// Inclusive address ranges; contiguous, non-overlapping, covering 0x0000–0xFFFF.
const MEMORY_MAP: [(u16, u16, Region); 11] = [
    (0x0000, 0x3FFF, Region::RomBank0),
    (0x4000, 0x7FFF, Region::RomBankN),
    (0x8000, 0x9FFF, Region::VideoRam),
    (0xA000, 0xBFFF, Region::CartridgeRam),
    (0xC000, 0xDFFF, Region::InternalRam),
    (0xE000, 0xFDFF, Region::EchoRam),
    (0xFE00, 0xFE9F, Region::SpriteRam),
    (0xFEA0, 0xFEFF, Region::Unusable),
    (0xFF00, 0xFF7F, Region::Io),
    (0xFF80, 0xFFFE, Region::HighRam),
    (0xFFFF, 0xFFFF, Region::InterruptEnable),
];

impl Region {
    /// Resolve the region owning `addr` by a linear range check in map order.
    pub fn of(addr: u16) -> Region {
        MEMORY_MAP
            .iter()
            .find(|&&(start, end, _)| (start..=end).contains(&addr))
            .map(|&(_, _, region)| region)
            .unwrap_or(Region::InterruptEnable)
    }

    /// First address of the region.
    pub fn start(self) -> u16 {
        MEMORY_MAP
            .iter()
            .find(|&&(_, _, region)| region == self)
            .map_or(INTERRUPT_ENABLE, |&(start, _, _)| start)
    }

    /// Human-readable region name used in log output.
    pub fn name(self) -> &'static str {
        match self {
            Region::RomBank0 => "ROM bank 0",
            Region::RomBankN => "ROM bank N",
            Region::VideoRam => "video RAM",
            Region::CartridgeRam => "cartridge RAM",
            Region::InternalRam => "internal RAM",
            Region::EchoRam => "echo RAM",
            Region::SpriteRam => "sprite RAM",
            Region::Unusable => "unusable",
            Region::Io => "I/O registers",
            Region::HighRam => "high RAM",
            Region::InterruptEnable => "interrupt enable",
        }
    }
}

/// A fixed-size block of RAM backing one region.
#[derive(Clone, Debug)]
struct MemoryBlock {
    data: Box<[u8]>,
}

impl MemoryBlock {
    fn new(size: usize) -> Self {
        Self {
            data: vec![0; size].into_boxed_slice(),
        }
    }

    fn index(&self, offset: u16) -> usize {
        offset as usize % self.data.len()
    }

    fn read(&self, offset: u16) -> u8 {
        self.data[self.index(offset)]
    }

    fn write(&mut self, offset: u16, data: u8) {
        let index = self.index(offset);
        self.data[index] = data;
    }
}

/// The console's 16-bit address space.
pub struct MemoryBus {
    rom_bank0: Option<Arc<RomBank>>,
    rom_bank_n: Option<Arc<RomBank>>,
    vram: MemoryBlock,
    cart_ram: MemoryBlock,
    wram: MemoryBlock,
    oam: MemoryBlock,
    io: MemoryBlock,
    hram: MemoryBlock,
    pub interrupt_enable: u8,
}

impl MemoryBus {
    /// Create a bus with zeroed RAM and no cartridge bound.
    pub fn new() -> Self {
        Self {
            rom_bank0: None,
            rom_bank_n: None,
            vram: MemoryBlock::new(VRAM_SIZE),
            cart_ram: MemoryBlock::new(CART_RAM_SIZE),
            wram: MemoryBlock::new(WRAM_SIZE),
            oam: MemoryBlock::new(OAM_SIZE),
            io: MemoryBlock::new(IO_SIZE),
            hram: MemoryBlock::new(HRAM_SIZE),
            interrupt_enable: 0,
        }
    }

    /// Bind bank 0 and bank 1 of `cart` into the two ROM windows. Banks are shared, not copied;
    /// a missing bank leaves its window unbound (reads 0).
    pub fn load_cartridge(&mut self, cart: &Cartridge) {
        self.rom_bank0 = cart.bank(0).cloned();
        self.rom_bank_n = cart.bank(1).cloned();
        debug!(
            banks = cart.bank_count(),
            title = %cart.title(),
            "cartridge bound to {} and {}",
            Region::RomBank0.name(),
            Region::RomBankN.name(),
        );
    }

    /// Rebind the swappable window to bank `index`. Returns false, leaving the window as it
    /// was, when the cartridge has no such bank.
    pub fn select_rom_bank(&mut self, cart: &Cartridge, index: usize) -> bool {
        match cart.bank(index) {
            Some(bank) => {
                self.rom_bank_n = Some(Arc::clone(bank));
                debug!(bank = index, "{} rebound", Region::RomBankN.name());
                true
            }
            None => false,
        }
    }

    fn read_rom(bank: &Option<Arc<RomBank>>, offset: u16) -> u8 {
        bank.as_ref()
            .map_or(0, |bank| bank[offset as usize % bank.len()])
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for MemoryBus {
    fn read(&mut self, addr: u16) -> u8 {
        let region = Region::of(addr);
        let offset = addr - region.start();
        match region {
            Region::RomBank0 => Self::read_rom(&self.rom_bank0, offset),
            Region::RomBankN => Self::read_rom(&self.rom_bank_n, offset),
            Region::VideoRam => self.vram.read(offset),
            Region::CartridgeRam => self.cart_ram.read(offset),
            Region::InternalRam => self.wram.read(offset),
            // Same storage as internal RAM, shifted down by 0x2000.
            Region::EchoRam => self.wram.read(addr - ECHO_OFFSET - Region::InternalRam.start()),
            Region::SpriteRam => self.oam.read(offset),
            Region::Unusable => 0,
            Region::Io => self.io.read(offset),
            Region::HighRam => self.hram.read(offset),
            Region::InterruptEnable => self.interrupt_enable,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        let region = Region::of(addr);
        let offset = addr - region.start();
        match region {
            // ROM is immutable; no bank controller is modelled.
            Region::RomBank0 | Region::RomBankN => {}
            Region::VideoRam => self.vram.write(offset, data),
            Region::CartridgeRam => self.cart_ram.write(offset, data),
            Region::InternalRam => self.wram.write(offset, data),
            Region::EchoRam => self
                .wram
                .write(addr - ECHO_OFFSET - Region::InternalRam.start(), data),
            Region::SpriteRam => self.oam.write(offset, data),
            Region::Unusable => {}
            Region::Io => self.io.write(offset, data),
            Region::HighRam => self.hram.write(offset, data),
            Region::InterruptEnable => self.interrupt_enable = data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::cartridge::ROM_BANK_SIZE;

    fn three_bank_cartridge() -> Cartridge {
        let mut data = vec![0u8; ROM_BANK_SIZE * 3];
        data[0x0000] = 0x10;
        data[0x3FFF] = 0x1F;
        data[ROM_BANK_SIZE] = 0x20;
        data[ROM_BANK_SIZE * 2] = 0x30;
        Cartridge::from_bytes(&data)
    }

    #[test]
    fn memory_map_covers_address_space_without_gaps() {
        let mut expected = 0u32;
        for &(start, end, _) in MEMORY_MAP.iter() {
            assert_eq!(start as u32, expected);
            assert!(end >= start);
            expected = end as u32 + 1;
        }
        assert_eq!(expected, 0x1_0000);
    }

    #[test]
    fn region_resolution() {
        assert_eq!(Region::of(0x0000), Region::RomBank0);
        assert_eq!(Region::of(0x4000), Region::RomBankN);
        assert_eq!(Region::of(0x9FFF), Region::VideoRam);
        assert_eq!(Region::of(0xA000), Region::CartridgeRam);
        assert_eq!(Region::of(0xDFFF), Region::InternalRam);
        assert_eq!(Region::of(0xFDFF), Region::EchoRam);
        assert_eq!(Region::of(0xFE9F), Region::SpriteRam);
        assert_eq!(Region::of(0xFEA0), Region::Unusable);
        assert_eq!(Region::of(0xFF00), Region::Io);
        assert_eq!(Region::of(0xFFFE), Region::HighRam);
        assert_eq!(Region::of(0xFFFF), Region::InterruptEnable);
    }

    #[test]
    fn region_names_are_distinct() {
        let names: Vec<&str> = MEMORY_MAP.iter().map(|&(_, _, r)| r.name()).collect();
        for (i, name) in names.iter().enumerate() {
            assert!(!names[i + 1..].contains(name), "duplicate region name {name}");
        }
        assert_eq!(Region::of(0xE000).name(), "echo RAM");
        assert_eq!(Region::of(0xFFFF).name(), "interrupt enable");
    }

    #[test]
    fn echo_ram_aliases_internal_ram() {
        let mut bus = MemoryBus::new();
        bus.write(0xC123, 0x42);
        assert_eq!(bus.read(0xE123), 0x42);

        bus.write(0xFDFF, 0x99);
        assert_eq!(bus.read(0xDDFF), 0x99);
    }

    #[test]
    fn rom_windows_read_bound_banks_and_ignore_writes() {
        let cart = three_bank_cartridge();
        let mut bus = MemoryBus::new();
        bus.load_cartridge(&cart);

        assert_eq!(bus.read(0x0000), 0x10);
        assert_eq!(bus.read(0x3FFF), 0x1F);
        assert_eq!(bus.read(0x4000), 0x20);

        bus.write(0x0000, 0xFF);
        bus.write(0x4000, 0xFF);
        assert_eq!(bus.read(0x0000), 0x10);
        assert_eq!(bus.read(0x4000), 0x20);
    }

    #[test]
    fn select_rom_bank_rebinds_swappable_window() {
        let cart = three_bank_cartridge();
        let mut bus = MemoryBus::new();
        bus.load_cartridge(&cart);

        assert!(bus.select_rom_bank(&cart, 2));
        assert_eq!(bus.read(0x4000), 0x30);

        assert!(!bus.select_rom_bank(&cart, 3));
        assert_eq!(bus.read(0x4000), 0x30);
    }

    #[test]
    fn unbound_rom_reads_zero() {
        let mut bus = MemoryBus::new();
        assert_eq!(bus.read(0x0100), 0);
        assert_eq!(bus.read(0x7FFF), 0);

        let single = Cartridge::from_bytes(&[0xAB; 16]);
        bus.load_cartridge(&single);
        assert_eq!(bus.read(0x0000), 0xAB);
        assert_eq!(bus.read(0x4000), 0);
    }

    #[test]
    fn unusable_hole_reads_zero_and_drops_writes() {
        let mut bus = MemoryBus::new();
        bus.write(0xFEA0, 0x55);
        bus.write(0xFEFF, 0x55);
        assert_eq!(bus.read(0xFEA0), 0);
        assert_eq!(bus.read(0xFEFF), 0);
    }

    #[test]
    fn interrupt_enable_only_changes_on_its_own_address() {
        let mut bus = MemoryBus::new();
        bus.write(0xC000, 0x1F);
        bus.write(0xFF80, 0x1F);
        assert_eq!(bus.read(0xFFFF), 0);

        bus.write(0xFFFF, 0x05);
        assert_eq!(bus.read(0xFFFF), 0x05);
        assert_eq!(bus.interrupt_enable, 0x05);
        assert_eq!(bus.read(0xFFFE), 0);
    }

    #[test]
    fn ram_regions_are_independent() {
        let mut bus = MemoryBus::new();
        let addrs = [0x8000, 0xA000, 0xC000, 0xFE00, 0xFF00, 0xFF80];
        for (i, &addr) in addrs.iter().enumerate() {
            bus.write(addr, i as u8 + 1);
        }
        for (i, &addr) in addrs.iter().enumerate() {
            assert_eq!(bus.read(addr), i as u8 + 1, "region at {addr:04X}");
        }
        assert_eq!(bus.read(0xFE9F), 0);
        bus.write(0xFFFE, 0x77);
        assert_eq!(bus.read(0xFFFE), 0x77);
        assert_eq!(bus.read(0xFF80), 6);
    }
}
