//! dmgcore: the instruction-execution core of a Game Boy (DMG) written in Rust.
//!
//! Implements the CPU and memory map as documented in
//! [Pan Docs](https://gbdev.io/pandocs/): register file, flags, the full base and
//! 0xCB-prefixed opcode tables with cycle costs, and a 70224-cycle frame loop.
//!
//! ## Modules
//!
//! - **bus** – [Memory map](https://gbdev.io/pandocs/Memory_Map.html): ROM windows, VRAM,
//!   cartridge/internal/echo RAM, OAM, I/O, HRAM, IE
//! - **cartridge** – image split into 16 KiB banks, [header](https://gbdev.io/pandocs/The_Cartridge_Header.html) fields
//! - **cpu** – [SM83](https://gbdev.io/pandocs/CPU_Registers_and_Flags.html) registers, flags,
//!   dispatch tables, instruction handlers
//! - **error** – engine and loader errors

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod error;

pub use bus::{Bus, MemoryBus, Region};
pub use cartridge::cartridge::{Cartridge, ROM_BANK_SIZE};
pub use cpu::cpu::{CLOCK_HZ, CPU, CYCLES_PER_FRAME};
pub use error::{CartridgeError, CpuError};
