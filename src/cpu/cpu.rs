use tracing::{trace, warn};

use crate::{
    bus::{Bus, MemoryBus},
    cpu::{
        dispatch::{self, DispatchTable},
        registers::{Pair, Reg8, Registers},
    },
    error::CpuError,
};

/// Master clock in cycles per second.
pub const CLOCK_HZ: u32 = 4_194_304;

/// One video frame: 154 scanlines of 456 cycles.
pub const CYCLES_PER_FRAME: u32 = 70_224;

pub const PREFIX_CB: u8 = 0xCB;

pub struct CPU<B: Bus> {
    pub regs: Registers,
    /// Cycles run so far in the current frame. Carries any overshoot into the next frame.
    pub cycles: u32,
    /// Interrupt master enable, toggled by DI/EI/RETI. Nothing dispatches interrupts yet.
    pub ime: bool,
    pub bus: B,
    base: DispatchTable<B>,
    extended: DispatchTable<B>,
}

impl CPU<MemoryBus> {
    /// A CPU wired to an empty memory bus. Bind a cartridge through `bus.load_cartridge`.
    pub fn new() -> Self {
        Self::with_bus(MemoryBus::new())
    }
}

impl Default for CPU<MemoryBus> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Bus> CPU<B> {
    pub fn with_bus(bus: B) -> Self {
        let mut cpu = Self {
            regs: Registers::new(),
            cycles: 0,
            ime: false,
            bus,
            base: dispatch::base_table(),
            extended: dispatch::extended_table(),
        };
        cpu.reset();
        cpu
    }

    /// Load the register state the boot ROM leaves behind and clear the frame counter.
    pub fn reset(&mut self) {
        self.regs.write_word(Pair::AF, 0x01B0);
        self.regs.write_word(Pair::BC, 0x0013);
        self.regs.write_word(Pair::DE, 0x00D8);
        self.regs.write_word(Pair::HL, 0x014D);
        self.regs.write_word(Pair::SP, 0xFFFE);
        self.regs.write_word(Pair::PC, 0x0100);

        self.cycles = 0;
        self.ime = false;
    }

    /// Run instructions until one frame's worth of cycles has elapsed.
    ///
    /// The counter is reduced by the frame budget rather than zeroed, so an instruction that
    /// crosses the boundary pays for its excess in the next frame.
    pub fn run_frame(&mut self) -> Result<(), CpuError> {
        while self.cycles < CYCLES_PER_FRAME {
            let cost = self.execute_instruction()?;
            self.cycles += cost;
        }
        self.cycles -= CYCLES_PER_FRAME;
        Ok(())
    }

    /// Fetch, decode, and execute one instruction. Returns its cycle cost.
    ///
    /// Fetching the opcode advances PC past it; handlers fetch their own operands, so on return
    /// PC has moved by the instruction's length (or to a jump target).
    pub fn execute_instruction(&mut self) -> Result<u32, CpuError> {
        let pc = self.pc();
        let opcode = self.fetch_byte();
        trace!("{:04X}  {:02X}  {}", pc, opcode, self.regs);

        let cost = if opcode == PREFIX_CB {
            let code = self.fetch_byte();
            let Some(handler) = self.extended[code as usize] else {
                warn!("unimplemented opcode $CB {:02X} at ${:04X}", code, pc);
                return Err(CpuError::UnimplementedOpcode {
                    opcode: code,
                    pc,
                    extended: true,
                });
            };
            handler(self, code)
        } else {
            let Some(handler) = self.base[opcode as usize] else {
                warn!("unimplemented opcode ${:02X} at ${:04X}", opcode, pc);
                return Err(CpuError::UnimplementedOpcode {
                    opcode,
                    pc,
                    extended: false,
                });
            };
            handler(self, opcode)
        };

        self.bus.tick(cost);
        Ok(cost)
    }

    pub fn pc(&self) -> u16 {
        self.regs.read_word(Pair::PC)
    }

    pub(super) fn set_pc(&mut self, addr: u16) {
        self.regs.write_word(Pair::PC, addr);
    }

    pub(super) fn fetch_byte(&mut self) -> u8 {
        let pc = self.pc();
        let byte = self.bus.read(pc);
        self.regs.increment(Pair::PC);
        byte
    }

    /// Little-endian: low byte first.
    pub(super) fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    /// Read the 8-bit operand selected by a 3-bit register field; code 6 is the byte at (HL).
    pub(super) fn read_operand(&mut self, code: u8) -> u8 {
        match Reg8::from_code(code) {
            Some(reg) => self.regs.read8(reg),
            None => {
                let addr = self.regs.read_word(Pair::HL);
                self.bus.read(addr)
            }
        }
    }

    pub(super) fn write_operand(&mut self, code: u8, value: u8) {
        match Reg8::from_code(code) {
            Some(reg) => self.regs.write8(reg, value),
            None => {
                let addr = self.regs.read_word(Pair::HL);
                self.bus.write(addr, value);
            }
        }
    }

    pub(super) fn push_word(&mut self, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.regs.decrement(Pair::SP);
        self.bus.write(self.regs.read_word(Pair::SP), hi);
        self.regs.decrement(Pair::SP);
        self.bus.write(self.regs.read_word(Pair::SP), lo);
    }

    pub(super) fn pop_word(&mut self) -> u16 {
        let lo = self.bus.read(self.regs.read_word(Pair::SP)) as u16;
        self.regs.increment(Pair::SP);
        let hi = self.bus.read(self.regs.read_word(Pair::SP)) as u16;
        self.regs.increment(Pair::SP);
        (hi << 8) | lo
    }
}
