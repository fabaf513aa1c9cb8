//! Handlers for the unprefixed opcode table.
//!
//! Every handler receives its opcode so one function can serve a whole family whose
//! register or condition operand is encoded in the opcode bits. The return value is the
//! instruction's cost in clock cycles.

use tracing::trace;

use crate::{
    bus::Bus,
    cpu::{
        alu::AluOp,
        cpu::CPU,
        flags::Flag,
        registers::{Half, Pair, Reg8},
    },
};

/// Operand code of the byte at (HL) in the 3-bit register fields.
const HL_INDIRECT: u8 = 6;

/// Register pair in bits 5–4 for loads, INC/DEC, and ADD HL (SP in slot 3).
fn pair_operand(opcode: u8) -> Pair {
    match (opcode >> 4) & 0x03 {
        0 => Pair::BC,
        1 => Pair::DE,
        2 => Pair::HL,
        _ => Pair::SP,
    }
}

/// Register pair in bits 5–4 for PUSH/POP (AF in slot 3).
fn stack_operand(opcode: u8) -> Pair {
    match (opcode >> 4) & 0x03 {
        0 => Pair::BC,
        1 => Pair::DE,
        2 => Pair::HL,
        _ => Pair::AF,
    }
}

impl<B: Bus> CPU<B> {
    /// Branch condition in bits 4–3: NZ, Z, NC, C.
    fn condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x03 {
            0 => !self.regs.zero(),
            1 => self.regs.zero(),
            2 => !self.regs.carry(),
            _ => self.regs.carry(),
        }
    }

    /// Address for LD (rr),A / LD A,(rr). The HL forms post-increment or post-decrement HL.
    fn indirect_address(&mut self, opcode: u8) -> u16 {
        match (opcode >> 4) & 0x03 {
            0 => self.regs.read_word(Pair::BC),
            1 => self.regs.read_word(Pair::DE),
            2 => {
                let hl = self.regs.read_word(Pair::HL);
                self.regs.increment(Pair::HL);
                hl
            }
            _ => {
                let hl = self.regs.read_word(Pair::HL);
                self.regs.decrement(Pair::HL);
                hl
            }
        }
    }

    pub(super) fn nop(&mut self, _opcode: u8) -> u32 {
        4
    }

    /// LD rr,d16
    pub(super) fn ld_rr_d16(&mut self, opcode: u8) -> u32 {
        let value = self.fetch_word();
        self.regs.write_word(pair_operand(opcode), value);
        12
    }

    /// LD (BC),A / LD (DE),A / LD (HL+),A / LD (HL-),A
    pub(super) fn ld_indirect_a(&mut self, opcode: u8) -> u32 {
        let addr = self.indirect_address(opcode);
        let a = self.regs.read_high(Pair::AF);
        self.bus.write(addr, a);
        8
    }

    /// LD A,(BC) / LD A,(DE) / LD A,(HL+) / LD A,(HL-)
    pub(super) fn ld_a_indirect(&mut self, opcode: u8) -> u32 {
        let addr = self.indirect_address(opcode);
        let value = self.bus.read(addr);
        self.regs.write_high(Pair::AF, value);
        8
    }

    pub(super) fn inc_rr(&mut self, opcode: u8) -> u32 {
        self.regs.increment(pair_operand(opcode));
        8
    }

    pub(super) fn dec_rr(&mut self, opcode: u8) -> u32 {
        self.regs.decrement(pair_operand(opcode));
        8
    }

    /// INC r / INC (HL)
    pub(super) fn inc_r(&mut self, opcode: u8) -> u32 {
        let code = opcode >> 3;
        match Reg8::from_code(code) {
            Some(reg) => {
                let (pair, half) = reg.location();
                self.regs.increment_half(pair, half);
                let result = self.regs.read_half(pair, half);
                self.inc8_flags(result);
                4
            }
            None => {
                let result = self.read_operand(HL_INDIRECT).wrapping_add(1);
                self.write_operand(HL_INDIRECT, result);
                self.inc8_flags(result);
                12
            }
        }
    }

    /// DEC r / DEC (HL)
    pub(super) fn dec_r(&mut self, opcode: u8) -> u32 {
        let code = opcode >> 3;
        match Reg8::from_code(code) {
            Some(reg) => {
                let (pair, half) = reg.location();
                self.regs.decrement_half(pair, half);
                let result = self.regs.read_half(pair, half);
                self.dec8_flags(result);
                4
            }
            None => {
                let result = self.read_operand(HL_INDIRECT).wrapping_sub(1);
                self.write_operand(HL_INDIRECT, result);
                self.dec8_flags(result);
                12
            }
        }
    }

    /// LD r,d8 / LD (HL),d8
    pub(super) fn ld_r_d8(&mut self, opcode: u8) -> u32 {
        let code = (opcode >> 3) & 0x07;
        let value = self.fetch_byte();
        self.write_operand(code, value);
        if code == HL_INDIRECT { 12 } else { 8 }
    }

    pub(super) fn rlca(&mut self, _opcode: u8) -> u32 {
        let out = self.regs.rotate_left(Pair::AF, Half::High);
        self.regs.set_flags(false, false, false, out == 1);
        4
    }

    pub(super) fn rrca(&mut self, _opcode: u8) -> u32 {
        let out = self.regs.rotate_right(Pair::AF, Half::High);
        self.regs.set_flags(false, false, false, out == 1);
        4
    }

    /// Rotate A left through carry.
    pub(super) fn rla(&mut self, _opcode: u8) -> u32 {
        let carry_in = self.regs.carry();
        let out = self.regs.shift_left(Pair::AF, Half::High);
        if carry_in {
            self.regs.set_bit(Pair::AF, Half::High, 0);
        }
        self.regs.set_flags(false, false, false, out == 1);
        4
    }

    /// Rotate A right through carry.
    pub(super) fn rra(&mut self, _opcode: u8) -> u32 {
        let carry_in = self.regs.carry();
        let out = self.regs.shift_right(Pair::AF, Half::High, false);
        if carry_in {
            self.regs.set_bit(Pair::AF, Half::High, 7);
        }
        self.regs.set_flags(false, false, false, out == 1);
        4
    }

    /// LD (a16),SP
    pub(super) fn ld_a16_sp(&mut self, _opcode: u8) -> u32 {
        let addr = self.fetch_word();
        let [hi, lo] = self.regs.read_word(Pair::SP).to_be_bytes();
        self.bus.write(addr, lo);
        self.bus.write(addr.wrapping_add(1), hi);
        20
    }

    /// ADD HL,rr
    pub(super) fn add_hl_rr(&mut self, opcode: u8) -> u32 {
        let value = self.regs.read_word(pair_operand(opcode));
        self.add_hl(value);
        8
    }

    /// STOP is two bytes long; the second is padding. Low-power mode is not modelled.
    pub(super) fn stop(&mut self, _opcode: u8) -> u32 {
        self.fetch_byte();
        trace!("STOP at ${:04X}", self.pc().wrapping_sub(2));
        4
    }

    /// HALT costs its cycles but execution carries on with the next instruction.
    pub(super) fn halt(&mut self, _opcode: u8) -> u32 {
        trace!("HALT at ${:04X}", self.pc().wrapping_sub(1));
        4
    }

    /// JR e8
    pub(super) fn jr(&mut self, _opcode: u8) -> u32 {
        let offset = self.fetch_byte() as i8;
        self.set_pc(self.pc().wrapping_add(offset as u16));
        12
    }

    /// JR cc,e8
    pub(super) fn jr_cc(&mut self, opcode: u8) -> u32 {
        let offset = self.fetch_byte() as i8;
        if self.condition(opcode) {
            self.set_pc(self.pc().wrapping_add(offset as u16));
            12
        } else {
            8
        }
    }

    pub(super) fn daa_op(&mut self, _opcode: u8) -> u32 {
        self.daa();
        4
    }

    pub(super) fn cpl(&mut self, _opcode: u8) -> u32 {
        let a = !self.regs.read_high(Pair::AF);
        self.regs.write_high(Pair::AF, a);
        self.regs.set_flag(Flag::Subtract, true);
        self.regs.set_flag(Flag::HalfCarry, true);
        4
    }

    pub(super) fn scf(&mut self, _opcode: u8) -> u32 {
        self.regs.set_flag(Flag::Subtract, false);
        self.regs.set_flag(Flag::HalfCarry, false);
        self.regs.set_flag(Flag::Carry, true);
        4
    }

    pub(super) fn ccf(&mut self, _opcode: u8) -> u32 {
        let carry = self.regs.carry();
        self.regs.set_flag(Flag::Subtract, false);
        self.regs.set_flag(Flag::HalfCarry, false);
        self.regs.set_flag(Flag::Carry, !carry);
        4
    }

    /// LD r,r' including the (HL) source and destination forms.
    pub(super) fn ld_r_r(&mut self, opcode: u8) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        let value = self.read_operand(src);
        self.write_operand(dst, value);
        if dst == HL_INDIRECT || src == HL_INDIRECT { 8 } else { 4 }
    }

    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP A,r
    pub(super) fn alu_r(&mut self, opcode: u8) -> u32 {
        let src = opcode & 0x07;
        let value = self.read_operand(src);
        self.alu(AluOp::from_opcode(opcode), value);
        if src == HL_INDIRECT { 8 } else { 4 }
    }

    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP A,d8
    pub(super) fn alu_d8(&mut self, opcode: u8) -> u32 {
        let value = self.fetch_byte();
        self.alu(AluOp::from_opcode(opcode), value);
        8
    }

    pub(super) fn ret(&mut self, _opcode: u8) -> u32 {
        let addr = self.pop_word();
        self.set_pc(addr);
        16
    }

    pub(super) fn reti(&mut self, _opcode: u8) -> u32 {
        let addr = self.pop_word();
        self.set_pc(addr);
        self.ime = true;
        16
    }

    pub(super) fn ret_cc(&mut self, opcode: u8) -> u32 {
        if self.condition(opcode) {
            let addr = self.pop_word();
            self.set_pc(addr);
            20
        } else {
            8
        }
    }

    pub(super) fn pop(&mut self, opcode: u8) -> u32 {
        let value = self.pop_word();
        self.regs.write_word(stack_operand(opcode), value);
        12
    }

    pub(super) fn push(&mut self, opcode: u8) -> u32 {
        let value = self.regs.read_word(stack_operand(opcode));
        self.push_word(value);
        16
    }

    pub(super) fn jp(&mut self, _opcode: u8) -> u32 {
        let addr = self.fetch_word();
        self.set_pc(addr);
        16
    }

    pub(super) fn jp_cc(&mut self, opcode: u8) -> u32 {
        let addr = self.fetch_word();
        if self.condition(opcode) {
            self.set_pc(addr);
            16
        } else {
            12
        }
    }

    /// JP HL
    pub(super) fn jp_hl(&mut self, _opcode: u8) -> u32 {
        self.set_pc(self.regs.read_word(Pair::HL));
        4
    }

    pub(super) fn call(&mut self, _opcode: u8) -> u32 {
        let addr = self.fetch_word();
        self.push_word(self.pc());
        self.set_pc(addr);
        24
    }

    pub(super) fn call_cc(&mut self, opcode: u8) -> u32 {
        let addr = self.fetch_word();
        if self.condition(opcode) {
            self.push_word(self.pc());
            self.set_pc(addr);
            24
        } else {
            12
        }
    }

    /// RST n: call to the fixed vector encoded in bits 5–3.
    pub(super) fn rst(&mut self, opcode: u8) -> u32 {
        self.push_word(self.pc());
        self.set_pc((opcode & 0x38) as u16);
        16
    }

    /// LDH (a8),A
    pub(super) fn ldh_a8_a(&mut self, _opcode: u8) -> u32 {
        let addr = 0xFF00 | self.fetch_byte() as u16;
        let a = self.regs.read_high(Pair::AF);
        self.bus.write(addr, a);
        12
    }

    /// LDH A,(a8)
    pub(super) fn ldh_a_a8(&mut self, _opcode: u8) -> u32 {
        let addr = 0xFF00 | self.fetch_byte() as u16;
        let value = self.bus.read(addr);
        self.regs.write_high(Pair::AF, value);
        12
    }

    /// LD (C),A
    pub(super) fn ld_c_a(&mut self, _opcode: u8) -> u32 {
        let addr = 0xFF00 | self.regs.read_low(Pair::BC) as u16;
        let a = self.regs.read_high(Pair::AF);
        self.bus.write(addr, a);
        8
    }

    /// LD A,(C)
    pub(super) fn ld_a_c(&mut self, _opcode: u8) -> u32 {
        let addr = 0xFF00 | self.regs.read_low(Pair::BC) as u16;
        let value = self.bus.read(addr);
        self.regs.write_high(Pair::AF, value);
        8
    }

    /// ADD SP,e8
    pub(super) fn add_sp_e8(&mut self, _opcode: u8) -> u32 {
        let result = self.sp_plus_offset();
        self.regs.write_word(Pair::SP, result);
        16
    }

    /// LD HL,SP+e8
    pub(super) fn ld_hl_sp_e8(&mut self, _opcode: u8) -> u32 {
        let result = self.sp_plus_offset();
        self.regs.write_word(Pair::HL, result);
        12
    }

    /// LD SP,HL
    pub(super) fn ld_sp_hl(&mut self, _opcode: u8) -> u32 {
        let hl = self.regs.read_word(Pair::HL);
        self.regs.write_word(Pair::SP, hl);
        8
    }

    /// LD (a16),A
    pub(super) fn ld_a16_a(&mut self, _opcode: u8) -> u32 {
        let addr = self.fetch_word();
        let a = self.regs.read_high(Pair::AF);
        self.bus.write(addr, a);
        16
    }

    /// LD A,(a16)
    pub(super) fn ld_a_a16(&mut self, _opcode: u8) -> u32 {
        let addr = self.fetch_word();
        let value = self.bus.read(addr);
        self.regs.write_high(Pair::AF, value);
        16
    }

    pub(super) fn di(&mut self, _opcode: u8) -> u32 {
        self.ime = false;
        4
    }

    pub(super) fn ei(&mut self, _opcode: u8) -> u32 {
        self.ime = true;
        4
    }
}
