//! Arithmetic shared by the instruction handlers. Each helper computes its result and
//! applies exactly the flags its instruction family defines.

use crate::{
    bus::Bus,
    cpu::{
        cpu::CPU,
        flags::Flag,
        registers::{Half, Pair},
    },
};

/// ALU operation selected by bits 5–3 of the 0x80–0xBF and 0xC6–0xFE opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub const fn from_opcode(opcode: u8) -> AluOp {
        match (opcode >> 3) & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

impl<B: Bus> CPU<B> {
    /// A <- A op value.
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        let a = self.regs.read_high(Pair::AF);
        let carry_in = self.regs.carry() as u8;
        let result = match op {
            AluOp::Add => self.add8(a, value, 0),
            AluOp::Adc => self.add8(a, value, carry_in),
            AluOp::Sub => self.sub8(a, value, 0),
            AluOp::Sbc => self.sub8(a, value, carry_in),
            AluOp::And => {
                let r = a & value;
                self.regs.set_flags(r == 0, false, true, false);
                r
            }
            AluOp::Xor => {
                let r = a ^ value;
                self.regs.set_flags(r == 0, false, false, false);
                r
            }
            AluOp::Or => {
                let r = a | value;
                self.regs.set_flags(r == 0, false, false, false);
                r
            }
            AluOp::Cp => {
                self.sub8(a, value, 0);
                a
            }
        };
        self.regs.write_high(Pair::AF, result);
    }

    fn add8(&mut self, a: u8, b: u8, carry_in: u8) -> u8 {
        let wide = a as u16 + b as u16 + carry_in as u16;
        let half = (a & 0x0F) + (b & 0x0F) + carry_in > 0x0F;
        let result = wide as u8;
        self.regs.set_flags(result == 0, false, half, wide > 0xFF);
        result
    }

    fn sub8(&mut self, a: u8, b: u8, carry_in: u8) -> u8 {
        let wide = a as i16 - b as i16 - carry_in as i16;
        let half = ((a & 0x0F) as i16) - ((b & 0x0F) as i16) - (carry_in as i16) < 0;
        let result = wide as u8;
        self.regs.set_flags(result == 0, true, half, wide < 0);
        result
    }

    /// Flags after an 8-bit increment: Z from the result, N reset, H when the low nibble
    /// rolled over to 0. Carry is untouched.
    pub(super) fn inc8_flags(&mut self, result: u8) {
        self.regs.set_flag(Flag::Zero, result == 0);
        self.regs.set_flag(Flag::Subtract, false);
        self.regs.set_flag(Flag::HalfCarry, (result & 0x0F) == 0x00);
    }

    /// Flags after an 8-bit decrement: Z from the result, N set, H when the low nibble
    /// borrowed down to 0xF. Carry is untouched.
    pub(super) fn dec8_flags(&mut self, result: u8) {
        self.regs.set_flag(Flag::Zero, result == 0);
        self.regs.set_flag(Flag::Subtract, true);
        self.regs.set_flag(Flag::HalfCarry, (result & 0x0F) == 0x0F);
    }

    /// HL <- HL + value. Z untouched, N reset, H from bit 11, C from bit 15.
    pub(super) fn add_hl(&mut self, value: u16) {
        let hl = self.regs.read_word(Pair::HL) as u32;
        let value = value as u32;
        let sum = hl + value;
        let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;

        self.regs.write_word(Pair::HL, sum as u16);
        self.regs.set_flag(Flag::Subtract, false);
        self.regs.set_flag(Flag::HalfCarry, half);
        self.regs.set_flag(Flag::Carry, sum > 0xFFFF);
    }

    /// SP plus a signed immediate, as used by ADD SP,e8 and LD HL,SP+e8. Z and N reset;
    /// H and C come from the unsigned add of the low byte.
    pub(super) fn sp_plus_offset(&mut self) -> u16 {
        let offset = self.fetch_byte() as i8 as i16 as u16;
        let sp = self.regs.read_word(Pair::SP);

        let half = (sp & 0x000F) + (offset & 0x000F) > 0x000F;
        let carry = (sp & 0x00FF) + (offset & 0x00FF) > 0x00FF;
        self.regs.set_flags(false, false, half, carry);

        sp.wrapping_add(offset)
    }

    /// Decimal-adjust A after a BCD add or subtract.
    pub(super) fn daa(&mut self) {
        let mut a = self.regs.read_high(Pair::AF);
        let mut carry = self.regs.carry();
        let mut adjust = 0u8;

        if self.regs.subtract() {
            if self.regs.half_carry() {
                adjust |= 0x06;
            }
            if carry {
                adjust |= 0x60;
            }
            a = a.wrapping_sub(adjust);
        } else {
            if self.regs.half_carry() || (a & 0x0F) > 0x09 {
                adjust |= 0x06;
            }
            if carry || a > 0x99 {
                adjust |= 0x60;
                carry = true;
            }
            a = a.wrapping_add(adjust);
        }

        self.regs.write_half(Pair::AF, Half::High, a);
        self.regs.set_flag(Flag::Zero, a == 0);
        self.regs.set_flag(Flag::HalfCarry, false);
        self.regs.set_flag(Flag::Carry, carry);
    }
}
