//! Handlers for the 0xCB-prefixed table: rotates, shifts, SWAP, and single-bit BIT/RES/SET.
//!
//! Bits 2–0 select the operand (B, C, D, E, H, L, (HL), A), bits 5–3 the shift kind or bit
//! index. Costs include the prefix fetch.

use crate::{
    bus::Bus,
    cpu::{
        cpu::CPU,
        flags::Flag,
        registers::{self, Reg8},
    },
};

/// Rotate/shift kind in bits 5–3 of CB 00–3F.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShiftKind {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftKind {
    const fn from_opcode(opcode: u8) -> ShiftKind {
        match (opcode >> 3) & 0x07 {
            0 => ShiftKind::Rlc,
            1 => ShiftKind::Rrc,
            2 => ShiftKind::Rl,
            3 => ShiftKind::Rr,
            4 => ShiftKind::Sla,
            5 => ShiftKind::Sra,
            6 => ShiftKind::Swap,
            _ => ShiftKind::Srl,
        }
    }
}

/// Same operation on a byte that does not live in a register. Returns result and carry-out.
fn shift_byte(kind: ShiftKind, value: u8, carry_in: bool) -> (u8, u8) {
    match kind {
        ShiftKind::Rlc => registers::rotate_left(value),
        ShiftKind::Rrc => registers::rotate_right(value),
        ShiftKind::Rl => {
            let (result, out) = registers::shift_left(value);
            (result | carry_in as u8, out)
        }
        ShiftKind::Rr => {
            let (result, out) = registers::shift_right(value, false);
            (result | (carry_in as u8) << 7, out)
        }
        ShiftKind::Sla => registers::shift_left(value),
        ShiftKind::Sra => registers::shift_right(value, true),
        ShiftKind::Swap => (registers::swap_nibbles(value), 0),
        ShiftKind::Srl => registers::shift_right(value, false),
    }
}

impl<B: Bus> CPU<B> {
    /// RLC/RRC/RL/RR/SLA/SRA/SWAP/SRL. Z from the result, N and H reset, C from the bit
    /// shifted out (always reset for SWAP).
    pub(super) fn cb_shift(&mut self, opcode: u8) -> u32 {
        let kind = ShiftKind::from_opcode(opcode);
        let carry_in = self.regs.carry();

        let (result, out, cycles) = match Reg8::from_code(opcode) {
            Some(reg) => {
                let (pair, half) = reg.location();
                let out = match kind {
                    ShiftKind::Rlc => self.regs.rotate_left(pair, half),
                    ShiftKind::Rrc => self.regs.rotate_right(pair, half),
                    ShiftKind::Rl => {
                        let out = self.regs.shift_left(pair, half);
                        if carry_in {
                            self.regs.set_bit(pair, half, 0);
                        }
                        out
                    }
                    ShiftKind::Rr => {
                        let out = self.regs.shift_right(pair, half, false);
                        if carry_in {
                            self.regs.set_bit(pair, half, 7);
                        }
                        out
                    }
                    ShiftKind::Sla => self.regs.shift_left(pair, half),
                    ShiftKind::Sra => self.regs.shift_right(pair, half, true),
                    ShiftKind::Swap => {
                        self.regs.swap_nibbles(pair, half);
                        0
                    }
                    ShiftKind::Srl => self.regs.shift_right(pair, half, false),
                };
                (self.regs.read_half(pair, half), out, 8)
            }
            None => {
                let value = self.read_operand(opcode);
                let (result, out) = shift_byte(kind, value, carry_in);
                self.write_operand(opcode, result);
                (result, out, 16)
            }
        };

        self.regs.set_flags(result == 0, false, false, out == 1);
        cycles
    }

    /// BIT n,r: Z is the complement of the bit, N reset, H set, C untouched.
    pub(super) fn cb_bit(&mut self, opcode: u8) -> u32 {
        let n = (opcode >> 3) & 0x07;
        let (bit, cycles) = match Reg8::from_code(opcode) {
            Some(reg) => {
                let (pair, half) = reg.location();
                (self.regs.test_bit(pair, half, n), 8)
            }
            None => ((self.read_operand(opcode) >> n) & 1, 12),
        };

        self.regs.set_flag(Flag::Zero, bit == 0);
        self.regs.set_flag(Flag::Subtract, false);
        self.regs.set_flag(Flag::HalfCarry, true);
        cycles
    }

    /// RES n,r. No flags.
    pub(super) fn cb_res(&mut self, opcode: u8) -> u32 {
        let n = (opcode >> 3) & 0x07;
        match Reg8::from_code(opcode) {
            Some(reg) => {
                let (pair, half) = reg.location();
                self.regs.clear_bit(pair, half, n);
                8
            }
            None => {
                let value = self.read_operand(opcode) & !(1 << n);
                self.write_operand(opcode, value);
                16
            }
        }
    }

    /// SET n,r. No flags.
    pub(super) fn cb_set(&mut self, opcode: u8) -> u32 {
        let n = (opcode >> 3) & 0x07;
        match Reg8::from_code(opcode) {
            Some(reg) => {
                let (pair, half) = reg.location();
                self.regs.set_bit(pair, half, n);
                8
            }
            None => {
                let value = self.read_operand(opcode) | (1 << n);
                self.write_operand(opcode, value);
                16
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn through_carry_rotates_feed_the_old_carry_in() {
        assert_eq!(shift_byte(ShiftKind::Rl, 0x80, true), (0x01, 1));
        assert_eq!(shift_byte(ShiftKind::Rl, 0x80, false), (0x00, 1));
        assert_eq!(shift_byte(ShiftKind::Rr, 0x01, true), (0x80, 1));
        assert_eq!(shift_byte(ShiftKind::Rr, 0x02, false), (0x01, 0));
    }

    #[test]
    fn shift_kinds_decode_from_opcode_bits() {
        assert_eq!(ShiftKind::from_opcode(0x00), ShiftKind::Rlc);
        assert_eq!(ShiftKind::from_opcode(0x1E), ShiftKind::Rr);
        assert_eq!(ShiftKind::from_opcode(0x2F), ShiftKind::Sra);
        assert_eq!(ShiftKind::from_opcode(0x37), ShiftKind::Swap);
        assert_eq!(ShiftKind::from_opcode(0x3F), ShiftKind::Srl);
    }
}
