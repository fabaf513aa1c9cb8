//! Register file: four 8-bit pairs (AF, BC, DE, HL) plus SP and PC, all stored as pairs.
//!
//! Half-register operations return the shifted-out bit so the engine can derive the carry
//! flag; they never touch flags themselves.

use std::fmt;

use crate::cpu::flags::{FLAG_MASK, Flag};

/// Two 8-bit halves viewed as one 16-bit word, `(high << 8) | low`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterPair {
    pub high: u8,
    pub low: u8,
}

impl RegisterPair {
    pub const fn word(self) -> u16 {
        u16::from_be_bytes([self.high, self.low])
    }

    pub fn set_word(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.high = high;
        self.low = low;
    }
}

/// The six register pairs, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pair {
    AF = 0,
    BC = 1,
    DE = 2,
    HL = 3,
    SP = 4,
    PC = 5,
}

/// Which half of a pair an 8-bit operation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    High,
    Low,
}

/// 8-bit registers addressable by instruction operand fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

impl Reg8 {
    /// Decode the 3-bit operand field used throughout the opcode map.
    /// Code 6 selects the byte at (HL) and has no register, so it maps to `None`.
    pub const fn from_code(code: u8) -> Option<Reg8> {
        match code & 0x07 {
            0 => Some(Reg8::B),
            1 => Some(Reg8::C),
            2 => Some(Reg8::D),
            3 => Some(Reg8::E),
            4 => Some(Reg8::H),
            5 => Some(Reg8::L),
            6 => None,
            _ => Some(Reg8::A),
        }
    }

    pub const fn location(self) -> (Pair, Half) {
        match self {
            Reg8::B => (Pair::BC, Half::High),
            Reg8::C => (Pair::BC, Half::Low),
            Reg8::D => (Pair::DE, Half::High),
            Reg8::E => (Pair::DE, Half::Low),
            Reg8::H => (Pair::HL, Half::High),
            Reg8::L => (Pair::HL, Half::Low),
            Reg8::A => (Pair::AF, Half::High),
        }
    }
}

/// Rotate left circularly. Returns the result and the former bit 7.
pub const fn rotate_left(value: u8) -> (u8, u8) {
    (value.rotate_left(1), value >> 7)
}

/// Rotate right circularly. Returns the result and the former bit 0.
pub const fn rotate_right(value: u8) -> (u8, u8) {
    (value.rotate_right(1), value & 1)
}

/// Logical shift left; bit 0 becomes 0. Returns the result and the former bit 7.
pub const fn shift_left(value: u8) -> (u8, u8) {
    (value << 1, value >> 7)
}

/// Shift right. With `preserve_bit7` bit 7 is copied forward (arithmetic shift),
/// otherwise it becomes 0 (logical shift). Returns the result and the former bit 0.
pub const fn shift_right(value: u8, preserve_bit7: bool) -> (u8, u8) {
    let shifted = value >> 1;
    let result = if preserve_bit7 {
        shifted | (value & 0x80)
    } else {
        shifted
    };
    (result, value & 1)
}

pub const fn swap_nibbles(value: u8) -> u8 {
    value.rotate_left(4)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pairs: [RegisterPair; 6],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    fn pair(&self, pair: Pair) -> &RegisterPair {
        &self.pairs[pair as usize]
    }

    fn pair_mut(&mut self, pair: Pair) -> &mut RegisterPair {
        &mut self.pairs[pair as usize]
    }

    pub fn read_high(&self, pair: Pair) -> u8 {
        self.pair(pair).high
    }

    pub fn read_low(&self, pair: Pair) -> u8 {
        self.pair(pair).low
    }

    pub fn read_word(&self, pair: Pair) -> u16 {
        self.pair(pair).word()
    }

    pub fn read_half(&self, pair: Pair, half: Half) -> u8 {
        match half {
            Half::High => self.read_high(pair),
            Half::Low => self.read_low(pair),
        }
    }

    pub fn write_high(&mut self, pair: Pair, value: u8) {
        self.pair_mut(pair).high = value;
    }

    pub fn write_low(&mut self, pair: Pair, value: u8) {
        // F never holds anything below bit 4.
        let value = if pair == Pair::AF { value & FLAG_MASK } else { value };
        self.pair_mut(pair).low = value;
    }

    pub fn write_word(&mut self, pair: Pair, value: u16) {
        self.pair_mut(pair).set_word(value);
        if pair == Pair::AF {
            self.pairs[Pair::AF as usize].low &= FLAG_MASK;
        }
    }

    pub fn write_half(&mut self, pair: Pair, half: Half, value: u8) {
        match half {
            Half::High => self.write_high(pair, value),
            Half::Low => self.write_low(pair, value),
        }
    }

    pub fn read8(&self, reg: Reg8) -> u8 {
        let (pair, half) = reg.location();
        self.read_half(pair, half)
    }

    pub fn write8(&mut self, reg: Reg8, value: u8) {
        let (pair, half) = reg.location();
        self.write_half(pair, half, value);
    }

    /// Word-wide increment, wrapping 0xFFFF to 0x0000.
    pub fn increment(&mut self, pair: Pair) {
        let value = self.read_word(pair).wrapping_add(1);
        self.write_word(pair, value);
    }

    /// Word-wide decrement, wrapping 0x0000 to 0xFFFF.
    pub fn decrement(&mut self, pair: Pair) {
        let value = self.read_word(pair).wrapping_sub(1);
        self.write_word(pair, value);
    }

    /// 8-bit increment; wraps within the half and never carries into the sibling.
    pub fn increment_half(&mut self, pair: Pair, half: Half) {
        let value = self.read_half(pair, half).wrapping_add(1);
        self.write_half(pair, half, value);
    }

    /// 8-bit decrement; wraps within the half and never borrows from the sibling.
    pub fn decrement_half(&mut self, pair: Pair, half: Half) {
        let value = self.read_half(pair, half).wrapping_sub(1);
        self.write_half(pair, half, value);
    }

    pub fn rotate_left(&mut self, pair: Pair, half: Half) -> u8 {
        let (result, out) = rotate_left(self.read_half(pair, half));
        self.write_half(pair, half, result);
        out
    }

    pub fn rotate_right(&mut self, pair: Pair, half: Half) -> u8 {
        let (result, out) = rotate_right(self.read_half(pair, half));
        self.write_half(pair, half, result);
        out
    }

    pub fn shift_left(&mut self, pair: Pair, half: Half) -> u8 {
        let (result, out) = shift_left(self.read_half(pair, half));
        self.write_half(pair, half, result);
        out
    }

    pub fn shift_right(&mut self, pair: Pair, half: Half, preserve_bit7: bool) -> u8 {
        let (result, out) = shift_right(self.read_half(pair, half), preserve_bit7);
        self.write_half(pair, half, result);
        out
    }

    pub fn swap_nibbles(&mut self, pair: Pair, half: Half) {
        let result = swap_nibbles(self.read_half(pair, half));
        self.write_half(pair, half, result);
    }

    /// Returns bit `n` (0–7) of the half as 0 or 1.
    pub fn test_bit(&self, pair: Pair, half: Half, n: u8) -> u8 {
        (self.read_half(pair, half) >> (n & 0x07)) & 1
    }

    pub fn set_bit(&mut self, pair: Pair, half: Half, n: u8) {
        let value = self.read_half(pair, half) | (1 << (n & 0x07));
        self.write_half(pair, half, value);
    }

    pub fn clear_bit(&mut self, pair: Pair, half: Half, n: u8) {
        let value = self.read_half(pair, half) & !(1 << (n & 0x07));
        self.write_half(pair, half, value);
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.read_low(Pair::AF) & flag.mask() != 0
    }

    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        let f = self.read_low(Pair::AF);
        let f = if on { f | flag.mask() } else { f & !flag.mask() };
        self.write_low(Pair::AF, f);
    }

    /// Assign all four flags at once.
    pub fn set_flags(&mut self, zero: bool, subtract: bool, half_carry: bool, carry: bool) {
        self.set_flag(Flag::Zero, zero);
        self.set_flag(Flag::Subtract, subtract);
        self.set_flag(Flag::HalfCarry, half_carry);
        self.set_flag(Flag::Carry, carry);
    }

    pub fn zero(&self) -> bool {
        self.flag(Flag::Zero)
    }

    pub fn subtract(&self) -> bool {
        self.flag(Flag::Subtract)
    }

    pub fn half_carry(&self) -> bool {
        self.flag(Flag::HalfCarry)
    }

    pub fn carry(&self) -> bool {
        self.flag(Flag::Carry)
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} SP:{:04X}",
            self.read_word(Pair::AF),
            self.read_word(Pair::BC),
            self.read_word(Pair::DE),
            self.read_word(Pair::HL),
            self.read_word(Pair::SP),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_is_reconstructed_from_halves() {
        let mut regs = Registers::new();
        regs.write_word(Pair::DE, 0xBEEF);
        assert_eq!(regs.read_high(Pair::DE), 0xBE);
        assert_eq!(regs.read_low(Pair::DE), 0xEF);

        regs.write_low(Pair::DE, 0x01);
        assert_eq!(regs.read_word(Pair::DE), 0xBE01);
    }

    #[test]
    fn word_increment_and_decrement_wrap() {
        let mut regs = Registers::new();
        regs.write_word(Pair::HL, 0xFFFF);
        regs.increment(Pair::HL);
        assert_eq!(regs.read_word(Pair::HL), 0x0000);

        regs.decrement(Pair::HL);
        assert_eq!(regs.read_word(Pair::HL), 0xFFFF);
    }

    #[test]
    fn half_increment_leaves_sibling_alone() {
        let mut regs = Registers::new();
        regs.write_word(Pair::BC, 0xDFFF);
        regs.increment_half(Pair::BC, Half::High);
        assert_eq!(regs.read_word(Pair::BC), 0xE0FF);

        regs.write_word(Pair::BC, 0x12FF);
        regs.increment_half(Pair::BC, Half::Low);
        assert_eq!(regs.read_word(Pair::BC), 0x1200);

        regs.decrement_half(Pair::BC, Half::Low);
        assert_eq!(regs.read_word(Pair::BC), 0x12FF);
    }

    #[test]
    fn flag_register_low_nibble_is_always_zero() {
        let mut regs = Registers::new();
        regs.write_word(Pair::AF, 0x12FF);
        assert_eq!(regs.read_word(Pair::AF), 0x12F0);

        regs.write_low(Pair::AF, 0x0F);
        assert_eq!(regs.read_low(Pair::AF), 0x00);
    }

    #[test]
    fn rotates_report_the_bit_shifted_out() {
        let mut regs = Registers::new();
        regs.write_high(Pair::BC, 0x80);
        assert_eq!(regs.rotate_left(Pair::BC, Half::High), 1);
        assert_eq!(regs.read_high(Pair::BC), 0x01);

        assert_eq!(regs.rotate_right(Pair::BC, Half::High), 1);
        assert_eq!(regs.read_high(Pair::BC), 0x80);
    }

    #[test]
    fn shift_right_arithmetic_versus_logical() {
        let mut regs = Registers::new();
        regs.write_low(Pair::HL, 0x81);
        assert_eq!(regs.shift_right(Pair::HL, Half::Low, true), 1);
        assert_eq!(regs.read_low(Pair::HL), 0xC0);

        regs.write_low(Pair::HL, 0x81);
        assert_eq!(regs.shift_right(Pair::HL, Half::Low, false), 1);
        assert_eq!(regs.read_low(Pair::HL), 0x40);
    }

    #[test]
    fn shift_left_clears_bit_zero() {
        let mut regs = Registers::new();
        regs.write_high(Pair::DE, 0xFF);
        assert_eq!(regs.shift_left(Pair::DE, Half::High), 1);
        assert_eq!(regs.read_high(Pair::DE), 0xFE);
    }

    #[test]
    fn swap_and_single_bit_operations() {
        let mut regs = Registers::new();
        regs.write_high(Pair::AF, 0xA5);
        regs.swap_nibbles(Pair::AF, Half::High);
        assert_eq!(regs.read_high(Pair::AF), 0x5A);

        assert_eq!(regs.test_bit(Pair::AF, Half::High, 1), 1);
        assert_eq!(regs.test_bit(Pair::AF, Half::High, 0), 0);
        regs.set_bit(Pair::AF, Half::High, 0);
        regs.clear_bit(Pair::AF, Half::High, 6);
        assert_eq!(regs.read_high(Pair::AF), 0x1B);
    }

    #[test]
    fn flag_updates_are_bitwise() {
        let mut regs = Registers::new();
        regs.set_flag(Flag::Carry, true);
        regs.set_flag(Flag::Zero, true);
        assert_eq!(regs.read_low(Pair::AF), 0x90);

        regs.set_flag(Flag::Zero, false);
        assert!(regs.carry());
        assert!(!regs.zero());
        assert_eq!(regs.read_low(Pair::AF), 0x10);
    }

    #[test]
    fn operand_codes_decode_to_registers() {
        assert_eq!(Reg8::from_code(0), Some(Reg8::B));
        assert_eq!(Reg8::from_code(5), Some(Reg8::L));
        assert_eq!(Reg8::from_code(6), None);
        assert_eq!(Reg8::from_code(7), Some(Reg8::A));
    }
}
