//! Flag register (F) bits. Only the top nibble is meaningful; bits 3–0 always read 0.

pub const FLAG_ZERO: u8 = 1 << 7;
pub const FLAG_SUBTRACT: u8 = 1 << 6;
pub const FLAG_HALF_CARRY: u8 = 1 << 5;
pub const FLAG_CARRY: u8 = 1 << 4;

/// Mask of the bits F can hold.
pub const FLAG_MASK: u8 = 0xF0;

/// One of the four condition flags, identified by its bit position in F.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Zero = 7,
    Subtract = 6,
    HalfCarry = 5,
    Carry = 4,
}

impl Flag {
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_match_bit_positions() {
        assert_eq!(Flag::Zero.mask(), FLAG_ZERO);
        assert_eq!(Flag::Subtract.mask(), FLAG_SUBTRACT);
        assert_eq!(Flag::HalfCarry.mask(), FLAG_HALF_CARRY);
        assert_eq!(Flag::Carry.mask(), FLAG_CARRY);
        assert_eq!(FLAG_ZERO | FLAG_SUBTRACT | FLAG_HALF_CARRY | FLAG_CARRY, FLAG_MASK);
    }
}
