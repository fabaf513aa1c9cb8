//! Opcode dispatch tables: one function pointer per opcode byte, built once per CPU.
//!
//! A `None` slot is an opcode with no handler; the engine reports it as an error.

use crate::{bus::Bus, cpu::cpu::CPU};

/// Executes one instruction whose opcode is passed in; returns its cycle cost.
pub type Handler<B> = fn(&mut CPU<B>, u8) -> u32;

pub type DispatchTable<B> = [Option<Handler<B>>; 256];

/// Opcodes the CPU does not decode.
pub const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

fn register<B: Bus>(
    table: &mut DispatchTable<B>,
    opcodes: impl IntoIterator<Item = u8>,
    handler: Handler<B>,
) {
    for opcode in opcodes {
        table[opcode as usize] = Some(handler);
    }
}

/// The unprefixed table. 0xCB is left empty: the engine reads the next byte itself and
/// looks it up in the extended table.
pub fn base_table<B: Bus>() -> DispatchTable<B> {
    let mut t: DispatchTable<B> = [None; 256];

    register(&mut t, [0x00], CPU::<B>::nop);
    register(&mut t, [0x01, 0x11, 0x21, 0x31], CPU::<B>::ld_rr_d16);
    register(&mut t, [0x02, 0x12, 0x22, 0x32], CPU::<B>::ld_indirect_a);
    register(&mut t, [0x0A, 0x1A, 0x2A, 0x3A], CPU::<B>::ld_a_indirect);
    register(&mut t, [0x03, 0x13, 0x23, 0x33], CPU::<B>::inc_rr);
    register(&mut t, [0x0B, 0x1B, 0x2B, 0x3B], CPU::<B>::dec_rr);
    register(&mut t, [0x04, 0x0C, 0x14, 0x1C, 0x24, 0x2C, 0x34, 0x3C], CPU::<B>::inc_r);
    register(&mut t, [0x05, 0x0D, 0x15, 0x1D, 0x25, 0x2D, 0x35, 0x3D], CPU::<B>::dec_r);
    register(&mut t, [0x06, 0x0E, 0x16, 0x1E, 0x26, 0x2E, 0x36, 0x3E], CPU::<B>::ld_r_d8);
    register(&mut t, [0x07], CPU::<B>::rlca);
    register(&mut t, [0x0F], CPU::<B>::rrca);
    register(&mut t, [0x17], CPU::<B>::rla);
    register(&mut t, [0x1F], CPU::<B>::rra);
    register(&mut t, [0x08], CPU::<B>::ld_a16_sp);
    register(&mut t, [0x09, 0x19, 0x29, 0x39], CPU::<B>::add_hl_rr);
    register(&mut t, [0x10], CPU::<B>::stop);
    register(&mut t, [0x18], CPU::<B>::jr);
    register(&mut t, [0x20, 0x28, 0x30, 0x38], CPU::<B>::jr_cc);
    register(&mut t, [0x27], CPU::<B>::daa_op);
    register(&mut t, [0x2F], CPU::<B>::cpl);
    register(&mut t, [0x37], CPU::<B>::scf);
    register(&mut t, [0x3F], CPU::<B>::ccf);

    register(&mut t, (0x40..=0x7Fu8).filter(|&op| op != 0x76), CPU::<B>::ld_r_r);
    register(&mut t, [0x76], CPU::<B>::halt);
    register(&mut t, 0x80..=0xBFu8, CPU::<B>::alu_r);

    register(&mut t, [0xC0, 0xC8, 0xD0, 0xD8], CPU::<B>::ret_cc);
    register(&mut t, [0xC9], CPU::<B>::ret);
    register(&mut t, [0xD9], CPU::<B>::reti);
    register(&mut t, [0xC1, 0xD1, 0xE1, 0xF1], CPU::<B>::pop);
    register(&mut t, [0xC5, 0xD5, 0xE5, 0xF5], CPU::<B>::push);
    register(&mut t, [0xC2, 0xCA, 0xD2, 0xDA], CPU::<B>::jp_cc);
    register(&mut t, [0xC3], CPU::<B>::jp);
    register(&mut t, [0xE9], CPU::<B>::jp_hl);
    register(&mut t, [0xC4, 0xCC, 0xD4, 0xDC], CPU::<B>::call_cc);
    register(&mut t, [0xCD], CPU::<B>::call);
    register(&mut t, [0xC6, 0xCE, 0xD6, 0xDE, 0xE6, 0xEE, 0xF6, 0xFE], CPU::<B>::alu_d8);
    register(&mut t, [0xC7, 0xCF, 0xD7, 0xDF, 0xE7, 0xEF, 0xF7, 0xFF], CPU::<B>::rst);
    register(&mut t, [0xE0], CPU::<B>::ldh_a8_a);
    register(&mut t, [0xF0], CPU::<B>::ldh_a_a8);
    register(&mut t, [0xE2], CPU::<B>::ld_c_a);
    register(&mut t, [0xF2], CPU::<B>::ld_a_c);
    register(&mut t, [0xE8], CPU::<B>::add_sp_e8);
    register(&mut t, [0xF8], CPU::<B>::ld_hl_sp_e8);
    register(&mut t, [0xF9], CPU::<B>::ld_sp_hl);
    register(&mut t, [0xEA], CPU::<B>::ld_a16_a);
    register(&mut t, [0xFA], CPU::<B>::ld_a_a16);
    register(&mut t, [0xF3], CPU::<B>::di);
    register(&mut t, [0xFB], CPU::<B>::ei);

    t
}

/// The 0xCB-prefixed table; every slot is populated.
pub fn extended_table<B: Bus>() -> DispatchTable<B> {
    let mut t: DispatchTable<B> = [None; 256];

    register(&mut t, 0x00..=0x3Fu8, CPU::<B>::cb_shift);
    register(&mut t, 0x40..=0x7Fu8, CPU::<B>::cb_bit);
    register(&mut t, 0x80..=0xBFu8, CPU::<B>::cb_res);
    register(&mut t, 0xC0..=0xFFu8, CPU::<B>::cb_set);

    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bus::MemoryBus, cpu::cpu::PREFIX_CB};

    #[test]
    fn base_table_leaves_only_illegal_opcodes_and_prefix_empty() {
        let table = base_table::<MemoryBus>();
        for opcode in 0..=0xFFu8 {
            let expect_empty = opcode == PREFIX_CB || ILLEGAL_OPCODES.contains(&opcode);
            assert_eq!(
                table[opcode as usize].is_none(),
                expect_empty,
                "opcode {opcode:02X}"
            );
        }
    }

    #[test]
    fn extended_table_is_complete() {
        let table = extended_table::<MemoryBus>();
        assert!(table.iter().all(Option::is_some));
    }
}
