//! Game Boy CPU (Sharp LR35902 / SM83) emulation.
//!
//! Register file, both opcode tables (base and 0xCB-prefixed), and a frame-budgeted run loop.
//! Bus trait used for all memory access.

mod alu;
pub mod cpu;
pub mod dispatch;
mod extended;
pub mod flags;
mod ops;
pub mod registers;
