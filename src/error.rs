//! Error types for the CPU core and the cartridge loader.

use std::io;

use thiserror::Error;

/// Faults that stop the execution engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// No handler is registered for the fetched opcode. `pc` is the address of the
    /// opcode byte (the 0xCB prefix for extended opcodes).
    #[error("unimplemented opcode {} at ${pc:04X}", display_opcode(.opcode, .extended))]
    UnimplementedOpcode { opcode: u8, pc: u16, extended: bool },
}

fn display_opcode(opcode: &u8, extended: &bool) -> String {
    if *extended {
        format!("$CB {opcode:02X}")
    } else {
        format!("${opcode:02X}")
    }
}

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read cartridge image: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unimplemented_opcode_message_names_opcode_and_pc() {
        let err = CpuError::UnimplementedOpcode {
            opcode: 0xD3,
            pc: 0x0150,
            extended: false,
        };
        assert_eq!(err.to_string(), "unimplemented opcode $D3 at $0150");

        let err = CpuError::UnimplementedOpcode {
            opcode: 0x37,
            pc: 0xC000,
            extended: true,
        };
        assert_eq!(err.to_string(), "unimplemented opcode $CB 37 at $C000");
    }
}
