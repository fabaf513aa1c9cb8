//! Cartridge images split into fixed-size ROM banks.
//!
//! - **cartridge**: Loads an image from bytes or a file, exposes banks by index and the header fields.

pub mod cartridge;
