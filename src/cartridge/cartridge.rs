//! Cartridge loading: the image is cut into 16 KiB banks in cartridge order.
//!
//! The bus never owns banks outright; it holds shared references to bank 0 and the currently
//! selected swappable bank. Header layout follows the Pan Docs "The Cartridge Header" page:
//! title at $0134–$0143, cartridge type at $0147.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::CartridgeError;

pub const ROM_BANK_SIZE: usize = 0x4000;

const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0143;
const CARTRIDGE_TYPE: usize = 0x0147;

/// One 16 KiB ROM bank.
pub type RomBank = [u8; ROM_BANK_SIZE];

/// A cartridge image as an ordered list of ROM banks.
#[derive(Clone, Debug, Default)]
pub struct Cartridge {
    banks: Vec<Arc<RomBank>>,
}

impl Cartridge {
    /// Split `data` into banks. The bank count is the image size rounded up to whole banks;
    /// the tail of a short final bank is zero. An empty image has no banks.
    pub fn from_bytes(data: &[u8]) -> Self {
        let banks = data
            .chunks(ROM_BANK_SIZE)
            .map(|chunk| {
                let mut bank = [0u8; ROM_BANK_SIZE];
                bank[..chunk.len()].copy_from_slice(chunk);
                Arc::new(bank)
            })
            .collect::<Vec<_>>();

        debug!(bytes = data.len(), banks = banks.len(), "cartridge image split");
        Self { banks }
    }

    /// Read a cartridge image from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let data = fs::read(path.as_ref())?;
        Ok(Self::from_bytes(&data))
    }

    /// Bank `index`, or `None` past the end of the image.
    pub fn bank(&self, index: usize) -> Option<&Arc<RomBank>> {
        self.banks.get(index)
    }

    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    /// Header title, up to the first NUL or non-printable byte. Empty when bank 0 is absent.
    pub fn title(&self) -> String {
        let Some(bank) = self.bank(0) else {
            return String::new();
        };
        bank[TITLE_START..=TITLE_END]
            .iter()
            .take_while(|&&b| b.is_ascii_graphic() || b == b' ')
            .map(|&b| b as char)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// Header cartridge-type byte (memory bank controller and extras).
    pub fn cartridge_type(&self) -> Option<u8> {
        self.bank(0).map(|bank| bank[CARTRIDGE_TYPE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_with_title(title: &[u8], len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        data[TITLE_START..TITLE_START + title.len()].copy_from_slice(title);
        data[CARTRIDGE_TYPE] = 0x01;
        data
    }

    #[test]
    fn bank_count_rounds_up_to_whole_banks() {
        let cart = Cartridge::from_bytes(&vec![0xAA; ROM_BANK_SIZE * 2 + 1]);
        assert_eq!(cart.bank_count(), 3);

        let last = cart.bank(2).expect("third bank");
        assert_eq!(last[0], 0xAA);
        assert_eq!(last[1], 0x00);
    }

    #[test]
    fn empty_image_has_no_banks() {
        let cart = Cartridge::from_bytes(&[]);
        assert_eq!(cart.bank_count(), 0);
        assert!(cart.bank(0).is_none());
        assert_eq!(cart.title(), "");
        assert_eq!(cart.cartridge_type(), None);
    }

    #[test]
    fn out_of_range_bank_is_absent() {
        let cart = Cartridge::from_bytes(&vec![0; ROM_BANK_SIZE * 2]);
        assert!(cart.bank(1).is_some());
        assert!(cart.bank(2).is_none());
    }

    #[test]
    fn header_fields() {
        let cart = Cartridge::from_bytes(&image_with_title(b"TETRIS", ROM_BANK_SIZE * 2));
        assert_eq!(cart.title(), "TETRIS");
        assert_eq!(cart.cartridge_type(), Some(0x01));
    }

    #[test]
    fn banks_are_shared_not_copied() {
        let cart = Cartridge::from_bytes(&vec![0; ROM_BANK_SIZE]);
        let a = cart.bank(0).cloned().expect("bank 0");
        let b = cart.bank(0).cloned().expect("bank 0");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Cartridge::load("/nonexistent/definitely-missing.gb").unwrap_err();
        assert!(matches!(err, CartridgeError::Io(_)));
    }
}
