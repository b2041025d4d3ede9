//! Padding to a valid ROM size
//!
//! Flashers write to ROM chips whose size is always a power of two, and a
//! cartridge has at least two banks, so padding targets the next power of two
//! no smaller than two banks.

use super::BANK_SIZE;

/// Where padding takes an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadPlan {
    /// Banks after padding: a power of two, at least 2
    pub target_banks: u32,
    /// Filler bytes to append, counting any needed to complete bank 0
    pub pad_bytes: u64,
    /// Value for the ROM size byte at 0x148
    pub rom_size_code: u8,
}

impl PadPlan {
    /// Plan padding for an image of `total_len` bytes spread over `bank_count` banks
    pub fn new(bank_count: u32, total_len: u64) -> Self {
        let target_banks = round_to_power_of_two(bank_count).max(2);
        let target_len = u64::from(target_banks) * BANK_SIZE as u64;

        Self {
            target_banks,
            pad_bytes: target_len.saturating_sub(total_len),
            rom_size_code: (target_banks / 2).trailing_zeros() as u8,
        }
    }

    /// Size of the image once padded
    pub fn target_len(&self) -> u64 {
        u64::from(self.target_banks) * BANK_SIZE as u64
    }
}

/// Round up to the next power of 2
fn round_to_power_of_two(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    n.next_power_of_two()
}
