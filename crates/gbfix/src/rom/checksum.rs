//! Game Boy header and global checksum calculation
//!
//! The header checksum is an 8-bit value over 0x134-0x14C, stored at 0x14D;
//! the boot ROM refuses to start the cartridge if it does not match.
//! The global checksum is the 16-bit sum of every byte in the image except
//! its own two bytes, stored big-endian at 0x14E.

use super::header::{GLOBAL_CHECKSUM_OFFSET, HEADER_CHECKSUM_OFFSET, TITLE_OFFSET};

/// Calculate the header checksum
///
/// Starting from zero, each byte of 0x134-0x14C is subtracted, plus one,
/// with 8-bit wraparound.
///
/// # Arguments
/// * `rom0` - Bank 0, at least up to the end of the header
pub fn header_checksum(rom0: &[u8]) -> u8 {
    rom0[TITLE_OFFSET..HEADER_CHECKSUM_OFFSET]
        .iter()
        .fold(0u8, |sum, &byte| sum.wrapping_sub(byte).wrapping_sub(1))
}

/// Running 16-bit global checksum
///
/// Banks can be fed in any order and in any number of pieces; only the bytes
/// themselves matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalChecksum {
    sum: u16,
}

impl GlobalChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every byte of `data`
    pub fn update(&mut self, data: &[u8]) {
        self.sum = data
            .iter()
            .fold(self.sum, |sum, &byte| sum.wrapping_add(u16::from(byte)));
    }

    /// Add `count` copies of `value` without materializing them
    pub fn add_fill(&mut self, value: u8, count: u64) {
        let added = u64::from(value).wrapping_mul(count);
        self.sum = self.sum.wrapping_add(added as u16);
    }

    pub fn finish(&self) -> u16 {
        self.sum
    }
}

/// Calculate the global checksum of a complete image held in memory
///
/// The two checksum bytes are counted as zero.
pub fn global_checksum(rom: &[u8]) -> u16 {
    let mut sum = GlobalChecksum::new();
    sum.update(&rom[..GLOBAL_CHECKSUM_OFFSET]);
    sum.update(&rom[GLOBAL_CHECKSUM_OFFSET + 2..]);
    sum.finish()
}

/// Read the global checksum stored in the header
pub fn stored_global_checksum(rom0: &[u8]) -> u16 {
    u16::from_be_bytes([rom0[GLOBAL_CHECKSUM_OFFSET], rom0[GLOBAL_CHECKSUM_OFFSET + 1]])
}

/// Verify both checksums of a complete image
///
/// # Returns
/// `true` if the stored header and global checksums both match
pub fn verify_checksums(rom: &[u8]) -> bool {
    if rom.len() < GLOBAL_CHECKSUM_OFFSET + 2 {
        return false;
    }

    rom[HEADER_CHECKSUM_OFFSET] == header_checksum(rom)
        && stored_global_checksum(rom) == global_checksum(rom)
}
