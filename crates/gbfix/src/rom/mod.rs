//! Game Boy ROM image fix-up
//!
//! This module patches a cartridge image including:
//! - Header fields in bank 0 (0x104-0x14C)
//! - Padding to a power-of-two number of banks
//! - Header checksum (0x14D) and global checksum (0x14E-0x14F)
//!
//! Images are processed as a stream of 16 KiB banks so that pipes work as
//! well as files fixed in place.

mod checksum;
mod fixer;
pub mod header;
mod padding;
mod stream;

pub use checksum::{
    GlobalChecksum, global_checksum, header_checksum, stored_global_checksum, verify_checksums,
};
pub use fixer::{FixReport, fix_rom};
pub use header::{HEADER_END, NINTENDO_LOGO, apply_edits};
pub use padding::PadPlan;
pub use stream::{InPlace, Piped, RomStream, read_fully};

/// Size of one ROM bank; bank 0 holds the header
pub const BANK_SIZE: usize = 0x4000;

/// Most banks an image may have (1 GiB)
///
/// Official mappers stop at 512 banks, but some homebrew mappers go up to
/// 65536.
pub const MAX_BANKS: u32 = 0x10000;
