//! Game Boy cartridge header layout and field writes
//!
//! The header occupies bytes 0x100-0x14F of bank 0. Only the fields from
//! 0x104 onwards are ever written here; the entry point at 0x100 is left to
//! the program.

use crate::config::{FixAction, FixConfig};

/// Boot logo, checked byte-for-byte by the boot ROM (48 bytes)
pub const LOGO_OFFSET: usize = 0x104;
/// Title, upper-case ASCII (up to 16 bytes, overlapping the fields below)
pub const TITLE_OFFSET: usize = 0x134;
/// Manufacturer code (4 bytes)
pub const GAME_ID_OFFSET: usize = 0x13F;
/// CGB compatibility flag
pub const CGB_FLAG_OFFSET: usize = 0x143;
/// Two-character licensee code, used when the old licensee is 0x33 (2 bytes)
pub const NEW_LICENSEE_OFFSET: usize = 0x144;
/// SGB support flag
pub const SGB_FLAG_OFFSET: usize = 0x146;
/// Cartridge type (MBC and extra hardware)
pub const CARTRIDGE_TYPE_OFFSET: usize = 0x147;
/// ROM size code: the image holds `2 << code` banks
pub const ROM_SIZE_OFFSET: usize = 0x148;
/// Cartridge RAM size code
pub const RAM_SIZE_OFFSET: usize = 0x149;
/// Destination code (0x00 Japan, 0x01 elsewhere)
pub const DESTINATION_OFFSET: usize = 0x14A;
/// One-byte licensee code
pub const OLD_LICENSEE_OFFSET: usize = 0x14B;
/// Mask ROM version number
pub const ROM_VERSION_OFFSET: usize = 0x14C;
/// 8-bit checksum over 0x134-0x14C
pub const HEADER_CHECKSUM_OFFSET: usize = 0x14D;
/// 16-bit big-endian checksum over the whole image (2 bytes)
pub const GLOBAL_CHECKSUM_OFFSET: usize = 0x14E;
/// First byte past the header; also the smallest acceptable image size
pub const HEADER_END: usize = 0x150;

pub const SGB_ENABLED: u8 = 0x03;
pub const NON_JAPANESE: u8 = 0x01;

/// The logo bitmap the boot ROM compares against
pub const NINTENDO_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B,
    0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E,
    0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC,
    0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// Write every configured header field into bank 0
///
/// Checksums and the ROM size are not touched: they depend on the final size
/// of the image and are written later.
pub fn apply_edits(rom0: &mut [u8], config: &FixConfig) {
    debug_assert!(rom0.len() >= HEADER_END);

    match config.fix.logo {
        FixAction::Keep => {}
        FixAction::Fix => write_run(rom0, LOGO_OFFSET, &NINTENDO_LOGO, NINTENDO_LOGO.len()),
        FixAction::Trash => {
            for (dst, src) in rom0[LOGO_OFFSET..].iter_mut().zip(NINTENDO_LOGO) {
                *dst = !src;
            }
        }
    }

    if let Some(title) = &config.title {
        write_run(rom0, TITLE_OFFSET, title, 16);
    }

    if let Some(game_id) = &config.game_id {
        write_run(rom0, GAME_ID_OFFSET, game_id, 4);
    }

    if let Some(flag) = config.color.byte() {
        rom0[CGB_FLAG_OFFSET] = flag;
    }

    if let Some(licensee) = &config.new_licensee {
        write_run(rom0, NEW_LICENSEE_OFFSET, licensee, 2);
    }

    if config.sgb {
        rom0[SGB_FLAG_OFFSET] = SGB_ENABLED;
    }

    if let Some(ty) = config.cartridge_type {
        rom0[CARTRIDGE_TYPE_OFFSET] = ty.byte();
    }

    if let Some(ram_size) = config.ram_size {
        rom0[RAM_SIZE_OFFSET] = ram_size;
    }

    if config.non_japanese {
        rom0[DESTINATION_OFFSET] = NON_JAPANESE;
    }

    if let Some(licensee) = config.old_licensee {
        rom0[OLD_LICENSEE_OFFSET] = licensee;
    }

    if let Some(version) = config.rom_version {
        rom0[ROM_VERSION_OFFSET] = version;
    }
}

/// Copy at most `max_len` bytes of `data` to `offset`; bytes past the end of
/// `data` keep their current content
fn write_run(rom0: &mut [u8], offset: usize, data: &[u8], max_len: usize) {
    let len = data.len().min(max_len);
    rom0[offset..offset + len].copy_from_slice(&data[..len]);
}
