//! One fix-up pass over one image
//!
//! Bank 0 is always held in memory in full. The remaining banks ("ROMX") are
//! only buffered when the input cannot be re-read; for in-place files they are
//! read a second time, and only if the global checksum needs them.

use crate::common::{FixError, FixResult, IoStep};
use crate::config::FixConfig;
use super::checksum::{GlobalChecksum, header_checksum};
use super::header::{
    self, GLOBAL_CHECKSUM_OFFSET, HEADER_CHECKSUM_OFFSET, HEADER_END, ROM_SIZE_OFFSET,
};
use super::padding::PadPlan;
use super::stream::RomStream;
use super::{BANK_SIZE, MAX_BANKS};

/// What a fix-up pass did to an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixReport {
    /// Banks in the image as found, counting a partial last bank
    pub bank_count: u32,
    /// Banks after padding, if padding was requested
    pub padded_to: Option<u32>,
    /// Header checksum stored, if it was fixed or trashed
    pub header_checksum: Option<u8>,
    /// Global checksum stored, if it was fixed or trashed
    pub global_checksum: Option<u16>,
    /// Bytes written to the output, padding included
    pub bytes_written: u64,
}

/// Apply `config` to the image behind `stream`
///
/// In-place images get their header rewritten and any padding appended; piped
/// images are written out in full. A failure leaves in-place images as they
/// were up to the failing write: there is no rollback.
pub fn fix_rom<S: RomStream + ?Sized>(
    stream: &mut S,
    config: &FixConfig,
    name: &str,
) -> FixResult<FixReport> {
    let mut report = FixReport::default();

    let mut rom0 = vec![0u8; BANK_SIZE];
    let mut rom0_len = stream
        .read_bank(&mut rom0)
        .map_err(|e| FixError::io(name, IoStep::ReadHeader, e))?;
    if rom0_len < HEADER_END {
        return Err(FixError::too_short(name, rom0_len as u64));
    }
    // Partial reads are fine as long as the whole header is there

    header::apply_edits(&mut rom0, config);

    // Sum of every byte outside of bank 0, as far as it is known so far
    let mut global = GlobalChecksum::new();
    let mut romx = Vec::new();
    let romx_len: u64;

    match stream.known_len() {
        Some(len) => {
            if len > u64::from(MAX_BANKS) * BANK_SIZE as u64 {
                return Err(FixError::too_many_banks(name));
            }
            report.bank_count = len.div_ceil(BANK_SIZE as u64) as u32;
            romx_len = len.saturating_sub(BANK_SIZE as u64);
        }
        None => {
            report.bank_count = 1;
            // A short bank 0 means the input already ended
            if rom0_len == BANK_SIZE {
                report.bank_count = buffer_romx(stream, name, &mut romx, &mut global)?;
            }
            romx_len = romx.len() as u64;
        }
    }
    log::debug!(
        "{name}: {} bank(s), {rom0_len} byte(s) in ROM0, {romx_len} in ROMX",
        report.bank_count
    );

    // Padding changes the ROM size byte, which the header checksum covers
    let mut pad_tail = 0;
    if let Some(fill) = config.pad_value {
        let plan = PadPlan::new(report.bank_count, rom0_len as u64 + romx_len);
        let rom0_fill = BANK_SIZE - rom0_len;

        if rom0_fill > 0 {
            rom0[rom0_len..].fill(fill);
            rom0_len = BANK_SIZE;
        }
        rom0[ROM_SIZE_OFFSET] = plan.rom_size_code;

        pad_tail = plan.pad_bytes - rom0_fill as u64;
        global.add_fill(fill, pad_tail);
        report.padded_to = Some(plan.target_banks);
        log::debug!(
            "{name}: padding to {} banks with ${fill:02X} ({} byte(s))",
            plan.target_banks,
            plan.pad_bytes
        );
    }

    report.header_checksum = config.fix.header_checksum.resolve(header_checksum(&rom0));
    if let Some(sum) = report.header_checksum {
        rom0[HEADER_CHECKSUM_OFFSET] = sum;
    }

    if !config.fix.global_checksum.is_keep() {
        // The checksum bytes count as zero
        rom0[GLOBAL_CHECKSUM_OFFSET..GLOBAL_CHECKSUM_OFFSET + 2].fill(0);
        global.update(&rom0[..rom0_len]);

        // Buffered input was summed while reading; in-place ROMX is still on disk
        if stream.known_len().is_some() {
            sum_remaining(stream, name, &mut global)?;
        }

        report.global_checksum = config.fix.global_checksum.resolve(global.finish());
        if let Some(sum) = report.global_checksum {
            rom0[GLOBAL_CHECKSUM_OFFSET..GLOBAL_CHECKSUM_OFFSET + 2]
                .copy_from_slice(&sum.to_be_bytes());
        }
    }

    // In place, only the header needs rewriting, unless padding grew bank 0
    stream
        .rewind()
        .map_err(|e| FixError::io(name, IoStep::Rewind, e))?;
    let rom0_write_len = if stream.known_len().is_some() && config.pad_value.is_none() {
        HEADER_END
    } else {
        rom0_len
    };
    stream
        .write_all(&rom0[..rom0_write_len])
        .map_err(|e| FixError::io(name, IoStep::WriteRom0, e))?;
    report.bytes_written += rom0_write_len as u64;

    if !romx.is_empty() {
        stream
            .write_all(&romx)
            .map_err(|e| FixError::io(name, IoStep::WriteRomx, e))?;
        report.bytes_written += romx_len;
    }

    if let Some(fill) = config.pad_value {
        stream
            .seek_end()
            .map_err(|e| FixError::io(name, IoStep::SeekEnd, e))?;
        write_padding(stream, name, fill, pad_tail)?;
        report.bytes_written += pad_tail;
    }

    stream
        .flush()
        .map_err(|e| FixError::io(name, IoStep::Flush, e))?;

    Ok(report)
}

/// Read every bank after bank 0 into `romx`, summing them as they arrive
///
/// Returns the total bank count, bank 0 included.
fn buffer_romx<S: RomStream + ?Sized>(
    stream: &mut S,
    name: &str,
    romx: &mut Vec<u8>,
    global: &mut GlobalChecksum,
) -> FixResult<u32> {
    let mut bank_count = 1;

    loop {
        let start = romx.len();
        romx.resize(start + BANK_SIZE, 0);
        let bank_len = stream
            .read_bank(&mut romx[start..])
            .map_err(|e| FixError::io(name, IoStep::ReadRomx, e))?;
        romx.truncate(start + bank_len);

        if bank_len > 0 {
            if bank_count == MAX_BANKS {
                return Err(FixError::too_many_banks(name));
            }
            bank_count += 1;
            global.update(&romx[start..]);
        }
        // An incomplete bank is the end of the input
        if bank_len != BANK_SIZE {
            return Ok(bank_count);
        }
    }
}

/// Sum whatever the input still holds, one bank at a time
fn sum_remaining<S: RomStream + ?Sized>(
    stream: &mut S,
    name: &str,
    global: &mut GlobalChecksum,
) -> FixResult<()> {
    let mut bank = vec![0u8; BANK_SIZE];
    loop {
        let bank_len = stream
            .read_bank(&mut bank)
            .map_err(|e| FixError::io(name, IoStep::ReadRomx, e))?;
        global.update(&bank[..bank_len]);
        if bank_len != BANK_SIZE {
            return Ok(());
        }
    }
}

fn write_padding<S: RomStream + ?Sized>(
    stream: &mut S,
    name: &str,
    fill: u8,
    len: u64,
) -> FixResult<()> {
    let filler = vec![fill; BANK_SIZE];
    let mut remaining = len;

    while remaining > 0 {
        let chunk = remaining.min(BANK_SIZE as u64) as usize;
        stream
            .write_all(&filler[..chunk])
            .map_err(|e| FixError::io(name, IoStep::WritePadding, e))?;
        remaining -= chunk as u64;
    }
    Ok(())
}
