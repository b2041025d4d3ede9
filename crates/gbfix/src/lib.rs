//! GBFix - Game Boy ROM header fixer
//!
//! This library patches the fixed-layout header found in bank 0 of a Game Boy
//! cartridge image: boot logo, title, licensee codes, cartridge type, ROM/RAM
//! size, region, and the header and global checksums. It can also pad an image
//! to the next power-of-two bank count.
//!
//! ## Architecture
//!
//! The library is organized into:
//! - **MBC** (`mbc/`): Cartridge type catalog and the `--mbc-type` spec parser
//! - **Config** (`config/`): The resolved, immutable set of header edits
//! - **ROM** (`rom/`): Header writes, checksums, padding, and the streaming fixer
//! - **Driver** (`driver/`): Per-file processing (in-place files or stdin/stdout)
//! - **Common** (`common/`): Shared infrastructure (errors, spans, diagnostics)

pub mod common;
pub mod config;
pub mod driver;
pub mod mbc;
pub mod rom;

// Re-exports for convenience
pub use common::{DiagnosticReporter, FixError, FixResult, MbcError, OptionError, Span};
pub use config::{ColorMode, FixAction, FixConfig, FixConfigBuilder, FixSpec};
pub use driver::{RunSummary, process_path, run};
pub use mbc::{CartridgeType, MbcType, parse_mbc};
pub use rom::{FixReport, InPlace, PadPlan, Piped, RomStream, fix_rom};
