//! Resolved header edits
//!
//! The command line is turned into a single [`FixConfig`] before any file is
//! touched. The fixer only ever reads it.

use crate::common::{OptionError, parse_unsigned};
use crate::mbc::{CartridgeType, MbcType};
use std::ops::Not;

/// What to do with one self-checking header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixAction {
    /// Leave the stored bytes alone
    #[default]
    Keep,
    /// Store the correct value
    Fix,
    /// Store the complement of the correct value
    Trash,
}

impl FixAction {
    /// The value to store given the correct one, or `None` to leave it alone
    pub fn resolve<T: Not<Output = T>>(self, correct: T) -> Option<T> {
        match self {
            FixAction::Keep => None,
            FixAction::Fix => Some(correct),
            FixAction::Trash => Some(!correct),
        }
    }

    pub fn is_keep(self) -> bool {
        self == FixAction::Keep
    }
}

/// Per-field fix/trash choice for the logo and both checksums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixSpec {
    pub logo: FixAction,
    pub header_checksum: FixAction,
    pub global_checksum: FixAction,
}

impl FixSpec {
    /// Fix the logo and both checksums (`-v`)
    pub const VALIDATE: FixSpec = FixSpec {
        logo: FixAction::Fix,
        header_checksum: FixAction::Fix,
        global_checksum: FixAction::Fix,
    };

    /// Parse a fix spec such as `lhg` or `LHG`
    ///
    /// Lowercase letters fix a field, uppercase letters trash it: `l`/`L` for
    /// the logo, `h`/`H` for the header checksum, `g`/`G` for the global
    /// checksum. A later letter for the same field overrides an earlier one.
    pub fn parse(spec: &str) -> Self {
        let mut fix = FixSpec::default();

        for c in spec.chars() {
            let (field, action) = match c {
                'l' => (&mut fix.logo, FixAction::Fix),
                'L' => (&mut fix.logo, FixAction::Trash),
                'h' => (&mut fix.header_checksum, FixAction::Fix),
                'H' => (&mut fix.header_checksum, FixAction::Trash),
                'g' => (&mut fix.global_checksum, FixAction::Fix),
                'G' => (&mut fix.global_checksum, FixAction::Trash),
                other => {
                    log::warn!("Ignoring '{other}' in fix spec");
                    continue;
                }
            };

            if !field.is_keep() && *field != action {
                let previous = if c.is_ascii_lowercase() {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                };
                log::warn!("'{c}' overriding '{previous}' in fix spec");
            }
            *field = action;
        }
        fix
    }

    pub fn is_empty(&self) -> bool {
        self.logo.is_keep() && self.header_checksum.is_keep() && self.global_checksum.is_keep()
    }
}

/// Game Boy Color compatibility flag at 0x143
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Leave the flag alone
    #[default]
    Dmg,
    /// Runs on both DMG and CGB (0x80)
    Both,
    /// CGB only (0xC0)
    CgbOnly,
}

impl ColorMode {
    pub fn byte(self) -> Option<u8> {
        match self {
            ColorMode::Dmg => None,
            ColorMode::Both => Some(0x80),
            ColorMode::CgbOnly => Some(0xC0),
        }
    }
}

pub const MAX_TITLE_LEN: usize = 16;
pub const MAX_GAME_ID_LEN: usize = 4;
pub const MAX_NEW_LICENSEE_LEN: usize = 2;

/// Every header edit to perform on each image
///
/// Absent fields leave the corresponding header bytes untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixConfig {
    pub fix: FixSpec,
    pub title: Option<Vec<u8>>,
    pub game_id: Option<Vec<u8>>,
    pub new_licensee: Option<Vec<u8>>,
    pub old_licensee: Option<u8>,
    pub color: ColorMode,
    pub sgb: bool,
    pub non_japanese: bool,
    pub cartridge_type: Option<CartridgeType>,
    pub rom_version: Option<u8>,
    pub ram_size: Option<u8>,
    pub pad_value: Option<u8>,
}

impl FixConfig {
    pub fn builder() -> FixConfigBuilder {
        FixConfigBuilder::default()
    }

    /// Longest title that fits next to the game ID and color flag
    pub fn max_title_len(&self) -> usize {
        if self.game_id.is_some() {
            11
        } else if self.color != ColorMode::Dmg {
            15
        } else {
            MAX_TITLE_LEN
        }
    }

    /// Warnings about edits that are legal but probably unintended
    pub fn advisories(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ty) = self.cartridge_type {
            if matches!(ty.known(), Some(MbcType::RomRam | MbcType::RomRamBattery)) {
                warnings.push(
                    "ROM+RAM / ROM+RAM+BATTERY are under-specified and poorly supported"
                        .to_string(),
                );
            }
        }

        if let (Some(ram_size), Some(ty)) = (self.ram_size, self.cartridge_type) {
            match ty.known() {
                Some(MbcType::RomRam | MbcType::RomRamBattery) => {
                    if ram_size != 1 {
                        warnings.push(format!("MBC \"{ty}\" should have 2kiB of RAM (-r 1)"));
                    }
                }
                _ if ty.has_ram() => {
                    if ram_size == 0 {
                        warnings.push(format!("MBC \"{ty}\" has RAM, but RAM size was set to 0"));
                    } else if ram_size == 1 {
                        warnings.push(format!(
                            "RAM size 1 (2 kiB) was specified for MBC \"{ty}\""
                        ));
                    }
                }
                _ => {
                    if ram_size != 0 {
                        warnings.push(format!(
                            "MBC \"{ty}\" has no RAM, but RAM size was set to {ram_size}"
                        ));
                    }
                }
            }
        }

        if let Some(licensee) = self.old_licensee {
            if self.sgb && licensee != 0x33 {
                warnings.push(format!(
                    "SGB compatibility enabled, but old licensee is {licensee:#x}, not 0x33"
                ));
            }
        }

        warnings
    }
}

/// Collects header edits, then truncates text fields to what the header can hold
#[derive(Debug, Clone, Default)]
pub struct FixConfigBuilder {
    config: FixConfig,
}

impl FixConfigBuilder {
    pub fn fix(mut self, fix: FixSpec) -> Self {
        self.config.fix = fix;
        self
    }

    pub fn title(mut self, title: impl AsRef<[u8]>) -> Self {
        self.config.title = Some(title.as_ref().to_vec());
        self
    }

    pub fn game_id(mut self, game_id: impl AsRef<[u8]>) -> Self {
        self.config.game_id = Some(game_id.as_ref().to_vec());
        self
    }

    pub fn new_licensee(mut self, licensee: impl AsRef<[u8]>) -> Self {
        self.config.new_licensee = Some(licensee.as_ref().to_vec());
        self
    }

    pub fn old_licensee(mut self, licensee: u8) -> Self {
        self.config.old_licensee = Some(licensee);
        self
    }

    pub fn color(mut self, color: ColorMode) -> Self {
        self.config.color = color;
        self
    }

    pub fn sgb(mut self, sgb: bool) -> Self {
        self.config.sgb = sgb;
        self
    }

    pub fn non_japanese(mut self, non_japanese: bool) -> Self {
        self.config.non_japanese = non_japanese;
        self
    }

    pub fn cartridge_type(mut self, ty: impl Into<CartridgeType>) -> Self {
        self.config.cartridge_type = Some(ty.into());
        self
    }

    pub fn rom_version(mut self, version: u8) -> Self {
        self.config.rom_version = Some(version);
        self
    }

    pub fn ram_size(mut self, size: u8) -> Self {
        self.config.ram_size = Some(size);
        self
    }

    pub fn pad_value(mut self, value: u8) -> Self {
        self.config.pad_value = Some(value);
        self
    }

    pub fn build(mut self) -> FixConfig {
        let max_title_len = self.config.max_title_len();
        truncate("title", &mut self.config.title, max_title_len);
        truncate("game ID", &mut self.config.game_id, MAX_GAME_ID_LEN);
        truncate("new licensee", &mut self.config.new_licensee, MAX_NEW_LICENSEE_LEN);
        self.config
    }
}

fn truncate(what: &str, field: &mut Option<Vec<u8>>, max_len: usize) {
    if let Some(bytes) = field {
        if bytes.len() > max_len {
            log::warn!(
                "Truncating {what} \"{}\" to {max_len} chars",
                String::from_utf8_lossy(bytes)
            );
            bytes.truncate(max_len);
        }
    }
}

/// Parse a one-byte option argument: `$`-prefixed hex, `0x` hex, `0` octal, or decimal
pub fn parse_byte(option: char, text: &str) -> Result<u8, OptionError> {
    if text.is_empty() {
        return Err(OptionError::Empty { option });
    }

    let value = match text.strip_prefix('$') {
        Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            parse_unsigned(&format!("0x{hex}"))
        }
        Some(_) => None,
        None => parse_unsigned(text),
    };

    let value = value.ok_or_else(|| OptionError::NotANumber {
        option,
        text: text.to_string(),
    })?;
    u8::try_from(value).map_err(|_| OptionError::TooLarge { option, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_fix_spec_parse() {
        assert_eq!(FixSpec::parse("lhg"), FixSpec::VALIDATE);
        assert_eq!(
            FixSpec::parse("LhG"),
            FixSpec {
                logo: FixAction::Trash,
                header_checksum: FixAction::Fix,
                global_checksum: FixAction::Trash,
            }
        );
        assert!(FixSpec::parse("").is_empty());
    }

    #[test]
    fn test_fix_spec_last_letter_wins() {
        let spec = FixSpec::parse("lLhHgGg");
        assert_eq!(spec.logo, FixAction::Trash);
        assert_eq!(spec.header_checksum, FixAction::Trash);
        assert_eq!(spec.global_checksum, FixAction::Fix);
    }

    #[test]
    fn test_fix_spec_ignores_unknown_letters() {
        let spec = FixSpec::parse("xlz");
        assert_eq!(spec.logo, FixAction::Fix);
        assert!(spec.header_checksum.is_keep());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(FixAction::Keep.resolve(0x12u8), None);
        assert_eq!(FixAction::Fix.resolve(0x12u8), Some(0x12));
        assert_eq!(FixAction::Trash.resolve(0x12u8), Some(0xED));
        assert_eq!(FixAction::Trash.resolve(0x1234u16), Some(0xEDCB));
    }

    #[test]
    fn test_title_truncation() {
        let config = FixConfig::builder().title("ABCDEFGHIJKLMNOPQRS").build();
        assert_eq!(config.title.as_deref(), Some(&b"ABCDEFGHIJKLMNOP"[..]));

        let config = FixConfig::builder()
            .title("ABCDEFGHIJKLMNOPQRS")
            .color(ColorMode::Both)
            .build();
        assert_eq!(config.title.as_ref().map(Vec::len), Some(15));

        let config = FixConfig::builder()
            .color(ColorMode::CgbOnly)
            .title("ABCDEFGHIJKLMNOPQRS")
            .game_id("ABCDE")
            .new_licensee("XYZ")
            .build();
        assert_eq!(config.title.as_ref().map(Vec::len), Some(11));
        assert_eq!(config.game_id.as_deref(), Some(&b"ABCD"[..]));
        assert_eq!(config.new_licensee.as_deref(), Some(&b"XY"[..]));
    }

    #[test]
    fn test_short_fields_untouched() {
        let config = FixConfig::builder().title("TETRIS").game_id("AB").build();
        assert_eq!(config.title.as_deref(), Some(&b"TETRIS"[..]));
        assert_eq!(config.game_id.as_deref(), Some(&b"AB"[..]));
    }

    #[test]
    fn test_parse_byte() {
        assert_eq!(parse_byte('p', "255"), Ok(255));
        assert_eq!(parse_byte('p', "$ff"), Ok(255));
        assert_eq!(parse_byte('p', "0xFF"), Ok(255));
        assert_eq!(parse_byte('p', "010"), Ok(8));
        assert_eq!(parse_byte('l', ""), Err(OptionError::Empty { option: 'l' }));
        assert_eq!(
            parse_byte('n', "$"),
            Err(OptionError::NotANumber { option: 'n', text: "$".to_string() })
        );
        assert_eq!(
            parse_byte('r', "abc"),
            Err(OptionError::NotANumber { option: 'r', text: "abc".to_string() })
        );
        assert_eq!(parse_byte('r', "$100"), Err(OptionError::TooLarge { option: 'r', value: 256 }));
    }

    #[test]
    fn test_advisories_ram_size() {
        let config = FixConfig::builder()
            .cartridge_type(MbcType::Mbc5RamBattery)
            .ram_size(0)
            .build();
        assert_eq!(
            config.advisories(),
            vec!["MBC \"MBC5+RAM+BATTERY\" has RAM, but RAM size was set to 0".to_string()]
        );

        let config = FixConfig::builder().cartridge_type(MbcType::Mbc1).ram_size(3).build();
        assert_eq!(
            config.advisories(),
            vec!["MBC \"MBC1\" has no RAM, but RAM size was set to 3".to_string()]
        );

        let config = FixConfig::builder().cartridge_type(MbcType::Mbc3Ram).ram_size(3).build();
        assert!(config.advisories().is_empty());
    }

    #[test]
    fn test_advisories_rom_ram() {
        let config = FixConfig::builder().cartridge_type(MbcType::RomRam).ram_size(2).build();
        let warnings = config.advisories();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[1].contains("should have 2kiB of RAM"));
    }

    #[test]
    fn test_advisories_sgb() {
        let config = FixConfig::builder().sgb(true).old_licensee(0x01).build();
        assert_eq!(
            config.advisories(),
            vec!["SGB compatibility enabled, but old licensee is 0x1, not 0x33".to_string()]
        );
        let config = FixConfig::builder().sgb(true).old_licensee(0x33).build();
        assert!(config.advisories().is_empty());
    }

    proptest! {
        #[test]
        fn prop_trash_is_complement_of_fix(value in any::<u16>()) {
            let fixed = FixAction::Fix.resolve(value).unwrap();
            let trashed = FixAction::Trash.resolve(value).unwrap();
            prop_assert_eq!(fixed ^ trashed, 0xFFFF);
        }
    }
}
