//! `--mbc-type` parser
//!
//! An MBC spec is either a number (`0x1B`, `27`) written to the header as-is,
//! or a controller name followed by `+`-separated features (`MBC5+RAM+BATTERY`).
//! Symbolic specs are checked against [`GRAMMAR`], which lists every feature
//! combination each controller accepts and the byte it encodes to.

use crate::common::{MbcError, Span, parse_unsigned};
use super::token::{MbcToken, tokenize};
use super::{CartridgeType, Feature, FeatureSet, MbcType};

/// Controller family named at the start of a symbolic spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Rom,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
    Mbc6,
    Mbc7,
    Mmm01,
    PocketCamera,
    BandaiTama5,
    HuC1,
    HuC3,
}

impl BaseType {
    fn from_token(token: MbcToken) -> Option<Self> {
        Some(match token {
            MbcToken::Rom => BaseType::Rom,
            MbcToken::Mbc1 => BaseType::Mbc1,
            MbcToken::Mbc2 => BaseType::Mbc2,
            MbcToken::Mbc3 => BaseType::Mbc3,
            MbcToken::Mbc5 => BaseType::Mbc5,
            MbcToken::Mbc6 => BaseType::Mbc6,
            MbcToken::Mbc7 => BaseType::Mbc7,
            MbcToken::Mmm01 => BaseType::Mmm01,
            MbcToken::PocketCamera => BaseType::PocketCamera,
            MbcToken::BandaiTama5 | MbcToken::Tama5 => BaseType::BandaiTama5,
            MbcToken::HuC1 => BaseType::HuC1,
            MbcToken::HuC3 => BaseType::HuC3,
            _ => return None,
        })
    }

    /// Display names of every type this controller can encode to
    pub fn accepted(self) -> Vec<&'static str> {
        GRAMMAR
            .iter()
            .filter(|(base, _, _)| *base == self)
            .map(|(_, _, ty)| ty.name())
            .collect()
    }
}

const NONE: FeatureSet = FeatureSet::EMPTY;
const RAM: FeatureSet = FeatureSet::of(&[Feature::Ram]);
const RAM_BATTERY: FeatureSet = FeatureSet::of(&[Feature::Ram, Feature::Battery]);
const BATTERY: FeatureSet = FeatureSet::of(&[Feature::Battery]);
const TIMER_BATTERY: FeatureSet = FeatureSet::of(&[Feature::Timer, Feature::Battery]);
const TIMER_RAM_BATTERY: FeatureSet =
    FeatureSet::of(&[Feature::Timer, Feature::Ram, Feature::Battery]);
const RUMBLE: FeatureSet = FeatureSet::of(&[Feature::Rumble]);
const RUMBLE_RAM: FeatureSet = FeatureSet::of(&[Feature::Rumble, Feature::Ram]);
const RUMBLE_RAM_BATTERY: FeatureSet =
    FeatureSet::of(&[Feature::Rumble, Feature::Ram, Feature::Battery]);
const SENSOR_RUMBLE_RAM_BATTERY: FeatureSet = FeatureSet::of(&[
    Feature::Sensor,
    Feature::Rumble,
    Feature::Ram,
    Feature::Battery,
]);

/// Accepted `(controller, features)` combinations and their cartridge type
pub const GRAMMAR: &[(BaseType, FeatureSet, MbcType)] = &[
    (BaseType::Rom, NONE, MbcType::Rom),
    (BaseType::Rom, RAM, MbcType::RomRam),
    (BaseType::Rom, RAM_BATTERY, MbcType::RomRamBattery),
    (BaseType::Mbc1, NONE, MbcType::Mbc1),
    (BaseType::Mbc1, RAM, MbcType::Mbc1Ram),
    (BaseType::Mbc1, RAM_BATTERY, MbcType::Mbc1RamBattery),
    (BaseType::Mbc2, NONE, MbcType::Mbc2),
    (BaseType::Mbc2, BATTERY, MbcType::Mbc2Battery),
    (BaseType::Mmm01, NONE, MbcType::Mmm01),
    (BaseType::Mmm01, RAM, MbcType::Mmm01Ram),
    (BaseType::Mmm01, RAM_BATTERY, MbcType::Mmm01RamBattery),
    (BaseType::Mbc3, NONE, MbcType::Mbc3),
    (BaseType::Mbc3, RAM, MbcType::Mbc3Ram),
    (BaseType::Mbc3, RAM_BATTERY, MbcType::Mbc3RamBattery),
    (BaseType::Mbc3, TIMER_BATTERY, MbcType::Mbc3TimerBattery),
    (BaseType::Mbc3, TIMER_RAM_BATTERY, MbcType::Mbc3TimerRamBattery),
    (BaseType::Mbc5, NONE, MbcType::Mbc5),
    (BaseType::Mbc5, RAM, MbcType::Mbc5Ram),
    (BaseType::Mbc5, RAM_BATTERY, MbcType::Mbc5RamBattery),
    (BaseType::Mbc5, RUMBLE, MbcType::Mbc5Rumble),
    (BaseType::Mbc5, RUMBLE_RAM, MbcType::Mbc5RumbleRam),
    (BaseType::Mbc5, RUMBLE_RAM_BATTERY, MbcType::Mbc5RumbleRamBattery),
    (BaseType::Mbc6, NONE, MbcType::Mbc6),
    (BaseType::Mbc7, SENSOR_RUMBLE_RAM_BATTERY, MbcType::Mbc7SensorRumbleRamBattery),
    (BaseType::PocketCamera, NONE, MbcType::PocketCamera),
    (BaseType::BandaiTama5, NONE, MbcType::BandaiTama5),
    (BaseType::HuC3, NONE, MbcType::HuC3),
    (BaseType::HuC1, RAM_BATTERY, MbcType::HuC1RamBattery),
];

fn lookup(base: BaseType, features: FeatureSet) -> Option<MbcType> {
    GRAMMAR
        .iter()
        .find(|(b, f, _)| *b == base && *f == features)
        .map(|(_, _, ty)| *ty)
}

/// Resolve an `--mbc-type` argument into the cartridge type byte
pub fn parse_mbc(text: &str) -> Result<CartridgeType, MbcError> {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return parse_numeric(text);
    }

    let tokens = tokenize(text).map_err(|span| MbcError::bad_syntax(text, span))?;
    Parser::new(text, &tokens).parse()
}

fn parse_numeric(text: &str) -> Result<CartridgeType, MbcError> {
    let value = parse_unsigned(text)
        .ok_or_else(|| MbcError::bad_syntax(text, Span::new(0, text.len())))?;
    u8::try_from(value)
        .map(CartridgeType)
        .map_err(|_| MbcError::bad_range(text))
}

/// Cursor over the tokens of one symbolic spec
struct Parser<'a> {
    text: &'a str,
    tokens: &'a [(MbcToken, Span)],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, tokens: &'a [(MbcToken, Span)]) -> Self {
        Self { text, tokens, pos: 0 }
    }

    fn advance(&mut self) -> Option<(MbcToken, Span)> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<MbcToken> {
        self.tokens.get(self.pos).map(|(token, _)| *token)
    }

    fn end_span(&self) -> Span {
        Span::new(self.text.len(), self.text.len())
    }

    fn bad_syntax(&self, span: Span) -> MbcError {
        MbcError::bad_syntax(self.text, span)
    }

    fn parse(mut self) -> Result<CartridgeType, MbcError> {
        let (base, base_span) = self.base_type()?;
        let (features, features_span) = self.features()?;

        lookup(base, features).map(CartridgeType::from).ok_or_else(|| {
            MbcError::wrong_features(
                self.text,
                features_span.unwrap_or(base_span),
                base.accepted(),
            )
        })
    }

    /// Controller name, with the optional `ONLY` after `ROM`
    fn base_type(&mut self) -> Result<(BaseType, Span), MbcError> {
        let (token, mut span) = self.advance().ok_or_else(|| self.bad_syntax(self.end_span()))?;
        let base = BaseType::from_token(token).ok_or_else(|| self.bad_syntax(span))?;

        if base == BaseType::Rom && self.peek() == Some(MbcToken::Only) {
            if let Some((_, only)) = self.advance() {
                span = span.merge(only);
            }
        }
        Ok((base, span))
    }

    /// Zero or more `+ FEATURE` groups, up to the end of input
    fn features(&mut self) -> Result<(FeatureSet, Option<Span>), MbcError> {
        let mut features = FeatureSet::EMPTY;
        let mut covered: Option<Span> = None;

        while let Some((token, plus)) = self.advance() {
            if token != MbcToken::Plus {
                return Err(self.bad_syntax(plus));
            }
            let (token, span) = self.advance().ok_or_else(|| self.bad_syntax(self.end_span()))?;
            let feature = token.feature().ok_or_else(|| self.bad_syntax(span))?;

            features.insert(feature);
            covered = Some(covered.map_or(plus.merge(span), |c| c.merge(span)));
        }
        Ok((features, covered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn code(text: &str) -> u8 {
        parse_mbc(text).unwrap().byte()
    }

    #[test]
    fn test_numeric() {
        assert_eq!(code("0"), 0x00);
        assert_eq!(code("27"), 0x1B);
        assert_eq!(code("0x1b"), 0x1B);
        assert_eq!(code("0XFF"), 0xFF);
        assert_eq!(code("017"), 0x0F);
        assert_eq!(code("4"), 0x04);
    }

    #[test]
    fn test_numeric_errors() {
        assert!(matches!(parse_mbc("256"), Err(MbcError::BadRange { .. })));
        assert!(matches!(parse_mbc("0x100"), Err(MbcError::BadRange { .. })));
        assert!(matches!(
            parse_mbc("99999999999999999999999"),
            Err(MbcError::BadRange { .. })
        ));
        assert!(matches!(parse_mbc("12a"), Err(MbcError::BadSyntax { .. })));
        assert!(matches!(parse_mbc("0x"), Err(MbcError::BadSyntax { .. })));
        assert!(matches!(parse_mbc("08"), Err(MbcError::BadSyntax { .. })));
        assert!(matches!(parse_mbc("1 "), Err(MbcError::BadSyntax { .. })));
    }

    #[test]
    fn test_rom() {
        assert_eq!(code("ROM"), 0x00);
        assert_eq!(code("rom only"), 0x00);
        assert_eq!(code("ROM_ONLY"), 0x00);
        assert_eq!(code("ROM+RAM"), 0x08);
        assert_eq!(code("rom_only+ram+battery"), 0x09);
        assert!(matches!(parse_mbc("ROM+BATTERY"), Err(MbcError::WrongFeatures { .. })));
    }

    #[test]
    fn test_mbc3() {
        assert_eq!(code("mbc3+ram+battery"), MbcType::Mbc3RamBattery.code());
        assert_eq!(code("mbc3+timer+ram+battery"), MbcType::Mbc3TimerRamBattery.code());
        assert_eq!(code("MBC3+TIMER+BATTERY"), MbcType::Mbc3TimerBattery.code());
        assert_eq!(code("MBC3 + BATTERY + TIMER"), MbcType::Mbc3TimerBattery.code());
        assert!(matches!(parse_mbc("MBC3+TIMER"), Err(MbcError::WrongFeatures { .. })));
        assert!(matches!(parse_mbc("MBC3+TIMER+RAM"), Err(MbcError::WrongFeatures { .. })));
    }

    #[test]
    fn test_mbc5() {
        assert_eq!(code("MBC5+RUMBLE"), 0x1C);
        assert_eq!(code("MBC5+RAM+RUMBLE"), 0x1D);
        assert_eq!(code("mbc5 + rumble + ram + battery"), 0x1E);
        assert!(matches!(parse_mbc("MBC5+RUMBLE+BATTERY"), Err(MbcError::WrongFeatures { .. })));
    }

    #[test]
    fn test_fixed_types() {
        assert_eq!(code("POCKET CAMERA"), 0xFC);
        assert_eq!(code("tama5"), 0xFD);
        assert_eq!(code("bandai_tama5"), 0xFD);
        assert_eq!(code("HuC3"), 0xFE);
        assert_eq!(code("MBC6"), 0x20);
        assert!(matches!(parse_mbc("HUC3+RAM"), Err(MbcError::WrongFeatures { .. })));
        assert!(matches!(parse_mbc("MBC6+BATTERY"), Err(MbcError::WrongFeatures { .. })));
    }

    #[test]
    fn test_mandatory_features() {
        assert_eq!(code("HUC1+RAM+BATTERY"), 0xFF);
        assert_eq!(code("MBC7+SENSOR+RUMBLE+RAM+BATTERY"), 0x22);
        assert!(matches!(parse_mbc("HUC1"), Err(MbcError::WrongFeatures { .. })));
        assert!(matches!(parse_mbc("MBC7+RAM+BATTERY"), Err(MbcError::WrongFeatures { .. })));
    }

    #[test]
    fn test_wrong_features_span_and_notes() {
        let err = parse_mbc("mbc2+ram").unwrap_err();
        match err {
            MbcError::WrongFeatures { span, accepted, .. } => {
                assert_eq!(span, Span::new(4, 8));
                assert_eq!(accepted, vec!["MBC2", "MBC2+BATTERY"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_syntax_errors() {
        for text in ["", "   ", "MBC4", "MBC", "RAM", "ROM+", "ROM RAM", "MBC1+RAM junk", "HUC2", "+RAM"] {
            assert!(
                matches!(parse_mbc(text), Err(MbcError::BadSyntax { .. })),
                "{text:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn test_syntax_error_span() {
        let err = parse_mbc("MBC1+RAM+FLASH").unwrap_err();
        assert_eq!(err.span().start, 9);

        let err = parse_mbc("MBC1+").unwrap_err();
        assert_eq!(err.span(), Span::new(5, 5));
    }

    #[test]
    fn test_catalog_names_round_trip() {
        for ty in MbcType::ALL {
            assert_eq!(code(ty.name()), ty.code(), "{} did not round-trip", ty.name());
        }
    }

    #[test]
    fn test_every_grammar_entry_is_distinct() {
        for (i, (_, _, a)) in GRAMMAR.iter().enumerate() {
            for (_, _, b) in &GRAMMAR[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(GRAMMAR.len(), MbcType::ALL.len());
    }

    fn respell(name: &str, mask: &[bool]) -> String {
        name.chars()
            .zip(mask.iter().cycle())
            .map(|(c, &flip)| match c {
                ' ' if flip => '_',
                c if flip => c.to_ascii_lowercase(),
                c => c,
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_case_and_underscores_do_not_matter(
            index in 0..MbcType::ALL.len(),
            mask in proptest::collection::vec(any::<bool>(), 1..16),
        ) {
            let ty = MbcType::ALL[index];
            let spelled = respell(ty.name(), &mask);
            prop_assert_eq!(parse_mbc(&spelled).map(CartridgeType::byte), Ok(ty.code()));
        }

        #[test]
        fn prop_numbers_in_range_are_written_as_is(value in 0u8..=255) {
            prop_assert_eq!(parse_mbc(&value.to_string()), Ok(CartridgeType(value)));
            prop_assert_eq!(parse_mbc(&format!("0x{value:x}")), Ok(CartridgeType(value)));
        }
    }
}
