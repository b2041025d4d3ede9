//! Token definitions for symbolic MBC specs

use crate::common::Span;
use logos::Logos;
use super::Feature;

/// All token kinds in an MBC spec such as `MBC5 + RUMBLE + RAM`
///
/// Matching is case-insensitive. Spaces, tabs and underscores separate tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t_]+")]
pub enum MbcToken {
    // === Controllers ===
    #[token("ROM", ignore(ascii_case))]
    Rom,
    #[token("ONLY", ignore(ascii_case))]
    Only,
    #[token("MBC1", ignore(ascii_case))]
    Mbc1,
    #[token("MBC2", ignore(ascii_case))]
    Mbc2,
    #[token("MBC3", ignore(ascii_case))]
    Mbc3,
    #[token("MBC5", ignore(ascii_case))]
    Mbc5,
    #[token("MBC6", ignore(ascii_case))]
    Mbc6,
    #[token("MBC7", ignore(ascii_case))]
    Mbc7,
    #[token("MMM01", ignore(ascii_case))]
    Mmm01,
    #[regex("POCKET[ _]CAMERA", ignore(ascii_case))]
    PocketCamera,
    #[regex("BANDAI[ _]TAMA5", ignore(ascii_case))]
    BandaiTama5,
    #[token("TAMA5", ignore(ascii_case))]
    Tama5,
    #[token("HUC1", ignore(ascii_case))]
    HuC1,
    #[token("HUC3", ignore(ascii_case))]
    HuC3,

    // === Features ===
    #[token("RAM", ignore(ascii_case))]
    Ram,
    #[token("BATTERY", ignore(ascii_case))]
    Battery,
    #[token("TIMER", ignore(ascii_case))]
    Timer,
    #[token("RUMBLE", ignore(ascii_case))]
    Rumble,
    #[token("SENSOR", ignore(ascii_case))]
    Sensor,

    #[token("+")]
    Plus,
}

impl MbcToken {
    pub fn feature(self) -> Option<Feature> {
        match self {
            MbcToken::Ram => Some(Feature::Ram),
            MbcToken::Battery => Some(Feature::Battery),
            MbcToken::Timer => Some(Feature::Timer),
            MbcToken::Rumble => Some(Feature::Rumble),
            MbcToken::Sensor => Some(Feature::Sensor),
            _ => None,
        }
    }
}

/// Split an MBC spec into tokens
///
/// On failure, returns the span of the first unrecognized input.
pub fn tokenize(source: &str) -> Result<Vec<(MbcToken, Span)>, Span> {
    MbcToken::lexer(source)
        .spanned()
        .map(|(token, span)| match token {
            Ok(token) => Ok((token, Span::from(span))),
            Err(()) => Err(Span::from(span)),
        })
        .collect()
}
