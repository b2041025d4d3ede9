//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use std::fmt;
use std::io;
use thiserror::Error;
use super::Span;

/// Failure to resolve a `--mbc-type` argument into a cartridge type byte
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MbcError {
    #[error("Unknown MBC \"{text}\"")]
    BadSyntax { text: String, span: Span },

    #[error("Features incompatible with MBC (\"{text}\")")]
    WrongFeatures {
        text: String,
        span: Span,
        /// Display names of the combinations the controller does accept
        accepted: Vec<&'static str>,
    },

    #[error("Specified MBC ID out of range 0-255: {text}")]
    BadRange { text: String, span: Span },
}

impl MbcError {
    pub fn bad_syntax(text: &str, span: Span) -> Self {
        Self::BadSyntax {
            text: text.to_string(),
            span,
        }
    }

    pub fn wrong_features(text: &str, span: Span, accepted: Vec<&'static str>) -> Self {
        Self::WrongFeatures {
            text: text.to_string(),
            span,
            accepted,
        }
    }

    pub fn bad_range(text: &str) -> Self {
        Self::BadRange {
            text: text.to_string(),
            span: Span::new(0, text.len()),
        }
    }

    /// The argument the error was raised for
    pub fn text(&self) -> &str {
        match self {
            Self::BadSyntax { text, .. }
            | Self::WrongFeatures { text, .. }
            | Self::BadRange { text, .. } => text,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::BadSyntax { span, .. }
            | Self::WrongFeatures { span, .. }
            | Self::BadRange { span, .. } => *span,
        }
    }
}

/// Malformed option argument
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("Argument to option '{option}' may not be empty")]
    Empty { option: char },

    #[error("Expected number as argument to option '{option}', got {text}")]
    NotANumber { option: char, text: String },

    #[error("Argument to option '{option}' is larger than 255: {value}")]
    TooLarge { option: char, value: u64 },

    #[error(transparent)]
    Mbc(#[from] MbcError),
}

/// The step of the fix-up pass an I/O failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStep {
    ReadHeader,
    ReadRomx,
    Rewind,
    WriteRom0,
    WriteRomx,
    SeekEnd,
    WritePadding,
    Flush,
}

impl fmt::Display for IoStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoStep::ReadHeader => "read the header of",
            IoStep::ReadRomx => "read the ROMX banks of",
            IoStep::Rewind => "rewind",
            IoStep::WriteRom0 => "write ROM0 of",
            IoStep::WriteRomx => "write ROMX of",
            IoStep::SeekEnd => "seek to the end of",
            IoStep::WritePadding => "write padding to",
            IoStep::Flush => "flush",
        })
    }
}

/// Fatal error while fixing one image
///
/// Each variant is fatal for the image it names only.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("Failed to open \"{name}\" for reading+writing: {source}")]
    Open { name: String, source: io::Error },

    #[error("Failed to stat \"{name}\": {source}")]
    Stat { name: String, source: io::Error },

    #[error("\"{name}\" is not a regular file, and thus cannot be modified in-place")]
    NotRegularFile { name: String },

    #[error("\"{name}\" too short, expected at least 336 ($150) bytes, got only {len}")]
    TooShort { name: String, len: u64 },

    #[error("\"{name}\" has more than 65536 banks")]
    TooManyBanks { name: String },

    #[error("Failed to {step} \"{name}\": {source}")]
    Io {
        name: String,
        step: IoStep,
        source: io::Error,
    },
}

impl FixError {
    pub fn io(name: &str, step: IoStep, source: io::Error) -> Self {
        Self::Io {
            name: name.to_string(),
            step,
            source,
        }
    }

    pub fn too_short(name: &str, len: u64) -> Self {
        Self::TooShort {
            name: name.to_string(),
            len,
        }
    }

    pub fn too_many_banks(name: &str) -> Self {
        Self::TooManyBanks {
            name: name.to_string(),
        }
    }

    /// Display name of the image that failed
    pub fn name(&self) -> &str {
        match self {
            Self::Open { name, .. }
            | Self::Stat { name, .. }
            | Self::NotRegularFile { name }
            | Self::TooShort { name, .. }
            | Self::TooManyBanks { name }
            | Self::Io { name, .. } => name,
        }
    }
}

pub type FixResult<T> = Result<T, FixError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(choice: ColorChoice) -> Self {
        Self {
            writer: StandardStream::stderr(choice),
            config: term::Config::default(),
        }
    }

    /// Build the diagnostic for a bad `--mbc-type` argument
    pub fn mbc_diagnostic(error: &MbcError) -> Diagnostic<()> {
        let (message, label) = match error {
            MbcError::BadSyntax { .. } => ("Unknown MBC", "not a known controller or feature"),
            MbcError::WrongFeatures { .. } => (
                "Features incompatible with MBC",
                "not accepted by this controller",
            ),
            MbcError::BadRange { .. } => ("Specified MBC ID out of range", "must be in 0-255"),
        };

        let diagnostic = Diagnostic::error()
            .with_message(message)
            .with_labels(vec![Label::primary((), error.span().range()).with_message(label)]);

        match error {
            MbcError::WrongFeatures { accepted, .. } if !accepted.is_empty() => {
                diagnostic.with_notes(vec![format!("accepted: {}", accepted.join(", "))])
            }
            _ => diagnostic,
        }
    }

    /// Render an `--mbc-type` error, pointing at the offending part of the argument
    pub fn emit_mbc_error<W: WriteColor>(
        &self,
        writer: &mut W,
        error: &MbcError,
    ) -> Result<(), codespan_reporting::files::Error> {
        let file = SimpleFile::new("--mbc-type", error.text());
        term::emit(writer, &self.config, &file, &Self::mbc_diagnostic(error))
    }

    pub fn report_mbc_error(&self, error: &MbcError) {
        let _ = self.emit_mbc_error(&mut self.writer.lock(), error);
    }

    pub fn report_option_error(&self, error: &OptionError) {
        match error {
            OptionError::Mbc(mbc) => self.report_mbc_error(mbc),
            other => self.report_plain(&other.to_string()),
        }
    }

    pub fn report_fix_error(&self, error: &FixError) {
        self.report_plain(&error.to_string());
    }

    fn report_plain(&self, message: &str) {
        let diagnostic: Diagnostic<()> = Diagnostic::error().with_message(message);
        let file = SimpleFile::new("", "");
        let _ = term::emit(&mut self.writer.lock(), &self.config, &file, &diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::term::termcolor::NoColor;

    #[test]
    fn test_mbc_error_accessors() {
        let err = MbcError::bad_syntax("MBC4", Span::new(0, 4));
        assert_eq!(err.text(), "MBC4");
        assert_eq!(err.span(), Span::new(0, 4));
        assert_eq!(err.to_string(), "Unknown MBC \"MBC4\"");

        let err = MbcError::bad_range("256");
        assert_eq!(err.span(), Span::new(0, 3));
    }

    #[test]
    fn test_fix_error_messages() {
        let err = FixError::too_short("game.gb", 335);
        assert_eq!(
            err.to_string(),
            "\"game.gb\" too short, expected at least 336 ($150) bytes, got only 335"
        );
        assert_eq!(err.name(), "game.gb");

        let err = FixError::io(
            "<stdin>",
            IoStep::WriteRom0,
            io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"),
        );
        assert_eq!(err.to_string(), "Failed to write ROM0 of \"<stdin>\": broken pipe");
    }

    #[test]
    fn test_emit_mbc_error_points_at_span() {
        let reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let err = MbcError::wrong_features("MBC2+RAM", Span::new(5, 8), vec!["MBC2", "MBC2+BATTERY"]);
        let mut out = NoColor::new(Vec::new());
        reporter.emit_mbc_error(&mut out, &err).unwrap();

        let rendered = String::from_utf8(out.into_inner()).unwrap();
        assert!(rendered.contains("Features incompatible with MBC"));
        assert!(rendered.contains("MBC2+RAM"));
        assert!(rendered.contains("accepted: MBC2, MBC2+BATTERY"));
    }
}
