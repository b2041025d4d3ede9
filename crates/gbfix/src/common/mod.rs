//! Common infrastructure shared across the parser, the fixer and the driver

mod error;
mod number;
mod span;

pub use error::{DiagnosticReporter, FixError, FixResult, IoStep, MbcError, OptionError};
pub use number::parse_unsigned;
pub use span::Span;
