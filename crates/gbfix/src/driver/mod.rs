//! Per-file processing
//!
//! Each named file is fixed in place; `-` (or no file at all) streams an image
//! from stdin to stdout. A failure only affects the file it happened on.

use crate::common::{DiagnosticReporter, FixError, FixResult};
use crate::config::FixConfig;
use crate::rom::{FixReport, HEADER_END, InPlace, Piped, fix_rom};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Path standing for stdin/stdout
pub const STDIO_PATH: &str = "-";
/// Display name used for stdin/stdout
pub const STDIO_NAME: &str = "<stdin>";

/// Fix one file in place, or stdin to stdout for `-`
pub fn process_path(path: &Path, config: &FixConfig) -> FixResult<FixReport> {
    if path == Path::new(STDIO_PATH) {
        let mut stream = Piped::new(io::stdin().lock(), io::stdout().lock());
        return fix_rom(&mut stream, config, STDIO_NAME);
    }

    let name = path.display().to_string();
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| FixError::Open {
            name: name.clone(),
            source,
        })?;

    let metadata = file.metadata().map_err(|source| FixError::Stat {
        name: name.clone(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(FixError::NotRegularFile { name });
    }
    // Also keeps a zero size from being mistaken for "unknown"
    if metadata.len() < HEADER_END as u64 {
        return Err(FixError::too_short(&name, metadata.len()));
    }

    let mut stream = InPlace::new(file, metadata.len());
    fix_rom(&mut stream, config, &name)
}

/// Outcome of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Fix every path in order; an empty list means stdin to stdout
pub fn run<P: AsRef<Path>>(
    paths: &[P],
    config: &FixConfig,
    reporter: &DiagnosticReporter,
) -> RunSummary {
    let mut summary = RunSummary::default();

    if paths.is_empty() {
        record(&mut summary, Path::new(STDIO_PATH), config, reporter);
    }
    for path in paths {
        record(&mut summary, path.as_ref(), config, reporter);
    }
    summary
}

fn record(summary: &mut RunSummary, path: &Path, config: &FixConfig, reporter: &DiagnosticReporter) {
    summary.processed += 1;

    // Errors are fatal for the file, so there is at most one per file
    let errors: u32 = match process_path(path, config) {
        Ok(report) => {
            log::info!(
                "Fixed \"{}\": {} bank(s), {} byte(s) written",
                path.display(),
                report.padded_to.unwrap_or(report.bank_count),
                report.bytes_written
            );
            0
        }
        Err(err) => {
            reporter.report_fix_error(&err);
            1
        }
    };

    if errors > 0 {
        summary.failed += 1;
        let name = if path == Path::new(STDIO_PATH) {
            STDIO_NAME.to_string()
        } else {
            path.display().to_string()
        };
        eprintln!(
            "Fixing \"{name}\" failed with {errors} error{}",
            if errors == 1 { "" } else { "s" }
        );
    }
}
