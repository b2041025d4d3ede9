//! GBFix - Game Boy ROM header fixer
//!
//! Usage: gbfix [-jsVv] [-C | -c] [-f <fix_spec>] [-i <game_id>] [-k <licensee>]
//!              [-l <licensee_byte>] [-m <mbc_type>] [-n <rom_version>]
//!              [-p <pad_value>] [-r <ram_size>] [-t <title_str>] [<file> ...]

use clap::Parser as ClapParser;
use gbfix::common::{DiagnosticReporter, OptionError};
use gbfix::config::{ColorMode, FixConfig, FixSpec, parse_byte};
use gbfix::mbc::parse_mbc;
use gbfix::driver;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "gbfix")]
#[command(version)]
#[command(about = "Fix the header of Game Boy ROM images", long_about = None)]
#[command(after_help = "Without files, an image is read from stdin and written to stdout.")]
struct Args {
    /// Set the CGB flag to CGB-only
    #[arg(short = 'C', long, overrides_with = "color_compatible")]
    color_only: bool,

    /// Set the CGB flag to CGB-compatible
    #[arg(short = 'c', long, overrides_with = "color_only")]
    color_compatible: bool,

    /// Fix (lowercase) or trash (uppercase) the logo (l), header checksum (h), global checksum (g)
    #[arg(short = 'f', long, value_name = "FIX_SPEC")]
    fix_spec: Option<String>,

    /// Set the game ID (up to 4 characters)
    #[arg(short = 'i', long)]
    game_id: Option<String>,

    /// Set the destination code to non-Japanese
    #[arg(short = 'j', long)]
    non_japanese: bool,

    /// Set the new licensee code (up to 2 characters)
    #[arg(short = 'k', long, value_name = "LICENSEE")]
    new_licensee: Option<String>,

    /// Set the old licensee byte
    #[arg(short = 'l', long, value_name = "LICENSEE_BYTE")]
    old_licensee: Option<String>,

    /// Set the MBC type byte, by number or by name (e.g. MBC5+RAM+BATTERY)
    #[arg(short = 'm', long, value_name = "MBC_TYPE")]
    mbc_type: Option<String>,

    /// Set the ROM version byte
    #[arg(short = 'n', long)]
    rom_version: Option<String>,

    /// Pad to the next valid size using this value
    #[arg(short = 'p', long)]
    pad_value: Option<String>,

    /// Set the cart RAM size byte to this value
    #[arg(short = 'r', long)]
    ram_size: Option<String>,

    /// Set the SGB flag
    #[arg(short = 's', long)]
    sgb_compatible: bool,

    /// Set the title (up to 16 characters, fewer with -c/-C or -i)
    #[arg(short = 't', long, value_name = "TITLE_STR")]
    title: Option<String>,

    /// Fix the header logo and both checksums (-f lhg)
    #[arg(short = 'v', long)]
    validate: bool,

    /// ROM images to fix in place; `-` for stdin to stdout
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();
    let reporter = DiagnosticReporter::new();

    let (config, option_errors) = build_config(&args);
    for err in &option_errors {
        reporter.report_option_error(err);
    }
    for warning in config.advisories() {
        log::warn!("{warning}");
    }

    let summary = driver::run(&args.files, &config, &reporter);
    if !option_errors.is_empty() || !summary.success() {
        process::exit(1);
    }
}

/// Resolve the command line into one configuration
///
/// Malformed arguments are collected rather than fatal: the affected field is
/// left unset and the files are still processed.
fn build_config(args: &Args) -> (FixConfig, Vec<OptionError>) {
    let mut errors = Vec::new();
    let mut builder = FixConfig::builder();

    if args.validate {
        builder = builder.fix(FixSpec::VALIDATE);
    } else if let Some(spec) = &args.fix_spec {
        builder = builder.fix(FixSpec::parse(spec));
    }

    if args.color_only {
        builder = builder.color(ColorMode::CgbOnly);
    } else if args.color_compatible {
        builder = builder.color(ColorMode::Both);
    }

    if let Some(title) = &args.title {
        builder = builder.title(title);
    }
    if let Some(game_id) = &args.game_id {
        builder = builder.game_id(game_id);
    }
    if let Some(licensee) = &args.new_licensee {
        builder = builder.new_licensee(licensee);
    }
    builder = builder.sgb(args.sgb_compatible).non_japanese(args.non_japanese);

    if let Some(text) = &args.mbc_type {
        match parse_mbc(text) {
            Ok(ty) => builder = builder.cartridge_type(ty),
            Err(err) => errors.push(err.into()),
        }
    }

    let bytes = [
        ('l', &args.old_licensee),
        ('n', &args.rom_version),
        ('p', &args.pad_value),
        ('r', &args.ram_size),
    ];
    for (option, text) in bytes {
        let Some(text) = text else { continue };
        match parse_byte(option, text) {
            Ok(value) => {
                builder = match option {
                    'l' => builder.old_licensee(value),
                    'n' => builder.rom_version(value),
                    'p' => builder.pad_value(value),
                    _ => builder.ram_size(value),
                };
            }
            Err(err) => errors.push(err),
        }
    }

    (builder.build(), errors)
}
