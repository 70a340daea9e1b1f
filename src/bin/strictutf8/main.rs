//! strictutf8 CLI: check files against the strict UTF-8 rule browsers apply
//! to extension sources.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod check;
mod generators;
mod selftest;
mod system_info;

#[derive(Debug, Parser)]
#[command(name = "strictutf8")]
#[command(about = "Strict UTF-8 checker (rejects surrogates and non-characters)", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check files, directories or stdin
    Check(check::CheckArgs),
    /// Run the built-in acceptance table
    Selftest(selftest::SelftestArgs),
    /// Generate fixture text, optionally with an injected defect
    Generate(GenerateArgs),
}

/// Generate fixture text for testing and benchmarking
#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Size of text to generate (supports b, kb, mb, gb - case insensitive)
    /// Examples: 1024, 1kb, 512MB, 2Gb
    #[arg(value_parser = parse_size)]
    size: usize,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text pattern to generate
    #[arg(short, long, default_value = "mixed")]
    pattern: PatternArg,

    /// Defect to splice into the text
    #[arg(short, long)]
    defect: Option<DefectArg>,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, ValueEnum)]
enum PatternArg {
    /// Pure ASCII prose
    Ascii,
    /// Latin Extended words (2-byte sequences)
    Latin,
    /// Chinese/Japanese/Korean (3-byte sequences)
    Cjk,
    /// Emoji (4-byte sequences)
    Emoji,
    /// Prose with occasional non-ASCII (default)
    Mixed,
    /// JavaScript source with unicode strings and comments
    SourceCode,
}

impl From<PatternArg> for generators::Pattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Ascii => generators::Pattern::Ascii,
            PatternArg::Latin => generators::Pattern::Latin,
            PatternArg::Cjk => generators::Pattern::Cjk,
            PatternArg::Emoji => generators::Pattern::Emoji,
            PatternArg::Mixed => generators::Pattern::Mixed,
            PatternArg::SourceCode => generators::Pattern::SourceCode,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum DefectArg {
    /// GBK-encoded Chinese
    Gbk,
    /// U+FFFE
    NonCharacter,
    /// U+FDD0
    ReservedNonCharacter,
    /// Encoded U+D800
    Surrogate,
    /// Overlong NUL
    Overlong,
    /// Sequence cut off at end of file
    Truncated,
    /// Bare continuation bytes
    StrayContinuation,
    /// Leading byte order mark (still valid)
    Bom,
}

impl From<DefectArg> for generators::Defect {
    fn from(arg: DefectArg) -> Self {
        match arg {
            DefectArg::Gbk => generators::Defect::Gbk,
            DefectArg::NonCharacter => generators::Defect::NonCharacter,
            DefectArg::ReservedNonCharacter => generators::Defect::ReservedNonCharacter,
            DefectArg::Surrogate => generators::Defect::Surrogate,
            DefectArg::Overlong => generators::Defect::Overlong,
            DefectArg::Truncated => generators::Defect::Truncated,
            DefectArg::StrayContinuation => generators::Defect::StrayContinuation,
            DefectArg::Bom => generators::Defect::Bom,
        }
    }
}

/// Parse size string like "1mb", "512KB", "2GB", "1024" (case insensitive)
fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim().to_lowercase();

    // Try parsing as plain number first
    if let Ok(bytes) = s.parse::<usize>() {
        return Ok(bytes);
    }

    // Parse with unit suffix
    let (num_str, unit) = if s.ends_with("gb") {
        (s.trim_end_matches("gb"), 1024 * 1024 * 1024)
    } else if s.ends_with("mb") {
        (s.trim_end_matches("mb"), 1024 * 1024)
    } else if s.ends_with("kb") {
        (s.trim_end_matches("kb"), 1024)
    } else if s.ends_with('b') {
        (s.trim_end_matches('b'), 1)
    } else {
        return Err(format!(
            "Invalid size format: '{}'. Use format like '1mb', '512KB', or '1024'",
            s
        ));
    };

    num_str
        .trim()
        .parse::<usize>()
        .map(|n| n * unit)
        .map_err(|_| format!("Invalid number in size: '{}'", s))
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn generate(args: GenerateArgs) -> Result<i32> {
    let defect = args.defect.map(generators::Defect::from);
    let fixture =
        generators::generate_fixture(args.size, args.pattern.into(), defect, args.seed);

    if let Some(offset) = fixture.defect_offset {
        tracing::info!(offset, "defect injected");
    }

    match args.output {
        Some(path) => {
            std::fs::write(&path, &fixture.bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {} bytes to {}", fixture.bytes.len(), path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(&fixture.bytes)
                .context("failed to write to stdout")?;
        }
    }

    Ok(0)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Command::Check(args) => check::run(args)?,
        Command::Selftest(args) => selftest::run(args)?,
        Command::Generate(args) => generate(args)?,
    };

    std::process::exit(code);
}
