//! CLI handler for the `check` command.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use strictutf8::scan::{self, ScanConfig};
use strictutf8::utf8::{self, Utf8Error, Utf8ErrorKind, ValidationReport, ValidationResult};

use crate::system_info::SystemInfo;

/// Check files against the strict UTF-8 rule browsers apply to extensions.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Files or directories to check (reads from stdin if none provided)
    #[arg(trailing_var_arg = true)]
    pub paths: Vec<PathBuf>,

    /// Quiet mode: exit code only, no output
    #[arg(short, long)]
    pub quiet: bool,

    /// Force color output even when not a TTY
    #[arg(short = 'C', long = "color")]
    pub color: bool,

    /// Disable color output
    #[arg(short = 'M', long = "no-color")]
    pub no_color: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Comma-separated extensions to check inside directories
    /// (default: .js,.mjs,.cjs,.css,.html,.json)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Check all files inside directories regardless of extension
    #[arg(long)]
    pub all: bool,

    /// Number of bytes shown either side of an error in the hex dump
    #[arg(long, default_value = "16")]
    pub context: usize,

    /// Also list accepted files as `PASS <path> (<size> bytes)`
    #[arg(long)]
    pub list_valid: bool,

    /// Print platform, code page and locale variables first
    /// (with no paths, stdin is not read)
    #[arg(long)]
    pub system_info: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable diagnostics on stderr
    Text,
    /// One JSON object per input on stdout
    Json,
}

/// Exit codes for the check command.
pub mod exit_codes {
    /// Every input passed.
    pub const SUCCESS: i32 = 0;
    /// At least one input was rejected.
    pub const INVALID: i32 = 1;
    /// I/O error (file not found, permission denied, etc.).
    pub const IO_ERROR: i32 = 2;
}

/// ANSI color codes for error output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const LOCATION: &str = "\x1b[1;34m"; // Bold blue
    pub const LINE_NUM: &str = "\x1b[0;34m"; // Blue
    pub const CARET: &str = "\x1b[1;32m"; // Bold green
    pub const MESSAGE: &str = "\x1b[0;33m"; // Yellow
}

/// Color scheme that can be disabled.
pub(crate) struct ColorScheme {
    pub error: &'static str,
    pub location: &'static str,
    pub line_num: &'static str,
    pub caret: &'static str,
    pub message: &'static str,
    pub reset: &'static str,
}

impl ColorScheme {
    pub fn new(use_color: bool) -> Self {
        if use_color {
            Self {
                error: colors::ERROR,
                location: colors::LOCATION,
                line_num: colors::LINE_NUM,
                caret: colors::CARET,
                message: colors::MESSAGE,
                reset: colors::RESET,
            }
        } else {
            Self {
                error: "",
                location: "",
                line_num: "",
                caret: "",
                message: "",
                reset: "",
            }
        }
    }

    /// Pick colors from the flags, falling back to TTY detection on stderr.
    pub fn from_flags(color: bool, no_color: bool) -> Self {
        let use_color = if no_color {
            false
        } else if color {
            true
        } else {
            atty::is(atty::Stream::Stderr)
        };
        Self::new(use_color)
    }
}

/// One line of `--format json` output.
#[derive(Debug, Serialize)]
struct JsonRecord<'a> {
    path: &'a str,
    size: u64,
    #[serde(flatten)]
    report: ValidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<Utf8ErrorKind>,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> Result<i32> {
    let scheme = ColorScheme::from_flags(args.color, args.no_color);

    if args.system_info {
        let info = SystemInfo::detect();
        tracing::debug!(os = info.os, code_page = ?info.code_page, "system info");
        info.render(&scheme, &mut io::stderr().lock())
            .context("failed to write system info")?;
        if args.paths.is_empty() {
            return Ok(exit_codes::SUCCESS);
        }
    }

    if args.paths.is_empty() {
        let mut input = Vec::new();
        io::stdin()
            .read_to_end(&mut input)
            .context("failed to read from stdin")?;

        let result = utf8::validate_utf8_detailed(&input);
        emit(&args, &scheme, "<stdin>", input.len() as u64, &input, &result)?;
        return Ok(if result.is_ok() {
            exit_codes::SUCCESS
        } else {
            exit_codes::INVALID
        });
    }

    let mut config = ScanConfig::default().with_all_files(args.all);
    if let Some(extensions) = &args.extensions {
        config = config.with_extensions(extensions);
    }

    let summary = scan::check_paths(args.paths.as_slice(), &config);
    tracing::info!(
        files = summary.reports.len(),
        failures = summary.failures.len(),
        "scan finished"
    );

    for report in &summary.reports {
        let name = report.path.to_string_lossy();
        let input = report.bytes.as_deref().unwrap_or_default();
        emit(&args, &scheme, &name, report.size, input, &report.result)?;
    }

    for failure in &summary.failures {
        if !args.quiet {
            eprintln!(
                "{}error{}: {}: {}",
                scheme.error,
                scheme.reset,
                failure.path.display(),
                failure.error
            );
        }
    }

    if !args.quiet && args.format == OutputFormat::Text {
        eprintln!(
            "checked {} file(s): {} valid, {} invalid",
            summary.reports.len(),
            summary.valid_count(),
            summary.invalid_count()
        );
    }

    if !summary.failures.is_empty() {
        Ok(exit_codes::IO_ERROR)
    } else if summary.invalid_count() > 0 {
        Ok(exit_codes::INVALID)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

/// Report one input in the selected format.
fn emit(
    args: &CheckArgs,
    scheme: &ColorScheme,
    name: &str,
    size: u64,
    input: &[u8],
    result: &ValidationResult,
) -> Result<()> {
    if args.quiet {
        return Ok(());
    }
    match args.format {
        OutputFormat::Json => {
            let record = JsonRecord {
                path: name,
                size,
                report: ValidationReport::from(result),
                kind: result.as_ref().err().map(|e| e.kind),
            };
            println!("{}", serde_json::to_string(&record)?);
        }
        OutputFormat::Text => match result {
            Ok(()) if args.list_valid => eprintln!("{}", format_pass_line(name, size, scheme)),
            Ok(()) => {}
            Err(err) => print_error(err, input, name, args.context, scheme),
        },
    }
    Ok(())
}

/// `PASS <name> (<size> bytes)` for an accepted input.
fn format_pass_line(name: &str, size: u64, scheme: &ColorScheme) -> String {
    format!(
        "{}PASS{} {} {}({} bytes){}",
        scheme.caret, scheme.reset, name, scheme.line_num, size, scheme.reset
    )
}

/// Print a formatted error message with context snippet and hex dump.
pub(crate) fn print_error(
    err: &Utf8Error,
    input: &[u8],
    name: &str,
    context: usize,
    scheme: &ColorScheme,
) {
    if err.offset >= input.len() {
        // No bytes to show context from.
        eprintln!("{}error{}: {}: {}", scheme.error, scheme.reset, name, err);
        return;
    }

    eprintln!(
        "{}error{}: {}",
        scheme.error,
        scheme.reset,
        err.message()
    );
    eprintln!(
        "  {}--> {}:{}:{}{}",
        scheme.location, name, err.line, err.column, scheme.reset
    );

    let snippet = get_error_snippet(input, err.offset);
    let line_num_width = err.line.to_string().len().max(3);
    let blank_padding = " ".repeat(line_num_width + 2);

    eprintln!("{}{}|{}", blank_padding, scheme.line_num, scheme.reset);
    eprintln!(
        " {}{:>width$}{} {}|{} {}",
        scheme.line_num,
        err.line,
        scheme.reset,
        scheme.line_num,
        scheme.reset,
        snippet.line_content,
        width = line_num_width
    );
    eprintln!(
        "{}{}|{} {}{}^{}{}",
        blank_padding,
        scheme.line_num,
        scheme.reset,
        " ".repeat(snippet.caret_offset),
        scheme.caret,
        scheme.reset,
        format_error_hint(err.kind, scheme)
    );

    eprintln!(
        "{}{}={} bytes {}..{}: {}",
        blank_padding,
        scheme.line_num,
        scheme.reset,
        err.offset.saturating_sub(context),
        (err.offset + context).min(input.len()),
        hex_context(input, err.offset, context)
    );

    if err.kind.is_structural() {
        if let Some(guess) = guess_encoding(&input[err.offset..]) {
            eprintln!(
                "{}{}={} {}looks like {}{}",
                blank_padding,
                scheme.line_num,
                scheme.reset,
                scheme.message,
                guess,
                scheme.reset
            );
        }
    }

    eprintln!();
}

/// Format an additional hint for certain error types.
fn format_error_hint(kind: Utf8ErrorKind, scheme: &ColorScheme) -> String {
    let hint = match kind {
        Utf8ErrorKind::UnexpectedContinuationByte => {
            Some("bytes 0x80-0xBF are continuation bytes")
        }
        Utf8ErrorKind::InvalidLeadByte => Some("bytes 0xF8-0xFF never appear in UTF-8"),
        Utf8ErrorKind::InvalidContinuationByte => Some("expected byte 0x80-0xBF"),
        Utf8ErrorKind::OverlongEncoding => Some("use shortest possible encoding"),
        Utf8ErrorKind::SurrogateCodepoint => Some("U+D800-U+DFFF are reserved for UTF-16"),
        Utf8ErrorKind::OutOfRangeCodepoint => Some("maximum is U+10FFFF"),
        Utf8ErrorKind::NonCharacter | Utf8ErrorKind::ReservedNonCharacter => {
            Some("valid UTF-8, but browsers refuse non-characters")
        }
        Utf8ErrorKind::TruncatedSequence => None,
    };

    match hint {
        Some(h) => format!(" {}{}{}", scheme.message, h, scheme.reset),
        None => String::new(),
    }
}

/// Hex dump of up to `radius` bytes either side of `offset`, with the byte at
/// `offset` in brackets.
pub(crate) fn hex_context(input: &[u8], offset: usize, radius: usize) -> String {
    let start = offset.saturating_sub(radius);
    let end = offset.saturating_add(radius).min(input.len());
    hex_dump(&input[start..end], offset.checked_sub(start))
}

/// Space-separated hex bytes, bracketing the byte at `highlight`.
pub(crate) fn hex_dump(bytes: &[u8], highlight: Option<usize>) -> String {
    bytes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            if Some(i) == highlight {
                format!("[{:02X}]", b)
            } else {
                format!("{:02X}", b)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Guess which legacy encoding produced the bytes at an error.
pub(crate) fn guess_encoding(bytes: &[u8]) -> Option<&'static str> {
    if let &[b1, b2, ..] = bytes {
        if (0x81..=0xFE).contains(&b1) && (0x40..=0xFE).contains(&b2) && b2 != 0x7F {
            return Some("GBK/GB2312 (Chinese)");
        }
        if ((0x81..=0x9F).contains(&b1) || (0xE0..=0xFC).contains(&b1))
            && ((0x40..=0x7E).contains(&b2) || (0x80..=0xFC).contains(&b2))
        {
            return Some("Shift-JIS (Japanese)");
        }
    }
    match bytes.first() {
        Some(&b) if b >= 0x80 => Some("Latin-1/Windows-1252"),
        _ => None,
    }
}

/// Information about an error snippet.
struct ErrorSnippet {
    /// The content of the line containing the error.
    line_content: String,
    /// Number of characters before the caret.
    caret_offset: usize,
}

/// Extract the line around `offset`, at most 80 bytes wide.
fn get_error_snippet(input: &[u8], offset: usize) -> ErrorSnippet {
    const MAX_WIDTH: usize = 80;

    let line_start = input[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let line_end = input[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(input.len(), |i| offset + i);
    let line = &input[line_start..line_end];
    let caret = offset - line_start;

    let start = caret.saturating_sub(MAX_WIDTH / 2);
    let end = (start + MAX_WIDTH).min(line.len());

    let before = String::from_utf8_lossy(&line[start..caret]);
    let after = String::from_utf8_lossy(&line[caret..end]);
    let after = after.trim_end_matches('\r');

    let lead = if start > 0 { "..." } else { "" };
    let tail = if end < line.len() { "..." } else { "" };

    ErrorSnippet {
        line_content: format!("{}{}{}{}", lead, before, after, tail),
        caret_offset: lead.len() + before.chars().count(),
    }
}
