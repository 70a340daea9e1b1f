//! `check --system-info`: platform and locale details that decide which
//! encoding build tools use when they write text files.

use std::io::{self, Write};

use crate::check::ColorScheme;

/// Environment variables that influence the encoding tools pick.
const ENCODING_VARS: &[&str] = &["LANG", "LC_ALL", "LC_CTYPE", "PYTHONIOENCODING", "CHCP"];

/// Simplified Chinese Windows code page (GBK).
const GBK_CODE_PAGE: u32 = 936;

#[derive(Debug)]
pub struct SystemInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub is_windows: bool,
    /// Active console code page. Only queried on Windows.
    pub code_page: Option<u32>,
    /// Encoding-related variables that are set, in [`ENCODING_VARS`] order.
    pub env: Vec<(String, String)>,
}

impl SystemInfo {
    pub fn detect() -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            is_windows: cfg!(windows),
            code_page: active_code_page(),
            env: ENCODING_VARS
                .iter()
                .filter_map(|&name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
                .collect(),
        }
    }

    pub fn render<W: Write>(&self, scheme: &ColorScheme, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}=== System Information ==={}", scheme.location, scheme.reset)?;
        writeln!(out, "Platform: {}", self.os)?;
        writeln!(out, "Architecture: {}", self.arch)?;

        if self.is_windows {
            match self.code_page {
                Some(code_page) => writeln!(out, "Active Code Page: {}", code_page)?,
                None => writeln!(out, "Active Code Page: (unable to determine)")?,
            }
            if self.code_page == Some(GBK_CODE_PAGE) {
                writeln!(
                    out,
                    "{}  WARNING: code page 936 (GBK/Chinese) is active; tools that use the \
                     system encoding will write GBK instead of UTF-8{}",
                    scheme.message, scheme.reset
                )?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{}Encoding Environment Variables:{}", scheme.message, scheme.reset)?;
        if self.env.is_empty() {
            writeln!(out, "(none set)")?;
        }
        for (name, value) in &self.env {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)
    }
}

#[cfg(windows)]
fn active_code_page() -> Option<u32> {
    let output = std::process::Command::new("cmd")
        .args(["/C", "chcp"])
        .output()
        .ok()?;
    parse_code_page(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(windows))]
fn active_code_page() -> Option<u32> {
    None
}

/// Parse `chcp` output such as `Active code page: 936`, in any UI language.
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_code_page(output: &str) -> Option<u32> {
    output
        .rsplit(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())?
        .parse()
        .ok()
}
