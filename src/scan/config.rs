//! Configuration for directory scanning.

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extensions checked when no explicit list is given.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".css", ".html", ".json"];

/// Configuration for scanning directories.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfig {
    /// File extensions to check, each with a leading dot (default: [`DEFAULT_EXTENSIONS`])
    pub extensions: Vec<String>,
    /// Check every file regardless of extension (default: false)
    pub all_files: bool,
    /// Skip directories whose name starts with '.' (default: true).
    /// Dot-files are always checked.
    pub skip_hidden: bool,
    /// Directory names never descended into (default: `node_modules`)
    pub skip_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            all_files: false,
            skip_hidden: true,
            skip_dirs: vec!["node_modules".to_string()],
        }
    }
}

impl ScanConfig {
    /// Replace the extension list. A missing leading dot is added.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| e.len() > 1)
            .collect();
        self
    }

    /// Check every file regardless of extension.
    pub fn with_all_files(mut self, all_files: bool) -> Self {
        self.all_files = all_files;
        self
    }

    /// Include or skip dot-directories.
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    /// Add a directory name that is never descended into.
    pub fn with_skip_dir(mut self, name: impl Into<String>) -> Self {
        self.skip_dirs.push(name.into());
        self
    }

    /// Whether a file found while walking a directory should be checked.
    pub fn wants_file(&self, path: &Path) -> bool {
        if self.all_files {
            return true;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Whether an entry name should be skipped entirely.
    pub(crate) fn skips_name(&self, name: &str, is_dir: bool) -> bool {
        is_dir
            && ((self.skip_hidden && name.starts_with('.'))
                || self.skip_dirs.iter().any(|d| d == name))
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScanConfig::default();
        assert!(config.wants_file(Path::new("dist/background.js")));
        assert!(config.wants_file(Path::new("manifest.json")));
        assert!(!config.wants_file(Path::new("logo.png")));
        assert!(config.skips_name("node_modules", true));
        assert!(!config.skips_name("node_modules", false));
        assert!(config.skips_name(".git", true));
        assert!(!config.skips_name(".eslintrc.js", false));
    }

    #[test]
    fn extensions_are_normalized() {
        let config = ScanConfig::default().with_extensions(["js", " .css ", ""]);
        assert_eq!(config.extensions, vec![".js", ".css"]);
        assert!(config.wants_file(Path::new("a.css")));
        assert!(!config.wants_file(Path::new("a.html")));
    }

    #[test]
    fn all_files_overrides_extensions() {
        let config = ScanConfig::default().with_all_files(true);
        assert!(config.wants_file(Path::new("README")));
    }

    #[test]
    fn hidden_can_be_included() {
        let config = ScanConfig::default()
            .with_skip_hidden(false)
            .with_skip_dir("target");
        assert!(!config.skips_name(".vite", true));
        assert!(config.skips_name("target", true));
    }
}
