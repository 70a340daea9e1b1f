//! File and directory scanning.
//!
//! Reads files from disk and runs [`validate_utf8_detailed`] on each. This is
//! the layer that decides which files to look at; the verdict itself always
//! comes from [`crate::utf8`].
//!
//! ```no_run
//! use strictutf8::scan::{check_paths, ScanConfig};
//!
//! let summary = check_paths(&["dist"], &ScanConfig::default());
//! for report in summary.invalid() {
//!     eprintln!("{}: {}", report.path.display(), report.result.as_ref().unwrap_err());
//! }
//! ```

mod config;

pub use config::{ScanConfig, DEFAULT_EXTENSIONS};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::utf8::{validate_utf8_detailed, ValidationResult};

/// Outcome of validating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    pub result: ValidationResult,
    /// Contents of a rejected file, as read for the verdict. `None` for
    /// accepted files.
    pub bytes: Option<Vec<u8>>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

/// A path that could not be read.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Files found under one root, plus the entries that could not be walked.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<PathBuf>,
    pub failures: Vec<ScanFailure>,
}

impl Collected {
    fn fail(&mut self, path: &Path, error: io::Error) {
        tracing::warn!(path = %path.display(), %error, "cannot scan");
        self.failures.push(ScanFailure {
            path: path.to_path_buf(),
            error,
        });
    }
}

/// Reports for every file reached, plus the paths that failed.
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub reports: Vec<FileReport>,
    pub failures: Vec<ScanFailure>,
}

impl ScanSummary {
    pub fn valid_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.reports.len() - self.valid_count()
    }

    /// Reports whose file was rejected.
    pub fn invalid(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.is_valid())
    }

    /// True when every file was read and accepted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.invalid_count() == 0
    }
}

/// Expand `root` into the list of files to check.
///
/// A file is returned as-is, without applying the extension filter. A
/// directory is walked recursively in sorted order; a subdirectory that
/// cannot be listed is recorded in [`Collected::failures`] and its siblings
/// are still walked. Only a `root` that cannot be stat'ed is an error.
pub fn collect_files(root: &Path, config: &ScanConfig) -> io::Result<Collected> {
    let mut collected = Collected::default();
    if fs::metadata(root)?.is_dir() {
        walk(root, config, &mut collected);
    } else {
        collected.files.push(root.to_path_buf());
    }
    Ok(collected)
}

fn walk(dir: &Path, config: &ScanConfig, out: &mut Collected) {
    let listing = fs::read_dir(dir).and_then(|entries| entries.collect::<io::Result<Vec<_>>>());
    let mut entries = match listing {
        Ok(entries) => entries,
        Err(error) => return out.fail(dir, error),
    };
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(error) => {
                out.fail(&path, error);
                continue;
            }
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if config.skips_name(&name, file_type.is_dir()) {
            tracing::debug!(path = %path.display(), "skipping");
            continue;
        }

        if file_type.is_dir() {
            walk(&path, config, out);
        } else if file_type.is_file() && config.wants_file(&path) {
            out.files.push(path);
        }
    }
}

/// Read `path` and validate its contents.
pub fn check_file(path: &Path) -> io::Result<FileReport> {
    let input = fs::read(path)?;
    let size = input.len() as u64;
    let result = validate_utf8_detailed(&input);
    let bytes = match &result {
        Ok(()) => None,
        Err(err) => {
            tracing::debug!(
                path = %path.display(),
                offset = err.offset,
                kind = ?err.kind,
                "rejected"
            );
            Some(input)
        }
    };
    Ok(FileReport {
        path: path.to_path_buf(),
        size,
        result,
        bytes,
    })
}

/// Collect and check every file under `paths`.
///
/// I/O errors are recorded per path and do not stop the scan.
pub fn check_paths<P: AsRef<Path>>(paths: &[P], config: &ScanConfig) -> ScanSummary {
    let mut summary = ScanSummary::default();

    for root in paths {
        let root = root.as_ref();
        let collected = match collect_files(root, config) {
            Ok(collected) => collected,
            Err(error) => {
                tracing::warn!(path = %root.display(), %error, "cannot scan");
                summary.failures.push(ScanFailure {
                    path: root.to_path_buf(),
                    error,
                });
                continue;
            }
        };

        tracing::debug!(
            root = %root.display(),
            files = collected.files.len(),
            failures = collected.failures.len(),
            "collected"
        );
        summary.failures.extend(collected.failures);

        for path in collected.files {
            match check_file(&path) {
                Ok(report) => summary.reports.push(report),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "cannot read");
                    summary.failures.push(ScanFailure { path, error });
                }
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utf8::Utf8ErrorKind;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "manifest.json", b"{\"name\": \"demo\"}");
        write(root, "background.js", "console.log(\"你好⏱️\");\n".as_bytes());
        write(root, "content/gbk.js", b"console.log(\"\xC4\xE3\xBA\xC3\");\n");
        write(root, "content/nonchar.js", b"// \xEF\xBF\xBE\n");
        write(root, "assets/logo.png", &[0x89, b'P', b'N', b'G', 0xFF]);
        write(root, "node_modules/dep/index.js", &[0xFF]);
        write(root, ".vite/cache.js", &[0xFF]);
        dir
    }

    #[test]
    fn collects_filtered_sorted_files() {
        let dir = fixture();
        let collected = collect_files(dir.path(), &ScanConfig::default()).unwrap();
        assert!(collected.failures.is_empty());
        let names: Vec<_> = collected
            .files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "background.js",
                "content/gbk.js",
                "content/nonchar.js",
                "manifest.json"
            ]
        );
    }

    #[test]
    fn explicit_file_ignores_extension_filter() {
        let dir = fixture();
        let logo = dir.path().join("assets/logo.png");
        let collected = collect_files(&logo, &ScanConfig::default()).unwrap();
        assert_eq!(collected.files, vec![logo]);
    }

    #[test]
    fn all_files_and_hidden() {
        let dir = fixture();
        let config = ScanConfig::default()
            .with_all_files(true)
            .with_skip_hidden(false);
        let collected = collect_files(dir.path(), &config).unwrap();
        assert_eq!(collected.files.len(), 6); // everything except node_modules
    }

    #[test]
    fn summary_counts() {
        let dir = fixture();
        let summary = check_paths(&[dir.path()], &ScanConfig::default());
        assert_eq!(summary.reports.len(), 4);
        assert_eq!(summary.valid_count(), 2);
        assert_eq!(summary.invalid_count(), 2);
        assert!(summary.failures.is_empty());
        assert!(!summary.is_clean());

        let kinds: Vec<_> = summary
            .invalid()
            .map(|r| r.result.as_ref().unwrap_err().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                Utf8ErrorKind::InvalidContinuationByte,
                Utf8ErrorKind::NonCharacter
            ]
        );
    }

    #[test]
    fn report_size_and_offset() {
        let dir = fixture();
        let report = check_file(&dir.path().join("content/gbk.js")).unwrap();
        assert_eq!(report.size, 21);
        assert_eq!(report.result.unwrap_err().offset, 13);
    }

    #[test]
    fn rejected_report_keeps_judged_bytes() {
        let dir = fixture();
        let path = dir.path().join("content/gbk.js");
        let report = check_file(&path).unwrap();
        fs::write(&path, b"rewritten").unwrap();

        let bytes = report.bytes.as_deref().unwrap();
        assert_eq!(bytes.len() as u64, report.size);
        assert_eq!(bytes[report.result.as_ref().unwrap_err().offset], 0xC4);

        let valid = check_file(&dir.path().join("manifest.json")).unwrap();
        assert!(valid.bytes.is_none());
    }

    #[test]
    fn dot_files_are_checked_dot_dirs_are_not() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".prettierrc.json", &[0xEF, 0xBF, 0xBF]);
        write(dir.path(), ".cache/stale.js", &[0xFF]);
        let summary = check_paths(&[dir.path()], &ScanConfig::default());
        assert_eq!(summary.reports.len(), 1);
        assert!(summary.reports[0].path.ends_with(".prettierrc.json"));
        assert_eq!(summary.invalid_count(), 1);
    }

    #[test]
    fn walk_failure_is_recorded_and_walk_continues() {
        let dir = fixture();
        let config = ScanConfig::default();
        let mut out = Collected::default();
        walk(dir.path(), &config, &mut out);
        walk(&dir.path().join("vanished"), &config, &mut out);
        walk(&dir.path().join("content"), &config, &mut out);

        assert_eq!(out.files.len(), 6);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].path, dir.path().join("vanished"));
        assert_eq!(out.failures[0].error.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_keeps_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let dir = fixture();
        write(dir.path(), "locked/inner.js", b"ok");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running privileged: permissions are not enforced.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let summary = check_paths(&[dir.path()], &ScanConfig::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(summary.reports.len(), 4);
        assert_eq!(summary.invalid_count(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, locked);
    }

    #[test]
    fn missing_path_is_a_failure() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let summary = check_paths(&[&missing], &ScanConfig::default());
        assert!(summary.reports.is_empty());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].error.kind(), io::ErrorKind::NotFound);
        assert!(!summary.is_clean());
    }
}
