//! Lightweight directory indexers.
//!
//! Everything here works on raw text with regular expressions: no syntax
//! tree, no semantic model. Results are a textual approximation and callers
//! should treat them that way.
//!
//! - [`definitions::find_definitions`] — lines that look like a declaration
//! - [`references::find_references`] — every whole-word occurrence
//! - [`projects::list_projects`] — `.csproj` manifests and their references
//!
//! All scans share [`collect_files`], which skips build output and VCS
//! directories and records unreadable entries instead of failing.

pub mod definitions;
pub mod projects;
pub mod references;

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{SurgeonError, SurgeonResult};
use crate::model::ScanReport;

pub use definitions::find_definitions;
pub use projects::list_projects;
pub use references::find_references;

/// File-name pattern for C# sources.
pub const SOURCE_GLOB: &str = "*.cs";

/// File-name pattern for project manifests.
pub const PROJECT_GLOB: &str = "*.csproj";

/// Limits and exclusions applied to every directory walk.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum directory depth below the scan root.
    pub max_depth: usize,
    /// Directory names skipped wherever they appear in the tree.
    pub excluded_dirs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            excluded_dirs: vec!["bin".to_owned(), "obj".to_owned(), ".git".to_owned()],
        }
    }
}

impl ScanOptions {
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.iter().any(|d| d == name))
    }
}

/// Files under `root` whose name matches `pattern`, in file-name order.
///
/// `root` may also be a single file. Entries that cannot be read are
/// reported in `skipped`; only a missing root is an error.
pub fn collect_files(
    root: &Path,
    pattern: &str,
    options: &ScanOptions,
) -> SurgeonResult<ScanReport<PathBuf>> {
    if !root.exists() {
        return Err(SurgeonError::FileNotFound {
            path: root.to_path_buf(),
        });
    }

    let matcher = globset::Glob::new(pattern)
        .map_err(|e| SurgeonError::argument(format!("invalid file pattern {pattern}: {e}")))?
        .compile_matcher();

    let mut report = ScanReport::default();
    let walker = WalkDir::new(root)
        .max_depth(options.max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !options.is_excluded(e));

    for entry in walker {
        match entry {
            Ok(e) if e.file_type().is_file() && matcher.is_match(e.file_name()) => {
                report.results.push(e.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                report.skip(path, e);
            }
        }
    }

    tracing::debug!(
        root = %root.display(),
        pattern,
        files = report.results.len(),
        skipped = report.skipped.len(),
        "collected files"
    );
    Ok(report)
}

/// Read each file and hand its text to `scan`; unreadable files land in
/// `skipped` alongside the walk's own omissions.
pub(crate) fn scan_text<T>(
    root: &Path,
    options: &ScanOptions,
    mut scan: impl FnMut(&Path, &str, &mut Vec<T>),
) -> SurgeonResult<ScanReport<T>> {
    let files = collect_files(root, SOURCE_GLOB, options)?;
    let mut report = ScanReport {
        results: Vec::new(),
        skipped: files.skipped,
    };

    for path in files.results {
        match std::fs::read_to_string(&path) {
            Ok(content) => scan(&path, &content, &mut report.results),
            Err(e) => report.skip(path, e),
        }
    }
    Ok(report)
}

pub(crate) fn require_symbol(symbol: &str) -> SurgeonResult<&str> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(SurgeonError::argument("symbol name is empty"));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn skips_build_and_vcs_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for sub in ["src", "bin/Debug", "obj", ".git", "src/obj"] {
            std::fs::create_dir_all(root.join(sub)).expect("mkdir");
            std::fs::write(root.join(sub).join("X.cs"), "class X {}").expect("write");
        }
        std::fs::write(root.join("src/notes.txt"), "x").expect("write");

        let report = collect_files(root, SOURCE_GLOB, &ScanOptions::default()).expect("collect");
        assert_eq!(report.results, vec![root.join("src/X.cs")]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn excluded_name_as_root_is_still_scanned() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).expect("mkdir");
        std::fs::write(bin.join("A.cs"), "class A {}").expect("write");

        let report = collect_files(&bin, SOURCE_GLOB, &ScanOptions::default()).expect("collect");
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn respects_max_depth() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("a/b")).expect("mkdir");
        std::fs::write(dir.path().join("Top.cs"), "").expect("write");
        std::fs::write(dir.path().join("a/b/Deep.cs"), "").expect("write");

        let options = ScanOptions {
            max_depth: 1,
            ..ScanOptions::default()
        };
        let report = collect_files(dir.path(), SOURCE_GLOB, &options).expect("collect");
        assert_eq!(report.results, vec![dir.path().join("Top.cs")]);
    }

    #[test]
    fn missing_root_is_not_found() {
        let err = collect_files(
            Path::new("/definitely/not/here"),
            SOURCE_GLOB,
            &ScanOptions::default(),
        )
        .expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
