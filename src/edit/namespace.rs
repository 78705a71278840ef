//! Namespace normalization: the declared namespace follows the folder.

use std::path::{Component, Path, PathBuf};

use crate::edit::imports::ensure_import;
use crate::error::{SurgeonError, SurgeonResult};
use crate::index::{self, ScanOptions};
use crate::model::{SkippedFile, SweepReport};
use crate::syntax::{self, SyntaxTree, TextEdit};
use crate::util::atomic::atomic_write;

/// Namespace a file should declare given where it sits under `project_root`.
///
/// `/proj/Sub/Dir/File.cs` with root `/proj` and `App` gives `App.Sub.Dir`;
/// a file directly in `/proj` gives `App`. Paths are compared lexically.
pub fn expected_namespace(
    file_path: &Path,
    project_root: &Path,
    root_namespace: &str,
) -> SurgeonResult<String> {
    let root_namespace = root_namespace.trim();
    if root_namespace.is_empty() {
        return Err(SurgeonError::argument("root namespace is empty"));
    }

    let dir = lexical(file_path.parent().unwrap_or_else(|| Path::new("")));
    let root = lexical(project_root);
    let relative = dir.strip_prefix(&root).map_err(|_| {
        SurgeonError::argument(format!(
            "{} is not under project root {}",
            file_path.display(),
            project_root.display()
        ))
    })?;

    let mut namespace = root_namespace.to_owned();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                namespace.push('.');
                namespace.push_str(&segment.to_string_lossy());
            }
            _ => {
                return Err(SurgeonError::argument(format!(
                    "cannot derive a namespace from {}",
                    relative.display()
                )));
            }
        }
    }
    Ok(namespace)
}

fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Rename the file's first namespace declaration (block or file-scoped) to
/// the expected one, then ensure each of `extra_imports`.
///
/// When nothing needed to change the returned text equals `source`
/// byte-for-byte.
pub fn normalize_namespace(
    source: &str,
    file_path: &Path,
    project_root: &Path,
    root_namespace: &str,
    extra_imports: &[String],
) -> SurgeonResult<String> {
    let expected = expected_namespace(file_path, project_root, root_namespace)?;
    let tree = SyntaxTree::parse(source)?;

    let edit = tree
        .find_first(&[
            syntax::NAMESPACE_DECLARATION,
            syntax::FILE_SCOPED_NAMESPACE_DECLARATION,
        ])
        .and_then(|ns| ns.child_by_field_name("name"))
        .filter(|name| tree.text(*name) != expected)
        .map(|name| {
            tracing::debug!(
                file = %file_path.display(),
                from = tree.text(name),
                to = %expected,
                "renaming namespace"
            );
            TextEdit::replace(name.byte_range(), expected.as_str())
        });

    let mut text = edit.map_or_else(|| source.to_owned(), |e| e.apply(source));
    for import in extra_imports {
        text = ensure_import(&text, import)?;
    }
    Ok(text)
}

/// Apply [`normalize_namespace`] to every source file under `dir`.
///
/// Files are rewritten one at a time; a file that fails is recorded in
/// `skipped` and the sweep moves on.
pub fn fix_namespaces(
    dir: &Path,
    project_root: &Path,
    root_namespace: &str,
    extra_imports: &[String],
    options: &ScanOptions,
) -> SurgeonResult<SweepReport> {
    if root_namespace.trim().is_empty() {
        return Err(SurgeonError::argument("root namespace is empty"));
    }

    let files = index::collect_files(dir, index::SOURCE_GLOB, options)?;
    let mut report = SweepReport {
        skipped: files.skipped,
        ..SweepReport::default()
    };

    for path in files.results {
        match fix_file(&path, project_root, root_namespace, extra_imports) {
            Ok(true) => report.changed.push(path),
            Ok(false) => report.unchanged += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "namespace fix failed");
                report.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        changed = report.changed.len(),
        unchanged = report.unchanged,
        skipped = report.skipped.len(),
        "namespace sweep finished"
    );
    Ok(report)
}

fn fix_file(
    path: &Path,
    project_root: &Path,
    root_namespace: &str,
    extra_imports: &[String],
) -> SurgeonResult<bool> {
    let source = std::fs::read_to_string(path).map_err(|e| SurgeonError::io(path, e))?;
    let updated = normalize_namespace(&source, path, project_root, root_namespace, extra_imports)?;
    if updated == source {
        return Ok(false);
    }
    atomic_write(path, &updated)?;
    Ok(true)
}
