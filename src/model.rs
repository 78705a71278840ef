//! Shared result types returned by the extractor and the indexers.

use std::path::PathBuf;

use serde::Serialize;

/// Kind of declaration in a structural outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CodeItemKind {
    Class,
    Struct,
    Interface,
    Record,
    Enum,
    Method,
    Property,
}

/// One declaration captured at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeItem {
    pub kind: CodeItemKind,
    pub name: String,
    /// Parameter list for methods, declared type for properties.
    pub signature: String,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub modifiers: Vec<String>,
    pub children: Vec<CodeItem>,
}

/// How a definition line was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    ClassOrType,
    Method,
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLocation {
    pub symbol_name: String,
    pub file_path: PathBuf,
    pub line_number: usize,
    pub definition_line: String,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceResult {
    pub file_path: PathBuf,
    pub line_number: usize,
    pub line_content: String,
}

/// A project manifest and the projects it references by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub name: String,
    pub path: PathBuf,
    pub dependencies: Vec<String>,
}

/// A file a directory scan could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Results of a directory scan plus the files it had to leave out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport<T> {
    pub results: Vec<T>,
    pub skipped: Vec<SkippedFile>,
}

impl<T> Default for ScanReport<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> ScanReport<T> {
    pub fn skip(&mut self, path: impl Into<PathBuf>, reason: impl ToString) {
        let path = path.into();
        let reason = reason.to_string();
        tracing::warn!(path = %path.display(), reason = %reason, "skipping file");
        self.skipped.push(SkippedFile { path, reason });
    }
}

/// Outcome of a namespace-fix sweep over a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub changed: Vec<PathBuf>,
    pub unchanged: usize,
    pub skipped: Vec<SkippedFile>,
}
