//! Whole-word reference finder.

use std::path::Path;

use regex::Regex;

use crate::error::{SurgeonError, SurgeonResult};
use crate::index::{ScanOptions, require_symbol, scan_text};
use crate::model::{ReferenceResult, ScanReport};

/// Every whole-word occurrence of `symbol` under `root`, one result per
/// occurrence (a line mentioning it twice yields two results).
pub fn find_references(
    root: &Path,
    symbol: &str,
    options: &ScanOptions,
) -> SurgeonResult<ScanReport<ReferenceResult>> {
    let symbol = require_symbol(symbol)?;
    let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(symbol)))
        .map_err(|e| SurgeonError::argument(format!("invalid symbol pattern: {e}")))?;

    let report = scan_text(root, options, |path, content, out| {
        out.extend(occurrences(&pattern, content).map(|(line_number, line)| {
            ReferenceResult {
                file_path: path.to_path_buf(),
                line_number,
                line_content: line.trim().to_owned(),
            }
        }));
    })?;

    tracing::debug!(symbol, found = report.results.len(), "reference scan finished");
    Ok(report)
}

/// `(1-based line number, containing line)` for each match in `content`.
fn occurrences<'a>(
    pattern: &'a Regex,
    content: &'a str,
) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect();

    pattern.find_iter(content).map(move |m| {
        let line_index = line_starts.partition_point(|&start| start <= m.start()) - 1;
        let start = line_starts[line_index];
        let end = content[start..].find('\n').map_or(content.len(), |i| start + i);
        (line_index + 1, &content[start..end])
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn whole_word_only() {
        let pattern = Regex::new(r"\bFoo\b").expect("regex");
        let found: Vec<(usize, &str)> =
            occurrences(&pattern, "FooBar x;\nFoo y;\nMyFoo z;").collect();
        assert_eq!(found, vec![(2, "Foo y;")]);
    }

    #[test]
    fn one_result_per_occurrence() {
        let pattern = Regex::new(r"\bFoo\b").expect("regex");
        let found: Vec<(usize, &str)> =
            occurrences(&pattern, "line one\r\n  Foo a = new Foo();\r\n").collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 2);
        assert_eq!(found[1].0, 2);
        assert_eq!(found[0].1.trim(), "Foo a = new Foo();");
    }

    #[test]
    fn scans_files_and_trims_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("obj")).expect("mkdir");
        std::fs::write(
            dir.path().join("A.cs"),
            "class A\n{\n    FooBar bar;\n    Foo foo;\n}\n",
        )
        .expect("write");
        std::fs::write(dir.path().join("obj/Gen.cs"), "Foo generated;").expect("write");

        let report =
            find_references(dir.path(), "Foo", &ScanOptions::default()).expect("scan");
        assert_eq!(
            report.results,
            vec![ReferenceResult {
                file_path: dir.path().join("A.cs"),
                line_number: 4,
                line_content: "Foo foo;".to_owned(),
            }]
        );
    }
}
