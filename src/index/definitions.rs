//! Heuristic definition finder.
//!
//! Each non-blank, non-comment line is run through an ordered rule list and
//! the first rule that accepts it decides the kind. The heuristic cannot tell
//! a method declaration from a call on its own line (`Foo(1);` reports as a
//! method); only lines starting with `new ` are rejected for that rule.

use std::path::Path;

use regex::Regex;

use crate::error::{SurgeonError, SurgeonResult};
use crate::index::{ScanOptions, require_symbol, scan_text};
use crate::model::{ScanReport, SymbolKind, SymbolLocation};

/// One classification rule: the pattern must match and the trimmed line must
/// not start with `reject_prefix`.
struct Rule {
    kind: SymbolKind,
    pattern: Regex,
    reject_prefix: Option<&'static str>,
}

impl Rule {
    fn accepts(&self, line: &str) -> bool {
        self.pattern.is_match(line)
            && self
                .reject_prefix
                .is_none_or(|prefix| !line.starts_with(prefix))
    }
}

/// Ordered first-match-wins classifier for one symbol name.
pub struct DefinitionMatcher {
    rules: Vec<Rule>,
}

impl DefinitionMatcher {
    pub fn new(symbol: &str) -> SurgeonResult<Self> {
        let name = regex::escape(require_symbol(symbol)?);
        let build = |source: String| {
            Regex::new(&source)
                .map_err(|e| SurgeonError::argument(format!("invalid symbol pattern: {e}")))
        };

        Ok(Self {
            rules: vec![
                Rule {
                    kind: SymbolKind::ClassOrType,
                    pattern: build(format!(
                        r"\b(class|interface|record|struct|enum)\s+{name}\b"
                    ))?,
                    reject_prefix: None,
                },
                Rule {
                    kind: SymbolKind::Method,
                    pattern: build(format!(r"\b{name}\s*\("))?,
                    reject_prefix: Some("new "),
                },
                Rule {
                    kind: SymbolKind::Property,
                    pattern: build(format!(r"\b{name}\s*\{{"))?,
                    reject_prefix: None,
                },
            ],
        })
    }

    /// Kind of the first rule accepting `line`, if any.
    pub fn classify(&self, line: &str) -> Option<SymbolKind> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with("/*") {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.accepts(line))
            .map(|rule| rule.kind)
    }
}

/// Lines under `root` that look like a definition of `symbol`.
pub fn find_definitions(
    root: &Path,
    symbol: &str,
    options: &ScanOptions,
) -> SurgeonResult<ScanReport<SymbolLocation>> {
    let matcher = DefinitionMatcher::new(symbol)?;
    let symbol = require_symbol(symbol)?;

    let report = scan_text(root, options, |path, content, out| {
        for (index, line) in content.lines().enumerate() {
            if let Some(kind) = matcher.classify(line) {
                out.push(SymbolLocation {
                    symbol_name: symbol.to_owned(),
                    file_path: path.to_path_buf(),
                    line_number: index + 1,
                    definition_line: line.trim().to_owned(),
                    kind,
                });
            }
        }
    })?;

    tracing::debug!(symbol, found = report.results.len(), "definition scan finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;

    fn classify(line: &str) -> Option<SymbolKind> {
        DefinitionMatcher::new("Foo").expect("matcher").classify(line)
    }

    #[test]
    fn type_declarations() {
        assert_eq!(classify("public class Foo : Base"), Some(SymbolKind::ClassOrType));
        assert_eq!(classify("record Foo(int X);"), Some(SymbolKind::ClassOrType));
        assert_eq!(classify("enum Foo { A, B }"), Some(SymbolKind::ClassOrType));
        assert_eq!(classify("class FooBar"), None);
    }

    #[test]
    fn methods_and_properties() {
        assert_eq!(classify("public void Foo(int x)"), Some(SymbolKind::Method));
        assert_eq!(classify("public int Foo { get; set; }"), Some(SymbolKind::Property));
    }

    #[test]
    fn type_rule_wins_over_method_rule() {
        // `record Foo(` would also satisfy the method pattern.
        assert_eq!(classify("public record Foo(string Name);"), Some(SymbolKind::ClassOrType));
    }

    #[test]
    fn constructor_calls_fall_through_to_later_rules() {
        assert_eq!(classify("new Foo();"), None);
        assert_eq!(classify("new Foo { X = 1 };"), Some(SymbolKind::Property));
    }

    #[test]
    fn known_false_positive_for_call_sites() {
        // The heuristic cannot distinguish declaration from call.
        assert_eq!(classify("Foo(1);"), Some(SymbolKind::Method));
        assert_eq!(classify("var x = new Foo();"), Some(SymbolKind::Method));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        assert_eq!(classify("// class Foo"), None);
        assert_eq!(classify("/* Foo() */"), None);
        assert_eq!(classify("   "), None);
    }

    #[test]
    fn scans_directory_with_line_numbers() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("Foo.cs"),
            "namespace App\n{\n    public class Foo\n    {\n        public void Run() { }\n    }\n}\n",
        )
        .expect("write");
        std::fs::write(dir.path().join("Use.cs"), "class Use\n{\n    int Foo { get; }\n}\n")
            .expect("write");

        let report =
            find_definitions(dir.path(), "Foo", &ScanOptions::default()).expect("scan");
        assert!(report.skipped.is_empty());
        assert_eq!(report.results.len(), 2);

        let class = &report.results[0];
        assert_eq!(class.file_path, dir.path().join("Foo.cs"));
        assert_eq!(class.line_number, 3);
        assert_eq!(class.definition_line, "public class Foo");
        assert_eq!(class.kind, SymbolKind::ClassOrType);

        let prop = &report.results[1];
        assert_eq!(prop.line_number, 3);
        assert_eq!(prop.kind, SymbolKind::Property);
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let err = find_definitions(Path::new("."), " ", &ScanOptions::default())
            .expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::ArgumentError);
    }
}
