//! `using` directive injection.

use tree_sitter::Node;

use crate::error::{SurgeonError, SurgeonResult};
use crate::syntax::{self, SyntaxTree, TextEdit};

/// Make sure `source` has a top-level `using <import_path>;`.
///
/// Comparison against existing directives is plain text equality on the
/// imported path, with `static` and alias prefixes stripped on both sides;
/// no sorting and no near-duplicate detection. A new directive goes right
/// after the last top-level `using`.
pub fn ensure_import(source: &str, import_path: &str) -> SurgeonResult<String> {
    let wanted = normalize_path(import_path)?;
    let tree = SyntaxTree::parse(source)?;
    let top_level = syntax::named_children(tree.root());

    let usings: Vec<Node<'_>> = top_level
        .iter()
        .copied()
        .filter(|n| n.kind() == syntax::USING_DIRECTIVE)
        .collect();

    let target = imported_path(&wanted);
    if usings.iter().any(|u| imported_path(tree.text(*u)) == target) {
        tracing::debug!(import = %wanted, "using already present");
        return Ok(source.to_owned());
    }

    let newline = tree.newline();
    let directive = format!("using {wanted};");
    let edit = match usings.last() {
        Some(last) => after_directive(source, *last, &directive, newline),
        None => before_declarations(source, &top_level, &directive, newline),
    };

    tracing::debug!(import = %wanted, at = edit.range.start, "adding using");
    Ok(edit.apply(source))
}

fn normalize_path(import_path: &str) -> SurgeonResult<String> {
    if import_path.contains([';', '\n', '\r']) {
        return Err(SurgeonError::argument(format!(
            "import path must be a single name, got {import_path:?}"
        )));
    }
    let normalized = import_path.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(SurgeonError::argument("import path is empty"));
    }
    Ok(normalized)
}

/// The name a directive imports: `global using static A.B;` → `A.B`,
/// `using X = A.B;` → `A.B`.
fn imported_path(directive: &str) -> &str {
    let mut rest = directive.trim().trim_end_matches(';').trim_end();
    for keyword in ["global", "using", "static", "unsafe"] {
        rest = strip_keyword(rest, keyword);
    }
    rest.split_once('=').map_or(rest, |(_, target)| target).trim()
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> &'a str {
    match text.strip_prefix(keyword) {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => text,
    }
}

fn after_directive(source: &str, last: Node<'_>, directive: &str, newline: &str) -> TextEdit {
    let end = last.end_byte();
    let rest_of_line = source[end..].split('\n').next().unwrap_or_default();
    let trailing = rest_of_line.trim();

    if trailing.is_empty() || trailing.starts_with("//") {
        match source[end..].find('\n') {
            Some(offset) => TextEdit::insert(end + offset + 1, format!("{directive}{newline}")),
            None => TextEdit::insert(source.len(), format!("{newline}{directive}{newline}")),
        }
    } else {
        // Something else shares the line with the last directive.
        TextEdit::insert(end, format!("{newline}{directive}"))
    }
}

/// Insert before the first declaration, keeping header comments above the
/// new directive and doc comments attached to the declaration they describe.
fn before_declarations(
    source: &str,
    top_level: &[Node<'_>],
    directive: &str,
    newline: &str,
) -> TextEdit {
    let first_decl = top_level
        .iter()
        .position(|n| !matches!(n.kind(), syntax::COMMENT | syntax::EXTERN_ALIAS_DIRECTIVE));

    let Some(index) = first_decl else {
        let lead = if source.is_empty() || source.ends_with('\n') { "" } else { newline };
        return TextEdit::insert(source.len(), format!("{lead}{directive}{newline}"));
    };

    let mut anchor = top_level[index];
    for prev in top_level[..index].iter().rev() {
        if prev.kind() != syntax::COMMENT {
            break;
        }
        let gap = &source[prev.end_byte()..anchor.start_byte()];
        if gap.matches('\n').count() > 1 {
            break;
        }
        anchor = *prev;
    }

    let line_start = source[..anchor.start_byte()]
        .rfind('\n')
        .map_or(0, |i| i + 1);
    TextEdit::insert(line_start, format!("{directive}{newline}"))
}
