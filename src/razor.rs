//! Razor component splitter.
//!
//! Moves a component's `@code { ... }` block into a `<Name>.razor.cs`
//! partial class and its `<style>` block into `<Name>.razor.css`, leaving
//! the markup behind in the `.razor` file.

use std::ops::Range;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::error::{SurgeonError, SurgeonResult};
use crate::util::atomic::atomic_write;

/// `@code {` / `@functions {` at a line start or after a non-word character,
/// so `admin@code {` inside markup is left alone.
const CODE_BLOCK: &str = r"(?m)(?:^|[^\w@])(@(?:code|functions)\s*\{)";
const STYLE_BLOCK: &str = r"(?is)<style\b[^>]*>(.*?)</style\s*>";
const NAMESPACE_DIRECTIVE: &str = r"(?m)^[ \t]*@namespace[ \t]+([A-Za-z_][\w.]*)";
const USING_DIRECTIVE: &str = r"(?m)^[ \t]*@using[ \t]+([A-Za-z_][\w.]*)[ \t]*;?[ \t]*\r?$";

const COMPONENTS_NAMESPACE: &str = "Microsoft.AspNetCore.Components";
const MEMBER_INDENT: &str = "        ";

/// Files touched by [`split_razor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorSplit {
    pub razor_file: PathBuf,
    pub code_file: Option<PathBuf>,
    pub style_file: Option<PathBuf>,
    pub namespace: Option<String>,
}

impl RazorSplit {
    pub fn is_empty(&self) -> bool {
        self.code_file.is_none() && self.style_file.is_none()
    }
}

/// A `@code` block: the whole directive span and the text between its braces.
#[derive(Debug, PartialEq, Eq)]
struct CodeBlock {
    span: Range<usize>,
    body: Range<usize>,
}

/// Split the component at `razor_path`.
///
/// The code-behind namespace comes from the file's `@namespace` directive,
/// else `namespace_hint`. Existing `.razor.cs`/`.razor.css` files are never
/// overwritten. A component with neither block is left alone.
pub fn split_razor(razor_path: &Path, namespace_hint: Option<&str>) -> SurgeonResult<RazorSplit> {
    let text = std::fs::read_to_string(razor_path).map_err(|e| SurgeonError::io(razor_path, e))?;

    let code = find_code_block(&text)?;
    let style = find_style_block(&text)?;

    let mut split = RazorSplit {
        razor_file: razor_path.to_path_buf(),
        code_file: None,
        style_file: None,
        namespace: None,
    };
    if code.is_none() && style.is_none() {
        info!(path = %razor_path.display(), "nothing to split");
        return Ok(split);
    }

    let class_name = component_name(razor_path)?;
    let code_path = sibling(razor_path, &class_name, "razor.cs");
    let style_path = sibling(razor_path, &class_name, "razor.css");

    let mut pending: Vec<(PathBuf, String)> = Vec::new();
    let mut removals: Vec<Range<usize>> = Vec::new();

    if let Some(block) = &code {
        let namespace = declared_namespace(&text)?
            .or_else(|| namespace_hint.map(str::trim).filter(|ns| !ns.is_empty()).map(str::to_owned))
            .ok_or_else(|| {
                SurgeonError::argument(format!(
                    "{} has no @namespace directive; pass a root namespace",
                    razor_path.display()
                ))
            })?;
        let usings = razor_usings(&text)?;
        let members = reindent(&text[block.body.clone()], MEMBER_INDENT);
        pending.push((
            code_path.clone(),
            code_behind(&namespace, &class_name, &usings, &members),
        ));
        removals.push(block.span.clone());
        split.code_file = Some(code_path);
        split.namespace = Some(namespace);
    }

    if let Some((span, css)) = &style {
        pending.push((style_path.clone(), format!("{}\n", reindent(&text[css.clone()], ""))));
        removals.push(span.clone());
        split.style_file = Some(style_path);
    }

    for (path, _) in &pending {
        if path.exists() {
            return Err(SurgeonError::AlreadyExists { path: path.clone() });
        }
    }

    for (path, content) in &pending {
        atomic_write(path, content)?;
    }
    atomic_write(razor_path, &remove_spans(&text, removals))?;

    info!(
        path = %razor_path.display(),
        code = split.code_file.is_some(),
        style = split.style_file.is_some(),
        "razor component split"
    );
    Ok(split)
}

fn pattern(source: &str) -> SurgeonResult<Regex> {
    Regex::new(source).map_err(|e| SurgeonError::Parse(format!("razor pattern: {e}")))
}

fn find_code_block(text: &str) -> SurgeonResult<Option<CodeBlock>> {
    let Some(m) = pattern(CODE_BLOCK)?
        .captures(text)
        .and_then(|caps| caps.get(1))
    else {
        return Ok(None);
    };
    let open = m.end() - 1;
    let close = matching_brace(text, open)
        .ok_or_else(|| SurgeonError::Parse("unterminated @code block".to_owned()))?;
    Ok(Some(CodeBlock {
        span: m.start()..close + 1,
        body: open + 1..close,
    }))
}

/// Whole `<style>` element span and the CSS inside it.
fn find_style_block(text: &str) -> SurgeonResult<Option<(Range<usize>, Range<usize>)>> {
    Ok(pattern(STYLE_BLOCK)?.captures(text).and_then(|caps| {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        Some((whole.range(), inner.range()))
    }))
}

fn declared_namespace(text: &str) -> SurgeonResult<Option<String>> {
    Ok(pattern(NAMESPACE_DIRECTIVE)?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned()))
}

/// Namespaces imported with `@using`, plus the components namespace, deduplicated
/// in first-seen order.
fn razor_usings(text: &str) -> SurgeonResult<Vec<String>> {
    let mut usings = vec![COMPONENTS_NAMESPACE.to_owned()];
    for caps in pattern(USING_DIRECTIVE)?.captures_iter(text) {
        if let Some(ns) = caps.get(1).map(|m| m.as_str()) {
            if !usings.iter().any(|u| u == ns) {
                usings.push(ns.to_owned());
            }
        }
    }
    Ok(usings)
}

/// Index of the `}` closing the `{` at `open`, skipping braces inside
/// comments, string literals and character literals.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = text[i..].find('\n').map_or(bytes.len(), |p| i + p);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                continue;
            }
            b'"' => {
                let verbatim = (i > 0 && bytes[i - 1] == b'@')
                    || (i > 1 && bytes[i - 1] == b'$' && bytes[i - 2] == b'@');
                i = skip_quoted(bytes, i, b'"', verbatim);
                continue;
            }
            b'\'' => {
                i = skip_quoted(bytes, i, b'\'', false);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Position just past the literal opened by `quote` at `start`.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8, verbatim: bool) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if verbatim {
            if b == quote {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                    continue;
                }
                return i + 1;
            }
        } else if b == b'\\' {
            i += 2;
            continue;
        } else if b == quote {
            return i + 1;
        } else if b == b'\n' {
            return i;
        }
        i += 1;
    }
    bytes.len()
}

fn component_name(razor_path: &Path) -> SurgeonResult<String> {
    razor_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SurgeonError::argument(format!("{} has no component name", razor_path.display()))
        })
}

fn sibling(razor_path: &Path, name: &str, extension: &str) -> PathBuf {
    razor_path.with_file_name(format!("{name}.{extension}"))
}

fn code_behind(namespace: &str, class_name: &str, usings: &[String], members: &str) -> String {
    let mut out = String::new();
    for using in usings {
        out.push_str(&format!("using {using};\n"));
    }
    out.push_str(&format!(
        "\nnamespace {namespace}\n{{\n    public partial class {class_name}\n    {{\n"
    ));
    if !members.is_empty() {
        out.push_str(members);
        out.push('\n');
    }
    out.push_str("    }\n}\n");
    out
}

/// Strip the common indentation of `text`, drop leading/trailing blank
/// lines, and prefix every non-blank line with `indent`.
/// Longest shared prefix of `a` and `b`, cut on a char boundary.
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx);
    &a[..end]
}

fn reindent(text: &str, indent: &str) -> String {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end()).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let common = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| &l[..l.len() - l.trim_start().len()])
        .reduce(common_prefix)
        .map_or(0, str::len);

    lines
        .iter()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{indent}{}", &l[common..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove each span, widening it to whole lines when nothing else shares
/// them, and collapse the blank lines left at the end.
fn remove_spans(text: &str, mut spans: Vec<Range<usize>>) -> String {
    spans.sort_by_key(|r| std::cmp::Reverse(r.start));
    let mut out = text.to_owned();
    for span in spans {
        let span = widen_to_lines(&out, span);
        out.replace_range(span, "");
    }
    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else if text.ends_with('\n') {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        format!("{trimmed}{newline}")
    } else {
        trimmed.to_owned()
    }
}

fn widen_to_lines(text: &str, span: Range<usize>) -> Range<usize> {
    let line_start = text[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[span.end..]
        .find('\n')
        .map_or(text.len(), |i| span.end + i + 1);

    let before_blank = text[line_start..span.start].trim().is_empty();
    let after_blank = text[span.end..line_end].trim().is_empty();
    if before_blank && after_blank {
        line_start..line_end
    } else {
        span
    }
}
