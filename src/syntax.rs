//! Thin wrapper over tree-sitter's C# grammar.
//!
//! Everything above this module talks in terms of [`SyntaxTree`] (parse,
//! pre-order traversal, node text) and [`TextEdit`] (splice one byte range,
//! leave the rest of the text untouched). Trees are never printed back to
//! text; edits are applied to the source they were parsed from.

use std::ops::Range;

use tree_sitter::{Node, Parser, Tree};

use crate::error::{SurgeonError, SurgeonResult};

pub const CLASS_DECLARATION: &str = "class_declaration";
pub const STRUCT_DECLARATION: &str = "struct_declaration";
pub const INTERFACE_DECLARATION: &str = "interface_declaration";
pub const RECORD_DECLARATION: &str = "record_declaration";
pub const RECORD_STRUCT_DECLARATION: &str = "record_struct_declaration";
pub const ENUM_DECLARATION: &str = "enum_declaration";
pub const METHOD_DECLARATION: &str = "method_declaration";
pub const PROPERTY_DECLARATION: &str = "property_declaration";
pub const NAMESPACE_DECLARATION: &str = "namespace_declaration";
pub const FILE_SCOPED_NAMESPACE_DECLARATION: &str = "file_scoped_namespace_declaration";
pub const USING_DIRECTIVE: &str = "using_directive";
pub const EXTERN_ALIAS_DIRECTIVE: &str = "extern_alias_directive";
pub const BLOCK: &str = "block";
pub const ARROW_EXPRESSION_CLAUSE: &str = "arrow_expression_clause";
pub const MODIFIER: &str = "modifier";
pub const COMMENT: &str = "comment";

/// Parsed C# source together with the text it was parsed from.
pub struct SyntaxTree {
    source: String,
    tree: Tree,
}

impl SyntaxTree {
    /// Parse `source` with the C# grammar.
    ///
    /// tree-sitter recovers from syntax errors, so this only fails when the
    /// parser yields no tree at all. Use [`SyntaxTree::has_errors`] to reject
    /// fragments that must be well-formed.
    pub fn parse(source: &str) -> SurgeonResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| SurgeonError::Parse(format!("failed to load C# grammar: {e}")))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SurgeonError::Parse("parser produced no tree".to_owned()))?;
        Ok(Self {
            source: source.to_owned(),
            tree,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    /// All nodes in document (pre-order) order, root included.
    pub fn descendants(&self) -> Vec<Node<'_>> {
        let mut out = Vec::new();
        let mut cursor = self.tree.walk();
        loop {
            out.push(cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return out;
                }
            }
        }
    }

    /// First node in document order whose kind is one of `kinds`.
    pub fn find_first(&self, kinds: &[&str]) -> Option<Node<'_>> {
        self.descendants()
            .into_iter()
            .find(|n| kinds.contains(&n.kind()))
    }

    /// First method declaration named exactly `name`.
    pub fn find_method(&self, name: &str) -> Option<Node<'_>> {
        self.descendants().into_iter().find(|n| {
            n.kind() == METHOD_DECLARATION
                && n.child_by_field_name("name").map(|id| self.text(id)) == Some(name)
        })
    }

    /// Text of the node's `field` child, empty when the field is absent.
    pub fn field_text(&self, node: Node<'_>, field: &str) -> &str {
        node.child_by_field_name(field)
            .map_or("", |child| self.text(child))
    }

    /// Leading whitespace of the line `node` starts on.
    pub fn line_indent(&self, node: Node<'_>) -> &str {
        let line_start = self.source[..node.start_byte()]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let line = &self.source[line_start..];
        let width = line.len() - line.trim_start_matches([' ', '\t']).len();
        &line[..width]
    }

    /// Line break style used by the file (`\r\n` if any line ends with it).
    pub fn newline(&self) -> &'static str {
        if self.source.contains("\r\n") { "\r\n" } else { "\n" }
    }
}

/// Direct children of `node`, named and anonymous.
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named direct children of `node`.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// One contiguous replacement inside a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }

    /// Splice the edit into `source`; bytes outside the range are copied as-is.
    pub fn apply(&self, source: &str) -> String {
        let mut out =
            String::with_capacity(source.len() - self.range.len() + self.replacement.len());
        out.push_str(&source[..self.range.start]);
        out.push_str(&self.replacement);
        out.push_str(&source[self.range.end..]);
        out
    }
}
