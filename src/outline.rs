//! Structural outline of a C# file.
//!
//! [`extract`] walks the syntax tree once and returns a flattened list: each
//! type declaration followed by its direct method and property members. The
//! members are also attached to the type's `children`, so callers can read
//! the result either as a flat list or as a tree.

use tree_sitter::Node;

use crate::error::{SurgeonError, SurgeonResult};
use crate::model::{CodeItem, CodeItemKind};
use crate::syntax::{self, SyntaxTree};

fn type_kind(node_kind: &str) -> Option<CodeItemKind> {
    match node_kind {
        syntax::CLASS_DECLARATION => Some(CodeItemKind::Class),
        syntax::STRUCT_DECLARATION => Some(CodeItemKind::Struct),
        syntax::INTERFACE_DECLARATION => Some(CodeItemKind::Interface),
        syntax::RECORD_DECLARATION | syntax::RECORD_STRUCT_DECLARATION => {
            Some(CodeItemKind::Record)
        }
        syntax::ENUM_DECLARATION => Some(CodeItemKind::Enum),
        _ => None,
    }
}

/// Extract the outline of `source`.
pub fn extract(source: &str) -> SurgeonResult<Vec<CodeItem>> {
    let tree = SyntaxTree::parse(source)?;
    let mut items = Vec::new();

    for node in tree.descendants() {
        let Some(kind) = type_kind(node.kind()) else {
            continue;
        };

        let mut type_item = item(&tree, node, kind, String::new());
        let members = members(&tree, node);
        type_item.children.clone_from(&members);
        items.push(type_item);
        items.extend(members);
    }

    tracing::debug!(items = items.len(), "extracted outline");
    Ok(items)
}

/// Direct method/property members of a type declaration, in source order.
fn members(tree: &SyntaxTree, type_node: Node<'_>) -> Vec<CodeItem> {
    let Some(body) = type_node.child_by_field_name("body") else {
        return Vec::new();
    };

    syntax::named_children(body)
        .into_iter()
        .filter_map(|member| match member.kind() {
            syntax::METHOD_DECLARATION => {
                let signature = tree.field_text(member, "parameters").to_owned();
                Some(item(tree, member, CodeItemKind::Method, signature))
            }
            syntax::PROPERTY_DECLARATION => {
                let signature = tree.field_text(member, "type").to_owned();
                Some(item(tree, member, CodeItemKind::Property, signature))
            }
            _ => None,
        })
        .collect()
}

fn item(tree: &SyntaxTree, node: Node<'_>, kind: CodeItemKind, signature: String) -> CodeItem {
    let modifiers = syntax::children(node)
        .into_iter()
        .filter(|c| c.kind() == syntax::MODIFIER)
        .map(|c| tree.text(c).to_owned())
        .collect();

    CodeItem {
        kind,
        name: tree.field_text(node, "name").to_owned(),
        signature,
        content: tree.text(node).to_owned(),
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        modifiers,
        children: Vec::new(),
    }
}

/// Text of the first method named `method_name`: its block, or its
/// `=> expr` clause when expression-bodied.
pub fn method_body(source: &str, method_name: &str) -> SurgeonResult<String> {
    let tree = SyntaxTree::parse(source)?;
    let method = tree
        .find_method(method_name)
        .ok_or_else(|| SurgeonError::MethodNotFound {
            name: method_name.to_owned(),
        })?;

    syntax::children(method)
        .into_iter()
        .find(|c| matches!(c.kind(), syntax::BLOCK | syntax::ARROW_EXPRESSION_CLAUSE))
        .map(|body| tree.text(body).to_owned())
        .ok_or_else(|| SurgeonError::MissingBody {
            name: method_name.to_owned(),
        })
}
