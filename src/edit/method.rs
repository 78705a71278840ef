//! Method body replacement.

use tree_sitter::Node;

use crate::error::{SurgeonError, SurgeonResult};
use crate::syntax::{self, SyntaxTree, TextEdit};

const WRAPPER_METHOD: &str = "__SurgeonBody";

/// Replace the body of the first method named `method_name` with
/// `new_body`, a sequence of statements (no enclosing braces).
///
/// Expression-bodied and body-less methods become block-bodied. The new
/// block is rendered one statement per line, one indent level deeper than
/// the method; nothing else in `source` changes.
pub fn replace_method_body(
    source: &str,
    method_name: &str,
    new_body: &str,
) -> SurgeonResult<String> {
    let tree = SyntaxTree::parse(source)?;
    let method = tree
        .find_method(method_name)
        .ok_or_else(|| SurgeonError::MethodNotFound {
            name: method_name.to_owned(),
        })?;

    let statements = parse_statements(new_body)?;
    let indent = tree.line_indent(method);
    let unit = if indent.contains('\t') { "\t" } else { "    " };
    let block = render_block(&statements, indent, unit, tree.newline());

    let edit = body_edit(&tree, method, &block)?;
    tracing::debug!(
        method = method_name,
        range = ?edit.range,
        statements = statements.len(),
        "replacing method body"
    );
    Ok(edit.apply(source))
}

/// Parse `body` as the contents of a block and return each statement's
/// lines with the statement's own indentation removed.
fn parse_statements(body: &str) -> SurgeonResult<Vec<Vec<String>>> {
    let wrapped = format!(
        "class __SurgeonWrapper\n{{\nvoid {WRAPPER_METHOD}()\n{{\n{body}\n}}\n}}\n"
    );
    let tree = SyntaxTree::parse(&wrapped)?;
    if tree.has_errors() {
        return Err(SurgeonError::Parse(
            "new body is not a valid statement list".to_owned(),
        ));
    }

    // A stray `}` in the body would close the wrapper early and leak
    // declarations into the class; the wrapper must hold only our method.
    let class = tree
        .find_first(&[syntax::CLASS_DECLARATION])
        .and_then(|c| c.child_by_field_name("body"));
    let member_count = class.map_or(0, |body| {
        syntax::named_children(body)
            .iter()
            .filter(|n| n.kind() != syntax::COMMENT)
            .count()
    });
    let block = tree
        .find_method(WRAPPER_METHOD)
        .and_then(|m| syntax::children(m).into_iter().find(|c| c.kind() == syntax::BLOCK));
    let (Some(block), 1) = (block, member_count) else {
        return Err(SurgeonError::Parse(
            "new body must not close the enclosing block".to_owned(),
        ));
    };

    let mut statements: Vec<Vec<String>> = Vec::new();
    let mut previous: Option<Node<'_>> = None;
    for node in syntax::named_children(block) {
        // A comment on the same row as the previous statement stays on its line.
        if let (syntax::COMMENT, Some(prev)) = (node.kind(), previous) {
            if node.start_position().row == prev.end_position().row {
                if let Some(line) = statements.last_mut().and_then(|s| s.last_mut()) {
                    line.push_str(&tree.source()[prev.end_byte()..node.start_byte()]);
                    line.push_str(tree.text(node));
                    previous = Some(node);
                    continue;
                }
            }
        }
        statements.push(dedent(tree.text(node), node.start_position().column));
        previous = Some(node);
    }
    Ok(statements)
}

/// Split a statement into lines, stripping up to `column` leading
/// whitespace characters from every line after the first.
fn dedent(text: &str, column: usize) -> Vec<String> {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                return line.to_owned();
            }
            let strip = line
                .char_indices()
                .take(column)
                .take_while(|(_, c)| c.is_whitespace())
                .last()
                .map_or(0, |(idx, c)| idx + c.len_utf8());
            line[strip..].trim_end().to_owned()
        })
        .collect()
}

fn render_block(statements: &[Vec<String>], indent: &str, unit: &str, newline: &str) -> String {
    let mut out = String::from("{");
    out.push_str(newline);
    for line in statements.iter().flatten() {
        let directive = line.trim_start();
        if directive.starts_with('#') {
            // Preprocessor directives live at column 0.
            out.push_str(directive);
        } else if !line.is_empty() {
            out.push_str(indent);
            out.push_str(unit);
            out.push_str(line);
        }
        out.push_str(newline);
    }
    out.push_str(indent);
    out.push('}');
    out
}

/// Range covering the current body and the text to put there.
fn body_edit(tree: &SyntaxTree, method: Node<'_>, block: &str) -> SurgeonResult<TextEdit> {
    let children = syntax::children(method);

    if let Some(body) = children.iter().find(|c| c.kind() == syntax::BLOCK) {
        return Ok(TextEdit::replace(body.byte_range(), block));
    }

    // `=> expr;` or a bare `;`: drop both and open a block on the next line.
    let (start_node, end) = if let Some(arrow) = children
        .iter()
        .find(|c| c.kind() == syntax::ARROW_EXPRESSION_CLAUSE)
    {
        let end = children
            .iter()
            .find(|c| c.kind() == ";" && c.start_byte() >= arrow.end_byte())
            .map_or(arrow.end_byte(), Node::end_byte);
        (*arrow, end)
    } else {
        let semicolon = children
            .iter()
            .rev()
            .find(|c| c.kind() == ";")
            .ok_or_else(|| SurgeonError::Parse("method declaration has no body slot".to_owned()))?;
        (*semicolon, semicolon.end_byte())
    };
    let start = start_node
        .prev_sibling()
        .map_or(start_node.start_byte(), |prev| prev.end_byte());

    let indent = tree.line_indent(method);
    Ok(TextEdit::replace(
        start..end,
        format!("{}{indent}{block}", tree.newline()),
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;

    const SAMPLE: &str = "
public class TestClass
{
    public void Method1()
    {
        int a = 1;
    }

    public int Keep() => 7;
}";

    #[test]
    fn replaces_statements() {
        let out = replace_method_body(SAMPLE, "Method1", "\n        int b = 2;\n        return;")
            .expect("replace");
        assert!(out.contains("int b = 2;"));
        assert!(!out.contains("int a = 1;"));
    }

    #[test]
    fn renders_one_statement_per_line_and_keeps_the_rest() {
        let out = replace_method_body(SAMPLE, "Method1", "int b = 2; return;").expect("replace");
        let expected = "
public class TestClass
{
    public void Method1()
    {
        int b = 2;
        return;
    }

    public int Keep() => 7;
}";
        assert_eq!(out, expected);
    }

    #[test]
    fn expression_body_becomes_block() {
        let out = replace_method_body(SAMPLE, "Keep", "return 8;").expect("replace");
        assert!(out.contains("    public int Keep()\n    {\n        return 8;\n    }\n}"));
        assert!(!out.contains("=> 7"));
        assert!(out.contains("int a = 1;"));
    }

    #[test]
    fn multi_line_statements_are_reindented() {
        let body = "if (x)\n{\n    Run();\n}";
        let out = replace_method_body(SAMPLE, "Method1", body).expect("replace");
        assert!(out.contains("    {\n        if (x)\n        {\n            Run();\n        }\n    }"));
    }

    #[test]
    fn first_overload_wins() {
        let src = "class A { void M(int x) { One(); } void M() { Two(); } }";
        let out = replace_method_body(src, "M", "Three();").expect("replace");
        assert!(!out.contains("One();"));
        assert!(out.contains("Two();"));
    }

    #[test]
    fn unknown_method_is_not_found() {
        let err = replace_method_body(SAMPLE, "Missing", "return;").expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn invalid_body_is_a_parse_error() {
        let err = replace_method_body(SAMPLE, "Method1", "int = ;").expect_err("bad body");
        assert_eq!(err.kind(), ErrorKind::ParseError);
        let err =
            replace_method_body(SAMPLE, "Method1", "} void Evil() {").expect_err("escape");
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn empty_body_renders_empty_block() {
        let out = replace_method_body(SAMPLE, "Method1", "").expect("replace");
        assert!(out.contains("public void Method1()\n    {\n    }"));
    }

    #[test]
    fn trailing_comment_stays_on_its_statement_line() {
        let out = replace_method_body(SAMPLE, "Method1", "int b = 2; // note\nreturn;")
            .expect("replace");
        assert!(out.contains("    {\n        int b = 2; // note\n        return;\n    }"));
    }

    #[test]
    fn own_line_comment_keeps_its_own_line() {
        let out = replace_method_body(SAMPLE, "Method1", "int b = 2;\n// note\nreturn;")
            .expect("replace");
        assert!(out.contains("        int b = 2;\n        // note\n        return;"));
    }

    #[test]
    fn preprocessor_lines_stay_at_column_zero() {
        let body = "#if DEBUG\nLog();\n#endif\nreturn;";
        let out = replace_method_body(SAMPLE, "Method1", body).expect("replace");
        assert!(out.contains("    {\n#if DEBUG\n        Log();\n#endif\n        return;\n    }"));
    }

    #[test]
    fn tab_indented_methods_use_tabs() {
        let src = "class A\n{\n\tvoid M()\n\t{\n\t}\n}\n";
        let out = replace_method_body(src, "M", "Run();").expect("replace");
        assert_eq!(out, "class A\n{\n\tvoid M()\n\t{\n\t\tRun();\n\t}\n}\n");
    }
}
