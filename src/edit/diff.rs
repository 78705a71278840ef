//! Unified diffs of edited C# text, rendered with `similar`.

use similar::{Algorithm, ChangeTag, TextDiff};

/// Unified diff of `before` → `after` (patience algorithm), headed
/// `a/<label>` / `b/<label>`.
pub fn unified_diff(label: &str, before: &str, after: &str) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(before, after);

    diff.unified_diff()
        .context_radius(3)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string()
}

/// Lines added and removed going from `before` to `after`.
pub fn line_counts(before: &str, after: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(before, after);
    diff.iter_all_changes()
        .fold((0, 0), |(added, removed), change| match change.tag() {
            ChangeTag::Insert => (added + 1, removed),
            ChangeTag::Delete => (added, removed + 1),
            ChangeTag::Equal => (added, removed),
        })
}

/// Reply text for an edit: the diff, or a note when nothing changed.
pub fn describe_edit(label: &str, before: &str, after: &str) -> String {
    if before == after {
        return format!("No changes to {label}");
    }
    let (added, removed) = line_counts(before, after);
    format!(
        "Updated {label} (+{added} -{removed})\n\n{}",
        unified_diff(label, before, after)
    )
}
