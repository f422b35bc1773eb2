use similar::{ChangeTag, TextDiff};

/// Line diff of `old` against `new`, one `+`, `-` or ` ` prefixed line per change
pub fn render_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut result = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        // Display already terminates a final line that lacks its newline
        result.push_str(&format!("{}{}", sign, change));
    }

    result
}
