//! Edit appliers.
//!
//! Every edit family implements [`Edit`]: it takes the current state by value
//! and hands back the next state together with an outcome. The executor folds
//! a batch through these calls, so edit `i + 1` always sees the output of
//! edit `i`.

use super::descriptor::{Insertion, LiteralReplace, RegexReplace, Removal};

/// Longest excerpt of a search string or pattern quoted in an error
const EXCERPT_LEN: usize = 50;

/// In-memory form of a file that an edit family works on
pub trait EditState: Sized {
    fn parse(content: &str) -> Self;
    fn render(&self) -> String;
}

impl EditState for String {
    fn parse(content: &str) -> Self {
        content.to_string()
    }

    fn render(&self) -> String {
        self.clone()
    }
}

/// File content split on `\n`. A trailing newline survives as a final empty
/// line, so `render(parse(s)) == s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lines(Vec<String>);

impl Lines {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    fn position(&self, anchor: &str) -> Option<usize> {
        self.0.iter().position(|line| line.contains(anchor))
    }
}

impl EditState for Lines {
    fn parse(content: &str) -> Self {
        Lines(content.split('\n').map(str::to_string).collect())
    }

    fn render(&self) -> String {
        self.0.join("\n")
    }
}

impl<S: Into<String>> FromIterator<S> for Lines {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Lines(iter.into_iter().map(Into::into).collect())
    }
}

/// Next state plus whether the edit took effect
#[derive(Debug)]
pub struct Step<S> {
    pub state: S,
    pub outcome: Result<(), String>,
}

impl<S> Step<S> {
    fn applied(state: S) -> Self {
        Self {
            state,
            outcome: Ok(()),
        }
    }

    fn skipped(state: S, reason: impl Into<String>) -> Self {
        Self {
            state,
            outcome: Err(reason.into()),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A single edit that can be attempted against the current state
pub trait Edit {
    type State: EditState;

    fn apply(&self, state: Self::State) -> Step<Self::State>;

    /// Short label used in logs
    fn label(&self) -> String;
}

impl Edit for LiteralReplace {
    type State = String;

    fn apply(&self, text: String) -> Step<String> {
        if !text.contains(&self.search) {
            return Step::skipped(
                text,
                format!("search string not found: \"{}\"", excerpt(&self.search)),
            );
        }

        let next = text.replacen(&self.search, &self.replace, 1);
        Step::applied(next)
    }

    fn label(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("replace \"{}\"", excerpt(&self.search)))
    }
}

impl Edit for RegexReplace {
    type State = String;

    fn apply(&self, text: String) -> Step<String> {
        if !self.pattern.is_match(&text) {
            return Step::skipped(
                text,
                format!("pattern not matched: /{}/", excerpt(self.pattern.as_str())),
            );
        }

        let replacement = self.replacement.as_str();
        let next = if self.replace_all {
            self.pattern.replace_all(&text, replacement).into_owned()
        } else {
            self.pattern.replace(&text, replacement).into_owned()
        };
        Step::applied(next)
    }

    fn label(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("regex /{}/", excerpt(self.pattern.as_str())))
    }
}

impl Edit for Insertion {
    type State = Lines;

    fn apply(&self, lines: Lines) -> Step<Lines> {
        let (index, code) = match self {
            Insertion::AfterAnchor { anchor, .. } | Insertion::BeforeAnchor { anchor, .. }
                if anchor.is_empty() =>
            {
                return Step::skipped(lines, "anchor text is empty");
            }
            Insertion::AfterAnchor { anchor, code } => match lines.position(anchor) {
                Some(found) => (found + 1, code),
                None => return Step::skipped(lines, anchor_not_found(anchor)),
            },
            Insertion::BeforeAnchor { anchor, code } => match lines.position(anchor) {
                Some(found) => (found, code),
                None => return Step::skipped(lines, anchor_not_found(anchor)),
            },
            Insertion::AtLine { line, code } => ((*line).min(lines.len()), code),
        };

        let mut next = lines.into_inner();
        next.insert(index, code.clone());
        Step::applied(Lines(next))
    }

    fn label(&self) -> String {
        match self {
            Insertion::AfterAnchor { anchor, .. } => {
                format!("insert after \"{}\"", excerpt(anchor))
            }
            Insertion::BeforeAnchor { anchor, .. } => {
                format!("insert before \"{}\"", excerpt(anchor))
            }
            Insertion::AtLine { line, .. } => format!("insert at line {}", line),
        }
    }
}

impl Edit for Removal {
    type State = Lines;

    fn apply(&self, lines: Lines) -> Step<Lines> {
        let before = lines.len();

        let next: Vec<String> = match self {
            Removal::LineNumber(index) => {
                if *index >= before {
                    let reason = format!("line {} out of range ({} lines)", index, before);
                    return Step::skipped(lines, reason);
                }
                let mut next = lines.into_inner();
                next.remove(*index);
                next
            }
            Removal::Contains(text)
            | Removal::Prefix(text)
            | Removal::Suffix(text)
            | Removal::ExactLine(text)
                if text.is_empty() =>
            {
                return Step::skipped(lines, "match text is empty");
            }
            Removal::Contains(text) => retain(lines, |line| !line.contains(text.as_str())),
            Removal::Prefix(prefix) => {
                retain(lines, |line| !line.trim().starts_with(prefix.as_str()))
            }
            Removal::Suffix(suffix) => {
                retain(lines, |line| !line.trim().ends_with(suffix.as_str()))
            }
            Removal::ExactLine(exact) => retain(lines, |line| line != exact),
        };

        if next.len() < before {
            Step::applied(Lines(next))
        } else {
            Step::skipped(Lines(next), "no matching lines")
        }
    }

    fn label(&self) -> String {
        match self {
            Removal::Contains(text) => format!("remove lines containing \"{}\"", excerpt(text)),
            Removal::Prefix(text) => format!("remove lines starting with \"{}\"", excerpt(text)),
            Removal::Suffix(text) => format!("remove lines ending with \"{}\"", excerpt(text)),
            Removal::ExactLine(text) => format!("remove lines equal to \"{}\"", excerpt(text)),
            Removal::LineNumber(index) => format!("remove line {}", index),
        }
    }
}

fn retain(lines: Lines, keep: impl Fn(&String) -> bool) -> Vec<String> {
    lines.into_inner().into_iter().filter(|line| keep(line)).collect()
}

fn anchor_not_found(anchor: &str) -> String {
    format!("anchor text not found: \"{}\"", excerpt(anchor))
}

/// First `EXCERPT_LEN` characters of `text`, with an ellipsis when cut
fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
