use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::{EditError, Result};

/// Replace the first occurrence of `search` with `replace`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiteralReplace {
    /// Exact text to look for
    pub search: String,

    /// Text substituted for the first occurrence
    pub replace: String,

    /// Free-form note shown in logs and reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LiteralReplace {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
            description: None,
        }
    }
}

/// Regex substitution. Whether one or every match is replaced is decided by
/// `replace_all`, never by the pattern itself.
#[derive(Debug, Clone)]
pub struct RegexReplace {
    pub pattern: Regex,

    /// Replacement text; `$1` and `${name}` expand capture groups
    pub replacement: String,

    pub replace_all: bool,

    pub description: Option<String>,
}

impl RegexReplace {
    /// Compile `pattern` into a first-match replacement
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| EditError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self::from_regex(regex, replacement, false))
    }

    pub fn from_regex(pattern: Regex, replacement: impl Into<String>, replace_all: bool) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
            replace_all,
            description: None,
        }
    }

    /// Replace every match instead of only the first
    pub fn all(mut self) -> Self {
        self.replace_all = true;
        self
    }
}

/// Line-oriented insertion.
///
/// Insertions run in order against the already-shifted line array, so an
/// `AtLine` index refers to the file as left by every earlier insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Insertion {
    /// Insert `code` below the first line containing `anchor`
    AfterAnchor { anchor: String, code: String },

    /// Insert `code` above the first line containing `anchor`
    BeforeAnchor { anchor: String, code: String },

    /// Insert `code` at a 0-based line index; past-the-end indices append
    AtLine { line: usize, code: String },
}

/// Line-oriented removal.
///
/// Predicate removals drop every matching line. `LineNumber` is 0-based and,
/// like `Insertion::AtLine`, is resolved against the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Removal {
    Contains(String),

    /// Lines whose trimmed text starts with the prefix
    Prefix(String),

    /// Lines whose trimmed text ends with the suffix
    Suffix(String),

    ExactLine(String),

    LineNumber(usize),
}

/// The four edit families. A batch only ever holds edits of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditFamily {
    Replace,
    Regex,
    Insert,
    Remove,
}

impl fmt::Display for EditFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditFamily::Replace => "replace",
            EditFamily::Regex => "regex",
            EditFamily::Insert => "insert",
            EditFamily::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// One requested change, of any family
#[derive(Debug, Clone)]
pub enum EditDescriptor {
    Literal(LiteralReplace),
    Regex(RegexReplace),
    Insert(Insertion),
    Remove(Removal),
}

impl EditDescriptor {
    pub fn family(&self) -> EditFamily {
        match self {
            EditDescriptor::Literal(_) => EditFamily::Replace,
            EditDescriptor::Regex(_) => EditFamily::Regex,
            EditDescriptor::Insert(_) => EditFamily::Insert,
            EditDescriptor::Remove(_) => EditFamily::Remove,
        }
    }
}

impl From<LiteralReplace> for EditDescriptor {
    fn from(edit: LiteralReplace) -> Self {
        EditDescriptor::Literal(edit)
    }
}

impl From<RegexReplace> for EditDescriptor {
    fn from(edit: RegexReplace) -> Self {
        EditDescriptor::Regex(edit)
    }
}

impl From<Insertion> for EditDescriptor {
    fn from(edit: Insertion) -> Self {
        EditDescriptor::Insert(edit)
    }
}

impl From<Removal> for EditDescriptor {
    fn from(edit: Removal) -> Self {
        EditDescriptor::Remove(edit)
    }
}

/// Ordered edits of a single family
#[derive(Debug, Clone)]
pub enum EditSet {
    Literal(Vec<LiteralReplace>),
    Regex(Vec<RegexReplace>),
    Insert(Vec<Insertion>),
    Remove(Vec<Removal>),
}

impl EditSet {
    /// Group untyped descriptors, rejecting any batch that mixes families.
    /// An empty list becomes an empty literal set.
    pub fn from_descriptors(descriptors: Vec<EditDescriptor>) -> Result<Self> {
        let expected = match descriptors.first() {
            Some(first) => first.family(),
            None => return Ok(EditSet::Literal(Vec::new())),
        };

        let mut set = match expected {
            EditFamily::Replace => EditSet::Literal(Vec::with_capacity(descriptors.len())),
            EditFamily::Regex => EditSet::Regex(Vec::with_capacity(descriptors.len())),
            EditFamily::Insert => EditSet::Insert(Vec::with_capacity(descriptors.len())),
            EditFamily::Remove => EditSet::Remove(Vec::with_capacity(descriptors.len())),
        };

        for (i, descriptor) in descriptors.into_iter().enumerate() {
            match (&mut set, descriptor) {
                (EditSet::Literal(edits), EditDescriptor::Literal(edit)) => edits.push(edit),
                (EditSet::Regex(edits), EditDescriptor::Regex(edit)) => edits.push(edit),
                (EditSet::Insert(edits), EditDescriptor::Insert(edit)) => edits.push(edit),
                (EditSet::Remove(edits), EditDescriptor::Remove(edit)) => edits.push(edit),
                (_, other) => {
                    return Err(EditError::MixedFamilies {
                        index: i + 1,
                        expected,
                        found: other.family(),
                    })
                }
            }
        }

        Ok(set)
    }

    pub fn family(&self) -> EditFamily {
        match self {
            EditSet::Literal(_) => EditFamily::Replace,
            EditSet::Regex(_) => EditFamily::Regex,
            EditSet::Insert(_) => EditFamily::Insert,
            EditSet::Remove(_) => EditFamily::Remove,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EditSet::Literal(edits) => edits.len(),
            EditSet::Regex(edits) => edits.len(),
            EditSet::Insert(edits) => edits.len(),
            EditSet::Remove(edits) => edits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Batch-wide switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOptions {
    /// Snapshot the file before mutating it
    #[serde(default)]
    pub backup: bool,

    /// Compute the result without touching the file
    #[serde(default)]
    pub dry_run: bool,
}

impl EditOptions {
    pub fn dry_run() -> Self {
        Self {
            backup: false,
            dry_run: true,
        }
    }

    pub fn with_backup() -> Self {
        Self {
            backup: true,
            dry_run: false,
        }
    }
}

/// A file, the edits to run against it and how to run them.
/// Consumed exactly once by [`crate::edit::execute`].
#[derive(Debug, Clone)]
pub struct EditBatch {
    pub file_path: PathBuf,
    pub edits: EditSet,
    pub options: EditOptions,
}

impl EditBatch {
    pub fn new(file_path: impl Into<PathBuf>, edits: EditSet, options: EditOptions) -> Self {
        Self {
            file_path: file_path.into(),
            edits,
            options,
        }
    }

    pub fn from_descriptors(
        file_path: impl Into<PathBuf>,
        descriptors: Vec<EditDescriptor>,
        options: EditOptions,
    ) -> Result<Self> {
        Ok(Self::new(
            file_path,
            EditSet::from_descriptors(descriptors)?,
            options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_descriptors_groups_one_family() {
        let set = EditSet::from_descriptors(vec![
            Removal::Contains("debug".to_string()).into(),
            Removal::LineNumber(0).into(),
        ])
        .unwrap();

        assert_eq!(set.family(), EditFamily::Remove);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_from_descriptors_rejects_mixed_families() {
        let err = EditSet::from_descriptors(vec![
            LiteralReplace::new("a", "b").into(),
            Insertion::AtLine {
                line: 0,
                code: "x".to_string(),
            }
            .into(),
        ])
        .unwrap_err();

        match err {
            EditError::MixedFamilies {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 2);
                assert_eq!(expected, EditFamily::Replace);
                assert_eq!(found, EditFamily::Insert);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_descriptors() {
        let set = EditSet::from_descriptors(Vec::new()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_regex_new_rejects_bad_pattern() {
        assert!(matches!(
            RegexReplace::new("(unclosed", "x"),
            Err(EditError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: EditOptions = serde_json::from_str(r#"{"dryRun": true}"#).unwrap();
        assert!(options.dry_run);
        assert!(!options.backup);
    }
}
