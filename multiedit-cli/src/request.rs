//! JSON edit requests.
//!
//! ```json
//! { "filePath": "src/app.ts", "mode": "regex",
//!   "edits": [{ "pattern": "console\\.log\\([^)]*\\);?", "replacement": "", "flags": "g" }],
//!   "options": { "backup": true } }
//! ```

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::core::{EditError, Result};
use crate::edit::{
    EditBatch, EditOptions, EditSet, Insertion, LiteralReplace, RegexReplace, Removal,
};

/// Flags applied when a regex edit does not name any
const DEFAULT_REGEX_FLAGS: &str = "g";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    #[default]
    Replace,
    Regex,
    Insert,
    Remove,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub file_path: PathBuf,

    #[serde(default)]
    pub mode: RequestMode,

    pub edits: Vec<Value>,

    #[serde(default)]
    pub options: EditOptions,
}

impl EditRequest {
    pub fn from_json(json: &str) -> Result<EditBatch> {
        let request: EditRequest = serde_json::from_str(json)?;
        request.into_batch()
    }

    /// Decode every edit for the request's mode into a typed batch
    pub fn into_batch(self) -> Result<EditBatch> {
        let edits = match self.mode {
            RequestMode::Replace => {
                EditSet::Literal(decode::<LiteralReplace, _, _>(self.edits, Ok)?)
            }
            RequestMode::Regex => EditSet::Regex(decode(self.edits, RegexSpec::compile)?),
            RequestMode::Insert => EditSet::Insert(decode(self.edits, InsertSpec::into_insertion)?),
            RequestMode::Remove => EditSet::Remove(decode(self.edits, RemoveSpec::into_removal)?),
        };

        Ok(EditBatch::new(self.file_path, edits, self.options))
    }
}

fn decode<S, T, F>(edits: Vec<Value>, convert: F) -> Result<Vec<T>>
where
    S: serde::de::DeserializeOwned,
    F: Fn(S) -> Result<T>,
{
    edits
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let spec: S = serde_json::from_value(value)
                .map_err(|e| EditError::InvalidRequest(format!("edit {}: {}", i + 1, e)))?;
            convert(spec).map_err(|e| match e {
                EditError::InvalidRequest(msg) => {
                    EditError::InvalidRequest(format!("edit {}: {}", i + 1, msg))
                }
                other => other,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegexSpec {
    pattern: String,
    replacement: String,
    #[serde(default)]
    flags: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl RegexSpec {
    /// `g` replaces every match, `i`, `m` and `s` map to the matching regex options.
    /// `u` and `d` change nothing here; sticky `y` has no equivalent.
    fn compile(self) -> Result<RegexReplace> {
        let flags = self.flags.as_deref().unwrap_or(DEFAULT_REGEX_FLAGS);
        let mut builder = RegexBuilder::new(&self.pattern);
        let mut replace_all = false;

        for flag in flags.chars() {
            match flag {
                'g' => replace_all = true,
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'u' | 'd' => {}
                'y' => {
                    return Err(EditError::InvalidRequest(
                        "sticky regex flag 'y' is not supported".to_string(),
                    ))
                }
                other => {
                    return Err(EditError::InvalidRequest(format!(
                        "unsupported regex flag '{}'",
                        other
                    )))
                }
            }
        }

        let regex = builder.build().map_err(|source| EditError::InvalidRegex {
            pattern: self.pattern.clone(),
            source,
        })?;

        let replacement = translate_template(&self.replacement, &regex)?;
        let mut edit = RegexReplace::from_regex(regex, replacement, replace_all);
        edit.description = self.description;
        Ok(edit)
    }
}

/// Rewrite a JavaScript replace template into `regex` expansion syntax.
///
/// Tokens the template language does not define stay literal, as do
/// references to groups the pattern lacks.
fn translate_template(template: &str, regex: &Regex) -> Result<String> {
    let groups = regex.captures_len() - 1;
    let named = regex.capture_names().flatten().next().is_some();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let consumed = match after.chars().next() {
            Some('$') => {
                out.push_str("$$");
                1
            }
            Some('&') => {
                out.push_str("${0}");
                1
            }
            Some(token @ ('`' | '\'')) => {
                return Err(EditError::InvalidRequest(format!(
                    "replacement token '${}' is not supported",
                    token
                )))
            }
            Some('<') if named => match after.find('>') {
                Some(end) => {
                    out.push_str(&format!("${{{}}}", &after[1..end]));
                    end + 1
                }
                None => {
                    out.push_str("$$");
                    0
                }
            },
            Some(c) if c.is_ascii_digit() => match group_reference(after, groups) {
                Some((group, len)) => {
                    out.push_str(&format!("${{{}}}", group));
                    len
                }
                None => {
                    out.push_str("$$");
                    0
                }
            },
            _ => {
                out.push_str("$$");
                0
            }
        };

        rest = &after[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Group number and digit count of a `$n` / `$nn` reference; two digits win
/// when that group exists
fn group_reference(digits: &str, groups: usize) -> Option<(usize, usize)> {
    let bytes = digits.as_bytes();
    let first = usize::from(bytes[0] - b'0');

    if let Some(second) = bytes.get(1).filter(|b| b.is_ascii_digit()) {
        let group = first * 10 + usize::from(second - b'0');
        if (1..=groups).contains(&group) {
            return Some((group, 2));
        }
    }

    (1..=groups).contains(&first).then_some((first, 1))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertSpec {
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    before: Option<String>,
    #[serde(default)]
    at_line: Option<usize>,
    code: String,
}

impl InsertSpec {
    fn into_insertion(self) -> Result<Insertion> {
        match (self.after, self.before, self.at_line) {
            (Some(anchor), None, None) => Ok(Insertion::AfterAnchor {
                anchor,
                code: self.code,
            }),
            (None, Some(anchor), None) => Ok(Insertion::BeforeAnchor {
                anchor,
                code: self.code,
            }),
            (None, None, Some(line)) => Ok(Insertion::AtLine {
                line,
                code: self.code,
            }),
            _ => Err(EditError::InvalidRequest(
                "insert edits need exactly one of 'after', 'before' or 'atLine'".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveSpec {
    #[serde(default)]
    contains: Option<String>,
    #[serde(default)]
    starts_with: Option<String>,
    #[serde(default)]
    ends_with: Option<String>,
    #[serde(default)]
    exact_match: Option<String>,
    #[serde(default)]
    line_number: Option<usize>,
}

impl RemoveSpec {
    fn into_removal(self) -> Result<Removal> {
        let mut selected = Vec::with_capacity(1);
        if let Some(text) = self.contains {
            selected.push(Removal::Contains(text));
        }
        if let Some(text) = self.starts_with {
            selected.push(Removal::Prefix(text));
        }
        if let Some(text) = self.ends_with {
            selected.push(Removal::Suffix(text));
        }
        if let Some(text) = self.exact_match {
            selected.push(Removal::ExactLine(text));
        }
        if let Some(line) = self.line_number {
            selected.push(Removal::LineNumber(line));
        }

        match selected.len() {
            1 => Ok(selected.remove(0)),
            _ => Err(EditError::InvalidRequest(
                "remove edits need exactly one of 'contains', 'startsWith', 'endsWith', \
                 'exactMatch' or 'lineNumber'"
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{Edit, EditFamily};

    #[test]
    fn test_mode_defaults_to_replace() {
        let batch = EditRequest::from_json(
            r#"{"filePath": "a.ts", "edits": [{"search": "a", "replace": "b"}]}"#,
        )
        .unwrap();

        assert_eq!(batch.edits.family(), EditFamily::Replace);
        assert_eq!(batch.options, EditOptions::default());
    }

    #[test]
    fn test_regex_flags() {
        let batch = EditRequest::from_json(
            r#"{"filePath": "a.ts", "mode": "regex", "options": {"dryRun": true},
                "edits": [
                    {"pattern": "foo", "replacement": "bar"},
                    {"pattern": "FOO", "replacement": "bar", "flags": "i"}
                ]}"#,
        )
        .unwrap();

        assert!(batch.options.dry_run);
        let EditSet::Regex(edits) = batch.edits else {
            panic!("expected regex edits");
        };
        assert!(edits[0].replace_all);
        assert!(!edits[1].replace_all);
        assert_eq!(edits[1].apply("foo foo".to_string()).state, "bar foo");
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = EditRequest::from_json(
            r#"{"filePath": "a.ts", "mode": "regex",
                "edits": [{"pattern": "x", "replacement": "y", "flags": "gy"}]}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("edit 1"));
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn test_unicode_and_indices_flags_are_accepted() {
        let batch = EditRequest::from_json(
            r#"{"filePath": "a.ts", "mode": "regex", "edits": [
                {"pattern": "é", "replacement": "e", "flags": "gu"},
                {"pattern": "x", "replacement": "y", "flags": "d"}
            ]}"#,
        )
        .unwrap();

        let EditSet::Regex(edits) = batch.edits else {
            panic!("expected regex edits");
        };
        assert!(edits[0].replace_all);
        assert_eq!(edits[0].apply("café é".to_string()).state, "cafe e");
        assert!(!edits[1].replace_all);
    }

    fn regex_edits(edits: &str) -> Result<Vec<RegexReplace>> {
        let json = format!(r#"{{"filePath": "a.ts", "mode": "regex", "edits": {}}}"#, edits);
        match EditRequest::from_json(&json)?.edits {
            EditSet::Regex(edits) => Ok(edits),
            other => panic!("expected regex edits, got {}", other.family()),
        }
    }

    #[test]
    fn test_replacement_uses_javascript_template_syntax() {
        let edits = regex_edits(
            r#"[
                {"pattern": "(foo)", "replacement": "$1bar"},
                {"pattern": "baz", "replacement": "[$&]"},
                {"pattern": "cost", "replacement": "$$5 $5"},
                {"pattern": "(?P<word>qux)", "replacement": "<$<word>>"}
            ]"#,
        )
        .unwrap();

        assert_eq!(edits[0].apply("foo".to_string()).state, "foobar");
        assert_eq!(edits[1].apply("baz".to_string()).state, "[baz]");
        assert_eq!(edits[2].apply("cost".to_string()).state, "$5 $5");
        assert_eq!(edits[3].apply("qux".to_string()).state, "<qux>");
    }

    #[test]
    fn test_two_digit_group_reference_needs_that_group() {
        let edits = regex_edits(r#"[{"pattern": "(a)(b)", "replacement": "$10|$2"}]"#).unwrap();
        assert_eq!(edits[0].apply("ab".to_string()).state, "a0|b");
    }

    #[test]
    fn test_surrounding_text_tokens_are_rejected() {
        for token in ["$`", "$'"] {
            let edits = format!(r#"[{{"pattern": "a", "replacement": "{}"}}]"#, token);
            let err = regex_edits(&edits).unwrap_err();
            assert!(matches!(err, EditError::InvalidRequest(_)));
            assert!(err.to_string().contains("edit 1"));
        }
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let err = EditRequest::from_json(
            r#"{"filePath": "a.ts", "mode": "regex",
                "edits": [{"pattern": "(open", "replacement": ""}]}"#,
        )
        .unwrap_err();

        assert!(matches!(err, EditError::InvalidRegex { .. }));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = EditRequest::from_json(r#"{"filePath": "a.ts", "mode": "patch", "edits": []}"#)
            .unwrap_err();
        assert!(matches!(err, EditError::Json(_)));
    }

    #[test]
    fn test_insert_specs() {
        let batch = EditRequest::from_json(
            r#"{"filePath": "a.ts", "mode": "insert", "edits": [
                {"after": "import React", "code": "import { useState } from 'react';"},
                {"atLine": 10, "code": "// note"}
            ]}"#,
        )
        .unwrap();

        let EditSet::Insert(edits) = batch.edits else {
            panic!("expected insert edits");
        };
        assert_eq!(
            edits[1],
            Insertion::AtLine {
                line: 10,
                code: "// note".to_string()
            }
        );
    }

    #[test]
    fn test_insert_needs_exactly_one_target() {
        let err = EditRequest::from_json(
            r#"{"filePath": "a.ts", "mode": "insert", "edits": [
                {"after": "a", "before": "b", "code": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EditError::InvalidRequest(_)));
    }

    #[test]
    fn test_remove_specs() {
        let batch = EditRequest::from_json(
            r#"{"filePath": "a.ts", "mode": "remove", "edits": [
                {"contains": "console.log"},
                {"startsWith": "//"},
                {"lineNumber": 0}
            ]}"#,
        )
        .unwrap();

        let EditSet::Remove(edits) = batch.edits else {
            panic!("expected remove edits");
        };
        assert_eq!(
            edits,
            vec![
                Removal::Contains("console.log".to_string()),
                Removal::Prefix("//".to_string()),
                Removal::LineNumber(0),
            ]
        );
    }
}
