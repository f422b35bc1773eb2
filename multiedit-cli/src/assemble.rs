//! Build a new file out of named sections.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::PoisonError;
use tracing::{info, warn};

use crate::edit::persist;

/// Separator placed between consecutive sections
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Where a section goes relative to the others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPosition", into = "RawPosition")]
pub enum SectionPosition {
    Top,
    Bottom,
    At(u64),
}

impl SectionPosition {
    pub fn ordinal(&self) -> u64 {
        match self {
            SectionPosition::Top => 0,
            SectionPosition::Bottom => u64::MAX,
            SectionPosition::At(n) => *n,
        }
    }
}

impl Default for SectionPosition {
    fn default() -> Self {
        SectionPosition::At(0)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Edge {
    Top,
    Bottom,
}

/// Wire form: `"top"`, `"bottom"` or a bare integer
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Edge(Edge),
    Index(u64),
}

impl From<RawPosition> for SectionPosition {
    fn from(raw: RawPosition) -> Self {
        match raw {
            RawPosition::Edge(Edge::Top) => SectionPosition::Top,
            RawPosition::Edge(Edge::Bottom) => SectionPosition::Bottom,
            RawPosition::Index(n) => SectionPosition::At(n),
        }
    }
}

impl From<SectionPosition> for RawPosition {
    fn from(position: SectionPosition) -> Self {
        match position {
            SectionPosition::Top => RawPosition::Edge(Edge::Top),
            SectionPosition::Bottom => RawPosition::Edge(Edge::Bottom),
            SectionPosition::At(n) => RawPosition::Index(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub position: SectionPosition,
}

impl Section {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        position: SectionPosition,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleResult {
    pub success: bool,
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sections ordered by position (stable for equal positions), joined by a blank line
pub fn render_sections(sections: &[Section]) -> String {
    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|section| section.position.ordinal());

    ordered
        .iter()
        .map(|section| section.content.as_str())
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Write the rendered sections to `path`, creating parent directories.
/// Either the whole file is written or a single error is reported.
pub fn assemble_file(path: impl AsRef<Path>, sections: &[Section]) -> AssembleResult {
    let path = path.as_ref();
    let lock = persist::lock_for(path);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    let content = render_sections(sections);

    match persist::write_creating_dirs(path, &content) {
        Ok(()) => {
            info!("Assembled {} section(s) into {}", sections.len(), path.display());
            AssembleResult {
                success: true,
                file_path: path.to_path_buf(),
                error: None,
            }
        }
        Err(e) => {
            warn!("{}", e);
            AssembleResult {
                success: false,
                file_path: path.to_path_buf(),
                error: Some(e.to_string()),
            }
        }
    }
}
