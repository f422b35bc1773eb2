//! Multi-edit engine: ordered single-family batches applied to one file.

mod applier;
mod descriptor;
mod executor;
pub mod persist;
mod preview;
mod result;

pub use applier::{Edit, EditState, Lines, Step};
pub use descriptor::{
    EditBatch, EditDescriptor, EditFamily, EditOptions, EditSet, Insertion, LiteralReplace,
    RegexReplace, Removal,
};
pub use executor::{apply_literal_edits, apply_regex_edits, execute, insert_code, remove_sections};
pub use preview::render_diff;
pub use result::{EditOutcome, MultiEditResult, FATAL_PREFIX};
