// multiedit-cli/src/lib.rs
pub mod assemble;
pub mod config;
pub mod core;
pub mod edit;
pub mod request;

// Re-export key types
pub use crate::assemble::{assemble_file, AssembleResult, Section, SectionPosition};
pub use crate::core::{EditError, Result};
pub use crate::edit::{
    apply_literal_edits, apply_regex_edits, execute, insert_code, remove_sections, EditBatch,
    EditOptions, MultiEditResult,
};
pub use crate::request::EditRequest;
