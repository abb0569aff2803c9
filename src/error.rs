//! Pipeline error type.
//!
//! Load-time errors (`SourceNotFound`, `Io`, `MalformedInput`) halt the
//! session. `SchemaInvalid` is scoped to the view that needed the missing
//! columns; other views keep computing. An empty filtered set is not an
//! error at all - see `Recompute::Empty`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Missing required columns: {}", .columns.join(", "))]
    SchemaInvalid { columns: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(String),
}
