use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::io::{ExportError, ParseError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("cannot read input {}: {source}", .path.display())]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no segments found in HEX after filtering")]
    NoSegments,
}
