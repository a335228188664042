use std::path::PathBuf;
use thiserror::Error;

/// Errors while following the chat text file
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to read chat file metadata for {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read chat file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
