use std::path::PathBuf;
use thiserror::Error;

/// Errors returned when resolving sound references.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("empty sound path")]
    EmptyPath,

    #[error("sound path {0:?} contains a parent or backslash component")]
    Traversal(String),

    #[error("sound path {0:?} is absolute")]
    Absolute(String),

    #[error("sound {0} resolves outside the sound root")]
    OutsideRoot(PathBuf),

    #[error("sound {0} not found")]
    NotFound(PathBuf),

    #[error("sound root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
