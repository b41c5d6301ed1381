use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlpmHtmlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read package archive {}: {reason}", path.display())]
    ArchiveUnreadable { path: PathBuf, reason: String },

    #[error("Package archive {} is missing required field '{field}'", path.display())]
    MalformedArchiveMetadata { path: PathBuf, field: &'static str },

    #[error("Package catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to write {}: {reason}", path.display())]
    OutputWriteFailure { path: PathBuf, reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AlpmHtmlError {
    /// Whether the run can go on with the next package after this error
    pub fn is_per_package(&self) -> bool {
        matches!(
            self,
            AlpmHtmlError::ArchiveUnreadable { .. } | AlpmHtmlError::MalformedArchiveMetadata { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AlpmHtmlError>;
