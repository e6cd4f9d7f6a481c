use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::contexts::Kind;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    KindMismatch(#[from] KindMismatch),

    #[error("string does not look like an ISO 8601 timestamp: `{0}`")]
    Format(String),
}

/// A path was declared under a kind incompatible with the ledger.
///
/// `expected` is the kind the ledger holds for the path (`None` when the
/// lookup key is absent entirely); `got` is the kind the declaration asked
/// for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindMismatch {
    pub path: PathBuf,
    pub expected: Option<Kind>,
    pub got: Kind,
}

impl fmt::Display for KindMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected {
            Some(expected) => write!(
                f,
                "path kind mismatch for `{}`: expected {expected}, got {}",
                self.path.display(),
                self.got
            ),
            None => write!(
                f,
                "path `{}` is not in the kind ledger (declared {})",
                self.path.display(),
                self.got
            ),
        }
    }
}

impl std::error::Error for KindMismatch {}
