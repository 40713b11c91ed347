//! Error taxonomy surfaced by the engine.
//!
//! Per-candidate download failures never reach this type; they are classified
//! in [`crate::http`] and logged while the candidate loop moves on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = DepotError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DepotError {
    /// Builder input rejected (missing coordinates, bad checksum, ...).
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Caller-supplied state is not enough to proceed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No candidate URL could be built for the artifact.
    #[error("artifact '{artifact}' couldn't be resolved, add a repository")]
    Unresolved { artifact: String },

    /// Every candidate URL failed (network, not found or checksum mismatch).
    #[error("failed to download artifact '{artifact}'")]
    DownloadFailed { artifact: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("relocation of {} failed", input.display())]
    Relocation {
        input: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("transitive resolution for '{artifact}' failed")]
    Transitive {
        artifact: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("loading '{artifact}' failed")]
    Load {
        artifact: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DepotError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        DepotError::Io {
            context: context.into(),
            source,
        }
    }
}
