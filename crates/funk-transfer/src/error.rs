use std::fmt;

use funk_store::StoreError;
use funk_types::ObjectRef;
use thiserror::Error;

/// Step of a transfer at which the store exchange failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferStage {
    ExistenceCheck,
    OpenWriter,
    Write,
    Commit,
    FetchAttributes,
    OpenReader,
    Read,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExistenceCheck => "existence check",
            Self::OpenWriter => "open writer",
            Self::Write => "write",
            Self::Commit => "commit",
            Self::FetchAttributes => "fetch attributes",
            Self::OpenReader => "open reader",
            Self::Read => "read",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    /// The container was absent when checked; nothing was written or read.
    #[error("container not found: {container}")]
    ContainerNotFound { container: String },

    /// The exchange with the store failed part way.
    #[error("{stage} failed for {object}")]
    Transfer {
        stage: TransferStage,
        object: ObjectRef,
        #[source]
        source: StoreError,
    },
}

impl TransferError {
    pub(crate) fn at(stage: TransferStage, object: &ObjectRef, source: impl Into<StoreError>) -> Self {
        Self::Transfer {
            stage,
            object: object.clone(),
            source: source.into(),
        }
    }

    pub fn is_container_not_found(&self) -> bool {
        matches!(self, Self::ContainerNotFound { .. })
    }

    /// Stage of a `Transfer` failure.
    pub fn stage(&self) -> Option<TransferStage> {
        match self {
            Self::ContainerNotFound { .. } => None,
            Self::Transfer { stage, .. } => Some(*stage),
        }
    }
}

pub type TransferResult<T> = Result<T, TransferError>;

/// Errors from the archive-and-transfer pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Archive(#[from] funk_archive::ArchiveError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn transfer_message_leaves_cause_to_source_chain() {
        let object = ObjectRef::new("bucket", "obj");
        let err = TransferError::at(
            TransferStage::Commit,
            &object,
            std::io::Error::other("disk full"),
        );
        assert_eq!(err.to_string(), "commit failed for bucket/obj");
        let source = err.source().unwrap().to_string();
        assert!(source.contains("disk full"), "{source}");
    }
}
