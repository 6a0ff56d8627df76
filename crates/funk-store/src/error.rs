use funk_types::{ObjectRef, TypeError};

/// Errors from object store gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The container does not exist.
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// The requested object does not exist.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectRef),

    /// A container or object name the backend cannot address.
    #[error(transparent)]
    InvalidName(#[from] TypeError),

    /// A read source yielded a different byte count than it declared.
    #[error("size mismatch reading {object}: declared {expected} bytes, got {actual}")]
    SizeMismatch {
        object: ObjectRef,
        expected: u64,
        actual: u64,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
