use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Local filesystem failure while reading inputs or writing outputs.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive stream itself could not be read.
    #[error("I/O error reading archive stream: {0}")]
    Stream(#[source] std::io::Error),

    /// The archive stream is truncated or internally inconsistent.
    #[error("corrupt archive at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    /// An entry name cannot be stored in the archive.
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// An entry's content does not fit the header's size field.
    #[error("entry {name:?} is too large: {size} bytes")]
    EntryTooLarge { name: String, size: u64 },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            offset,
            reason: reason.into(),
        }
    }

    /// Returns `true` for truncated or inconsistent archive data.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
