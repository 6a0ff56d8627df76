use crate::error::{ArchiveError, ArchiveResult};

/// Permission bits recorded for every archived file (`rw-------`).
pub const PERMISSION_MODE: u32 = 0o600;

/// Longest name the header's name field can hold.
pub const MAX_NAME_LEN: usize = 100;

/// A single named file captured for archiving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Directory-free file name.
    pub name: String,
    /// Full file content at capture time.
    pub content: Vec<u8>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Content length in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Check that `name` is a bare file name that fits in a record header.
pub fn validate_entry_name(name: &str) -> ArchiveResult<()> {
    let invalid = |reason: &str| ArchiveError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("must not be '.' or '..'"));
    }
    if let Some(ch) = name.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(invalid(&format!("must be directory-free, found {ch:?}")));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("longer than 100 bytes"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_names() {
        assert!(validate_entry_name("main.tf").is_ok());
        assert!(validate_entry_name(".terraform.lock.hcl").is_ok());
        assert!(validate_entry_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn rejects_paths_and_specials() {
        for bad in ["", ".", "..", "dir/main.tf", "/etc/passwd", "a\\b", "nul\0"] {
            let err = validate_entry_name(bad).unwrap_err();
            assert!(matches!(err, ArchiveError::InvalidName { .. }), "{bad:?}");
        }
    }

    #[test]
    fn rejects_overlong_names() {
        assert!(validate_entry_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn size_reports_content_length() {
        assert_eq!(FileEntry::new("a.tf", "abc").size(), 3);
        assert_eq!(FileEntry::new("empty.tf", Vec::new()).size(), 0);
    }
}
