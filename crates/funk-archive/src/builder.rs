use std::path::Path;

use crate::entry::{validate_entry_name, FileEntry, PERMISSION_MODE};
use crate::error::{ArchiveError, ArchiveResult};
use crate::header::{padding, RecordHeader, BLOCK_SIZE, MAX_ENTRY_SIZE};

/// A complete, self-describing archive held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Archive {
    bytes: Vec<u8>,
    entry_count: usize,
}

impl Archive {
    /// The serialized archive.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the archive, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total serialized length, including padding and the end marker.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the archive holds no records.
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Number of records written.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("len", &self.bytes.len())
            .field("entry_count", &self.entry_count)
            .finish()
    }
}

/// Builds an archive in memory, one record per appended file.
///
/// Records appear in the archive in append order. Output is deterministic:
/// no timestamps, owners or host data are recorded.
#[derive(Default)]
pub struct ArchiveBuilder {
    buf: Vec<u8>,
    entry_count: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record.
    pub fn append(&mut self, entry: &FileEntry) -> ArchiveResult<()> {
        validate_entry_name(&entry.name)?;
        if entry.size() > MAX_ENTRY_SIZE {
            return Err(ArchiveError::EntryTooLarge {
                name: entry.name.clone(),
                size: entry.size(),
            });
        }

        let header = RecordHeader {
            name: entry.name.clone(),
            mode: PERMISSION_MODE,
            size: entry.size(),
        };
        self.buf.extend_from_slice(&header.encode());
        self.buf.extend_from_slice(&entry.content);
        self.buf.resize(self.buf.len() + padding(entry.size()), 0);
        self.entry_count += 1;

        tracing::debug!(name = %entry.name, size = entry.size(), "appended archive record");
        Ok(())
    }

    /// Read `dir/name` fully and append it under the bare `name`.
    pub fn append_file(&mut self, dir: &Path, name: &str) -> ArchiveResult<()> {
        validate_entry_name(name)?;
        let path = dir.join(name);
        let content = std::fs::read(&path).map_err(|e| ArchiveError::io(&path, e))?;
        self.append(&FileEntry {
            name: name.to_string(),
            content,
        })
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.entry_count
    }

    /// Returns `true` if no records have been appended.
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Write the end-of-archive marker and return the finished archive.
    pub fn finish(mut self) -> Archive {
        self.buf.resize(self.buf.len() + 2 * BLOCK_SIZE, 0);
        Archive {
            bytes: self.buf,
            entry_count: self.entry_count,
        }
    }
}

/// Archive the files `names` found in `source_dir`, in the given order.
///
/// Any unreadable file fails the whole build; no partial archive is returned.
pub fn build<S: AsRef<str>>(source_dir: &Path, names: &[S]) -> ArchiveResult<Archive> {
    let mut builder = ArchiveBuilder::new();
    for name in names {
        builder.append_file(source_dir, name.as_ref())?;
    }
    let archive = builder.finish();
    tracing::debug!(
        source = %source_dir.display(),
        entries = archive.entry_count(),
        bytes = archive.len(),
        "built archive"
    );
    Ok(archive)
}

/// Archive in-memory entries, in the given order.
pub fn build_entries(entries: &[FileEntry]) -> ArchiveResult<Archive> {
    let mut builder = ArchiveBuilder::new();
    for entry in entries {
        builder.append(entry)?;
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_archive_is_just_end_marker() {
        let archive = ArchiveBuilder::new().finish();
        assert_eq!(archive.len(), 2 * BLOCK_SIZE);
        assert_eq!(archive.entry_count(), 0);
        assert!(archive.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn record_layout_is_block_aligned() {
        let archive = build_entries(&[FileEntry::new("a.tf", "A")]).unwrap();
        // header + one padded payload block + two end blocks
        assert_eq!(archive.len(), 4 * BLOCK_SIZE);
        assert_eq!(archive.as_bytes()[BLOCK_SIZE], b'A');
        assert_eq!(archive.entry_count(), 1);
    }

    #[test]
    fn empty_content_takes_no_payload_block() {
        let archive = build_entries(&[FileEntry::new("empty.tf", "")]).unwrap();
        assert_eq!(archive.len(), 3 * BLOCK_SIZE);
    }

    #[test]
    fn output_is_deterministic() {
        let entries = vec![FileEntry::new("a.tf", "A"), FileEntry::new("b.tf", "BB")];
        let first = build_entries(&entries).unwrap();
        let second = build_entries(&entries).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn records_follow_append_order() {
        let archive =
            build_entries(&[FileEntry::new("z.tf", "Z"), FileEntry::new("a.tf", "A")]).unwrap();
        let bytes = archive.as_bytes();
        assert_eq!(&bytes[0..4], b"z.tf");
        assert_eq!(&bytes[2 * BLOCK_SIZE..2 * BLOCK_SIZE + 4], b"a.tf");
    }

    #[test]
    fn append_rejects_directory_names() {
        let mut builder = ArchiveBuilder::new();
        let err = builder.append(&FileEntry::new("dir/a.tf", "A")).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidName { .. }));
        assert!(builder.is_empty());
    }

    #[test]
    fn build_reads_files_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.tf"), b"one").unwrap();
        std::fs::write(dir.path().join("two.tf"), b"two").unwrap();

        let archive = build(dir.path(), &["one.tf", "two.tf"]).unwrap();
        assert_eq!(archive.entry_count(), 2);
    }

    #[test]
    fn build_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.tf"), b"one").unwrap();

        let err = build(dir.path(), &["one.tf", "missing.tf"]).unwrap_err();
        match err {
            ArchiveError::Io { path, source } => {
                assert!(path.ends_with("missing.tf"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
