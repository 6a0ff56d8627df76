//! Archive format for funk workspaces.
//!
//! Packs a directory's configuration files into one ustar stream for
//! transfer, and unpacks such a stream back into files.
//!
//! # Architecture
//!
//! - **Record**: 512-byte header (name, `0600` mode, size) + payload padded
//!   to 512 bytes
//! - **End marker**: two zero blocks; required by the reader
//! - **ArchiveBuilder**: builds an archive in memory, records in append order
//! - **ArchiveReader**: sequential record reader over any `Read`
//! - **extract**: writes records into a destination directory
//! - **list_workspace**: picks the files to archive from a directory

pub mod builder;
pub mod entry;
pub mod error;
pub mod extract;
pub mod header;
pub mod reader;
pub mod workspace;

pub use builder::{build, build_entries, Archive, ArchiveBuilder};
pub use entry::{validate_entry_name, FileEntry, PERMISSION_MODE};
pub use error::{ArchiveError, ArchiveResult};
pub use extract::extract;
pub use reader::{read_entries, ArchiveReader, ArchivedFile};
pub use workspace::{list_workspace, DEFAULT_EXTENSION};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.tf"), "A").unwrap();
        std::fs::write(dir.path().join("b.tf"), "B").unwrap();
        std::fs::write(dir.path().join("c.tf"), "C").unwrap();
        dir
    }

    fn read_dir_contents(dir: &std::path::Path) -> BTreeMap<String, Vec<u8>> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (
                    e.file_name().into_string().unwrap(),
                    std::fs::read(e.path()).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn workspace_build_extract_roundtrip() {
        let src = fixture_dir();
        let names = list_workspace(src.path(), DEFAULT_EXTENSION);
        let archive = build(src.path(), &names).unwrap();
        assert_eq!(archive.entry_count(), 3);

        let dest = tempfile::tempdir().unwrap();
        let count = extract(dest.path(), archive.as_bytes()).unwrap();
        assert_eq!(count, 3);

        let contents = read_dir_contents(dest.path());
        assert_eq!(contents.len(), 3);
        assert_eq!(contents["a.tf"], b"A");
        assert_eq!(contents["b.tf"], b"B");
        assert_eq!(contents["c.tf"], b"C");
    }

    #[test]
    fn listing_order_does_not_change_extracted_content() {
        let src = fixture_dir();
        for order in [["a.tf", "b.tf", "c.tf"], ["c.tf", "a.tf", "b.tf"]] {
            let archive = build(src.path(), &order).unwrap();
            let dest = tempfile::tempdir().unwrap();
            assert_eq!(extract(dest.path(), archive.as_bytes()).unwrap(), 3);
            let contents = read_dir_contents(dest.path());
            assert_eq!(contents["a.tf"], b"A");
            assert_eq!(contents["b.tf"], b"B");
            assert_eq!(contents["c.tf"], b"C");
        }
    }

    #[test]
    fn extraction_is_idempotent() {
        let src = fixture_dir();
        let archive = build(src.path(), &["a.tf", "b.tf", "c.tf"]).unwrap();
        let dest = tempfile::tempdir().unwrap();

        extract(dest.path(), archive.as_bytes()).unwrap();
        let first = read_dir_contents(dest.path());
        extract(dest.path(), archive.as_bytes()).unwrap();
        let second = read_dir_contents(dest.path());

        assert_eq!(first, second);
        assert_eq!(second.len(), 3);
    }

    fn entries_strategy() -> impl Strategy<Value = Vec<FileEntry>> {
        prop::collection::btree_map(
            "[a-z0-9_-]{1,20}\\.tf",
            prop::collection::vec(any::<u8>(), 0..1500),
            0..6,
        )
        .prop_map(|map| {
            map.into_iter()
                .map(|(name, content)| FileEntry::new(name, content))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn extract_reproduces_built_entries(entries in entries_strategy()) {
            let archive = build_entries(&entries).unwrap();
            let dest = tempfile::tempdir().unwrap();
            let count = extract(dest.path(), archive.as_bytes()).unwrap();
            prop_assert_eq!(count, entries.len());

            let contents = read_dir_contents(dest.path());
            prop_assert_eq!(contents.len(), entries.len());
            for entry in &entries {
                prop_assert_eq!(&contents[&entry.name], &entry.content);
            }
        }

        #[test]
        fn truncation_before_end_marker_is_corrupt(
            entries in entries_strategy(),
            fraction in 0.0f64..1.0,
        ) {
            let bytes = build_entries(&entries).unwrap().into_bytes();
            // Everything before the final zero block is required.
            let required = bytes.len() - header::BLOCK_SIZE;
            let cut = ((required as f64) * fraction) as usize;
            let err = read_entries(&bytes[..cut]).unwrap_err();
            prop_assert!(err.is_corrupt(), "cut at {} gave {}", cut, err);
        }
    }
}
