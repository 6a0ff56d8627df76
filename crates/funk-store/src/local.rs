use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use funk_types::{validate_container_name, validate_object_name, ContentHash, ObjectAttributes};
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContainerHandle, ObjectStoreGateway, ReadSource, WriteSink};

/// Gateway over a local directory laid out as `root/<container>/<object>`.
///
/// Stands in for a remote store when no network service is wanted. Writes
/// land in a temporary file inside the container directory and are renamed
/// into place on commit, so readers never observe a partial object.
#[derive(Clone, Debug)]
pub struct LocalDirGateway {
    root: PathBuf,
}

impl LocalDirGateway {
    /// Create a gateway rooted at `root`. The directory is not created.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory backing `name`, including `root` if needed.
    pub fn create_container(&self, name: &str) -> StoreResult<ContainerHandle> {
        let handle = self.resolve_container(name);
        let dir = self.container_dir(&handle)?;
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(container = name, path = %dir.display(), "created container");
        Ok(handle)
    }

    fn container_dir(&self, container: &ContainerHandle) -> StoreResult<PathBuf> {
        validate_container_name(container.name())?;
        Ok(self.root.join(container.name()))
    }

    fn object_path(&self, container: &ContainerHandle, object: &str) -> StoreResult<PathBuf> {
        validate_object_name(object)?;
        Ok(self.container_dir(container)?.join(object))
    }

    fn require_container(&self, container: &ContainerHandle) -> StoreResult<PathBuf> {
        let dir = self.container_dir(container)?;
        if !dir.is_dir() {
            return Err(StoreError::ContainerNotFound(container.name().to_string()));
        }
        Ok(dir)
    }

    fn open_object(&self, container: &ContainerHandle, object: &str) -> StoreResult<(PathBuf, File)> {
        self.require_container(container)?;
        let path = self.object_path(container, object)?;
        let not_found = || StoreError::ObjectNotFound(container.object(object));
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        if !file.metadata()?.is_file() {
            return Err(not_found());
        }
        Ok((path, file))
    }
}

impl ObjectStoreGateway for LocalDirGateway {
    fn exists(&self, container: &ContainerHandle) -> StoreResult<bool> {
        let dir = self.container_dir(container)?;
        match std::fs::metadata(&dir) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn open_writer<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn WriteSink + 'a>> {
        let dir = self.require_container(container)?;
        let dest = self.object_path(container, object)?;
        let tmp = NamedTempFile::new_in(&dir)?;
        Ok(Box::new(LocalWriter { tmp, dest }))
    }

    fn open_reader<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn ReadSource + 'a>> {
        let (_, file) = self.open_object(container, object)?;
        let size = file.metadata()?.len();
        Ok(Box::new(LocalReader { file, size }))
    }

    fn fetch_attributes(
        &self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<ObjectAttributes> {
        let (path, mut file) = self.open_object(container, object)?;
        let meta = file.metadata()?;
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut file, &mut hasher)?;
        let updated: DateTime<Utc> = meta.modified()?.into();
        let location = match path.canonicalize() {
            Ok(abs) => format!("file://{}", abs.display()),
            Err(_) => format!("file://{}", path.display()),
        };
        Ok(ObjectAttributes {
            container: container.name().to_string(),
            name: object.to_string(),
            size: meta.len(),
            content_hash: ContentHash::from_hasher(&hasher),
            location,
            updated,
        })
    }
}

struct LocalWriter {
    tmp: NamedTempFile,
    dest: PathBuf,
}

impl Write for LocalWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.tmp.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.tmp.flush()
    }
}

impl WriteSink for LocalWriter {
    fn commit(self: Box<Self>) -> StoreResult<()> {
        let LocalWriter { mut tmp, dest } = *self;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        tracing::debug!(path = %dest.display(), "committed object");
        Ok(())
    }
}

struct LocalReader {
    file: File,
    size: u64,
}

impl Read for LocalReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl ReadSource for LocalReader {
    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> (tempfile::TempDir, LocalDirGateway) {
        let dir = tempfile::tempdir().unwrap();
        let gateway = LocalDirGateway::new(dir.path().join("store"));
        (dir, gateway)
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn container_lifecycle() {
        let (_dir, gateway) = gateway();
        let handle = gateway.resolve_container("bucket");
        assert!(!gateway.exists(&handle).unwrap());
        gateway.create_container("bucket").unwrap();
        assert!(gateway.exists(&handle).unwrap());
    }

    #[test]
    fn invalid_container_name_cannot_be_checked() {
        let (_dir, gateway) = gateway();
        let err = gateway.exists(&gateway.resolve_container("../escape")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }

    #[test]
    fn write_commit_read() {
        let (_dir, gateway) = gateway();
        let handle = gateway.create_container("bucket").unwrap();

        let mut sink = gateway.open_writer(&handle, "obj.tar").unwrap();
        sink.write_all(b"hello").unwrap();
        sink.commit().unwrap();

        let mut source = gateway.open_reader(&handle, "obj.tar").unwrap();
        assert_eq!(source.size(), 5);
        let mut buf = Vec::new();
        source.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn nested_object_names_create_directories() {
        let (_dir, gateway) = gateway();
        let handle = gateway.create_container("bucket").unwrap();
        let mut sink = gateway.open_writer(&handle, "env/prod.tar").unwrap();
        sink.write_all(b"x").unwrap();
        sink.commit().unwrap();
        assert!(gateway.root().join("bucket/env/prod.tar").is_file());
    }

    #[test]
    fn dropped_sink_leaves_no_files() {
        let (_dir, gateway) = gateway();
        let handle = gateway.create_container("bucket").unwrap();
        {
            let mut sink = gateway.open_writer(&handle, "obj").unwrap();
            sink.write_all(b"partial").unwrap();
        }
        assert!(entries(&gateway.root().join("bucket")).is_empty());
    }

    #[test]
    fn writer_requires_container() {
        let (_dir, gateway) = gateway();
        let handle = gateway.resolve_container("bucket");
        assert!(matches!(
            gateway.open_writer(&handle, "obj").err().unwrap(),
            StoreError::ContainerNotFound(_)
        ));
    }

    #[test]
    fn traversal_object_names_are_rejected() {
        let (_dir, gateway) = gateway();
        let handle = gateway.create_container("bucket").unwrap();
        assert!(matches!(
            gateway.open_writer(&handle, "../outside").err().unwrap(),
            StoreError::InvalidName(_)
        ));
    }

    #[test]
    fn missing_object_is_not_found() {
        let (_dir, gateway) = gateway();
        let handle = gateway.create_container("bucket").unwrap();
        assert!(matches!(
            gateway.open_reader(&handle, "missing").err().unwrap(),
            StoreError::ObjectNotFound(_)
        ));
        std::fs::create_dir(gateway.root().join("bucket/dir")).unwrap();
        assert!(matches!(
            gateway.fetch_attributes(&handle, "dir").unwrap_err(),
            StoreError::ObjectNotFound(_)
        ));
    }

    #[test]
    fn attributes_hash_file_content() {
        let (_dir, gateway) = gateway();
        let handle = gateway.create_container("bucket").unwrap();
        let mut sink = gateway.open_writer(&handle, "obj").unwrap();
        sink.write_all(b"hello").unwrap();
        sink.commit().unwrap();

        let attrs = gateway.fetch_attributes(&handle, "obj").unwrap();
        assert_eq!(attrs.size, 5);
        assert_eq!(attrs.content_hash, ContentHash::of(b"hello"));
        assert!(attrs.location.starts_with("file://"));
        assert!(attrs.location.ends_with("obj"));
    }
}
