use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use funk_types::{ContentHash, ObjectAttributes};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContainerHandle, ObjectStoreGateway, ReadSource, WriteSink};

/// A failure the in-memory gateway can be told to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// `exists` returns an error instead of an answer.
    ExistenceCheck,
    /// Every write to a sink fails.
    Write,
    /// `commit` fails; nothing is stored.
    Commit,
    /// Read sources yield only the first half of the object.
    ShortRead,
}

#[derive(Clone, Debug)]
struct StoredBlob {
    data: Vec<u8>,
    hash: ContentHash,
    updated: DateTime<Utc>,
}

type Containers = HashMap<String, HashMap<String, StoredBlob>>;

/// In-memory, HashMap-based gateway.
///
/// Intended for tests and embedding. Containers must be created explicitly.
/// Counters record how many write sinks were opened and how many read
/// sources are currently alive, so callers can check scoped-release
/// behaviour.
pub struct InMemoryGateway {
    containers: RwLock<Containers>,
    fault: RwLock<Option<Fault>>,
    writers_opened: AtomicUsize,
    open_readers: AtomicUsize,
}

impl InMemoryGateway {
    /// Create a gateway with no containers.
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            fault: RwLock::new(None),
            writers_opened: AtomicUsize::new(0),
            open_readers: AtomicUsize::new(0),
        }
    }

    /// Create a gateway holding the given empty containers.
    pub fn with_containers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gateway = Self::new();
        for name in names {
            gateway.create_container(name);
        }
        gateway
    }

    /// Create an empty container. Returns `false` if it already existed.
    pub fn create_container(&self, name: impl Into<String>) -> bool {
        let mut map = self.containers.write().expect("lock poisoned");
        let name = name.into();
        if map.contains_key(&name) {
            return false;
        }
        map.insert(name, HashMap::new());
        true
    }

    /// Delete a container and its objects. Returns `true` if it existed.
    pub fn delete_container(&self, name: &str) -> bool {
        self.containers
            .write()
            .expect("lock poisoned")
            .remove(name)
            .is_some()
    }

    /// Number of objects in `container` (0 if it does not exist).
    pub fn object_count(&self, container: &str) -> usize {
        self.containers
            .read()
            .expect("lock poisoned")
            .get(container)
            .map_or(0, HashMap::len)
    }

    /// Install or clear an injected failure.
    pub fn set_fault(&self, fault: Option<Fault>) {
        *self.fault.write().expect("lock poisoned") = fault;
    }

    /// Total write sinks opened over the gateway's lifetime.
    pub fn writers_opened(&self) -> usize {
        self.writers_opened.load(Ordering::SeqCst)
    }

    /// Read sources currently alive.
    pub fn open_readers(&self) -> usize {
        self.open_readers.load(Ordering::SeqCst)
    }

    fn fault(&self) -> Option<Fault> {
        *self.fault.read().expect("lock poisoned")
    }

    fn location(container: &str, name: &str) -> String {
        format!("mem://{container}/{name}")
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStoreGateway for InMemoryGateway {
    fn exists(&self, container: &ContainerHandle) -> StoreResult<bool> {
        if self.fault() == Some(Fault::ExistenceCheck) {
            return Err(StoreError::Io(io::Error::other("injected existence check failure")));
        }
        let map = self.containers.read().expect("lock poisoned");
        Ok(map.contains_key(container.name()))
    }

    fn open_writer<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn WriteSink + 'a>> {
        self.writers_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryWriter {
            gateway: self,
            container: container.name().to_string(),
            name: object.to_string(),
            buf: Vec::new(),
        }))
    }

    fn open_reader<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn ReadSource + 'a>> {
        let map = self.containers.read().expect("lock poisoned");
        let objects = map
            .get(container.name())
            .ok_or_else(|| StoreError::ContainerNotFound(container.name().to_string()))?;
        let blob = objects
            .get(object)
            .ok_or_else(|| StoreError::ObjectNotFound(container.object(object)))?;

        let size = blob.data.len() as u64;
        let mut data = blob.data.clone();
        if self.fault() == Some(Fault::ShortRead) {
            data.truncate(data.len() / 2);
        }

        self.open_readers.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryReader {
            cursor: Cursor::new(data),
            size,
            open_readers: &self.open_readers,
        }))
    }

    fn fetch_attributes(
        &self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<ObjectAttributes> {
        let map = self.containers.read().expect("lock poisoned");
        let blob = map
            .get(container.name())
            .and_then(|objects| objects.get(object))
            .ok_or_else(|| StoreError::ObjectNotFound(container.object(object)))?;
        Ok(ObjectAttributes {
            container: container.name().to_string(),
            name: object.to_string(),
            size: blob.data.len() as u64,
            content_hash: blob.hash,
            location: Self::location(container.name(), object),
            updated: blob.updated,
        })
    }
}

impl std::fmt::Debug for InMemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.containers.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryGateway")
            .field("container_count", &count)
            .finish()
    }
}

struct MemoryWriter<'a> {
    gateway: &'a InMemoryGateway,
    container: String,
    name: String,
    buf: Vec<u8>,
}

impl Write for MemoryWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.gateway.fault() == Some(Fault::Write) {
            return Err(io::Error::other("injected write failure"));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteSink for MemoryWriter<'_> {
    fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryWriter {
            gateway,
            container,
            name,
            buf,
        } = *self;
        if gateway.fault() == Some(Fault::Commit) {
            return Err(StoreError::Io(io::Error::other("injected commit failure")));
        }
        let mut map = gateway.containers.write().expect("lock poisoned");
        // The container may have been deleted since the sink was opened.
        let objects = map
            .get_mut(&container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.clone()))?;
        let hash = ContentHash::of(&buf);
        objects.insert(
            name,
            StoredBlob {
                data: buf,
                hash,
                updated: Utc::now(),
            },
        );
        Ok(())
    }
}

struct MemoryReader<'a> {
    cursor: Cursor<Vec<u8>>,
    size: u64,
    open_readers: &'a AtomicUsize,
}

impl Read for MemoryReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl ReadSource for MemoryReader<'_> {
    fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for MemoryReader<'_> {
    fn drop(&mut self) {
        self.open_readers.fetch_sub(1, Ordering::SeqCst);
    }
}
