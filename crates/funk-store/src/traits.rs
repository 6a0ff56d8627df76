use std::io::{Read, Write};
use std::sync::Arc;

use funk_types::{ContainerRef, ObjectAttributes, ObjectRef};

use crate::error::StoreResult;

/// A container name bound to a gateway. Resolving one performs no I/O.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerHandle {
    container: ContainerRef,
}

impl ContainerHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            container: ContainerRef::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.container.name
    }

    pub fn container_ref(&self) -> &ContainerRef {
        &self.container
    }

    /// Reference an object inside this container.
    pub fn object(&self, name: &str) -> ObjectRef {
        self.container.object(name)
    }
}

/// Destination for one object's bytes.
///
/// Written bytes become visible only after [`commit`](WriteSink::commit).
/// Dropping a sink without committing discards everything written to it.
pub trait WriteSink: Write + Send {
    /// Make the written bytes durable as the object's content.
    fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Source of one object's bytes.
///
/// Holds the underlying handle or connection until dropped.
pub trait ReadSource: Read + Send {
    /// Declared object size in bytes.
    fn size(&self) -> u64;
}

/// Capability interface over a remote object store.
///
/// Implementations must satisfy these invariants:
/// - `exists` distinguishes "container absent" (`Ok(false)`) from "could not
///   check" (`Err`).
/// - A write sink never commits partial data on drop.
/// - A read source releases its resources on drop, on every exit path.
/// - The gateway adds no locking across calls: concurrent writers to one
///   object race, and the store's last commit wins.
pub trait ObjectStoreGateway: Send + Sync {
    /// Bind a container name. Pure; no I/O.
    fn resolve_container(&self, name: &str) -> ContainerHandle {
        ContainerHandle::new(name)
    }

    /// Check whether the container exists.
    fn exists(&self, container: &ContainerHandle) -> StoreResult<bool>;

    /// Open a write sink for `object` in `container`.
    fn open_writer<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn WriteSink + 'a>>;

    /// Open a read source over the full content of `object`.
    ///
    /// Fails with [`StoreError::ObjectNotFound`](crate::StoreError::ObjectNotFound)
    /// if the object does not exist.
    fn open_reader<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn ReadSource + 'a>>;

    /// Fetch a metadata snapshot for `object`.
    fn fetch_attributes(
        &self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<ObjectAttributes>;
}

impl<G: ObjectStoreGateway + ?Sized> ObjectStoreGateway for &G {
    fn resolve_container(&self, name: &str) -> ContainerHandle {
        (**self).resolve_container(name)
    }

    fn exists(&self, container: &ContainerHandle) -> StoreResult<bool> {
        (**self).exists(container)
    }

    fn open_writer<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn WriteSink + 'a>> {
        (**self).open_writer(container, object)
    }

    fn open_reader<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn ReadSource + 'a>> {
        (**self).open_reader(container, object)
    }

    fn fetch_attributes(
        &self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<ObjectAttributes> {
        (**self).fetch_attributes(container, object)
    }
}

impl<G: ObjectStoreGateway + ?Sized> ObjectStoreGateway for Arc<G> {
    fn resolve_container(&self, name: &str) -> ContainerHandle {
        (**self).resolve_container(name)
    }

    fn exists(&self, container: &ContainerHandle) -> StoreResult<bool> {
        (**self).exists(container)
    }

    fn open_writer<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn WriteSink + 'a>> {
        (**self).open_writer(container, object)
    }

    fn open_reader<'a>(
        &'a self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<Box<dyn ReadSource + 'a>> {
        (**self).open_reader(container, object)
    }

    fn fetch_attributes(
        &self,
        container: &ContainerHandle,
        object: &str,
    ) -> StoreResult<ObjectAttributes> {
        (**self).fetch_attributes(container, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_binds_name_without_io() {
        let handle = ContainerHandle::new("bucket");
        assert_eq!(handle.name(), "bucket");
        assert_eq!(handle.container_ref(), &ContainerRef::new("bucket"));
        assert_eq!(handle.object("obj"), ObjectRef::new("bucket", "obj"));
    }
}
