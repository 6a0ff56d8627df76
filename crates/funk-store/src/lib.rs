//! Object store gateway for funk.
//!
//! This crate defines the boundary through which funk talks to an object
//! store: resolve a container, check that it exists, stream an object in or
//! out, and fetch its attributes. Orchestration code depends only on the
//! [`ObjectStoreGateway`] trait, so a test double can replace the real store.
//!
//! # Scoped resources
//!
//! - [`WriteSink`] -- bytes are durable only after `commit`; dropping the sink
//!   discards them
//! - [`ReadSource`] -- releases its handle when dropped, on every exit path
//!
//! # Gateways
//!
//! - [`InMemoryGateway`] -- `HashMap`-based store for tests and embedding, with
//!   fault injection and resource counters
//! - [`LocalDirGateway`] -- directory tree `root/<container>/<object>` with
//!   atomic rename-on-commit
//!
//! # Design Rules
//!
//! 1. Resolving a container performs no I/O.
//! 2. Existence checks report "absent" and "could not check" differently.
//! 3. No cross-call locking: concurrent writes race, last commit wins.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod local;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use local::LocalDirGateway;
pub use memory::{Fault, InMemoryGateway};
pub use traits::{ContainerHandle, ObjectStoreGateway, ReadSource, WriteSink};
