//! Foundation types for funk.
//!
//! Every other funk crate depends on `funk-types` for the vocabulary it uses
//! to talk about the remote object store.
//!
//! # Key Types
//!
//! - [`ContainerRef`] -- Name of a top-level store container (bucket-equivalent)
//! - [`ObjectRef`] -- One named object inside a container
//! - [`ContentHash`] -- BLAKE3 digest of an object's bytes
//! - [`ObjectAttributes`] -- Snapshot of an object's metadata after a write

pub mod attributes;
pub mod error;
pub mod hash;
pub mod names;
pub mod refs;

pub use attributes::ObjectAttributes;
pub use error::TypeError;
pub use hash::ContentHash;
pub use names::{validate_container_name, validate_object_name};
pub use refs::{ContainerRef, ObjectRef};
