use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;
use crate::refs::ObjectRef;

/// Metadata of a stored object, captured at the time it was fetched.
///
/// A read-only snapshot: later writes to the same object do not update it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttributes {
    /// Container (bucket) holding the object.
    pub container: String,
    /// Object name within the container.
    pub name: String,
    /// Object size in bytes.
    pub size: u64,
    /// Digest of the object's content.
    pub content_hash: ContentHash,
    /// Backend-specific address of the object, e.g. `mem://bucket/name`.
    pub location: String,
    /// When the object was last written.
    pub updated: DateTime<Utc>,
}

impl ObjectAttributes {
    /// The object this snapshot describes.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.container.clone(), self.name.clone())
    }

    /// Returns `true` if `data` hashes to this object's content hash.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.len() as u64 == self.size && ContentHash::of(data) == self.content_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObjectAttributes {
        ObjectAttributes {
            container: "bucket".into(),
            name: "obj".into(),
            size: 5,
            content_hash: ContentHash::of(b"hello"),
            location: "mem://bucket/obj".into(),
            updated: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn matches_checks_size_and_hash() {
        let attrs = sample();
        assert!(attrs.matches(b"hello"));
        assert!(!attrs.matches(b"hellO"));
        assert!(!attrs.matches(b"hello!"));
    }

    #[test]
    fn object_ref_roundtrip() {
        assert_eq!(sample().object_ref(), ObjectRef::new("bucket", "obj"));
    }

    #[test]
    fn serde_roundtrip() {
        let attrs = sample();
        let json = serde_json::to_string(&attrs).unwrap();
        assert!(json.contains(&attrs.content_hash.to_hex()));
        let parsed: ObjectAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, attrs);
    }
}
