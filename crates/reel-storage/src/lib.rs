//! S3-compatible artifact store.
//!
//! Persists finished films and hands out time-limited signed URLs.
//! The generation pipeline only ever writes whole objects and presigns
//! GETs; nothing here is streamed.

pub mod client;
pub mod error;

pub use client::{film_key, ArtifactStore, ObjectStore, StoreConfig};
pub use error::{StorageError, StorageResult};
