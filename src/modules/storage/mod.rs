//! Storage module for candidate photos and election assets
//!
//! Provides the `ObjectStorage` seam used by services and the
//! MinIO/S3-compatible client that implements it.

mod minio_client;
mod object_storage;

pub use minio_client::MinIOClient;
pub use object_storage::ObjectStorage;

#[cfg(test)]
pub use object_storage::memory::InMemoryStorage;
