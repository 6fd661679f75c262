//! Object storage for uploaded menu images.
//!
//! From the pipeline's perspective storage is an opaque collaborator: bytes
//! plus a key in, a public URL out. Two transports implement the seam (a
//! managed storage REST API and the raw S3-compatible protocol); which one
//! is used is purely a configuration choice. The bucket is expected to
//! exist and be public.

mod s3;
mod supabase;

pub use s3::S3CompatStore;
pub use supabase::SupabaseStore;

use anyhow::Result;
use async_trait::async_trait;
use menulens_config::{StorageBackend, StorageConfig};

/// Storage capability seam.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes under `key`; returns the public URL of the object.
    async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> Result<String>;

    /// List object keys under a prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Build the configured transport, or `None` when storage is not configured.
/// A missing store disables archiving only, never the rest of the pipeline.
pub fn store_from_config(config: &StorageConfig) -> Option<Box<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Supabase => {
            SupabaseStore::from_config(config).map(|s| Box::new(s) as Box<dyn ObjectStore>)
        }
        StorageBackend::S3 => {
            S3CompatStore::from_config(config).map(|s| Box::new(s) as Box<dyn ObjectStore>)
        }
    }
}
