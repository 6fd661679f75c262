//! Raw S3-compatible transport.
//!
//! Speaks the S3 protocol against any compatible endpoint; Supabase exposes
//! one under `/storage/v1/s3`. Path-style addressing, static credentials.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use menulens_config::StorageConfig;
use tracing::{info, warn};

use crate::ObjectStore;

const SUPABASE_S3_SUFFIX: &str = "/storage/v1/s3";

pub struct S3CompatStore {
    client: aws_sdk_s3::Client,
    endpoint: String,
    bucket: String,
}

impl S3CompatStore {
    /// Returns `None` when the endpoint or either access key is missing.
    pub fn from_config(config: &StorageConfig) -> Option<Self> {
        let (Some(endpoint), Some(access_key), Some(secret_key)) = (
            &config.s3_endpoint,
            &config.s3_access_key_id,
            &config.s3_secret_access_key,
        ) else {
            warn!("s3 storage not configured (missing endpoint or access keys)");
            return None;
        };

        let credentials = Credentials::new(access_key, secret_key, None, None, "menulens");
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Some(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        })
    }

    /// Public URL for an uploaded object.
    ///
    /// A Supabase-shaped endpoint maps to the public object route of the
    /// same project; any other endpoint falls back to path-style addressing.
    pub fn public_url(&self, key: &str) -> String {
        match self.endpoint.strip_suffix(SUPABASE_S3_SUFFIX) {
            Some(base) => format!("{}/storage/v1/object/public/{}/{}", base, self.bucket, key),
            None => format!("{}/{}/{}", self.endpoint, self.bucket, key),
        }
    }

    #[cfg(test)]
    fn for_tests(endpoint: &str, bucket: &str) -> Self {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3CompatStore {
    async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> Result<String> {
        info!(key, size = bytes.len(), "uploading menu image via s3");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .context("s3 put_object failed")?;
        Ok(self.public_url(key))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .context("s3 list_objects_v2 failed")?;
        let keys = resp
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();
        Ok(keys)
    }
}
