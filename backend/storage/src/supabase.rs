//! Managed-storage transport: the Supabase storage REST API over plain HTTP.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use menulens_config::StorageConfig;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::ObjectStore;

pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    bucket: String,
}

impl SupabaseStore {
    /// Returns `None` when the URL or key is missing; the transport is then
    /// simply not available.
    pub fn from_config(config: &StorageConfig) -> Option<Self> {
        let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) else {
            warn!("supabase storage not configured (missing URL or key)");
            return None;
        };
        Some(Self::new(url, key, &config.bucket))
    }

    pub fn new(base_url: &str, anon_key: &str, bucket: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    /// Public URL for an uploaded object.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> Result<String> {
        info!(key, size = bytes.len(), "uploading menu image");
        let resp = self
            .http
            .post(self.object_url(key))
            .bearer_auth(&self.anon_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .context("supabase upload request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!(
                "supabase upload rejected (HTTP {}): {}",
                status,
                resp.text().await.unwrap_or_default()
            );
        }
        Ok(self.public_url(key))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let resp = self
            .http
            .post(format!(
                "{}/storage/v1/object/list/{}",
                self.base_url, self.bucket
            ))
            .bearer_auth(&self.anon_key)
            .json(&json!({ "prefix": prefix, "limit": 100 }))
            .send()
            .await
            .context("supabase list request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("supabase list rejected (HTTP {})", status);
        }

        let entries: Value = resp.json().await.context("supabase list body unreadable")?;
        let keys = entries
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("name").and_then(Value::as_str))
                    .map(|name| format!("{prefix}{name}"))
                    .collect()
            })
            .unwrap_or_default();
        Ok(keys)
    }
}
