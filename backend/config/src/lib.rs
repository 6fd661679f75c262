//! Process-lifetime configuration.
//!
//! Read once at startup from environment variables and passed into each
//! component at construction. Every service credential is optional; a
//! missing one disables only the dependent component, never the process.

use std::collections::HashMap;

use serde::Deserialize;

/// MenuLens runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level (overridden by RUST_LOG)
    pub log_level: String,
    pub vision: VisionConfig,
    pub imagegen: ImageGenConfig,
    pub storage: StorageConfig,
}

/// Vision-extraction service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    /// API key; absent disables extraction.
    pub api_key: Option<String>,
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Multimodal model identifier.
    pub model: String,
}

/// Image-generation service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenConfig {
    /// API key; absent disables generation.
    pub api_key: Option<String>,
    /// Image-generation endpoint URL.
    pub endpoint: String,
    /// Diffusion model identifier.
    pub model: String,
}

/// Which transport uploads go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Managed storage REST API.
    Supabase,
    /// Raw S3-compatible protocol.
    S3,
}

/// Object-storage settings. The bucket is expected to exist and be public;
/// bucket lifecycle is not managed here.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    /// S3 endpoint; defaults to the storage endpoint derived from
    /// `supabase_url` when unset.
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Build from a provided variable map. `from_env` delegates here; tests
    /// use it directly so they never touch process environment.
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        // Empty values are treated as unset, matching how blank entries in a
        // .env file behave.
        let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

        let supabase_url = get("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string());
        let s3_endpoint = get("S3_ENDPOINT")
            .or_else(|| supabase_url.as_ref().map(|u| format!("{u}/storage/v1/s3")));

        Self {
            bind_address: get("MENULENS_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("MENULENS_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            log_level: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            vision: VisionConfig {
                api_key: get("GROQ_API_KEY"),
                endpoint: get("MENULENS_VISION_ENDPOINT").unwrap_or_else(|| {
                    "https://api.groq.com/openai/v1/chat/completions".to_string()
                }),
                model: get("MENULENS_VISION_MODEL")
                    .unwrap_or_else(|| "meta-llama/llama-4-scout-17b-16e-instruct".to_string()),
            },
            imagegen: ImageGenConfig {
                api_key: get("TOGETHER_API_KEY"),
                endpoint: get("MENULENS_IMAGE_ENDPOINT")
                    .unwrap_or_else(|| "https://api.together.xyz/v1/images/generations".to_string()),
                model: get("MENULENS_IMAGE_MODEL")
                    .unwrap_or_else(|| "black-forest-labs/FLUX.1-schnell".to_string()),
            },
            storage: StorageConfig {
                backend: match get("MENULENS_STORAGE").as_deref() {
                    Some("s3") => StorageBackend::S3,
                    _ => StorageBackend::Supabase,
                },
                bucket: get("MENULENS_BUCKET").unwrap_or_else(|| "menulens".to_string()),
                supabase_url,
                supabase_key: get("SUPABASE_ANON_KEY"),
                s3_endpoint,
                s3_region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                s3_access_key_id: get("S3_ACCESS_KEY_ID"),
                s3_secret_access_key: get("S3_SECRET_ACCESS_KEY"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = Config::from_env_map(&HashMap::new());
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Supabase);
        assert_eq!(config.storage.bucket, "menulens");
        assert!(config.vision.api_key.is_none());
        assert!(config.imagegen.api_key.is_none());
        assert!(config.vision.endpoint.contains("chat/completions"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = Config::from_env_map(&env(&[("GROQ_API_KEY", "")]));
        assert!(config.vision.api_key.is_none());
    }

    #[test]
    fn s3_endpoint_derives_from_supabase_url() {
        let config = Config::from_env_map(&env(&[(
            "SUPABASE_URL",
            "https://abcdefgh.supabase.co/",
        )]));
        assert_eq!(
            config.storage.s3_endpoint.as_deref(),
            Some("https://abcdefgh.supabase.co/storage/v1/s3")
        );
    }

    #[test]
    fn explicit_s3_endpoint_wins_over_derivation() {
        let config = Config::from_env_map(&env(&[
            ("SUPABASE_URL", "https://abcdefgh.supabase.co"),
            ("S3_ENDPOINT", "https://minio.local:9000"),
        ]));
        assert_eq!(
            config.storage.s3_endpoint.as_deref(),
            Some("https://minio.local:9000")
        );
    }

    #[test]
    fn storage_backend_selects_s3() {
        let config = Config::from_env_map(&env(&[("MENULENS_STORAGE", "s3")]));
        assert_eq!(config.storage.backend, StorageBackend::S3);
    }

    #[test]
    fn credentials_are_picked_up() {
        let config = Config::from_env_map(&env(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("TOGETHER_API_KEY", "tok_test"),
        ]));
        assert_eq!(config.vision.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.imagegen.api_key.as_deref(), Some("tok_test"));
    }
}
