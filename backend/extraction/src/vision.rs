//! Vision extraction: turn a menu photo into structured dish records.
//!
//! One chat-completion call with the image inlined as a data URI, then the
//! tolerant normalizer over whatever text comes back. Nothing here returns
//! an error to the caller; every failure mode degrades to an empty result
//! carrying a typed reason.

use menulens_config::VisionConfig;
use menulens_core::{ExtractFailure, ExtractionResult};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::encode::image_data_uri;
use crate::normalize::{NormalizeError, normalize};

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts structured data from images.";

/// Instruction prompt sent alongside the menu image.
const EXTRACTION_PROMPT: &str = "\
You are an expert at reading restaurant menus. Look at this menu image and \
extract a clean list of dish names and short descriptions.

Rules:
1. Focus on distinct menu items such as appetizers, main courses, and desserts.
2. Ignore drink and wine sections, headers, footers, addresses, and phone numbers.
3. Leave out prices, numbering, and bullet points unless they belong to the dish name itself.
4. Use the menu's own description for a dish when it has one.
5. When a dish is listed without a description, supply a very brief generic one based on its name.
6. Respond ONLY with a JSON array. Each element must be an object with exactly two keys: \"name\" (string) and \"description\" (string).
7. The JSON must be valid and correctly formatted.";

/// Client for the multimodal chat-completion service.
pub struct VisionClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl VisionClient {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        }
    }

    /// Extract dish records from a menu image.
    ///
    /// No explicit timeout: the call blocks for as long as the service
    /// takes. The caller cannot cancel it mid-flight.
    pub async fn extract(&self, image_bytes: &[u8]) -> ExtractionResult {
        let Some(api_key) = &self.api_key else {
            warn!("vision credential not configured, skipping extraction");
            return ExtractionResult::failed(ExtractFailure::MissingCredential);
        };

        info!(size = image_bytes.len(), "analyzing menu image");
        let raw = match self.request_raw(api_key, image_bytes).await {
            Ok(raw) => raw,
            Err(failure) => {
                warn!(%failure, "menu extraction call failed");
                return ExtractionResult::failed(failure);
            }
        };

        match normalize(&raw) {
            Ok(items) => {
                info!(count = items.len(), "extracted dish records");
                ExtractionResult::extracted(raw, items)
            }
            Err(NormalizeError::InvalidJson(err)) => {
                warn!(error = %err, "could not process menu response");
                ExtractionResult::unparseable(raw)
            }
        }
    }

    async fn request_raw(
        &self,
        api_key: &str,
        image_bytes: &[u8],
    ) -> Result<String, ExtractFailure> {
        let body = build_request_body(&self.model, image_bytes);
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ExtractFailure::Transport {
                message: err.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractFailure::Service {
                status: status.as_u16(),
            });
        }

        let envelope: Value = resp.json().await.map_err(|err| ExtractFailure::Transport {
            message: err.to_string(),
        })?;
        let content = envelope["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ExtractFailure::Transport {
                message: "response carried no message content".to_string(),
            })?;
        Ok(content.trim().to_string())
    }
}

/// Chat-completion request body: system instruction, user instruction plus
/// the inlined image, zero temperature, JSON-constrained output.
fn build_request_body(model: &str, image_bytes: &[u8]) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": [
                { "type": "text", "text": EXTRACTION_PROMPT },
                { "type": "image_url", "image_url": { "url": image_data_uri(image_bytes) } }
            ]}
        ],
        "temperature": 0.0,
        "response_format": { "type": "json_object" }
    })
}
