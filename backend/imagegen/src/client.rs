//! Image generation: render a photorealistic visualization of one dish.

use std::time::Duration;

use menulens_config::ImageGenConfig;
use menulens_core::{GenerateFailure, GeneratedImageRef};
use serde_json::{Value, json};
use tracing::{info, warn};

/// Bound on one generation call. A timeout is reported like any other
/// transport failure.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Step count tuned for latency over fidelity.
const DIFFUSION_STEPS: u32 = 5;
const IMAGE_WIDTH: u32 = 1024;
const IMAGE_HEIGHT: u32 = 768;

/// Client for the image-generation service.
pub struct ImageGenClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl ImageGenClient {
    pub fn new(config: &ImageGenConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        }
    }

    /// Generate an image for a validated dish record.
    ///
    /// Every failure branch converges on the same caller-visible outcome (no
    /// image); the typed reason exists for logs only.
    pub async fn generate(
        &self,
        name: &str,
        description: &str,
    ) -> Result<GeneratedImageRef, GenerateFailure> {
        let Some(api_key) = &self.api_key else {
            warn!("image generation credential not configured");
            return Err(GenerateFailure::MissingCredential);
        };

        info!(dish = %name, "generating dish image");
        let body = build_request_body(&self.model, name, description);
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(GENERATION_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|err| GenerateFailure::Transport {
                message: err.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GenerateFailure::Service {
                status: status.as_u16(),
            });
        }

        let envelope: Value = resp.json().await.map_err(|err| GenerateFailure::Transport {
            message: err.to_string(),
        })?;
        parse_generation_response(&envelope).ok_or(GenerateFailure::MalformedResponse)
    }
}

/// Photorealistic food-photograph prompt interpolating the record verbatim.
pub fn build_prompt(name: &str, description: &str) -> String {
    format!(
        "A high-quality, photorealistic image of '{name}', which is described as: \
         {description}. Focus on the dish itself, beautifully presented on a plate. \
         The style should be like a professional food photograph."
    )
}

/// Request body: one image, few steps, fixed dimensions, URL response
/// preferred.
fn build_request_body(model: &str, name: &str, description: &str) -> Value {
    json!({
        "model": model,
        "prompt": build_prompt(name, description),
        "n": 1,
        "steps": DIFFUSION_STEPS,
        "width": IMAGE_WIDTH,
        "height": IMAGE_HEIGHT,
        "response_format": "url",
    })
}

/// Pull an image reference out of the service envelope.
///
/// `data[0].url` wins; inline `b64_json` is wrapped as a JPEG data URI;
/// anything else is unusable.
pub fn parse_generation_response(envelope: &Value) -> Option<GeneratedImageRef> {
    let first = envelope.get("data")?.as_array()?.first()?;
    if let Some(url) = first.get("url").and_then(Value::as_str) {
        return Some(GeneratedImageRef::from_url(url));
    }
    let b64 = first.get("b64_json").and_then(Value::as_str)?;
    Some(GeneratedImageRef::from_b64_jpeg(b64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_response_passes_through_verbatim() {
        let envelope = json!({"data":[{"url":"https://x/img.png"}]});
        let image = parse_generation_response(&envelope).unwrap();
        assert_eq!(image.locator, "https://x/img.png");
    }

    #[test]
    fn b64_response_becomes_data_uri() {
        let envelope = json!({"data":[{"b64_json":"Zm9v"}]});
        let image = parse_generation_response(&envelope).unwrap();
        assert_eq!(image.locator, "data:image/jpeg;base64,Zm9v");
    }

    #[test]
    fn url_outranks_b64_when_both_present() {
        let envelope = json!({"data":[{"url":"https://x/img.png","b64_json":"Zm9v"}]});
        let image = parse_generation_response(&envelope).unwrap();
        assert_eq!(image.locator, "https://x/img.png");
    }

    #[test]
    fn empty_data_array_yields_nothing() {
        assert!(parse_generation_response(&json!({"data":[]})).is_none());
    }

    #[test]
    fn missing_data_field_yields_nothing() {
        assert!(parse_generation_response(&json!({"created": 1})).is_none());
        assert!(parse_generation_response(&json!({"data": "oops"})).is_none());
    }

    #[test]
    fn entry_without_url_or_b64_yields_nothing() {
        let envelope = json!({"data":[{"seed": 42}]});
        assert!(parse_generation_response(&envelope).is_none());
    }

    #[test]
    fn prompt_interpolates_record_verbatim() {
        let prompt = build_prompt("Caesar Salad", "Crisp romaine, parmesan, croutons");
        assert!(prompt.contains("'Caesar Salad'"));
        assert!(prompt.contains("Crisp romaine, parmesan, croutons"));
    }

    #[test]
    fn request_body_pins_generation_settings() {
        let body = build_request_body("test-model", "A", "B");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["n"], 1);
        assert_eq!(body["steps"], 5);
        assert_eq!(body["width"], 1024);
        assert_eq!(body["height"], 768);
        assert_eq!(body["response_format"], "url");
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let client = ImageGenClient::new(&ImageGenConfig {
            api_key: None,
            endpoint: "http://unused.invalid".to_string(),
            model: "test-model".to_string(),
        });
        let result = client.generate("Caesar Salad", "crisp romaine").await;
        assert_eq!(result.unwrap_err(), GenerateFailure::MissingCredential);
    }
}
