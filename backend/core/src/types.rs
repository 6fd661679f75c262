use serde::{Deserialize, Serialize};

use crate::error::ExtractFailure;

/// Literal the vision model sometimes echoes back for an unfilled template
/// field. Records carrying it are structurally valid but never rendered.
pub const PLACEHOLDER_DISH_NAME: &str = "Dish Name";

/// A dish extracted from a menu image: display name plus a short description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishRecord {
    pub name: String,
    pub description: String,
}

impl DishRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Whether this record should be rendered and sent for image generation.
    ///
    /// Applied at consumption time, never during normalization: a record with
    /// an empty name or the literal placeholder is skipped silently.
    pub fn is_renderable(&self) -> bool {
        !self.name.is_empty() && self.name != PLACEHOLDER_DISH_NAME
    }
}

/// Outcome of one vision-extraction call.
///
/// `raw_text` may be present even when `items` is empty (parse failure, or a
/// response with no usable dish array) so callers can still show the
/// unstructured text as a fallback. When `items` is non-empty, every element
/// already passed the structural filter.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub raw_text: Option<String>,
    pub items: Vec<DishRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ExtractFailure>,
}

impl ExtractionResult {
    /// The call never produced a response (missing credential, transport or
    /// service failure).
    pub fn failed(failure: ExtractFailure) -> Self {
        Self {
            raw_text: None,
            items: Vec::new(),
            failure: Some(failure),
        }
    }

    /// The service answered but the text was not valid JSON. The raw text is
    /// kept for display.
    pub fn unparseable(raw_text: String) -> Self {
        Self {
            raw_text: Some(raw_text),
            items: Vec::new(),
            failure: Some(ExtractFailure::UnparseableJson),
        }
    }

    /// A successful call; `items` holds whatever survived normalization
    /// (possibly nothing).
    pub fn extracted(raw_text: String, items: Vec<DishRecord>) -> Self {
        Self {
            raw_text: Some(raw_text),
            items,
            failure: None,
        }
    }
}

/// Reference to one generated dish image: a fetchable URL or a
/// self-contained `data:` URI. Fresh per call; generated images are never
/// cached or deduplicated by dish identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedImageRef {
    pub locator: String,
}

impl GeneratedImageRef {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            locator: url.into(),
        }
    }

    /// Wrap inline base64 image data as a JPEG data URI.
    pub fn from_b64_jpeg(b64: &str) -> Self {
        Self {
            locator: format!("data:image/jpeg;base64,{b64}"),
        }
    }
}
