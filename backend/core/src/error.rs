use serde::Serialize;
use thiserror::Error;

/// Why a vision-extraction call produced no records.
///
/// Every variant collapses to the same caller-visible shape (an empty item
/// list); the tag exists for logs and the API surface, not for control flow.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExtractFailure {
    /// No vision credential configured; the call was never attempted.
    #[error("vision service credential not configured")]
    MissingCredential,

    /// The request never completed (connection error, malformed envelope).
    #[error("vision service unreachable: {message}")]
    Transport { message: String },

    /// The service answered with a non-success status.
    #[error("vision service rejected the request (HTTP {status})")]
    Service { status: u16 },

    /// The response text was not valid JSON. The raw text is retained.
    #[error("could not process menu response")]
    UnparseableJson,
}

/// Why an image-generation call produced no image.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GenerateFailure {
    /// No generation credential configured; the call was never attempted.
    #[error("image service credential not configured")]
    MissingCredential,

    /// The request never completed. Timeouts land here too; they are not
    /// distinguished from any other transport failure.
    #[error("image request failed: {message}")]
    Transport { message: String },

    /// The service answered with a non-success status.
    #[error("image service rejected the request (HTTP {status})")]
    Service { status: u16 },

    /// The envelope carried neither a URL nor inline image data.
    #[error("image response held no usable image")]
    MalformedResponse,
}
