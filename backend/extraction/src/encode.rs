//! Image byte encoding for transport inside chat messages.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Base64-encode raw image bytes. Total over any byte sequence; size limits
/// are the transport's problem, not enforced here.
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Wrap image bytes as a `data:` URI suitable for a chat image part.
pub fn image_data_uri(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", encode_image(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_vector() {
        assert_eq!(encode_image(b"foo"), "Zm9v");
    }

    #[test]
    fn encodes_empty_input() {
        assert_eq!(encode_image(b""), "");
    }

    #[test]
    fn data_uri_carries_jpeg_mime_and_payload() {
        assert_eq!(image_data_uri(b"foo"), "data:image/jpeg;base64,Zm9v");
    }
}
