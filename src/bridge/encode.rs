//! Envelope response encoding: text vs base64 body decisions.

use crate::envelope::EnvelopeResponse;
use crate::error::BridgeError;
use crate::http::CanonicalResponse;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use std::collections::HashMap;

/// Media type prefixes whose bodies are never carried as raw text.
const BINARY_CONTENT_TYPES: &[&str] = &[
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/wasm",
    "image/",
    "audio/",
    "video/",
    "font/",
];

/// Convert the application's response into the envelope response shape.
///
/// The body is base64-encoded when the application tagged it binary, the
/// Content-Type names a binary media type, or the bytes fall outside the
/// safe-text range; otherwise it passes through as raw text. Headers are
/// never modified in either branch, and `decode(encode(x)) == x` holds for
/// every body.
pub fn encode(response: CanonicalResponse) -> EnvelopeResponse {
    let base64 = response.binary
        || has_binary_content_type(&response.headers)
        || !is_safe_text(&response.body);

    let body = if base64 {
        STANDARD.encode(&response.body)
    } else {
        // is_safe_text guaranteed valid UTF-8, so this is lossless.
        String::from_utf8_lossy(&response.body).into_owned()
    };

    EnvelopeResponse {
        status_code: response.status.0,
        headers: response.headers,
        body,
        is_base64_encoded: base64,
    }
}

/// Recover the exact bytes the application emitted from an envelope
/// response.
pub fn decode(response: &EnvelopeResponse) -> Result<Bytes, BridgeError> {
    if response.is_base64_encoded {
        STANDARD
            .decode(&response.body)
            .map(Bytes::from)
            .map_err(|err| {
                BridgeError::malformed(format!("response body is not valid base64: {}", err))
            })
    } else {
        Ok(Bytes::copy_from_slice(response.body.as_bytes()))
    }
}

fn has_binary_content_type(headers: &HashMap<String, String>) -> bool {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| {
            let media_type = value.trim().to_ascii_lowercase();
            BINARY_CONTENT_TYPES
                .iter()
                .any(|prefix| media_type.starts_with(prefix))
        })
        .unwrap_or(false)
}

/// Safe text: valid UTF-8 with no embedded NUL.
pub(crate) fn is_safe_text(body: &[u8]) -> bool {
    !body.contains(&0) && std::str::from_utf8(body).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    fn round_trip(body: impl Into<Bytes>) -> (EnvelopeResponse, Bytes) {
        let body = body.into();
        let encoded = encode(CanonicalResponse::ok().body(body));
        let decoded = decode(&encoded).unwrap();
        (encoded, decoded)
    }

    #[test]
    fn round_trips_plain_text() {
        let (encoded, decoded) = round_trip("hello world");
        assert!(!encoded.is_base64_encoded);
        assert_eq!(&decoded[..], b"hello world");
    }

    #[test]
    fn round_trips_empty_body() {
        let (encoded, decoded) = round_trip(Bytes::new());
        assert!(!encoded.is_base64_encoded);
        assert!(decoded.is_empty());
    }

    #[test]
    fn round_trips_binary_body() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let (encoded, decoded) = round_trip(bytes.clone());
        assert!(encoded.is_base64_encoded);
        assert_eq!(&decoded[..], &bytes[..]);
    }

    #[test]
    fn nul_byte_forces_base64() {
        let (encoded, decoded) = round_trip(&b"ab\x00cd"[..]);
        assert!(encoded.is_base64_encoded);
        assert_eq!(&decoded[..], b"ab\x00cd");
    }

    #[test]
    fn invalid_utf8_forces_base64() {
        let (encoded, _) = round_trip(&[0xc3, 0x28][..]);
        assert!(encoded.is_base64_encoded);
    }

    #[test]
    fn binary_content_type_forces_base64_even_for_text_bytes() {
        let response = CanonicalResponse::ok()
            .header("Content-Type", "image/png")
            .body("looks like text");
        let encoded = encode(response);

        assert!(encoded.is_base64_encoded);
        assert_eq!(decode(&encoded).unwrap(), Bytes::from("looks like text"));
    }

    #[test]
    fn explicit_binary_tag_forces_base64() {
        let encoded = encode(CanonicalResponse::ok().body("text").binary(true));
        assert!(encoded.is_base64_encoded);
    }

    #[test]
    fn plain_utf8_text_stays_text() {
        let encoded = encode(CanonicalResponse::text("héllo"));
        assert!(!encoded.is_base64_encoded);
        assert_eq!(encoded.body, "héllo");
    }

    #[test]
    fn headers_pass_through_unmodified() {
        let response = CanonicalResponse::ok()
            .header("Content-Type", "application/octet-stream")
            .header("X-Custom", "kept")
            .body(vec![1u8, 2, 3]);
        let encoded = encode(response);

        assert_eq!(encoded.headers.len(), 2);
        assert_eq!(
            encoded.headers.get("Content-Type"),
            Some(&"application/octet-stream".to_string())
        );
        assert_eq!(encoded.headers.get("X-Custom"), Some(&"kept".to_string()));
    }

    #[test]
    fn status_code_passes_through() {
        let encoded = encode(CanonicalResponse::error(StatusCode::NOT_FOUND, "missing"));
        assert_eq!(encoded.status_code, 404);
        assert_eq!(encoded.body, "missing");
    }

    #[test]
    fn content_type_check_is_case_insensitive() {
        let response = CanonicalResponse::ok()
            .header("content-type", "IMAGE/PNG")
            .body("x");
        assert!(encode(response).is_base64_encoded);
    }
}
