//! Normalization of HTTP-shaped envelope payloads into canonical requests.

use crate::envelope::event::HttpPayload;
use crate::error::BridgeError;
use crate::http::{CanonicalRequest, Method};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use std::collections::HashMap;

/// Normalize an `HTTP`/`GATEWAY` payload into a canonical request.
///
/// Pure and total for well-formed payloads. Missing method or path, an
/// unknown method token, or an undecodable base64 body fail with a
/// malformed-envelope error; nothing is silently defaulted.
pub fn normalize(payload: &HttpPayload) -> Result<CanonicalRequest, BridgeError> {
    let token = payload
        .method
        .as_deref()
        .ok_or_else(|| BridgeError::malformed("envelope is missing the HTTP method"))?;
    let method = Method::parse(token)
        .ok_or_else(|| BridgeError::malformed(format!("unsupported HTTP method '{}'", token)))?;

    let path = payload
        .path
        .clone()
        .ok_or_else(|| BridgeError::malformed("envelope is missing the request path"))?;

    let body = decode_body(payload.body.as_deref(), payload.is_base64_encoded)?;

    let mut headers = HashMap::with_capacity(payload.headers.len());
    for (key, value) in &payload.headers {
        headers.insert(key.to_ascii_lowercase(), value.clone());
    }

    Ok(CanonicalRequest {
        method,
        path,
        query: payload.query.clone(),
        headers,
        body,
        was_base64_encoded: payload.is_base64_encoded,
    })
}

/// Decode an envelope body field into raw bytes, honoring the base64 flag.
pub(crate) fn decode_body(body: Option<&str>, is_base64: bool) -> Result<Bytes, BridgeError> {
    match body {
        None => Ok(Bytes::new()),
        Some(raw) if is_base64 => STANDARD
            .decode(raw)
            .map(Bytes::from)
            .map_err(|err| BridgeError::malformed(format!("body is not valid base64: {}", err))),
        Some(raw) => Ok(Bytes::copy_from_slice(raw.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(method: &str, path: &str) -> HttpPayload {
        HttpPayload {
            method: Some(method.to_string()),
            path: Some(path.to_string()),
            ..HttpPayload::default()
        }
    }

    #[test]
    fn normalizes_a_minimal_payload() {
        let request = normalize(&payload("GET", "/items")).unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/items");
        assert!(request.body.is_empty());
        assert!(!request.was_base64_encoded);
    }

    #[test]
    fn missing_method_is_malformed() {
        let mut p = payload("GET", "/");
        p.method = None;

        match normalize(&p) {
            Err(BridgeError::MalformedEnvelope(msg)) => assert!(msg.contains("method")),
            other => panic!("expected malformed envelope, got {:?}", other),
        }
    }

    #[test]
    fn missing_path_is_malformed() {
        let mut p = payload("GET", "/");
        p.path = None;

        assert!(matches!(
            normalize(&p),
            Err(BridgeError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn unknown_method_is_malformed_not_defaulted() {
        let p = payload("TELEPORT", "/");

        assert!(matches!(
            normalize(&p),
            Err(BridgeError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn base64_body_is_decoded_and_flag_preserved() {
        let mut p = payload("POST", "/upload");
        p.body = Some(STANDARD.encode([0x00, 0xff, 0x10]));
        p.is_base64_encoded = true;

        let request = normalize(&p).unwrap();
        assert_eq!(&request.body[..], &[0x00, 0xff, 0x10]);
        assert!(request.was_base64_encoded);
    }

    #[test]
    fn invalid_base64_body_is_malformed() {
        let mut p = payload("POST", "/upload");
        p.body = Some("not//valid==base64!!".to_string());
        p.is_base64_encoded = true;

        assert!(matches!(
            normalize(&p),
            Err(BridgeError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn header_keys_are_lowercased() {
        let mut p = payload("GET", "/");
        p.headers.insert("X-Trace-Id".to_string(), "t1".to_string());

        let request = normalize(&p).unwrap();
        assert_eq!(request.headers.get("x-trace-id"), Some(&"t1".to_string()));
        assert_eq!(request.header_value("X-Trace-Id"), Some(&"t1".to_string()));
    }

    #[test]
    fn text_body_passes_through_untouched() {
        let mut p = payload("POST", "/notes");
        p.body = Some("plain text".to_string());

        let request = normalize(&p).unwrap();
        assert_eq!(request.text().as_deref(), Some("plain text"));
    }
}
