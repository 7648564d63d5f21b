//! Base64 image payload codec.
//!
//! Callers may send image bytes as plain base64 or as a data URL
//! (`data:image/png;base64,...`); the prefix is stripped before decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::PipelineError;

static DATA_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/[a-zA-Z0-9.+-]+;base64,").unwrap());

/// Decode a base64 image payload, stripping an optional data-URL prefix.
pub fn decode_base64_image(input: &str) -> Result<Vec<u8>, PipelineError> {
    let cleaned = DATA_URL_PREFIX.replace(input.trim(), "");
    STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| PipelineError::InputValidation(format!("invalid base64 image payload: {e}")))
}

/// Encode image bytes as plain base64 for the response body.
pub fn encode_base64_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
