//! Core data model shared across the pipeline.

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;

use crate::error::PipelineError;
use crate::zone::ZoneSelection;

/// Step number used when the caller sends none, or sends something that
/// does not parse as a number.
pub const DEFAULT_STEP: u32 = 1;

/// Identity document types with a registered parsing strategy.
///
/// `Unknown` is a valid, non-error state: the pipeline still runs, and
/// extraction yields an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Pan,
    Aadhaar,
    Passport,
    Unknown,
}

impl DocumentType {
    /// Parse a caller-supplied string, case-insensitively. Anything
    /// unrecognized maps to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PAN" => Self::Pan,
            "AADHAAR" => Self::Aadhaar,
            "PASSPORT" => Self::Passport,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pan => "PAN",
            Self::Aadhaar => "AADHAAR",
            Self::Passport => "PASSPORT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse an optional request parameter, defaulting to `Unknown`.
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or(Self::Unknown)
    }
}

/// Immutable encoded image payload.
///
/// Each pipeline stage consumes a buffer and produces a new one; buffers are
/// never mutated in place.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    data: Vec<u8>,
    format: Option<ImageFormat>,
}

impl ImageBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        let format = image::guess_format(&data).ok();
        Self { data, format }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Encoded format, when the payload carries a recognizable signature.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn decode(&self) -> Result<DynamicImage, PipelineError> {
        image::load_from_memory(&self.data).map_err(|e| PipelineError::ImageDecode(e.to_string()))
    }

    /// Re-encode a decoded image as a fresh PNG buffer.
    pub fn from_image(image: &DynamicImage) -> Result<Self, PipelineError> {
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| PipelineError::Internal(format!("failed to encode image: {e}")))?;
        Ok(Self {
            data: cursor.into_inner(),
            format: Some(ImageFormat::Png),
        })
    }
}

/// Structured fields parsed from recognized text.
///
/// Every field is independently nullable. The raw recognized text is kept
/// alongside for audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fields: BTreeMap<String, Option<String>>,
    pub raw_text: Option<String>,
}

impl ExtractionResult {
    /// The null result: no fields, no raw text.
    pub fn null() -> Self {
        Self::default()
    }

    /// An empty result that still carries the recognized text.
    pub fn with_raw(text: &str) -> Self {
        Self {
            fields: BTreeMap::new(),
            raw_text: Some(text.to_string()),
        }
    }

    pub fn set_field(&mut self, name: &str, value: Option<String>) {
        self.fields.insert(name.to_string(), value);
    }

    #[allow(dead_code)]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }
}

/// One pipeline invocation.
#[derive(Debug)]
pub struct PipelineRequest {
    pub image: ImageBuffer,
    pub document_type: DocumentType,
    pub step: u32,
    pub zone: ZoneSelection,
}

impl PipelineRequest {
    #[allow(dead_code)]
    pub fn new(image: ImageBuffer, document_type: DocumentType) -> Self {
        Self {
            image,
            document_type,
            step: DEFAULT_STEP,
            zone: ZoneSelection::Auto,
        }
    }
}

/// Terminal pipeline output for a `DONE` run.
#[derive(Debug)]
pub struct PipelineResponse {
    pub recognized_text: Option<String>,
    pub extraction: ExtractionResult,
    pub document_type: DocumentType,
    pub step: u32,
    /// The bytes actually submitted to the recognition engine, returned for
    /// client feedback.
    pub processed_image: ImageBuffer,
    pub created_at: DateTime<Utc>,
}

/// Parse a step parameter from form/query text.
pub fn step_from_text(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_STEP)
}

/// Parse a step parameter from a JSON value, accepting either a number or a
/// numeric string. Everything else falls back to the default.
pub fn step_from_value(raw: Option<&serde_json::Value>) -> u32 {
    match raw {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_STEP),
        Some(serde_json::Value::String(s)) => step_from_text(Some(s)),
        _ => DEFAULT_STEP,
    }
}
