//! Document-text-detection client.
//!
//! Speaks the `images:annotate` REST protocol: one request with a base64
//! image and a `DOCUMENT_TEXT_DETECTION` feature, one response with either a
//! full text annotation, nothing (no text in the image), or an error object.
//! Auth and quota failures surface as engine errors, never as "no text".

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::RecognitionEngine;
use crate::config::Config;
use crate::error::PipelineError;
use crate::payload;

pub struct VisionEngine {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl VisionEngine {
    /// Build the engine handle. Called once at startup; the handle is shared
    /// across all requests.
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        if config.recognition_api_key.is_empty() {
            return Err(PipelineError::RecognitionEngine(
                "recognition API key is not configured".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PipelineError::RecognitionEngine(format!("failed to build client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.recognition_endpoint.trim_end_matches('/').to_string(),
            api_key: config.recognition_api_key.clone(),
            timeout: config.recognition_timeout,
        })
    }

    async fn annotate(&self, image: &[u8]) -> Result<Option<String>, PipelineError> {
        let url = format!("{}/v1/images:annotate?key={}", self.endpoint, self.api_key);
        let body = serde_json::json!({
            "requests": [{
                "image": { "content": payload::encode_base64_image(image) },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }]
            }]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::RecognitionEngine(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<AnnotateResponse>(&body_text)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| body_text.chars().take(200).collect());
            return Err(PipelineError::RecognitionEngine(format!(
                "engine returned {status}: {detail}"
            )));
        }

        let annotate: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::RecognitionEngine(format!("unreadable response: {e}")))?;

        text_from_response(annotate)
    }
}

#[async_trait]
impl RecognitionEngine for VisionEngine {
    fn name(&self) -> &'static str {
        "vision"
    }

    async fn recognize(&self, image: &[u8]) -> Result<Option<String>, PipelineError> {
        match tokio::time::timeout(self.timeout, self.annotate(image)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::RecognitionTimeout { limit: self.timeout }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResult {
    #[serde(rename = "fullTextAnnotation")]
    full_text_annotation: Option<FullTextAnnotation>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Map a successful HTTP response body to recognized text.
fn text_from_response(annotate: AnnotateResponse) -> Result<Option<String>, PipelineError> {
    if let Some(error) = annotate.error {
        return Err(PipelineError::RecognitionEngine(
            error.message.unwrap_or_else(|| "unspecified engine error".to_string()),
        ));
    }

    let Some(first) = annotate.responses.into_iter().next() else {
        return Ok(None);
    };

    if let Some(error) = first.error {
        return Err(PipelineError::RecognitionEngine(
            error.message.unwrap_or_else(|| "unspecified engine error".to_string()),
        ));
    }

    Ok(first
        .full_text_annotation
        .and_then(|annotation| annotation.text)
        .filter(|text| !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AnnotateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_annotation_is_returned() {
        let response = parse(r#"{"responses":[{"fullTextAnnotation":{"text":"ABCDE1234F"}}]}"#);
        assert_eq!(
            text_from_response(response).unwrap().as_deref(),
            Some("ABCDE1234F")
        );
    }

    #[test]
    fn test_missing_annotation_is_no_text_not_an_error() {
        let response = parse(r#"{"responses":[{}]}"#);
        assert_eq!(text_from_response(response).unwrap(), None);
    }

    #[test]
    fn test_empty_responses_is_no_text() {
        let response = parse(r#"{"responses":[]}"#);
        assert_eq!(text_from_response(response).unwrap(), None);
    }

    #[test]
    fn test_blank_annotation_text_is_no_text() {
        let response = parse(r#"{"responses":[{"fullTextAnnotation":{"text":"  \n"}}]}"#);
        assert_eq!(text_from_response(response).unwrap(), None);
    }

    #[test]
    fn test_per_image_error_is_an_engine_error() {
        let response = parse(r#"{"responses":[{"error":{"message":"quota exceeded"}}]}"#);
        let err = text_from_response(response).unwrap_err();
        assert!(matches!(err, PipelineError::RecognitionEngine(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_top_level_error_is_an_engine_error() {
        let response = parse(r#"{"error":{"message":"invalid API key"},"responses":[]}"#);
        let err = text_from_response(response).unwrap_err();
        assert!(err.to_string().contains("invalid API key"));
    }
}
