use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::PipelineError;
use crate::model::{self, DocumentType, ImageBuffer, PipelineRequest, PipelineResponse};
use crate::payload;
use crate::pipeline::Pipeline;
use crate::recognition::vision::VisionEngine;
use crate::zone::ZoneSelection;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<Config>,
}

/// Analysis response
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub recognized_text: Option<String>,
    pub fields: BTreeMap<String, Option<String>>,
    pub document_type: DocumentType,
    pub step: u32,
    /// Processed image, base64-encoded PNG
    pub processed_image: String,
    /// ISO-8601 creation timestamp
    pub timestamp: String,
}

impl From<PipelineResponse> for AnalyzeResponse {
    fn from(response: PipelineResponse) -> Self {
        Self {
            success: true,
            recognized_text: response.recognized_text,
            fields: response.extraction.fields,
            document_type: response.document_type,
            step: response.step,
            processed_image: payload::encode_base64_image(response.processed_image.as_bytes()),
            timestamp: response.created_at.to_rfc3339(),
        }
    }
}

/// Base64 analysis request body
#[derive(Deserialize)]
pub struct AnalyzeBase64Request {
    pub image: Option<String>,
    pub document_type: Option<String>,
    #[serde(default)]
    pub step: Option<serde_json::Value>,
    pub zone: Option<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    // The engine handle is built exactly once, before the router exists, and
    // shared by every request.
    let engine = VisionEngine::new(&config)?;
    let pipeline = Pipeline::new(Arc::new(engine));

    let addr = format!("{}:{}", config.host, config.port);
    let max_upload_size = config.max_upload_size;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/api/analyze-image", post(handle_analyze_image))
        .route("/api/analyze-base64", post(handle_analyze_base64))
        .route("/api/docs", get(handle_docs))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle multipart image uploads
async fn handle_analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, PipelineError> {
    let mut image_data: Option<Vec<u8>> = None;
    let mut document_type: Option<String> = None;
    let mut step: Option<String> = None;
    let mut zone: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        PipelineError::InputValidation(format!("failed to parse multipart: {e}"))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                image_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            PipelineError::InputValidation(format!(
                                "failed to read image data: {e}"
                            ))
                        })?
                        .to_vec(),
                );
            }
            "document_type" => document_type = read_text_field(field).await?,
            "step" => step = read_text_field(field).await?,
            "zone" => zone = read_text_field(field).await?,
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = image_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| PipelineError::InputValidation("no image file provided".to_string()))?;

    if data.len() > state.config.max_upload_size {
        return Err(PipelineError::PayloadTooLarge {
            size: data.len(),
            max: state.config.max_upload_size,
        });
    }

    let request = PipelineRequest {
        image: ImageBuffer::new(data),
        document_type: DocumentType::from_param(document_type.as_deref()),
        step: model::step_from_text(step.as_deref()),
        zone: ZoneSelection::parse(zone.as_deref()),
    };

    let response = state.pipeline.run(request).await?;
    Ok(Json(response.into()))
}

/// Handle base64 JSON payloads
async fn handle_analyze_base64(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBase64Request>,
) -> Result<Json<AnalyzeResponse>, PipelineError> {
    let encoded = body
        .image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            PipelineError::InputValidation("no base64 image data provided".to_string())
        })?;

    let data = payload::decode_base64_image(encoded)?;

    if data.len() > state.config.max_upload_size {
        return Err(PipelineError::PayloadTooLarge {
            size: data.len(),
            max: state.config.max_upload_size,
        });
    }

    let request = PipelineRequest {
        image: ImageBuffer::new(data),
        document_type: DocumentType::from_param(body.document_type.as_deref()),
        step: model::step_from_value(body.step.as_ref()),
        zone: ZoneSelection::parse(body.zone.as_deref()),
    };

    let response = state.pipeline.run(request).await?;
    Ok(Json(response.into()))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle API documentation requests
async fn handle_docs() -> impl IntoResponse {
    Json(serde_json::json!({
        "title": "identity-ocr-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            {
                "method": "GET",
                "path": "/health",
                "description": "Health check endpoint"
            },
            {
                "method": "POST",
                "path": "/api/analyze-image",
                "description": "Upload and analyze an image file",
                "parameters": {
                    "image": "file upload (multipart/form-data)",
                    "document_type": "PAN | AADHAAR | PASSPORT (optional)",
                    "step": "capture step number (optional)",
                    "zone": "named zone, or 'full' to skip cropping (optional)"
                }
            },
            {
                "method": "POST",
                "path": "/api/analyze-base64",
                "description": "Analyze a base64-encoded image",
                "parameters": {
                    "image": "base64 image string, data-URL prefix accepted",
                    "document_type": "PAN | AADHAAR | PASSPORT (optional)",
                    "step": "capture step number (optional)",
                    "zone": "named zone, or 'full' to skip cropping (optional)"
                }
            }
        ]
    }))
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<String>, PipelineError> {
    field
        .text()
        .await
        .map(Some)
        .map_err(|e| PipelineError::InputValidation(format!("invalid form field: {e}")))
}
