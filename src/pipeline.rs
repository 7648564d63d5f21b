//! Pipeline orchestration.
//!
//! One request runs one sequential pipeline instance: preprocess the full
//! image, optionally crop to a named zone, hand the bytes to the recognition
//! engine, then parse the recognized text into structured fields. An engine
//! that finds no text is still a successful run with a null extraction.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

use crate::error::PipelineError;
use crate::extract::ExtractorRegistry;
use crate::model::{DocumentType, PipelineRequest, PipelineResponse};
use crate::preprocessing;
use crate::recognition::RecognitionEngine;
use crate::zone::{ZoneDescriptor, ZoneRegistry, ZoneSelection};

/// Pipeline execution states, in order of progression. `Failed` is reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Preprocessed,
    Cropped,
    RecognitionComplete,
    Extracted,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Preprocessed => "preprocessed",
            Self::Cropped => "cropped",
            Self::RecognitionComplete => "recognition_complete",
            Self::Extracted => "extracted",
            Self::Done => "done",
        }
    }
}

pub struct Pipeline {
    engine: Arc<dyn RecognitionEngine>,
    zones: ZoneRegistry,
    extractors: ExtractorRegistry,
}

impl Pipeline {
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self {
            engine,
            zones: ZoneRegistry::with_defaults(),
            extractors: ExtractorRegistry::with_defaults(),
        }
    }

    /// Run a request to completion.
    ///
    /// Every stage transition sits on an await boundary, so a cancelled
    /// caller stops the pipeline after the stage in flight completes.
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineResponse, PipelineError> {
        let start = Instant::now();
        match self.execute(request).await {
            Ok(response) => {
                tracing::info!(
                    stage = Stage::Done.as_str(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    text_found = response.recognized_text.is_some(),
                    "pipeline complete"
                );
                Ok(response)
            }
            Err(error) => {
                tracing::warn!(stage = "failed", error = %error, "pipeline failed");
                Err(error)
            }
        }
    }

    async fn execute(&self, request: PipelineRequest) -> Result<PipelineResponse, PipelineError> {
        let PipelineRequest {
            image,
            document_type,
            step,
            zone,
        } = request;

        if image.is_empty() {
            return Err(PipelineError::InputValidation(
                "missing image payload".to_string(),
            ));
        }

        self.transition(Stage::Received);
        tracing::debug!(
            document_type = document_type.as_str(),
            step,
            size = image.len(),
            format = ?image.format(),
            "request received"
        );

        // Preprocessing always runs on the full input image.
        let preprocessed = preprocessing::preprocess(&image)?;
        self.transition(Stage::Preprocessed);

        let target = match self.selected_zone(&zone, document_type)? {
            Some(descriptor) => {
                let cropped = crate::zone::crop(&preprocessed, descriptor)?;
                self.transition(Stage::Cropped);
                cropped
            }
            None => preprocessed,
        };

        let recognized_text = self.engine.recognize(target.as_bytes()).await?;
        self.transition(Stage::RecognitionComplete);

        let extraction = self
            .extractors
            .extract(document_type, recognized_text.as_deref());
        self.transition(Stage::Extracted);

        Ok(PipelineResponse {
            recognized_text,
            extraction,
            document_type,
            step,
            processed_image: target,
            created_at: Utc::now(),
        })
    }

    /// Explicit zone intent wins; otherwise the document type's default zone
    /// applies. `Full` suppresses cropping for callers that pre-crop.
    fn selected_zone(
        &self,
        selection: &ZoneSelection,
        document_type: DocumentType,
    ) -> Result<Option<&ZoneDescriptor>, PipelineError> {
        match selection {
            ZoneSelection::Full => Ok(None),
            ZoneSelection::Named(name) => self.zones.get(name).map(Some).ok_or_else(|| {
                PipelineError::InputValidation(format!("unknown zone '{name}'"))
            }),
            ZoneSelection::Auto => Ok(self.zones.default_for(document_type)),
        }
    }

    fn transition(&self, stage: Stage) {
        tracing::debug!(stage = stage.as_str(), "stage complete");
    }
}
