//! External text-recognition collaborators.
//!
//! Recognition itself happens outside this process. The trait keeps the
//! boundary narrow: image bytes in, full recognized text (or nothing) out.
//! "No text found" is a legitimate outcome, distinct from engine failure.

pub mod vision;

use async_trait::async_trait;

use crate::error::PipelineError;

/// Trait all recognition engines implement.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Engine identifier for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Submit encoded image bytes (full image or a pre-cropped zone) and
    /// return the recognized text, or `None` when the engine found no text.
    async fn recognize(&self, image: &[u8]) -> Result<Option<String>, PipelineError>;
}
