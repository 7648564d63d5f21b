use image::DynamicImage;
use std::time::Instant;

use super::steps;
use crate::error::PipelineError;
use crate::model::ImageBuffer;

/// Run the fixed preprocessing sequence on an encoded image buffer.
///
/// Order is fixed: grayscale, then histogram normalization, then sharpening.
/// Output dimensions always equal input dimensions; the result is a fresh
/// single-channel buffer.
pub fn preprocess(buffer: &ImageBuffer) -> Result<ImageBuffer, PipelineError> {
    let start = Instant::now();
    let image = buffer.decode()?;
    let dimensions = (image.width(), image.height());

    let image = run_step("grayscale", image, steps::grayscale::apply)?;
    let image = run_step("normalize", image, steps::normalize::apply)?;
    let image = run_step("sharpen", image, steps::sharpen::apply)?;

    debug_assert_eq!(dimensions, (image.width(), image.height()));

    tracing::debug!(
        width = dimensions.0,
        height = dimensions.1,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "preprocessing complete"
    );

    ImageBuffer::from_image(&image)
}

fn run_step<F>(
    name: &'static str,
    image: DynamicImage,
    step_fn: F,
) -> Result<DynamicImage, PipelineError>
where
    F: FnOnce(DynamicImage) -> Result<DynamicImage, PipelineError>,
{
    let step_start = Instant::now();
    let result = step_fn(image)?;
    tracing::trace!(
        step = name,
        elapsed_ms = step_start.elapsed().as_millis() as u64,
        "preprocessing step"
    );
    Ok(result)
}
