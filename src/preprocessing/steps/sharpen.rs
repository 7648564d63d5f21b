use crate::error::PipelineError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Gaussian radius of the unsharp mask.
const SIGMA: f32 = 1.5;

/// Sharpen text edges with an unsharp mask: subtract a gaussian-blurred copy
/// from a doubled original, so soft strokes regain definition.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, PipelineError> {
    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, SIGMA);

    let sharpened = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let original = i16::from(gray.get_pixel(x, y).0[0]);
        let soft = i16::from(blurred.get_pixel(x, y).0[0]);
        Luma([(2 * original - soft).clamp(0, 255) as u8])
    });

    Ok(DynamicImage::ImageLuma8(sharpened))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_gain_contrast() {
        // vertical edge: dark left half, light right half
        let img = GrayImage::from_fn(24, 12, |x, _| if x < 12 { Luma([60]) } else { Luma([190]) });

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        let sharpened = result.to_luma8();

        let left = i32::from(sharpened.get_pixel(11, 6).0[0]);
        let right = i32::from(sharpened.get_pixel(12, 6).0[0]);
        assert!(
            (right - left).abs() >= 130,
            "edge contrast should be at least the original 130, got {}",
            (right - left).abs()
        );
    }

    #[test]
    fn test_dimensions_are_preserved() {
        let img = GrayImage::new(50, 35);
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!((result.width(), result.height()), (50, 35));
    }

    #[test]
    fn test_flat_regions_stay_flat() {
        let img = GrayImage::from_pixel(20, 20, Luma([128]));
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(result.to_luma8().get_pixel(10, 10).0[0], 128);
    }
}
