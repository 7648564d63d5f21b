use crate::error::PipelineError;
use image::{DynamicImage, GrayImage, Luma};

/// Stretch the intensity histogram to the full 0-255 range.
/// Low-contrast captures (shadows, washed-out flash photos) gain the most.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, PipelineError> {
    let gray = image.to_luma8();

    let lo = gray.pixels().map(|p| p.0[0]).min().unwrap_or(0);
    let hi = gray.pixels().map(|p| p.0[0]).max().unwrap_or(255);

    // Uniform images have no histogram to stretch
    if hi <= lo {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let scale = 255.0 / f32::from(hi - lo);
    let stretched = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y).0[0] - lo;
        Luma([(f32::from(value) * scale).round() as u8])
    });

    Ok(DynamicImage::ImageLuma8(stretched))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(img: &GrayImage) -> (u8, u8) {
        let values: Vec<u8> = img.pixels().map(|p| p.0[0]).collect();
        (
            *values.iter().min().unwrap(),
            *values.iter().max().unwrap(),
        )
    }

    #[test]
    fn test_low_contrast_image_reaches_full_range() {
        // values confined to 80..=170
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([80 + ((x + y) * 6).min(90) as u8]));

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        let (lo, hi) = bounds(&result.to_luma8());
        assert_eq!(lo, 0);
        assert_eq!(hi, 255);
    }

    #[test]
    fn test_uniform_image_is_unchanged() {
        let img = GrayImage::from_pixel(12, 12, Luma([90]));
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(result.to_luma8().get_pixel(6, 6).0[0], 90);
    }

    #[test]
    fn test_dimensions_are_preserved() {
        let img = GrayImage::from_fn(33, 21, |x, _| Luma([(x * 7) as u8]));
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!((result.width(), result.height()), (33, 21));
    }
}
