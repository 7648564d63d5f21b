use crate::error::PipelineError;
use image::DynamicImage;

/// Collapse the image to a single luma channel.
/// Runs first; the remaining steps operate on grayscale data.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, PipelineError> {
    Ok(DynamicImage::ImageLuma8(image.to_luma8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgb, RgbImage};

    #[test]
    fn test_output_is_single_channel() {
        let mut img = RgbImage::new(8, 8);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 1, Rgb([0, 0, 255]));

        let result = apply(DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(result.color(), ColorType::L8);
    }

    #[test]
    fn test_dimensions_are_preserved() {
        let img = RgbImage::new(64, 48);
        let result = apply(DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!((result.width(), result.height()), (64, 48));
    }

    #[test]
    fn test_grayscale_input_passes_through() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(4, 4, image::Luma([77])));
        let result = apply(img).unwrap();
        assert_eq!(result.to_luma8().get_pixel(2, 2).0[0], 77);
    }
}
