use super::ImageProcessor;
use anyhow::Result;
use image::{imageops, GrayImage, Luma, RgbImage};

/// `ImageProcessor` backed by the `image` crate. Infallible in practice.
#[derive(Debug, Clone, Copy, Default)]
pub struct LumaProcessor;

impl ImageProcessor for LumaProcessor {
    fn grayscale(&self, frame: &RgbImage) -> Result<GrayImage> {
        Ok(imageops::grayscale(frame))
    }

    fn binarize(&self, gray: &GrayImage, threshold: u8) -> Result<GrayImage> {
        let mut binary = gray.clone();
        for pixel in binary.pixels_mut() {
            let Luma([v]) = *pixel;
            *pixel = Luma([if v >= threshold { 255 } else { 0 }]);
        }
        Ok(binary)
    }

    fn count_foreground(&self, binary: &GrayImage) -> Result<u64> {
        Ok(binary.pixels().filter(|p| p.0[0] != 0).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_ramp() -> GrayImage {
        // 0, 1, 2, ..., 255 in a 16x16 grid
        GrayImage::from_fn(16, 16, |x, y| Luma([(y * 16 + x) as u8]))
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let binary = LumaProcessor.binarize(&gray_ramp(), 200).unwrap();
        // 200..=255 -> 56 pixels
        assert_eq!(LumaProcessor.count_foreground(&binary).unwrap(), 56);
        assert_eq!(binary.get_pixel(8, 12).0[0], 255); // 200
        assert_eq!(binary.get_pixel(7, 12).0[0], 0); // 199
    }

    #[test]
    fn test_threshold_zero_marks_everything() {
        let binary = LumaProcessor.binarize(&gray_ramp(), 0).unwrap();
        assert_eq!(LumaProcessor.count_foreground(&binary).unwrap(), 256);
    }

    #[test]
    fn test_grayscale_keeps_dimensions() {
        let frame = RgbImage::new(7, 3);
        let gray = LumaProcessor.grayscale(&frame).unwrap();
        assert_eq!(gray.dimensions(), (7, 3));
    }

    #[test]
    fn test_white_and_black_survive_grayscale() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(0, 0, image::Rgb([255, 255, 255]));
        let gray = LumaProcessor.grayscale(&frame).unwrap();
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
    }
}
