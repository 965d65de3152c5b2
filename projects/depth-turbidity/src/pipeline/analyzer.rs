use crate::error::{ProfileError, Result};
use crate::imaging::ImageProcessor;
use image::{GrayImage, RgbImage};

/// Turns one frame into a foreground ratio. This separates "how to measure"
/// from the sampling loop.
pub trait RatioAnalyzer {
    fn ratio_of(&self, frame: &RgbImage, threshold: u8, trim: i64) -> Result<f64>;
}

/// Blanket implementation so any closure with the right signature
/// automatically implements RatioAnalyzer.
impl<F> RatioAnalyzer for F
where
    F: Fn(&RgbImage, u8, i64) -> Result<f64>,
{
    fn ratio_of(&self, frame: &RgbImage, threshold: u8, trim: i64) -> Result<f64> {
        self(frame, threshold, trim)
    }
}

/// Grayscale + fixed threshold + foreground count, delegated to an
/// `ImageProcessor` backend.
pub struct FrameAnalyzer<P> {
    processor: P,
}

impl<P: ImageProcessor> FrameAnalyzer<P> {
    pub fn new(processor: P) -> Self {
        Self { processor }
    }

    /// Binary image of `frame` at `threshold`, same dimensions as the input.
    pub fn binarize(&self, frame: &RgbImage, threshold: u8) -> Result<GrayImage> {
        let gray = self
            .processor
            .grayscale(frame)
            .map_err(ProfileError::Resource)?;
        self.processor
            .binarize(&gray, threshold)
            .map_err(ProfileError::Resource)
    }
}

impl<P: ImageProcessor> RatioAnalyzer for FrameAnalyzer<P> {
    /// `(foreground + trim) / pixels`. The trim is not clamped, so the
    /// result may leave `[0, 1]` when it is non-zero.
    fn ratio_of(&self, frame: &RgbImage, threshold: u8, trim: i64) -> Result<f64> {
        let total = u64::from(frame.width()) * u64::from(frame.height());
        if total == 0 {
            return Ok(0.0);
        }

        let binary = self.binarize(frame, threshold)?;
        let foreground = self
            .processor
            .count_foreground(&binary)
            .map_err(ProfileError::Resource)?;

        Ok((foreground as f64 + trim as f64) / total as f64)
    }
}
