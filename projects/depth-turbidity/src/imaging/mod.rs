pub mod luma;
#[cfg(feature = "opencv")]
pub mod opencv_processor;

use anyhow::Result;
use image::{GrayImage, RgbImage};

/// Pixel operations the analysis pipeline needs from a raster backend.
///
/// Binary images use `255` for foreground and `0` for background.
pub trait ImageProcessor {
    fn grayscale(&self, frame: &RgbImage) -> Result<GrayImage>;

    /// Pixels with intensity `>= threshold` become foreground.
    fn binarize(&self, gray: &GrayImage, threshold: u8) -> Result<GrayImage>;

    fn count_foreground(&self, binary: &GrayImage) -> Result<u64>;
}

impl<P: ImageProcessor + ?Sized> ImageProcessor for Box<P> {
    fn grayscale(&self, frame: &RgbImage) -> Result<GrayImage> {
        (**self).grayscale(frame)
    }

    fn binarize(&self, gray: &GrayImage, threshold: u8) -> Result<GrayImage> {
        (**self).binarize(gray, threshold)
    }

    fn count_foreground(&self, binary: &GrayImage) -> Result<u64> {
        (**self).count_foreground(binary)
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorKind {
    /// Pure Rust processing on `image` buffers
    #[default]
    Luma,
    /// OpenCV imgproc (requires the `opencv` feature)
    Opencv,
}

pub fn create_processor(kind: ProcessorKind) -> Result<Box<dyn ImageProcessor>> {
    match kind {
        ProcessorKind::Luma => Ok(Box::new(luma::LumaProcessor)),
        #[cfg(feature = "opencv")]
        ProcessorKind::Opencv => Ok(Box::new(opencv_processor::OpencvProcessor)),
        #[cfg(not(feature = "opencv"))]
        ProcessorKind::Opencv => Err(anyhow::anyhow!(
            "OpenCV processor requested but this build lacks the `opencv` feature"
        )),
    }
}
