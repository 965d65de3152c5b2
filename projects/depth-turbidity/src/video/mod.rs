#[cfg(feature = "ffmpeg")]
pub mod ffmpeg_source;
#[cfg(feature = "opencv")]
pub mod opencv_source;
#[cfg(test)]
pub mod synthetic;

use anyhow::Result;
use image::RgbImage;
use std::path::Path;

/// A decodable video that can be sampled at arbitrary timestamps.
///
/// Dropping the source releases its decoder and container handles.
pub trait FrameSource {
    /// Playback duration in seconds.
    fn duration(&self) -> f64;
    /// Frame size as (width, height).
    fn dimensions(&self) -> (u32, u32);
    /// Seeks to `time_secs` and returns the frame displayed at that time.
    /// Blocks until the decoder has reached the requested position.
    fn frame_at(&mut self, time_secs: f64) -> Result<RgbImage>;
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// libavformat/libavcodec through ffmpeg-next
    #[default]
    Ffmpeg,
    /// OpenCV VideoCapture
    Opencv,
}

/// Opens `path` with the requested decoding backend.
pub fn open_source(path: &Path, backend: Backend) -> Result<Box<dyn FrameSource>> {
    match backend {
        #[cfg(feature = "ffmpeg")]
        Backend::Ffmpeg => Ok(Box::new(ffmpeg_source::FfmpegSource::new(path)?)),
        #[cfg(feature = "opencv")]
        Backend::Opencv => Ok(Box::new(opencv_source::OpencvSource::new(path)?)),
        #[allow(unreachable_patterns)]
        other => Err(anyhow::anyhow!(
            "Unsupported or disabled backend: {:?} (opening {})",
            other,
            path.display()
        )),
    }
}
