use super::FrameSource;
use crate::imaging::opencv_processor::mat_to_rgb_image;
use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use opencv::{
    core, imgproc,
    prelude::*,
    videoio::{
        VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_FRAME_HEIGHT,
        CAP_PROP_FRAME_WIDTH, CAP_PROP_POS_MSEC,
    },
};
use std::path::Path;

pub struct OpencvSource {
    capture: VideoCapture,
    duration: f64,
    width: u32,
    height: u32,
}

impl OpencvSource {
    pub fn new(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Video path is not valid UTF-8: {}", path.display()))?;
        let capture = VideoCapture::from_file(path_str, CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(anyhow!("Failed to open video file: {}", path_str));
        }

        let fps = capture.get(CAP_PROP_FPS)?;
        let frame_count = capture.get(CAP_PROP_FRAME_COUNT)?;
        let duration = if fps > 0.0 { frame_count / fps } else { 0.0 };
        if duration <= 0.0 {
            tracing::warn!(
                "OpencvSource: could not derive duration for {} (fps={}, frames={})",
                path_str,
                fps,
                frame_count
            );
        }

        let width = capture.get(CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(CAP_PROP_FRAME_HEIGHT)? as u32;

        tracing::info!(
            "OpencvSource: opened {}, duration={:.2}s, fps={:.2}, size={}x{}",
            path_str,
            duration,
            fps,
            width,
            height
        );

        Ok(Self {
            capture,
            duration,
            width,
            height,
        })
    }
}

/// `VideoCapture::set` reports `false` when the backend cannot seek; reading
/// after that would silently return the next sequential frame.
fn ensure_seek_accepted(accepted: bool, time_secs: f64) -> Result<()> {
    if accepted {
        Ok(())
    } else {
        Err(anyhow!(
            "Capture backend rejected the seek to {:.3}s",
            time_secs
        ))
    }
}

impl FrameSource for OpencvSource {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_at(&mut self, time_secs: f64) -> Result<RgbImage> {
        let accepted = self
            .capture
            .set(CAP_PROP_POS_MSEC, time_secs * 1000.0)
            .with_context(|| format!("Failed to seek to {:.3}s", time_secs))?;
        ensure_seek_accepted(accepted, time_secs)?;

        let mut frame = core::Mat::default();
        let success = self.capture.read(&mut frame)?;
        if !success || frame.empty() {
            return Err(anyhow!("Failed to read frame at {:.3}s", time_secs));
        }

        let mut rgb = core::Mat::default();
        imgproc::cvt_color_def(&frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;
        mat_to_rgb_image(&rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_seek_is_an_error() {
        assert!(ensure_seek_accepted(true, 1.0).is_ok());
        let err = ensure_seek_accepted(false, 2.5).unwrap_err();
        assert!(err.to_string().contains("2.500s"));
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        assert!(OpencvSource::new(Path::new("/nonexistent/dive.mp4")).is_err());
    }
}
