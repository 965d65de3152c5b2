//! Deterministic in-memory frame source for tests.

use super::FrameSource;
use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Produces frames whose leading `t / duration` share of pixels is white and
/// the rest black, so the foreground ratio tracks playback position.
pub struct SyntheticSource {
    duration: f64,
    width: u32,
    height: u32,
    /// Fail the seek with this zero-based index.
    fail_at: Option<usize>,
    pub seeks: Arc<Mutex<Vec<f64>>>,
    pub released: Arc<AtomicBool>,
}

impl SyntheticSource {
    pub fn new(duration: f64, width: u32, height: u32) -> Self {
        Self {
            duration,
            width,
            height,
            fail_at: None,
            seeks: Arc::new(Mutex::new(Vec::new())),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing_at(mut self, seek_index: usize) -> Self {
        self.fail_at = Some(seek_index);
        self
    }

    pub fn boxed(self) -> Box<dyn FrameSource> {
        Box::new(self)
    }
}

impl FrameSource for SyntheticSource {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_at(&mut self, time_secs: f64) -> Result<RgbImage> {
        let mut seeks = self.seeks.lock().map_err(|_| anyhow!("Mutex poisoned"))?;
        if self.fail_at == Some(seeks.len()) {
            return Err(anyhow!("synthetic seek failure at {}", time_secs));
        }
        seeks.push(time_secs);

        let total = (self.width * self.height) as f64;
        let lit = (time_secs / self.duration * total).floor() as u32;
        let width = self.width;
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            if y * width + x < lit {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
