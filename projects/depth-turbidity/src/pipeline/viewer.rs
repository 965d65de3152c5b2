use crate::config::SamplingConfig;
use crate::error::{ProfileError, Result};
use crate::imaging::ImageProcessor;
use crate::pipeline::analyzer::FrameAnalyzer;
use crate::pipeline::planner::{plan_viewer_time, ViewerMode};
use crate::video::{open_source, Backend, FrameSource};
use image::{GrayImage, RgbImage};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerQuery {
    pub mode: ViewerMode,
    pub value: f64,
}

/// A single frame and its binarized counterpart, equal in size.
#[derive(Debug, Clone)]
pub struct ViewerResult {
    pub time: f64,
    pub original: RgbImage,
    pub binarized: GrayImage,
}

/// Captures one frame for display. Opens its own source per capture and
/// shares no state with a running series.
pub struct FrameViewer<P> {
    analyzer: FrameAnalyzer<P>,
}

impl<P: ImageProcessor> FrameViewer<P> {
    pub fn new(analyzer: FrameAnalyzer<P>) -> Self {
        Self { analyzer }
    }

    pub fn capture(
        &self,
        video: &Path,
        backend: Backend,
        query: ViewerQuery,
        config: &SamplingConfig,
    ) -> Result<ViewerResult> {
        self.capture_with(|| open_source(video, backend), query, config)
    }

    pub fn capture_with<O>(
        &self,
        open: O,
        query: ViewerQuery,
        config: &SamplingConfig,
    ) -> Result<ViewerResult>
    where
        O: FnOnce() -> anyhow::Result<Box<dyn FrameSource>>,
    {
        let mut source = open().map_err(ProfileError::SourceLoad)?;
        let duration = source.duration();
        let time = plan_viewer_time(query.mode, query.value, duration, config)?;

        tracing::info!(
            "Capturing frame at {:.3}s ({:?} = {})",
            time,
            query.mode,
            query.value
        );

        let original = source
            .frame_at(time)
            .map_err(|source| ProfileError::Seek { time, source })?;
        drop(source);

        let binarized = self.analyzer.binarize(&original, config.threshold)?;

        Ok(ViewerResult {
            time,
            original,
            binarized,
        })
    }
}
