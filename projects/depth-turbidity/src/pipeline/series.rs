// Series builder: drives a frame source across the whole video
//
// Opens the source, plans the timestamps, analyzes one frame per timestamp
// and reports progress after each sample.

use crate::config::SamplingConfig;
use crate::error::{ProfileError, Result};
use crate::pipeline::analyzer::RatioAnalyzer;
use crate::pipeline::planner::plan_series;
use crate::video::{open_source, Backend, FrameSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// One point of the depth profile.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub depth: f64,
    pub ratio: f64,
}

/// Output of a completed run, ordered by ascending depth.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub ratios: Vec<FrameSample>,
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Opening,
    Sampling,
    Completed,
    Errored,
}

pub struct SeriesBuilder<A> {
    analyzer: A,
    state: RunState,
    cancel: Option<Arc<AtomicBool>>,
}

impl<A: RatioAnalyzer> SeriesBuilder<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            state: RunState::Idle,
            cancel: None,
        }
    }

    /// Checks `flag` before every seek and aborts the run once it is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Profiles the video at `video` with the given decoding backend.
    pub fn run<F>(
        &mut self,
        video: &Path,
        backend: Backend,
        config: &SamplingConfig,
        on_progress: F,
    ) -> Result<ProcessResult>
    where
        F: FnMut(f64),
    {
        self.run_with(|| open_source(video, backend), config, on_progress)
    }

    /// Same as [`run`](Self::run) with a caller-supplied way of opening the source.
    ///
    /// `on_progress` sees `0.0` first, then `t / duration` after each sample,
    /// then `1.0`. Any failure discards the samples collected so far.
    pub fn run_with<O, F>(
        &mut self,
        open: O,
        config: &SamplingConfig,
        mut on_progress: F,
    ) -> Result<ProcessResult>
    where
        O: FnOnce() -> anyhow::Result<Box<dyn FrameSource>>,
        F: FnMut(f64),
    {
        self.state = RunState::Opening;
        let result = self.sample(open, config, &mut on_progress);
        self.state = match &result {
            Ok(_) => RunState::Completed,
            Err(e) => {
                tracing::debug!("Profiling run failed: {}", e);
                RunState::Errored
            }
        };
        result
    }

    fn sample<O, F>(
        &mut self,
        open: O,
        config: &SamplingConfig,
        on_progress: &mut F,
    ) -> Result<ProcessResult>
    where
        O: FnOnce() -> anyhow::Result<Box<dyn FrameSource>>,
        F: FnMut(f64),
    {
        // The source is dropped, and its decoder released, on every return below.
        let mut source = open().map_err(ProfileError::SourceLoad)?;
        let duration = source.duration();
        let (width, height) = source.dimensions();

        let times = plan_series(duration, config)?;
        tracing::info!(
            "Sampling {} frames of {}x{} over {:.2}s (interval={:.3}s, threshold={}, trim={})",
            times.planned_len(),
            width,
            height,
            duration,
            times.interval(),
            config.threshold,
            config.trim
        );

        self.state = RunState::Sampling;
        let start_time = Instant::now();
        let mut ratios = Vec::with_capacity(times.planned_len());
        on_progress(0.0);

        for t in times {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(ProfileError::Cancelled {
                        completed: ratios.len(),
                    });
                }
            }

            let frame = source
                .frame_at(t)
                .map_err(|source| ProfileError::Seek { time: t, source })?;
            let ratio = self
                .analyzer
                .ratio_of(&frame, config.threshold, config.trim)?;
            let depth = t / duration * config.total_depth;

            tracing::debug!("t={:.3}s depth={:.3} ratio={:.6}", t, depth, ratio);
            ratios.push(FrameSample { depth, ratio });
            on_progress(t / duration);
        }

        on_progress(1.0);
        drop(source);

        tracing::info!(
            "Profiled {} samples in {:.2}s",
            ratios.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(ProcessResult { ratios, duration })
    }
}
