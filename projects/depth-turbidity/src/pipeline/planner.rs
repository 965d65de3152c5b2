// Sampling planner: maps depth settings onto playback timestamps

use crate::config::SamplingConfig;
use crate::error::{ProfileError, Result};

/// Evenly spaced timestamps `0, dt, 2*dt, ...` strictly below the duration.
///
/// Finite and single-use; plan again for another run.
#[derive(Debug)]
pub struct SampleTimes {
    duration: f64,
    sample_count: f64,
    len: usize,
    next_index: usize,
}

impl SampleTimes {
    pub fn interval(&self) -> f64 {
        self.duration / self.sample_count
    }

    /// Number of timestamps a fresh plan yields, `ceil(duration / interval)`.
    pub fn planned_len(&self) -> usize {
        self.len
    }
}

impl Iterator for SampleTimes {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next_index >= self.len {
            return None;
        }
        // k * duration / count, so rounding in the interval never adds a sample at the end
        let t = self.next_index as f64 * self.duration / self.sample_count;
        self.next_index += 1;
        Some(t)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SampleTimes {}

/// `ceil(count)`, except that a count within float noise of an integer
/// (`0.9 / 0.03 == 30.000000000000004`) is taken as that integer.
fn planned_samples(count: f64) -> usize {
    let nearest = count.round();
    if (count - nearest).abs() <= nearest * 1e-9 {
        nearest as usize
    } else {
        count.ceil() as usize
    }
}

/// Plans the timestamps for a full profiling run over `duration` seconds.
pub fn plan_series(duration: f64, config: &SamplingConfig) -> Result<SampleTimes> {
    config.validate()?;

    let sample_count = config.sample_count();
    let interval = duration / sample_count;
    if !(interval > 0.0) || !interval.is_finite() {
        return Err(ProfileError::Configuration(format!(
            "time interval must be positive (duration {}s over {} samples)",
            duration, sample_count
        )));
    }

    Ok(SampleTimes {
        duration,
        sample_count,
        len: planned_samples(sample_count),
        next_index: 0,
    })
}

/// How a viewer request selects its frame.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerMode {
    /// Depth in meters
    #[value(name = "depth")]
    ByDepth,
    /// Sample index along the depth range
    #[value(name = "frame")]
    ByFrameIndex,
    /// Playback time in seconds
    #[value(name = "seconds")]
    BySeconds,
}

/// Resolves a viewer selector to a playback time inside `[0, duration]`.
pub fn plan_viewer_time(
    mode: ViewerMode,
    value: f64,
    duration: f64,
    config: &SamplingConfig,
) -> Result<f64> {
    let time = match mode {
        ViewerMode::ByDepth => {
            config.validate()?;
            value / config.total_depth * duration
        }
        ViewerMode::ByFrameIndex => {
            config.validate()?;
            value / config.sample_count() * duration
        }
        ViewerMode::BySeconds => value,
    };

    if !(time >= 0.0 && time <= duration) {
        return Err(ProfileError::OutOfRange { time, duration });
    }
    Ok(time)
}
