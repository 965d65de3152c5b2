use thiserror::Error;

/// Errors that terminate a profiling run or a viewer capture.
///
/// Every variant renders a message suitable for showing directly to the
/// person running the tool.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to load video: {0:#}")]
    SourceLoad(#[source] anyhow::Error),

    #[error("Requested time {time:.3}s is outside the video range [0, {duration:.3}]s")]
    OutOfRange { time: f64, duration: f64 },

    #[error("Failed to acquire raster surface: {0:#}")]
    Resource(#[source] anyhow::Error),

    #[error("Failed to read frame at {time:.3}s: {source:#}")]
    Seek {
        time: f64,
        #[source]
        source: anyhow::Error,
    },

    #[error("Run cancelled after {completed} samples")]
    Cancelled { completed: usize },
}

pub type Result<T> = std::result::Result<T, ProfileError>;
