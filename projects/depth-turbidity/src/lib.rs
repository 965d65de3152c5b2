// Library half of depth-turbidity: sampling, analysis and video access.
// The binary in main.rs only parses arguments and dispatches.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod imaging;
pub mod pipeline;
pub mod video;

pub use error::{ProfileError, Result};
pub use pipeline::series::{ProcessResult, RunState, SeriesBuilder};
pub use pipeline::viewer::{FrameViewer, ViewerQuery, ViewerResult};
