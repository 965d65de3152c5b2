use crate::config::SamplingConfig;
use crate::export::OutputFormat;
use crate::imaging::ProcessorKind;
use crate::pipeline::planner::ViewerMode;
use crate::video::Backend;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample the whole video and print the foreground ratio per depth step
    Profile(ProfileArgs),
    /// Extract a single frame and its binarized image
    View(ViewArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProfileArgs {
    /// Video recorded during the descent
    #[arg(long, env = "DEPTH_TURBIDITY_VIDEO")]
    pub video: PathBuf,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Output file (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(clap::Args, Debug)]
pub struct ViewArgs {
    /// Video recorded during the descent
    #[arg(long, env = "DEPTH_TURBIDITY_VIDEO")]
    pub video: PathBuf,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// How `--value` selects the frame
    #[arg(long, value_enum, default_value_t = ViewerMode::ByDepth)]
    pub mode: ViewerMode,

    #[arg(long, allow_negative_numbers = true)]
    pub value: f64,

    /// Directory for original.png and binarized.png
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct EngineArgs {
    /// Video decoding backend
    #[arg(long, value_enum, default_value_t = Backend::Ffmpeg, env = "DEPTH_TURBIDITY_BACKEND")]
    pub backend: Backend,

    /// Pixel processing backend
    #[arg(long, value_enum, default_value_t = ProcessorKind::Luma, env = "DEPTH_TURBIDITY_PROCESSOR")]
    pub processor: ProcessorKind,
}

/// Sampling knobs, either as flags or from a JSON file. Flags win.
#[derive(clap::Args, Debug)]
pub struct SamplingArgs {
    /// JSON file with totalDepth, scale, threshold and trim
    #[arg(long, env = "DEPTH_TURBIDITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Total descent depth in meters
    #[arg(long, env = "DEPTH_TURBIDITY_TOTAL_DEPTH")]
    pub total_depth: Option<f64>,

    /// Meters between samples
    #[arg(long, env = "DEPTH_TURBIDITY_SCALE")]
    pub scale: Option<f64>,

    /// Binarization threshold (0-255)
    #[arg(long, env = "DEPTH_TURBIDITY_THRESHOLD")]
    pub threshold: Option<u8>,

    /// Offset added to the foreground pixel count
    #[arg(long, allow_negative_numbers = true, env = "DEPTH_TURBIDITY_TRIM")]
    pub trim: Option<i64>,
}

impl SamplingArgs {
    pub fn resolve(&self) -> Result<SamplingConfig> {
        let base = match &self.config {
            Some(path) => Some(SamplingConfig::load(path).map_err(|e| {
                anyhow!("Failed to read sampling config {}: {}", path.display(), e)
            })?),
            None => None,
        };

        let total_depth = self
            .total_depth
            .or(base.map(|c| c.total_depth))
            .ok_or_else(|| anyhow!("--total-depth is required (or set it in --config)"))?;
        let scale = self
            .scale
            .or(base.map(|c| c.scale))
            .ok_or_else(|| anyhow!("--scale is required (or set it in --config)"))?;
        let threshold = self
            .threshold
            .or(base.map(|c| c.threshold))
            .ok_or_else(|| anyhow!("--threshold is required (or set it in --config)"))?;
        let trim = self.trim.or(base.map(|c| c.trim)).unwrap_or(0);

        Ok(SamplingConfig::new(total_depth, scale, threshold, trim))
    }
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
