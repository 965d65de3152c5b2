use crate::cli::{ProfileArgs, ViewArgs};
use crate::export::{save_viewer_images, write_result};
use crate::imaging::create_processor;
use crate::pipeline::analyzer::FrameAnalyzer;
use crate::pipeline::series::SeriesBuilder;
use crate::pipeline::viewer::{FrameViewer, ViewerQuery};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;

const PROGRESS_TICKS: u64 = 1000;

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(PROGRESS_TICKS);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

pub fn profile(args: ProfileArgs) -> Result<()> {
    let config = args.sampling.resolve()?;
    let processor = create_processor(args.engine.processor)?;
    let mut builder = SeriesBuilder::new(FrameAnalyzer::new(processor));

    let pb = progress_bar(args.no_progress)?;
    let result = builder.run(&args.video, args.engine.backend, &config, |fraction| {
        pb.set_position((fraction * PROGRESS_TICKS as f64).round() as u64);
    });
    match &result {
        Ok(_) => pb.finish(),
        Err(_) => pb.abandon(),
    }
    tracing::debug!("Profiling run ended in state {:?}", builder.state());
    let result = result?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_result(&result, args.format, BufWriter::new(file))?;
            tracing::info!("Wrote {} samples to {}", result.ratios.len(), path.display());
        }
        None => write_result(&result, args.format, std::io::stdout().lock())?,
    }

    Ok(())
}

pub fn view(args: ViewArgs) -> Result<()> {
    let config = args.sampling.resolve()?;
    let processor = create_processor(args.engine.processor)?;
    let viewer = FrameViewer::new(FrameAnalyzer::new(processor));

    let query = ViewerQuery {
        mode: args.mode,
        value: args.value,
    };
    let result = viewer.capture(&args.video, args.engine.backend, query, &config)?;
    let (original, binarized) = save_viewer_images(&result, &args.output_dir)?;

    tracing::info!(
        "Frame at {:.3}s saved to {} and {}",
        result.time,
        original.display(),
        binarized.display()
    );

    Ok(())
}
