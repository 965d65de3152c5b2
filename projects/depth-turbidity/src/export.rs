use crate::pipeline::series::ProcessResult;
use crate::pipeline::viewer::ViewerResult;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `depth,ratio` rows
    #[default]
    Csv,
    /// The whole result including duration
    Json,
}

pub fn write_result<W: Write>(result: &ProcessResult, format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(result, writer),
        OutputFormat::Json => write_json(result, writer),
    }
}

/// Writes one `depth,ratio` row per sample, header first.
pub fn write_csv<W: Write>(result: &ProcessResult, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if result.ratios.is_empty() {
        csv_writer.write_record(["depth", "ratio"])?;
    }
    for sample in &result.ratios {
        csv_writer.serialize(sample)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(result: &ProcessResult, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, result)?;
    writeln!(writer)?;
    Ok(())
}

/// Saves `original.png` and `binarized.png` under `output_dir`.
pub fn save_viewer_images(result: &ViewerResult, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let original_path = output_dir.join("original.png");
    result
        .original
        .save(&original_path)
        .with_context(|| format!("Failed to write {}", original_path.display()))?;

    let binarized_path = output_dir.join("binarized.png");
    result
        .binarized
        .save(&binarized_path)
        .with_context(|| format!("Failed to write {}", binarized_path.display()))?;

    Ok((original_path, binarized_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::series::FrameSample;
    use image::{GrayImage, RgbImage};

    fn sample_result() -> ProcessResult {
        ProcessResult {
            ratios: vec![
                FrameSample {
                    depth: 0.0,
                    ratio: 0.5,
                },
                FrameSample {
                    depth: 5.0,
                    ratio: -0.25,
                },
            ],
            duration: 10.0,
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut out = Vec::new();
        write_csv(&sample_result(), &mut out).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(headers, vec!["depth", "ratio"]);

        let rows: Vec<FrameSample> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, sample_result().ratios);
    }

    #[test]
    fn test_csv_empty_series_still_has_header() {
        let empty = ProcessResult {
            ratios: Vec::new(),
            duration: 1.0,
        };
        let mut out = Vec::new();
        write_csv(&empty, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "depth,ratio\n");
    }

    #[test]
    fn test_json_round_trips() {
        let mut out = Vec::new();
        write_result(&sample_result(), OutputFormat::Json, &mut out).unwrap();
        let parsed: ProcessResult = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, sample_result());
    }

    #[test]
    fn test_save_viewer_images() {
        let dir = std::env::temp_dir().join(format!("depth-turbidity-view-{}", std::process::id()));
        let result = ViewerResult {
            time: 1.0,
            original: RgbImage::new(3, 2),
            binarized: GrayImage::new(3, 2),
        };

        let (original, binarized) = save_viewer_images(&result, &dir).unwrap();
        assert!(original.exists());
        assert!(binarized.exists());
        assert_eq!(image::open(&binarized).unwrap().width(), 3);

        std::fs::remove_dir_all(&dir).ok();
    }
}
