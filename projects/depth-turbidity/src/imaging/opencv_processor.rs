use super::ImageProcessor;
use anyhow::{anyhow, Context, Result};
use image::{GrayImage, RgbImage};
use opencv::{core, imgproc, prelude::*};

/// `ImageProcessor` backed by OpenCV's imgproc module.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpencvProcessor;

impl ImageProcessor for OpencvProcessor {
    fn grayscale(&self, frame: &RgbImage) -> Result<GrayImage> {
        let rgb = rgb_image_to_mat(frame)?;
        let mut gray = core::Mat::default();
        imgproc::cvt_color_def(&rgb, &mut gray, imgproc::COLOR_RGB2GRAY)
            .context("cvtColor RGB2GRAY failed")?;
        mat_to_gray_image(&gray)
    }

    fn binarize(&self, gray: &GrayImage, threshold: u8) -> Result<GrayImage> {
        let src = gray_image_to_mat(gray)?;
        let mut dst = core::Mat::default();
        // THRESH_BINARY keeps pixels strictly above the cutoff; shift by one
        // so that `threshold` itself is foreground.
        imgproc::threshold(
            &src,
            &mut dst,
            f64::from(threshold) - 1.0,
            255.0,
            imgproc::THRESH_BINARY,
        )
        .context("threshold failed")?;
        mat_to_gray_image(&dst)
    }

    fn count_foreground(&self, binary: &GrayImage) -> Result<u64> {
        let mat = gray_image_to_mat(binary)?;
        let count = core::count_non_zero(&mat).context("countNonZero failed")?;
        Ok(count as u64)
    }
}

/// Copies an RGB buffer into a freshly allocated `CV_8UC3` Mat.
pub(crate) fn rgb_image_to_mat(image: &RgbImage) -> Result<core::Mat> {
    copy_into_mat(image.as_raw(), image.width(), image.height(), core::CV_8UC3, 3)
}

pub(crate) fn gray_image_to_mat(image: &GrayImage) -> Result<core::Mat> {
    copy_into_mat(image.as_raw(), image.width(), image.height(), core::CV_8UC1, 1)
}

fn copy_into_mat(data: &[u8], width: u32, height: u32, typ: i32, channels: usize) -> Result<core::Mat> {
    let row_len = width as usize * channels;
    let mut mat = unsafe { core::Mat::new_rows_cols(height as i32, width as i32, typ) }
        .context("Failed to allocate Mat")?;

    for y in 0..height as usize {
        let src_row = &data[y * row_len..(y + 1) * row_len];
        let dst_ptr = mat.ptr_mut(y as i32)?;
        unsafe {
            std::ptr::copy_nonoverlapping(src_row.as_ptr(), dst_ptr, row_len);
        }
    }

    Ok(mat)
}

pub(crate) fn mat_to_gray_image(mat: &core::Mat) -> Result<GrayImage> {
    let (width, height, data) = continuous_bytes(mat)?;
    GrayImage::from_raw(width, height, data)
        .ok_or_else(|| anyhow!("Mat data does not match a {}x{} gray image", width, height))
}

pub(crate) fn mat_to_rgb_image(mat: &core::Mat) -> Result<RgbImage> {
    let (width, height, data) = continuous_bytes(mat)?;
    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| anyhow!("Mat data does not match a {}x{} RGB image", width, height))
}

fn continuous_bytes(mat: &core::Mat) -> Result<(u32, u32, Vec<u8>)> {
    let size = mat.size()?;
    if !mat.is_continuous() {
        return Err(anyhow!("Mat is not continuous"));
    }
    Ok((
        size.width as u32,
        size.height as u32,
        mat.data_bytes()?.to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::luma::LumaProcessor;
    use image::Luma;

    #[test]
    fn test_matches_luma_threshold_semantics() {
        let ramp = GrayImage::from_fn(16, 16, |x, y| Luma([(y * 16 + x) as u8]));
        for threshold in [0u8, 1, 127, 200, 255] {
            let cv = OpencvProcessor.binarize(&ramp, threshold).unwrap();
            let luma = LumaProcessor.binarize(&ramp, threshold).unwrap();
            assert_eq!(cv, luma, "threshold {}", threshold);
        }
    }

    #[test]
    fn test_counts_non_zero() {
        let mut binary = GrayImage::new(5, 5);
        binary.put_pixel(1, 1, Luma([255]));
        binary.put_pixel(3, 4, Luma([255]));
        assert_eq!(OpencvProcessor.count_foreground(&binary).unwrap(), 2);
    }
}
