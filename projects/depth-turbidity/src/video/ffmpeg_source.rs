use super::FrameSource;
use anyhow::{anyhow, Context, Result};
use ffmpeg_next::ffi;
use ffmpeg_next::util::frame::Video as VideoFrame;
use image::RgbImage;
use std::path::Path;

/// Frame source backed by FFmpeg via ffmpeg-next.
///
/// Every `frame_at` call seeks to the key frame at or before the target and
/// decodes forward until a frame whose presentation time reaches the target.
pub struct FfmpegSource {
    input_ctx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::codec::decoder::Video,
    video_stream_index: usize,
    /// Seconds per stream timestamp tick.
    time_base: f64,
    /// Presentation time of the first frame, in stream ticks.
    start_pts: i64,
    /// Created lazily, the decoded pixel format is only known per frame.
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    duration: f64,
    reuse_packet: ffmpeg_next::codec::packet::Packet,
    eof_sent: bool,
}

impl FfmpegSource {
    pub fn new(path: &Path) -> Result<Self> {
        ffmpeg_next::init().context("Failed to initialize FFmpeg")?;

        if !path.exists() {
            return Err(anyhow!("Video file not found: {}", path.display()));
        }

        let input_ctx = ffmpeg_next::format::input(&path)
            .with_context(|| format!("Failed to open video file {}", path.display()))?;

        let video_stream = input_ctx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| anyhow!("No video stream found in {}", path.display()))?;

        let video_stream_index = video_stream.index();
        let start_pts = match video_stream.start_time() {
            ffi::AV_NOPTS_VALUE => 0,
            ts => ts,
        };
        let tb = video_stream.time_base();
        let time_base = if tb.denominator() > 0 {
            tb.numerator() as f64 / tb.denominator() as f64
        } else {
            1.0 / ffi::AV_TIME_BASE as f64
        };

        // Prefer the stream's own duration, the container's may include other tracks.
        let stream_duration = video_stream.duration();
        let duration = if stream_duration > 0 {
            stream_duration as f64 * time_base
        } else {
            input_ctx.duration().max(0) as f64 / ffi::AV_TIME_BASE as f64
        };
        if duration <= 0.0 {
            tracing::warn!("FfmpegSource: {} reports no duration", path.display());
        }

        let decoder_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(video_stream.parameters())
                .context("Failed to create decoder context")?;
        let decoder = decoder_ctx
            .decoder()
            .video()
            .context("Failed to open video decoder")?;

        let width = decoder.width();
        let height = decoder.height();

        tracing::info!(
            "FfmpegSource: opened {}, duration={:.2}s, size={}x{}",
            path.display(),
            duration,
            width,
            height
        );

        Ok(Self {
            input_ctx,
            decoder,
            video_stream_index,
            time_base,
            start_pts,
            scaler: None,
            width,
            height,
            duration,
            reuse_packet: ffmpeg_next::codec::packet::Packet::empty(),
            eof_sent: false,
        })
    }

    fn seek(&mut self, time_secs: f64) -> Result<()> {
        // Container-level seek, so the timestamp is in AV_TIME_BASE units.
        let start_secs = self.start_pts as f64 * self.time_base;
        let timestamp = ((start_secs + time_secs) * ffi::AV_TIME_BASE as f64) as i64;
        self.input_ctx
            .seek(timestamp, ..timestamp)
            .with_context(|| format!("Failed to seek to {:.3}s", time_secs))?;
        self.decoder.flush();
        self.eof_sent = false;
        self.scaler = None;
        Ok(())
    }

    /// Pulls the next decoded frame, feeding packets as the decoder asks for them.
    fn decode_next(&mut self, target_frame: &mut VideoFrame) -> Result<()> {
        loop {
            match self.decoder.receive_frame(target_frame) {
                Ok(()) => return Ok(()),
                Err(ffmpeg_next::Error::Other { errno: ffi::EAGAIN }) => {
                    if self.eof_sent {
                        return Err(anyhow!("End of stream"));
                    }
                }
                Err(ffmpeg_next::Error::Eof) => return Err(anyhow!("End of stream")),
                Err(e) => return Err(anyhow!("Decoder error: {}", e)),
            }

            let mut found_packet = false;
            while self.reuse_packet.read(&mut self.input_ctx).is_ok() {
                if self.reuse_packet.stream() == self.video_stream_index {
                    self.decoder
                        .send_packet(&self.reuse_packet)
                        .context("Failed to send packet to decoder")?;
                    found_packet = true;
                    break;
                }
            }

            if !found_packet {
                self.decoder
                    .send_eof()
                    .context("Failed to send EOF to decoder")?;
                self.eof_sent = true;
            }
        }
    }

    fn to_rgb_image(&mut self, frame: &VideoFrame) -> Result<RgbImage> {
        if self.scaler.is_none() {
            let scaler = ffmpeg_next::software::scaling::Context::get(
                frame.format(),
                self.width,
                self.height,
                ffmpeg_next::format::Pixel::RGB24,
                self.width,
                self.height,
                ffmpeg_next::software::scaling::Flags::BILINEAR,
            )
            .context("Failed to create scaler")?;
            self.scaler = Some(scaler);
        }
        let scaler = self
            .scaler
            .as_mut()
            .ok_or_else(|| anyhow!("Scaler unavailable"))?;

        let mut rgb = VideoFrame::empty();
        scaler.run(frame, &mut rgb).context("Scaler failed")?;

        // Rows are padded to the stride, copy them out tightly packed.
        let width = rgb.width() as usize;
        let height = rgb.height() as usize;
        let stride = rgb.stride(0);
        let data = rgb.data(0);
        let mut buffer = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            let offset = y * stride;
            buffer.extend_from_slice(&data[offset..offset + width * 3]);
        }

        RgbImage::from_raw(width as u32, height as u32, buffer)
            .ok_or_else(|| anyhow!("Decoded frame has unexpected size {}x{}", width, height))
    }
}

/// Stream ticks of the frame shown `time_secs` after the first one.
fn target_pts(start_pts: i64, time_base: f64, time_secs: f64) -> i64 {
    start_pts + (time_secs / time_base).floor() as i64
}

/// Frames without any timestamp are taken as they come.
fn has_arrived(pts: Option<i64>, target_pts: i64) -> bool {
    pts.map_or(true, |ts| ts >= target_pts)
}

impl FrameSource for FfmpegSource {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_at(&mut self, time_secs: f64) -> Result<RgbImage> {
        self.seek(time_secs)?;
        let target_ts = target_pts(self.start_pts, self.time_base, time_secs);

        let mut last: Option<VideoFrame> = None;
        loop {
            let mut frame = VideoFrame::empty();
            match self.decode_next(&mut frame) {
                Ok(()) => {
                    if has_arrived(frame.timestamp().or_else(|| frame.pts()), target_ts) {
                        return self.to_rgb_image(&frame);
                    }
                    last = Some(frame);
                }
                // Target lies past the final frame: show the last one decoded.
                Err(e) => {
                    return match last.take() {
                        Some(frame) => self.to_rgb_image(&frame),
                        None => Err(e.context(format!("No frame decoded at {:.3}s", time_secs))),
                    }
                }
            }
        }
    }
}
