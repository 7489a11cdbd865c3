//! FFmpeg-backed frame source.
//!
//! [`VideoFile`] opens a container, caches its [`VideoMetadata`], and decodes
//! single frames at arbitrary timestamps. The demuxer context is owned by the
//! struct and released on drop, so every exit path of a run frees it.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    error::SheetError, metadata::VideoMetadata, source::FrameSource, utilities,
};

/// An opened video file.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use mt::{FrameSource, SheetError, VideoFile};
///
/// let mut video = VideoFile::open("input.mp4")?;
/// let frame = video.frame_at(Duration::from_secs(30))?;
/// frame.save("frame_at_30s.png")?;
/// # Ok::<(), SheetError>(())
/// ```
pub struct VideoFile {
    input_context: Input,
    metadata: VideoMetadata,
    video_stream_index: usize,
    file_path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, locates the best
    /// video stream and caches its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::FileOpen`] if the file cannot be opened or its
    /// codec parameters cannot be read, and [`SheetError::NoVideoStream`] if
    /// it carries no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| SheetError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SheetError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let open_error = |reason: String| SheetError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };
        let bit_rate = input_context.bit_rate().max(0) as u64;

        let video_stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(SheetError::NoVideoStream)?;
        let video_stream_index = video_stream.index();

        let decoder_context = CodecContext::from_parameters(video_stream.parameters())
            .map_err(|error| open_error(format!("Failed to read video codec parameters: {error}")))?;
        let video_decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let frame_rate = video_stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = video_stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let video_codec = video_decoder
            .codec()
            .map(|codec| codec.description().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let audio_codec = input_context.streams().best(Type::Audio).and_then(|stream| {
            let context = CodecContext::from_parameters(stream.parameters()).ok()?;
            let decoder = context.decoder().audio().ok()?;
            decoder.codec().map(|codec| codec.description().to_string())
        });

        let metadata = VideoMetadata {
            duration,
            width: video_decoder.width(),
            height: video_decoder.height(),
            frames_per_second,
            bit_rate,
            video_codec,
            audio_codec,
        };

        log::info!(
            "Opened video file: {} ({}x{}, {:.2} fps, duration={:.2}s, codec={})",
            file_path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.duration.as_secs_f64(),
            metadata.video_codec,
        );

        Ok(Self {
            input_context,
            metadata,
            video_stream_index,
            file_path,
        })
    }

    /// Path the video was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn decode_error(timestamp: Duration, reason: impl Into<String>) -> SheetError {
        SheetError::VideoDecodeError {
            timestamp,
            reason: reason.into(),
        }
    }
}

impl FrameSource for VideoFile {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Seeks to the keyframe before `timestamp` and decodes forward until the
    /// first frame whose presentation time reaches it.
    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, SheetError> {
        if timestamp > self.metadata.duration {
            return Err(SheetError::InvalidTimestamp(timestamp));
        }

        let width = self.metadata.width;
        let height = self.metadata.height;

        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(SheetError::NoVideoStream)?;
        let time_base = stream.time_base();
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let seek_target = utilities::duration_to_seek_timestamp(timestamp);
        self.input_context
            .seek(seek_target, ..seek_target)
            .map_err(|error| Self::decode_error(timestamp, format!("seek failed: {error}")))?;

        let target_seconds = timestamp.as_secs_f64();
        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.timestamp().or(decoded_frame.pts()).unwrap_or(0);
                if utilities::pts_to_seconds(pts, time_base) >= target_seconds {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return convert_frame_to_image(&rgb_frame, width, height, timestamp);
                }
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame.timestamp().or(decoded_frame.pts()).unwrap_or(0);
            if utilities::pts_to_seconds(pts, time_base) >= target_seconds {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return convert_frame_to_image(&rgb_frame, width, height, timestamp);
            }
        }

        Err(Self::decode_error(
            timestamp,
            "no frame found at or after the requested position",
        ))
    }
}

/// Convert a scaled RGB24 video frame to an [`image::DynamicImage`].
fn convert_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
    timestamp: Duration,
) -> Result<DynamicImage, SheetError> {
    let buffer = utilities::frame_to_rgb_buffer(rgb_frame, width, height);
    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        VideoFile::decode_error(timestamp, "decoded frame buffer does not match its dimensions")
    })?;
    Ok(DynamicImage::ImageRgb8(rgb_image))
}
