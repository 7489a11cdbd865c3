//! Error types for the `mt` crate.
//!
//! This module defines [`SheetError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry enough context (file path,
//! timestamp, upstream message) to diagnose a failed run from the log alone.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all contact-sheet operations.
///
/// Decode-class errors ([`FileOpen`](SheetError::FileOpen),
/// [`VideoDecodeError`](SheetError::VideoDecodeError), ...) are fatal for the
/// file being processed but never for the batch: the batch loop in
/// [`SheetGenerator::run_batch`](crate::SheetGenerator::run_batch) records
/// them and moves on to the next input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SheetError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A frame could not be decoded at the requested position.
    #[error("Failed to decode video frame at {timestamp:?}: {reason}")]
    VideoDecodeError {
        /// Position that was requested from the frame source.
        timestamp: Duration,
        /// Underlying reason the decode failed.
        reason: String,
    },

    /// The requested timestamp exceeds the video duration.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(Duration),

    /// The video reports no usable duration.
    #[error("Invalid video duration: {0:?}")]
    InvalidDuration(Duration),

    /// The sample interval collapsed to zero.
    #[error("Cannot place {count} captures in {duration:?}: interval is zero")]
    IntervalTooSmall {
        /// Duration of the video.
        duration: Duration,
        /// Requested capture count.
        count: u32,
    },

    /// A configuration value is outside its valid domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A color string is not an `R,G,B` triple.
    #[error("Invalid color {0:?}: expected \"R,G,B\"")]
    InvalidColor(String),

    /// A configuration file exists but could not be read or parsed.
    #[error("Failed to load config file {path}: {reason}")]
    ConfigFile {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// No usable font could be resolved or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// A thumbnail does not share the dimensions of the first one.
    #[error(
        "Thumbnail {index} is {}x{}, expected {}x{}",
        actual.0, actual.1, expected.0, expected.1
    )]
    ThumbnailSizeMismatch {
        /// Position of the offending thumbnail in the sheet.
        index: usize,
        /// Dimensions of the first thumbnail.
        expected: (u32, u32),
        /// Dimensions of the offending thumbnail.
        actual: (u32, u32),
    },

    /// A contact sheet was requested with no thumbnails.
    #[error("Cannot compose a contact sheet without thumbnails")]
    EmptySheet,

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while loading, processing or saving.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for SheetError {
    fn from(error: FfmpegError) -> Self {
        SheetError::FfmpegError(error.to_string())
    }
}
