//! The frame-source abstraction.
//!
//! Everything that decides *which* frames to take (planner, sampler) talks
//! to video through [`FrameSource`]. The FFmpeg-backed implementation is
//! [`VideoFile`](crate::VideoFile); tests substitute scripted sources.

use std::time::Duration;

use image::DynamicImage;

use crate::error::SheetError;
use crate::metadata::VideoMetadata;

/// A seekable source of decoded video frames.
///
/// Implementations may hold a single decoder handle, so `frame_at` takes
/// `&mut self` and calls are serialized by the borrow checker. Resources are
/// released when the source is dropped.
pub trait FrameSource {
    /// Metadata cached when the source was opened.
    fn metadata(&self) -> &VideoMetadata;

    /// Decode the first frame at or after `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidTimestamp`] when `timestamp` lies past the
    /// end of the video, or a decode error when no frame can be produced.
    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, SheetError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn metadata(&self) -> &VideoMetadata {
        (**self).metadata()
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, SheetError> {
        (**self).frame_at(timestamp)
    }
}
