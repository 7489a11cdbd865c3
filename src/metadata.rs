//! Video metadata types.
//!
//! [`VideoMetadata`] is read once when a video is opened and stays
//! immutable for the rest of the run.

use std::time::Duration;

/// Metadata describing the video being summarized.
///
/// # Example
///
/// ```no_run
/// use mt::{FrameSource, VideoFile};
///
/// let video = VideoFile::open("input.mp4").unwrap();
/// let metadata = video.metadata();
/// println!("{}x{} for {:?}", metadata.width, metadata.height, metadata.duration);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Total duration of the video.
    pub duration: Duration,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Container bit rate in bits per second, `0` when unknown.
    pub bit_rate: u64,
    /// Descriptive name of the video codec (e.g. `"H.264 / AVC / MPEG-4 AVC"`).
    pub video_codec: String,
    /// Descriptive name of the audio codec, `None` for silent videos.
    pub audio_codec: Option<String>,
}

impl VideoMetadata {
    /// Duration in whole milliseconds.
    pub fn duration_millis(&self) -> u64 {
        self.duration.as_millis() as u64
    }
}
