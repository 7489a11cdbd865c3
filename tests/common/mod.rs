//! Scripted frame source shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::time::Duration;

use image::{DynamicImage, Rgb as Pixel, RgbImage};
use mt::{FrameSource, Rgb, SheetError, VideoMetadata};

pub const CONTENT: Rgb = Rgb(120, 80, 40);

/// Serves solid-color frames chosen by a script and records every request.
pub struct ScriptedSource<F> {
    metadata: VideoMetadata,
    script: F,
    pub requests: RefCell<Vec<Duration>>,
}

impl<F> ScriptedSource<F>
where
    F: FnMut(Duration) -> Option<Rgb>,
{
    /// `script` returns the frame color for a position, or `None` for a
    /// decode failure.
    pub fn new(duration: Duration, width: u32, height: u32, script: F) -> Self {
        Self {
            metadata: VideoMetadata {
                duration,
                width,
                height,
                frames_per_second: 25.0,
                bit_rate: 1_500_000,
                video_codec: "scripted".to_string(),
                audio_codec: None,
            },
            script,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requested_millis(&self) -> Vec<u64> {
        self.requests
            .borrow()
            .iter()
            .map(|position| position.as_millis() as u64)
            .collect()
    }
}

impl<F> FrameSource for ScriptedSource<F>
where
    F: FnMut(Duration) -> Option<Rgb>,
{
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn frame_at(&mut self, timestamp: Duration) -> Result<DynamicImage, SheetError> {
        self.requests.borrow_mut().push(timestamp);
        let color = (self.script)(timestamp).ok_or(SheetError::VideoDecodeError {
            timestamp,
            reason: "scripted failure".to_string(),
        })?;
        Ok(solid(self.metadata.width, self.metadata.height, color))
    }
}

pub fn solid(width: u32, height: u32, color: Rgb) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Pixel([color.0, color.1, color.2]),
    ))
}
