//! Blank-frame detection.
//!
//! A frame is "blank" when nearly all of its pixels are close to black or
//! close to white: fades, title cards, flash frames. The counts are returned
//! to the caller rather than accumulated anywhere shared, so frames can be
//! checked from any number of threads at once.

use image::DynamicImage;

/// Channels below this value count as near-black.
const DARK_LIMIT: u8 = 50;

/// Channels above this value count as near-white.
const LIGHT_LIMIT: u8 = 205;

/// Frames at or above this blank percentage are rejected.
pub const BLANK_THRESHOLD_PERCENT: u64 = 85;

/// Pixel statistics for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlankStats {
    /// Pixels whose three channels are all near-black or all near-white.
    pub blank: u64,
    /// Total pixels inspected.
    pub total: u64,
}

impl BlankStats {
    /// Count blank pixels in `image`.
    pub fn measure(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let mut stats = BlankStats::default();
        for pixel in rgb.pixels() {
            let [red, green, blue] = pixel.0;
            let dark = red < DARK_LIMIT && green < DARK_LIMIT && blue < DARK_LIMIT;
            let light = red > LIGHT_LIMIT && green > LIGHT_LIMIT && blue > LIGHT_LIMIT;
            if dark || light {
                stats.blank += 1;
            }
            stats.total += 1;
        }
        stats
    }

    /// Integer percentage of blank pixels, computed as
    /// `blank / (total / 100)`.
    ///
    /// Frames with fewer than 100 pixels fall back to `blank × 100 / total`;
    /// an empty frame is 0% blank.
    pub fn blank_percent(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let hundredth = self.total / 100;
        if hundredth == 0 {
            self.blank * 100 / self.total
        } else {
            self.blank / hundredth
        }
    }

    /// Whether the frame should be rejected.
    pub fn is_blank(&self) -> bool {
        self.blank_percent() >= BLANK_THRESHOLD_PERCENT
    }
}

/// Measure `image` and report whether it is blank.
pub fn is_blank_frame(image: &DynamicImage) -> bool {
    let stats = BlankStats::measure(image);
    let blank = stats.is_blank();
    if blank {
        log::debug!("frame is {}% blank", stats.blank_percent());
    }
    blank
}
