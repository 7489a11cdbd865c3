//! The metadata header band.
//!
//! The band sits above the thumbnail grid and lists the file name, size,
//! duration and resolution (plus frame rate, bitrate and codecs on request).
//! An optional side image is placed flush right.

use std::path::Path;

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::configuration::Rgb;
use crate::metadata::VideoMetadata;
use crate::overlay::blend_overlay;
use crate::text::{TextRenderer, points_to_pixels};
use crate::utilities::{format_timecode, human_bytes};

/// DPI used to size header text.
const HEADER_DPI: u32 = 96;

/// Vertical space above the first line plus below the last one.
pub const HEADER_MARGIN: u32 = 15;

/// Offset of the first baseline's line box from the top of the band.
const TOP_OFFSET: u32 = 5;

/// Left inset of the text column.
const TEXT_INSET: u32 = 10;

/// Inset of the side image from the band edges.
const IMAGE_INSET: u32 = 10;

/// Height of one header line: the font size plus 4 points, at 96 DPI.
pub fn line_height(font_size: u32) -> u32 {
    (font_size + 4) * HEADER_DPI / 72
}

/// Height of a band holding `line_count` lines at `font_size`.
pub fn band_height(line_count: usize, font_size: u32) -> u32 {
    line_height(font_size) * line_count as u32 + HEADER_MARGIN
}

/// Assemble the header text lines for a video.
///
/// `file_size` is the size of the video file in bytes.
pub fn header_lines(
    path: &Path,
    file_size: u64,
    metadata: &VideoMetadata,
    include_meta: bool,
) -> Vec<String> {
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().to_string());

    let mut lines = vec![
        format!("File Name: {file_name}"),
        format!("File Size: {}", human_bytes(file_size)),
        format!("Duration: {}", format_timecode(metadata.duration)),
        format!("Resolution: {}x{}", metadata.width, metadata.height),
    ];

    if include_meta {
        lines.push(format!(
            "FPS: {:.2}, Bitrate: {} kb/s",
            metadata.frames_per_second,
            metadata.bit_rate / 1000
        ));
        lines.push(format!(
            "Codec: {} / {}",
            metadata.video_codec,
            metadata.audio_codec.as_deref().unwrap_or("none")
        ));
    }

    lines
}

/// Colors and font settings for the band.
#[derive(Debug, Clone, Copy)]
pub struct HeaderStyle {
    /// Band background.
    pub background: Rgb,
    /// Text color.
    pub foreground: Rgb,
    /// Font size in points.
    pub font_size: u32,
}

/// A fully described header band, ready to render.
#[derive(Debug, Clone)]
pub struct HeaderSpec<'a> {
    /// Lines in display order.
    pub lines: Vec<String>,
    /// Optional side image.
    pub side_image: Option<&'a DynamicImage>,
    /// Colors and font size.
    pub style: HeaderStyle,
}

impl HeaderSpec<'_> {
    /// Rendered height of this band.
    pub fn height(&self) -> u32 {
        band_height(self.lines.len(), self.style.font_size)
    }

    /// Render the band at `width` pixels wide.
    pub fn render(&self, width: u32, text: &TextRenderer) -> RgbaImage {
        let height = self.height();
        let mut band = RgbaImage::from_pixel(width, height, self.style.background.to_rgba());

        if let Some(side_image) = self.side_image {
            let fitted = fit_side_image(side_image, height).to_rgba8();
            let (x, y) = side_image_position((width, height), fitted.dimensions());
            blend_overlay(&mut band, &fitted, x, y, 1.0);
        }

        let pixel_size = points_to_pixels(self.style.font_size, HEADER_DPI);
        let step = line_height(self.style.font_size);
        for (index, line) in self.lines.iter().enumerate() {
            let baseline = TOP_OFFSET + step * (index as u32 + 1);
            text.draw(
                &mut band,
                line,
                TEXT_INSET as i64,
                baseline as i64,
                pixel_size,
                self.style.foreground,
            );
        }

        band
    }
}

/// Shrink `image` to fit the band's inner height (`band_height - 20`),
/// keeping its aspect ratio.
pub fn fit_side_image(image: &DynamicImage, band_height: u32) -> DynamicImage {
    let limit = band_height.saturating_sub(IMAGE_INSET * 2).max(1);
    if image.height() < limit {
        return image.clone();
    }
    let width = ((image.width() as f64 * limit as f64 / image.height() as f64).round() as u32).max(1);
    image.resize_exact(width, limit, FilterType::Lanczos3)
}

/// Top-left corner of the side image: vertically centered (never closer
/// than the inset to the top) and flush right with the inset.
pub fn side_image_position(band: (u32, u32), image: (u32, u32)) -> (i64, i64) {
    let x = band.0 as i64 - image.0 as i64 - IMAGE_INSET as i64;
    let y = ((band.1 as i64 - image.1 as i64) / 2).max(IMAGE_INSET as i64);
    (x, y)
}
