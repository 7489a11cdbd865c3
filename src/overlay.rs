//! Timestamp stamps and the watermark.
//!
//! Every thumbnail may get its accepted timecode stamped into the
//! bottom-right corner. Exactly one thumbnail, the middle one of the
//! sequence, may additionally carry a centered watermark.

use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};

use crate::configuration::Rgb;
use crate::text::{TextRenderer, points_to_pixels};
use crate::utilities::format_timecode;

/// Distance between the stamp and the thumbnail's bottom-right corner.
pub const STAMP_INSET: u32 = 10;

/// Padding around the timecode inside its stamp box.
pub const STAMP_PADDING: u32 = 5;

/// Fixed opacity of the watermark.
pub const WATERMARK_OPACITY: f32 = 0.6;

/// DPI used to size stamp text.
const STAMP_DPI: u32 = 72;

/// Top-left corner of a `stamp`-sized overlay in the bottom-right corner of
/// a `base`-sized thumbnail, inset by [`STAMP_INSET`].
///
/// Coordinates go negative when the stamp is larger than the thumbnail; the
/// overlay is clipped in that case.
pub fn stamp_position(base: (u32, u32), stamp: (u32, u32)) -> (i64, i64) {
    (
        base.0 as i64 - stamp.0 as i64 - STAMP_INSET as i64,
        base.1 as i64 - stamp.1 as i64 - STAMP_INSET as i64,
    )
}

/// Index of the thumbnail that carries the watermark among `count`.
pub fn watermark_index(count: usize) -> usize {
    count.saturating_sub(1) / 2
}

/// Shrink `watermark` so it fits inside `width × height`, keeping its
/// aspect ratio. Width is fitted first, then height. Watermarks that
/// already fit are returned unchanged.
pub fn fit_watermark(watermark: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let mut fitted = watermark.clone();
    if fitted.width() > width && width > 0 {
        let scaled_height = scale_side(fitted.height(), width, fitted.width());
        fitted = fitted.resize_exact(width, scaled_height, FilterType::Lanczos3);
    }
    if fitted.height() > height && height > 0 {
        let scaled_width = scale_side(fitted.width(), height, fitted.height());
        fitted = fitted.resize_exact(scaled_width, height, FilterType::Lanczos3);
    }
    fitted
}

fn scale_side(side: u32, target: u32, reference: u32) -> u32 {
    ((side as f64 * target as f64 / reference as f64).round() as u32).max(1)
}

/// Top-left corner that centers `overlay` on `base`.
pub fn centered_position(base: (u32, u32), overlay: (u32, u32)) -> (i64, i64) {
    (
        (base.0 as i64 - overlay.0 as i64) / 2,
        (base.1 as i64 - overlay.1 as i64) / 2,
    )
}

/// Alpha-blend `overlay` onto `base` at `(x, y)`, scaling the overlay's own
/// alpha by `opacity`. Pixels outside `base` are clipped.
pub fn blend_overlay(base: &mut RgbaImage, overlay: &RgbaImage, x: i64, y: i64, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity == 0.0 {
        return;
    }
    for (overlay_x, overlay_y, pixel) in overlay.enumerate_pixels() {
        let target_x = x + overlay_x as i64;
        let target_y = y + overlay_y as i64;
        if target_x < 0
            || target_y < 0
            || target_x >= base.width() as i64
            || target_y >= base.height() as i64
        {
            continue;
        }
        let Rgba([red, green, blue, alpha]) = *pixel;
        let weight = alpha as f32 / 255.0 * opacity;
        if weight == 0.0 {
            continue;
        }
        let under = base.get_pixel_mut(target_x as u32, target_y as u32);
        let mix = |below: u8, above: u8| {
            (below as f32 * (1.0 - weight) + above as f32 * weight).round() as u8
        };
        let Rgba([under_red, under_green, under_blue, under_alpha]) = *under;
        let out_alpha = under_alpha as f32 + (255.0 - under_alpha as f32) * weight;
        *under = Rgba([
            mix(under_red, red),
            mix(under_green, green),
            mix(under_blue, blue),
            out_alpha.round() as u8,
        ]);
    }
}

/// Applies stamps and the watermark to processed thumbnails.
///
/// Holds only shared references, so one compositor serves every worker.
#[derive(Debug, Clone, Copy)]
pub struct OverlayCompositor<'a> {
    text: Option<&'a TextRenderer>,
    stamp_pixel_size: f32,
    stamp_opacity: f32,
    watermark: Option<&'a DynamicImage>,
    watermark_index: usize,
}

impl<'a> OverlayCompositor<'a> {
    /// Build a compositor for a sheet of `count` thumbnails.
    ///
    /// `text` is `None` when stamps are disabled, single-image mode is on or
    /// no font could be loaded; no stamps are drawn then.
    pub fn new(
        text: Option<&'a TextRenderer>,
        font_size: u32,
        stamp_opacity: f32,
        watermark: Option<&'a DynamicImage>,
        count: usize,
    ) -> Self {
        Self {
            text,
            stamp_pixel_size: points_to_pixels(font_size, STAMP_DPI),
            stamp_opacity,
            watermark,
            watermark_index: watermark_index(count),
        }
    }

    /// Render the stamp image for `timestamp`: white timecode on black.
    pub fn render_stamp(&self, timestamp: Duration) -> Option<RgbaImage> {
        let text = self.text?;
        Some(text.render(
            &format_timecode(timestamp),
            self.stamp_pixel_size,
            Rgb::WHITE,
            Rgb::BLACK,
            STAMP_PADDING,
        ))
    }

    /// Apply every overlay that belongs on thumbnail `index`, captured at
    /// `timestamp`.
    pub fn apply(&self, index: usize, timestamp: Duration, thumbnail: &mut RgbaImage) {
        if let Some(stamp) = self.render_stamp(timestamp) {
            let (x, y) = stamp_position(thumbnail.dimensions(), stamp.dimensions());
            blend_overlay(thumbnail, &stamp, x, y, self.stamp_opacity);
            log::debug!("stamped {} onto thumbnail {index}", format_timecode(timestamp));
        }

        if index != self.watermark_index {
            return;
        }
        if let Some(watermark) = self.watermark {
            let (width, height) = thumbnail.dimensions();
            let fitted = fit_watermark(watermark, width, height).to_rgba8();
            let (x, y) = centered_position((width, height), fitted.dimensions());
            blend_overlay(thumbnail, &fitted, x, y, WATERMARK_OPACITY);
            log::debug!("watermark applied to thumbnail {index}");
        }
    }
}
