//! Contact-sheet configuration.
//!
//! [`SheetOptions`] is the one validated structure every component reads
//! from. It is built once at startup (see [`crate::settings`] for the
//! file/environment/CLI layering) and passed by reference into the pipeline.
//!
//! # Example
//!
//! ```
//! use mt::{FilterKind, Rgb, SheetOptions};
//!
//! let options = SheetOptions::new()
//!     .with_capture_count(12)
//!     .with_columns(4)
//!     .with_padding(5)
//!     .with_filter(FilterKind::Greyscale)
//!     .with_content_background(Rgb(32, 32, 32));
//! assert!(options.validate().is_ok());
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use image::Rgba;

use crate::error::SheetError;
use crate::filter::FilterKind;

/// An opaque 8-bit RGB color, written `R,G,B` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Opaque black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `value`, falling back to `fallback` (with a warning) when the
    /// string is not a valid `R,G,B` triple.
    pub fn parse_or(value: &str, fallback: Rgb) -> Rgb {
        match value.parse::<Rgb>() {
            Ok(color) => {
                log::debug!("color {value} converted to {color}");
                color
            }
            Err(error) => {
                log::warn!("{error}, using fallback color {fallback}");
                fallback
            }
        }
    }

    /// The color as a fully opaque RGBA pixel.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.0, self.1, self.2, 255])
    }
}

impl FromStr for Rgb {
    type Err = SheetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || SheetError::InvalidColor(value.to_string());
        let channels: Vec<&str> = value.split(',').collect();
        if channels.len() != 3 {
            return Err(invalid());
        }
        let mut parsed = [0u8; 3];
        for (slot, channel) in parsed.iter_mut().zip(&channels) {
            *slot = channel.trim().parse::<u8>().map_err(|_| invalid())?;
        }
        Ok(Rgb(parsed[0], parsed[1], parsed[2]))
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{},{},{}", self.0, self.1, self.2)
    }
}

/// Target thumbnail size.
///
/// A non-zero width wins and the height follows the source aspect ratio.
/// With width zero a non-zero height is used instead. When both are zero
/// frames keep their source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSize {
    /// Target width in pixels, `0` for "derive from height".
    pub width: u32,
    /// Target height in pixels, `0` for "derive from width".
    pub height: u32,
}

impl Default for ThumbnailSize {
    fn default() -> Self {
        Self {
            width: 400,
            height: 0,
        }
    }
}

impl ThumbnailSize {
    /// Resolve the final thumbnail dimensions for a frame of the given size.
    ///
    /// Returns `(width, height)`.
    pub fn resolve(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        if source_width == 0 || source_height == 0 {
            return (source_width, source_height);
        }
        if self.width > 0 {
            let ratio = self.width as f64 / source_width as f64;
            let height = (source_height as f64 * ratio).round() as u32;
            (self.width, height.max(1))
        } else if self.height > 0 {
            let ratio = self.height as f64 / source_height as f64;
            let width = (source_width as f64 * ratio).round() as u32;
            (width.max(1), self.height)
        } else {
            (source_width, source_height)
        }
    }
}

/// Validated settings for one run of the contact-sheet generator.
///
/// Defaults mirror the command-line defaults: 4 captures in 2 columns,
/// 10 px padding, 400 px wide thumbnails, timestamps and header enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetOptions {
    /// Number of thumbnails to capture per video.
    pub capture_count: u32,
    /// Number of grid columns.
    pub columns: u32,
    /// Padding around and between grid cells, in pixels.
    pub padding: u32,
    /// Target thumbnail size.
    pub thumbnail_size: ThumbnailSize,
    /// Font name or path used for timestamps and header text.
    pub font: String,
    /// Font size in points.
    pub font_size: u32,
    /// Skip stamping timecodes onto thumbnails.
    pub disable_timestamps: bool,
    /// Opacity of the timestamp stamp, `0.0..=1.0`.
    pub timestamp_opacity: f32,
    /// Output file name template; the first `%s` is replaced by the input path.
    pub filename_template: String,
    /// Write one image per capture instead of a contact sheet.
    pub single_images: bool,
    /// Background color of the thumbnail grid.
    pub content_background: Rgb,
    /// Prepend the metadata header band.
    pub header: bool,
    /// Add FPS/bitrate and codec lines to the header.
    pub header_meta: bool,
    /// Header background color.
    pub header_background: Rgb,
    /// Header text color.
    pub header_foreground: Rgb,
    /// Optional image placed at the right edge of the header.
    pub header_image: Option<PathBuf>,
    /// Optional watermark blended onto the middle thumbnail.
    pub watermark: Option<PathBuf>,
    /// Filter applied to every thumbnail.
    pub filter: FilterKind,
    /// Retry captures that land on near-blank frames.
    pub skip_blank: bool,
    /// Worker threads for thumbnail processing, `0` for one per CPU.
    pub threads: usize,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetOptions {
    /// Create options with the default settings.
    pub fn new() -> Self {
        Self {
            capture_count: 4,
            columns: 2,
            padding: 10,
            thumbnail_size: ThumbnailSize::default(),
            font: "DroidSans.ttf".to_string(),
            font_size: 12,
            disable_timestamps: false,
            timestamp_opacity: 1.0,
            filename_template: "%s.jpg".to_string(),
            single_images: false,
            content_background: Rgb::BLACK,
            header: true,
            header_meta: false,
            header_background: Rgb::BLACK,
            header_foreground: Rgb::WHITE,
            header_image: None,
            watermark: None,
            filter: FilterKind::None,
            skip_blank: false,
            threads: 0,
        }
    }

    /// Set the number of captures per video.
    #[must_use]
    pub fn with_capture_count(mut self, count: u32) -> Self {
        self.capture_count = count;
        self
    }

    /// Set the number of grid columns.
    #[must_use]
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns;
        self
    }

    /// Set the grid padding in pixels. `0` disables padding entirely.
    #[must_use]
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Set the target thumbnail size.
    #[must_use]
    pub fn with_thumbnail_size(mut self, width: u32, height: u32) -> Self {
        self.thumbnail_size = ThumbnailSize { width, height };
        self
    }

    /// Set the font name or path.
    #[must_use]
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Set the font size in points. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size.max(1);
        self
    }

    /// Enable or disable timestamp stamps.
    #[must_use]
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.disable_timestamps = !enabled;
        self
    }

    /// Set the timestamp opacity. Clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_timestamp_opacity(mut self, opacity: f32) -> Self {
        self.timestamp_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the output file name template.
    #[must_use]
    pub fn with_filename_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = template.into();
        self
    }

    /// Write one image per capture instead of a sheet.
    #[must_use]
    pub fn with_single_images(mut self, enabled: bool) -> Self {
        self.single_images = enabled;
        self
    }

    /// Set the grid background color.
    #[must_use]
    pub fn with_content_background(mut self, color: Rgb) -> Self {
        self.content_background = color;
        self
    }

    /// Enable or disable the header band.
    #[must_use]
    pub fn with_header(mut self, enabled: bool) -> Self {
        self.header = enabled;
        self
    }

    /// Enable or disable the extra codec/bitrate header lines.
    #[must_use]
    pub fn with_header_meta(mut self, enabled: bool) -> Self {
        self.header_meta = enabled;
        self
    }

    /// Set the header background and text colors.
    #[must_use]
    pub fn with_header_colors(mut self, background: Rgb, foreground: Rgb) -> Self {
        self.header_background = background;
        self.header_foreground = foreground;
        self
    }

    /// Set the header side image.
    #[must_use]
    pub fn with_header_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.header_image = Some(path.into());
        self
    }

    /// Set the watermark image.
    #[must_use]
    pub fn with_watermark(mut self, path: impl Into<PathBuf>) -> Self {
        self.watermark = Some(path.into());
        self
    }

    /// Set the thumbnail filter.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterKind) -> Self {
        self.filter = filter;
        self
    }

    /// Enable or disable blank-frame skipping.
    #[must_use]
    pub fn with_skip_blank(mut self, enabled: bool) -> Self {
        self.skip_blank = enabled;
        self
    }

    /// Bound the worker pool. `0` uses one worker per CPU.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Whether timestamps are stamped onto thumbnails.
    ///
    /// Single-image output never carries stamps.
    pub fn stamps_enabled(&self) -> bool {
        !self.disable_timestamps && !self.single_images
    }

    /// Check that the options describe a sheet that can be built.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidConfiguration`] for a zero capture count
    /// or a zero column count.
    pub fn validate(&self) -> Result<(), SheetError> {
        if self.capture_count == 0 {
            return Err(SheetError::InvalidConfiguration(
                "numcaps must be at least 1".to_string(),
            ));
        }
        if self.columns == 0 {
            return Err(SheetError::InvalidConfiguration(
                "columns must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
