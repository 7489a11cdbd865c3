//! Layered settings: config file, environment, command line.
//!
//! Every layer is a [`Settings`] value whose fields are all optional. Layers
//! are merged with [`Settings::overlay`], later layers winning, and the
//! result is turned into validated [`SheetOptions`] once.
//!
//! The config file is `mt.json`, looked up in `/etc/mt/`, `$HOME/.mt/` and
//! the working directory, first match wins. Environment variables use the
//! `MT_` prefix and the upper-cased key (`MT_NUMCAPS=9`).
//!
//! # Example
//!
//! ```no_run
//! use mt::Settings;
//!
//! let cli = Settings {
//!     columns: Some(3),
//!     ..Settings::default()
//! };
//! let options = Settings::discover()?
//!     .overlay(Settings::from_env(|key| std::env::var(key).ok()))
//!     .overlay(cli)
//!     .into_options()?;
//! assert_eq!(options.columns, 3);
//! # Ok::<(), mt::SheetError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::configuration::{Rgb, SheetOptions, ThumbnailSize};
use crate::error::SheetError;
use crate::filter::FilterKind;

/// Name of the config file.
pub const CONFIG_FILE_NAME: &str = "mt.json";

/// Prefix of the environment variables.
pub const ENV_PREFIX: &str = "MT_";

/// One layer of settings. `None` means "not set in this layer".
///
/// Field names double as config-file keys and environment suffixes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of captures per video (default 4).
    pub numcaps: Option<u32>,
    /// Grid columns (default 2).
    pub columns: Option<u32>,
    /// Padding around and between thumbnails in px (default 10).
    pub padding: Option<u32>,
    /// Thumbnail width in px; 0 derives it from `height` (default 400).
    pub width: Option<u32>,
    /// Thumbnail height in px, used when `width` is 0 (default 0).
    pub height: Option<u32>,
    /// Font name or path for all text (default `DroidSans.ttf`).
    pub font_all: Option<String>,
    /// Font size in points (default 12).
    pub font_size: Option<u32>,
    /// Skip the timecode stamps (default `false`).
    pub disable_timestamps: Option<bool>,
    /// Stamp opacity from 0.0 to 1.0 (default 1.0).
    pub timestamp_opacity: Option<f32>,
    /// Output template; `%s` becomes the input path (default `%s.jpg`).
    pub filename: Option<String>,
    /// Debug logging (default `false`).
    pub verbose: Option<bool>,
    /// Grid background as `R,G,B` (default `0,0,0`).
    pub bg_content: Option<String>,
    /// One image per capture instead of a sheet (default `false`).
    pub single_images: Option<bool>,
    /// Draw the metadata header (default `true`).
    pub header: Option<bool>,
    /// Header background as `R,G,B` (default `0,0,0`).
    pub bg_header: Option<String>,
    /// Header text color as `R,G,B` (default `255,255,255`).
    pub fg_header: Option<String>,
    /// Image at the right edge of the header (default none).
    pub header_image: Option<String>,
    /// Add frame rate, bitrate and codec lines (default `false`).
    pub header_meta: Option<bool>,
    /// Image blended onto the middle thumbnail (default none).
    pub watermark: Option<String>,
    /// `none`, `greyscale` or `invert` (default `none`).
    pub filter: Option<String>,
    /// Retry captures that land on blank frames (default `false`).
    pub skip_blank: Option<bool>,
    /// Worker threads; 0 means one per CPU (default 0).
    pub threads: Option<usize>,
}

/// Directories searched for [`CONFIG_FILE_NAME`], in priority order.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut directories = vec![PathBuf::from("/etc/mt/")];
    if let Some(home) = std::env::var_os("HOME") {
        directories.push(PathBuf::from(home).join(".mt"));
    }
    directories.push(PathBuf::from("./"));
    directories
}

impl Settings {
    /// Load the first config file found in [`config_search_paths`].
    ///
    /// Returns empty settings when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::ConfigFile`] if the file found cannot be read
    /// or is not valid JSON.
    pub fn discover() -> Result<Self, SheetError> {
        Self::discover_in(&config_search_paths())
    }

    /// Like [`discover`](Settings::discover) over an explicit directory list.
    ///
    /// # Errors
    ///
    /// See [`discover`](Settings::discover).
    pub fn discover_in(directories: &[PathBuf]) -> Result<Self, SheetError> {
        for directory in directories {
            let candidate = directory.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                log::debug!("reading config file {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }
        log::debug!("no {CONFIG_FILE_NAME} found, using default values");
        Ok(Self::default())
    }

    /// Parse a JSON config file. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::ConfigFile`] on read or parse failure.
    pub fn from_file(path: &Path) -> Result<Self, SheetError> {
        let config_error = |reason: String| SheetError::ConfigFile {
            path: path.to_path_buf(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|error| config_error(error.to_string()))?;
        serde_json::from_str(&content).map_err(|error| config_error(error.to_string()))
    }

    /// Read `MT_*` variables through `lookup`.
    ///
    /// Values that do not parse as the key's type are ignored with a
    /// warning.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(&format!("{ENV_PREFIX}{}", key.to_ascii_uppercase()));
        let number = |key: &str| read(key).and_then(|value| parse_env(key, &value));
        let flag = |key: &str| read(key).and_then(|value| parse_env_bool(key, &value));

        Self {
            numcaps: number("numcaps"),
            columns: number("columns"),
            padding: number("padding"),
            width: number("width"),
            height: number("height"),
            font_all: read("font_all"),
            font_size: number("font_size"),
            disable_timestamps: flag("disable_timestamps"),
            timestamp_opacity: read("timestamp_opacity")
                .and_then(|value| parse_env("timestamp_opacity", &value)),
            filename: read("filename"),
            verbose: flag("verbose"),
            bg_content: read("bg_content"),
            single_images: flag("single_images"),
            header: flag("header"),
            bg_header: read("bg_header"),
            fg_header: read("fg_header"),
            header_image: read("header_image"),
            header_meta: flag("header_meta"),
            watermark: read("watermark"),
            filter: read("filter"),
            skip_blank: flag("skip_blank"),
            threads: read("threads").and_then(|value| parse_env("threads", &value)),
        }
    }

    /// Merge `other` on top of `self`; values set in `other` win.
    #[must_use]
    pub fn overlay(self, other: Settings) -> Settings {
        Settings {
            numcaps: other.numcaps.or(self.numcaps),
            columns: other.columns.or(self.columns),
            padding: other.padding.or(self.padding),
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            font_all: other.font_all.or(self.font_all),
            font_size: other.font_size.or(self.font_size),
            disable_timestamps: other.disable_timestamps.or(self.disable_timestamps),
            timestamp_opacity: other.timestamp_opacity.or(self.timestamp_opacity),
            filename: other.filename.or(self.filename),
            verbose: other.verbose.or(self.verbose),
            bg_content: other.bg_content.or(self.bg_content),
            single_images: other.single_images.or(self.single_images),
            header: other.header.or(self.header),
            bg_header: other.bg_header.or(self.bg_header),
            fg_header: other.fg_header.or(self.fg_header),
            header_image: other.header_image.or(self.header_image),
            header_meta: other.header_meta.or(self.header_meta),
            watermark: other.watermark.or(self.watermark),
            filter: other.filter.or(self.filter),
            skip_blank: other.skip_blank.or(self.skip_blank),
            threads: other.threads.or(self.threads),
        }
    }

    /// Whether verbose logging was requested by any layer.
    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    /// Resolve the merged layers into validated options.
    ///
    /// Malformed colors and unknown filters fall back to their defaults with
    /// a warning. Empty image paths mean "no image".
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidConfiguration`] if the result fails
    /// [`SheetOptions::validate`].
    pub fn into_options(self) -> Result<SheetOptions, SheetError> {
        let defaults = SheetOptions::new();

        let color = |value: Option<String>, fallback: Rgb| {
            value.map_or(fallback, |value| Rgb::parse_or(&value, fallback))
        };
        let image_path = |value: Option<String>| {
            value
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
        };
        let filter = self.filter.map_or(FilterKind::None, |value| {
            value.parse().unwrap_or_else(|error| {
                log::warn!("{error}, using no filter");
                FilterKind::None
            })
        });

        let options = SheetOptions {
            capture_count: self.numcaps.unwrap_or(defaults.capture_count),
            columns: self.columns.unwrap_or(defaults.columns),
            padding: self.padding.unwrap_or(defaults.padding),
            thumbnail_size: ThumbnailSize {
                width: self.width.unwrap_or(defaults.thumbnail_size.width),
                height: self.height.unwrap_or(defaults.thumbnail_size.height),
            },
            font: self.font_all.unwrap_or(defaults.font),
            font_size: self.font_size.unwrap_or(defaults.font_size).max(1),
            disable_timestamps: self.disable_timestamps.unwrap_or(defaults.disable_timestamps),
            timestamp_opacity: self
                .timestamp_opacity
                .unwrap_or(defaults.timestamp_opacity)
                .clamp(0.0, 1.0),
            filename_template: self.filename.unwrap_or(defaults.filename_template),
            single_images: self.single_images.unwrap_or(defaults.single_images),
            content_background: color(self.bg_content, defaults.content_background),
            header: self.header.unwrap_or(defaults.header),
            header_meta: self.header_meta.unwrap_or(defaults.header_meta),
            header_background: color(self.bg_header, defaults.header_background),
            header_foreground: color(self.fg_header, defaults.header_foreground),
            header_image: image_path(self.header_image),
            watermark: image_path(self.watermark),
            filter,
            skip_blank: self.skip_blank.unwrap_or(defaults.skip_blank),
            threads: self.threads.unwrap_or(defaults.threads),
        };
        options.validate()?;
        Ok(options)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("ignoring {ENV_PREFIX}{}={value:?}: not a valid value", key.to_ascii_uppercase());
            None
        }
    }
}

fn parse_env_bool(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            log::warn!("ignoring {ENV_PREFIX}{}={value:?}: not a boolean", key.to_ascii_uppercase());
            None
        }
    }
}
