//! # mt
//!
//! Media thumbnailer: build contact sheets from video files.
//!
//! `mt` samples evenly spaced frames from a video, optionally skips
//! near-blank ones, stamps each thumbnail with its timecode and lays them out
//! in a grid below a metadata header. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; image work
//! uses [`image`](https://crates.io/crates/image).
//!
//! ## Quick Start
//!
//! ### Generate a Contact Sheet
//!
//! ```no_run
//! use mt::{SheetGenerator, SheetOptions};
//!
//! let generator = SheetGenerator::new(SheetOptions::new()).unwrap();
//! let output = generator.generate("input.mp4").unwrap();
//! println!("{}", output.written[0].display());
//! ```
//!
//! ### Tune the Layout
//!
//! ```no_run
//! use mt::{FilterKind, Rgb, SheetGenerator, SheetOptions};
//!
//! let options = SheetOptions::new()
//!     .with_capture_count(16)
//!     .with_columns(4)
//!     .with_thumbnail_size(320, 0)
//!     .with_filter(FilterKind::Greyscale)
//!     .with_header_colors(Rgb(20, 20, 20), Rgb::WHITE)
//!     .with_skip_blank(true);
//! let generator = SheetGenerator::new(options).unwrap();
//! generator.generate("input.mkv").unwrap();
//! ```
//!
//! ### Plan Without Decoding
//!
//! ```
//! use std::time::Duration;
//!
//! use mt::SamplePlan;
//!
//! let plan = SamplePlan::new(Duration::from_secs(1200), 4).unwrap();
//! assert_eq!(plan.interval(), Duration::from_millis(270_000));
//! ```
//!
//! ## Features
//!
//! - **Tail-trimmed sampling**: captures avoid the credits at the end
//! - **Blank-frame skipping**: fades and title cards are retried a few
//!   seconds later, without ever overtaking the next capture
//! - **Timestamps and watermark**: per-thumbnail timecodes, one centered
//!   watermark on the middle thumbnail
//! - **Header band**: file name, size, duration, resolution and, on request,
//!   frame rate, bitrate and codecs, with an optional side image
//! - **Filters**: greyscale and invert
//! - **Layered configuration**: `mt.json`, `MT_*` environment, command line
//! - **Parallel processing**: thumbnails are resized and stamped on a
//!   bounded rayon pool
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system. Text
//! rendering needs a TrueType font; `DroidSans.ttf` is looked up in the
//! usual font directories when the configured one is missing.

pub mod blank;
pub mod composer;
pub mod configuration;
pub mod error;
pub mod ffmpeg;
pub mod filter;
pub mod header;
pub mod media;
pub mod metadata;
pub mod overlay;
pub mod planner;
pub mod progress;
pub mod sampler;
pub mod settings;
pub mod sheet;
pub mod source;
pub mod text;
mod utilities;

pub use blank::{BLANK_THRESHOLD_PERCENT, BlankStats, is_blank_frame};
pub use composer::{GridLayout, compose_sheet};
pub use configuration::{Rgb, SheetOptions, ThumbnailSize};
pub use error::SheetError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use filter::FilterKind;
pub use header::{HeaderSpec, HeaderStyle, header_lines};
pub use media::VideoFile;
pub use metadata::VideoMetadata;
pub use overlay::{OverlayCompositor, stamp_position, watermark_index};
pub use planner::{SamplePlan, tail_trim_millis};
pub use progress::{ProgressCallback, ProgressInfo, Stage};
pub use sampler::{FrameSampler, MAX_BLANK_RETRIES, RETRY_STEP, SampleResult};
pub use settings::{CONFIG_FILE_NAME, ENV_PREFIX, Settings, config_search_paths};
pub use sheet::{
    BatchReport, SheetGenerator, SheetOutput, Thumbnail, output_path, single_image_path,
};
pub use source::FrameSource;
pub use text::TextRenderer;
pub use utilities::{format_timecode, human_bytes};
