//! FFmpeg log level configuration.
//!
//! FFmpeg prints its own warnings to stderr independently of the Rust
//! [`log`](https://crates.io/crates/log) facade. Decoding a handful of
//! frames from a damaged file can flood the terminal, so the binary quiets
//! FFmpeg to [`FfmpegLogLevel::Error`] unless `--verbose` is given.
//!
//! # Example
//!
//! ```no_run
//! use mt::FfmpegLogLevel;
//!
//! mt::set_ffmpeg_log_level(FfmpegLogLevel::Quiet);
//! ```

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging messages.
    Debug,
}

impl FfmpegLogLevel {
    /// The FFmpeg level that matches a Rust-side log filter.
    ///
    /// FFmpeg is kept one step quieter than the Rust logs: `info` maps to
    /// errors only, `debug` and above to FFmpeg's info output.
    pub fn for_filter(filter: log::LevelFilter) -> Self {
        match filter {
            log::LevelFilter::Off => FfmpegLogLevel::Quiet,
            log::LevelFilter::Error => FfmpegLogLevel::Fatal,
            log::LevelFilter::Warn | log::LevelFilter::Info => FfmpegLogLevel::Error,
            log::LevelFilter::Debug => FfmpegLogLevel::Info,
            log::LevelFilter::Trace => FfmpegLogLevel::Debug,
        }
    }

    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }
}

/// Set FFmpeg's internal log verbosity.
///
/// This does **not** affect messages emitted through the `log` crate.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
