//! Timestamp planning.
//!
//! Decides where in a video the captures are taken. The tail of the video is
//! trimmed first (credits and fade-outs rarely make good thumbnails) and the
//! remaining span is divided into equal intervals.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use mt::SamplePlan;
//!
//! let plan = SamplePlan::new(Duration::from_secs(600), 4)?;
//! assert_eq!(plan.interval(), Duration::from_millis(133_500));
//! assert_eq!(plan.timestamps().last(), Some(&Duration::from_millis(534_000)));
//! # Ok::<(), mt::SheetError>(())
//! ```

use std::time::Duration;

use crate::error::SheetError;

/// Videos longer than this get a fixed tail trim (when the proportional one
/// would be larger).
const LONG_VIDEO_MILLIS: u64 = 240_000;

/// Fixed tail trim for long videos.
const FIXED_TRIM_MILLIS: u64 = 120_000;

/// Intervals at or below this are logged as a warning.
const SMALL_INTERVAL_MILLIS: u64 = 60_000;

/// Intervals at or below this are logged as an error.
const TINY_INTERVAL_MILLIS: u64 = 9_000;

/// Milliseconds trimmed from the tail of a video of `duration_millis`.
///
/// The proportional trim is 11% of the duration. Videos longer than four
/// minutes whose proportional trim would exceed two minutes lose exactly two
/// minutes instead.
pub fn tail_trim_millis(duration_millis: u64) -> u64 {
    let proportional = duration_millis * 11 / 100;
    if duration_millis > LONG_VIDEO_MILLIS && FIXED_TRIM_MILLIS < proportional {
        FIXED_TRIM_MILLIS
    } else {
        proportional
    }
}

/// The ordered capture positions for one video.
///
/// Positions are `i × interval` for `i = 1..=count`, so they are strictly
/// increasing and the last one equals `count × interval ≤ usable`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SamplePlan {
    timestamps: Vec<Duration>,
    interval: Duration,
    usable: Duration,
}

impl SamplePlan {
    /// Plan `count` captures across a video of `duration`.
    ///
    /// # Errors
    ///
    /// - [`SheetError::InvalidConfiguration`] if `count` is zero.
    /// - [`SheetError::InvalidDuration`] if `duration` is under a millisecond.
    /// - [`SheetError::IntervalTooSmall`] if the trimmed duration cannot hold
    ///   `count` distinct millisecond positions.
    pub fn new(duration: Duration, count: u32) -> Result<Self, SheetError> {
        if count == 0 {
            return Err(SheetError::InvalidConfiguration(
                "capture count must be at least 1".to_string(),
            ));
        }

        let duration_millis = duration.as_millis() as u64;
        if duration_millis == 0 {
            return Err(SheetError::InvalidDuration(duration));
        }

        let usable_millis = duration_millis - tail_trim_millis(duration_millis);
        let interval_millis = usable_millis / count as u64;

        if interval_millis == 0 {
            return Err(SheetError::IntervalTooSmall { duration, count });
        }
        if interval_millis <= TINY_INTERVAL_MILLIS {
            log::error!(
                "interval ({}s) is way too small (less than 9s), please decrease numcaps",
                interval_millis / 1000
            );
        } else if interval_millis <= SMALL_INTERVAL_MILLIS {
            log::warn!("very small intervals in use ({interval_millis} ms), consider decreasing numcaps");
        }

        let timestamps = (1..=count as u64)
            .map(|index| Duration::from_millis(index * interval_millis))
            .collect();

        log::debug!(
            "planned {count} captures every {interval_millis} ms across {usable_millis} of {duration_millis} ms"
        );

        Ok(Self {
            timestamps,
            interval: Duration::from_millis(interval_millis),
            usable: Duration::from_millis(usable_millis),
        })
    }

    /// Capture positions in planning order.
    pub fn timestamps(&self) -> &[Duration] {
        &self.timestamps
    }

    /// Spacing between consecutive captures.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Duration left after the tail trim.
    pub fn usable(&self) -> Duration {
        self.usable
    }

    /// Number of planned captures.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Always `false` for a successfully built plan.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
