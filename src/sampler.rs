//! Frame sampling with blank-frame retries.
//!
//! [`FrameSampler`] walks a [`SamplePlan`] against a [`FrameSource`]. When
//! blank skipping is enabled, a rejected frame is retried 10 s, 20 s and 30 s
//! later, but never at or past the next capture position nor past the end of
//! the usable span. If a capture ends up later than planned, every following
//! capture shifts by the same amount, capped at the end of the usable span.

use std::time::Duration;

use image::DynamicImage;

use crate::blank::is_blank_frame;
use crate::error::SheetError;
use crate::planner::SamplePlan;
use crate::progress::ProgressTracker;
use crate::source::FrameSource;
use crate::utilities::format_timecode;

/// Maximum retries per capture after a blank detection.
pub const MAX_BLANK_RETRIES: u32 = 3;

/// Distance between consecutive retries.
pub const RETRY_STEP: Duration = Duration::from_secs(10);

/// One accepted capture.
#[derive(Debug, Clone)]
pub struct SampleResult {
    /// Position of this capture in the plan (0-based).
    pub index: usize,
    /// Position the capture was aimed at, including any shift carried over
    /// from earlier captures.
    pub planned: Duration,
    /// Position of the frame that was kept. Never earlier than `planned`.
    pub accepted: Duration,
    /// Number of retries spent on blank frames, at most [`MAX_BLANK_RETRIES`].
    pub retries: u32,
    /// The decoded frame.
    pub image: DynamicImage,
}

/// Draws one accepted frame per planned timestamp from a [`FrameSource`].
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    skip_blank: bool,
}

impl FrameSampler {
    /// Create a sampler. With `skip_blank` off every first frame is accepted.
    pub fn new(skip_blank: bool) -> Self {
        Self { skip_blank }
    }

    /// Sample every capture in `plan`, in planning order.
    ///
    /// # Errors
    ///
    /// The first fetch of each capture is mandatory: a failure there is
    /// returned with the position attached and aborts the video. A failed
    /// *retry* only ends the retry loop and keeps the frame already held.
    pub fn sample<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        plan: &SamplePlan,
    ) -> Result<Vec<SampleResult>, SheetError> {
        self.sample_with_progress(source, plan, None)
    }

    pub(crate) fn sample_with_progress<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        plan: &SamplePlan,
        progress: Option<&ProgressTracker>,
    ) -> Result<Vec<SampleResult>, SheetError> {
        let interval = plan.interval();
        let usable = plan.usable();
        let count = plan.len();
        let mut shift = Duration::ZERO;
        let mut results = Vec::with_capacity(count);

        for (index, &base) in plan.timestamps().iter().enumerate() {
            let planned = (base + shift).min(usable);
            if planned < base + shift {
                log::debug!(
                    "capture {:02} clamped to the end of the usable span at {}",
                    index + 1,
                    format_timecode(usable)
                );
            }
            let limit = (planned + interval).min(usable);
            let result = self.sample_one(source, index, planned, limit)?;

            shift += result.accepted - planned;

            log::info!(
                "generating screenshot {:02}/{count:02} at {}",
                index + 1,
                format_timecode(result.accepted)
            );
            if let Some(tracker) = progress {
                tracker.advance(Some(result.accepted));
            }
            results.push(result);
        }

        Ok(results)
    }

    fn sample_one<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        index: usize,
        planned: Duration,
        limit: Duration,
    ) -> Result<SampleResult, SheetError> {
        let mut image = source.frame_at(planned).map_err(|error| match error {
            SheetError::VideoDecodeError { .. } => error,
            other => SheetError::VideoDecodeError {
                timestamp: planned,
                reason: other.to_string(),
            },
        })?;
        let mut accepted = planned;
        let mut retries = 0;

        if self.skip_blank {
            while retries < MAX_BLANK_RETRIES && is_blank_frame(&image) {
                let next = planned + RETRY_STEP * (retries + 1);
                log::warn!(
                    "[{}/{MAX_BLANK_RETRIES}] blank frame detected at {}, retry at {}",
                    retries + 1,
                    format_timecode(accepted),
                    format_timecode(next)
                );
                if next >= limit {
                    log::warn!(
                        "no further skip room before {}, keeping frame at {}",
                        format_timecode(limit),
                        format_timecode(accepted)
                    );
                    break;
                }
                match source.frame_at(next) {
                    Ok(frame) => {
                        image = frame;
                        accepted = next;
                        retries += 1;
                    }
                    Err(error) => {
                        log::warn!(
                            "retry at {} failed ({error}), keeping frame at {}",
                            format_timecode(next),
                            format_timecode(accepted)
                        );
                        break;
                    }
                }
            }
        }

        Ok(SampleResult {
            index,
            planned,
            accepted,
            retries,
            image,
        })
    }
}
