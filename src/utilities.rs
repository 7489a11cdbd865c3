//! Shared helpers.
//!
//! Pixel-buffer copying and time-base conversion for the FFmpeg source, plus
//! the timecode and byte-size formatting used in stamps and headers.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an RGB24 FFmpeg frame into a tightly-packed buffer.
///
/// FFmpeg rows are frequently padded (stride > width × 3); the padding is
/// dropped so the result can go straight into [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * (height as usize)].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
    for row in 0..(height as usize) {
        let row_start = row * stride;
        buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    buffer
}

/// Rescale a PTS value from the stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert a [`Duration`] to a container-level seek target in AV_TIME_BASE
/// (microseconds), as expected by `Input::seek`.
pub(crate) fn duration_to_seek_timestamp(duration: Duration) -> i64 {
    duration.as_micros() as i64
}

/// Format a position as `HH:MM:SS`, truncating sub-second precision.
///
/// Hours are not wrapped at 24.
///
/// ```
/// use std::time::Duration;
///
/// assert_eq!(mt::format_timecode(Duration::from_millis(3_723_900)), "01:02:03");
/// ```
pub fn format_timecode(position: Duration) -> String {
    let total = position.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Format a byte count with SI units (`"999 B"`, `"1.2 MB"`, `"82 MB"`).
///
/// Values below 10 in the chosen unit keep one decimal.
///
/// ```
/// assert_eq!(mt::human_bytes(82_854_982), "83 MB");
/// assert_eq!(mt::human_bytes(1_200_000_000), "1.2 GB");
/// ```
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 10 {
        return format!("{bytes} B");
    }
    let exponent = ((bytes as f64).log10() / 3.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1000f64.powi(exponent as i32);
    let rounded = (scaled * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{rounded:.1} {}", UNITS[exponent])
    } else {
        format!("{rounded:.0} {}", UNITS[exponent])
    }
}
