//! Header band tests.

mod common;

use std::path::Path;
use std::time::Duration;

use common::solid;
use mt::header::{HEADER_MARGIN, band_height, fit_side_image, line_height, side_image_position};
use mt::{Rgb, VideoMetadata, header_lines};

fn metadata() -> VideoMetadata {
    VideoMetadata {
        duration: Duration::from_millis(5_025_700),
        width: 1920,
        height: 1080,
        frames_per_second: 23.976,
        bit_rate: 4_321_000,
        video_codec: "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10".to_string(),
        audio_codec: Some("AAC (Advanced Audio Coding)".to_string()),
    }
}

// ── Geometry ─────────────────────────────────────────────────────

#[test]
fn line_height_follows_font_size() {
    assert_eq!(line_height(12), 21);
    assert_eq!(line_height(20), 32);
}

#[test]
fn band_height_grows_with_lines() {
    assert_eq!(band_height(4, 12), 99);
    assert_eq!(band_height(6, 12), 141);
    assert_eq!(band_height(6, 12) - band_height(4, 12), 2 * line_height(12));
}

#[test]
fn larger_font_grows_only_the_line_term() {
    for lines in [1, 4, 6] {
        for size in [8, 12, 20] {
            let per_line = line_height(2 * size) - line_height(size);
            assert_eq!(
                band_height(lines, 2 * size) - band_height(lines, size),
                lines as u32 * per_line
            );
            assert_eq!(
                band_height(lines, size) - lines as u32 * line_height(size),
                HEADER_MARGIN
            );
        }
    }
}

#[test]
fn side_image_fits_inside_the_band() {
    let fitted = fit_side_image(&solid(200, 200, Rgb::WHITE), 99);
    assert_eq!((fitted.width(), fitted.height()), (79, 79));

    let small = fit_side_image(&solid(30, 20, Rgb::WHITE), 99);
    assert_eq!((small.width(), small.height()), (30, 20));
}

#[test]
fn side_image_is_flush_right_and_centered() {
    assert_eq!(side_image_position((830, 99), (79, 79)), (741, 10));
    assert_eq!(side_image_position((830, 141), (50, 41)), (770, 50));
}

// ── Lines ────────────────────────────────────────────────────────

#[test]
fn basic_lines() {
    let lines = header_lines(Path::new("/videos/holiday.mkv"), 82_854_982, &metadata(), false);
    assert_eq!(
        lines,
        vec![
            "File Name: holiday.mkv",
            "File Size: 83 MB",
            "Duration: 01:23:45",
            "Resolution: 1920x1080",
        ]
    );
}

#[test]
fn meta_lines_add_rate_and_codecs() {
    let lines = header_lines(Path::new("holiday.mkv"), 1_200_000_000, &metadata(), true);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "File Size: 1.2 GB");
    assert_eq!(lines[4], "FPS: 23.98, Bitrate: 4321 kb/s");
    assert_eq!(
        lines[5],
        "Codec: H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10 / AAC (Advanced Audio Coding)"
    );
}

#[test]
fn silent_video_reports_no_audio_codec() {
    let mut metadata = metadata();
    metadata.audio_codec = None;
    let lines = header_lines(Path::new("clip.mp4"), 999, &metadata, true);
    assert_eq!(lines[1], "File Size: 999 B");
    assert!(lines[5].ends_with("/ none"));
}
