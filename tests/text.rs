//! Font resolution and text rendering tests.
//!
//! Rendering tests require `tests/fixtures/DroidSans.ttf`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use mt::text::{points_to_pixels, resolve_font_path};
use mt::{OverlayCompositor, Rgb, SheetError, TextRenderer};

fn fixture_font_path() -> &'static str {
    "tests/fixtures/DroidSans.ttf"
}

#[test]
fn point_sizes_scale_with_dpi() {
    assert_eq!(points_to_pixels(12, 72), 12.0);
    assert_eq!(points_to_pixels(12, 96), 16.0);
}

#[test]
fn explicit_path_resolves_with_or_without_extension() {
    let directory = tempfile::tempdir().unwrap();
    let font = directory.path().join("Custom.ttf");
    fs::write(&font, b"not really a font").unwrap();

    let with_extension = resolve_font_path(font.to_str().unwrap());
    assert_eq!(with_extension, Some(font.clone()));

    let without_extension = directory.path().join("Custom");
    assert_eq!(resolve_font_path(without_extension.to_str().unwrap()), Some(font));
}

#[test]
fn unknown_font_does_not_resolve() {
    assert_eq!(resolve_font_path("/nonexistent/directory/NoSuchFont"), None);
}

#[test]
fn garbage_font_data_rejected() {
    let result = TextRenderer::from_bytes(b"not really a font".to_vec(), PathBuf::from("x.ttf"));
    assert!(matches!(result, Err(SheetError::Font(_))));
}

#[test]
fn unreadable_font_file_rejected() {
    let result = TextRenderer::from_file(Path::new("/nonexistent/font.ttf"));
    assert!(matches!(result, Err(SheetError::Font(_))));
}

// ── Rendering (fixture) ──────────────────────────────────────────

#[test]
fn rendered_stamp_is_padded_text_box() {
    let path = fixture_font_path();
    if !Path::new(path).exists() {
        return;
    }
    let text = TextRenderer::from_file(Path::new(path)).unwrap();

    let (width, height) = text.measure("00:01:02", 12.0);
    assert!(width > 0 && height > 0);

    let stamp = text.render("00:01:02", 12.0, Rgb::WHITE, Rgb::BLACK, 5);
    assert_eq!(stamp.dimensions(), (width + 10, height + 10));
    assert_eq!(stamp.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    assert!(stamp.pixels().any(|pixel| pixel[0] > 128));
}

#[test]
fn longer_text_measures_wider() {
    let path = fixture_font_path();
    if !Path::new(path).exists() {
        return;
    }
    let text = TextRenderer::from_file(Path::new(path)).unwrap();
    assert!(text.measure("File Name: movie.mkv", 16.0).0 > text.measure("File", 16.0).0);
}

#[test]
fn stamp_lands_in_the_bottom_right_corner() {
    let path = fixture_font_path();
    if !Path::new(path).exists() {
        return;
    }
    let text = TextRenderer::from_file(Path::new(path)).unwrap();
    let compositor = OverlayCompositor::new(Some(&text), 12, 1.0, None, 4);

    let mut thumbnail = RgbaImage::from_pixel(400, 225, Rgba([200, 0, 0, 255]));
    compositor.apply(0, Duration::from_secs(62), &mut thumbnail);

    let stamp = compositor.render_stamp(Duration::from_secs(62)).unwrap();
    let (stamp_width, stamp_height) = stamp.dimensions();
    // The stamp's black padding now covers the pixel just inside its box.
    let corner_x = 400 - 10 - stamp_width;
    let corner_y = 225 - 10 - stamp_height;
    assert_eq!(thumbnail.get_pixel(corner_x, corner_y), &Rgba([0, 0, 0, 255]));
    assert_eq!(thumbnail.get_pixel(399, 224), &Rgba([200, 0, 0, 255]));
    assert_eq!(thumbnail.get_pixel(0, 0), &Rgba([200, 0, 0, 255]));
}
