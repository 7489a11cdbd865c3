//! End-to-end generator tests with a scripted frame source, plus the batch
//! loop and output naming.

mod common;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{CONTENT, ScriptedSource};
use image::Rgba;
use mt::{
    ProgressCallback, ProgressInfo, Rgb, SheetError, SheetGenerator, SheetOptions, Stage,
    output_path, single_image_path,
};

/// Options that need no font on disk.
fn textless_options() -> SheetOptions {
    SheetOptions::new()
        .with_timestamps(false)
        .with_header(false)
        .with_thumbnail_size(32, 0)
        .with_threads(2)
}

#[derive(Default)]
struct CountingProgress {
    sampling: AtomicU64,
    processing: AtomicU64,
}

impl ProgressCallback for CountingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        assert!(info.current <= info.total);
        match info.stage {
            Stage::Sampling => self.sampling.fetch_add(1, Ordering::Relaxed),
            Stage::Processing => self.processing.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };
    }
}

// ── Thumbnails ───────────────────────────────────────────────────

#[test]
fn thumbnails_come_back_in_planning_order() {
    let generator = SheetGenerator::new(textless_options().with_capture_count(9)).unwrap();
    let mut source = ScriptedSource::new(Duration::from_secs(600), 64, 36, |_| Some(CONTENT));

    let thumbnails = generator.thumbnails(&mut source).unwrap();

    assert_eq!(thumbnails.len(), 9);
    for (index, thumbnail) in thumbnails.iter().enumerate() {
        assert_eq!(thumbnail.index, index);
        assert_eq!(thumbnail.image.dimensions(), (32, 18));
    }
    for pair in thumbnails.windows(2) {
        assert!(pair[0].accepted < pair[1].accepted);
    }
}

#[test]
fn progress_reports_both_stages() {
    let progress = Arc::new(CountingProgress::default());
    let generator = SheetGenerator::new(textless_options())
        .unwrap()
        .with_progress(progress.clone());
    let mut source = ScriptedSource::new(Duration::from_secs(600), 64, 36, |_| Some(CONTENT));

    generator.thumbnails(&mut source).unwrap();

    assert_eq!(progress.sampling.load(Ordering::Relaxed), 4);
    assert_eq!(progress.processing.load(Ordering::Relaxed), 4);
}

#[test]
fn decode_failure_stops_the_video() {
    let generator = SheetGenerator::new(textless_options()).unwrap();
    let mut source = ScriptedSource::new(Duration::from_secs(600), 64, 36, |_| None);

    let error = generator.thumbnails(&mut source).unwrap_err();
    assert!(matches!(error, SheetError::VideoDecodeError { .. }));
}

#[test]
fn watermark_path_that_does_not_load_is_skipped() {
    let options = textless_options().with_watermark("/nonexistent/watermark.png");
    let generator = SheetGenerator::new(options).unwrap();
    let mut source = ScriptedSource::new(Duration::from_secs(60), 64, 36, |_| Some(CONTENT));
    assert_eq!(generator.thumbnails(&mut source).unwrap().len(), 4);
}

// ── Sheet ────────────────────────────────────────────────────────

#[test]
fn sheet_uses_grid_geometry_without_header() {
    let generator = SheetGenerator::new(
        textless_options()
            .with_thumbnail_size(64, 0)
            .with_content_background(Rgb(0, 0, 255))
            .with_filter(mt::FilterKind::Invert),
    )
    .unwrap();
    let mut source = ScriptedSource::new(Duration::from_secs(600), 64, 36, |_| Some(CONTENT));
    let metadata = mt::FrameSource::metadata(&source).clone();

    let thumbnails = generator.thumbnails(&mut source).unwrap();
    let sheet = generator
        .render_sheet(&thumbnails, Path::new("clip.mp4"), 1_000, &metadata)
        .unwrap();

    // 2 columns × 64 px + 3 × 10 px padding; 2 rows × 36 px + 30 px.
    assert_eq!(sheet.dimensions(), (158, 102));
    assert_eq!(sheet.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    let inverted = [255 - CONTENT.0, 255 - CONTENT.1, 255 - CONTENT.2, 255];
    assert_eq!(sheet.get_pixel(20, 20), &Rgba(inverted));
}

#[test]
fn rendering_nothing_is_an_error() {
    let generator = SheetGenerator::new(textless_options()).unwrap();
    let metadata = mt::VideoMetadata {
        duration: Duration::from_secs(1),
        width: 1,
        height: 1,
        frames_per_second: 1.0,
        bit_rate: 0,
        video_codec: String::new(),
        audio_codec: None,
    };
    let error = generator
        .render_sheet(&[], Path::new("clip.mp4"), 0, &metadata)
        .unwrap_err();
    assert!(matches!(error, SheetError::EmptySheet));
}

#[test]
fn invalid_options_rejected_up_front() {
    let error = SheetGenerator::new(SheetOptions::new().with_columns(0)).unwrap_err();
    assert!(matches!(error, SheetError::InvalidConfiguration(_)));
}

// ── Batch ────────────────────────────────────────────────────────

#[test]
fn batch_continues_past_failures() {
    let directory = tempfile::tempdir().unwrap();
    let missing = directory.path().join("missing.mp4");
    let not_a_video = directory.path().join("notes.mp4");
    std::fs::write(&not_a_video, b"definitely not a video").unwrap();

    let generator = SheetGenerator::new(textless_options()).unwrap();
    let report = generator.run_batch(&[missing.clone(), not_a_video.clone()]);

    assert!(!report.is_success());
    assert!(report.succeeded.is_empty());
    let failed: Vec<&PathBuf> = report.failed.iter().map(|(path, _)| path).collect();
    assert_eq!(failed, vec![&missing, &not_a_video]);
}

#[test]
fn empty_batch_succeeds() {
    let generator = SheetGenerator::new(textless_options()).unwrap();
    assert!(generator.run_batch(&[]).is_success());
}

// ── Output naming ────────────────────────────────────────────────

#[test]
fn template_substitutes_input_path_once() {
    assert_eq!(
        output_path("%s.jpg", Path::new("/videos/a.mp4")),
        PathBuf::from("/videos/a.mp4.jpg")
    );
    assert_eq!(
        output_path("sheets/%s-%s.png", Path::new("a.mp4")),
        PathBuf::from("sheets/a.mp4-%s.png")
    );
    assert_eq!(output_path("fixed.jpg", Path::new("a.mp4")), PathBuf::from("fixed.jpg"));
}

#[test]
fn single_images_are_numbered_next_to_the_input() {
    assert_eq!(
        single_image_path(Path::new("/videos/a.mp4"), 0),
        PathBuf::from("/videos/a.mp4-01.jpg")
    );
    assert_eq!(
        single_image_path(Path::new("a.mp4"), 11),
        PathBuf::from("a.mp4-12.jpg")
    );
}
