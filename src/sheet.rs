//! The per-file pipeline and the batch loop.
//!
//! [`SheetGenerator`] owns everything that is loaded once per run (the worker
//! pool, the font, the watermark and header images) and turns each input
//! video into a contact sheet:
//!
//! 1. plan the capture positions,
//! 2. sample frames sequentially on the open video (blank retries and the
//!    carried shift make each capture depend on the previous one),
//! 3. resize, filter and stamp thumbnails on the worker pool,
//! 4. restore planning order, lay out the grid, add the header, save.
//!
//! A failure in any step aborts the current file only;
//! [`run_batch`](SheetGenerator::run_batch) records it and moves on.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, RgbaImage, imageops::FilterType};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use crate::composer::{GridLayout, compose_sheet};
use crate::configuration::SheetOptions;
use crate::error::SheetError;
use crate::header::{HeaderSpec, HeaderStyle, header_lines};
use crate::media::VideoFile;
use crate::metadata::VideoMetadata;
use crate::overlay::OverlayCompositor;
use crate::planner::SamplePlan;
use crate::progress::{NoOpProgress, ProgressCallback, ProgressTracker, Stage};
use crate::sampler::{FrameSampler, SampleResult};
use crate::source::FrameSource;
use crate::text::TextRenderer;
use crate::utilities::format_timecode;

/// One processed thumbnail, ready for layout.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Position in planning order.
    pub index: usize,
    /// Position the capture was aimed at.
    pub planned: Duration,
    /// Position of the frame actually used.
    pub accepted: Duration,
    /// The resized, filtered and stamped image.
    pub image: RgbaImage,
}

/// What a successful run wrote for one input.
#[derive(Debug, Clone)]
pub struct SheetOutput {
    /// The input video.
    pub input: PathBuf,
    /// Files written: one sheet, or one image per capture.
    pub written: Vec<PathBuf>,
    /// Accepted capture positions in planning order.
    pub captures: Vec<Duration>,
}

/// Outcome of [`SheetGenerator::run_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Inputs that produced output.
    pub succeeded: Vec<SheetOutput>,
    /// Inputs that failed, with the error that stopped them.
    pub failed: Vec<(PathBuf, SheetError)>,
}

impl BatchReport {
    /// `true` when no input failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Output path for the sheet of `input`: the first `%s` in `template` is
/// replaced by the input path.
///
/// ```
/// use std::path::Path;
///
/// assert_eq!(
///     mt::output_path("%s.jpg", Path::new("movies/clip.mp4")),
///     Path::new("movies/clip.mp4.jpg")
/// );
/// ```
pub fn output_path(template: &str, input: &Path) -> PathBuf {
    PathBuf::from(template.replacen("%s", &input.to_string_lossy(), 1))
}

/// Path of the `index`-th (0-based) single image for `input`:
/// `<dir>/<file name>-NN.jpg`, numbered from 1.
pub fn single_image_path(input: &Path, index: usize) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "capture".to_string(), |name| name.to_string_lossy().to_string());
    let file_name = format!("{name}-{:02}.jpg", index + 1);
    match input.parent() {
        Some(directory) => directory.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Generates contact sheets with one set of options.
///
/// # Example
///
/// ```no_run
/// use mt::{SheetGenerator, SheetOptions};
///
/// let generator = SheetGenerator::new(SheetOptions::new().with_capture_count(9).with_columns(3))?;
/// let output = generator.generate("input.mp4")?;
/// println!("wrote {}", output.written[0].display());
/// # Ok::<(), mt::SheetError>(())
/// ```
pub struct SheetGenerator {
    options: SheetOptions,
    pool: ThreadPool,
    text: Option<TextRenderer>,
    watermark: Option<DynamicImage>,
    header_image: Option<DynamicImage>,
    progress: Arc<dyn ProgressCallback>,
}

impl Debug for SheetGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SheetGenerator")
            .field("options", &self.options)
            .field("threads", &self.pool.current_num_threads())
            .field("text", &self.text)
            .field("watermark", &self.watermark.is_some())
            .field("header_image", &self.header_image.is_some())
            .finish_non_exhaustive()
    }
}

impl SheetGenerator {
    /// Validate `options`, build the worker pool and load the font and
    /// images the options ask for.
    ///
    /// Missing fonts or images are not errors: the affected feature is
    /// disabled with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidConfiguration`] for invalid options and
    /// [`SheetError::WorkerPool`] if the thread pool cannot be created.
    pub fn new(options: SheetOptions) -> Result<Self, SheetError> {
        options.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .thread_name(|index| format!("mt-worker-{index}"))
            .build()
            .map_err(|error| SheetError::WorkerPool(error.to_string()))?;
        log::debug!("worker pool ready with {} threads", pool.current_num_threads());

        let needs_text = options.stamps_enabled() || (options.header && !options.single_images);
        let text = if needs_text {
            match TextRenderer::load(&options.font) {
                Ok(renderer) => Some(renderer),
                Err(error) => {
                    log::warn!("{error}, timestamps and header text disabled");
                    None
                }
            }
        } else {
            None
        };

        let watermark = load_optional_image(options.watermark.as_deref(), "watermark");
        let header_image = if options.single_images {
            None
        } else {
            load_optional_image(options.header_image.as_deref(), "header image")
        };

        Ok(Self {
            options,
            pool,
            text,
            watermark,
            header_image,
            progress: Arc::new(NoOpProgress),
        })
    }

    /// Report sampling and processing progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The options this generator was built with.
    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// Process every input in order, continuing past failures.
    pub fn run_batch(&self, inputs: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for input in inputs {
            match self.generate(input) {
                Ok(output) => report.succeeded.push(output),
                Err(error) => {
                    log::error!("{}: {error}", input.display());
                    report.failed.push((input.clone(), error));
                }
            }
        }
        log::debug!(
            "batch finished: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    /// Build and write the contact sheet (or single images) for one video.
    ///
    /// # Errors
    ///
    /// Returns the first error that stops this video: open, plan, first
    /// frame fetch of a capture, layout or save.
    pub fn generate<P: AsRef<Path>>(&self, path: P) -> Result<SheetOutput, SheetError> {
        let path = path.as_ref();
        log::info!("processing {}", path.display());

        let mut video = VideoFile::open(path)?;
        let thumbnails = self.thumbnails(&mut video)?;
        let metadata = video.metadata().clone();
        drop(video);

        let captures = thumbnails.iter().map(|thumbnail| thumbnail.accepted).collect();

        let written = if self.options.single_images {
            self.write_single_images(path, &thumbnails)?
        } else {
            let file_size = fs::metadata(path)?.len();
            let sheet = self.render_sheet(&thumbnails, path, file_size, &metadata)?;
            let destination = output_path(&self.options.filename_template, path);
            DynamicImage::ImageRgba8(sheet).to_rgb8().save(&destination)?;
            log::info!("saved to {}", destination.display());
            vec![destination]
        };

        Ok(SheetOutput {
            input: path.to_path_buf(),
            written,
            captures,
        })
    }

    /// Plan, sample and process the thumbnails of `source`, in planning
    /// order.
    ///
    /// # Errors
    ///
    /// Propagates planning errors and first-fetch decode errors.
    pub fn thumbnails<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<Vec<Thumbnail>, SheetError> {
        let metadata = source.metadata().clone();
        let plan = SamplePlan::new(metadata.duration, self.options.capture_count)?;

        let sampling = ProgressTracker::new(self.progress.clone(), Stage::Sampling, plan.len() as u64);
        let samples = FrameSampler::new(self.options.skip_blank).sample_with_progress(
            source,
            &plan,
            Some(&sampling),
        )?;

        Ok(self.process(samples, &metadata))
    }

    /// Resize, filter and stamp `samples` on the worker pool.
    fn process(&self, samples: Vec<SampleResult>, metadata: &VideoMetadata) -> Vec<Thumbnail> {
        let count = samples.len();
        let stamp_text = if self.options.stamps_enabled() {
            self.text.as_ref()
        } else {
            None
        };
        let compositor = OverlayCompositor::new(
            stamp_text,
            self.options.font_size,
            self.options.timestamp_opacity,
            self.watermark.as_ref(),
            count,
        );
        let target = (metadata.width > 0 && metadata.height > 0)
            .then(|| self.options.thumbnail_size.resolve(metadata.width, metadata.height));
        let tracker = ProgressTracker::new(self.progress.clone(), Stage::Processing, count as u64);

        let mut thumbnails: Vec<Thumbnail> = self.pool.install(|| {
            samples
                .into_par_iter()
                .map(|sample| {
                    let thumbnail = self.process_one(sample, target, &compositor);
                    tracker.advance(Some(thumbnail.accepted));
                    thumbnail
                })
                .collect()
        });
        thumbnails.sort_by_key(|thumbnail| thumbnail.index);
        thumbnails
    }

    fn process_one(
        &self,
        sample: SampleResult,
        target: Option<(u32, u32)>,
        compositor: &OverlayCompositor<'_>,
    ) -> Thumbnail {
        let (width, height) = target.unwrap_or_else(|| {
            self.options
                .thumbnail_size
                .resolve(sample.image.width(), sample.image.height())
        });
        let resized = if (sample.image.width(), sample.image.height()) == (width, height) {
            sample.image
        } else {
            sample.image.resize_exact(width, height, FilterType::Lanczos3)
        };
        let mut image = self.options.filter.apply(resized).to_rgba8();
        compositor.apply(sample.index, sample.accepted, &mut image);
        log::debug!(
            "thumbnail {:02} at {} processed",
            sample.index + 1,
            format_timecode(sample.accepted)
        );

        Thumbnail {
            index: sample.index,
            planned: sample.planned,
            accepted: sample.accepted,
            image,
        }
    }

    /// Lay out `thumbnails` into a sheet, adding the header band when
    /// enabled and a font is available.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::EmptySheet`] or
    /// [`SheetError::ThumbnailSizeMismatch`] from the composer.
    pub fn render_sheet(
        &self,
        thumbnails: &[Thumbnail],
        path: &Path,
        file_size: u64,
        metadata: &VideoMetadata,
    ) -> Result<RgbaImage, SheetError> {
        let first = thumbnails.first().ok_or(SheetError::EmptySheet)?;
        let (cell_width, cell_height) = first.image.dimensions();
        let layout = GridLayout::new(
            thumbnails.len(),
            self.options.columns,
            cell_width,
            cell_height,
            self.options.padding,
        )?;

        let band = match (&self.text, self.options.header) {
            (Some(text), true) => {
                let header = HeaderSpec {
                    lines: header_lines(path, file_size, metadata, self.options.header_meta),
                    side_image: self.header_image.as_ref(),
                    style: HeaderStyle {
                        background: self.options.header_background,
                        foreground: self.options.header_foreground,
                        font_size: self.options.font_size,
                    },
                };
                Some(header.render(layout.canvas_size().0, text))
            }
            (None, true) => {
                log::warn!("no font available, header skipped");
                None
            }
            _ => None,
        };

        let images: Vec<RgbaImage> = thumbnails
            .iter()
            .map(|thumbnail| thumbnail.image.clone())
            .collect();
        compose_sheet(
            &images,
            self.options.columns,
            self.options.padding,
            self.options.content_background,
            band.as_ref(),
        )
    }

    fn write_single_images(
        &self,
        input: &Path,
        thumbnails: &[Thumbnail],
    ) -> Result<Vec<PathBuf>, SheetError> {
        let mut written = Vec::with_capacity(thumbnails.len());
        for thumbnail in thumbnails {
            let destination = single_image_path(input, thumbnail.index);
            DynamicImage::ImageRgba8(thumbnail.image.clone())
                .to_rgb8()
                .save(&destination)?;
            log::debug!("saved {}", destination.display());
            written.push(destination);
        }
        log::info!("saved {} single images", written.len());
        Ok(written)
    }
}

fn load_optional_image(path: Option<&Path>, what: &str) -> Option<DynamicImage> {
    let path = path?;
    match image::open(path) {
        Ok(image) => {
            log::debug!("{what} loaded from {}", path.display());
            Some(image)
        }
        Err(error) => {
            log::warn!("cannot load {what} {}: {error}, skipping", path.display());
            None
        }
    }
}
