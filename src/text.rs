//! Text measurement and rendering.
//!
//! [`TextRenderer`] wraps one parsed TrueType font and draws single lines of
//! text onto RGBA canvases. It backs both the timestamp stamps and the header
//! band. Resolution follows the usual search order: an explicit path, then
//! the system font directories, then the working directory.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};

use crate::configuration::Rgb;
use crate::error::SheetError;

/// Directories searched for a font given by name.
const FONT_DIRECTORIES: [&str; 3] = ["/Library/Fonts/", "/usr/share/fonts/", "./"];

/// Font requested when the configured one cannot be found.
pub const FALLBACK_FONT: &str = "DroidSans.ttf";

/// How deep to descend into font directories (distributions nest fonts by
/// foundry and family).
const MAX_SEARCH_DEPTH: usize = 4;

/// Convert a point size to pixels at the given DPI.
pub fn points_to_pixels(points: u32, dpi: u32) -> f32 {
    points as f32 * dpi as f32 / 72.0
}

/// Locate a font file by name or path.
///
/// A name without the `.ttf` extension gets one appended. Names containing
/// a `/` are first tried as a literal path.
pub fn resolve_font_path(name: &str) -> Option<PathBuf> {
    let file_name = if name.ends_with(".ttf") {
        name.to_string()
    } else {
        format!("{name}.ttf")
    };

    if file_name.contains('/') {
        let candidate = PathBuf::from(&file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let bare_name = Path::new(&file_name).file_name()?.to_os_string();
    FONT_DIRECTORIES
        .iter()
        .find_map(|directory| find_in_directory(Path::new(directory), &bare_name, 0))
}

fn find_in_directory(directory: &Path, name: &std::ffi::OsStr, depth: usize) -> Option<PathBuf> {
    let direct = directory.join(name);
    if direct.is_file() {
        return Some(direct);
    }
    // The working directory is only checked directly.
    if depth >= MAX_SEARCH_DEPTH || directory == Path::new("./") {
        return None;
    }
    let mut subdirectories: Vec<PathBuf> = fs::read_dir(directory)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirectories.sort();
    subdirectories
        .iter()
        .find_map(|subdirectory| find_in_directory(subdirectory, name, depth + 1))
}

/// A parsed font ready to measure and draw text.
pub struct TextRenderer {
    font: Font,
    source: PathBuf,
}

impl Debug for TextRenderer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TextRenderer")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl TextRenderer {
    /// Resolve and parse the font `name`, falling back to
    /// [`FALLBACK_FONT`] when it cannot be found.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Font`] when neither font can be located or the
    /// located file is not a usable font.
    pub fn load(name: &str) -> Result<Self, SheetError> {
        let path = resolve_font_path(name)
            .or_else(|| {
                log::warn!("font {name} not found, trying {FALLBACK_FONT}");
                resolve_font_path(FALLBACK_FONT)
            })
            .ok_or_else(|| {
                SheetError::Font(format!("no usable font found for {name} or {FALLBACK_FONT}"))
            })?;
        log::info!("using font: {}", path.display());
        Self::from_file(&path)
    }

    /// Parse the font stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Font`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SheetError> {
        let bytes = fs::read(path)
            .map_err(|error| SheetError::Font(format!("cannot read {}: {error}", path.display())))?;
        Self::from_bytes(bytes, path.to_path_buf())
    }

    /// Parse font data already in memory. `source` is kept for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Font`] if the data is not a usable font.
    pub fn from_bytes(bytes: Vec<u8>, source: PathBuf) -> Result<Self, SheetError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|error| {
            SheetError::Font(format!("cannot parse {}: {error}", source.display()))
        })?;
        Ok(Self { font, source })
    }

    /// Distance from the top of a line to its baseline, in pixels.
    pub fn ascent(&self, pixel_size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(pixel_size)
            .map_or(pixel_size * 0.8, |metrics| metrics.ascent)
    }

    /// Width and height of `text` set at `pixel_size`.
    ///
    /// The height spans ascent to descent, independent of the glyphs used.
    pub fn measure(&self, text: &str, pixel_size: f32) -> (u32, u32) {
        let width: f32 = text
            .chars()
            .map(|character| self.font.metrics(character, pixel_size).advance_width)
            .sum();
        let height = self
            .font
            .horizontal_line_metrics(pixel_size)
            .map_or(pixel_size, |metrics| metrics.ascent - metrics.descent);
        (width.ceil().max(0.0) as u32, height.ceil().max(0.0) as u32)
    }

    /// Draw `text` onto `canvas` with its pen starting at `x` on `baseline`.
    ///
    /// Glyph coverage is blended over the existing pixels; anything falling
    /// outside the canvas is clipped.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i64,
        baseline: i64,
        pixel_size: f32,
        color: Rgb,
    ) {
        let mut pen = x as f32;
        for character in text.chars() {
            let (metrics, coverage) = self.font.rasterize(character, pixel_size);
            let left = pen.round() as i64 + metrics.xmin as i64;
            let top = baseline - metrics.ymin as i64 - metrics.height as i64;
            for row in 0..metrics.height {
                for column in 0..metrics.width {
                    let alpha = coverage[row * metrics.width + column];
                    if alpha == 0 {
                        continue;
                    }
                    blend_pixel(
                        canvas,
                        left + column as i64,
                        top + row as i64,
                        color,
                        alpha as f32 / 255.0,
                    );
                }
            }
            pen += metrics.advance_width;
        }
    }

    /// Render `text` into its own box: `foreground` on `background`, padded
    /// by `padding` pixels on every side.
    pub fn render(
        &self,
        text: &str,
        pixel_size: f32,
        foreground: Rgb,
        background: Rgb,
        padding: u32,
    ) -> RgbaImage {
        let (width, height) = self.measure(text, pixel_size);
        let mut image = RgbaImage::from_pixel(
            width + padding * 2,
            height + padding * 2,
            background.to_rgba(),
        );
        let baseline = padding as i64 + self.ascent(pixel_size).round() as i64;
        self.draw(&mut image, text, padding as i64, baseline, pixel_size, foreground);
        image
    }
}

fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgb, alpha: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let Rgba([red, green, blue, existing_alpha]) = *pixel;
    let mix = |under: u8, over: u8| (under as f32 * (1.0 - alpha) + over as f32 * alpha).round() as u8;
    *pixel = Rgba([
        mix(red, color.0),
        mix(green, color.1),
        mix(blue, color.2),
        existing_alpha.max((alpha * 255.0).round() as u8),
    ]);
}
