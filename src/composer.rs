//! Grid layout and sheet compositing.
//!
//! [`GridLayout`] derives every geometric value of the sheet from the
//! thumbnail size, the column count and the padding, so cells can never
//! overlap. [`compose_sheet`] pastes thumbnails into that grid and stacks
//! the optional header band on top.
//!
//! # Example
//!
//! ```
//! use mt::GridLayout;
//!
//! let layout = GridLayout::new(4, 2, 100, 50, 10)?;
//! assert_eq!(layout.canvas_size(), (230, 130));
//! assert_eq!(layout.position(3), (120, 70));
//! # Ok::<(), mt::SheetError>(())
//! ```

use image::{RgbaImage, imageops};

use crate::configuration::Rgb;
use crate::error::SheetError;

/// Geometry of a thumbnail grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct GridLayout {
    columns: u32,
    rows: u32,
    cell_width: u32,
    cell_height: u32,
    padding: u32,
}

impl GridLayout {
    /// Lay out `count` cells of `cell_width × cell_height` in `columns`
    /// columns with `padding` pixels around and between cells.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::EmptySheet`] for zero cells and
    /// [`SheetError::InvalidConfiguration`] for zero columns.
    pub fn new(
        count: usize,
        columns: u32,
        cell_width: u32,
        cell_height: u32,
        padding: u32,
    ) -> Result<Self, SheetError> {
        if count == 0 {
            return Err(SheetError::EmptySheet);
        }
        if columns == 0 {
            return Err(SheetError::InvalidConfiguration(
                "columns must be at least 1".to_string(),
            ));
        }
        let rows = (count as u32).div_ceil(columns);
        Ok(Self {
            columns,
            rows,
            cell_width,
            cell_height,
            padding,
        })
    }

    /// Number of columns.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows, `ceil(count / columns)`.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Size of one cell.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Padding in pixels.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Size of the grid canvas (without any header band).
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            span(self.cell_width, self.columns, self.padding),
            span(self.cell_height, self.rows, self.padding),
        )
    }

    /// Top-left corner of the cell at linear `index` (row-major).
    pub fn position(&self, index: usize) -> (u32, u32) {
        let column = index as u32 % self.columns;
        let row = index as u32 / self.columns;
        (
            offset(column, self.cell_width, self.padding),
            offset(row, self.cell_height, self.padding),
        )
    }
}

fn span(cell: u32, cells: u32, padding: u32) -> u32 {
    if padding > 0 {
        cell * cells + padding * (cells + 1)
    } else {
        cell * cells
    }
}

fn offset(slot: u32, cell: u32, padding: u32) -> u32 {
    if padding > 0 {
        slot * cell + padding * slot + padding
    } else {
        slot * cell
    }
}

/// Composite `thumbnails` into a contact sheet.
///
/// All thumbnails must share the dimensions of the first one. When a
/// `header` band is given the grid is shifted down by its height and the
/// band is pasted at the top; the band is expected to be as wide as the grid.
///
/// # Errors
///
/// Returns [`SheetError::EmptySheet`] for no thumbnails and
/// [`SheetError::ThumbnailSizeMismatch`] when sizes differ.
pub fn compose_sheet(
    thumbnails: &[RgbaImage],
    columns: u32,
    padding: u32,
    background: Rgb,
    header: Option<&RgbaImage>,
) -> Result<RgbaImage, SheetError> {
    let first = thumbnails.first().ok_or(SheetError::EmptySheet)?;
    let expected = first.dimensions();
    for (index, thumbnail) in thumbnails.iter().enumerate() {
        if thumbnail.dimensions() != expected {
            return Err(SheetError::ThumbnailSizeMismatch {
                index,
                expected,
                actual: thumbnail.dimensions(),
            });
        }
    }

    let layout = GridLayout::new(thumbnails.len(), columns, expected.0, expected.1, padding)?;
    let (grid_width, grid_height) = layout.canvas_size();
    let header_height = header.map_or(0, RgbaImage::height);

    log::debug!("single image dimension: {}x{}", expected.0, expected.1);
    log::debug!(
        "sheet dimension: {grid_width}x{} ({} columns, {} rows)",
        grid_height + header_height,
        layout.columns(),
        layout.rows()
    );

    let mut sheet =
        RgbaImage::from_pixel(grid_width, grid_height + header_height, background.to_rgba());

    for (index, thumbnail) in thumbnails.iter().enumerate() {
        let (x, y) = layout.position(index);
        imageops::replace(&mut sheet, thumbnail, x as i64, (y + header_height) as i64);
    }

    if let Some(band) = header {
        imageops::replace(&mut sheet, band, 0, 0);
    }

    Ok(sheet)
}
