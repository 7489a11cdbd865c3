//! Thumbnail filters.
//!
//! [`FilterKind`] is a closed set of pure image transforms applied to every
//! thumbnail after resizing.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use image::DynamicImage;

use crate::error::SheetError;

/// A filter applied to each thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Leave the thumbnail untouched. This is the default.
    #[default]
    None,
    /// Grayscale, lightly sharpened, with raised contrast.
    Greyscale,
    /// Invert every color channel.
    Invert,
}

impl FilterKind {
    /// Apply the filter, returning the transformed image.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            FilterKind::None => image,
            FilterKind::Greyscale => {
                let grey = image.grayscale().unsharpen(1.0, 0).adjust_contrast(20.0);
                log::debug!("greyscale filter applied");
                grey
            }
            FilterKind::Invert => {
                let mut inverted = image;
                inverted.invert();
                log::debug!("invert filter applied");
                inverted
            }
        }
    }
}

impl FromStr for FilterKind {
    type Err = SheetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(FilterKind::None),
            "greyscale" | "grayscale" | "grey" | "gray" => Ok(FilterKind::Greyscale),
            "invert" => Ok(FilterKind::Invert),
            other => Err(SheetError::InvalidConfiguration(format!(
                "unknown filter {other:?} (expected none, greyscale or invert)"
            ))),
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            FilterKind::None => "none",
            FilterKind::Greyscale => "greyscale",
            FilterKind::Invert => "invert",
        };
        f.write_str(name)
    }
}
