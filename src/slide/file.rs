//! File-backed slide implementation.
//!
//! Decodes the input image once and serves all downsampled and region reads
//! from the in-memory copy. This is a thin adapter: pyramidal formats are
//! flattened to their base level by the `image` crate decoder, and
//! downsampled reads are produced by resampling.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::SlideError;
use crate::raster::GrayRaster;

use super::reader::SlideReader;

/// A slide backed by a decoded local image file.
pub struct ImageFileSlide {
    path: PathBuf,
    image: DynamicImage,
}

impl ImageFileSlide {
    /// Open and decode a slide image from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SlideError> {
        let path = path.as_ref().to_path_buf();
        let image = image::open(&path).map_err(|source| SlideError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, image })
    }

    /// Build a slide from an already decoded image (used by tests and tools).
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            path: PathBuf::new(),
            image,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn downsampled_dimensions(&self, factor: u32) -> Result<(u32, u32), SlideError> {
        if factor == 0 {
            return Err(SlideError::ZeroDownsample);
        }
        let width = self.image.width().div_ceil(factor).max(1);
        let height = self.image.height().div_ceil(factor).max(1);
        Ok((width, height))
    }
}

impl SlideReader for ImageFileSlide {
    fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    fn read_downsampled(&self, factor: u32) -> Result<GrayRaster, SlideError> {
        let (width, height) = self.downsampled_dimensions(factor)?;
        let resized = self.image.resize_exact(width, height, FilterType::Triangle);
        Ok(GrayRaster::from_luma(&resized.to_luma8(), factor))
    }

    fn read_thumbnail(&self, factor: u32) -> Result<RgbImage, SlideError> {
        let (width, height) = self.downsampled_dimensions(factor)?;
        Ok(self
            .image
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgb8())
    }

    fn read_region(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, SlideError> {
        let (slide_width, slide_height) = self.dimensions();
        let in_bounds = x
            .checked_add(width)
            .is_some_and(|x1| x1 <= slide_width)
            && y.checked_add(height).is_some_and(|y1| y1 <= slide_height);
        if !in_bounds {
            return Err(SlideError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                slide_width,
                slide_height,
            });
        }
        Ok(self.image.crop_imm(x, y, width, height).to_rgb8())
    }
}

// =============================================================================
// Tests
// =============================================================================
