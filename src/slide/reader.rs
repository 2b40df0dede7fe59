//! SlideReader trait for storage-agnostic slide access.
//!
//! The trait exposes the two read paths the pipeline needs: a downsampled
//! raster of the whole slide for segmentation, and full-resolution region
//! reads for patch extraction. Implementations decide how those reads are
//! served (decoded file in memory, pyramidal level selection, ...).

use image::RgbImage;

use crate::error::SlideError;
use crate::raster::GrayRaster;

/// Storage-agnostic interface for reading slide images.
///
/// Implemented by [`super::ImageFileSlide`] for local files; tests provide
/// synthetic in-memory implementations.
pub trait SlideReader {
    /// Full-resolution dimensions as `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Read the whole slide downsampled by `factor` as a grayscale raster.
    ///
    /// The returned raster is `ceil(width / factor) x ceil(height / factor)`
    /// pixels and carries `factor` as its downsample tag.
    ///
    /// # Errors
    ///
    /// Fails if `factor` is zero or the underlying read fails.
    fn read_downsampled(&self, factor: u32) -> Result<GrayRaster, SlideError>;

    /// Read the whole slide downsampled by `factor` as an RGB thumbnail.
    ///
    /// Used for display artifacts (tile-crossed image); the segmentation path
    /// uses [`Self::read_downsampled`] instead.
    fn read_thumbnail(&self, factor: u32) -> Result<RgbImage, SlideError>;

    /// Read a full-resolution region with origin `(x, y)` and the given size.
    ///
    /// # Errors
    ///
    /// Fails with [`SlideError::RegionOutOfBounds`] if the box does not fit
    /// inside the slide.
    fn read_region(&self, x: u32, y: u32, width: u32, height: u32)
        -> Result<RgbImage, SlideError>;
}
