//! Test utilities for integration tests.
//!
//! Provides synthetic in-memory slides and instrumented wrappers for
//! verifying which read paths the pipeline exercises.

use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};

use histo_segment::error::SlideError;
use histo_segment::raster::GrayRaster;
use histo_segment::slide::SlideReader;

/// Background intensity of synthetic slides (near white, like glass).
pub const BACKGROUND_VALUE: u8 = 245;

/// Tissue intensity of synthetic slides (dark stain).
pub const TISSUE_VALUE: u8 = 40;

// =============================================================================
// Synthetic slide
// =============================================================================

/// An in-memory slide with exact, nearest-neighbor downsampling.
///
/// Nearest-neighbor sampling keeps synthetic geometry crisp: a square on the
/// full-resolution image stays a square with sharp boundaries on the
/// downsampled raster, so tests can reason about segment layout precisely.
pub struct SyntheticSlide {
    image: RgbImage,
}

impl SyntheticSlide {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// A slide filled with a single gray value.
    pub fn uniform(width: u32, height: u32, value: u8) -> Self {
        Self::new(RgbImage::from_pixel(width, height, Rgb([value, value, value])))
    }

    /// A bright background slide with a dark square at `[x0, x0 + size) x
    /// [y0, y0 + size)` in full-resolution pixels.
    pub fn with_dark_square(width: u32, height: u32, x0: u32, y0: u32, size: u32) -> Self {
        let image = RgbImage::from_fn(width, height, |x, y| {
            let inside = x >= x0 && x < x0 + size && y >= y0 && y < y0 + size;
            let v = if inside { TISSUE_VALUE } else { BACKGROUND_VALUE };
            Rgb([v, v, v])
        });
        Self::new(image)
    }

    fn luma(&self, x: u32, y: u32) -> f32 {
        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)) / 255.0
    }
}

impl SlideReader for SyntheticSlide {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn read_downsampled(&self, factor: u32) -> Result<GrayRaster, SlideError> {
        if factor == 0 {
            return Err(SlideError::ZeroDownsample);
        }
        let (width, height) = self.dimensions();
        let out_width = width.div_ceil(factor).max(1);
        let out_height = height.div_ceil(factor).max(1);
        Ok(GrayRaster::from_fn(out_width, out_height, factor, |x, y| {
            self.luma((x * factor).min(width - 1), (y * factor).min(height - 1))
        }))
    }

    fn read_thumbnail(&self, factor: u32) -> Result<RgbImage, SlideError> {
        if factor == 0 {
            return Err(SlideError::ZeroDownsample);
        }
        let (width, height) = self.dimensions();
        let out_width = width.div_ceil(factor).max(1);
        let out_height = height.div_ceil(factor).max(1);
        Ok(RgbImage::from_fn(out_width, out_height, |x, y| {
            *self
                .image
                .get_pixel((x * factor).min(width - 1), (y * factor).min(height - 1))
        }))
    }

    fn read_region(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, SlideError> {
        let (slide_width, slide_height) = self.dimensions();
        if x + width > slide_width || y + height > slide_height {
            return Err(SlideError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                slide_width,
                slide_height,
            });
        }
        Ok(RgbImage::from_fn(width, height, |dx, dy| {
            *self.image.get_pixel(x + dx, y + dy)
        }))
    }
}

// =============================================================================
// Tracking wrapper
// =============================================================================

/// Wraps a slide and counts reads per access path.
///
/// Used to verify, for example, that test mode never touches the
/// full-resolution read path.
pub struct TrackingSlide<S> {
    inner: S,
    downsampled_reads: AtomicUsize,
    region_reads: AtomicUsize,
}

impl<S> TrackingSlide<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            downsampled_reads: AtomicUsize::new(0),
            region_reads: AtomicUsize::new(0),
        }
    }

    pub fn downsampled_reads(&self) -> usize {
        self.downsampled_reads.load(Ordering::SeqCst)
    }

    pub fn region_reads(&self) -> usize {
        self.region_reads.load(Ordering::SeqCst)
    }
}

impl<S: SlideReader> SlideReader for TrackingSlide<S> {
    fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    fn read_downsampled(&self, factor: u32) -> Result<GrayRaster, SlideError> {
        self.downsampled_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_downsampled(factor)
    }

    fn read_thumbnail(&self, factor: u32) -> Result<RgbImage, SlideError> {
        self.inner.read_thumbnail(factor)
    }

    fn read_region(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, SlideError> {
        self.region_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_region(x, y, width, height)
    }
}

// =============================================================================
// Failing wrapper
// =============================================================================

/// Wraps a slide and fails full-resolution reads at one grid origin.
pub struct FailingSlide<S> {
    inner: S,
    fail_at: (u32, u32),
}

impl<S> FailingSlide<S> {
    pub fn new(inner: S, fail_at: (u32, u32)) -> Self {
        Self { inner, fail_at }
    }
}

impl<S: SlideReader> SlideReader for FailingSlide<S> {
    fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    fn read_downsampled(&self, factor: u32) -> Result<GrayRaster, SlideError> {
        self.inner.read_downsampled(factor)
    }

    fn read_thumbnail(&self, factor: u32) -> Result<RgbImage, SlideError> {
        self.inner.read_thumbnail(factor)
    }

    fn read_region(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, SlideError> {
        if (x, y) == self.fail_at {
            let (slide_width, slide_height) = self.dimensions();
            return Err(SlideError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                slide_width,
                slide_height,
            });
        }
        self.inner.read_region(x, y, width, height)
    }
}
