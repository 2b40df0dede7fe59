//! Core raster types shared across the pipeline.
//!
//! All pipeline stages operate on flat, row-major pixel grids:
//!
//! - [`GrayRaster`]: grayscale intensities in `[0, 1]`, tagged with the
//!   downsample factor relative to full resolution. Produced by the image
//!   access adapter and the edge detector, consumed by the segmenter.
//! - [`LabelRaster`]: one non-negative region identifier per pixel. Every
//!   pixel is always labeled. Produced by the segmenter, consumed by the
//!   background classifier.
//! - [`TissueMask`]: binary tissue/background raster derived from a label
//!   raster and a background label set.
//! - [`ResolutionMap`]: the single shared mapping between full-resolution
//!   pixel coordinates and mask coordinates. Computed once per run and passed
//!   explicitly so tile-boundary rounding is consistent everywhere.

use std::collections::BTreeSet;

use image::GrayImage;

// =============================================================================
// GrayRaster
// =============================================================================

/// A grayscale raster with explicit dimensions and downsample factor.
///
/// Intensities are stored as `f32` in `[0, 1]`, row-major.
#[derive(Debug, Clone)]
pub struct GrayRaster {
    width: u32,
    height: u32,
    /// Downsample factor relative to the full-resolution slide (1 = full res).
    downsample: u32,
    data: Vec<f32>,
}

impl GrayRaster {
    /// Create a raster filled with zeros.
    pub fn new(width: u32, height: u32, downsample: u32) -> Self {
        Self {
            width,
            height,
            downsample,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Create a raster from a per-pixel function.
    pub fn from_fn(
        width: u32,
        height: u32,
        downsample: u32,
        mut f: impl FnMut(u32, u32) -> f32,
    ) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            downsample,
            data,
        }
    }

    /// Convert an 8-bit grayscale image into a raster with values in `[0, 1]`.
    pub fn from_luma(image: &GrayImage, downsample: u32) -> Self {
        let data = image.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
        Self {
            width: image.width(),
            height: image.height(),
            downsample,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn downsample(&self) -> u32 {
        self.downsample
    }

    /// Total number of pixels.
    pub fn area(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[y as usize * self.width as usize + x as usize] = value;
    }

    pub fn pixels(&self) -> &[f32] {
        &self.data
    }
}

// =============================================================================
// LabelRaster
// =============================================================================

/// A raster of region labels, same dimensions as its source raster.
///
/// Labels are compact: they run from `0` to `label_count() - 1`, and every
/// pixel carries exactly one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRaster {
    width: u32,
    height: u32,
    label_count: u32,
    data: Vec<u32>,
}

impl LabelRaster {
    /// Build a label raster from raw data.
    ///
    /// `label_count` must be one past the largest label in `data`.
    pub fn from_raw(width: u32, height: u32, label_count: u32, data: Vec<u32>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            label_count,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of distinct labels.
    pub fn label_count(&self) -> u32 {
        self.label_count
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn labels(&self) -> &[u32] {
        &self.data
    }
}

// =============================================================================
// TissueMask
// =============================================================================

/// Binary tissue mask: a pixel is tissue iff its label is not background.
///
/// The mask is a deterministic function of the label raster and the
/// background label set.
#[derive(Debug, Clone)]
pub struct TissueMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl TissueMask {
    /// Derive a mask from a label raster and the set of background labels.
    pub fn from_background(labels: &LabelRaster, background: &BTreeSet<u32>) -> Self {
        let data = labels
            .labels()
            .iter()
            .map(|label| !background.contains(label))
            .collect();
        Self {
            width: labels.width(),
            height: labels.height(),
            data,
        }
    }

    /// Build a mask directly from raw tissue flags (used by tests and tools).
    pub fn from_raw(width: u32, height: u32, data: Vec<bool>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_tissue(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Count tissue pixels inside `[x0, x1) x [y0, y1)`.
    ///
    /// The window is assumed to be clamped to the mask bounds.
    pub fn tissue_count(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> usize {
        let mut count = 0;
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            for x in x0..x1 {
                if self.data[row + x as usize] {
                    count += 1;
                }
            }
        }
        count
    }
}

// =============================================================================
// ResolutionMap
// =============================================================================

/// Mapping between full-resolution pixel coordinates and mask coordinates.
///
/// Computed once per run from the slide dimensions and the mask dimensions,
/// then passed explicitly to every consumer. Both axes carry their own scale
/// since integer downsampling may round the two dimensions differently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionMap {
    full_width: u32,
    full_height: u32,
    mask_width: u32,
    mask_height: u32,
}

impl ResolutionMap {
    pub fn new(full_width: u32, full_height: u32, mask_width: u32, mask_height: u32) -> Self {
        Self {
            full_width,
            full_height,
            mask_width,
            mask_height,
        }
    }

    pub fn full_dimensions(&self) -> (u32, u32) {
        (self.full_width, self.full_height)
    }

    pub fn mask_dimensions(&self) -> (u32, u32) {
        (self.mask_width, self.mask_height)
    }

    /// Map a full-resolution box to the covered mask window `[x0, x1) x [y0, y1)`.
    ///
    /// The start rounds down and the end rounds up, so the window covers every
    /// mask pixel the box touches. The result is clamped to the mask bounds;
    /// a box fully outside the mask maps to an empty window.
    pub fn map_region(&self, x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let sx = f64::from(self.mask_width) / f64::from(self.full_width);
        let sy = f64::from(self.mask_height) / f64::from(self.full_height);

        let x0 = (f64::from(x) * sx).floor() as u32;
        let y0 = (f64::from(y) * sy).floor() as u32;
        let x1 = (f64::from(x + width) * sx).ceil() as u32;
        let y1 = (f64::from(y + height) * sy).ceil() as u32;

        let x0 = x0.min(self.mask_width);
        let y0 = y0.min(self.mask_height);
        let x1 = x1.min(self.mask_width);
        let y1 = y1.min(self.mask_height);

        (x0, y0, x1, y1)
    }
}

// =============================================================================
// Tests
// =============================================================================
