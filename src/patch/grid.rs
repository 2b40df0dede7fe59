//! Non-overlapping patch grid over the full-resolution slide.

use serde::Serialize;

use crate::error::PipelineError;

/// A single grid cell: full-resolution pixel bounding box plus its grid
/// coordinates.
///
/// Edge cells are clamped to the slide bounds, so `width`/`height` may be
/// smaller than the configured patch size on the final column/row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatchBox {
    /// Grid column (0-indexed from the left)
    pub column: u32,
    /// Grid row (0-indexed from the top)
    pub row: u32,
    /// Pixel x origin at full resolution
    pub x: u32,
    /// Pixel y origin at full resolution
    pub y: u32,
    /// Box width in pixels
    pub width: u32,
    /// Box height in pixels
    pub height: u32,
}

/// The patch grid covering a full-resolution image.
///
/// The union of all cells tiles the image exactly: no gaps, no overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGrid {
    full_width: u32,
    full_height: u32,
    patch_size: u32,
}

impl PatchGrid {
    /// Create a grid for an image of the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a zero patch size and `InvalidInput`
    /// for an empty image.
    pub fn new(full_width: u32, full_height: u32, patch_size: u32) -> Result<Self, PipelineError> {
        if full_width == 0 || full_height == 0 {
            return Err(PipelineError::invalid_input(format!(
                "cannot tile an empty image ({full_width}x{full_height})"
            )));
        }
        if patch_size == 0 {
            return Err(PipelineError::invalid_parameter(
                "patch-size",
                "must be greater than 0, got 0",
            ));
        }
        Ok(Self {
            full_width,
            full_height,
            patch_size,
        })
    }

    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    /// Number of grid columns, counting a partial final column.
    pub fn columns(&self) -> u32 {
        self.full_width.div_ceil(self.patch_size)
    }

    /// Number of grid rows, counting a partial final row.
    pub fn rows(&self) -> u32 {
        self.full_height.div_ceil(self.patch_size)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate cells in row-major scan order.
    pub fn cells(&self) -> impl Iterator<Item = PatchBox> {
        let grid = *self;
        (0..grid.rows()).flat_map(move |row| {
            (0..grid.columns()).map(move |column| {
                let x = column * grid.patch_size;
                let y = row * grid.patch_size;
                PatchBox {
                    column,
                    row,
                    x,
                    y,
                    width: grid.patch_size.min(grid.full_width - x),
                    height: grid.patch_size.min(grid.full_height - y),
                }
            })
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
