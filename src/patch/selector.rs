//! Tissue-content scoring of grid cells against the tissue mask.

use serde::Serialize;

use crate::error::PipelineError;
use crate::raster::{ResolutionMap, TissueMask};

use super::grid::{PatchBox, PatchGrid};

/// A scored grid cell.
///
/// Immutable once computed; descriptors are produced in grid scan order so
/// the output sequence is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatchDescriptor {
    /// The full-resolution bounding box and grid coordinates
    #[serde(flatten)]
    pub bounds: PatchBox,

    /// Tissue fraction of the mapped mask window, in `[0, 1]`
    pub content_ratio: f64,

    /// Whether the patch met the content threshold
    pub accepted: bool,
}

/// Score every grid cell against the tissue mask.
///
/// Maps each cell's full-resolution box to its mask window through `map`,
/// computes the tissue fraction over the valid mask area, and accepts the
/// cell iff the fraction is at least `threshold`. Partial edge cells are
/// scored over their clamped window only.
///
/// The returned iterator is lazy and restartable: no work is done for cells
/// that are never consumed.
///
/// # Errors
///
/// Returns `InvalidParameter` when `threshold` is outside `[0, 1]`.
pub fn score_patches(
    grid: PatchGrid,
    mask: &TissueMask,
    map: ResolutionMap,
    threshold: f64,
) -> Result<impl Iterator<Item = PatchDescriptor> + '_, PipelineError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(PipelineError::invalid_parameter(
            "content-threshold",
            format!("must be within [0, 1], got {threshold}"),
        ));
    }

    Ok(grid.cells().map(move |bounds| {
        let (x0, y0, x1, y1) = map.map_region(bounds.x, bounds.y, bounds.width, bounds.height);
        let total = u64::from(x1 - x0) * u64::from(y1 - y0);
        let content_ratio = if total == 0 {
            0.0
        } else {
            mask.tissue_count(x0, y0, x1, y1) as f64 / total as f64
        };
        PatchDescriptor {
            bounds,
            content_ratio,
            accepted: content_ratio >= threshold,
        }
    }))
}

// =============================================================================
// Tests
// =============================================================================
