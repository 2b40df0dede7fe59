//! Graph-based region segmentation.
//!
//! Implements the Felzenszwalb-Huttenlocher algorithm over the 8-connected
//! pixel grid. Each pixel starts as its own region; edges between neighboring
//! pixels are weighted by intensity difference and processed in ascending
//! order. Two regions merge when the connecting edge weight is no greater
//! than the smaller of the two regions' internal difference plus `k / size`,
//! so larger `k` favors coarser segmentation. A post-pass absorbs regions
//! below the minimum segment size into their neighbors.
//!
//! # Determinism
//!
//! Equal-weight edges are ordered by their endpoint indices (row-major grid
//! scan, fixed neighbor order), a total order. The parallel sort therefore
//! yields the same sequence at any thread count, and repeated runs on
//! identical input produce identical label rasters.

use rayon::slice::ParallelSliceMut;

use crate::error::PipelineError;
use crate::raster::{GrayRaster, LabelRaster};

// =============================================================================
// Region arena
// =============================================================================

/// Union-find arena of regions indexed by pixel, each root carrying the
/// region's internal-difference statistic and pixel count.
struct RegionArena {
    parent: Vec<u32>,
    size: Vec<u32>,
    internal_diff: Vec<f32>,
}

impl RegionArena {
    fn new(count: usize) -> Self {
        Self {
            parent: (0..count as u32).collect(),
            size: vec![1; count],
            internal_diff: vec![0.0; count],
        }
    }

    /// Find the root of `idx` with path halving.
    fn find(&mut self, mut idx: u32) -> u32 {
        while self.parent[idx as usize] != idx {
            let grandparent = self.parent[self.parent[idx as usize] as usize];
            self.parent[idx as usize] = grandparent;
            idx = grandparent;
        }
        idx
    }

    fn size(&self, root: u32) -> u32 {
        self.size[root as usize]
    }

    /// Internal difference plus the size-dependent threshold term.
    fn merge_threshold(&self, root: u32, k: f32) -> f32 {
        self.internal_diff[root as usize] + k / self.size[root as usize] as f32
    }

    /// Merge the regions rooted at `a` and `b` across an edge of `weight`.
    fn merge(&mut self, a: u32, b: u32, weight: f32) {
        let (big, small) = if self.size[a as usize] >= self.size[b as usize] {
            (a, b)
        } else {
            (b, a)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
        self.internal_diff[big as usize] = self.internal_diff[big as usize]
            .max(self.internal_diff[small as usize])
            .max(weight);
    }
}

// =============================================================================
// Grid graph
// =============================================================================

/// An edge between two neighboring pixels.
struct GridEdge {
    weight: f32,
    a: u32,
    b: u32,
}

/// Build the 8-connected grid graph in row-major scan order.
///
/// Each pixel connects to its east, south, southeast and southwest neighbors,
/// so every neighboring pair appears exactly once.
fn build_edges(raster: &GrayRaster) -> Vec<GridEdge> {
    let width = raster.width();
    let height = raster.height();
    let mut edges = Vec::with_capacity(4 * raster.area());

    let push = |edges: &mut Vec<GridEdge>, x0: u32, y0: u32, x1: u32, y1: u32| {
        edges.push(GridEdge {
            weight: (raster.get(x0, y0) - raster.get(x1, y1)).abs(),
            a: y0 * width + x0,
            b: y1 * width + x1,
        });
    };

    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                push(&mut edges, x, y, x + 1, y);
            }
            if y + 1 < height {
                push(&mut edges, x, y, x, y + 1);
                if x + 1 < width {
                    push(&mut edges, x, y, x + 1, y + 1);
                }
                if x > 0 {
                    push(&mut edges, x, y, x - 1, y + 1);
                }
            }
        }
    }
    edges
}

// =============================================================================
// Segmentation
// =============================================================================

/// Segment a raster into labeled regions.
///
/// Returns a label raster of identical dimensions in which every pixel
/// carries the compact label of its region, numbered in row-major first-seen
/// order starting at 0.
///
/// # Errors
///
/// Returns `InvalidInput` for a raster with non-positive dimensions, and
/// `InvalidParameter` when `k` or `min_segment_size` is not positive.
pub fn segment_regions(
    raster: &GrayRaster,
    k: f32,
    min_segment_size: usize,
) -> Result<LabelRaster, PipelineError> {
    if raster.is_empty() {
        return Err(PipelineError::invalid_input(
            "segmentation requires a raster with non-zero area",
        ));
    }
    if !(k > 0.0) {
        return Err(PipelineError::invalid_parameter(
            "k-const",
            format!("must be greater than 0, got {k}"),
        ));
    }
    if min_segment_size == 0 {
        return Err(PipelineError::invalid_parameter(
            "minimum-segmentsize",
            "must be greater than 0, got 0",
        ));
    }

    let mut edges = build_edges(raster);

    // Fixed total order: weight, then endpoints. An unstable parallel sort is
    // deterministic under a total order, so thread count cannot change labels.
    edges.par_sort_unstable_by(|lhs, rhs| {
        lhs.weight
            .total_cmp(&rhs.weight)
            .then(lhs.a.cmp(&rhs.a))
            .then(lhs.b.cmp(&rhs.b))
    });

    let mut arena = RegionArena::new(raster.area());

    // Main sweep: merge across an edge when its weight does not exceed either
    // region's internal difference plus k / size.
    for edge in &edges {
        let root_a = arena.find(edge.a);
        let root_b = arena.find(edge.b);
        if root_a == root_b {
            continue;
        }
        let threshold = arena
            .merge_threshold(root_a, k)
            .min(arena.merge_threshold(root_b, k));
        if edge.weight <= threshold {
            arena.merge(root_a, root_b, edge.weight);
        }
    }

    // Post-pass: absorb regions below the minimum size into an adjacent
    // region, repeating the sweep with the size floor as the only criterion.
    for edge in &edges {
        let root_a = arena.find(edge.a);
        let root_b = arena.find(edge.b);
        if root_a == root_b {
            continue;
        }
        if (arena.size(root_a) as usize) < min_segment_size
            || (arena.size(root_b) as usize) < min_segment_size
        {
            arena.merge(root_a, root_b, edge.weight);
        }
    }

    // Compact labels in row-major first-seen order.
    let mut label_of_root = vec![u32::MAX; raster.area()];
    let mut labels = Vec::with_capacity(raster.area());
    let mut next_label = 0u32;
    for idx in 0..raster.area() as u32 {
        let root = arena.find(idx);
        let slot = &mut label_of_root[root as usize];
        if *slot == u32::MAX {
            *slot = next_label;
            next_label += 1;
        }
        labels.push(*slot);
    }

    Ok(LabelRaster::from_raw(
        raster.width(),
        raster.height(),
        next_label,
        labels,
    ))
}

// =============================================================================
// Tests
// =============================================================================
