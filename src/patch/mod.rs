//! Patch grid and selection.
//!
//! The full-resolution slide is tiled into a non-overlapping grid of
//! `patch_size x patch_size` cells (the final row and column may be partial).
//! Each cell is mapped to its window of the lower-resolution tissue mask
//! through the shared [`crate::raster::ResolutionMap`], scored by tissue
//! fraction, and accepted when the fraction reaches the content threshold.
//!
//! Scoring is a lazy iterator in grid scan order (row-major): consumers may
//! stop early without paying for cells they never visit, and no slide pixels
//! are read during scoring. Full-resolution reads happen only when accepted
//! patches are persisted by the output assembler.

mod grid;
mod selector;

pub use grid::{PatchBox, PatchGrid};
pub use selector::{score_patches, PatchDescriptor};
