//! Tissue segmentation core.
//!
//! Three stages turn a downsampled grayscale raster into a binary tissue
//! mask:
//!
//! ```text
//! ┌──────────────┐    ┌────────────────────┐    ┌────────────────────────┐
//! │ Edge Detector│ →  │  Region Segmenter  │ →  │ Background Classifier  │
//! │ (Canny)      │    │ (graph-based,      │    │ (border/corner label   │
//! │              │    │  Felzenszwalb)     │    │  sampling)             │
//! └──────────────┘    └────────────────────┘    └────────────────────────┘
//!      GrayRaster            LabelRaster              TissueMask
//! ```
//!
//! Edge detection sharpens region boundaries so the segmenter merges fewer
//! spurious regions across low-contrast tissue/background transitions. The
//! segmenter produces one label per connected region; the classifier marks
//! the labels found along the selected borders or corners as background.
//!
//! All three stages are deterministic: identical inputs and parameters give
//! identical outputs across repeated runs and thread counts.

mod background;
mod edges;
mod graph;

pub use background::{classify_background, BackgroundSelector, SelectorMask};
pub use edges::detect_edges;
pub use graph::segment_regions;
