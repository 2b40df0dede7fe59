//! Output assembly: rendering and persistence of pipeline artifacts.
//!
//! Everything here is side-effect plumbing around the core pipeline:
//!
//! - rendering the segmented label raster, the tissue mask and the edge map
//!   as viewable images;
//! - the tile-crossed thumbnail with accepted patches marked;
//! - persisting accepted full-resolution patches and the JSON patch report.
//!
//! None of this participates in the algorithmic contract; each artifact is a
//! plain raster/image write controlled by the `--save-*` flags.

mod render;
mod writer;

pub use render::{
    draw_scale_markers, render_edges, render_label_raster, render_tilecrossed,
    render_tissue_mask,
};
pub use writer::OutputWriter;
