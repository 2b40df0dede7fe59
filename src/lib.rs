//! # histo-segment
//!
//! A semi-automatic pipeline to segment tissue from background in high
//! resolution whole-slide histopathological images and extract patches of
//! tissue from the full resolution image.
//!
//! Whole slide images are far too large to process as single units, so they
//! are divided into fixed-size patches, and a significant portion of every
//! slide is background that downstream analyses should never see. This crate
//! segments a downsampled version of the slide, infers which segments are
//! background from the image borders or corners, and selects the
//! full-resolution patches whose tissue content clears a threshold.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌────────────────┐
//! │ Slide Access │ → │ Edge Detector │ → │ Region         │
//! │ (downsample) │   │ (Canny)       │   │ Segmenter      │
//! └──────┬───────┘   └───────────────┘   └────────┬───────┘
//!        │                                        ▼
//!        │           ┌───────────────┐   ┌────────────────┐
//!        │           │ Patch         │ ← │ Background     │
//!        └─────────▶ │ Selector      │   │ Classifier     │
//!   full-res reads   └───────┬───────┘   └────────────────┘
//!                            ▼
//!                    ┌───────────────┐
//!                    │ Output        │
//!                    │ Assembler     │
//!                    └───────────────┘
//! ```
//!
//! The library is organized into several modules:
//!
//! - [`slide`] - Slide access trait and the file-backed adapter
//! - [`raster`] - Grid types and full↔mask resolution mapping
//! - [`segment`] - Edge detection, graph segmentation, background labeling
//! - [`patch`] - Patch grid and tissue-content selection
//! - [`output`] - Artifact rendering and persistence
//! - [`pipeline`] - Orchestration, cancellation, run summary
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use histo_segment::{Config, ImageFileSlide, Pipeline};
//!
//! # fn main() -> Result<(), histo_segment::PipelineError> {
//! let config = Config::parse_from([
//!     "histo-segment",
//!     "--save-mask",
//!     "--content-threshold",
//!     "0.3",
//!     "slide.tif",
//! ]);
//! config.validate()?;
//!
//! let slide = ImageFileSlide::open(&config.input)?;
//! let summary = Pipeline::new(config, slide).run()?;
//! println!("accepted {} patches", summary.accepted_patches);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod patch;
pub mod pipeline;
pub mod raster;
pub mod segment;
pub mod slide;

// Re-export commonly used types
pub use config::{
    Config, DEFAULT_CONTENT_THRESHOLD, DEFAULT_DOWNSAMPLE, DEFAULT_K_CONST,
    DEFAULT_MIN_SEGMENT_SIZE, DEFAULT_OUTPUT_DIR, DEFAULT_PATCH_SIZE, DEFAULT_SIGMA,
    DEFAULT_WINDOW_LINES,
};
pub use error::{PipelineError, SlideError};
pub use output::{
    draw_scale_markers, render_edges, render_label_raster, render_tilecrossed,
    render_tissue_mask, OutputWriter,
};
pub use patch::{score_patches, PatchBox, PatchDescriptor, PatchGrid};
pub use pipeline::{CancelToken, Pipeline, PipelineSummary};
pub use raster::{GrayRaster, LabelRaster, ResolutionMap, TissueMask};
pub use segment::{
    classify_background, detect_edges, segment_regions, BackgroundSelector, SelectorMask,
};
pub use slide::{ImageFileSlide, SlideReader};
