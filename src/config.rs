//! Configuration management for the segmentation pipeline.
//!
//! This module provides the command-line surface of the tool:
//! - Command-line arguments via clap
//! - Environment variables with `HISTO_` prefix
//! - Sensible defaults for all optional settings
//! - Eager validation: every parameter is range-checked before any slide
//!   I/O or segmentation work begins
//!
//! # Example
//!
//! ```ignore
//! use histo_segment::Config;
//! use clap::Parser;
//!
//! let config = Config::parse();
//! config.validate()?;
//! println!("segmenting {} at k = {}", config.input.display(), config.k_const);
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::error::PipelineError;
use crate::segment::{BackgroundSelector, SelectorMask};

// =============================================================================
// Default Values
// =============================================================================

/// Default patch size (D for D x D patches).
pub const DEFAULT_PATCH_SIZE: u32 = 512;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output/";

/// Default downsample factor for display artifacts and the mask raster.
pub const DEFAULT_DOWNSAMPLE: u32 = 16;

/// Default threshold constant for the segmentation merge rule.
pub const DEFAULT_K_CONST: u32 = 10_000;

/// Default minimum segment size enforced by the segmentation post-pass.
pub const DEFAULT_MIN_SEGMENT_SIZE: usize = 10_000;

/// Default border/corner sampling window, in mask pixels.
pub const DEFAULT_WINDOW_LINES: u32 = 100;

/// Default Gaussian sigma for edge detection.
pub const DEFAULT_SIGMA: f32 = 0.5;

/// Default minimum tissue fraction for a patch to be selected.
pub const DEFAULT_CONTENT_THRESHOLD: f64 = 0.5;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Produce tissue patches from a high resolution histopathological image.
///
/// Segments tissue from background on a downsampled version of the slide
/// (Canny edge detection followed by graph-based segmentation), labels the
/// segments found at the selected borders or corners as background, then
/// extracts full-resolution patches whose tissue content clears the
/// threshold.
#[derive(Parser, Debug, Clone)]
#[command(name = "histo-segment")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The whole slide image input file.
    #[arg(value_name = "INPUT_IMAGE")]
    pub input: PathBuf,

    // =========================================================================
    // Execution
    // =========================================================================
    /// Size of the produced patches; a value of D produces D x D patches.
    #[arg(long, default_value_t = DEFAULT_PATCH_SIZE, env = "HISTO_PATCH_SIZE")]
    pub patch_size: u32,

    /// Print status messages at each step of the pipeline (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Function in test mode: segment and render the mask with row/column
    /// scale markers, skip patch selection entirely.
    #[arg(long, default_value_t = false)]
    pub test_mode: bool,

    // =========================================================================
    // Output
    // =========================================================================
    /// Output directory.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, env = "HISTO_OUTPUT")]
    pub output: PathBuf,

    /// Produce a thumbnail of the original image with the selected patches
    /// marked by a cross.
    #[arg(long, default_value_t = false)]
    pub save_tilecrossed_image: bool,

    /// Keep the image produced by the edge detector.
    #[arg(long, default_value_t = false)]
    pub save_edges: bool,

    /// Keep the mask with tissue segments.
    #[arg(long, default_value_t = false)]
    pub save_mask: bool,

    /// Save the produced patches of the full resolution image.
    #[arg(long, default_value_t = false)]
    pub save_patches: bool,

    // =========================================================================
    // Downsampling
    // =========================================================================
    /// Downsampling factor for the output thumbnail.
    #[arg(long, default_value_t = DEFAULT_DOWNSAMPLE)]
    pub output_downsample: u32,

    /// Downsampling factor for the mask computation.
    #[arg(long, default_value_t = DEFAULT_DOWNSAMPLE)]
    pub downsample_mask: u32,

    // =========================================================================
    // Segmentation
    // =========================================================================
    /// Four binary digits selecting the borders used to identify background,
    /// in the order left, bottom, right, top. Mutually exclusive with a
    /// non-zero --corners.
    #[arg(long, default_value = "1111")]
    pub borders: SelectorMask,

    /// Four binary digits selecting the corners used to identify background,
    /// in the order top-left, bottom-left, bottom-right, top-right. Mutually
    /// exclusive with a non-zero --borders.
    #[arg(long, default_value = "0000")]
    pub corners: SelectorMask,

    /// Threshold constant for the segmentation merge rule; lower values give
    /// finer segmentation, larger images require higher values.
    #[arg(long, default_value_t = DEFAULT_K_CONST)]
    pub k_const: u32,

    /// Minimum segment size enforced by post-processing; larger images
    /// require higher values.
    #[arg(long = "minimum-segmentsize", alias = "minimum_segmentsize", default_value_t = DEFAULT_MIN_SEGMENT_SIZE)]
    pub minimum_segmentsize: usize,

    /// Number of lines from the borders or corners of the segmented image
    /// sampled to identify background.
    #[arg(long, default_value_t = DEFAULT_WINDOW_LINES)]
    pub number_of_lines: u32,

    /// Gaussian smoothing parameter applied before edge detection.
    #[arg(long, default_value_t = DEFAULT_SIGMA)]
    pub sigma: f32,

    /// Minimum fraction of a patch that must be tissue for it to be
    /// selected, between 0 and 1.
    #[arg(long, default_value_t = DEFAULT_CONTENT_THRESHOLD)]
    pub content_threshold: f64,
}

impl Config {
    /// Validate the configuration eagerly, before any pipeline work.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.patch_size == 0 {
            return Err(PipelineError::invalid_parameter(
                "patch-size",
                "must be greater than 0, got 0",
            ));
        }
        if self.output_downsample == 0 {
            return Err(PipelineError::invalid_parameter(
                "output-downsample",
                "must be greater than 0, got 0",
            ));
        }
        if self.downsample_mask == 0 {
            return Err(PipelineError::invalid_parameter(
                "downsample-mask",
                "must be greater than 0, got 0",
            ));
        }
        if self.k_const == 0 {
            return Err(PipelineError::invalid_parameter(
                "k-const",
                "must be greater than 0, got 0",
            ));
        }
        if self.minimum_segmentsize == 0 {
            return Err(PipelineError::invalid_parameter(
                "minimum-segmentsize",
                "must be greater than 0, got 0",
            ));
        }
        if !(self.sigma > 0.0) {
            return Err(PipelineError::invalid_parameter(
                "sigma",
                format!("must be greater than 0, got {}", self.sigma),
            ));
        }
        if !(0.0..=1.0).contains(&self.content_threshold) {
            return Err(PipelineError::invalid_parameter(
                "content-threshold",
                format!("must be within [0, 1], got {}", self.content_threshold),
            ));
        }

        // Cross-field rule: border mode and corner mode are mutually
        // exclusive. Surfaces ConflictingSelectors.
        self.background_selector()?;

        Ok(())
    }

    /// The combined background selector for this run.
    pub fn background_selector(&self) -> Result<BackgroundSelector, PipelineError> {
        BackgroundSelector::from_masks(self.borders, self.corners)
    }

    /// File stem of the input slide, used to name output artifacts.
    pub fn slide_stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "slide".to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
