use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the image access adapter when reading slide data.
#[derive(Debug, Error)]
pub enum SlideError {
    /// The slide file could not be opened or decoded
    #[error("failed to open slide {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A region read fell outside the slide bounds
    #[error(
        "region out of bounds: requested {width}x{height} at ({x}, {y}), slide is {slide_width}x{slide_height}"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        slide_width: u32,
        slide_height: u32,
    },

    /// A downsample factor of zero was requested
    #[error("downsample factor must be at least 1")]
    ZeroDownsample,
}

/// Errors raised by the segmentation and patch extraction pipeline.
///
/// Parameter validation happens eagerly before any segmentation work begins,
/// so `InvalidParameter` and `ConflictingSelectors` are surfaced without
/// touching the slide. Per-tile read failures abort the whole run rather than
/// silently skipping a tile, since a missing tile would corrupt the
/// deterministic output sequence.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or empty raster/image input
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Out-of-range numeric parameter
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    /// Both border and corner selectors are non-empty; the two modes encode
    /// mutually exclusive background-location assumptions
    #[error(
        "conflicting selectors: --borders ({borders}) and --corners ({corners}) cannot both be non-zero"
    )]
    ConflictingSelectors { borders: String, corners: String },

    /// Slide read failure
    #[error("slide error: {0}")]
    Slide(#[from] SlideError),

    /// A full-resolution patch read failed during extraction
    #[error(
        "failed to read patch at column {column}, row {row} (pixel origin ({x}, {y})): {source}"
    )]
    PatchRead {
        column: u32,
        row: u32,
        x: u32,
        y: u32,
        #[source]
        source: Box<SlideError>,
    },

    /// An output artifact could not be written
    #[error("failed to write {}: {message}", path.display())]
    Output { path: PathBuf, message: String },

    /// The run was cancelled cooperatively
    #[error("pipeline run cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Shorthand for an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
