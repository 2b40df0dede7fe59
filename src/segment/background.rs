//! Background classification from border and corner sampling.
//!
//! Tissue slides are scanned with the specimen surrounded by background, so
//! the regions touching the selected borders (or corners) of the segmented
//! raster are presumed non-tissue. The classifier samples a window of the
//! label raster along each active border or corner and collects every label
//! it sees into the background set; the tissue mask is the complement.
//!
//! Border mode and corner mode encode mutually exclusive assumptions about
//! where background lives, so at most one of the two may be active per run.
//! [`BackgroundSelector`] makes the conflicting state unrepresentable past
//! configuration validation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;
use crate::raster::LabelRaster;

// =============================================================================
// Selector masks
// =============================================================================

/// A four-digit binary selector string, e.g. `1010`.
///
/// Digit order follows the CLI contract: for borders `left, bottom, right,
/// top`; for corners `top-left, bottom-left, bottom-right, top-right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorMask([bool; 4]);

impl SelectorMask {
    /// The all-zero mask.
    pub const NONE: Self = Self([false; 4]);

    pub fn bits(&self) -> [bool; 4] {
        self.0
    }

    /// Whether any digit is set.
    pub fn any(&self) -> bool {
        self.0.iter().any(|&b| b)
    }
}

impl FromStr for SelectorMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 {
            return Err(format!(
                "expected a 4-digit binary string such as 1010, got {s:?}"
            ));
        }
        let mut bits = [false; 4];
        for (i, c) in s.chars().enumerate() {
            bits[i] = match c {
                '0' => false,
                '1' => true,
                other => {
                    return Err(format!(
                        "expected only digits 0 and 1, got {other:?} in {s:?}"
                    ))
                }
            };
        }
        Ok(Self(bits))
    }
}

impl fmt::Display for SelectorMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            write!(f, "{}", u8::from(bit))?;
        }
        Ok(())
    }
}

// =============================================================================
// Background selector
// =============================================================================

/// Where to look for background regions.
///
/// A tagged variant instead of two parallel bit strings: the "both selectors
/// non-empty" state cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundSelector {
    /// Sample strips along the selected image borders.
    Borders {
        left: bool,
        bottom: bool,
        right: bool,
        top: bool,
    },
    /// Sample squares at the selected image corners.
    Corners {
        top_left: bool,
        bottom_left: bool,
        bottom_right: bool,
        top_right: bool,
    },
    /// Sample nothing; the whole raster is treated as tissue.
    None,
}

impl BackgroundSelector {
    /// Combine the two CLI selector masks into a single selector.
    ///
    /// # Errors
    ///
    /// Returns `ConflictingSelectors` when both masks are non-zero.
    pub fn from_masks(
        borders: SelectorMask,
        corners: SelectorMask,
    ) -> Result<Self, PipelineError> {
        match (borders.any(), corners.any()) {
            (true, true) => Err(PipelineError::ConflictingSelectors {
                borders: borders.to_string(),
                corners: corners.to_string(),
            }),
            (true, false) => {
                let [left, bottom, right, top] = borders.bits();
                Ok(Self::Borders {
                    left,
                    bottom,
                    right,
                    top,
                })
            }
            (false, true) => {
                let [top_left, bottom_left, bottom_right, top_right] = corners.bits();
                Ok(Self::Corners {
                    top_left,
                    bottom_left,
                    bottom_right,
                    top_right,
                })
            }
            (false, false) => Ok(Self::None),
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Collect the labels found in the selected border strips or corner squares.
///
/// `window` is the strip width (borders) or square side (corners) in mask
/// pixels; windows larger than the raster clamp to its bounds. The returned
/// set is a deterministic function of its inputs and is always a subset of
/// the labels present in the sampled windows.
pub fn classify_background(
    labels: &LabelRaster,
    selector: &BackgroundSelector,
    window: u32,
) -> BTreeSet<u32> {
    let mut background = BTreeSet::new();
    let width = labels.width();
    let height = labels.height();
    if width == 0 || height == 0 || window == 0 {
        return background;
    }

    let nx = window.min(width);
    let ny = window.min(height);

    let sample = |background: &mut BTreeSet<u32>, x0: u32, y0: u32, x1: u32, y1: u32| {
        for y in y0..y1 {
            for x in x0..x1 {
                background.insert(labels.get(x, y));
            }
        }
    };

    match *selector {
        BackgroundSelector::Borders {
            left,
            bottom,
            right,
            top,
        } => {
            if left {
                sample(&mut background, 0, 0, nx, height);
            }
            if bottom {
                sample(&mut background, 0, height - ny, width, height);
            }
            if right {
                sample(&mut background, width - nx, 0, width, height);
            }
            if top {
                sample(&mut background, 0, 0, width, ny);
            }
        }
        BackgroundSelector::Corners {
            top_left,
            bottom_left,
            bottom_right,
            top_right,
        } => {
            if top_left {
                sample(&mut background, 0, 0, nx, ny);
            }
            if bottom_left {
                sample(&mut background, 0, height - ny, nx, height);
            }
            if bottom_right {
                sample(&mut background, width - nx, height - ny, width, height);
            }
            if top_right {
                sample(&mut background, width - nx, 0, width, ny);
            }
        }
        BackgroundSelector::None => {}
    }

    background
}

// =============================================================================
// Tests
// =============================================================================
