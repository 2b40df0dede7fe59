//! Rendering of pipeline artifacts as images.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::patch::PatchDescriptor;
use crate::raster::{GrayRaster, LabelRaster, ResolutionMap, TissueMask};

/// Color used for scale markers and patch crosses.
const MARKER_COLOR: Rgb<u8> = Rgb([40, 40, 230]);

/// Deterministic display color for a region label.
///
/// Uses a splitmix-style hash so neighboring labels get visually distinct
/// colors and repeated runs render identically.
fn label_color(label: u32) -> Rgb<u8> {
    let mut h = u64::from(label).wrapping_add(0x9E37_79B9_7F4A_7C15);
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    // Keep channels away from pure black so regions stay visible.
    Rgb([
        64 + (h & 0xBF) as u8,
        64 + ((h >> 8) & 0xBF) as u8,
        64 + ((h >> 16) & 0xBF) as u8,
    ])
}

/// Render a label raster with one deterministic color per region.
pub fn render_label_raster(labels: &LabelRaster) -> RgbImage {
    RgbImage::from_fn(labels.width(), labels.height(), |x, y| {
        label_color(labels.get(x, y))
    })
}

/// Render a tissue mask as a binary image: white tissue, black background.
pub fn render_tissue_mask(mask: &TissueMask) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.is_tissue(x, y) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Render an edge raster: edge pixels white, everything else black.
pub fn render_edges(edges: &GrayRaster) -> GrayImage {
    GrayImage::from_fn(edges.width(), edges.height(), |x, y| {
        Luma([(edges.get(x, y).clamp(0.0, 1.0) * 255.0) as u8])
    })
}

/// Draw row/column scale markers used by test mode.
///
/// Draws grid lines every `spacing_x`/`spacing_y` pixels so the rendered
/// mask shows where patch rows and columns will fall, letting the user judge
/// whether tissue and background separate cleanly before a full run.
pub fn draw_scale_markers(image: &mut RgbImage, spacing_x: u32, spacing_y: u32) {
    let (width, height) = image.dimensions();
    if spacing_x == 0 || spacing_y == 0 || width == 0 || height == 0 {
        return;
    }

    let mut x = spacing_x;
    while x < width {
        draw_line_segment_mut(
            image,
            (x as f32, 0.0),
            (x as f32, (height - 1) as f32),
            MARKER_COLOR,
        );
        x += spacing_x;
    }
    let mut y = spacing_y;
    while y < height {
        draw_line_segment_mut(
            image,
            (0.0, y as f32),
            ((width - 1) as f32, y as f32),
            MARKER_COLOR,
        );
        y += spacing_y;
    }
}

/// Mark accepted patches on a thumbnail with crosses.
///
/// `thumb_map` maps full-resolution coordinates onto the thumbnail, which may
/// use a different downsample factor than the mask.
pub fn render_tilecrossed(
    thumbnail: &mut RgbImage,
    patches: &[PatchDescriptor],
    thumb_map: ResolutionMap,
) {
    for patch in patches.iter().filter(|p| p.accepted) {
        let b = patch.bounds;
        let (x0, y0, x1, y1) = thumb_map.map_region(b.x, b.y, b.width, b.height);
        if x1 <= x0 || y1 <= y0 {
            continue;
        }
        let (x0, y0) = (x0 as f32, y0 as f32);
        let (x1, y1) = ((x1 - 1) as f32, (y1 - 1) as f32);
        draw_line_segment_mut(thumbnail, (x0, y0), (x1, y1), MARKER_COLOR);
        draw_line_segment_mut(thumbnail, (x0, y1), (x1, y0), MARKER_COLOR);
    }
}

// =============================================================================
// Tests
// =============================================================================
