//! Patch selection scenarios against hand-built label rasters and masks.
//!
//! These pin the selection geometry exactly, independent of edge detection:
//! the mask is constructed directly instead of segmented from pixels.

use histo_segment::{
    classify_background, score_patches, BackgroundSelector, LabelRaster, PatchGrid,
    ResolutionMap, SelectorMask, TissueMask,
};

/// Mask-level rendition of the 1024x1024 slide holding a 200x200 tissue
/// square centered at (400, 400): at a mask downsample of 16, the square
/// covers mask pixels `[19, 31) x [19, 31)`.
fn centered_square_mask() -> TissueMask {
    TissueMask::from_raw(
        64,
        64,
        (0..64u32 * 64)
            .map(|i| {
                let (x, y) = (i % 64, i / 64);
                (19..31).contains(&x) && (19..31).contains(&y)
            })
            .collect(),
    )
}

#[test]
fn test_centered_square_rejected_at_half_threshold() {
    let mask = centered_square_mask();
    let grid = PatchGrid::new(1024, 1024, 512).unwrap();
    let map = ResolutionMap::new(1024, 1024, 64, 64);

    let patches: Vec<_> = score_patches(grid, &mask, map, 0.5).unwrap().collect();
    assert_eq!(patches.len(), 4);
    // The square fills ~14% of its tile: below a 0.5 threshold everywhere.
    assert_eq!(patches.iter().filter(|p| p.accepted).count(), 0);

    // The square sits entirely inside the top-left tile.
    assert!(patches[0].content_ratio > 0.13 && patches[0].content_ratio < 0.15);
    assert!(patches[1..].iter().all(|p| p.content_ratio == 0.0));
}

#[test]
fn test_centered_square_accepted_at_tenth_threshold() {
    let mask = centered_square_mask();
    let grid = PatchGrid::new(1024, 1024, 512).unwrap();
    let map = ResolutionMap::new(1024, 1024, 64, 64);

    let accepted: Vec<_> = score_patches(grid, &mask, map, 0.1)
        .unwrap()
        .filter(|p| p.accepted)
        .map(|p| (p.bounds.column, p.bounds.row))
        .collect();
    assert_eq!(accepted, vec![(0, 0)]);
}

#[test]
fn test_classifier_to_selector_chain() {
    // Two-region raster: top half is region 0, bottom half region 1.
    let labels = LabelRaster::from_raw(
        64,
        64,
        2,
        (0..64u32 * 64).map(|i| u32::from(i / 64 >= 32)).collect(),
    );

    // Sample only the top border; region 0 becomes background.
    let selector = BackgroundSelector::from_masks(
        "0001".parse::<SelectorMask>().unwrap(),
        SelectorMask::NONE,
    )
    .unwrap();
    let background = classify_background(&labels, &selector, 4);
    assert_eq!(background, [0].into_iter().collect());

    let mask = TissueMask::from_background(&labels, &background);
    let grid = PatchGrid::new(1024, 1024, 512).unwrap();
    let map = ResolutionMap::new(1024, 1024, 64, 64);

    let patches: Vec<_> = score_patches(grid, &mask, map, 0.5).unwrap().collect();
    let accepted: Vec<_> = patches
        .iter()
        .filter(|p| p.accepted)
        .map(|p| (p.bounds.column, p.bounds.row))
        .collect();

    // Exactly the bottom row of tiles is tissue.
    assert_eq!(accepted, vec![(0, 1), (1, 1)]);
    assert!(patches
        .iter()
        .all(|p| p.content_ratio == 0.0 || p.content_ratio == 1.0));
}
