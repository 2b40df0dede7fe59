//! Pipeline orchestration.
//!
//! Wires the stages together in their documented order:
//!
//! ```text
//! slide ──▶ downsample ──▶ edges ──▶ segmentation ──▶ background ──▶ mask
//!   │                                                                 │
//!   │                 (test mode stops here and renders the mask)     │
//!   │                                                                 ▼
//!   └────────── full-resolution patch reads ◀────────── patch selection
//! ```
//!
//! The pipeline is synchronous: each stage fully consumes its input before
//! the next begins, except patch extraction, which streams one grid cell at
//! a time so full-resolution pixels are paged per tile. Parameter validation
//! runs before any slide I/O. The slide handle is owned by the pipeline and
//! released when it drops, on every exit path.
//!
//! Long runs can be interrupted cooperatively through a [`CancelToken`],
//! checked between segmentation passes and between tiles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::PipelineError;
use crate::output::{
    draw_scale_markers, render_edges, render_label_raster, render_tilecrossed,
    render_tissue_mask, OutputWriter,
};
use crate::patch::{score_patches, PatchDescriptor, PatchGrid};
use crate::raster::{LabelRaster, ResolutionMap, TissueMask};
use crate::segment::{classify_background, detect_edges, segment_regions};
use crate::slide::SlideReader;

// =============================================================================
// Cancellation
// =============================================================================

/// Cooperative cancellation flag shared with the pipeline.
///
/// Cancelling does not interrupt the stage currently running; the pipeline
/// checks the token between stages and between tiles and aborts with
/// [`PipelineError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the run sharing this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Run summary
// =============================================================================

/// Counters describing a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Full-resolution slide dimensions
    pub slide_dimensions: (u32, u32),
    /// Dimensions of the segmented mask raster
    pub mask_dimensions: (u32, u32),
    /// Number of regions produced by segmentation
    pub region_count: u32,
    /// Number of region labels classified as background
    pub background_labels: usize,
    /// Total grid cells scored (0 in test mode)
    pub total_patches: usize,
    /// Cells accepted by the content threshold (0 in test mode)
    pub accepted_patches: usize,
}

// =============================================================================
// Pipeline
// =============================================================================

/// The segmentation-and-selection pipeline over a slide.
pub struct Pipeline<S: SlideReader> {
    config: Config,
    slide: S,
    cancel: CancelToken,
}

impl<S: SlideReader> Pipeline<S> {
    /// Create a pipeline owning the given slide handle.
    pub fn new(config: Config, slide: S) -> Self {
        Self {
            config,
            slide,
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally shared cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Consume the pipeline and hand back the slide, releasing nothing else.
    pub fn into_slide(self) -> S {
        self.slide
    }

    fn check_cancelled(&self) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run the pipeline to completion.
    ///
    /// Validates the configuration eagerly, segments the downsampled slide,
    /// classifies background, then either renders the test-mode mask or
    /// scores (and optionally persists) the full patch grid.
    pub fn run(&self) -> Result<PipelineSummary, PipelineError> {
        self.config.validate()?;
        let selector = self.config.background_selector()?;

        let (full_width, full_height) = self.slide.dimensions();
        info!(
            "slide is {}x{} at full resolution",
            full_width, full_height
        );

        // Segmentation works on the downsampled raster.
        let raster = self
            .slide
            .read_downsampled(self.config.downsample_mask)?;
        debug!(
            "downsampled by {} to {}x{}",
            self.config.downsample_mask,
            raster.width(),
            raster.height()
        );

        let edges = detect_edges(&raster, self.config.sigma)?;
        self.check_cancelled()?;

        let labels = segment_regions(
            &edges,
            self.config.k_const as f32,
            self.config.minimum_segmentsize,
        )?;
        info!("segmentation produced {} regions", labels.label_count());
        self.check_cancelled()?;

        let background = classify_background(&labels, &selector, self.config.number_of_lines);
        let mask = TissueMask::from_background(&labels, &background);
        debug!("{} region(s) classified as background", background.len());

        let writer = OutputWriter::new(&self.config.output, self.config.slide_stem())?;

        if self.config.save_edges {
            let path = writer.save_image(&render_edges(&edges), "edges.png")?;
            info!("saved edge map to {}", path.display());
        }

        let mut summary = PipelineSummary {
            slide_dimensions: (full_width, full_height),
            mask_dimensions: (mask.width(), mask.height()),
            region_count: labels.label_count(),
            background_labels: background.len(),
            total_patches: 0,
            accepted_patches: 0,
        };

        if self.config.test_mode {
            self.run_test_mode(&labels, &mask, &writer)?;
            return Ok(summary);
        }

        let (total, accepted) = self.run_patch_selection(&mask, &writer)?;
        summary.total_patches = total;
        summary.accepted_patches = accepted;
        Ok(summary)
    }

    /// Test mode: render the segmented raster with scale markers and stop.
    ///
    /// Patch selection is never invoked; the markers show where patch rows
    /// and columns will fall so segmentation parameters can be tuned.
    fn run_test_mode(
        &self,
        labels: &LabelRaster,
        mask: &TissueMask,
        writer: &OutputWriter,
    ) -> Result<(), PipelineError> {
        let mut segmented = render_label_raster(labels);
        let spacing = (self.config.patch_size / self.config.downsample_mask).max(1);
        draw_scale_markers(&mut segmented, spacing, spacing);
        let path = writer.save_image(&segmented, "segmented.png")?;
        info!("test mode: saved segmented image to {}", path.display());

        if self.config.save_mask {
            let path = writer.save_image(&render_tissue_mask(mask), "mask.png")?;
            info!("saved tissue mask to {}", path.display());
        }
        Ok(())
    }

    /// Score the full patch grid and persist the requested artifacts.
    fn run_patch_selection(
        &self,
        mask: &TissueMask,
        writer: &OutputWriter,
    ) -> Result<(usize, usize), PipelineError> {
        let (full_width, full_height) = self.slide.dimensions();
        let map = ResolutionMap::new(full_width, full_height, mask.width(), mask.height());
        let grid = PatchGrid::new(full_width, full_height, self.config.patch_size)?;

        let mut patches: Vec<PatchDescriptor> = Vec::with_capacity(grid.len());
        for patch in score_patches(grid, mask, map, self.config.content_threshold)? {
            self.check_cancelled()?;
            patches.push(patch);
        }
        let accepted = patches.iter().filter(|p| p.accepted).count();
        info!("selected {} of {} patches", accepted, patches.len());

        if self.config.save_patches {
            self.save_accepted_patches(&patches, writer)?;
        }

        if self.config.save_tilecrossed_image {
            let mut thumbnail = self.slide.read_thumbnail(self.config.output_downsample)?;
            let thumb_map = ResolutionMap::new(
                full_width,
                full_height,
                thumbnail.width(),
                thumbnail.height(),
            );
            render_tilecrossed(&mut thumbnail, &patches, thumb_map);
            let path = writer.save_image(&thumbnail, "tilecrossed.png")?;
            info!("saved tile-crossed thumbnail to {}", path.display());
        }

        if self.config.save_mask {
            let path = writer.save_image(&render_tissue_mask(mask), "mask.png")?;
            info!("saved tissue mask to {}", path.display());
        }

        let report = writer.write_report(
            &patches,
            self.config.patch_size,
            self.config.content_threshold,
        )?;
        debug!("wrote patch report to {}", report.display());

        Ok((patches.len(), accepted))
    }

    /// Read and persist every accepted patch at full resolution.
    ///
    /// Reads are paged one tile at a time; a failed read aborts the run with
    /// the failing grid cell in the error.
    fn save_accepted_patches(
        &self,
        patches: &[PatchDescriptor],
        writer: &OutputWriter,
    ) -> Result<(), PipelineError> {
        let mut saved = 0usize;
        for patch in patches.iter().filter(|p| p.accepted) {
            self.check_cancelled()?;
            let b = patch.bounds;
            let region = self
                .slide
                .read_region(b.x, b.y, b.width, b.height)
                .map_err(|source| PipelineError::PatchRead {
                    column: b.column,
                    row: b.row,
                    x: b.x,
                    y: b.y,
                    source: Box::new(source),
                })?;
            writer.save_patch(&region, &b)?;
            saved += 1;
        }
        info!("saved {} patch image(s)", saved);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
