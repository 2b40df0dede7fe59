//! Persistence of pipeline artifacts to the output directory.
//!
//! All filesystem side effects of a run live here: artifact images, the
//! accepted full-resolution patches and the JSON patch report. Failures
//! carry the target path so a bad output location is diagnosable from the
//! error alone.

use std::fs;
use std::path::{Path, PathBuf};

use image::{EncodableLayout, ImageBuffer, Pixel, PixelWithColorType, RgbImage};
use serde::Serialize;

use crate::error::PipelineError;
use crate::patch::{PatchBox, PatchDescriptor};

/// Writes artifacts into the output directory, naming them after the input
/// slide's file stem.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
    stem: String,
}

/// Summary serialized alongside the per-patch records in `*_patches.json`.
#[derive(Debug, Serialize)]
struct PatchReport<'a> {
    slide: &'a str,
    patch_size: u32,
    content_threshold: f64,
    total: usize,
    accepted: usize,
    patches: &'a [PatchDescriptor],
}

impl OutputWriter {
    /// Create a writer rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Result<Self, PipelineError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| PipelineError::Output {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            dir,
            stem: stem.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{suffix}", self.stem))
    }

    /// Save an image artifact named `<stem>_<suffix>`.
    pub fn save_image<P>(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
        suffix: &str,
    ) -> Result<PathBuf, PipelineError>
    where
        P: Pixel + PixelWithColorType,
        [P::Subpixel]: EncodableLayout,
    {
        let path = self.artifact_path(suffix);
        image.save(&path).map_err(|e| PipelineError::Output {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }

    /// Save one accepted full-resolution patch, named by its grid cell.
    ///
    /// Patches land in a `<stem>_patches/` subdirectory (created on first
    /// use) so a large run does not flood the artifact directory.
    pub fn save_patch(&self, image: &RgbImage, bounds: &PatchBox) -> Result<PathBuf, PipelineError> {
        let patch_dir = self.dir.join(format!("{}_patches", self.stem));
        fs::create_dir_all(&patch_dir).map_err(|e| PipelineError::Output {
            path: patch_dir.clone(),
            message: e.to_string(),
        })?;

        let path = patch_dir.join(format!(
            "{}_c{:04}_r{:04}.png",
            self.stem, bounds.column, bounds.row
        ));
        image.save(&path).map_err(|e| PipelineError::Output {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }

    /// Write the JSON patch report for the run.
    pub fn write_report(
        &self,
        patches: &[PatchDescriptor],
        patch_size: u32,
        content_threshold: f64,
    ) -> Result<PathBuf, PipelineError> {
        let report = PatchReport {
            slide: &self.stem,
            patch_size,
            content_threshold,
            total: patches.len(),
            accepted: patches.iter().filter(|p| p.accepted).count(),
            patches,
        };

        let path = self.artifact_path("patches.json");
        let json = serde_json::to_string_pretty(&report).map_err(|e| PipelineError::Output {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| PipelineError::Output {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

// =============================================================================
// Tests
// =============================================================================
