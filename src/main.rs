//! histo-segment - tissue segmentation and patch extraction for whole slide
//! images.
//!
//! This binary parses the CLI, opens the slide and runs the pipeline.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use histo_segment::{Config, ImageFileSlide, Pipeline};

fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    // Validate configuration before touching the slide.
    if let Err(e) = config.validate() {
        error!("configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("input: {}", config.input.display());
    info!("output directory: {}", config.output.display());
    info!(
        "patch size: {}, content threshold: {}",
        config.patch_size, config.content_threshold
    );
    info!(
        "segmentation: k = {}, minimum segment size = {}, sigma = {}",
        config.k_const, config.minimum_segmentsize, config.sigma
    );
    if config.test_mode {
        info!("running in test mode: patch selection is skipped");
    }

    let slide = match ImageFileSlide::open(&config.input) {
        Ok(slide) => slide,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match Pipeline::new(config, slide).run() {
        Ok(summary) => {
            info!(
                "done: {} regions, {} background label(s), {}/{} patches accepted",
                summary.region_count,
                summary.background_labels,
                summary.accepted_patches,
                summary.total_patches
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("pipeline failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "histo_segment=debug"
    } else {
        "histo_segment=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
