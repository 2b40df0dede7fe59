//! Canny edge detection.
//!
//! Sharpens region boundaries before graph segmentation: Gaussian smoothing
//! controlled by sigma, Sobel gradients, non-maximum suppression along the
//! gradient direction, then double-threshold hysteresis. The thresholds are
//! relative to the peak gradient magnitude, so the detector adapts to the
//! slide's contrast.
//!
//! This is a pure function of the input raster and sigma; the output raster
//! has identical dimensions and carries edge pixels as 1.0 and everything
//! else as 0.0.

use crate::error::PipelineError;
use crate::raster::GrayRaster;

/// Strong-edge threshold as a fraction of the peak gradient magnitude.
const HIGH_THRESHOLD_RATIO: f32 = 0.2;

/// Weak-edge threshold as a fraction of the peak gradient magnitude.
const LOW_THRESHOLD_RATIO: f32 = 0.1;

/// Detect edges in a grayscale raster.
///
/// # Errors
///
/// Returns `InvalidInput` for a zero-area raster and `InvalidParameter` for a
/// non-positive sigma.
pub fn detect_edges(raster: &GrayRaster, sigma: f32) -> Result<GrayRaster, PipelineError> {
    if raster.is_empty() {
        return Err(PipelineError::invalid_input(
            "edge detection requires a raster with non-zero area",
        ));
    }
    if !(sigma > 0.0) {
        return Err(PipelineError::invalid_parameter(
            "sigma",
            format!("must be greater than 0, got {sigma}"),
        ));
    }

    let width = raster.width() as usize;
    let height = raster.height() as usize;

    let blurred = gaussian_blur(raster.pixels(), width, height, sigma);
    let (magnitude, direction) = sobel_gradients(&blurred, width, height);
    let suppressed = non_maximum_suppression(&magnitude, &direction, width, height);
    let edges = hysteresis(&suppressed, width, height);

    let mut out = GrayRaster::new(raster.width(), raster.height(), raster.downsample());
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            if edges[y as usize * width + x as usize] {
                out.set(x, y, 1.0);
            }
        }
    }
    Ok(out)
}

/// Normalized 1D Gaussian kernel for the given sigma.
///
/// The kernel spans three standard deviations on each side.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(1.0) as usize;
    let mut kernel = Vec::with_capacity(2 * radius + 1);
    let denom = 2.0 * sigma * sigma;
    for i in 0..=2 * radius {
        let d = i as f32 - radius as f32;
        kernel.push((-d * d / denom).exp());
    }
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur with borders clamped to the nearest pixel.
fn gaussian_blur(pixels: &[f32], width: usize, height: usize, sigma: f32) -> Vec<f32> {
    let kernel = gaussian_kernel(sigma);
    let radius = kernel.len() / 2;

    // Horizontal pass.
    let mut horizontal = vec![0.0f32; pixels.len()];
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut acc = 0.0;
            for (i, &w) in kernel.iter().enumerate() {
                let sx = (x + i).saturating_sub(radius).min(width - 1);
                acc += w * pixels[row + sx];
            }
            horizontal[row + x] = acc;
        }
    }

    // Vertical pass.
    let mut out = vec![0.0f32; pixels.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (i, &w) in kernel.iter().enumerate() {
                let sy = (y + i).saturating_sub(radius).min(height - 1);
                acc += w * horizontal[sy * width + x];
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// Sobel gradient magnitude and direction.
///
/// The one-pixel border is left at zero magnitude; direction is the gradient
/// angle quantized later by non-maximum suppression.
fn sobel_gradients(pixels: &[f32], width: usize, height: usize) -> (Vec<f32>, Vec<f32>) {
    let mut magnitude = vec![0.0f32; pixels.len()];
    let mut direction = vec![0.0f32; pixels.len()];
    if width < 3 || height < 3 {
        return (magnitude, direction);
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let p00 = pixels[(y - 1) * width + x - 1];
            let p10 = pixels[(y - 1) * width + x];
            let p20 = pixels[(y - 1) * width + x + 1];
            let p01 = pixels[y * width + x - 1];
            let p21 = pixels[y * width + x + 1];
            let p02 = pixels[(y + 1) * width + x - 1];
            let p12 = pixels[(y + 1) * width + x];
            let p22 = pixels[(y + 1) * width + x + 1];

            let gx = -p00 + p20 - 2.0 * p01 + 2.0 * p21 - p02 + p22;
            let gy = -p00 - 2.0 * p10 - p20 + p02 + 2.0 * p12 + p22;

            let idx = y * width + x;
            magnitude[idx] = gx.hypot(gy);
            direction[idx] = gy.atan2(gx);
        }
    }
    (magnitude, direction)
}

/// Thin edges to local gradient-direction maxima.
fn non_maximum_suppression(
    magnitude: &[f32],
    direction: &[f32],
    width: usize,
    height: usize,
) -> Vec<f32> {
    let mut out = vec![0.0f32; magnitude.len()];
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = y * width + x;
            let mag = magnitude[idx];
            if mag == 0.0 {
                continue;
            }

            // Quantize the gradient angle into one of four neighbor axes.
            let angle = direction[idx].to_degrees();
            let angle = if angle < 0.0 { angle + 180.0 } else { angle };
            let (n1, n2) = if !(22.5..157.5).contains(&angle) {
                // Horizontal gradient: compare east/west.
                (magnitude[idx - 1], magnitude[idx + 1])
            } else if angle < 67.5 {
                // Diagonal: northeast/southwest.
                (magnitude[(y - 1) * width + x + 1], magnitude[(y + 1) * width + x - 1])
            } else if angle < 112.5 {
                // Vertical gradient: compare north/south.
                (magnitude[(y - 1) * width + x], magnitude[(y + 1) * width + x])
            } else {
                // Diagonal: northwest/southeast.
                (magnitude[(y - 1) * width + x - 1], magnitude[(y + 1) * width + x + 1])
            };

            if mag >= n1 && mag >= n2 {
                out[idx] = mag;
            }
        }
    }
    out
}

/// Double-threshold hysteresis: strong pixels seed edges, weak pixels join
/// only when 8-connected to an edge.
fn hysteresis(magnitude: &[f32], width: usize, height: usize) -> Vec<bool> {
    let mut edges = vec![false; magnitude.len()];
    let peak = magnitude.iter().fold(0.0f32, |a, &b| a.max(b));
    if peak <= 0.0 {
        return edges;
    }

    let high = peak * HIGH_THRESHOLD_RATIO;
    let low = peak * LOW_THRESHOLD_RATIO;

    let mut stack: Vec<usize> = Vec::new();
    for (idx, &mag) in magnitude.iter().enumerate() {
        if mag >= high && !edges[idx] {
            edges[idx] = true;
            stack.push(idx);
            while let Some(current) = stack.pop() {
                let cx = current % width;
                let cy = current / width;
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = cx as i64 + dx;
                        let ny = cy as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                            continue;
                        }
                        let nidx = ny as usize * width + nx as usize;
                        if !edges[nidx] && magnitude[nidx] >= low {
                            edges[nidx] = true;
                            stack.push(nidx);
                        }
                    }
                }
            }
        }
    }
    edges
}

// =============================================================================
// Tests
// =============================================================================
