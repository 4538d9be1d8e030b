//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Anti-aliasing via jittered multi-sampling
//! - Depth-limited recursion (see [`Scene::trace_path`])
//! - Gamma correction at the framebuffer boundary
//! - Cancellation between pixels

use crate::{
    color::color_to_rgba, framebuffer::Framebuffer, Camera, Color, RandomSource, Scene, TraceStats,
};
use lumen_math::{Interval, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that prevent a render from starting.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum RenderError {
    #[error("Samples per pixel must be at least 1")]
    NoSamples,

    #[error("Invalid ray distance range ({min}, {max})")]
    InvalidDistanceRange { min: f32, max: f32 },
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Closest accepted hit distance; keeps bounced rays off their own surface
    pub min_distance: f32,
    /// Farthest accepted hit distance
    pub max_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 10,
            max_depth: 5,
            min_distance: 0.001,
            max_distance: 100.0,
        }
    }
}

impl RenderConfig {
    /// Check the configuration before a render pass.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.samples_per_pixel == 0 {
            return Err(RenderError::NoSamples);
        }
        if !(self.min_distance >= 0.0 && self.min_distance < self.max_distance) {
            return Err(RenderError::InvalidDistanceRange {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        Ok(())
    }

    /// The hit window used for every traced ray.
    pub fn ray_interval(&self) -> Interval {
        Interval::new(self.min_distance, self.max_distance)
    }
}

/// Shared flag used to stop an in-flight render between pixels.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that renders observing this token stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Clear the flag so the token can be reused for the next pass.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }
}

/// Summary of one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Pixels accepted by the framebuffer
    pub pixels_written: u64,
    /// Pixels the framebuffer refused (out of bounds)
    pub pixels_rejected: u64,
    /// Whether the pass stopped early
    pub cancelled: bool,
    /// How the traced paths ended
    pub stats: TraceStats,
}

impl RenderReport {
    /// Fold the counts of another partial report into this one.
    pub fn merge(&mut self, other: &RenderReport) {
        self.pixels_written += other.pixels_written;
        self.pixels_rejected += other.pixels_rejected;
        self.cancelled |= other.cancelled;
        self.stats.merge(&other.stats);
    }
}

/// Render a single pixel with multi-sampling.
///
/// Each sample jitters the pixel by a fresh `[0, 1)^2` offset before mapping
/// to view-plane coordinates, with `v = 0` on the bottom row. The result is
/// the mean of all samples in linear color.
#[allow(clippy::too_many_arguments)]
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    config: &RenderConfig,
    rng: &mut RandomSource,
    stats: &mut TraceStats,
) -> Color {
    let size = Vec2::new(width as f32, height as f32);
    let ray_t = config.ray_interval();
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let jitter = Vec2::new(rng.real(), rng.real());
        let mut uv = (Vec2::new(x as f32, y as f32) + jitter) / size;
        // Flip so the bottom row is v = 0
        uv.y = 1.0 - uv.y;

        let ray = camera.get_ray(uv);
        let (color, end) = scene.trace_path(&ray, ray_t, config.max_depth, rng);
        stats.record(end);
        pixel_color += color;
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Hand one finished pixel to the framebuffer, logging and counting rejects.
pub(crate) fn write_pixel(
    framebuffer: &mut dyn Framebuffer,
    x: u32,
    y: u32,
    color: Color,
    report: &mut RenderReport,
) {
    match framebuffer.draw_point(x as i32, y as i32, color_to_rgba(color)) {
        Ok(()) => report.pixels_written += 1,
        Err(e) => {
            log::warn!("{}", e);
            report.pixels_rejected += 1;
        }
    }
}

/// Render the entire scene into `framebuffer`, one pixel at a time.
///
/// This is the single-threaded reference loop. `cancel` is checked before
/// every pixel; a cancelled pass returns early with `cancelled` set.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    framebuffer: &mut dyn Framebuffer,
    config: &RenderConfig,
    rng: &mut RandomSource,
    cancel: &CancelToken,
) -> Result<RenderReport, RenderError> {
    config.validate()?;

    let width = framebuffer.width();
    let height = framebuffer.height();
    let mut report = RenderReport::default();

    'rows: for y in 0..height {
        for x in 0..width {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break 'rows;
            }
            let color =
                render_pixel(scene, camera, x, y, width, height, config, rng, &mut report.stats);
            write_pixel(framebuffer, x, y, color, &mut report);
        }
    }

    log_report(width, height, config, &report);
    Ok(report)
}

pub(crate) fn log_report(width: u32, height: u32, config: &RenderConfig, report: &RenderReport) {
    if report.cancelled {
        log::info!(
            "Render cancelled after {} of {} pixels",
            report.pixels_written + report.pixels_rejected,
            width as u64 * height as u64
        );
    }
    log::debug!(
        "Rendered {}x{} @ {} spp: {} paths ({} sky, {} absorbed, {} depth-exhausted), {} pixels rejected",
        width,
        height,
        config.samples_per_pixel,
        report.stats.paths(),
        report.stats.sky,
        report.stats.absorbed,
        report.stats.depth_exhausted,
        report.pixels_rejected
    );
}
