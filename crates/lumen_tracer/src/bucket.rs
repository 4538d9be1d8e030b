//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon. Each bucket gets its own
//! [`RandomSource`], forked from the caller's source in bucket order, so a
//! seeded parallel render is reproducible no matter how rayon schedules it.

use crate::renderer::{log_report, render_pixel, write_pixel, CancelToken, RenderReport};
use crate::{Camera, Color, Framebuffer, RandomSource, RenderConfig, RenderError, Scene};
use lumen_math::Vec2;
use rayon::prelude::*;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    fn distance_squared_to(&self, point: Vec2) -> f32 {
        let center = Vec2::new(
            self.x as f32 + self.width as f32 * 0.5,
            self.y as f32 + self.height as f32 * 0.5,
        );
        center.distance_squared(point)
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Tile a `width` x `height` image into buckets of at most `bucket_size`
/// pixels per side, ordered center-out.
///
/// Edge buckets are clipped to the image. A `bucket_size` of 0 is treated as 1.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let step = size as usize;

    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(step)
        .flat_map(|y| {
            (0..width)
                .step_by(step)
                .map(move |x| Bucket::new(x, y, size.min(width - x), size.min(height - y), 0))
        })
        .collect();

    // Stable, so buckets at equal distance stay in row-major order
    let center = Vec2::new(width as f32, height as f32) * 0.5;
    buckets.sort_by(|a, b| {
        a.distance_squared_to(center)
            .total_cmp(&b.distance_squared_to(center))
    });

    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }
    buckets
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Linear pixel colors in row-major order; shorter than the bucket if cancelled
    pub pixels: Vec<Color>,
    /// Path statistics for this bucket
    pub report: RenderReport,
}

/// Render a single bucket to a vector of colors.
///
/// Stops between pixels once `cancel` is set.
pub fn render_bucket(
    bucket: &Bucket,
    scene: &Scene,
    camera: &Camera,
    image_size: (u32, u32),
    config: &RenderConfig,
    rng: &mut RandomSource,
    cancel: &CancelToken,
) -> BucketResult {
    let (width, height) = image_size;
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    let mut report = RenderReport::default();

    'rows: for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break 'rows;
            }
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let color = render_pixel(
                scene,
                camera,
                global_x,
                global_y,
                width,
                height,
                config,
                rng,
                &mut report.stats,
            );
            pixels.push(color);
        }
    }

    BucketResult {
        bucket: *bucket,
        pixels,
        report,
    }
}

/// Render the entire scene on rayon's thread pool.
///
/// Pixels are computed in parallel and then written to `framebuffer` on the
/// calling thread, so the framebuffer itself need not be thread safe.
pub fn render_parallel(
    scene: &Scene,
    camera: &Camera,
    framebuffer: &mut dyn Framebuffer,
    config: &RenderConfig,
    rng: &mut RandomSource,
    cancel: &CancelToken,
    bucket_size: u32,
) -> Result<RenderReport, RenderError> {
    config.validate()?;

    let width = framebuffer.width();
    let height = framebuffer.height();
    let bucket_size = bucket_size.max(1);
    let work: Vec<(Bucket, RandomSource)> = generate_buckets(width, height, bucket_size)
        .into_iter()
        .map(|bucket| (bucket, rng.fork()))
        .collect();

    log::debug!("Rendering {} buckets of up to {}px", work.len(), bucket_size);

    let results: Vec<BucketResult> = work
        .into_par_iter()
        .map(|(bucket, mut bucket_rng)| {
            render_bucket(
                &bucket,
                scene,
                camera,
                (width, height),
                config,
                &mut bucket_rng,
                cancel,
            )
        })
        .collect();

    let mut report = RenderReport::default();
    for result in &results {
        let bucket = result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let x = bucket.x + i as u32 % bucket.width;
            let y = bucket.y + i as u32 / bucket.width;
            write_pixel(framebuffer, x, y, *color, &mut report);
        }
        report.cancelled |= result.report.cancelled;
        report.stats.merge(&result.report.stats);
    }

    log_report(width, height, config, &report);
    Ok(report)
}
