use anyhow::{Context, Result};
use clap::Parser;
use lumen_tracer::{
    render, render_parallel, CancelToken, Framebuffer, PixelBuffer, RandomSource, RenderConfig,
    DEFAULT_BUCKET_SIZE,
};
use std::path::Path;
use std::time::Instant;

mod cli;
mod demo;
mod scene_file;

use cli::Args;
use scene_file::SceneFile;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Lumen");

    let mut rng = match args.seed {
        Some(seed) => {
            log::info!("Using seed {}", seed);
            RandomSource::seeded(seed)
        }
        None => RandomSource::from_entropy(),
    };

    let setup = match &args.scene {
        Some(path) => {
            log::info!("Loading scene {}", path.display());
            SceneFile::load(path)?.build()?
        }
        None => demo::demo_scene(&mut rng),
    };

    anyhow::ensure!(
        args.width > 0 && args.height > 0,
        "Image size must be non-zero, got {}x{}",
        args.width,
        args.height
    );
    let aspect_ratio = args.width as f32 / args.height as f32;
    let camera = setup.view.build_camera(aspect_ratio)?;

    let config = RenderConfig {
        samples_per_pixel: args.samples,
        max_depth: args.depth,
        ..Default::default()
    };
    config.validate().context("Invalid render settings")?;

    let passes = args.pass_count();
    let mut framebuffer = PixelBuffer::new(args.width, args.height);
    let cancel = CancelToken::new();

    log::info!(
        "Rendering {} objects at {}x{}, {} spp, depth {}, {} pass(es){}",
        setup.scene.len(),
        args.width,
        args.height,
        config.samples_per_pixel,
        config.max_depth,
        passes,
        if args.parallel { ", parallel" } else { "" }
    );

    for pass in 1..=passes {
        framebuffer.clear([0, 0, 0, 255]);

        let start = Instant::now();
        let report = if args.parallel {
            render_parallel(
                &setup.scene,
                &camera,
                &mut framebuffer,
                &config,
                &mut rng,
                &cancel,
                DEFAULT_BUCKET_SIZE,
            )?
        } else {
            render(&setup.scene, &camera, &mut framebuffer, &config, &mut rng, &cancel)?
        };

        log::info!(
            "Pass {} rendered in {:.2?}: {} paths ({} sky, {} absorbed, {} depth-exhausted)",
            pass,
            start.elapsed(),
            report.stats.paths(),
            report.stats.sky,
            report.stats.absorbed,
            report.stats.depth_exhausted
        );
    }

    save_png(&framebuffer, &args.output)?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}

fn save_png(framebuffer: &PixelBuffer, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(
        framebuffer.width(),
        framebuffer.height(),
        framebuffer.as_bytes().to_vec(),
    )
    .context("Framebuffer size does not match its pixel data")?;

    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
