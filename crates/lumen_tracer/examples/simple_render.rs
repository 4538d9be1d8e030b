//! Simple path tracer example.
//!
//! Renders a field of spheres on all cores and saves to PPM format.

use lumen_tracer::{
    render_parallel, Camera, CancelToken, Color, Dielectric, Framebuffer, Lambertian, Material,
    Metal, PixelBuffer, Plane, RandomSource, RenderConfig, Scene, Sphere, Transform, Vec3,
    DEFAULT_BUCKET_SIZE,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lumen Path Tracer - Simple Example");
    println!("==================================");

    let mut rng = RandomSource::seeded(2024);

    // Build the scene
    let start = std::time::Instant::now();
    let scene = build_scene(&mut rng);
    println!("Scene built in {:?} ({} objects)", start.elapsed(), scene.len());

    // Set up camera
    let (width, height) = (800, 450);
    let camera = Camera::new(20.0, width as f32 / height as f32)?.with_view(
        Vec3::new(13.0, 2.0, 3.0), // look_from
        Vec3::new(0.0, 0.0, 0.0),  // look_at
        Vec3::new(0.0, 1.0, 0.0),  // vup
    )?;

    // Render configuration
    let config = RenderConfig {
        samples_per_pixel: 50,
        max_depth: 10,
        ..Default::default()
    };

    println!(
        "Rendering {}x{} @ {} spp...",
        width, height, config.samples_per_pixel
    );

    // Render
    let mut image = PixelBuffer::new(width, height);
    let start = std::time::Instant::now();
    let report = render_parallel(
        &scene,
        &camera,
        &mut image,
        &config,
        &mut rng,
        &CancelToken::new(),
        DEFAULT_BUCKET_SIZE,
    )?;
    println!(
        "Rendered in {:?} ({} paths, {} hit the depth limit)",
        start.elapsed(),
        report.stats.paths(),
        report.stats.depth_exhausted
    );

    // Save as PPM
    let filename = "output.ppm";
    save_ppm(&image, filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene(rng: &mut RandomSource) -> Scene {
    let mut scene = Scene::new();

    // Ground
    scene.add_object(Box::new(Plane::new(
        Transform::default(),
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
    )));

    // Three main spheres
    scene.add_object(Box::new(Sphere::at(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(Color::ONE, 1.5)),
    )));
    scene.add_object(Box::new(Sphere::at(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    scene.add_object(Box::new(Sphere::at(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    // Small random spheres; every glass marble shares one material
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(Color::ONE, 1.5));
    for a in -5..5 {
        for b in -5..5 {
            let center = Vec3::new(a as f32 + 0.9 * rng.real(), 0.2, b as f32 + 0.9 * rng.real());
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat = rng.real();
            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                // Diffuse
                let albedo = rng.uniform_vec3(Vec3::ZERO, Vec3::ONE)
                    * rng.uniform_vec3(Vec3::ZERO, Vec3::ONE);
                Arc::new(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = rng.uniform_vec3(Vec3::splat(0.5), Vec3::ONE);
                Arc::new(Metal::new(albedo, rng.uniform_real(0.0, 0.5)))
            } else {
                Arc::clone(&glass)
            };
            scene.add_object(Box::new(Sphere::at(center, 0.2, material)));
        }
    }

    scene
}

fn save_ppm(image: &PixelBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width(), image.height())?;
    writeln!(writer, "255")?;

    for rgba in image.pixels() {
        writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
    }

    Ok(())
}
