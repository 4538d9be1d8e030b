//! Built-in demo scene, used when no scene file is given.

use crate::scene_file::{SceneSetup, ViewDesc};
use lumen_math::{Transform, Vec3};
use lumen_tracer::{
    Color, Dielectric, Lambertian, Material, Metal, Plane, RandomSource, Scene, Sphere,
};
use std::sync::Arc;

const SATELLITES: usize = 5;

/// A large red sphere at the origin, five unit spheres scattered through
/// `[-3, 3)^3` with random materials, and a ground plane under a sunset sky.
pub fn demo_scene(rng: &mut RandomSource) -> SceneSetup {
    let mut scene = Scene::new();
    scene.set_sky(Color::new(1.0, 0.4, 0.3), Color::new(0.1, 0.2, 0.8));

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    scene.add_object(Box::new(Plane::new(
        Transform::from_position(Vec3::new(0.0, -3.0, 0.0)),
        ground,
    )));

    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(1.0, 0.0, 0.0)));
    scene.add_object(Box::new(Sphere::at(Vec3::ZERO, 2.0, red)));

    for _ in 0..SATELLITES {
        let center = rng.uniform_vec3(Vec3::splat(-3.0), Vec3::splat(3.0));
        let material = random_material(rng);
        scene.add_object(Box::new(Sphere::at(center, 1.0, material)));
    }

    SceneSetup {
        scene,
        view: ViewDesc::default(),
    }
}

fn random_material(rng: &mut RandomSource) -> Arc<dyn Material> {
    let albedo = rng.uniform_vec3(Vec3::splat(0.2), Vec3::ONE);
    match rng.uniform_int(0, 2) {
        0 => Arc::new(Lambertian::new(albedo)),
        1 => Arc::new(Metal::new(albedo, rng.uniform_real(0.0, 0.5))),
        _ => Arc::new(Dielectric::new(Color::ONE, 1.5)),
    }
}
