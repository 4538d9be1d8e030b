//! Scene container and the recursive trace algorithm.

use crate::{
    hittable::{closest_hit, HitRecord, Hittable},
    renderer::{self, RenderConfig, RenderError, RenderReport},
    Camera, Color, Framebuffer, RandomSource, Ray,
};
use lumen_math::Interval;

/// How a traced path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEnd {
    /// The path escaped and picked up the sky gradient.
    Sky,
    /// A material absorbed the path; its emission is the terminal color.
    Absorbed,
    /// The bounce budget ran out before the path terminated.
    DepthExhausted,
}

/// Counts of path terminations gathered during a render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub sky: u64,
    pub absorbed: u64,
    pub depth_exhausted: u64,
}

impl TraceStats {
    /// Tally one finished path.
    pub fn record(&mut self, end: PathEnd) {
        match end {
            PathEnd::Sky => self.sky += 1,
            PathEnd::Absorbed => self.absorbed += 1,
            PathEnd::DepthExhausted => self.depth_exhausted += 1,
        }
    }

    /// Total number of paths recorded.
    pub fn paths(&self) -> u64 {
        self.sky + self.absorbed + self.depth_exhausted
    }

    /// Add another set of counts into this one.
    pub fn merge(&mut self, other: &TraceStats) {
        self.sky += other.sky;
        self.absorbed += other.absorbed;
        self.depth_exhausted += other.depth_exhausted;
    }
}

/// A list of primitives lit by a two-color sky.
///
/// Primitives are added at setup time and never removed; during a render the
/// scene is only read.
pub struct Scene {
    objects: Vec<Box<dyn Hittable>>,
    sky_bottom: Color,
    sky_top: Color,
}

impl Scene {
    /// Create an empty scene with a white-to-blue sky.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            sky_bottom: Color::ONE,
            sky_top: Color::new(0.5, 0.7, 1.0),
        }
    }

    /// Add an object to the scene.
    pub fn add_object(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Set the colors seen by rays pointing straight down and straight up.
    pub fn set_sky(&mut self, bottom: Color, top: Color) {
        self.sky_bottom = bottom;
        self.sky_top = top;
    }

    pub fn sky(&self) -> (Color, Color) {
        (self.sky_bottom, self.sky_top)
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Background color for a ray that hit nothing.
    ///
    /// Depends only on the ray's direction, never its origin.
    pub fn sky_color(&self, ray: &Ray) -> Color {
        let unit_direction = ray.direction().normalize();
        let t = (unit_direction.y + 1.0) * 0.5;
        self.sky_bottom.lerp(self.sky_top, t)
    }

    /// Compute the color carried back along `ray`.
    pub fn trace(
        &self,
        ray: &Ray,
        min_distance: f32,
        max_distance: f32,
        depth: u32,
        rng: &mut RandomSource,
    ) -> Color {
        self.trace_path(ray, Interval::new(min_distance, max_distance), depth, rng)
            .0
    }

    /// Compute the color carried back along `ray` and report how the path ended.
    ///
    /// Each bounce multiplies the material attenuation into the light returned
    /// by the next bounce.
    pub fn trace_path(
        &self,
        ray: &Ray,
        ray_t: Interval,
        depth: u32,
        rng: &mut RandomSource,
    ) -> (Color, PathEnd) {
        if depth == 0 {
            return (Color::ZERO, PathEnd::DepthExhausted);
        }

        let Some(rec) = self.hit(ray, ray_t) else {
            return (self.sky_color(ray), PathEnd::Sky);
        };

        match rec.material.scatter(ray, &rec, rng) {
            Some(result) => {
                let (incoming, end) = self.trace_path(&result.scattered, ray_t, depth - 1, rng);
                (result.attenuation * incoming, end)
            }
            None => (rec.material.emitted(), PathEnd::Absorbed),
        }
    }

    /// Render every pixel of `framebuffer` sequentially.
    ///
    /// See [`crate::render`] for a cancellable variant.
    pub fn render(
        &self,
        framebuffer: &mut dyn Framebuffer,
        camera: &Camera,
        config: &RenderConfig,
        rng: &mut RandomSource,
    ) -> Result<RenderReport, RenderError> {
        renderer::render(self, camera, framebuffer, config, rng, &renderer::CancelToken::new())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        closest_hit(&self.objects, ray, ray_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dielectric, Emissive, Lambertian, Material, Metal, Plane, Sphere};
    use lumen_math::{Transform, Vec3};
    use std::sync::Arc;

    fn emitter(color: Color) -> Arc<dyn Material> {
        Arc::new(Emissive::new(color, 1.0))
    }

    #[test]
    fn test_depth_zero_is_black() {
        let mut scene = Scene::new();
        scene.add_object(Box::new(Sphere::at(Vec3::ZERO, 1.0, emitter(Color::ONE))));
        let mut rng = RandomSource::seeded(1);

        for direction in [Vec3::NEG_Z, Vec3::Y, Vec3::new(0.3, -0.8, 0.1)] {
            let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), direction);
            assert_eq!(scene.trace(&ray, 0.001, 100.0, 0, &mut rng), Color::ZERO);
            assert_eq!(
                scene.trace_path(&ray, Interval::new(0.001, 100.0), 0, &mut rng).1,
                PathEnd::DepthExhausted
            );
        }
    }

    #[test]
    fn test_miss_returns_sky_gradient() {
        let mut scene = Scene::new();
        scene.set_sky(Color::new(1.0, 0.0, 0.0), Color::new(0.0, 0.0, 1.0));
        let mut rng = RandomSource::seeded(1);

        let up = Ray::new(Vec3::ZERO, Vec3::Y);
        let down = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        let level = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(scene.trace(&up, 0.001, 100.0, 5, &mut rng), Color::new(0.0, 0.0, 1.0));
        assert_eq!(scene.trace(&down, 0.001, 100.0, 5, &mut rng), Color::new(1.0, 0.0, 0.0));
        assert_eq!(scene.trace(&level, 0.001, 100.0, 5, &mut rng), Color::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn test_sky_ignores_origin() {
        let scene = Scene::new();
        let a = Ray::new(Vec3::ZERO, Vec3::new(0.2, 0.5, -1.0));
        let b = Ray::new(Vec3::new(100.0, -40.0, 7.0), Vec3::new(0.4, 1.0, -2.0));
        assert!((scene.sky_color(&a) - scene.sky_color(&b)).length() < 1e-6);
    }

    #[test]
    fn test_nearest_hit_regardless_of_order() {
        let near = Color::new(1.0, 0.0, 0.0);
        let far = Color::new(0.0, 1.0, 0.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);

        for near_first in [true, false] {
            let near_sphere = Sphere::at(Vec3::new(0.0, 0.0, 1.0), 1.5, emitter(near));
            let far_sphere = Sphere::at(Vec3::new(0.0, 0.0, -1.0), 1.5, emitter(far));

            let mut scene = Scene::new();
            if near_first {
                scene.add_object(Box::new(near_sphere));
                scene.add_object(Box::new(far_sphere));
            } else {
                scene.add_object(Box::new(far_sphere));
                scene.add_object(Box::new(near_sphere));
            }

            let mut rng = RandomSource::seeded(2);
            assert_eq!(scene.trace(&ray, 0.001, 100.0, 5, &mut rng), near);

            let rec = scene.hit(&ray, Interval::new(0.001, 100.0)).unwrap();
            assert!((rec.distance - 7.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_equal_distance_keeps_first_inserted() {
        let first = Color::new(0.2, 0.4, 0.6);
        let second = Color::new(0.9, 0.9, 0.9);
        let mut scene = Scene::new();
        scene.add_object(Box::new(Sphere::at(Vec3::ZERO, 1.0, emitter(first))));
        scene.add_object(Box::new(Sphere::at(Vec3::ZERO, 1.0, emitter(second))));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let mut rng = RandomSource::seeded(3);
        assert_eq!(scene.trace(&ray, 0.001, 100.0, 5, &mut rng), first);
    }

    #[test]
    fn test_attenuation_compounds_per_bounce() {
        // Mirror floor under a uniform sky: one bounce, then sky
        let mut scene = Scene::new();
        scene.set_sky(Color::ONE, Color::ONE);
        scene.add_object(Box::new(Plane::new(
            Transform::default(),
            Arc::new(Metal::new(Color::new(0.5, 0.25, 1.0), 0.0)),
        )));

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = RandomSource::seeded(4);
        let (color, end) = scene.trace_path(&ray, Interval::new(0.001, 100.0), 5, &mut rng);
        assert_eq!(end, PathEnd::Sky);
        assert!((color - Color::new(0.5, 0.25, 1.0)).length() < 1e-6);

        // Only one bounce allowed: the reflected ray runs out of depth
        let (color, end) = scene.trace_path(&ray, Interval::new(0.001, 100.0), 1, &mut rng);
        assert_eq!(end, PathEnd::DepthExhausted);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_colors_are_finite_and_non_negative() {
        let mut scene = Scene::new();
        let glass: Arc<dyn Material> = Arc::new(Dielectric::new(Color::new(0.95, 1.0, 0.95), 1.5));
        scene.add_object(Box::new(Plane::new(
            Transform::from_position(Vec3::new(0.0, -1.0, 0.0)),
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        )));
        scene.add_object(Box::new(Sphere::at(Vec3::ZERO, 1.0, glass.clone())));
        scene.add_object(Box::new(Sphere::at(Vec3::new(2.0, 0.0, 0.0), 0.7, glass)));
        scene.add_object(Box::new(Sphere::at(
            Vec3::new(-2.0, 0.0, 0.0),
            0.8,
            Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.4)),
        )));
        scene.add_object(Box::new(Sphere::at(
            Vec3::new(0.0, 3.0, 0.0),
            0.5,
            Arc::new(Emissive::new(Color::ONE, 8.0)),
        )));

        let mut rng = RandomSource::seeded(5);
        for depth in 0..8 {
            for _ in 0..200 {
                let origin = rng.uniform_vec3(Vec3::splat(-4.0), Vec3::splat(4.0));
                let direction = rng.on_unit_sphere();
                let color = scene.trace(&Ray::new(origin, direction), 0.001, 100.0, depth, &mut rng);
                assert!(color.is_finite(), "{color:?}");
                assert!(color.cmpge(Color::ZERO).all(), "{color:?}");
            }
        }
    }

    #[test]
    fn test_stats_record_and_merge() {
        let mut a = TraceStats::default();
        a.record(PathEnd::Sky);
        a.record(PathEnd::Sky);
        a.record(PathEnd::DepthExhausted);

        let mut b = TraceStats::default();
        b.record(PathEnd::Absorbed);
        b.merge(&a);

        assert_eq!(b.paths(), 4);
        assert_eq!(b.sky, 2);
        assert_eq!(b.absorbed, 1);
        assert_eq!(b.depth_exhausted, 1);
    }
}
