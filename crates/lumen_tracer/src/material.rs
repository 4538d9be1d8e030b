//! Material trait for surface scattering.

use crate::{hittable::HitRecord, Color, RandomSource, Ray};
use lumen_math::Vec3;

/// Outgoing ray and color filter produced by a scattering event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// Per-channel multiplier applied to the light carried back along `scattered`
    pub attenuation: Color,
    /// The ray leaving the surface
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync + std::fmt::Debug {
    /// Scatter an incoming ray.
    ///
    /// Returns `Some` if the ray scatters, or `None` if the ray is absorbed, in
    /// which case [`Material::emitted`] is the terminal color of the path.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut RandomSource,
    ) -> Option<ScatterResult>;

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self) -> Color {
        Color::ZERO
    }

    /// Base surface color, in linear RGB.
    fn albedo(&self) -> Color;
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut RandomSource,
    ) -> Option<ScatterResult> {
        // Scatter in a random direction on the hemisphere around the normal
        let mut scatter_direction = rec.normal + rng.on_unit_sphere();

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.point, scatter_direction.normalize()),
        })
    }

    fn albedo(&self) -> Color {
        self.albedo
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut RandomSource,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = (reflected + self.fuzz * rng.on_unit_sphere()).normalize_or_zero();

        // Perturbed below the surface: the ray is absorbed rather than resampled
        if direction.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.point, direction),
            })
        } else {
            None
        }
    }

    fn albedo(&self) -> Color {
        self.albedo
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    albedo: Color,
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `albedo`: Tint applied to both reflected and transmitted light
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond), at least 1.0
    pub fn new(albedo: Color, ior: f32) -> Self {
        Self {
            albedo,
            ior: ior.max(1.0),
        }
    }

    pub fn refractive_index(&self) -> f32 {
        self.ior
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut RandomSource,
    ) -> Option<ScatterResult> {
        let unit_direction = ray_in.direction().normalize();
        let d_dot_n = unit_direction.dot(rec.normal);

        let (outward_normal, refraction_ratio, cosine) = if d_dot_n < 0.0 {
            // Entering the surface
            (rec.normal, 1.0 / self.ior, -d_dot_n)
        } else {
            // Exiting the surface
            (-rec.normal, self.ior, (self.ior * d_dot_n).min(1.0))
        };

        let reflected = reflect(unit_direction, rec.normal);
        let direction = match refract(unit_direction, outward_normal, refraction_ratio) {
            Some(refracted) if rng.real() >= reflectance(cosine, self.ior) => refracted,
            // Total internal reflection, or the Fresnel draw chose reflection
            _ => reflected,
        };

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.point, direction),
        })
    }

    fn albedo(&self) -> Color {
        self.albedo
    }
}

/// Light emitter. Terminates every path that reaches it.
#[derive(Debug, Clone)]
pub struct Emissive {
    albedo: Color,
    intensity: f32,
}

impl Emissive {
    /// Create a new emitter; the emitted color is `albedo * intensity`.
    pub fn new(albedo: Color, intensity: f32) -> Self {
        Self { albedo, intensity }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }
}

impl Material for Emissive {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord<'_>,
        _rng: &mut RandomSource,
    ) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self) -> Color {
        self.albedo * self.intensity
    }

    fn albedo(&self) -> Color {
        self.albedo
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with unit normal `n`.
///
/// `eta` is the ratio of refractive indices (incident over transmitted).
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = n.dot(uv);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(eta * uv - (eta * cos_i + k.sqrt()) * n)
}

/// Schlick's approximation for reflectance
#[inline]
pub fn reflectance(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
