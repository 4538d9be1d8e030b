//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use lumen_math::{Interval, Transform, Vec3};
use std::sync::Arc;

/// A sphere centered on its transform's position.
#[derive(Debug, Clone)]
pub struct Sphere {
    transform: Transform,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(transform: Transform, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            transform,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Create a sphere at `center` with an identity rotation.
    pub fn at(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Transform::from_position(center), radius, material)
    }

    pub fn center(&self) -> Vec3 {
        self.transform.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let center = self.center();
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        if a == 0.0 {
            return None;
        }
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let point = ray.at(root);
        Some(HitRecord {
            distance: root,
            point,
            normal: (point - center).normalize_or_zero(),
            material: self.material.as_ref(),
        })
    }
}
