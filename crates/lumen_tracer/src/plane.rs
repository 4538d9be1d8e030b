//! Infinite plane primitive.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use lumen_math::{Interval, Transform, Vec3};
use std::sync::Arc;

/// An infinite plane through `transform.position` with normal `transform.up()`.
///
/// The plane is one-sided in the sense that its normal is never flipped; rays
/// from below receive the same normal as rays from above.
#[derive(Debug, Clone)]
pub struct Plane {
    transform: Transform,
    material: Arc<dyn Material>,
}

impl Plane {
    pub fn new(transform: Transform, material: Arc<dyn Material>) -> Self {
        Self { transform, material }
    }

    pub fn point(&self) -> Vec3 {
        self.transform.position
    }

    pub fn normal(&self) -> Vec3 {
        self.transform.up().normalize_or_zero()
    }
}

/// Solve for the ray parameter where `ray` meets the plane through `point`
/// with normal `normal`.
///
/// Returns `None` when the ray is parallel to the plane or when the solution
/// falls outside the open interval `ray_t`.
pub fn intersect_plane(ray: &Ray, point: Vec3, normal: Vec3, ray_t: Interval) -> Option<f32> {
    let denominator = ray.direction().dot(normal);
    if denominator.abs() < f32::EPSILON {
        return None;
    }

    let t = (point - ray.origin()).dot(normal) / denominator;
    ray_t.surrounds(t).then_some(t)
}

impl Hittable for Plane {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let normal = self.normal();
        let t = intersect_plane(ray, self.point(), normal, ray_t)?;

        Some(HitRecord {
            distance: t,
            point: ray.at(t),
            normal,
            material: self.material.as_ref(),
        })
    }
}
