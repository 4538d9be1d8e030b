//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray};
use lumen_math::{Interval, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub distance: f32,
    /// Point of intersection, `ray.at(distance)`
    pub point: Vec3,
    /// Unit outward surface normal. Not flipped for rays hitting the inside.
    pub normal: Vec3,
    /// Material of the primitive that was hit
    pub material: &'a dyn Material,
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("distance", &self.distance)
            .field("point", &self.point)
            .field("normal", &self.normal)
            .finish_non_exhaustive()
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object strictly inside `ray_t`.
    ///
    /// Returns the hit record for the closest valid intersection, or `None`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        (**self).hit(ray, ray_t)
    }
}

/// Find the closest hit among `objects`.
///
/// The search window's upper bound shrinks to each accepted hit, so a later
/// object only replaces the current record when it is strictly closer. Equal
/// distances keep the object that comes first.
pub fn closest_hit<'a, H: Hittable>(
    objects: &'a [H],
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let mut closest: Option<HitRecord<'a>> = None;
    let mut closest_so_far = ray_t.max;

    for object in objects {
        if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
            closest_so_far = rec.distance;
            closest = Some(rec);
        }
    }

    closest
}
