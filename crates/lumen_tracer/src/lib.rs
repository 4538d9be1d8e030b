//! Lumen tracer - CPU Path Tracing
//!
//! A small Monte Carlo path tracer: spheres and planes, four materials
//! (diffuse, metal, glass, emissive), a two-color gradient sky and a pinhole
//! camera. Pixels leave the tracer through the [`Framebuffer`] trait so any
//! display or image backend can receive them.
//!
//! Randomness is always passed explicitly as a [`RandomSource`]; a seeded
//! source makes every render, including the parallel bucket renderer,
//! reproducible.

mod bucket;
mod camera;
mod color;
mod framebuffer;
mod hittable;
mod material;
mod plane;
mod random;
mod renderer;
mod scene;
mod sphere;

pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use camera::{Camera, CameraError, CameraResult};
pub use color::{color4_to_rgba, color_to_rgba, linear_to_gamma, Color, Color4, Rgba};
pub use framebuffer::{Framebuffer, FramebufferError, PixelBuffer};
pub use hittable::{closest_hit, HitRecord, Hittable};
pub use material::{
    reflect, reflectance, refract, Dielectric, Emissive, Lambertian, Material, Metal,
    ScatterResult,
};
pub use plane::{intersect_plane, Plane};
pub use random::RandomSource;
pub use renderer::{render, render_pixel, CancelToken, RenderConfig, RenderError, RenderReport};
pub use scene::{PathEnd, Scene, TraceStats};
pub use sphere::Sphere;

/// Re-export common math types from lumen_math
pub use lumen_math::{Interval, Quat, Ray, Transform, Vec2, Vec3, Vec4};
