//! Camera for ray generation.
//!
//! The camera keeps an orthonormal basis and a cached view plane one unit in
//! front of the eye. Every setter validates its input and leaves the camera
//! untouched on error, so a bad configuration can never produce NaN rays.

use crate::Ray;
use lumen_math::{Vec2, Vec3};
use thiserror::Error;

/// Squared lengths below this are treated as zero when building the basis.
const DEGENERATE_LENGTH_SQUARED: f32 = 1e-12;

/// Errors that can occur while configuring a camera.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CameraError {
    #[error("Camera eye and target coincide")]
    ZeroViewDirection,

    #[error("Camera up vector is parallel to the view direction")]
    DegenerateUp,

    #[error("Field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),

    #[error("Aspect ratio must be positive and finite, got {0}")]
    InvalidAspectRatio(f32),
}

pub type CameraResult<T> = Result<T, CameraError>;

/// Pinhole camera mapping normalized viewport coordinates to world rays.
#[derive(Debug, Clone)]
pub struct Camera {
    fov: f32,          // Vertical field of view in degrees
    aspect_ratio: f32, // Width / height

    eye: Vec3,

    // Camera axis
    forward: Vec3,
    right: Vec3,
    up: Vec3,

    // View plane origin and spanning vectors (set by calculate_view_plane())
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Camera {
    /// Create a camera at the origin looking down -Z with +Y up.
    pub fn new(fov: f32, aspect_ratio: f32) -> CameraResult<Self> {
        validate_fov(fov)?;
        validate_aspect_ratio(aspect_ratio)?;

        let mut camera = Self {
            fov,
            aspect_ratio,
            eye: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            lower_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
        };
        camera.calculate_view_plane();
        Ok(camera)
    }

    /// Builder form of [`Camera::set_view`].
    pub fn with_view(mut self, eye: Vec3, target: Vec3, up: Vec3) -> CameraResult<Self> {
        self.set_view(eye, target, up)?;
        Ok(self)
    }

    /// Place the camera at `eye` looking toward `target`.
    ///
    /// `up` only needs to be roughly upward; the basis is re-orthogonalized.
    pub fn set_view(&mut self, eye: Vec3, target: Vec3, up: Vec3) -> CameraResult<()> {
        let view = target - eye;
        if !(view.length_squared() > DEGENERATE_LENGTH_SQUARED) {
            return Err(CameraError::ZeroViewDirection);
        }
        let forward = view.normalize();

        let side = forward.cross(up);
        if !(side.length_squared() > DEGENERATE_LENGTH_SQUARED) {
            return Err(CameraError::DegenerateUp);
        }
        let right = side.normalize();

        self.eye = eye;
        self.forward = forward;
        self.right = right;
        self.up = right.cross(forward);

        self.calculate_view_plane();
        Ok(())
    }

    /// Set the vertical field of view in degrees.
    pub fn set_fov(&mut self, fov: f32) -> CameraResult<()> {
        validate_fov(fov)?;
        self.fov = fov;
        self.calculate_view_plane();
        Ok(())
    }

    /// Set the viewport aspect ratio (width / height).
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) -> CameraResult<()> {
        validate_aspect_ratio(aspect_ratio)?;
        self.aspect_ratio = aspect_ratio;
        self.calculate_view_plane();
        Ok(())
    }

    /// Get the ray through normalized view-plane coordinate `uv`.
    ///
    /// (0, 0) is the lower-left corner, (1, 1) the upper-right. The direction
    /// is not normalized.
    pub fn get_ray(&self, uv: Vec2) -> Ray {
        let direction = self.lower_left + self.horizontal * uv.x + self.vertical * uv.y - self.eye;
        Ray::new(self.eye, direction)
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    fn calculate_view_plane(&mut self) {
        let theta = self.fov.to_radians();
        let half_height = (theta * 0.5).tan();
        let half_width = half_height * self.aspect_ratio;

        self.horizontal = self.right * (half_width * 2.0);
        self.vertical = self.up * (half_height * 2.0);
        self.lower_left = self.eye - self.horizontal * 0.5 - self.vertical * 0.5 + self.forward;
    }
}

fn validate_fov(fov: f32) -> CameraResult<()> {
    if fov > 0.0 && fov < 180.0 {
        Ok(())
    } else {
        Err(CameraError::InvalidFov(fov))
    }
}

fn validate_aspect_ratio(aspect_ratio: f32) -> CameraResult<()> {
    if aspect_ratio > 0.0 && aspect_ratio.is_finite() {
        Ok(())
    } else {
        Err(CameraError::InvalidAspectRatio(aspect_ratio))
    }
}
