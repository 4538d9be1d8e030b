//! Linear color type and conversion to display-encoded RGBA8.
//!
//! The tracer works in linear RGB with unbounded channels. Conversion to
//! display space happens only when a pixel is handed to a framebuffer.

use lumen_math::{Interval, Vec3, Vec4};

/// Color type alias (linear RGB, channels may exceed 1.0 before tone mapping)
pub type Color = Vec3;

/// Linear RGB plus a linear alpha in [0, 1].
pub type Color4 = Vec4;

/// 8-bit display-encoded RGBA.
pub type Rgba = [u8; 4];

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Encode one linear channel as an 8-bit display value.
#[inline]
fn encode_channel(linear: f32) -> u8 {
    (255.0 * Interval::UNIT.clamp(linear_to_gamma(linear))) as u8
}

/// Convert an opaque linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> Rgba {
    [
        encode_channel(color.x),
        encode_channel(color.y),
        encode_channel(color.z),
        255,
    ]
}

/// Convert a linear color with alpha to 8-bit RGBA.
///
/// Alpha is not gamma encoded.
pub fn color4_to_rgba(color: Color4) -> Rgba {
    [
        encode_channel(color.x),
        encode_channel(color.y),
        encode_channel(color.z),
        (255.0 * Interval::UNIT.clamp(color.w)) as u8,
    ]
}
