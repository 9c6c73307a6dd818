//! Model-space to screen-space projection.
//!
//! The pipeline is fixed so every host draws the same picture:
//!
//! ```text
//! yaw (around y):    x' = x·cos(yaw) − z·sin(yaw)     z' = x·sin(yaw) + z·cos(yaw)
//! pitch (around x):  y'' = y·cos(pitch) − z'·sin(pitch) z'' = y·sin(pitch) + z'·cos(pitch)
//! perspective:       sx = x'·d/(d + z'')·scale + cx    sy = y''·d/(d + z'')·scale + cy
//! ```

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::view::RotationState;

/// Smallest magnitude allowed for the perspective denominator `d + z''`.
///
/// Points whose denominator falls below this are projected as if it were
/// exactly this value, which keeps screen coordinates finite.
pub const MIN_PERSPECTIVE_DENOMINATOR: f64 = 1e-3;

/// Screen area and projection constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
    /// Model-to-screen scale factor
    pub scale: f64,
    /// Perspective distance in model units
    pub perspective: f64,
}

impl Viewport {
    /// Returns the screen center, where the model origin lands.
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A projected point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    /// Rotated depth (z'') before perspective division
    pub depth: f64,
}

/// Projects a model-space position onto the screen.
pub fn project(position: &Point3<f64>, rotation: &RotationState, viewport: &Viewport) -> ScreenPoint {
    let (sin_yaw, cos_yaw) = rotation.yaw().to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = rotation.pitch().to_radians().sin_cos();

    // Yaw around the vertical axis
    let x1 = position.x * cos_yaw - position.z * sin_yaw;
    let z1 = position.x * sin_yaw + position.z * cos_yaw;
    let y1 = position.y;

    // Pitch around the horizontal axis
    let y2 = y1 * cos_pitch - z1 * sin_pitch;
    let z2 = y1 * sin_pitch + z1 * cos_pitch;

    let mut denominator = viewport.perspective + z2;
    if denominator.abs() < MIN_PERSPECTIVE_DENOMINATOR {
        tracing::trace!(depth = z2, "clamping degenerate perspective denominator");
        denominator = MIN_PERSPECTIVE_DENOMINATOR;
    }
    let factor = viewport.perspective / denominator;

    let center = viewport.center();
    ScreenPoint {
        x: x1 * factor * viewport.scale + center.x,
        y: y2 * factor * viewport.scale + center.y,
        depth: z2,
    }
}
