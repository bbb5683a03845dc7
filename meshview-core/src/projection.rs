/// Viewport and projection utilities
use nalgebra::Matrix4;

use crate::transform::Transform;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Window-sized viewport. Neither side is ever zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Build a viewport, clamping zero sides to one so the aspect ratio
    /// stays finite and non-zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Widest vertical field of view a portrait viewport can widen to.
pub const MAX_FOV_DEGREES: f32 = 179.0;

/// Camera lens: perspective or orthographic, looking down -Z from a fixed
/// distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub mode: ProjectionMode,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance the perspective eye is pulled back from the origin.
    pub eye_distance: f32,
    /// Half-height of the orthographic view volume.
    pub ortho_half_extent: f32,
    pub ortho_depth: f32,
}

impl Projection {
    pub fn perspective(eye_distance: f32) -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            eye_distance,
            ortho_half_extent: 1.5,
            ortho_depth: 100.0,
        }
    }

    /// Projection matrix for `viewport`, in OpenGL clip conventions.
    ///
    /// Portrait viewports widen the vertical field of view (perspective) or
    /// the vertical extent (orthographic) so the object keeps its size
    /// horizontally.
    pub fn matrix(&self, viewport: Viewport) -> Matrix4<f32> {
        let aspect = viewport.aspect();
        match self.mode {
            ProjectionMode::Perspective => {
                // Very tall viewports stop widening short of a straight angle.
                let fov = if aspect >= 1.0 {
                    self.fov_degrees
                } else {
                    (self.fov_degrees * viewport.height as f32 / viewport.width as f32)
                        .min(MAX_FOV_DEGREES)
                };
                Matrix4::new_perspective(aspect, fov.to_radians(), self.near, self.far)
                    * Transform::translation(0.0, 0.0, -self.eye_distance)
            }
            ProjectionMode::Orthographic => {
                let e = self.ortho_half_extent;
                let (half_w, half_h) = if aspect >= 1.0 {
                    (e * aspect, e)
                } else {
                    (e, e / aspect)
                };
                Matrix4::new_orthographic(
                    -half_w,
                    half_w,
                    -half_h,
                    half_h,
                    -self.ortho_depth,
                    self.ortho_depth,
                )
            }
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(4.0)
    }
}
