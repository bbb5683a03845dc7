/// Seam between the scene and whatever draws it.
///
/// The commands mirror a fixed-function pipeline: viewport and projection
/// setup, one directional light, and triangle-list draws of the uploaded mesh
/// with a model matrix and either lit or flat shading.
use nalgebra::{Matrix4, Vector3};

use crate::geometry::Mesh;
use crate::projection::Viewport;

/// Surface response for lit draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

/// How a draw call colours its fragments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Lighting enabled with the given material.
    Lit(Material),
    /// Lighting disabled; every fragment gets this colour.
    Flat([f32; 3]),
}

/// Directional light, direction given in eye space (pointing towards the light).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Vector3<f32>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vector3::z(),
        }
    }
}

/// One submission of the uploaded triangle list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub model: Matrix4<f32>,
    pub shading: Shading,
    pub depth_test: bool,
    pub vertex_count: usize,
}

/// Rendering backend the scene issues its commands to.
pub trait RenderBackend {
    /// Upload the interleaved position/normal stream. Called once after load.
    fn upload_mesh(&mut self, mesh: &Mesh);

    fn set_viewport(&mut self, viewport: Viewport);

    fn set_projection(&mut self, projection: &Matrix4<f32>);

    fn set_light(&mut self, light: &Light);

    /// Start a frame by clearing colour and depth.
    fn begin_frame(&mut self, clear_color: [f32; 4]);

    fn draw(&mut self, call: &DrawCall);
}
