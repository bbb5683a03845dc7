/// Scene appearance and the per-frame render passes.
use nalgebra::{Matrix4, Point3};

use crate::backend::{DrawCall, Light, Material, RenderBackend, Shading};
use crate::geometry::Mesh;
use crate::transform::Transform;

pub const RED: [f32; 4] = [0.8, 0.1, 0.1, 1.0];
pub const GREEN: [f32; 4] = [0.1, 0.8, 0.5, 1.0];
pub const BLUE: [f32; 4] = [0.1, 0.5, 0.8, 1.0];
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Which colour the colour keys edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Background,
    Object,
}

impl ColorTarget {
    pub fn toggled(self) -> Self {
        match self {
            ColorTarget::Background => ColorTarget::Object,
            ColorTarget::Object => ColorTarget::Background,
        }
    }
}

fn clamp_color(color: [f32; 4]) -> [f32; 4] {
    color.map(|c| c.clamp(0.0, 1.0))
}

/// Keyboard-editable look of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    background: [f32; 4],
    object: [f32; 4],
    pub light: Point3<f32>,
    pub shadow_color: [f32; 3],
    pub shadow: bool,
    pub target: ColorTarget,
}

impl Appearance {
    pub fn new(background: [f32; 4], object: [f32; 4]) -> Self {
        Self {
            background: clamp_color(background),
            object: clamp_color(object),
            light: Point3::new(2400.0, 3000.0, 2400.0),
            shadow_color: [0.3, 0.3, 0.3],
            shadow: false,
            target: ColorTarget::Background,
        }
    }

    pub fn background(&self) -> [f32; 4] {
        self.background
    }

    pub fn object(&self) -> [f32; 4] {
        self.object
    }

    /// Set the colour currently selected by [`Appearance::target`].
    pub fn set_target_color(&mut self, color: [f32; 4]) {
        let color = clamp_color(color);
        match self.target {
            ColorTarget::Background => self.background = color,
            ColorTarget::Object => self.object = color,
        }
    }

    pub fn toggle_target(&mut self) {
        self.target = self.target.toggled();
    }

    pub fn toggle_shadow(&mut self) {
        self.shadow = !self.shadow;
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self::new(WHITE, BLUE)
    }
}

/// Everything needed to draw the loaded mesh each frame.
#[derive(Debug, Clone)]
pub struct Scene {
    vertex_count: usize,
    center: Point3<f32>,
    floor_y: f32,
    pub appearance: Appearance,
    pub specular: [f32; 4],
    pub shininess: f32,
    pub light: Light,
}

impl Scene {
    pub fn new(mesh: &Mesh, appearance: Appearance) -> Self {
        Self {
            vertex_count: mesh.vertex_count(),
            center: mesh.bbox.center(),
            floor_y: mesh.bbox.min.y,
            appearance,
            specular: [0.8, 0.8, 0.8, 0.5],
            shininess: 8.0,
            light: Light::default(),
        }
    }

    pub fn center(&self) -> &Point3<f32> {
        &self.center
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn material(&self) -> Material {
        Material {
            diffuse: self.appearance.object(),
            specular: self.specular,
            shininess: self.shininess,
        }
    }

    /// Projection of the object onto the plane below it, away from the light.
    pub fn shadow_matrix(&self) -> Matrix4<f32> {
        Transform::shadow_projection(&self.appearance.light, self.floor_y)
    }

    /// Issue one frame: clear, the optional shadow pass, then the lit pass.
    /// Presenting the frame is left to the caller.
    pub fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B, model: &Matrix4<f32>, shadow: bool) {
        backend.set_light(&self.light);
        backend.begin_frame(self.appearance.background());
        if shadow {
            self.shadow_pass(backend, model);
        }
        self.main_pass(backend, model);
    }

    fn shadow_pass<B: RenderBackend + ?Sized>(&self, backend: &mut B, model: &Matrix4<f32>) {
        backend.draw(&DrawCall {
            model: self.shadow_matrix() * model,
            shading: Shading::Flat(self.appearance.shadow_color),
            depth_test: false,
            vertex_count: self.vertex_count,
        });
    }

    fn main_pass<B: RenderBackend + ?Sized>(&self, backend: &mut B, model: &Matrix4<f32>) {
        backend.draw(&DrawCall {
            model: *model,
            shading: Shading::Lit(self.material()),
            depth_test: true,
            vertex_count: self.vertex_count,
        });
    }
}
