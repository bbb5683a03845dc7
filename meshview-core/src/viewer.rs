/// Interaction dispatch: the owned viewer contexts that window events are
/// routed to.
///
/// A viewer owns its camera, scene and projection. The window layer converts
/// native events into [`InputEvent`]s, feeds them to [`Viewer::handle`], and
/// asks the viewer to render into a [`RenderBackend`] whenever a frame is due.
use log::debug;
use nalgebra::{Matrix4, Vector3};

use crate::arcball::ArcballCamera;
use crate::backend::RenderBackend;
use crate::geometry::Mesh;
use crate::input::{Action, InputEvent, Key};
use crate::projection::{Projection, ProjectionMode, Viewport};
use crate::scene::{Appearance, Scene, BLACK, BLUE, GREEN, RED, WHITE};
use crate::transform::Transform;

/// Angle passed to the camera for one X/Y/Z key step (a sixteenth turn).
pub const KEY_STEP: f32 = std::f32::consts::TAU / 16.0;
/// Rotation per W/A/S/D press in the bunny viewer, in degrees.
pub const BUNNY_STEP_DEGREES: f32 = 10.0;

/// An interactive viewer driven by input events.
pub trait Viewer {
    fn handle(&mut self, event: &InputEvent);

    fn viewport(&self) -> Viewport;

    /// Issue the commands for one frame.
    fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B);

    fn should_exit(&self) -> bool;
}

/// Generic mesh viewer: arcball camera, colour keys, projection switch and
/// planar shadow.
#[derive(Debug, Clone)]
pub struct ModelViewer {
    scene: Scene,
    camera: ArcballCamera,
    projection: Projection,
    cursor: (f32, f32),
    /// Flipped by the A key. Nothing animates; the flag is state only.
    animation: bool,
    exit: bool,
}

impl ModelViewer {
    pub fn new(mesh: &Mesh, width: u32, height: u32) -> Self {
        let viewport = Viewport::new(width, height);
        Self {
            scene: Scene::new(mesh, Appearance::new(WHITE, BLUE)),
            camera: ArcballCamera::new(viewport).with_scale(mesh.bbox.fit_scale()),
            projection: Projection::perspective(4.0),
            cursor: (0.0, 0.0),
            animation: true,
            exit: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &ArcballCamera {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn animation(&self) -> bool {
        self.animation
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.camera.model_matrix(self.scene.center())
    }

    fn handle_key(&mut self, key: Key) {
        let appearance = &mut self.scene.appearance;
        match key {
            Key::Escape => self.exit = true,
            Key::Char('a') => self.animation = !self.animation,
            Key::Char('o') => self.projection.mode = ProjectionMode::Orthographic,
            Key::Char('p') => self.projection.mode = ProjectionMode::Perspective,
            Key::Char('c') => appearance.toggle_target(),
            Key::Char('r') => appearance.set_target_color(RED),
            Key::Char('g') => appearance.set_target_color(GREEN),
            Key::Char('b') => appearance.set_target_color(BLUE),
            Key::Char('w') => appearance.set_target_color(WHITE),
            Key::Char('s') => appearance.set_target_color(BLACK),
            Key::Char('h') => appearance.toggle_shadow(),
            Key::Char('x') => self.camera.rotate_step(KEY_STEP, &Vector3::x()),
            Key::Char('y') => self.camera.rotate_step(KEY_STEP, &Vector3::y()),
            Key::Char('z') => self.camera.rotate_step(KEY_STEP, &Vector3::z()),
            _ => {}
        }
    }
}

impl Viewer for ModelViewer {
    fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::MouseButton { button, action } => {
                debug!("mouse button {button:?} {action:?} at {:?}", self.cursor);
                let Some(mode) = button.drag_mode() else {
                    return;
                };
                match action {
                    Action::Press => self.camera.press(mode, self.cursor.0, self.cursor.1),
                    Action::Release => self.camera.release(mode),
                    Action::Repeat => {}
                }
            }
            InputEvent::CursorMoved { x, y } => {
                self.cursor = (x, y);
                self.camera.cursor_moved(x, y);
            }
            InputEvent::Key { key, action } => {
                debug!("key {key:?} {action:?}");
                if action == Action::Press {
                    self.handle_key(key);
                }
            }
            InputEvent::Resized { width, height } => {
                let viewport = Viewport::new(width, height);
                debug!("resize to {}x{}", viewport.width, viewport.height);
                self.camera.resize(viewport);
            }
            InputEvent::CloseRequested => self.exit = true,
        }
    }

    fn viewport(&self) -> Viewport {
        self.camera.viewport()
    }

    fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        let viewport = self.viewport();
        backend.set_viewport(viewport);
        backend.set_projection(&self.projection.matrix(viewport));
        self.scene
            .render(backend, &self.model_matrix(), self.scene.appearance.shadow);
    }

    fn should_exit(&self) -> bool {
        self.exit
    }
}

/// Bunny viewer: fixed perspective camera, black background, W/A/S/D turns
/// the model in fixed steps.
#[derive(Debug, Clone)]
pub struct BunnyViewer {
    scene: Scene,
    viewport: Viewport,
    projection: Projection,
    orientation: Matrix4<f32>,
    scale: f32,
    exit: bool,
}

impl BunnyViewer {
    pub fn new(mesh: &Mesh, width: u32, height: u32) -> Self {
        let mut scene = Scene::new(mesh, Appearance::new(BLACK, [0.8, 0.8, 0.8, 1.0]));
        scene.specular = [0.0, 0.0, 0.0, 1.0];
        scene.shininess = 0.0;
        Self {
            scene,
            viewport: Viewport::new(width, height),
            projection: Projection::perspective(2.0),
            orientation: Matrix4::identity(),
            scale: mesh.bbox.fit_scale(),
            exit: false,
        }
    }

    pub fn orientation(&self) -> &Matrix4<f32> {
        &self.orientation
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        let center = self.scene.center();
        self.orientation
            * Transform::zoom(self.scale)
            * Transform::translation(-center.x, -center.y, -center.z)
    }

    fn turn(&mut self, degrees: f32, axis: Vector3<f32>) {
        self.orientation *= Transform::axis_rotation(degrees.to_radians(), &axis);
    }
}

impl Viewer for BunnyViewer {
    fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Key { key, action } if action != Action::Release => match key {
                Key::Escape => self.exit = true,
                Key::Char('d') => self.turn(BUNNY_STEP_DEGREES, Vector3::y()),
                Key::Char('a') => self.turn(-BUNNY_STEP_DEGREES, Vector3::y()),
                Key::Char('s') => self.turn(BUNNY_STEP_DEGREES, Vector3::x()),
                Key::Char('w') => self.turn(-BUNNY_STEP_DEGREES, Vector3::x()),
                _ => {}
            },
            InputEvent::Resized { width, height } => {
                self.viewport = Viewport::new(width, height);
                debug!("resize to {}x{}", self.viewport.width, self.viewport.height);
            }
            InputEvent::CloseRequested => self.exit = true,
            _ => {}
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        backend.set_viewport(self.viewport);
        backend.set_projection(&self.projection.matrix(self.viewport));
        self.scene.render(backend, &self.model_matrix(), false);
    }

    fn should_exit(&self) -> bool {
        self.exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcball::DragMode;
    use crate::input::MouseButton;
    use crate::obj::parse_obj;

    fn mesh() -> Mesh {
        parse_obj("v 0 0 0\nv 2 0 0\nv 0 2 0\nf 1 2 3\n").unwrap()
    }

    fn press(key: char) -> InputEvent {
        InputEvent::Key {
            key: Key::Char(key),
            action: Action::Press,
        }
    }

    #[test]
    fn test_mouse_buttons_drive_camera() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        viewer.handle(&InputEvent::CursorMoved { x: 400.0, y: 300.0 });
        viewer.handle(&InputEvent::MouseButton {
            button: MouseButton::Left,
            action: Action::Press,
        });
        assert!(viewer.camera().is_dragging(DragMode::Rotate));

        viewer.handle(&InputEvent::CursorMoved { x: 500.0, y: 300.0 });
        assert!(viewer.camera().angle() > 0.0);

        viewer.handle(&InputEvent::MouseButton {
            button: MouseButton::Left,
            action: Action::Release,
        });
        assert!(!viewer.camera().is_dragging(DragMode::Rotate));
        assert_eq!(viewer.camera().angle(), 0.0);
        assert_ne!(viewer.camera().orientation(), &Matrix4::identity());
    }

    #[test]
    fn test_keys_edit_appearance() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        viewer.handle(&press('h'));
        assert!(viewer.scene().appearance.shadow);

        viewer.handle(&press('r'));
        assert_eq!(viewer.scene().appearance.background(), RED);

        viewer.handle(&press('c'));
        viewer.handle(&press('s'));
        assert_eq!(viewer.scene().appearance.object(), BLACK);

        // Releases are ignored.
        viewer.handle(&InputEvent::Key {
            key: Key::Char('h'),
            action: Action::Release,
        });
        assert!(viewer.scene().appearance.shadow);
    }

    #[test]
    fn test_projection_keys() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        viewer.handle(&press('o'));
        assert_eq!(viewer.projection().mode, ProjectionMode::Orthographic);
        viewer.handle(&press('p'));
        assert_eq!(viewer.projection().mode, ProjectionMode::Perspective);
    }

    #[test]
    fn test_animation_key_only_flips_flag() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        assert!(viewer.animation());
        let before = viewer.model_matrix();

        viewer.handle(&press('a'));
        assert!(!viewer.animation());
        assert_eq!(viewer.model_matrix(), before);

        viewer.handle(&press('a'));
        assert!(viewer.animation());
    }

    #[test]
    fn test_axis_keys_commit_rotation() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        viewer.handle(&press('z'));
        let expected = Transform::rotation(KEY_STEP, &Vector3::z());
        assert!((viewer.camera().orientation() - expected).norm() < 1e-6);
        assert_eq!(viewer.camera().angle(), 0.0);
    }

    #[test]
    fn test_escape_and_close_exit() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        assert!(!viewer.should_exit());
        viewer.handle(&InputEvent::Key {
            key: Key::Escape,
            action: Action::Press,
        });
        assert!(viewer.should_exit());

        let mut bunny = BunnyViewer::new(&mesh(), 500, 500);
        bunny.handle(&InputEvent::CloseRequested);
        assert!(bunny.should_exit());
    }

    #[test]
    fn test_resize_to_zero_height_is_clamped() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        viewer.handle(&InputEvent::Resized {
            width: 640,
            height: 0,
        });
        assert_eq!(viewer.viewport(), Viewport::new(640, 1));
        assert_eq!(viewer.viewport().height, 1);
    }

    /// Keeps the last projection it was given.
    #[derive(Default)]
    struct LastProjection(Option<Matrix4<f32>>);

    impl RenderBackend for LastProjection {
        fn upload_mesh(&mut self, _mesh: &Mesh) {}
        fn set_viewport(&mut self, _viewport: Viewport) {}
        fn set_projection(&mut self, projection: &Matrix4<f32>) {
            self.0 = Some(*projection);
        }
        fn set_light(&mut self, _light: &crate::backend::Light) {}
        fn begin_frame(&mut self, _clear_color: [f32; 4]) {}
        fn draw(&mut self, _call: &crate::backend::DrawCall) {}
    }

    #[test]
    fn test_resize_to_zero_width_still_renders() {
        let mut viewer = ModelViewer::new(&mesh(), 800, 600);
        viewer.handle(&InputEvent::Resized {
            width: 0,
            height: 600,
        });
        assert_eq!(viewer.viewport(), Viewport::new(1, 600));

        for key in ['p', 'o'] {
            viewer.handle(&press(key));
            let mut backend = LastProjection::default();
            viewer.render(&mut backend);
            let projection = backend.0.unwrap();
            assert!(projection.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_initial_model_fits_unit_cube() {
        let viewer = ModelViewer::new(&mesh(), 800, 600);
        // Extent 2 gives a fit scale of 1; the bbox centre lands on the origin.
        let moved = viewer
            .model_matrix()
            .transform_point(&nalgebra::Point3::new(1.0, 1.0, 0.0));
        assert!(moved.coords.norm() < 1e-6);
        assert_eq!(viewer.camera().scale(), 1.0);
    }

    #[test]
    fn test_bunny_keys_turn_in_steps() {
        let mut bunny = BunnyViewer::new(&mesh(), 500, 500);
        bunny.handle(&press('d'));
        bunny.handle(&InputEvent::Key {
            key: Key::Char('d'),
            action: Action::Repeat,
        });
        let expected = Transform::axis_rotation(20f32.to_radians(), &Vector3::y());
        assert!((bunny.orientation() - expected).norm() < 1e-5);

        bunny.handle(&press('a'));
        bunny.handle(&press('a'));
        assert!((bunny.orientation() - Matrix4::identity()).norm() < 1e-5);

        // Mouse input does nothing.
        bunny.handle(&InputEvent::MouseButton {
            button: MouseButton::Left,
            action: Action::Press,
        });
        assert!((bunny.orientation() - Matrix4::identity()).norm() < 1e-5);
    }
}
