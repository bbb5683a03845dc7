/// Mouse-driven camera: arcball rotation, drag zoom and drag pan.
///
/// Each of the three controls is its own small state machine bound to one
/// mouse button. While a drag is live its delta (angle/axis, scale factor or
/// offset) is shown on top of the committed matrix; on release the delta is
/// multiplied onto the right of the committed matrix and reset.
use log::debug;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};

use crate::projection::Viewport;
use crate::transform::Transform;

/// Smallest zoom factor a drag can reach.
pub const MIN_SCALE: f32 = 0.0002;
/// Scale factors at or below this snap up to [`MIN_SCALE`].
pub const SCALE_SNAP_THRESHOLD: f32 = 0.00015;
/// Screen-width (or height) drag distance that pans by this many units.
pub const PAN_RANGE: f32 = 1.5;

/// Which control a mouse button drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Zoom,
    Pan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RotateDrag {
    Idle,
    Dragging { start: Vector3<f32> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ZoomDrag {
    Idle,
    Dragging { press_y: f32, prev_y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PanDrag {
    Idle,
    Dragging { press: Vector2<f32> },
}

/// Committed transforms plus the in-progress drag deltas.
#[derive(Debug, Clone)]
pub struct ArcballCamera {
    viewport: Viewport,

    orientation: Matrix4<f32>,
    angle: f32,
    axis: Vector3<f32>,
    rotate: RotateDrag,

    size: Matrix4<f32>,
    scale: f32,
    zoom: ZoomDrag,

    position: Matrix4<f32>,
    offset: Vector2<f32>,
    pan: PanDrag,
}

impl ArcballCamera {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            orientation: Matrix4::identity(),
            angle: 0.0,
            axis: Vector3::y(),
            rotate: RotateDrag::Idle,
            size: Matrix4::identity(),
            scale: 1.0,
            zoom: ZoomDrag::Idle,
            position: Matrix4::identity(),
            offset: Vector2::zeros(),
            pan: PanDrag::Idle,
        }
    }

    /// Start from a committed uniform scale instead of the identity.
    pub fn with_scale(mut self, factor: f32) -> Self {
        self.size = Transform::zoom(factor);
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn orientation(&self) -> &Matrix4<f32> {
        &self.orientation
    }

    pub fn size(&self) -> &Matrix4<f32> {
        &self.size
    }

    pub fn position(&self) -> &Matrix4<f32> {
        &self.position
    }

    /// Live rotation angle since the rotate drag started.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn axis(&self) -> &Vector3<f32> {
        &self.axis
    }

    /// Live zoom factor of the current zoom drag (1 when idle).
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Live pan offset of the current pan drag (zero when idle).
    pub fn offset(&self) -> &Vector2<f32> {
        &self.offset
    }

    pub fn is_dragging(&self, mode: DragMode) -> bool {
        match mode {
            DragMode::Rotate => matches!(self.rotate, RotateDrag::Dragging { .. }),
            DragMode::Zoom => matches!(self.zoom, ZoomDrag::Dragging { .. }),
            DragMode::Pan => matches!(self.pan, PanDrag::Dragging { .. }),
        }
    }

    /// Project a window position onto the unit arcball.
    ///
    /// The ball has radius `min(width, height) / 2` around the viewport centre.
    /// Positions outside it are clamped onto its rim, so every cursor position
    /// gets a defined direction.
    pub fn project_on_sphere(&self, x: f32, y: f32) -> Vector3<f32> {
        let width = self.viewport.width as f32;
        let height = self.viewport.height as f32;
        let r = width.min(height) / 2.0;

        let x = x - width / 2.0;
        let y = height / 2.0 - y;
        let a = (r * r).min(x * x + y * y);
        let z = (r * r - a).sqrt();

        Vector3::new(x, y, z)
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::z)
    }

    /// Begin the drag bound to `mode` at window position `(x, y)`.
    pub fn press(&mut self, mode: DragMode, x: f32, y: f32) {
        match mode {
            DragMode::Rotate => {
                self.rotate = RotateDrag::Dragging {
                    start: self.project_on_sphere(x, y),
                };
            }
            DragMode::Zoom => {
                self.zoom = ZoomDrag::Dragging {
                    press_y: y,
                    prev_y: y,
                };
            }
            DragMode::Pan => {
                self.pan = PanDrag::Dragging {
                    press: Vector2::new(x, y),
                };
            }
        }
    }

    /// Feed a cursor position to every live drag.
    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        if let RotateDrag::Dragging { start } = self.rotate {
            let current = self.project_on_sphere(x, y);
            self.angle = start.dot(&current).clamp(-1.0, 1.0).acos();
            self.axis = start.cross(&current);
        }

        if let ZoomDrag::Dragging { press_y, prev_y } = self.zoom {
            let delta = ((y - press_y) / (2.0 * self.viewport.height as f32)).abs();
            if self.scale > 0.0 {
                if prev_y > y {
                    self.scale += delta;
                } else {
                    self.scale -= delta;
                }
            }
            if self.scale <= SCALE_SNAP_THRESHOLD {
                self.scale = MIN_SCALE;
            }
            debug!("zoom scale {}", self.scale);
            self.zoom = ZoomDrag::Dragging { press_y, prev_y: y };
        }

        if let PanDrag::Dragging { press } = self.pan {
            let width = self.viewport.width.max(1) as f32;
            let height = self.viewport.height as f32;
            self.offset = Vector2::new(
                -((press.x - x) * PAN_RANGE / width),
                (press.y - y) * PAN_RANGE / height,
            );
        }
    }

    /// End the drag bound to `mode`, committing its delta.
    pub fn release(&mut self, mode: DragMode) {
        match mode {
            DragMode::Rotate => {
                if self.rotate == RotateDrag::Idle {
                    return;
                }
                self.rotate = RotateDrag::Idle;
                self.orientation *= Transform::rotation(self.angle, &self.axis);
                self.angle = 0.0;
            }
            DragMode::Zoom => {
                if self.zoom == ZoomDrag::Idle {
                    return;
                }
                self.zoom = ZoomDrag::Idle;
                self.size *= Transform::zoom(self.scale);
                self.scale = 1.0;
            }
            DragMode::Pan => {
                if self.pan == PanDrag::Idle {
                    return;
                }
                self.pan = PanDrag::Idle;
                self.position *= Transform::pan(&self.offset);
                self.offset = Vector2::zeros();
            }
        }
    }

    /// Commit a fixed rotation straight into the orientation.
    pub fn rotate_step(&mut self, angle: f32, axis: &Vector3<f32>) {
        self.orientation *= Transform::rotation(angle, axis);
    }

    /// Committed pan with the live offset applied.
    pub fn live_position(&self) -> Matrix4<f32> {
        self.position * Transform::pan(&self.offset)
    }

    /// Committed size with the live zoom applied.
    pub fn live_size(&self) -> Matrix4<f32> {
        self.size * Transform::zoom(self.scale)
    }

    /// Committed orientation with the live rotation applied.
    pub fn live_orientation(&self) -> Matrix4<f32> {
        self.orientation * Transform::rotation(self.angle, &self.axis)
    }

    /// Model matrix for an object whose centre sits at `center`.
    pub fn model_matrix(&self, center: &Point3<f32>) -> Matrix4<f32> {
        self.live_position()
            * self.live_size()
            * self.live_orientation()
            * Transform::translation(-center.x, -center.y, -center.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ArcballCamera {
        ArcballCamera::new(Viewport::new(800, 600))
    }

    fn assert_matrix_eq(a: &Matrix4<f32>, b: &Matrix4<f32>) {
        assert!((a - b).norm() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn test_centre_projects_to_pole() {
        let cam = camera();
        let p = cam.project_on_sphere(400.0, 300.0);
        assert!((p - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_projection_outside_ball_lands_on_rim() {
        let cam = camera();
        let p = cam.project_on_sphere(800.0, 300.0);
        assert!((p.norm() - 1.0).abs() < 1e-6);
        assert!(p.z.abs() < 1e-6);
        assert!((p.x - 1.0).abs() < 1e-6);

        // Above the centre in window coordinates is +y on the ball.
        let p = cam.project_on_sphere(400.0, 0.0);
        assert!(p.y > 0.99);
    }

    #[test]
    fn test_projection_inside_ball_is_unit() {
        let cam = camera();
        for &(x, y) in &[(420.0, 310.0), (250.0, 100.0), (555.5, 444.4)] {
            let p = cam.project_on_sphere(x, y);
            assert!((p.norm() - 1.0).abs() < 1e-5);
            assert!(p.z >= 0.0);
        }
    }

    #[test]
    fn test_drag_to_start_point_has_no_angle() {
        let mut cam = camera();
        cam.press(DragMode::Rotate, 500.0, 250.0);
        cam.cursor_moved(500.0, 250.0);
        assert!(cam.angle() < 1e-3);
    }

    #[test]
    fn test_rotate_angle_is_relative_to_press() {
        let mut cam = camera();
        cam.press(DragMode::Rotate, 400.0, 300.0);
        cam.cursor_moved(450.0, 300.0);
        cam.cursor_moved(500.0, 300.0);

        let start = cam.project_on_sphere(400.0, 300.0);
        let end = cam.project_on_sphere(500.0, 300.0);
        let expected = start.dot(&end).min(1.0).acos();
        assert!((cam.angle() - expected).abs() < 1e-6);
        assert!((cam.axis() - start.cross(&end)).norm() < 1e-6);
        // Dragging right spins around +y.
        assert!(cam.axis().y > 0.0);
    }

    #[test]
    fn test_rotate_release_commits_and_resets() {
        let mut cam = camera();
        cam.press(DragMode::Rotate, 400.0, 300.0);
        cam.cursor_moved(480.0, 260.0);
        let live = cam.live_orientation();
        assert!(cam.is_dragging(DragMode::Rotate));

        cam.release(DragMode::Rotate);
        assert!(!cam.is_dragging(DragMode::Rotate));
        assert_eq!(cam.angle(), 0.0);
        assert_matrix_eq(cam.orientation(), &live);
        assert_matrix_eq(&cam.live_orientation(), &live);
    }

    #[test]
    fn test_press_release_without_motion_changes_nothing() {
        let mut cam = camera().with_scale(0.5);
        let before = cam.clone();

        for mode in [DragMode::Rotate, DragMode::Zoom, DragMode::Pan] {
            cam.press(mode, 123.0, 456.0);
            cam.release(mode);
        }

        assert_matrix_eq(cam.orientation(), before.orientation());
        assert_matrix_eq(cam.size(), before.size());
        assert_matrix_eq(cam.position(), before.position());
    }

    #[test]
    fn test_zoom_moves_with_direction_of_last_step() {
        let mut cam = camera();
        cam.press(DragMode::Zoom, 0.0, 300.0);

        // Moving up grows the scale by |dy| / (2 * height) measured from the press.
        cam.cursor_moved(0.0, 240.0);
        assert!((cam.scale() - (1.0 + 60.0 / 1200.0)).abs() < 1e-6);

        // Moving back down shrinks it, still measured from the press.
        cam.cursor_moved(0.0, 270.0);
        assert!((cam.scale() - (1.0 + 60.0 / 1200.0 - 30.0 / 1200.0)).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_snaps_to_floor() {
        let mut cam = camera();
        cam.press(DragMode::Zoom, 0.0, 0.0);
        // One huge downward step drives the scale far below zero.
        cam.cursor_moved(0.0, 6000.0);
        assert_eq!(cam.scale(), MIN_SCALE);

        // Further downward motion never drops it at or below the threshold.
        for y in [6100.0, 6200.0, 9000.0] {
            cam.cursor_moved(0.0, y);
            assert!(cam.scale() > SCALE_SNAP_THRESHOLD);
        }
    }

    #[test]
    fn test_zoom_release_commits_and_resets() {
        let mut cam = camera();
        cam.press(DragMode::Zoom, 0.0, 300.0);
        cam.cursor_moved(0.0, 0.0);
        let scale = cam.scale();
        cam.release(DragMode::Zoom);

        assert_eq!(cam.scale(), 1.0);
        assert_matrix_eq(cam.size(), &Transform::zoom(scale));
    }

    #[test]
    fn test_pan_offset_maps_drag_to_view_units() {
        let mut cam = camera();
        cam.press(DragMode::Pan, 400.0, 300.0);
        cam.cursor_moved(800.0, 0.0);
        assert!((cam.offset().x - 0.75).abs() < 1e-6);
        assert!((cam.offset().y - 0.75).abs() < 1e-6);

        cam.release(DragMode::Pan);
        assert_eq!(cam.offset(), &Vector2::zeros());
        let moved = cam.position().transform_point(&Point3::origin());
        assert!((moved - Point3::new(0.75, 0.75, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_pan_release_without_motion_is_identity() {
        let mut cam = camera();
        cam.press(DragMode::Pan, 10.0, 20.0);
        cam.release(DragMode::Pan);
        assert_eq!(cam.position(), &Matrix4::identity());
    }

    #[test]
    fn test_release_when_idle_is_ignored() {
        let mut cam = camera();
        cam.cursor_moved(10.0, 10.0);
        cam.release(DragMode::Rotate);
        cam.release(DragMode::Zoom);
        cam.release(DragMode::Pan);
        assert_eq!(cam.orientation(), &Matrix4::identity());
        assert_eq!(cam.size(), &Matrix4::identity());
        assert_eq!(cam.position(), &Matrix4::identity());
    }

    #[test]
    fn test_drags_are_independent() {
        let mut cam = camera();
        cam.press(DragMode::Rotate, 400.0, 300.0);
        cam.press(DragMode::Pan, 400.0, 300.0);
        cam.cursor_moved(500.0, 300.0);
        assert!(cam.angle() > 0.0);
        assert!(cam.offset().x > 0.0);
        assert_eq!(cam.scale(), 1.0);

        cam.release(DragMode::Pan);
        assert!(cam.is_dragging(DragMode::Rotate));
        assert!(cam.angle() > 0.0);
    }

    #[test]
    fn test_commit_multiplies_on_the_right() {
        let mut cam = camera();
        cam.rotate_step(0.2, &Vector3::x());
        let first = *cam.orientation();

        cam.press(DragMode::Rotate, 400.0, 300.0);
        cam.cursor_moved(460.0, 300.0);
        let delta = Transform::rotation(cam.angle(), cam.axis());
        cam.release(DragMode::Rotate);

        assert_matrix_eq(cam.orientation(), &(first * delta));
    }

    #[test]
    fn test_model_matrix_composes_pan_zoom_rotation_in_order() {
        let mut cam = camera();
        cam.rotate_step(0.3, &Vector3::x());

        cam.press(DragMode::Zoom, 400.0, 300.0);
        cam.cursor_moved(400.0, 0.0);
        cam.release(DragMode::Zoom);
        assert_matrix_eq(cam.size(), &Transform::zoom(1.25));

        cam.press(DragMode::Pan, 400.0, 300.0);
        cam.cursor_moved(800.0, 0.0);
        cam.release(DragMode::Pan);

        let center = Point3::new(1.0, 2.0, 3.0);
        let expected = Transform::pan(&Vector2::new(0.75, 0.75))
            * Transform::zoom(1.25)
            * Transform::rotation(0.3, &Vector3::x())
            * Transform::translation(-1.0, -2.0, -3.0);
        assert_matrix_eq(&cam.model_matrix(&center), &expected);

        // The pan sits outside the zoom, so it is not scaled.
        let moved = cam.model_matrix(&center).transform_point(&center);
        assert!((moved - Point3::new(0.75, 0.75, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_model_matrix_centres_object() {
        let cam = camera();
        let center = Point3::new(1.0, 2.0, 3.0);
        let moved = cam.model_matrix(&center).transform_point(&center);
        assert!(moved.coords.norm() < 1e-6);
    }
}
