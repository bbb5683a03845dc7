/// 4×4 transformation matrices used by the camera and the render passes
use nalgebra::{Matrix4, Point3, Unit, Vector2, Vector3};

/// Angle multiplier applied by [`Transform::rotation`]. Arcball drags rotate
/// twice the angle between the two sphere points.
pub const ARCBALL_GAIN: f32 = 2.0;

/// Matrix constructors. All matrices act on column vectors.
pub struct Transform;

impl Transform {
    /// Rotation by `ARCBALL_GAIN * angle` radians about `axis`.
    ///
    /// A zero-length axis (a drag that has not left its start point) yields the
    /// identity.
    pub fn rotation(angle: f32, axis: &Vector3<f32>) -> Matrix4<f32> {
        Self::axis_rotation(angle * ARCBALL_GAIN, axis)
    }

    /// Plain rotation by `angle` radians about `axis`, identity for a zero axis.
    pub fn axis_rotation(angle: f32, axis: &Vector3<f32>) -> Matrix4<f32> {
        match Unit::try_new(*axis, f32::EPSILON) {
            Some(axis) => Matrix4::from_axis_angle(&axis, angle),
            None => Matrix4::identity(),
        }
    }

    /// Uniform scale in x, y and z.
    pub fn zoom(factor: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(factor, factor, factor))
    }

    /// Translation in the view plane.
    pub fn pan(offset: &Vector2<f32>) -> Matrix4<f32> {
        Self::translation(offset.x, offset.y, 0.0)
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Flattens geometry onto the plane `y = floor_y` as seen from `light`.
    ///
    /// The light is moved to the origin, the projection divides by `-y / light.y`
    /// and the result is moved back.
    pub fn shadow_projection(light: &Point3<f32>, floor_y: f32) -> Matrix4<f32> {
        #[rustfmt::skip]
        let flatten = Matrix4::new(
            1.0, 0.0,            0.0, 0.0,
            0.0, 1.0,            0.0, 0.0,
            0.0, 0.0,            1.0, 0.0,
            0.0, -1.0 / light.y, 0.0, 0.0,
        );

        Self::translation(0.0, floor_y, 0.0)
            * Self::translation(light.x, light.y, light.z)
            * flatten
            * Self::translation(-light.x, -light.y, -light.z)
            * Self::translation(0.0, -floor_y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_zero_axis_rotation_is_identity() {
        let matrix = Transform::rotation(0.7, &Vector3::zeros());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);

        let matrix = Transform::rotation(0.0, &Vector3::y());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_applies_gain() {
        // 45 degrees with a gain of two is a quarter turn.
        let matrix = Transform::rotation(FRAC_PI_4, &Vector3::z());
        let rotated = matrix.transform_vector(&Vector3::x());
        assert!((rotated - Vector3::y()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_ignores_axis_length() {
        let a = Transform::rotation(0.3, &Vector3::new(0.0, 5.0, 0.0));
        let b = Transform::rotation(0.3, &Vector3::y());
        assert!((a - b).norm() < 1e-6);
    }

    #[test]
    fn test_zoom_and_pan() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform::zoom(2.0).transform_point(&p), Point3::new(2.0, 4.0, 6.0));
        assert_eq!(
            Transform::pan(&Vector2::new(0.5, -1.0)).transform_point(&p),
            Point3::new(1.5, 1.0, 3.0)
        );
        assert_eq!(Transform::pan(&Vector2::zeros()), Matrix4::identity());
    }

    #[test]
    fn test_shadow_lands_on_floor() {
        let light = Point3::new(0.0, 10.0, 0.0);
        let shadow = Transform::shadow_projection(&light, 0.0);

        // Straight below the light: the point collapses onto the floor.
        let below = shadow.transform_point(&Point3::new(0.0, 5.0, 0.0));
        assert!(below.y.abs() < 1e-5);

        // A point halfway up is projected twice as far out.
        let off_axis = shadow.transform_point(&Point3::new(1.0, 5.0, 2.0));
        assert!(off_axis.y.abs() < 1e-5);
        assert!((off_axis.x - 2.0).abs() < 1e-5);
        assert!((off_axis.z - 4.0).abs() < 1e-5);
    }
}
