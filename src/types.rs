use nalgebra::{Point3, Vector3};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// Converts a Bevy vector into a [`Point`].
#[inline]
pub fn point_from_vec3(v: bevy::math::Vec3) -> Point {
    Point::new(v.x, v.y, v.z)
}
