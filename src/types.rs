//! Common geometric types for tabletop scenes.
//!
//! Positions and sizes are expressed in meters in the world frame of the
//! table, orientations as unit quaternions in (x, y, z, w) order.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Represents a 3D vector or point in space.
///
/// Used for positions, sizes and offsets on the tabletop.
///
/// # Examples
/// ```
/// use tabletop_tasks::types::Vec3;
///
/// let center = Vec3::new(0.5, 0.0, 0.1);
/// let size = Vec3::new(0.2, 0.2, 0.02);
/// let corner = center + size * 0.5;
/// assert!((corner.x - 0.6).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new 3D vector.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a zero vector (origin).
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Converts to tuple format.
    #[inline]
    pub const fn as_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Creates from a fixed-size array, the layout used by the asset tables.
    #[inline]
    pub const fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    /// Euclidean length of the vector.
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Calculates the Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// Component-wise absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Cross product.
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Checks if all components are non-negative and finite.
    #[inline]
    pub fn is_valid_size(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.z >= 0.0
            && self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

/// Unit quaternion in (x, y, z, w) order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// The identity rotation `(0, 0, 0, 1)`.
    #[inline]
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Builds a quaternion from roll (x), pitch (y) and yaw (z) angles in radians.
    ///
    /// Rotations are applied about the fixed X, then Y, then Z axes.
    pub fn from_euler_xyz(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();

        Self::new(
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
            cr * cp * cy + sr * sp * sy,
        )
    }

    /// Rotation about the Z axis only.
    #[inline]
    pub fn from_yaw(yaw: f64) -> Self {
        Self::from_euler_xyz(0.0, 0.0, yaw)
    }

    /// Rotates a vector by this quaternion.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(&v) * 2.0;
        v + t * self.w + q.cross(&t)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

/// Position plus orientation of an entity on the table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    #[inline]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` with the identity orientation.
    #[inline]
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Quat::identity())
    }

    /// Maps a point from this pose's local frame into the world frame.
    #[inline]
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation.rotate(local)
    }
}

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// Callers use the (min, max) and (center, size) forms interchangeably.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a new bounding box from its min and max corners.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box centered on `center` with full extents `size`.
    #[inline]
    pub fn from_center_and_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Calculates the overlap length in one dimension.
    #[inline]
    fn overlap_1d(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
        (a_max.min(b_max) - a_min.max(b_min)).max(0.0)
    }

    /// Calculates the overlap area in the XY plane.
    #[inline]
    pub fn overlap_area_xy(&self, other: &Self) -> f64 {
        let overlap_x = Self::overlap_1d(self.min.x, self.max.x, other.min.x, other.max.x);
        let overlap_y = Self::overlap_1d(self.min.y, self.max.y, other.min.y, other.max.y);
        overlap_x * overlap_y
    }

    /// Checks if a point is inside the bounding box, boundaries included.
    #[inline]
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!(
            a.distance_to(&b) < TOL,
            "expected {:?} to be close to {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert!((Vec3::new(3.0, 4.0, 0.0).norm() - 5.0).abs() < TOL);
    }

    #[test]
    fn test_identity_quaternion_keeps_vectors() {
        let v = Vec3::new(0.1, -0.2, 0.3);
        assert_vec_close(Quat::identity().rotate(v), v);
        assert_eq!(Quat::from_euler_xyz(0.0, 0.0, 0.0), Quat::identity());
    }

    #[test]
    fn test_yaw_quarter_turn_rotates_x_onto_y() {
        let q = Quat::from_yaw(std::f64::consts::FRAC_PI_2);
        assert_vec_close(q.rotate(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 1.0, 0.0));

        let norm = (q.x * q.x + q.y * q.y + q.z * q.z + q.w * q.w).sqrt();
        assert!((norm - 1.0).abs() < TOL);
    }

    #[test]
    fn test_pose_apply_rotates_then_translates() {
        let pose = Pose::new(
            Vec3::new(0.5, 0.0, 0.0),
            Quat::from_yaw(std::f64::consts::PI),
        );
        assert_vec_close(pose.apply(Vec3::new(0.1, 0.0, 0.0)), Vec3::new(0.4, 0.0, 0.0));
    }

    #[test]
    fn test_from_center_and_size_spans_half_extents() {
        let bbox = BoundingBox::from_center_and_size(
            Vec3::new(0.5, 0.1, 0.01),
            Vec3::new(0.2, -0.2, 0.02),
        );
        assert_vec_close(bbox.min, Vec3::new(0.4, 0.0, 0.0));
        assert_vec_close(bbox.max, Vec3::new(0.6, 0.2, 0.02));
    }

    #[test]
    fn test_bounding_box_overlap_area() {
        let a = BoundingBox::new(Vec3::zero(), Vec3::new(10.0, 10.0, 0.0));
        let b = BoundingBox::new(Vec3::new(5.0, 5.0, 0.0), Vec3::new(15.0, 15.0, 0.0));

        assert!((a.overlap_area_xy(&b) - 25.0).abs() < TOL);
    }
}
