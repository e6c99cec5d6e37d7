//! Geometric helpers for tabletop placement checks.
//!
//! Asset extents are recorded as pairs of opposite corners. These helpers
//! turn such pairs into the centroid and size used to spawn an asset and
//! provide the containment predicate used by the zone placement checks.

use crate::types::{BoundingBox, Vec3};

/// Checks whether a point lies inside a box.
///
/// Every coordinate of `point` must lie within `[min, max]` of `bounds`,
/// boundaries included.
///
/// # Example
/// ```
/// use tabletop_tasks::geometry::contains;
/// use tabletop_tasks::types::{BoundingBox, Vec3};
///
/// let bounds = BoundingBox::new(Vec3::zero(), Vec3::new(1.0, 1.0, 1.0));
/// assert!(contains(Vec3::new(1.0, 0.5, 0.0), &bounds));
/// assert!(!contains(Vec3::new(1.5, 0.5, 0.0), &bounds));
/// ```
pub fn contains(point: Vec3, bounds: &BoundingBox) -> bool {
    bounds.contains_point(&point)
}

/// Midpoint of two opposite corners.
pub fn centroid(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}

/// Unsigned extents spanned by two opposite corners.
pub fn extent(a: Vec3, b: Vec3) -> Vec3 {
    (b - a).abs()
}

/// Checks whether the XY footprints of two boxes overlap with positive area.
pub fn footprints_overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.overlap_area_xy(b) > 0.0
}
