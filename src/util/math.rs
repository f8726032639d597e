//! Math type re-exports and scene-specific math utilities.
//!
//! This module re-exports types from `glam` and provides the homogeneous
//! bounding box used for parts, geometries, instances and the whole scene.

pub use glam::{Mat3, Mat4, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Axis-aligned bounding volume with 4-component corners.
///
/// The fourth component is carried along so boxes can hold homogeneous
/// points (w = 1) or custom per-vertex data in w. An empty box has `min` at
/// +inf and `max` at -inf; the first merge establishes real bounds.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox4f {
    pub min: Vec4,
    pub max: Vec4,
}

impl BBox4f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec4::splat(f32::INFINITY),
        max: Vec4::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec4, max: Vec4) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from a single point.
    #[inline]
    pub fn from_point(p: Vec4) -> Self {
        Self { min: p, max: p }
    }

    /// Check if this box has not been merged with anything yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extend this box to include a point.
    #[inline]
    pub fn merge_point(&mut self, p: Vec4) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Extend this box to include another box.
    ///
    /// Merging with an empty box is a no-op, and two empty boxes stay empty.
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Box enclosing this box's corners after an affine transform.
    ///
    /// `dim` selects how many leading axes contribute both extremes: 3 walks
    /// the 8 xyz corners at `min.w`, 4 also walks `max.w` (16 corners), 2
    /// keeps z at `min.z`. Values above 4 are clamped.
    pub fn transformed(&self, matrix: &Mat4, dim: u32) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }

        let mut bbox = Self::EMPTY;
        for corner in 0..(1u32 << dim.min(4)) {
            let pick = |bit: u32, lo: f32, hi: f32| if corner & (1 << bit) != 0 { hi } else { lo };
            let point = Vec4::new(
                pick(0, self.min.x, self.max.x),
                pick(1, self.min.y, self.max.y),
                pick(2, self.min.z, self.max.z),
                pick(3, self.min.w, self.max.w),
            );
            bbox.merge_point(*matrix * point);
        }
        bbox
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        ((self.min + self.max) * 0.5).truncate()
    }

    /// Get the xyz size (extents) of the box, zero when empty.
    #[inline]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.max - self.min).truncate()
        }
    }
}

impl Default for BBox4f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox4f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox4f({:?} - {:?})", self.min, self.max)
    }
}

/// Triangle winding of a transform: -1 when it mirrors, +1 otherwise.
#[inline]
pub fn winding(matrix: &Mat4) -> f32 {
    if Mat3::from_mat4(*matrix).determinant() < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Inverse-transpose of a matrix, for transforming normals.
#[inline]
pub fn inverse_transpose(matrix: &Mat4) -> Mat4 {
    matrix.inverse().transpose()
}

/// Scale the translation column of an affine matrix.
#[inline]
pub fn scale_translation(matrix: &Mat4, scale: f32) -> Mat4 {
    let mut m = *matrix;
    m.w_axis = (m.w_axis.truncate() * scale).extend(m.w_axis.w);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BBox4f {
        BBox4f::new(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(1.0, 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_bbox_merge_points() {
        let mut b = BBox4f::EMPTY;
        assert!(b.is_empty());

        b.merge_point(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, b.max);

        b.merge_point(Vec4::new(2.0, -1.0, 4.0, 1.0));
        assert_eq!(b.min, Vec4::new(0.0, -1.0, 0.0, 1.0));
        assert_eq!(b.max, Vec4::new(2.0, 0.0, 4.0, 1.0));
        assert_eq!(b.center(), Vec3::new(1.0, -0.5, 2.0));
        assert_eq!(b.size(), Vec3::new(2.0, 1.0, 4.0));
    }

    #[test]
    fn test_bbox_merge_empty_identity() {
        let b = unit_box();

        let mut e = BBox4f::EMPTY;
        e.merge(&b);
        assert_eq!(e, b);

        let mut b2 = b;
        b2.merge(&BBox4f::EMPTY);
        assert_eq!(b2, b);

        let mut both = BBox4f::EMPTY;
        both.merge(&BBox4f::EMPTY);
        assert!(both.is_empty());
        assert_eq!(both.size(), Vec3::ZERO);
    }

    #[test]
    fn test_bbox_transformed_identity() {
        let b = BBox4f::new(Vec4::new(-1.5, 0.25, 3.0, 1.0), Vec4::new(2.0, 0.5, 7.0, 1.0));
        let t = b.transformed(&Mat4::IDENTITY, 3);
        assert!(t.min.abs_diff_eq(b.min, 1e-6));
        assert!(t.max.abs_diff_eq(b.max, 1e-6));
    }

    #[test]
    fn test_bbox_transformed_translation() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let t = unit_box().transformed(&m, 3);
        assert_eq!(t.min, Vec4::new(10.0, 0.0, 0.0, 1.0));
        assert_eq!(t.max, Vec4::new(11.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn test_bbox_transformed_rotation() {
        let m = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let t = unit_box().transformed(&m, 3);
        assert!(t.min.abs_diff_eq(Vec4::new(-1.0, 0.0, 0.0, 1.0), 1e-5));
        assert!(t.max.abs_diff_eq(Vec4::new(0.0, 1.0, 1.0, 1.0), 1e-5));
    }

    #[test]
    fn test_bbox_transformed_dim() {
        let b = BBox4f::new(Vec4::new(0.0, 0.0, 0.0, 0.0), Vec4::new(1.0, 1.0, 1.0, 2.0));

        // dim 2 never visits max.z
        let t = b.transformed(&Mat4::IDENTITY, 2);
        assert_eq!(t.max.z, 0.0);

        // dim 4 visits max.w
        let t = b.transformed(&Mat4::IDENTITY, 4);
        assert_eq!(t.max.w, 2.0);
        let t = b.transformed(&Mat4::IDENTITY, 3);
        assert_eq!(t.max.w, 0.0);
    }

    #[test]
    fn test_bbox_transformed_empty() {
        let t = BBox4f::EMPTY.transformed(&Mat4::from_scale(Vec3::splat(2.0)), 3);
        assert!(t.is_empty());
    }

    #[test]
    fn test_winding() {
        assert_eq!(winding(&Mat4::IDENTITY), 1.0);
        assert_eq!(winding(&Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0))), -1.0);
        assert_eq!(winding(&Mat4::from_scale(Vec3::new(-1.0, -1.0, 1.0))), 1.0);
    }

    #[test]
    fn test_scale_translation() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let s = scale_translation(&m, 2.0);
        assert_eq!(s.w_axis, Vec4::new(2.0, 4.0, 6.0, 1.0));
        assert_eq!(s.x_axis, m.x_axis);
    }

    #[test]
    fn test_bbox_pod() {
        assert_eq!(std::mem::size_of::<BBox4f>(), 32);
    }
}
