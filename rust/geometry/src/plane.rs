// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane normal estimation
//!
//! The normal is a local three-point estimate from the first two edges,
//! `(p1 - p0) x (p2 - p0)`, not a least-squares fit over every vertex.

use nalgebra::{Point3, Vector3};

/// Cross products shorter than this are treated as collinear input
pub const DEGENERATE_NORMAL_EPSILON: f64 = 1e-10;

/// Unit normal of a polygon from its first three vertices.
///
/// Returns `None` for fewer than 3 points or collinear/coincident leading
/// points; callers treat that as "no plane".
#[inline]
pub fn plane_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }

    let v1 = points[1] - points[0];
    let v2 = points[2] - points[0];
    v1.cross(&v2).try_normalize(DEGENERATE_NORMAL_EPSILON)
}

/// Angle between two unit vectors in radians, robust to rounding drift
#[inline]
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_xy_square_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let n = plane_normal(&points).unwrap();
        assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_clockwise_flips_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let n = plane_normal(&points).unwrap();
        assert_relative_eq!(n.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(plane_normal(&points).is_none());
    }

    #[test]
    fn test_collinear_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
            Point3::new(5.0, 0.0, 0.0),
        ];
        // Only the first three vertices are consulted
        assert!(plane_normal(&points).is_none());
    }

    #[test]
    fn test_angle_between_clamps() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(angle_between(&a, &(a * (1.0 + 1e-15))), 0.0);
        assert_relative_eq!(angle_between(&a, &-a), std::f64::consts::PI);
    }
}
