// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar projection of 3D polygons
//!
//! Builds an orthonormal `(u, v)` basis on a polygon's plane so the polygon
//! can be handled as 2D geometry and mapped back afterwards.

use crate::plane::{angle_between, plane_normal};
use crate::polygon::centroid;
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Normals closer than this (radians) to the Z axis switch the reference to X
pub const REFERENCE_AXIS_TOLERANCE: f64 = 1e-3;

/// Orthonormal frame on a plane: `(u, v, normal)` is right-handed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneBasis {
    pub origin: Point3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneBasis {
    /// Build a basis for a unit `normal` anchored at `origin`.
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        let z = Vector3::z();
        let near_z = angle_between(&normal, &z) < REFERENCE_AXIS_TOLERANCE
            || angle_between(&normal, &-z) < REFERENCE_AXIS_TOLERANCE;
        let reference = if near_z { Vector3::x() } else { z };

        let u = normal.cross(&reference).normalize();
        let v = normal.cross(&u).normalize();
        Self {
            origin,
            u,
            v,
            normal,
        }
    }

    /// Basis for a polygon: its first-three-vertex normal and vertex centroid.
    pub fn from_polygon(points: &[Point3<f64>]) -> Option<Self> {
        let normal = plane_normal(points)?;
        let origin = centroid(points)?;
        Some(Self::new(origin, normal))
    }

    /// In-plane coordinates of a 3D point
    #[inline]
    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u), d.dot(&self.v))
    }

    /// Map 2D coordinates back to 3D, optionally offset along the normal
    #[inline]
    pub fn lift(&self, point: &Point2<f64>, offset: f64) -> Point3<f64> {
        self.origin + self.u * point.x + self.v * point.y + self.normal * offset
    }

    pub fn project_all(&self, points: &[Point3<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

/// Project a polygon onto its own plane.
///
/// Returns the basis together with the 2D ring, or `None` when the polygon
/// has no defined plane.
pub fn project_polygon(points: &[Point3<f64>]) -> Option<(PlaneBasis, Vec<Point2<f64>>)> {
    let basis = PlaneBasis::from_polygon(points)?;
    let projected = basis.project_all(points);
    Some((basis, projected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tilted_polygon() -> Vec<Point3<f64>> {
        vec![
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(14.0, 0.0, 0.0),
            Point3::new(14.0, 3.0, 2.0),
            Point3::new(10.0, 3.0, 2.0),
        ]
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let basis = PlaneBasis::from_polygon(&tilted_polygon()).unwrap();
        assert_relative_eq!(basis.u.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.v.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.u.dot(&basis.v), 0.0, epsilon = 1e-12);
        assert_relative_eq!(basis.u.dot(&basis.normal), 0.0, epsilon = 1e-12);
        assert_relative_eq!(basis.u.cross(&basis.v), basis.normal, epsilon = 1e-12);
    }

    #[test]
    fn test_horizontal_normal_uses_x_reference() {
        let basis = PlaneBasis::new(Point3::origin(), Vector3::z());
        assert!(basis.u.iter().all(|c| c.is_finite()));
        assert_relative_eq!(basis.u.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.u.dot(&Vector3::z()), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_round_trip() {
        let points = tilted_polygon();
        let (basis, projected) = project_polygon(&points).unwrap();
        for (p, q) in points.iter().zip(&projected) {
            assert_relative_eq!(basis.lift(q, 0.0), *p, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_projection_preserves_lengths() {
        let (_, projected) = project_polygon(&tilted_polygon()).unwrap();
        let edge = projected[1] - projected[0];
        assert_relative_eq!(edge.norm(), 4.0, epsilon = 1e-12);
        let side = projected[2] - projected[1];
        assert_relative_eq!(side.norm(), 13.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_lift_with_offset() {
        let basis = PlaneBasis::new(Point3::new(1.0, 2.0, 3.0), Vector3::z());
        let p = basis.lift(&Point2::origin(), 0.5);
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 3.5), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_polygon_has_no_projection() {
        let line = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(project_polygon(&line).is_none());
    }
}
