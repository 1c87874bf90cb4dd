// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof and base polygons

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// What a polygon represents in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Roof facet: aligned, measured, and fitted with a panel rectangle
    #[default]
    Roof,
    /// Ground footprint: flattened onto the base elevation
    Base,
}

/// A polygon as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputPolygon {
    #[serde(default)]
    pub role: Role,
    pub points: Vec<Point3<f64>>,
}

impl InputPolygon {
    pub fn new(role: Role, points: Vec<Point3<f64>>) -> Self {
        Self { role, points }
    }

    pub fn roof(points: Vec<Point3<f64>>) -> Self {
        Self::new(Role::Roof, points)
    }

    pub fn base(points: Vec<Point3<f64>>) -> Self {
        Self::new(Role::Base, points)
    }
}

/// Mean of a set of points, or `None` when empty
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    let first = points.first()?;
    // Accumulate offsets from the first point to keep precision for ECEF-sized values
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + (p - first));
    Some(first + sum / points.len() as f64)
}

/// Shoelace area of the polygon projected onto the XY plane.
/// Positive for counter-clockwise winding.
pub fn signed_area_xy(points: &[Point3<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        twice_area += p.x * q.y - q.x * p.y;
    }
    0.5 * twice_area
}

/// Reverse the polygon if it winds clockwise in the XY projection
pub fn ensure_ccw_xy(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    if points.len() >= 3 && signed_area_xy(points) < 0.0 {
        points.iter().rev().copied().collect()
    } else {
        points.to_vec()
    }
}

/// Drop later repeats of bit-identical points, keeping first-occurrence order
pub fn dedup_exact(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if !kept.iter().any(|q| q == p) {
            kept.push(*p);
        }
    }
    kept
}

/// Area of a planar polygon in 3D (half the norm of the Newell vector)
pub fn polygon_area(points: &[Point3<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let origin = points[0];
    let mut newell = Vector3::zeros();
    for i in 1..n - 1 {
        newell += (points[i] - origin).cross(&(points[i + 1] - origin));
    }
    0.5 * newell.norm()
}
