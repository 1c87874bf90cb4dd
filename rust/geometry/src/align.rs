// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene alignment
//!
//! One rigid rotation brings the mean roof normal onto straight down so
//! every facet of a batch is expressed in the same "looking down" frame,
//! independent of where on the globe the scene was captured.

use crate::plane::plane_normal;
use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Axis norms below this are treated as already aligned (or exactly opposite)
pub const ALIGNMENT_AXIS_EPSILON: f64 = 1e-6;

/// Canonical direction the mean roof normal is rotated onto
#[inline]
pub fn alignment_target() -> Vector3<f64> {
    -Vector3::z()
}

/// Normalised mean of the defined unit normals of `polygons`
pub fn mean_normal(polygons: &[Vec<Point3<f64>>]) -> Option<Vector3<f64>> {
    let normals: Vec<Vector3<f64>> = polygons.iter().filter_map(|p| plane_normal(p)).collect();
    if normals.is_empty() {
        return None;
    }

    let sum: Vector3<f64> = normals.iter().sum();
    (sum / normals.len() as f64).try_normalize(ALIGNMENT_AXIS_EPSILON)
}

/// Minimal rotation taking unit vector `from` onto unit vector `to`
/// (axis-angle / Rodrigues).
///
/// Returns identity when the two are parallel or exactly anti-parallel;
/// the 180° case is deliberately left uncorrected.
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>) -> Rotation3<f64> {
    let axis = from.cross(to);
    if axis.norm() < ALIGNMENT_AXIS_EPSILON {
        return Rotation3::identity();
    }

    let angle = from.dot(to).clamp(-1.0, 1.0).acos();
    Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle)
}

/// Rotation bringing the batch's mean roof normal onto [`alignment_target`]
pub fn alignment_rotation(roofs: &[Vec<Point3<f64>>]) -> Rotation3<f64> {
    match mean_normal(roofs) {
        Some(mean) => {
            let rotation = rotation_between(&mean, &alignment_target());
            tracing::debug!(
                mean_normal = ?mean.as_slice(),
                angle_degrees = rotation.angle().to_degrees(),
                "Computed roof alignment"
            );
            rotation
        }
        None => Rotation3::identity(),
    }
}

/// Apply a rotation about the origin to every vertex of a polygon
pub fn rotate_polygon(points: &[Point3<f64>], rotation: &Rotation3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| rotation * p).collect()
}

/// Put every vertex of a polygon on the plane `z = elevation`
pub fn flatten_polygon(points: &[Point3<f64>], elevation: f64) -> Vec<Point3<f64>> {
    points
        .iter()
        .map(|p| Point3::new(p.x, p.y, elevation))
        .collect()
}
