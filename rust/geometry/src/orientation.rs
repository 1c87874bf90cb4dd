// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof tilt and azimuth
//!
//! Measured against the local horizon at the scene location: in an
//! Earth-centred frame "up" is the radial direction, so it is derived once
//! per batch and passed in rather than taken as a global axis.
//! Always evaluate on pre-alignment coordinates.

use crate::plane::plane_normal;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Default tilt (degrees) at or below which a roof counts as flat
pub const DEFAULT_FLAT_THRESHOLD_DEGREES: f64 = 5.0;

/// Horizontal normal components shorter than this give no downslope direction
pub const HORIZONTAL_EPSILON: f64 = 1e-6;

/// Solar orientation of one roof facet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofMetrics {
    /// Slope angle against the local horizontal, in [0, 90]
    pub tilt_degrees: f64,
    /// Compass bearing of the downslope direction (0 = north, clockwise), in [0, 360)
    pub azimuth_degrees: Option<f64>,
    pub is_flat: bool,
}

/// Local east/north/up frame at a point on the globe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub east: Vector3<f64>,
    pub north: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl LocalFrame {
    /// `None` when `up` is (anti)parallel to the polar axis, where east is undefined
    pub fn from_up(up: &Vector3<f64>) -> Option<Self> {
        let up = up.try_normalize(1e-12)?;
        let east = Vector3::z().cross(&up).try_normalize(HORIZONTAL_EPSILON)?;
        let north = up.cross(&east);
        Some(Self { east, north, up })
    }
}

/// Local up vector for a scene: the radial direction through its centroid.
///
/// Falls back to `+Z` for scenes already centred on the origin.
pub fn local_up(scene_centroid: &Point3<f64>) -> Vector3<f64> {
    scene_centroid
        .coords
        .try_normalize(1e-9)
        .unwrap_or_else(Vector3::z)
}

/// Tilt and azimuth of a plane with unit normal `normal`.
pub fn metrics_from_normal(
    normal: &Vector3<f64>,
    up: &Vector3<f64>,
    flat_threshold_degrees: f64,
) -> RoofMetrics {
    let up = up.normalize();
    // Either normal orientation gives the same slope
    let tilt_degrees = normal.dot(&up).abs().min(1.0).acos().to_degrees();
    let is_flat = tilt_degrees <= flat_threshold_degrees;

    let azimuth_degrees = if is_flat {
        None
    } else {
        downslope_azimuth(normal, &up)
    };

    RoofMetrics {
        tilt_degrees,
        azimuth_degrees,
        is_flat,
    }
}

/// Compass bearing of the horizontal part of the outward normal
fn downslope_azimuth(normal: &Vector3<f64>, up: &Vector3<f64>) -> Option<f64> {
    let frame = LocalFrame::from_up(up)?;

    // Outward means on the sky side of the roof
    let outward = if normal.dot(&frame.up) < 0.0 {
        -normal
    } else {
        *normal
    };

    let east = outward.dot(&frame.east);
    let north = outward.dot(&frame.north);
    if east.hypot(north) < HORIZONTAL_EPSILON {
        return None;
    }

    let azimuth = east.atan2(north).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative angles
    Some(if azimuth >= 360.0 { 0.0 } else { azimuth })
}

/// Tilt and azimuth of a roof polygon, or `None` when it has no plane
pub fn roof_metrics(
    points: &[Point3<f64>],
    up: &Vector3<f64>,
    flat_threshold_degrees: f64,
) -> Option<RoofMetrics> {
    let normal = plane_normal(points)?;
    Some(metrics_from_normal(&normal, up, flat_threshold_degrees))
}
