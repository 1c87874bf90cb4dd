// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Largest inscribed rectangle
//!
//! Bounded-resolution search for the largest rotated rectangle inside a 2D
//! polygon: rotation angles over [0°, 180°), candidate centres on a grid over
//! the bounding box, and width/height as fractions of the bounding box.
//! The result is the best rectangle found at the requested resolution, not
//! an exact optimum.

use crate::config::RectangleSearch;
use crate::projection::PlaneBasis;
use nalgebra::{Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};

/// Boundary tolerance relative to the polygon's bounding-box diagonal
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// A rotated rectangle in the 2D frame of its source polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InscribedRectangle {
    pub center: Point2<f64>,
    /// Extent along the rotated x axis
    pub width: f64,
    /// Extent along the rotated y axis
    pub height: f64,
    /// Rotation of the width axis from +x, in [0, 180)
    pub angle_degrees: f64,
    pub area: f64,
    /// Counter-clockwise corners
    pub corners: [Point2<f64>; 4],
}

impl InscribedRectangle {
    fn new(center: Point2<f64>, width: f64, height: f64, angle: f64) -> Self {
        let axis_w = Vector2::new(angle.cos(), angle.sin());
        let axis_h = Vector2::new(-angle.sin(), angle.cos());
        let hw = axis_w * (width * 0.5);
        let hh = axis_h * (height * 0.5);
        Self {
            center,
            width,
            height,
            angle_degrees: angle.to_degrees(),
            area: width * height,
            corners: [
                center - hw - hh,
                center + hw - hh,
                center + hw + hh,
                center - hw + hh,
            ],
        }
    }

    /// Corners mapped back into 3D through the basis the polygon was projected with
    pub fn lift(&self, basis: &PlaneBasis) -> [Point3<f64>; 4] {
        self.corners.map(|c| basis.lift(&c, 0.0))
    }
}

/// Ray-casting point-in-polygon test (odd crossing count means inside).
///
/// Points exactly on the boundary may land on either side.
pub fn point_in_polygon(point: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = polygon.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Point-in-polygon that also accepts points within `tolerance` of an edge
pub fn contains_point(point: &Point2<f64>, polygon: &[Point2<f64>], tolerance: f64) -> bool {
    if point_in_polygon(point, polygon) {
        return true;
    }
    let n = polygon.len();
    (0..n).any(|i| distance_to_segment(point, &polygon[i], &polygon[(i + 1) % n]) <= tolerance)
}

#[inline]
fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// True when segments `ab` and `cd` cross at a single interior point.
/// Touching and collinear overlap do not count.
fn segments_cross(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
    tolerance: f64,
) -> bool {
    let side = |v: f64| {
        if v > tolerance {
            1i8
        } else if v < -tolerance {
            -1i8
        } else {
            0i8
        }
    };
    let o1 = side(orient(a, b, c));
    let o2 = side(orient(a, b, d));
    let o3 = side(orient(c, d, a));
    let o4 = side(orient(c, d, b));
    o1 * o2 < 0 && o3 * o4 < 0
}

/// Axis-aligned bounds of a point set
pub fn bounds(points: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

struct Containment<'a> {
    polygon: &'a [Point2<f64>],
    tolerance: f64,
    cross_tolerance: f64,
}

impl Containment<'_> {
    fn accepts(&self, rect: &InscribedRectangle) -> bool {
        let corners = &rect.corners;
        if !corners
            .iter()
            .all(|c| contains_point(c, self.polygon, self.tolerance))
        {
            return false;
        }

        let n = self.polygon.len();
        for k in 0..4 {
            let (a, b) = (&corners[k], &corners[(k + 1) % 4]);
            for i in 0..n {
                let (c, d) = (&self.polygon[i], &self.polygon[(i + 1) % n]);
                if segments_cross(a, b, c, d, self.cross_tolerance) {
                    return false;
                }
            }
        }

        // A reflex vertex poking into the rectangle without any proper
        // crossing (edges running exactly through corners)
        !self
            .polygon
            .iter()
            .any(|p| strictly_inside_rectangle(p, rect, self.tolerance))
    }
}

fn strictly_inside_rectangle(p: &Point2<f64>, rect: &InscribedRectangle, tolerance: f64) -> bool {
    let angle = rect.angle_degrees.to_radians();
    let d = p - rect.center;
    let along_w = d.x * angle.cos() + d.y * angle.sin();
    let along_h = -d.x * angle.sin() + d.y * angle.cos();
    along_w.abs() < rect.width * 0.5 - tolerance && along_h.abs() < rect.height * 0.5 - tolerance
}

/// Search for the largest rectangle inside `polygon` at the given resolution.
///
/// Returns `None` when the polygon has fewer than 3 vertices, a zero-extent
/// bounding box, or when no sampled rectangle fits.
pub fn max_inscribed_rectangle(
    polygon: &[Point2<f64>],
    search: &RectangleSearch,
) -> Option<InscribedRectangle> {
    if polygon.len() < 3
        || search.angle_steps == 0
        || search.grid_resolution == 0
        || search.scale_steps == 0
    {
        return None;
    }

    let (min, max) = bounds(polygon)?;
    let extent = max - min;
    if !(extent.x > 0.0 && extent.y > 0.0) {
        return None;
    }

    let diagonal = extent.norm();
    let containment = Containment {
        polygon,
        tolerance: BOUNDARY_TOLERANCE * diagonal,
        cross_tolerance: BOUNDARY_TOLERANCE * diagonal * diagonal,
    };

    let grid = search.grid_resolution;
    let centers: Vec<Point2<f64>> = (0..=grid)
        .flat_map(|i| (0..=grid).map(move |j| (i, j)))
        .map(|(i, j)| {
            Point2::new(
                min.x + extent.x * i as f64 / grid as f64,
                min.y + extent.y * j as f64 / grid as f64,
            )
        })
        .filter(|c| point_in_polygon(c, polygon))
        .collect();

    let steps = search.scale_steps as f64;
    let mut best: Option<InscribedRectangle> = None;

    for k in 0..search.angle_steps {
        let angle = std::f64::consts::PI * k as f64 / search.angle_steps as f64;
        for center in &centers {
            for a in 1..=search.scale_steps {
                let width = extent.x * a as f64 / steps;
                for b in 1..=search.scale_steps {
                    let height = extent.y * b as f64 / steps;
                    let best_area = best.as_ref().map_or(0.0, |r| r.area);
                    if width * height <= best_area {
                        continue;
                    }

                    let candidate = InscribedRectangle::new(*center, width, height, angle);
                    if containment.accepts(&candidate) {
                        best = Some(candidate);
                    }
                }
            }
        }
    }

    best
}
