// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation
//!
//! Roof facets are triangulated as a fan from their first vertex. That is
//! only correct for convex (or mildly non-convex) outlines; [`is_convex`]
//! lets callers detect and report inputs outside that precondition.

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Check if a polygon is convex (all turn cross products share one sign)
#[inline]
pub fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Fan triangulation `(0, i, i + 1)` for `i = 1..n - 1`.
///
/// Returns flat triangle indices into the input ring.
#[inline]
pub fn fan_triangulate(vertex_count: usize) -> Result<Vec<usize>> {
    if vertex_count < 3 {
        return Err(Error::Solidification(format!(
            "need at least 3 vertices to triangulate, got {}",
            vertex_count
        )));
    }

    let mut indices = Vec::with_capacity((vertex_count - 2) * 3);
    for i in 1..vertex_count - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_square() {
        let indices = fan_triangulate(4).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_fan_triangle() {
        assert_eq!(fan_triangulate(3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_fan_insufficient_points() {
        assert!(fan_triangulate(2).is_err());
        assert!(fan_triangulate(0).is_err());
    }

    #[test]
    fn test_fan_triangle_count() {
        assert_eq!(fan_triangulate(7).unwrap().len(), 5 * 3);
    }

    #[test]
    fn test_convexity() {
        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(is_convex(&square));

        let l_shape = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(!is_convex(&l_shape));
    }
}
