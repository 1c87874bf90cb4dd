// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - thickening a flat polygon into a closed solid

use crate::error::{Error, Result};
use crate::mesh::SolidMesh;
use crate::polygon::dedup_exact;
use crate::triangulation::fan_triangulate;
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

/// Direction solids are thickened in
#[inline]
pub fn extrusion_direction() -> Vector3<f64> {
    -Vector3::z()
}

/// Thicken a counter-clockwise polygon into a closed, outward-facing solid.
///
/// The polygon becomes the top face (fan from its first vertex), a copy offset
/// by `thickness` along -Z becomes the bottom face, and every boundary edge of
/// the fan gets a quad of side wall.
pub fn solidify_polygon(points: &[Point3<f64>], thickness: f64) -> Result<SolidMesh> {
    if !(thickness.is_finite() && thickness > 0.0) {
        return Err(Error::InvalidConfig(format!(
            "thickness must be positive, got {}",
            thickness
        )));
    }

    let ring = dedup_exact(points);
    let n = ring.len();
    let fan = fan_triangulate(n)?;
    if fan.is_empty() {
        return Err(Error::Solidification("fan produced no triangles".to_string()));
    }

    let offset = extrusion_direction() * thickness;
    let mut mesh = SolidMesh::with_capacity(n * 2, fan.len() / 3 * 2 + n * 2);

    for p in &ring {
        mesh.add_vertex(*p);
    }
    for p in &ring {
        mesh.add_vertex(p + offset);
    }

    let bottom = |i: usize| (i + n) as u32;

    // Top and bottom caps
    for tri in fan.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        mesh.add_triangle(a as u32, b as u32, c as u32);
        mesh.add_triangle(bottom(a), bottom(c), bottom(b));
    }

    // Side walls on edges used by exactly one cap triangle
    for (a, b) in boundary_edges(&fan) {
        mesh.add_triangle(a as u32, bottom(b), b as u32);
        mesh.add_triangle(a as u32, bottom(a), bottom(b));
    }

    mesh.remove_unreferenced_vertices();
    if mesh.fix_orientation() {
        tracing::debug!(vertices = n, "Flipped inward-facing solid");
    }

    Ok(mesh)
}

/// Directed edges of a triangulation that belong to a single triangle,
/// in first-seen order
fn boundary_edges(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut counts: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut directed = Vec::with_capacity(indices.len());

    for tri in indices.chunks_exact(3) {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            directed.push((a, b));
        }
    }

    directed
        .into_iter()
        .filter(|&(a, b)| counts.get(&(a.min(b), a.max(b))) == Some(&1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangle(w: f64, h: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(w, 0.0, 0.0),
            Point3::new(w, h, 0.0),
            Point3::new(0.0, h, 0.0),
        ]
    }

    #[test]
    fn test_solidify_rectangle() {
        let mesh = solidify_polygon(&rectangle(4.0, 3.0), 0.25).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        // 2 top + 2 bottom + 4 sides x 2
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.is_watertight());
        assert!(mesh.is_consistently_oriented());
        assert_relative_eq!(mesh.signed_volume(), 3.0, epsilon = 1e-12);

        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.z, -0.25);
        assert_relative_eq!(max.z, 0.0);
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let mut ring = rectangle(2.0, 2.0);
        ring.reverse();
        let mesh = solidify_polygon(&ring, 1.0).unwrap();
        assert!(mesh.is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_top_faces_point_up() {
        let mesh = solidify_polygon(&rectangle(1.0, 1.0), 0.5).unwrap();
        let normals = mesh.face_normals();
        assert_relative_eq!(normals[0], Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(normals[1], -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_non_convex_polygon() {
        // Convex fan anchor (0,0) keeps every fan triangle inside the L
        let l_shape = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let mesh = solidify_polygon(&l_shape, 0.25).unwrap();
        assert!(mesh.is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_tilted_polygon() {
        let ring = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 3.0, 1.5),
            Point3::new(0.0, 3.0, 1.5),
        ];
        let mesh = solidify_polygon(&ring, 0.25).unwrap();
        assert!(mesh.is_watertight());
        // Prism with a vertical offset: volume = projected area x thickness
        assert_relative_eq!(mesh.signed_volume(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_duplicate_points_are_ignored() {
        let mut ring = rectangle(1.0, 1.0);
        ring.push(ring[0]);
        let mesh = solidify_polygon(&ring, 0.1).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert!(mesh.is_watertight());
    }

    #[test]
    fn test_too_few_points() {
        let ring = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert!(matches!(
            solidify_polygon(&ring, 0.25),
            Err(Error::Solidification(_))
        ));

        let mut collapsed = rectangle(1.0, 1.0);
        collapsed.iter_mut().for_each(|p| *p = Point3::origin());
        assert!(solidify_polygon(&collapsed, 0.25).is_err());
    }

    #[test]
    fn test_invalid_thickness() {
        let ring = rectangle(1.0, 1.0);
        assert!(matches!(
            solidify_polygon(&ring, 0.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(solidify_polygon(&ring, f64::NAN).is_err());
    }

    #[test]
    fn test_boundary_edges_of_fan() {
        let edges = boundary_edges(&[0, 1, 2, 0, 2, 3]);
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
    }
}
