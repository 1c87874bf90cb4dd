// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::opaque(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    /// `#rrggbb` form (alpha dropped)
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Normalised `[r, g, b, a]` in `0.0..=1.0`
    pub fn to_f32(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Preview colours, cycled by solid index
pub const SOLID_PALETTE: [Rgba; 4] = [
    Rgba::opaque(0x4b, 0x00, 0x00),
    Rgba::opaque(0x00, 0x33, 0x00),
    Rgba::opaque(0x00, 0x00, 0x4b),
    Rgba::opaque(0x4b, 0x3b, 0x00),
];

#[inline]
pub fn palette_color(index: usize) -> Rgba {
    SOLID_PALETTE[index % SOLID_PALETTE.len()]
}

/// Indexed triangle mesh with per-triangle colour, kept in f64
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolidMesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
    /// One entry per triangle
    pub face_colors: Vec<Rgba>,
}

impl SolidMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            face_colors: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    /// Add a triangle with the default colour
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.triangles.push([i0, i1, i2]);
        self.face_colors.push(Rgba::default());
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Paint every triangle with one colour
    pub fn paint(&mut self, color: Rgba) {
        self.face_colors.clear();
        self.face_colors.resize(self.triangles.len(), color);
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &SolidMesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + vertex_offset, t[1] + vertex_offset, t[2] + vertex_offset]),
        );
        self.face_colors.extend_from_slice(&other.face_colors);
    }

    /// Concatenate meshes into one
    pub fn concatenate<'a>(meshes: impl IntoIterator<Item = &'a SolidMesh>) -> SolidMesh {
        let mut combined = SolidMesh::new();
        for mesh in meshes {
            combined.merge(mesh);
        }
        combined
    }

    /// Corner positions of triangle `index`
    #[inline]
    pub fn triangle_points(&self, index: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Axis-aligned bounds, `None` for a mesh without vertices
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for v in &self.vertices {
            min = min.inf(v);
            max = max.sup(v);
        }
        Some((min, max))
    }

    /// Unnormalised (area-weighted) normal per triangle
    fn weighted_face_normals(&self) -> impl Iterator<Item = Vector3<f64>> + '_ {
        (0..self.triangles.len()).map(|i| {
            let [a, b, c] = self.triangle_points(i);
            (b - a).cross(&(c - a))
        })
    }

    /// Unit normal per triangle (zero for degenerate triangles)
    pub fn face_normals(&self) -> Vec<Vector3<f64>> {
        self.weighted_face_normals()
            .map(|n| n.try_normalize(1e-12).unwrap_or_else(Vector3::zeros))
            .collect()
    }

    /// Area-weighted smooth normal per vertex
    pub fn vertex_normals(&self) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for (tri, normal) in self.triangles.iter().zip(self.weighted_face_normals()) {
            for &i in tri {
                normals[i as usize] += normal;
            }
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize(1e-12).unwrap_or_else(Vector3::zeros))
            .collect()
    }

    /// Total triangle area
    pub fn surface_area(&self) -> f64 {
        self.weighted_face_normals().map(|n| n.norm() * 0.5).sum()
    }

    /// Signed enclosed volume; positive when triangles face outward
    pub fn signed_volume(&self) -> f64 {
        let Some(origin) = self.vertices.first() else {
            return 0.0;
        };
        // Relative to the first vertex to keep precision for large coordinates
        (0..self.triangles.len())
            .map(|i| {
                let [a, b, c] = self.triangle_points(i);
                let (a, b, c) = (a - origin, b - origin, c - origin);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Number of triangles using each undirected edge
    pub fn edge_incidence(&self) -> FxHashMap<(u32, u32), usize> {
        let mut counts: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        for tri in &self.triangles {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Every undirected edge is shared by exactly two triangles
    pub fn is_watertight(&self) -> bool {
        !self.is_empty() && self.edge_incidence().values().all(|&count| count == 2)
    }

    /// Every directed edge appears once and its reverse once
    pub fn is_consistently_oriented(&self) -> bool {
        let mut directed: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        for tri in &self.triangles {
            for k in 0..3 {
                *directed.entry((tri[k], tri[(k + 1) % 3])).or_insert(0) += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Drop vertices no triangle references and remap indices
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let mut remap = vec![u32::MAX; self.vertices.len()];
        for tri in &self.triangles {
            for &i in tri {
                remap[i as usize] = 0;
            }
        }

        let mut kept = Vec::with_capacity(self.vertices.len());
        for (i, slot) in remap.iter_mut().enumerate() {
            if *slot == 0 {
                *slot = kept.len() as u32;
                kept.push(self.vertices[i]);
            }
        }

        let removed = self.vertices.len() - kept.len();
        if removed > 0 {
            for tri in &mut self.triangles {
                for i in tri.iter_mut() {
                    *i = remap[*i as usize];
                }
            }
            self.vertices = kept;
        }
        removed
    }

    /// Reverse the winding of every triangle
    pub fn flip(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
    }

    /// Flip all triangles when the mesh encloses negative volume.
    /// Returns true when a flip happened.
    pub fn fix_orientation(&mut self) -> bool {
        if self.signed_volume() < 0.0 {
            self.flip();
            true
        } else {
            false
        }
    }

    /// Flattened `x, y, z` positions for export
    pub fn positions_f32(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Flattened smooth vertex normals for export
    pub fn normals_f32(&self) -> Vec<f32> {
        self.vertex_normals()
            .iter()
            .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32])
            .collect()
    }

    /// Flattened triangle indices for export
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit tetrahedron with outward faces
    fn tetrahedron() -> SolidMesh {
        let mut mesh = SolidMesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
        mesh.add_triangle(0, 2, 1);
        mesh.add_triangle(0, 1, 3);
        mesh.add_triangle(1, 2, 3);
        mesh.add_triangle(0, 3, 2);
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = SolidMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.bounds().is_none());
        assert!(!mesh.is_watertight());
    }

    #[test]
    fn test_tetrahedron_is_closed_and_outward() {
        let mesh = tetrahedron();
        assert!(mesh.is_watertight());
        assert!(mesh.is_consistently_oriented());
        assert_relative_eq!(mesh.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fix_orientation_flips_inverted_mesh() {
        let mut mesh = tetrahedron();
        mesh.flip();
        assert!(mesh.signed_volume() < 0.0);
        assert!(mesh.fix_orientation());
        assert!(mesh.signed_volume() > 0.0);
        assert!(!mesh.fix_orientation());
    }

    #[test]
    fn test_open_mesh_is_not_watertight() {
        let mut mesh = tetrahedron();
        mesh.triangles.pop();
        mesh.face_colors.pop();
        assert!(!mesh.is_watertight());
    }

    #[test]
    fn test_remove_unreferenced_vertices() {
        let mut mesh = SolidMesh::new();
        mesh.add_vertex(Point3::new(9.0, 9.0, 9.0));
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(1, 2, 3);

        assert_eq!(mesh.remove_unreferenced_vertices(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices[0], Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_merge() {
        let mut a = tetrahedron();
        let b = tetrahedron();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.triangle_count(), 8);
        assert_eq!(a.face_colors.len(), 8);
        assert_eq!(a.triangles[4], [4, 6, 5]);
    }

    #[test]
    fn test_concatenate() {
        let meshes = vec![tetrahedron(), SolidMesh::new(), tetrahedron()];
        let combined = SolidMesh::concatenate(&meshes);
        assert_eq!(combined.triangle_count(), 8);
        assert_relative_eq!(combined.signed_volume(), 2.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_surface_area_and_normals() {
        let mesh = tetrahedron();
        let expected = 1.5 + 3.0f64.sqrt() / 2.0;
        assert_relative_eq!(mesh.surface_area(), expected, epsilon = 1e-12);

        let normals = mesh.face_normals();
        assert_relative_eq!(normals[0], -Vector3::z(), epsilon = 1e-12);
        assert_eq!(mesh.vertex_normals().len(), 4);
    }

    #[test]
    fn test_export_buffers() {
        let mesh = tetrahedron();
        assert_eq!(mesh.positions_f32().len(), 12);
        assert_eq!(mesh.normals_f32().len(), 12);
        assert_eq!(mesh.indices()[..3], [0, 2, 1]);
    }

    #[test]
    fn test_bounds() {
        let (min, max) = tetrahedron().bounds().unwrap();
        assert_eq!(min, Point3::origin());
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_rgba_hex() {
        let color = Rgba::from_hex("#4b3b00").unwrap();
        assert_eq!(color, Rgba::opaque(0x4b, 0x3b, 0x00));
        assert_eq!(color.to_hex(), "#4b3b00");
        assert_eq!(Rgba::from_hex("ff000080").unwrap().a, 0x80);
        assert!(Rgba::from_hex("#12345").is_none());
        assert!(Rgba::from_hex("#zz0000").is_none());
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), palette_color(4));
        assert_eq!(palette_color(1).to_hex(), "#003300");
        let mut mesh = tetrahedron();
        mesh.paint(palette_color(2));
        assert!(mesh.face_colors.iter().all(|c| c.to_hex() == "#00004b"));
    }
}
