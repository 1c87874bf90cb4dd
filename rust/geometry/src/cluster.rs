// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex clustering
//!
//! Single-linkage clustering under Euclidean distance: two points belong to
//! the same cluster when a chain of points links them with every hop `<= τ`.
//! Every point is then replaced by its cluster centroid. Clusters whose
//! centroids end up within `τ` of each other are merged and their centroid
//! recomputed until no two centroids are that close, so snapping an already
//! snapped set is a no-op.
//!
//! Used twice by the pipeline:
//! - within one polygon to drop coincident vertices before triangulation
//! - across the whole batch to close small gaps between adjacent roof facets
//!   so shared edges become exactly coincident
//!
//! Neighbour search goes through a uniform grid with cell size `τ`, so only
//! the 27 surrounding cells are probed per point instead of all pairs.

use crate::polygon::dedup_exact;
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Counters reported by a clustering pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapDiagnostics {
    /// Points fed into the pass
    pub points_in: usize,
    /// Distinct clusters (output positions)
    pub clusters_out: usize,
    /// `points_in - clusters_out`
    pub points_merged: usize,
}

impl SnapDiagnostics {
    fn new(points_in: usize, clusters_out: usize) -> Self {
        Self {
            points_in,
            clusters_out,
            points_merged: points_in - clusters_out,
        }
    }
}

/// Disjoint-set forest with path halving and union by size
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

type CellKey = (i64, i64, i64);

#[inline]
fn cell_of(p: &Point3<f64>, inv_cell: f64) -> CellKey {
    (
        (p.x * inv_cell).floor() as i64,
        (p.y * inv_cell).floor() as i64,
        (p.z * inv_cell).floor() as i64,
    )
}

/// Assign a cluster label to every point.
///
/// Returns `(labels, cluster_count)`; labels are dense and numbered in order
/// of first appearance.
pub fn cluster_labels(points: &[Point3<f64>], tolerance: f64) -> (Vec<usize>, usize) {
    let n = points.len();
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        return ((0..n).collect(), n);
    }

    let inv_cell = 1.0 / tolerance;
    let tolerance_sq = tolerance * tolerance;
    let mut grid: FxHashMap<CellKey, SmallVec<[usize; 4]>> = FxHashMap::default();
    let mut sets = UnionFind::new(n);

    for (i, p) in points.iter().enumerate() {
        let (cx, cy, cz) = cell_of(p, inv_cell);
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                for dz in -1..=1i64 {
                    // Cells saturate at the i64 range for tiny tolerances
                    let (Some(nx), Some(ny), Some(nz)) =
                        (cx.checked_add(dx), cy.checked_add(dy), cz.checked_add(dz))
                    else {
                        continue;
                    };
                    if let Some(bucket) = grid.get(&(nx, ny, nz)) {
                        for &j in bucket {
                            if (points[j] - p).norm_squared() <= tolerance_sq {
                                sets.union(i, j);
                            }
                        }
                    }
                }
            }
        }
        grid.entry((cx, cy, cz)).or_default().push(i);
    }

    let mut root_label: FxHashMap<usize, usize> = FxHashMap::default();
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let root = sets.find(i);
        let next = root_label.len();
        labels.push(*root_label.entry(root).or_insert(next));
    }
    let count = root_label.len();
    (labels, count)
}

/// Centroid of every cluster, computed from the original member points.
///
/// The centroid is the first member plus the mean offset, so a cluster of
/// identical points maps back onto exactly the same coordinates.
fn cluster_centroids(points: &[Point3<f64>], labels: &[usize], count: usize) -> Vec<Point3<f64>> {
    let mut anchors: Vec<Option<Point3<f64>>> = vec![None; count];
    let mut offsets = vec![Vector3::zeros(); count];
    let mut members = vec![0usize; count];
    for (p, &label) in points.iter().zip(labels) {
        let anchor = *anchors[label].get_or_insert(*p);
        offsets[label] += p - anchor;
        members[label] += 1;
    }

    anchors
        .iter()
        .zip(offsets.iter().zip(&members))
        .map(|(anchor, (offset, &m))| match anchor {
            Some(a) => a + offset / m as f64,
            None => Point3::origin(),
        })
        .collect()
}

/// Replace every point with the centroid of its cluster.
///
/// On return no two distinct output positions lie within `tolerance` of each
/// other. A tolerance of zero, a negative tolerance, or a non-finite one
/// leaves the points untouched.
pub fn snap_points(points: &[Point3<f64>], tolerance: f64) -> (Vec<Point3<f64>>, SnapDiagnostics) {
    let (mut labels, mut count) = cluster_labels(points, tolerance);
    if count == points.len() {
        return (points.to_vec(), SnapDiagnostics::new(points.len(), count));
    }

    let mut centroids = cluster_centroids(points, &labels, count);
    // Each round strictly lowers the cluster count, so this terminates
    loop {
        let (merged, merged_count) = cluster_labels(&centroids, tolerance);
        if merged_count == count {
            break;
        }
        for label in labels.iter_mut() {
            *label = merged[*label];
        }
        count = merged_count;
        centroids = cluster_centroids(points, &labels, count);
    }

    let snapped = labels.iter().map(|&label| centroids[label]).collect();
    (snapped, SnapDiagnostics::new(points.len(), count))
}

/// Snap vertices across a batch of polygons so nearby corners coincide.
///
/// Polygon boundaries are preserved: the output has one polygon per input
/// polygon with the same vertex count (duplicates are removed separately).
pub fn snap_polygons(
    polygons: &[Vec<Point3<f64>>],
    tolerance: f64,
) -> (Vec<Vec<Point3<f64>>>, SnapDiagnostics) {
    let flat: Vec<Point3<f64>> = polygons.iter().flatten().copied().collect();
    let (snapped, diagnostics) = snap_points(&flat, tolerance);

    let mut out = Vec::with_capacity(polygons.len());
    let mut offset = 0;
    for polygon in polygons {
        out.push(snapped[offset..offset + polygon.len()].to_vec());
        offset += polygon.len();
    }

    tracing::debug!(
        points_in = diagnostics.points_in,
        clusters_out = diagnostics.clusters_out,
        points_merged = diagnostics.points_merged,
        tolerance,
        "Cross-polygon snapping"
    );

    (out, diagnostics)
}

/// Remove coincident and near-coincident vertices of one polygon.
///
/// Vertices within `tolerance` of each other collapse to their centroid and
/// only the first occurrence of each cluster is kept, in original order.
/// A closing vertex repeating the first one is dropped as well.
pub fn dedup_polygon(points: &[Point3<f64>], tolerance: f64) -> Vec<Point3<f64>> {
    let (snapped, _) = snap_points(points, tolerance);
    dedup_exact(&snapped)
}
