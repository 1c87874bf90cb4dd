// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch analysis: raw roof/base polygons to solids and roof metrics
//!
//! Stages, in order:
//! 1. drop polygons with fewer than 3 points
//! 2. re-centre on the scene origin (mean of all raw points)
//! 3. per-polygon dedup, cross-polygon snap, exact dedup
//! 4. plane per polygon, tilt/azimuth for roofs in the pre-alignment frame
//! 5. one alignment rotation for all roofs, bases flattened
//! 6. winding fix-up, panel rectangle search on each roof
//! 7. solidification
//!
//! Polygons that fail a stage are skipped and reported; the batch only fails
//! when nothing usable remains.

use crate::align::{alignment_rotation, flatten_polygon, rotate_polygon};
use crate::cluster::{dedup_polygon, snap_polygons, SnapDiagnostics};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::extrusion::solidify_polygon;
use crate::mesh::{palette_color, SolidMesh};
use crate::orientation::{local_up, metrics_from_normal, RoofMetrics};
use crate::plane::plane_normal;
use crate::polygon::{centroid, dedup_exact, ensure_ccw_xy, polygon_area, InputPolygon, Role};
use crate::projection::project_polygon;
use crate::rectangle::{max_inscribed_rectangle, InscribedRectangle};
use crate::triangulation::is_convex;
use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Why a polygon produced no solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooFewPoints,
    DegeneratePolygon,
    SolidificationFailure,
}

/// A polygon dropped from the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPolygon {
    /// Position in the input batch
    pub index: usize,
    pub role: Role,
    pub reason: SkipReason,
    pub detail: String,
}

/// Metrics for one roof that made it through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoofReport {
    pub index: usize,
    pub metrics: RoofMetrics,
    /// Largest panel rectangle, in the roof's own 2D frame
    pub rectangle: Option<InscribedRectangle>,
    /// Panel rectangle corners in the input coordinate frame
    pub panel_corners: Option<[Point3<f64>; 4]>,
    /// Area of the cleaned roof polygon
    pub surface_area: f64,
    /// False when the fan triangulation may overlap itself
    pub convex: bool,
}

/// A closed solid built from one input polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub index: usize,
    pub role: Role,
    pub mesh: SolidMesh,
}

/// Everything [`analyze`] produces for a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Solids in input order, expressed in the re-centred, aligned frame
    pub solids: Vec<Solid>,
    pub roofs: Vec<RoofReport>,
    pub snap: SnapDiagnostics,
    /// Sorted by input index
    pub skipped: Vec<SkippedPolygon>,
    /// Scene origin subtracted from every input point
    pub origin: Point3<f64>,
    /// Local up vector used for tilt and azimuth
    pub up: Vector3<f64>,
    /// Rotation applied to roof polygons after re-centring
    pub rotation: Rotation3<f64>,
}

impl AnalysisResult {
    /// All solids merged into one mesh
    pub fn combined_mesh(&self) -> SolidMesh {
        SolidMesh::concatenate(self.solids.iter().map(|s| &s.mesh))
    }
}

struct Candidate {
    index: usize,
    role: Role,
    points: Vec<Point3<f64>>,
}

struct Skips(Vec<SkippedPolygon>);

impl Skips {
    fn record(&mut self, index: usize, role: Role, reason: SkipReason, detail: String) {
        tracing::warn!(index, ?role, ?reason, %detail, "Skipping polygon");
        self.0.push(SkippedPolygon {
            index,
            role,
            reason,
            detail,
        });
    }
}

fn all_finite(points: &[Point3<f64>]) -> bool {
    points.iter().all(|p| p.coords.iter().all(|c| c.is_finite()))
}

/// Run the full pipeline over a batch of polygons.
///
/// Deterministic and free of I/O. Per-polygon failures are recorded in
/// [`AnalysisResult::skipped`]; errors are returned only for an invalid
/// configuration, an empty batch, or a batch that yields no solid at all.
pub fn analyze(polygons: &[InputPolygon], config: &PipelineConfig) -> Result<AnalysisResult> {
    config.validate()?;

    let mut skips = Skips(Vec::new());

    let mut candidates: Vec<Candidate> = Vec::with_capacity(polygons.len());
    for (index, polygon) in polygons.iter().enumerate() {
        if polygon.points.len() < 3 {
            skips.record(
                index,
                polygon.role,
                SkipReason::TooFewPoints,
                format!("{} raw point(s)", polygon.points.len()),
            );
        } else if !all_finite(&polygon.points) {
            skips.record(
                index,
                polygon.role,
                SkipReason::DegeneratePolygon,
                "non-finite coordinate".to_string(),
            );
        } else {
            candidates.push(Candidate {
                index,
                role: polygon.role,
                points: polygon.points.clone(),
            });
        }
    }
    if candidates.is_empty() {
        return Err(Error::EmptyInput);
    }

    // Scene origin and local up from the raw points
    let raw: Vec<Point3<f64>> = candidates.iter().flat_map(|c| c.points.iter().copied()).collect();
    let origin = centroid(&raw).ok_or(Error::EmptyInput)?;
    let up = match config.up {
        Some([x, y, z]) => Vector3::new(x, y, z).normalize(),
        None => local_up(&origin),
    };
    tracing::debug!(
        polygons = candidates.len(),
        origin = ?origin.coords.as_slice(),
        up = ?up.as_slice(),
        "Scene frame"
    );

    // Re-centre and clean
    let deduped: Vec<Vec<Point3<f64>>> = candidates
        .iter()
        .map(|c| {
            let local: Vec<Point3<f64>> = c.points.iter().map(|p| Point3::from(p - origin)).collect();
            dedup_polygon(&local, config.dedup_tolerance)
        })
        .collect();
    let (snapped, snap) = snap_polygons(&deduped, config.snap_tolerance);

    let mut cleaned: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for (candidate, points) in candidates.into_iter().zip(snapped) {
        let points = dedup_exact(&points);
        if points.len() < 3 {
            skips.record(
                candidate.index,
                candidate.role,
                SkipReason::TooFewPoints,
                format!("{} distinct point(s) after snapping", points.len()),
            );
        } else {
            cleaned.push(Candidate { points, ..candidate });
        }
    }
    if cleaned.is_empty() {
        return Err(Error::EmptyInput);
    }

    // Planes and pre-alignment metrics
    let mut planar: Vec<(Candidate, Option<RoofMetrics>)> = Vec::with_capacity(cleaned.len());
    for candidate in cleaned {
        let Some(normal) = plane_normal(&candidate.points) else {
            skips.record(
                candidate.index,
                candidate.role,
                SkipReason::DegeneratePolygon,
                "leading vertices are collinear".to_string(),
            );
            continue;
        };
        let metrics = match candidate.role {
            Role::Roof => Some(metrics_from_normal(
                &normal,
                &up,
                config.flat_threshold_degrees,
            )),
            Role::Base => None,
        };
        planar.push((candidate, metrics));
    }

    let roof_polygons: Vec<Vec<Point3<f64>>> = planar
        .iter()
        .filter(|(c, _)| c.role == Role::Roof)
        .map(|(c, _)| c.points.clone())
        .collect();
    let rotation = alignment_rotation(&roof_polygons);
    let inverse = rotation.inverse();

    let mut solids = Vec::with_capacity(planar.len());
    let mut roofs = Vec::new();

    for (candidate, metrics) in planar {
        let placed = match candidate.role {
            Role::Roof => rotate_polygon(&candidate.points, &rotation),
            Role::Base => flatten_polygon(&candidate.points, config.base_elevation),
        };
        let ring = ensure_ccw_xy(&placed);

        if plane_normal(&ring).is_none() {
            skips.record(
                candidate.index,
                candidate.role,
                SkipReason::DegeneratePolygon,
                "no area after placement".to_string(),
            );
            continue;
        }

        let report = metrics.map(|metrics| {
            let mut report = RoofReport {
                index: candidate.index,
                metrics,
                rectangle: None,
                panel_corners: None,
                surface_area: polygon_area(&ring),
                convex: true,
            };
            if let Some((basis, ring2d)) = project_polygon(&ring) {
                report.convex = is_convex(&ring2d);
                if !report.convex {
                    tracing::warn!(
                        index = candidate.index,
                        "Non-convex roof, fan triangulation may overlap"
                    );
                }
                report.rectangle = max_inscribed_rectangle(&ring2d, &config.rectangle);
                report.panel_corners = report.rectangle.map(|rect| {
                    rect.lift(&basis)
                        .map(|p| inverse * p + origin.coords)
                });
            }
            report
        });

        match solidify_polygon(&ring, config.wall_thickness) {
            Ok(mut mesh) => {
                mesh.paint(palette_color(solids.len()));
                tracing::debug!(
                    index = candidate.index,
                    role = ?candidate.role,
                    vertices = mesh.vertex_count(),
                    triangles = mesh.triangle_count(),
                    "Solidified polygon"
                );
                solids.push(Solid {
                    index: candidate.index,
                    role: candidate.role,
                    mesh,
                });
                roofs.extend(report);
            }
            Err(e) => {
                skips.record(
                    candidate.index,
                    candidate.role,
                    SkipReason::SolidificationFailure,
                    e.to_string(),
                );
            }
        }
    }

    let mut skipped = skips.0;
    skipped.sort_by_key(|s| s.index);

    if solids.is_empty() {
        return Err(Error::NoSolids {
            skipped: skipped.len(),
        });
    }

    tracing::info!(
        input = polygons.len(),
        solids = solids.len(),
        roofs = roofs.len(),
        skipped = skipped.len(),
        points_merged = snap.points_merged,
        "Analysis complete"
    );

    Ok(AnalysisResult {
        solids,
        roofs,
        snap,
        skipped,
        origin,
        up,
        rotation,
    })
}
