// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response payloads.

use roofsolid_geometry::{AnalysisResult, RoofReport, SkippedPolygon, SnapDiagnostics};
use serde::{Deserialize, Serialize};

/// Successful analysis response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// OBJ export path, when one was written.
    pub file: Option<String>,
    /// Per-roof metrics and panel rectangles.
    pub roofs: Vec<RoofReport>,
    /// Cross-polygon snapping counters.
    pub snap: SnapDiagnostics,
    /// Polygons that produced no solid.
    pub skipped: Vec<SkippedPolygon>,
    /// Number of solids generated.
    pub solids: usize,
    /// Geometry totals over all solids.
    pub stats: MeshStats,
    /// Scene origin subtracted before processing.
    pub origin: [f64; 3],
    /// Local up vector used for tilt and azimuth.
    pub up: [f64; 3],
}

/// Geometry totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    pub total_vertices: usize,
    pub total_triangles: usize,
    pub total_volume: f64,
}

impl AnalyzeResponse {
    pub fn from_result(result: AnalysisResult, file: Option<String>) -> Self {
        let stats = result.solids.iter().fold(MeshStats::default(), |mut acc, s| {
            acc.total_vertices += s.mesh.vertex_count();
            acc.total_triangles += s.mesh.triangle_count();
            acc.total_volume += s.mesh.signed_volume();
            acc
        });

        Self {
            file,
            solids: result.solids.len(),
            stats,
            origin: [result.origin.x, result.origin.y, result.origin.z],
            up: [result.up.x, result.up.y, result.up.z],
            roofs: result.roofs,
            snap: result.snap,
            skipped: result.skipped,
        }
    }
}

/// Failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// Full error chain, outermost first.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            error: format!("{:#}", err),
        }
    }
}
