// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roofsolid command-line driver.
//!
//! Reads a polygon batch as JSON, runs the geometry pipeline and produces a
//! JSON response, optionally exporting the solids as OBJ. Accepted request
//! shapes:
//!
//! - `{"sets": [[[x, y, z], ...], ...]}` - roof polygons
//! - `{"roofs": [[[x, y, z], ...], ...]}` - roof polygons
//! - `{"polygons": [{"role": "roof" | "base", "points": [...]}, ...]}`

pub mod cli;
pub mod config;
pub mod output;
pub mod types;

use anyhow::{Context, Result};
use roofsolid_geometry::{analyze, PipelineConfig};
use std::path::Path;
use std::time::Instant;
use types::{AnalyzeRequest, AnalyzeResponse};

/// Run one request end to end.
///
/// `obj_path`, when given, receives the solids as OBJ before the response is
/// built, so the response only names files that exist.
pub fn execute(
    request_json: &str,
    pipeline: &PipelineConfig,
    obj_path: Option<&Path>,
) -> Result<AnalyzeResponse> {
    let start = Instant::now();

    let request: AnalyzeRequest =
        serde_json::from_str(request_json).context("invalid request JSON")?;
    let polygons = request.into_polygons();
    tracing::info!(polygons = polygons.len(), "Received polygon batch");

    let result = analyze(&polygons, pipeline).context("analysis failed")?;

    let file = match obj_path {
        Some(path) => {
            let obj = output::solids_to_obj(&result.solids);
            output::write_atomic(path, obj.as_bytes())?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let response = AnalyzeResponse::from_result(result, file);
    tracing::info!(
        solids = response.solids,
        skipped = response.skipped.len(),
        triangles = response.stats.total_triangles,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request complete"
    );
    Ok(response)
}
