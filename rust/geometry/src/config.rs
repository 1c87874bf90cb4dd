// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sampling resolution of the inscribed-rectangle search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectangleSearch {
    /// Number of rotation angles sampled over [0°, 180°).
    pub angle_steps: usize,
    /// Grid subdivisions per bounding-box axis for candidate centers.
    pub grid_resolution: usize,
    /// Number of width/height scale factors (10%..100% for 10 steps).
    pub scale_steps: usize,
}

impl Default for RectangleSearch {
    fn default() -> Self {
        Self {
            angle_steps: 36,
            grid_resolution: 20,
            scale_steps: 10,
        }
    }
}

impl RectangleSearch {
    /// Number of rectangle candidates the search may evaluate per polygon.
    pub fn candidate_budget(&self) -> usize {
        let grid = self.grid_resolution + 1;
        self.angle_steps * grid * grid * self.scale_steps * self.scale_steps
    }
}

/// Configuration for [`crate::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cross-polygon snapping distance. `<= 0` disables snapping.
    pub snap_tolerance: f64,
    /// Within-polygon duplicate vertex distance. `<= 0` only drops exact repeats.
    pub dedup_tolerance: f64,
    /// Solid thickness, extruded along -Z.
    pub wall_thickness: f64,
    /// Inscribed-rectangle sampling resolution.
    pub rectangle: RectangleSearch,
    /// Roofs with tilt at or below this angle are flat and get no azimuth.
    pub flat_threshold_degrees: f64,
    /// Elevation base polygons are flattened onto, in the re-centered scene frame.
    pub base_elevation: f64,
    /// Local up vector. Derived from the scene centroid when absent.
    pub up: Option<[f64; 3]>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 0.8,
            dedup_tolerance: 1e-3,
            wall_thickness: 0.25,
            rectangle: RectangleSearch::default(),
            flat_threshold_degrees: 5.0,
            base_elevation: 0.0,
            up: None,
        }
    }
}

impl PipelineConfig {
    /// Check every field before any geometry work starts.
    pub fn validate(&self) -> Result<()> {
        if self.snap_tolerance.is_nan() {
            return Err(Error::InvalidConfig("snap_tolerance is NaN".to_string()));
        }
        if self.dedup_tolerance.is_nan() {
            return Err(Error::InvalidConfig("dedup_tolerance is NaN".to_string()));
        }
        if !(self.wall_thickness.is_finite() && self.wall_thickness > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "wall_thickness must be positive, got {}",
                self.wall_thickness
            )));
        }
        if self.rectangle.angle_steps == 0
            || self.rectangle.grid_resolution == 0
            || self.rectangle.scale_steps == 0
        {
            return Err(Error::InvalidConfig(
                "rectangle search steps must all be positive".to_string(),
            ));
        }
        if !(0.0..=90.0).contains(&self.flat_threshold_degrees) {
            return Err(Error::InvalidConfig(format!(
                "flat_threshold_degrees must be within [0, 90], got {}",
                self.flat_threshold_degrees
            )));
        }
        if !self.base_elevation.is_finite() {
            return Err(Error::InvalidConfig("base_elevation must be finite".to_string()));
        }
        if let Some(up) = self.up {
            let norm = (up[0] * up[0] + up[1] * up[1] + up[2] * up[2]).sqrt();
            if !(norm.is_finite() && norm > 1e-12) {
                return Err(Error::InvalidConfig("up vector must be non-zero".to_string()));
            }
        }
        Ok(())
    }
}
