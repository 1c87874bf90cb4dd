// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roofsolid Geometry
//!
//! Turns raw 3D roof-boundary polygons into watertight solids and per-roof
//! solar metrics (tilt, azimuth, largest panel rectangle), using nalgebra
//! for the linear algebra.
//!
//! The entry point is [`analyze`]; the stages it chains are public so they
//! can be used on their own.

pub mod align;
pub mod cluster;
pub mod config;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod orientation;
pub mod pipeline;
pub mod plane;
pub mod polygon;
pub mod projection;
pub mod rectangle;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Rotation3, Vector2, Vector3};

pub use align::{alignment_rotation, rotation_between};
pub use cluster::{dedup_polygon, snap_points, snap_polygons, SnapDiagnostics};
pub use config::{PipelineConfig, RectangleSearch};
pub use error::{Error, Result};
pub use extrusion::solidify_polygon;
pub use mesh::{palette_color, Rgba, SolidMesh, SOLID_PALETTE};
pub use orientation::{roof_metrics, LocalFrame, RoofMetrics};
pub use pipeline::{analyze, AnalysisResult, RoofReport, SkipReason, SkippedPolygon, Solid};
pub use plane::plane_normal;
pub use polygon::{ensure_ccw_xy, InputPolygon, Role};
pub use projection::{project_polygon, PlaneBasis};
pub use rectangle::{max_inscribed_rectangle, InscribedRectangle};
pub use triangulation::fan_triangulate;
