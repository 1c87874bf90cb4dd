// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line arguments.

use crate::config::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "roofsolid")]
#[command(version, about = "Turn roof polygons into watertight solids and solar metrics")]
pub struct Cli {
    /// Request JSON file ("-" or absent reads stdin)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Response JSON file (absent writes stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also export the solids as a Wavefront OBJ file
    #[arg(long)]
    pub obj: Option<PathBuf>,

    /// Pretty-print the response JSON
    #[arg(long)]
    pub pretty: bool,

    /// Cross-polygon snapping distance (<= 0 disables snapping)
    #[arg(long, allow_negative_numbers = true)]
    pub snap_tolerance: Option<f64>,

    /// Within-polygon duplicate vertex distance
    #[arg(long)]
    pub dedup_tolerance: Option<f64>,

    /// Solid thickness
    #[arg(long)]
    pub wall_thickness: Option<f64>,

    /// Rectangle search: rotation angles over [0, 180)
    #[arg(long)]
    pub angle_steps: Option<usize>,

    /// Rectangle search: centre grid subdivisions per axis
    #[arg(long)]
    pub grid_resolution: Option<usize>,

    /// Rectangle search: width/height scale factors
    #[arg(long)]
    pub scale_steps: Option<usize>,

    /// Tilt (degrees) at or below which a roof is flat
    #[arg(long)]
    pub flat_threshold: Option<f64>,

    /// Elevation base polygons are flattened onto
    #[arg(long, allow_negative_numbers = true)]
    pub base_elevation: Option<f64>,

    /// Local up vector as x,y,z (derived from the scene when absent)
    #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
    pub up: Option<Vec<f64>>,

    /// Log format on stderr: pretty or json
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Input path, or `None` for stdin
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }
}
