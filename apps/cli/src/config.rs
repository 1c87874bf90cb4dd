// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration loaded from environment variables, then overridden by flags.

use crate::cli::Cli;
use roofsolid_geometry::PipelineConfig;
use std::str::FromStr;

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected pretty or json)", other)),
        }
    }
}

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Geometry pipeline settings.
    pub pipeline: PipelineConfig,
    /// Log output format.
    pub log_format: LogFormat,
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source. Unset or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            snap_tolerance: parse_or(&lookup, "ROOFSOLID_SNAP_TOLERANCE", defaults.snap_tolerance),
            dedup_tolerance: parse_or(&lookup, "ROOFSOLID_DEDUP_TOLERANCE", defaults.dedup_tolerance),
            wall_thickness: parse_or(&lookup, "ROOFSOLID_WALL_THICKNESS", defaults.wall_thickness),
            rectangle: roofsolid_geometry::RectangleSearch {
                angle_steps: parse_or(
                    &lookup,
                    "ROOFSOLID_ANGLE_STEPS",
                    defaults.rectangle.angle_steps,
                ),
                grid_resolution: parse_or(
                    &lookup,
                    "ROOFSOLID_GRID_RESOLUTION",
                    defaults.rectangle.grid_resolution,
                ),
                scale_steps: parse_or(
                    &lookup,
                    "ROOFSOLID_SCALE_STEPS",
                    defaults.rectangle.scale_steps,
                ),
            },
            flat_threshold_degrees: parse_or(
                &lookup,
                "ROOFSOLID_FLAT_THRESHOLD",
                defaults.flat_threshold_degrees,
            ),
            base_elevation: parse_or(&lookup, "ROOFSOLID_BASE_ELEVATION", defaults.base_elevation),
            up: None,
        };

        Self {
            pipeline,
            log_format: parse_or(&lookup, "ROOFSOLID_LOG_FORMAT", LogFormat::Pretty),
        }
    }

    /// Apply command-line overrides on top of this configuration.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        let p = &mut self.pipeline;
        if let Some(v) = cli.snap_tolerance {
            p.snap_tolerance = v;
        }
        if let Some(v) = cli.dedup_tolerance {
            p.dedup_tolerance = v;
        }
        if let Some(v) = cli.wall_thickness {
            p.wall_thickness = v;
        }
        if let Some(v) = cli.angle_steps {
            p.rectangle.angle_steps = v;
        }
        if let Some(v) = cli.grid_resolution {
            p.rectangle.grid_resolution = v;
        }
        if let Some(v) = cli.scale_steps {
            p.rectangle.scale_steps = v;
        }
        if let Some(v) = cli.flat_threshold {
            p.flat_threshold_degrees = v;
        }
        if let Some(v) = cli.base_elevation {
            p.base_elevation = v;
        }
        if let Some(up) = &cli.up {
            if let [x, y, z] = up[..] {
                p.up = Some([x, y, z]);
            }
        }
        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ROOFSOLID_SNAP_TOLERANCE", "0.1"),
            ("ROOFSOLID_WALL_THICKNESS", " 0.5 "),
            ("ROOFSOLID_ANGLE_STEPS", "18"),
            ("ROOFSOLID_LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.pipeline.snap_tolerance, 0.1);
        assert_eq!(config.pipeline.wall_thickness, 0.5);
        assert_eq!(config.pipeline.rectangle.angle_steps, 18);
        assert_eq!(config.pipeline.rectangle.grid_resolution, 20);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("ROOFSOLID_GRID_RESOLUTION", "lots"),
            ("ROOFSOLID_LOG_FORMAT", "xml"),
        ]));
        assert_eq!(config.pipeline.rectangle.grid_resolution, 20);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from([
            "roofsolid",
            "--snap-tolerance",
            "0.2",
            "--up",
            "0,0,1",
            "--log-format",
            "json",
        ]);
        let config = Config::from_lookup(lookup(&[("ROOFSOLID_SNAP_TOLERANCE", "0.1")])).with_cli(&cli);
        assert_eq!(config.pipeline.snap_tolerance, 0.2);
        assert_eq!(config.pipeline.up, Some([0.0, 0.0, 1.0]));
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
