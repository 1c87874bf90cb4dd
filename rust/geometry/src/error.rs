// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning roof polygons into solids
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Empty input: no polygon with at least 3 distinct points")]
    EmptyInput,

    #[error("Degenerate polygon: {0}")]
    DegeneratePolygon(String),

    #[error("Solidification failed: {0}")]
    Solidification(String),

    #[error("No solids produced ({skipped} polygon(s) skipped)")]
    NoSolids { skipped: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
