// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for model validation
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised at the edit boundary, before any geometry runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("wall {0} is degenerate (zero length)")]
    DegenerateWall(u64),

    #[error("opening {id} has non-positive dimensions {width}x{height}")]
    InvalidOpeningSize { id: u64, width: f64, height: f64 },

    #[error("opening {shape_id} references missing wall {wall_id}")]
    DanglingWallRef { shape_id: u64, wall_id: u64 },

    #[error("openings {first} and {second} overlap on wall {wall_id}")]
    OverlappingOpenings {
        wall_id: u64,
        first: u64,
        second: u64,
    },
}
