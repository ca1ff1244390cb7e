// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall classification heuristics
//!
//! Derives per-wall facts used downstream: outer walls get exterior
//! finishes and skip interior decoration, and the facing direction
//! decides which way attached door/window models swing.

use crate::transform::PlanBounds;
use plan3d_model::{Line, WallClassification};
use rustc_hash::FxHashMap;

/// Tolerance in plan units for axis alignment and boundary contact
pub const AXIS_TOLERANCE: f64 = 5.0;

/// Classify one wall against the plan bounds
///
/// A wall is outer when it is axis-aligned within tolerance and one of
/// its endpoints touches the bounding box of the plan. A wall faces
/// inward when its left-hand normal points strictly toward the plan
/// centroid; a normal perpendicular to the centroid direction faces
/// outward.
pub fn classify_wall(line: &Line, bounds: &PlanBounds) -> WallClassification {
    let (x1, y1) = line.start();
    let (x2, y2) = line.end();
    let dx = x2 - x1;
    let dy = y2 - y1;

    let horizontal = dy.abs() <= AXIS_TOLERANCE;
    let vertical = dx.abs() <= AXIS_TOLERANCE;

    let touches_bounds = [(x1, y1), (x2, y2)].iter().any(|&(x, y)| {
        (x - bounds.min_x).abs() <= AXIS_TOLERANCE
            || (x - bounds.max_x).abs() <= AXIS_TOLERANCE
            || (y - bounds.min_y).abs() <= AXIS_TOLERANCE
            || (y - bounds.max_y).abs() <= AXIS_TOLERANCE
    });

    let is_outer = (horizontal || vertical) && touches_bounds;

    // Left-hand normal of the wall direction
    let (mx, my) = line.midpoint();
    let to_center_x = bounds.center_x() - mx;
    let to_center_y = bounds.center_y() - my;
    let is_facing_inward = (-dy) * to_center_x + dx * to_center_y > 0.0;

    WallClassification {
        is_outer,
        is_facing_inward,
    }
}

/// Classify every wall of the plan, keyed by wall id
pub fn classify_walls(lines: &[Line]) -> FxHashMap<u64, WallClassification> {
    let Some(bounds) = PlanBounds::of_lines(lines) else {
        return FxHashMap::default();
    };

    lines
        .iter()
        .map(|line| (line.id, classify_wall(line, &bounds)))
        .collect()
}
