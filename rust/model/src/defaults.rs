// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan-space constants shared across the pipeline

/// Plan units per meter of world space (the 2D editor authors in these units)
pub const PLAN_UNITS_PER_METER: f64 = 100.0;

/// Default wall height in plan units (2.4m)
pub const DEFAULT_WALL_HEIGHT: f64 = 240.0;

/// Default wall thickness in plan units
pub const DEFAULT_WALL_THICKNESS: f64 = 10.0;

/// Default door opening size in plan units (width, height)
pub const DEFAULT_DOOR_SIZE: (f64, f64) = (50.0, 100.0);

/// Default window opening size in plan units (width, height)
pub const DEFAULT_WINDOW_SIZE: (f64, f64) = (60.0, 50.0);

/// Snap/pick distance threshold in plan units, also the endpoint-chaining
/// threshold for exterior wall loop reconstruction
pub const SNAP_DISTANCE: f64 = 10.0;

/// Room labels are culled beyond this distance from the camera (plan units)
pub const LABEL_CULL_DISTANCE: f64 = 1000.0;
