// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan3D Geometry
//!
//! Compiles 2D floor-plan data into 3D meshes: segment utilities,
//! exterior wall loop reconstruction, wall classification, and the CSG
//! wall builder that subtracts door/window cutouts from extruded wall
//! solids. Uses earcutr for triangulation, csgrs for boolean operations
//! and nalgebra for transforms.

pub mod classify;
pub mod csg;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod profile;
pub mod segment;
pub mod transform;
pub mod triangulation;
pub mod wall;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use classify::{classify_wall, classify_walls, AXIS_TOLERANCE};
pub use csg::CsgProcessor;
pub use error::{Error, Result};
pub use extrusion::{apply_transform, extrude_profile, extrude_slab};
pub use mesh::Mesh;
pub use profile::{create_rectangle, Profile2D, Triangulation};
pub use segment::{
    build_floor_polygon, closest_point_on_segment, distance_to_segment,
    reconstruct_external_walls, OrientedSegment, SegmentProjection, WallLoop,
};
pub use transform::{PlanBounds, PlanTransform, WallFrame};
pub use wall::{build_wall, OpeningAnchor, WallSolid, WallSolidSpec};
