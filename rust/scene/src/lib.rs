// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan3D Scene
//!
//! Derives a renderable 3D scene from the authored plan state: floor
//! and roof slabs, CSG wall solids with opening anchors, placed items,
//! room labels and tour markers. The composer is a pure function of
//! `(PlanState, SceneConfig)`; a cache memoizes per-section hashes so
//! unchanged sections are reused. Also hosts the item placement state
//! machine, the camera rig and the asset cache.

pub mod assets;
pub mod camera;
pub mod compose;
pub mod error;
pub mod placement;

pub use assets::{load_with_fallback, AssetCache, CancelFlag, ModelData, ModelFetcher};
pub use camera::{Camera, CameraMode, CameraRig};
pub use compose::{
    compose_scene, visible_labels, ItemNode, LabelNode, MaterialTiling, SceneCache, SceneConfig,
    SceneDescription, SlabNode, TourMarker, WallNode,
};
pub use error::{Error, Result};
pub use placement::{
    fit_scale, ground_intersection, Aabb, DragState, NudgeStack, PlacementEngine, PlacementState,
};
