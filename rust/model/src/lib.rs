// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor-plan authoring data model
//!
//! The types in this crate are the single source of truth for a plan:
//! the 3D scene is always derived from them, never the other way around.
//! It also carries the catalog contracts consumed from the backend and
//! the generic snapshot history used for undo/redo.

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod history;
pub mod types;

pub use catalog::{
    fallback_asset_url, sidebar_groups, texture_groups, CatalogItem, SidebarGroup, TextureEntry,
    TextureKind,
};
pub use error::{ModelError, Result};
pub use history::History;
pub use types::{
    Line, OpeningKind, PlacedItem, PlacingItem, PlanState, Point, RoomName, ShapeData, TourPoint,
    WallClassification,
};
