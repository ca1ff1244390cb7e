// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core plan-space types
//!
//! Field names mirror the JSON contract produced by the 2D editor
//! (camelCase), so persisted plans load unchanged.

use crate::defaults::{DEFAULT_DOOR_SIZE, DEFAULT_WINDOW_SIZE};
use crate::error::{ModelError, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A plan-space coordinate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { id: None, x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A straight wall segment, stored as `[x1, y1, x2, y2]`
///
/// The id is stable and referenced by openings placed on the wall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: u64,
    pub points: [f64; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
}

impl Line {
    pub fn new(id: u64, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            id,
            points: [x1, y1, x2, y2],
            thickness: None,
        }
    }

    pub fn start(&self) -> (f64, f64) {
        (self.points[0], self.points[1])
    }

    pub fn end(&self) -> (f64, f64) {
        (self.points[2], self.points[3])
    }

    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.points[0] + self.points[2]) / 2.0,
            (self.points[1] + self.points[3]) / 2.0,
        )
    }

    pub fn length(&self) -> f64 {
        let dx = self.points[2] - self.points[0];
        let dy = self.points[3] - self.points[1];
        (dx * dx + dy * dy).sqrt()
    }

    /// Absolute angle of the segment in plan space
    pub fn angle(&self) -> f64 {
        (self.points[3] - self.points[1]).atan2(self.points[2] - self.points[0])
    }

    /// Zero-length walls are invalid input
    pub fn is_degenerate(&self) -> bool {
        self.length() < 1e-9
    }
}

/// Opening classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

impl OpeningKind {
    /// Fallback opening size in plan units when the shape carries none
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            OpeningKind::Door => DEFAULT_DOOR_SIZE,
            OpeningKind::Window => DEFAULT_WINDOW_SIZE,
        }
    }
}

/// A door or window anchored to exactly one wall
///
/// `(x, y)` is the opening center in plan space; it is projected into the
/// wall's local axis by the wall builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShapeData {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: OpeningKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Manual flip flag: swings the attached model 180 degrees
    #[serde(default)]
    pub flip: bool,
    pub wall_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl ShapeData {
    /// Effective opening size, falling back to per-kind defaults
    pub fn size(&self) -> (f64, f64) {
        let (dw, dh) = self.kind.default_size();
        (self.width.unwrap_or(dw), self.height.unwrap_or(dh))
    }
}

/// Derived per-wall facts, recomputed whenever wall geometry changes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WallClassification {
    /// Building-boundary wall (axis-aligned and touching the plan bounds)
    pub is_outer: bool,
    /// Wall normal points toward the plan centroid
    pub is_facing_inward: bool,
}

/// A furniture/fixture instance still being positioned (not yet committed)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacingItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

/// A committed furniture/fixture instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: u64,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

impl PlacingItem {
    /// Commit this placement under a generated id
    pub fn into_placed(self, id: u64) -> PlacedItem {
        PlacedItem {
            id,
            name: self.name,
            path: self.path,
            kind: self.kind,
            width: self.width,
            height: self.height,
            depth: self.depth,
            position: self.position,
            rotation: self.rotation,
        }
    }
}

/// Floating room label anchored in plan space
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomName {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub name: String,
    #[serde(default)]
    pub offset_x: f64,
}

/// Fixed virtual-tour camera waypoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TourPoint {
    pub id: u64,
    pub position: [f64; 3],
    pub look_at: [f64; 3],
    pub title: String,
}

/// Full authoring state: the snapshot unit for undo/redo
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanState {
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub shapes: Vec<ShapeData>,
    #[serde(default)]
    pub room_names: Vec<RoomName>,
    #[serde(default)]
    pub floor_plan_points: Vec<Point>,
    #[serde(default)]
    pub furniture_items: Vec<PlacedItem>,
    #[serde(default)]
    pub ceiling_items: Vec<PlacedItem>,
    #[serde(default)]
    pub wall_items: Vec<PlacedItem>,
}

impl PlanState {
    /// Validate the plan at the edit boundary
    ///
    /// Geometry never sees invalid data: degenerate walls, non-positive
    /// opening sizes, dangling wall references and overlapping openings on
    /// one wall are all rejected here.
    pub fn validate(&self) -> Result<()> {
        let mut wall_ids: FxHashSet<u64> = FxHashSet::default();
        for line in &self.lines {
            if line.is_degenerate() {
                return Err(ModelError::DegenerateWall(line.id));
            }
            wall_ids.insert(line.id);
        }

        for shape in &self.shapes {
            let (w, h) = shape.size();
            if w <= 0.0 || h <= 0.0 {
                return Err(ModelError::InvalidOpeningSize {
                    id: shape.id,
                    width: w,
                    height: h,
                });
            }
            if !wall_ids.contains(&shape.wall_id) {
                return Err(ModelError::DanglingWallRef {
                    shape_id: shape.id,
                    wall_id: shape.wall_id,
                });
            }
        }

        self.check_opening_overlap()
    }

    /// Openings on one wall must not overlap; the CSG layer relies on this
    fn check_opening_overlap(&self) -> Result<()> {
        for line in &self.lines {
            let (x1, y1) = line.start();
            let len = line.length();
            if len < 1e-9 {
                continue;
            }
            let (ux, uy) = (
                (line.points[2] - x1) / len,
                (line.points[3] - y1) / len,
            );

            // Project each opening center onto the wall axis
            let mut spans: Vec<(f64, f64, u64)> = self
                .shapes
                .iter()
                .filter(|s| s.wall_id == line.id)
                .map(|s| {
                    let t = (s.x - x1) * ux + (s.y - y1) * uy;
                    let (w, _) = s.size();
                    (t - w / 2.0, t + w / 2.0, s.id)
                })
                .collect();
            spans.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            for pair in spans.windows(2) {
                if pair[1].0 < pair[0].1 {
                    return Err(ModelError::OverlappingOpenings {
                        wall_id: line.id,
                        first: pair[0].2,
                        second: pair[1].2,
                    });
                }
            }
        }
        Ok(())
    }
}
