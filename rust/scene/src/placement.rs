// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Item placement engine
//!
//! Drives the placement lifecycle: `Idle -> Placing -> (Dragging <->
//! Placing) -> committed or cancelled`. Scale is derived from the
//! loaded model's measured bounds against the catalog target size, and
//! commits push one history snapshot; transient drag positions are
//! never individually undoable.

use crate::compose::ItemNode;
use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use plan3d_model::defaults::PLAN_UNITS_PER_METER;
use plan3d_model::{History, PlacedItem, PlacingItem, PlanState};

/// Axis-aligned bounding box in world meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Bounds of a mesh, converted to f64
    pub fn of_mesh(mesh: &plan3d_geometry::Mesh) -> Self {
        let (min, max) = mesh.bounds();
        Self {
            min: Point3::new(min.x as f64, min.y as f64, min.z as f64),
            max: Point3::new(max.x as f64, max.y as f64, max.z as f64),
        }
    }

    /// Box of the given footprint centered at a position, resting on it
    pub fn from_footprint(position: &Point3<f64>, size: &[f64; 3]) -> Self {
        Self {
            min: Point3::new(
                position.x - size[0] / 2.0,
                position.y,
                position.z - size[2] / 2.0,
            ),
            max: Point3::new(
                position.x + size[0] / 2.0,
                position.y + size[1],
                position.z + size[2] / 2.0,
            ),
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Per-axis scale fitting a measured model into the catalog target size
///
/// Target dimensions are plan units; measured bounds are meters. Axes
/// with degenerate measured extent keep a scale of 1.
pub fn fit_scale(target: &[f64; 3], measured: &Aabb) -> [f64; 3] {
    let size = measured.max - measured.min;
    let mut scale = [1.0; 3];
    for (i, extent) in [size.x, size.y, size.z].into_iter().enumerate() {
        if extent > 1e-9 {
            scale[i] = target[i] / PLAN_UNITS_PER_METER / extent;
        }
    }
    scale
}

/// Vertical lift keeping the scaled model's bottom center on the ground
pub fn ground_lift(measured: &Aabb, scale_y: f64) -> f64 {
    -measured.min.y * scale_y
}

/// Intersect a ray with the ground plane (y = 0)
///
/// Returns `None` for rays parallel to or pointing away from the plane.
pub fn ground_intersection(origin: &Point3<f64>, direction: &Vector3<f64>) -> Option<Point3<f64>> {
    if direction.y.abs() < 1e-12 {
        return None;
    }
    let t = -origin.y / direction.y;
    if t <= 0.0 {
        return None;
    }
    Some(origin + direction * t)
}

/// Active drag: the grab offset between item position and ground hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    offset: Vector3<f64>,
}

impl DragState {
    /// Capture the offset at pointer-down
    pub fn begin(item_position: &Point3<f64>, hit: &Point3<f64>) -> Self {
        Self {
            offset: item_position - hit,
        }
    }

    /// Item position for a new ground hit, preserving the grab offset
    pub fn drag_to(&self, hit: &Point3<f64>) -> Point3<f64> {
        hit + self.offset
    }
}

/// Placement lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Idle,
    Placing,
    Dragging,
}

/// State machine for placing one item at a time
#[derive(Debug, Default)]
pub struct PlacementEngine {
    item: Option<PlacingItem>,
    scale: [f64; 3],
    drag: Option<DragState>,
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlacementState {
        match (&self.item, &self.drag) {
            (None, _) => PlacementState::Idle,
            (Some(_), None) => PlacementState::Placing,
            (Some(_), Some(_)) => PlacementState::Dragging,
        }
    }

    /// Begin placing an item whose model bounds have been measured
    ///
    /// Starting a new placement cancels any in-progress one.
    pub fn start(&mut self, mut item: PlacingItem, measured: &Aabb) {
        let target = [item.width, item.height, item.depth];
        self.scale = fit_scale(&target, measured);
        item.position[1] = ground_lift(measured, self.scale[1]);
        self.item = Some(item);
        self.drag = None;
    }

    /// Per-axis scale for the current placement
    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }

    /// Preview node for the renderer, drawn apart from committed items
    pub fn preview(&self) -> Option<ItemNode> {
        self.item.as_ref().map(|item| ItemNode {
            id: 0,
            name: item.name.clone(),
            path: item.path.clone(),
            kind: item.kind.clone(),
            target_size: [item.width, item.height, item.depth],
            position: item.position,
            rotation: item.rotation,
        })
    }

    /// Pointer-down on the ground: capture the grab offset
    pub fn begin_drag(&mut self, hit: &Point3<f64>) -> Result<()> {
        let item = self.item.as_ref().ok_or(Error::NotPlacing)?;
        let position = Point3::new(item.position[0], item.position[1], item.position[2]);
        self.drag = Some(DragState::begin(&position, hit));
        Ok(())
    }

    /// Pointer-move: re-intersect and re-apply the offset
    pub fn drag_to(&mut self, hit: &Point3<f64>) -> Result<()> {
        let drag = self.drag.as_ref().ok_or(Error::NotPlacing)?;
        let position = drag.drag_to(hit);
        let item = self.item.as_mut().ok_or(Error::NotPlacing)?;
        item.position[0] = position.x;
        item.position[2] = position.z;
        Ok(())
    }

    /// Pointer-up: drop back to plain placing
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Rotate the in-progress item around the vertical axis
    pub fn rotate(&mut self, delta_y: f64) -> Result<()> {
        let item = self.item.as_mut().ok_or(Error::NotPlacing)?;
        item.rotation[1] += delta_y;
        Ok(())
    }

    /// Commit under a generated id, pushing one history snapshot
    pub fn commit(
        &mut self,
        state: &mut PlanState,
        history: &mut History<PlanState>,
    ) -> Result<u64> {
        let item = self.item.take().ok_or(Error::NotPlacing)?;
        self.drag = None;

        let id = next_item_id(state);
        let placed = item.into_placed(id);
        match placed.kind.as_str() {
            "Ceiling" => state.ceiling_items.push(placed),
            "Wall" => state.wall_items.push(placed),
            _ => state.furniture_items.push(placed),
        }

        history.update_state(state.clone());
        Ok(id)
    }

    /// True when the in-progress item overlaps a wall solid
    ///
    /// Checked by callers on drag moves and before commit to flag bad
    /// drop positions; placement itself is never blocked.
    pub fn collides(&self, walls: &[plan3d_geometry::WallSolid]) -> bool {
        let Some(item) = &self.item else {
            return false;
        };
        let position = Point3::new(item.position[0], item.position[1], item.position[2]);
        let size = [
            item.width / PLAN_UNITS_PER_METER,
            item.height / PLAN_UNITS_PER_METER,
            item.depth / PLAN_UNITS_PER_METER,
        ];
        collides_with_walls(&Aabb::from_footprint(&position, &size), walls)
    }

    /// Abandon the in-progress placement
    pub fn cancel(&mut self) {
        self.item = None;
        self.drag = None;
    }
}

/// Next free item id across all placed-item lists
fn next_item_id(state: &PlanState) -> u64 {
    state
        .furniture_items
        .iter()
        .chain(&state.ceiling_items)
        .chain(&state.wall_items)
        .map(|item| item.id)
        .max()
        .map_or(1, |max| max + 1)
}

/// Remove a committed item from whichever list holds it
///
/// The caller releases the item's cached model resources afterwards.
pub fn delete_item(state: &mut PlanState, id: u64) -> Result<PlacedItem> {
    for list in [
        &mut state.furniture_items,
        &mut state.ceiling_items,
        &mut state.wall_items,
    ] {
        if let Some(pos) = list.iter().position(|item| item.id == id) {
            return Ok(list.remove(pos));
        }
    }
    Err(Error::UnknownItem(id))
}

/// True when the item's box overlaps any wall's box
pub fn collides_with_walls(item: &Aabb, walls: &[plan3d_geometry::WallSolid]) -> bool {
    walls
        .iter()
        .any(|wall| item.intersects(&Aabb::of_mesh(&wall.mesh)))
}

/// One reversible post-commit adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
struct Nudge {
    item_id: u64,
    inverse_translation: [f64; 3],
    inverse_rotation_y: f64,
}

/// Inverse-delta stack for post-commit adjustments
///
/// Independent of the global history: "revert last nudge" undoes the
/// most recent move/rotate without touching plan snapshots.
#[derive(Debug, Default)]
pub struct NudgeStack {
    nudges: Vec<Nudge>,
}

impl NudgeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nudges.is_empty()
    }

    /// Translate a committed item, recording the inverse
    pub fn apply_move(
        &mut self,
        state: &mut PlanState,
        id: u64,
        delta: [f64; 3],
    ) -> Result<()> {
        let item = find_item_mut(state, id)?;
        for (axis, d) in item.position.iter_mut().zip(delta) {
            *axis += d;
        }
        self.nudges.push(Nudge {
            item_id: id,
            inverse_translation: [-delta[0], -delta[1], -delta[2]],
            inverse_rotation_y: 0.0,
        });
        Ok(())
    }

    /// Rotate a committed item around the vertical axis, recording the
    /// inverse
    pub fn apply_rotation(&mut self, state: &mut PlanState, id: u64, delta_y: f64) -> Result<()> {
        let item = find_item_mut(state, id)?;
        item.rotation[1] += delta_y;
        self.nudges.push(Nudge {
            item_id: id,
            inverse_translation: [0.0; 3],
            inverse_rotation_y: -delta_y,
        });
        Ok(())
    }

    /// Undo the most recent nudge; returns the affected item id
    pub fn revert_last(&mut self, state: &mut PlanState) -> Result<Option<u64>> {
        let Some(nudge) = self.nudges.pop() else {
            return Ok(None);
        };
        let item = find_item_mut(state, nudge.item_id)?;
        for (axis, d) in item.position.iter_mut().zip(nudge.inverse_translation) {
            *axis += d;
        }
        item.rotation[1] += nudge.inverse_rotation_y;
        Ok(Some(nudge.item_id))
    }
}

fn find_item_mut(state: &mut PlanState, id: u64) -> Result<&mut PlacedItem> {
    state
        .furniture_items
        .iter_mut()
        .chain(state.ceiling_items.iter_mut())
        .chain(state.wall_items.iter_mut())
        .find(|item| item.id == id)
        .ok_or(Error::UnknownItem(id))
}
