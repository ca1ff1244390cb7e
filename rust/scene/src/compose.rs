// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene composition
//!
//! `compose_scene` is a pure function from the authored plan to a
//! renderable scene description; the renderer reconciles against it and
//! holds no plan state of its own. `SceneCache` memoizes each scene
//! section by a hash of its inputs so edits rebuild only the sections
//! they touch.

use crate::error::Result;
use nalgebra::Point3;
use plan3d_geometry::{
    build_floor_polygon, build_wall, classify_walls, extrude_slab, reconstruct_external_walls,
    PlanBounds, PlanTransform, WallSolid, WallSolidSpec,
};
use plan3d_model::defaults::{
    DEFAULT_WALL_HEIGHT, DEFAULT_WALL_THICKNESS, LABEL_CULL_DISTANCE, PLAN_UNITS_PER_METER,
};
use plan3d_model::{PlacedItem, PlanState, ShapeData, TourPoint};
use rayon::prelude::*;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

/// A wall in the composed scene
pub type WallNode = WallSolid;

/// Composition parameters, all in plan units unless noted
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneConfig {
    pub wall_height: f64,
    pub wall_thickness: f64,
    pub floor_thickness: f64,
    pub show_roof: bool,
    /// Plan units covered by one texture tile
    pub texture_unit_size: f64,
    pub tour_points: Vec<TourPoint>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            wall_height: DEFAULT_WALL_HEIGHT,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            floor_thickness: 10.0,
            show_roof: false,
            texture_unit_size: PLAN_UNITS_PER_METER,
            tour_points: Vec::new(),
        }
    }
}

/// Texture repeat factors for a slab material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialTiling {
    pub repeat_x: f64,
    pub repeat_y: f64,
}

/// Floor or roof slab
#[derive(Debug, Clone)]
pub struct SlabNode {
    pub mesh: plan3d_geometry::Mesh,
    pub tiling: MaterialTiling,
}

/// A placed furniture/fixture instance
///
/// Carries the catalog target size; the renderer derives the final
/// scale from the loaded model's measured bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNode {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub target_size: [f64; 3],
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

impl From<&PlacedItem> for ItemNode {
    fn from(item: &PlacedItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            path: item.path.clone(),
            kind: item.kind.clone(),
            target_size: [item.width, item.height, item.depth],
            position: item.position,
            rotation: item.rotation,
        }
    }
}

/// Billboard room label in world space
#[derive(Debug, Clone, PartialEq)]
pub struct LabelNode {
    pub id: u64,
    pub text: String,
    pub position: Point3<f64>,
}

/// Pickable tour waypoint marker
#[derive(Debug, Clone, PartialEq)]
pub struct TourMarker {
    pub id: u64,
    pub position: [f64; 3],
    pub title: String,
}

/// The full derived scene, a pure value
#[derive(Debug, Clone, Default)]
pub struct SceneDescription {
    pub floor: Option<SlabNode>,
    pub roof: Option<SlabNode>,
    pub walls: Vec<WallNode>,
    pub items: Vec<ItemNode>,
    pub labels: Vec<LabelNode>,
    pub tour_markers: Vec<TourMarker>,
    /// In-progress placement preview, overlaid by the placement engine
    pub placing: Option<ItemNode>,
}

/// Plan transform centered on the walls, falling back to the floor
/// outline for wall-less plans
fn plan_transform(state: &PlanState) -> (Option<PlanBounds>, PlanTransform) {
    let bounds =
        PlanBounds::of_lines(&state.lines).or_else(|| PlanBounds::of_points(&state.floor_plan_points));
    let transform = bounds
        .as_ref()
        .map(PlanTransform::from_bounds)
        .unwrap_or_else(|| PlanTransform::new(0.0, 0.0));
    (bounds, transform)
}

fn compose_walls(state: &PlanState, config: &SceneConfig) -> Result<Vec<WallNode>> {
    let (_, transform) = plan_transform(state);
    let classes = classify_walls(&state.lines);

    let solids = state
        .lines
        .par_iter()
        .filter_map(|line| {
            if line.is_degenerate() {
                tracing::warn!(wall = line.id, "skipping degenerate wall");
                return None;
            }
            let openings: Vec<&ShapeData> = state
                .shapes
                .iter()
                .filter(|s| s.wall_id == line.id)
                .collect();
            let spec = WallSolidSpec {
                line: line.clone(),
                height: config.wall_height,
                thickness: config.wall_thickness,
            };
            let class = classes.get(&line.id).copied().unwrap_or(
                plan3d_model::WallClassification {
                    is_outer: false,
                    is_facing_inward: true,
                },
            );
            Some(build_wall(&spec, &openings, class, &transform))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(solids)
}

fn compose_slabs(
    state: &PlanState,
    config: &SceneConfig,
) -> Result<(Option<SlabNode>, Option<SlabNode>)> {
    let (bounds, transform) = plan_transform(state);

    // Authored outline wins; a closed wall loop is the fallback
    let outline = if state.floor_plan_points.len() >= 3 {
        state.floor_plan_points.clone()
    } else {
        let wall_loop = reconstruct_external_walls(&state.lines);
        if wall_loop.closed {
            wall_loop.outline()
        } else {
            Vec::new()
        }
    };

    let profile = match build_floor_polygon(&outline, &transform) {
        Ok(p) => p,
        Err(err) => {
            tracing::warn!(%err, "floor slab omitted");
            return Ok((None, None));
        }
    };

    let tiling = bounds
        .map(|b| MaterialTiling {
            repeat_x: b.width() / config.texture_unit_size,
            repeat_y: b.height() / config.texture_unit_size,
        })
        .unwrap_or(MaterialTiling {
            repeat_x: 1.0,
            repeat_y: 1.0,
        });

    let thickness = transform.scale(config.floor_thickness);
    let floor = SlabNode {
        mesh: extrude_slab(&profile, thickness, 0.0)?,
        tiling,
    };

    let roof = if config.show_roof {
        let top = transform.scale(config.wall_height) + thickness;
        Some(SlabNode {
            mesh: extrude_slab(&profile, thickness, top)?,
            tiling,
        })
    } else {
        None
    };

    Ok((Some(floor), roof))
}

fn compose_labels(state: &PlanState, config: &SceneConfig) -> Vec<LabelNode> {
    let (_, transform) = plan_transform(state);
    let label_height = transform.scale(config.wall_height);

    state
        .room_names
        .iter()
        .map(|label| {
            let mut position = transform.to_world(label.x + label.offset_x, label.y);
            position.y = label_height;
            LabelNode {
                id: label.id,
                text: label.name.clone(),
                position,
            }
        })
        .collect()
}

fn compose_items(state: &PlanState) -> Vec<ItemNode> {
    state
        .furniture_items
        .iter()
        .chain(&state.ceiling_items)
        .chain(&state.wall_items)
        .map(ItemNode::from)
        .collect()
}

fn compose_markers(config: &SceneConfig) -> Vec<TourMarker> {
    config
        .tour_points
        .iter()
        .map(|p| TourMarker {
            id: p.id,
            position: p.position,
            title: p.title.clone(),
        })
        .collect()
}

/// Compose the full scene from the plan
///
/// Pure: equal inputs produce an equal scene.
pub fn compose_scene(state: &PlanState, config: &SceneConfig) -> Result<SceneDescription> {
    let walls = compose_walls(state, config)?;
    let (floor, roof) = compose_slabs(state, config)?;

    Ok(SceneDescription {
        floor,
        roof,
        walls,
        items: compose_items(state),
        labels: compose_labels(state, config),
        tour_markers: compose_markers(config),
        placing: None,
    })
}

/// Labels within the cull distance of the camera
///
/// The cull threshold is authored in plan units and compared in world
/// meters.
pub fn visible_labels<'a>(
    labels: &'a [LabelNode],
    camera_position: &Point3<f64>,
) -> Vec<&'a LabelNode> {
    let cull = LABEL_CULL_DISTANCE / PLAN_UNITS_PER_METER;
    labels
        .iter()
        .filter(|label| (label.position - camera_position).norm() <= cull)
        .collect()
}

/// Hash of a serializable scene-section input
fn section_hash<T: Serialize>(value: &T) -> u64 {
    match serde_json::to_vec(value) {
        Ok(bytes) => xxh3_64(&bytes),
        // Unhashable input degrades to always-rebuild
        Err(_) => 0,
    }
}

#[derive(Debug, Clone)]
struct Section<T> {
    hash: u64,
    value: T,
}

/// Section-level memoization over `compose_scene`
///
/// Each section is keyed by a hash of exactly the plan slices it reads,
/// so moving furniture never rebuilds wall CSG and renaming a room
/// never re-extrudes the floor.
#[derive(Debug, Default)]
pub struct SceneCache {
    walls: Option<Section<Vec<WallNode>>>,
    slabs: Option<Section<(Option<SlabNode>, Option<SlabNode>)>>,
    items: Option<Section<Vec<ItemNode>>>,
    labels: Option<Section<Vec<LabelNode>>>,
    markers: Option<Section<Vec<TourMarker>>>,
    rebuilds: usize,
}

impl SceneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of section rebuilds performed so far
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Compose the scene, reusing sections whose inputs are unchanged
    pub fn compose(&mut self, state: &PlanState, config: &SceneConfig) -> Result<SceneDescription> {
        let wall_config = (
            config.wall_height,
            config.wall_thickness,
        );
        let slab_config = (
            config.floor_thickness,
            config.wall_height,
            config.show_roof,
            config.texture_unit_size,
        );

        let walls_hash = section_hash(&(&state.lines, &state.shapes, wall_config));
        let walls = match &self.walls {
            Some(section) if section.hash == walls_hash => section.value.clone(),
            _ => {
                self.rebuilds += 1;
                let value = compose_walls(state, config)?;
                self.walls = Some(Section {
                    hash: walls_hash,
                    value: value.clone(),
                });
                value
            }
        };

        let slabs_hash =
            section_hash(&(&state.lines, &state.floor_plan_points, slab_config));
        let (floor, roof) = match &self.slabs {
            Some(section) if section.hash == slabs_hash => section.value.clone(),
            _ => {
                self.rebuilds += 1;
                let value = compose_slabs(state, config)?;
                self.slabs = Some(Section {
                    hash: slabs_hash,
                    value: value.clone(),
                });
                value
            }
        };

        let items_hash = section_hash(&(
            &state.furniture_items,
            &state.ceiling_items,
            &state.wall_items,
        ));
        let items = match &self.items {
            Some(section) if section.hash == items_hash => section.value.clone(),
            _ => {
                self.rebuilds += 1;
                let value = compose_items(state);
                self.items = Some(Section {
                    hash: items_hash,
                    value: value.clone(),
                });
                value
            }
        };

        let labels_hash = section_hash(&(&state.room_names, &state.lines, config.wall_height));
        let labels = match &self.labels {
            Some(section) if section.hash == labels_hash => section.value.clone(),
            _ => {
                self.rebuilds += 1;
                let value = compose_labels(state, config);
                self.labels = Some(Section {
                    hash: labels_hash,
                    value: value.clone(),
                });
                value
            }
        };

        let markers_hash = section_hash(&config.tour_points);
        let tour_markers = match &self.markers {
            Some(section) if section.hash == markers_hash => section.value.clone(),
            _ => {
                self.rebuilds += 1;
                let value = compose_markers(config);
                self.markers = Some(Section {
                    hash: markers_hash,
                    value: value.clone(),
                });
                value
            }
        };

        Ok(SceneDescription {
            floor,
            roof,
            walls,
            items,
            labels,
            tour_markers,
            placing: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan3d_model::{Line, PlacedItem, Point, RoomName};

    fn room() -> PlanState {
        PlanState {
            lines: vec![
                Line::new(1, 0.0, 0.0, 500.0, 0.0),
                Line::new(2, 500.0, 0.0, 500.0, 400.0),
                Line::new(3, 500.0, 400.0, 0.0, 400.0),
                Line::new(4, 0.0, 400.0, 0.0, 0.0),
            ],
            floor_plan_points: vec![
                Point::new(0.0, 0.0),
                Point::new(500.0, 0.0),
                Point::new(500.0, 400.0),
                Point::new(0.0, 400.0),
            ],
            room_names: vec![RoomName {
                id: 1,
                x: 250.0,
                y: 200.0,
                name: "Living Room".into(),
                offset_x: 0.0,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_compose_rectangle() {
        let scene = compose_scene(&room(), &SceneConfig::default()).unwrap();

        assert_eq!(scene.walls.len(), 4);
        assert!(scene.floor.is_some());
        assert!(scene.roof.is_none());
        assert_eq!(scene.labels.len(), 1);
        assert!(scene.placing.is_none());

        // 5m x 4m room, 1m texture tiles
        let tiling = scene.floor.as_ref().unwrap().tiling;
        assert_eq!(tiling.repeat_x, 5.0);
        assert_eq!(tiling.repeat_y, 4.0);
    }

    #[test]
    fn test_roof_follows_flag() {
        let config = SceneConfig {
            show_roof: true,
            ..Default::default()
        };
        let scene = compose_scene(&room(), &config).unwrap();
        assert!(scene.roof.is_some());

        // Roof sits above the wall tops
        let (min, _) = scene.roof.as_ref().unwrap().mesh.bounds();
        assert!((min.y as f64 - 2.4).abs() < 1e-6);
    }

    #[test]
    fn test_floor_falls_back_to_wall_loop() {
        let mut state = room();
        state.floor_plan_points.clear();

        let scene = compose_scene(&state, &SceneConfig::default()).unwrap();
        assert!(scene.floor.is_some());
    }

    #[test]
    fn test_too_few_floor_points_omits_slab() {
        let state = PlanState {
            floor_plan_points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            ..Default::default()
        };
        let scene = compose_scene(&state, &SceneConfig::default()).unwrap();
        assert!(scene.floor.is_none());
        assert!(scene.walls.is_empty());
    }

    #[test]
    fn test_compose_is_pure() {
        let state = room();
        let config = SceneConfig::default();

        let a = compose_scene(&state, &config).unwrap();
        let b = compose_scene(&state, &config).unwrap();
        assert_eq!(a.walls.len(), b.walls.len());
        for (wa, wb) in a.walls.iter().zip(&b.walls) {
            assert_eq!(wa.line_id, wb.line_id);
            assert_eq!(wa.mesh, wb.mesh);
        }
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn test_cache_skips_unchanged_sections() {
        let mut state = room();
        let config = SceneConfig::default();
        let mut cache = SceneCache::new();

        cache.compose(&state, &config).unwrap();
        let after_first = cache.rebuild_count();
        assert_eq!(after_first, 5);

        // Unchanged input: nothing rebuilds
        cache.compose(&state, &config).unwrap();
        assert_eq!(cache.rebuild_count(), after_first);

        // Moving furniture rebuilds only the items section
        state.furniture_items.push(PlacedItem {
            id: 1,
            name: "sofa".into(),
            path: "/media/items/sofa.glb".into(),
            kind: "Floor".into(),
            width: 200.0,
            height: 90.0,
            depth: 100.0,
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
        });
        cache.compose(&state, &config).unwrap();
        assert_eq!(cache.rebuild_count(), after_first + 1);

        // Editing a wall rebuilds walls and slabs, not items
        state.lines[0].points[2] = 600.0;
        cache.compose(&state, &config).unwrap();
        // walls + slabs + labels (labels read the wall bounds)
        assert_eq!(cache.rebuild_count(), after_first + 4);
    }

    #[test]
    fn test_label_culling() {
        let labels = vec![
            LabelNode {
                id: 1,
                text: "near".into(),
                position: Point3::new(0.0, 2.4, 0.0),
            },
            LabelNode {
                id: 2,
                text: "far".into(),
                position: Point3::new(50.0, 2.4, 0.0),
            },
        ];

        let visible = visible_labels(&labels, &Point3::new(0.0, 2.0, 3.0));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);
    }
}
