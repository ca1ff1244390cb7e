// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan-space segment utilities
//!
//! Distance and projection queries against wall segments (opening
//! placement snaps to the nearest wall), floor polygon assembly, and
//! greedy reconstruction of the exterior wall loop from an unordered
//! line soup.

use crate::error::{Error, Result};
use crate::profile::Profile2D;
use crate::transform::PlanTransform;
use nalgebra::Point2;
use plan3d_model::defaults::SNAP_DISTANCE;
use plan3d_model::{Line, Point};

/// Result of projecting a plan point onto a wall segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Closest point on the segment
    pub x: f64,
    pub y: f64,
    /// Wall angle at the projection, for aligning the dragged opening
    pub angle: f64,
}

/// Clamped parameter of the closest point on a segment, in `[0, 1]`
#[inline]
fn closest_t(line: &Line, x: f64, y: f64) -> f64 {
    let (x1, y1) = line.start();
    let (x2, y2) = line.end();
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-18 {
        return 0.0;
    }
    (((x - x1) * dx + (y - y1) * dy) / len_sq).clamp(0.0, 1.0)
}

/// Distance from a plan point to a wall segment
#[inline]
pub fn distance_to_segment(line: &Line, x: f64, y: f64) -> f64 {
    let t = closest_t(line, x, y);
    let (x1, y1) = line.start();
    let (x2, y2) = line.end();
    let px = x1 + t * (x2 - x1);
    let py = y1 + t * (y2 - y1);
    ((x - px) * (x - px) + (y - py) * (y - py)).sqrt()
}

/// Closest point on a wall segment, with the wall's angle
#[inline]
pub fn closest_point_on_segment(line: &Line, x: f64, y: f64) -> SegmentProjection {
    let t = closest_t(line, x, y);
    let (x1, y1) = line.start();
    let (x2, y2) = line.end();
    SegmentProjection {
        x: x1 + t * (x2 - x1),
        y: y1 + t * (y2 - y1),
        angle: line.angle(),
    }
}

/// Build the floor slab profile from the authored outline points
///
/// The profile is produced in world meters (profile y maps to world z)
/// so it can be extruded directly. Winding is normalized to
/// counter-clockwise.
pub fn build_floor_polygon(points: &[Point], transform: &PlanTransform) -> Result<Profile2D> {
    if points.len() < 3 {
        return Err(Error::InsufficientPoints(points.len()));
    }

    let outer: Vec<Point2<f64>> = points
        .iter()
        .map(|p| {
            let world = transform.to_world(p.x, p.y);
            Point2::new(world.x, world.z)
        })
        .collect();

    let mut profile = Profile2D::new(outer);
    if profile.signed_area() < 0.0 {
        profile.outer.reverse();
    }
    Ok(profile)
}

/// One wall segment of a reconstructed loop, in traversal order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedSegment {
    pub line_id: u64,
    /// Traversal start, possibly the line's authored end point
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// True when traversal runs against the authored direction
    pub reversed: bool,
}

/// Exterior wall loop reconstructed from an unordered line soup
#[derive(Debug, Clone, PartialEq)]
pub struct WallLoop {
    pub segments: Vec<OrientedSegment>,
    /// False when the walk ran out of connectable walls before closing
    pub closed: bool,
}

impl WallLoop {
    /// Ordered corner points of the loop (one per segment start)
    pub fn outline(&self) -> Vec<Point> {
        self.segments
            .iter()
            .map(|s| Point::new(s.start.0, s.start.1))
            .collect()
    }
}

#[inline]
fn endpoint_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// Reconstruct the exterior wall loop by greedy endpoint chaining
///
/// Starts from the leftmost near-vertical wall (the leftmost wall
/// overall when none is near-vertical) and repeatedly appends the
/// unused wall whose nearer endpoint lies within the snap distance of
/// the current loop end, reversing walls as needed. Branching graphs
/// resolve to whichever candidate endpoint is nearest. The walk stops
/// when it returns to the seed or no candidate connects; the latter
/// yields an open loop and a warning.
pub fn reconstruct_external_walls(lines: &[Line]) -> WallLoop {
    let usable: Vec<&Line> = lines.iter().filter(|l| !l.is_degenerate()).collect();
    if usable.is_empty() {
        return WallLoop {
            segments: Vec::new(),
            closed: false,
        };
    }

    // Seed: leftmost near-vertical wall, falling back to leftmost overall
    let min_x = |line: &Line| line.points[0].min(line.points[2]);
    let seed_pos = usable
        .iter()
        .enumerate()
        .filter(|(_, l)| (l.points[2] - l.points[0]).abs() <= SNAP_DISTANCE)
        .min_by(|(_, a), (_, b)| min_x(a).total_cmp(&min_x(b)))
        .map(|(i, _)| i)
        .unwrap_or_else(|| {
            usable
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| min_x(a).total_cmp(&min_x(b)))
                .map(|(i, _)| i)
                .unwrap_or(0)
        });

    let mut used = vec![false; usable.len()];
    used[seed_pos] = true;

    let seed = usable[seed_pos];
    let mut segments = vec![OrientedSegment {
        line_id: seed.id,
        start: seed.start(),
        end: seed.end(),
        reversed: false,
    }];

    let loop_start = segments[0].start;
    let mut cursor = segments[0].end;
    let mut closed = false;

    // Each wall joins at most once, so the walk is bounded by the input
    for _ in 1..usable.len() + 1 {
        if endpoint_distance(cursor, loop_start) <= SNAP_DISTANCE && segments.len() >= 3 {
            closed = true;
            break;
        }

        let mut best: Option<(usize, bool, f64)> = None;
        for (i, line) in usable.iter().enumerate() {
            if used[i] {
                continue;
            }
            let d_start = endpoint_distance(cursor, line.start());
            let d_end = endpoint_distance(cursor, line.end());
            let (reversed, d) = if d_start <= d_end {
                (false, d_start)
            } else {
                (true, d_end)
            };
            if d <= SNAP_DISTANCE && best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((i, reversed, d));
            }
        }

        let Some((next, reversed, _)) = best else {
            break;
        };
        used[next] = true;

        let line = usable[next];
        let (start, end) = if reversed {
            (line.end(), line.start())
        } else {
            (line.start(), line.end())
        };
        segments.push(OrientedSegment {
            line_id: line.id,
            start,
            end,
            reversed,
        });
        cursor = end;
    }

    if !closed {
        tracing::warn!(
            segments = segments.len(),
            walls = usable.len(),
            "exterior wall loop did not close"
        );
    }

    WallLoop { segments, closed }
}
