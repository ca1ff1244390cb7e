// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan-to-world transforms and wall-local frames
//!
//! Plan space is 2D, y grows downward on screen. World space is Y-up:
//! plan (x, y) maps to world (x', 0, z') with the plan centroid at the
//! origin and plan units scaled to meters.

use nalgebra::{Matrix4, Point3, Vector3};
use plan3d_model::defaults::PLAN_UNITS_PER_METER;
use plan3d_model::{Line, Point};

/// Axis-aligned bounding box of the plan, in plan units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl PlanBounds {
    /// Bounds of all wall endpoints, `None` for an empty plan
    pub fn of_lines(lines: &[Line]) -> Option<Self> {
        let mut iter = lines.iter().flat_map(|line| {
            let (x1, y1) = line.start();
            let (x2, y2) = line.end();
            [(x1, y1), (x2, y2)]
        });

        let (fx, fy) = iter.next()?;
        let mut bounds = Self {
            min_x: fx,
            min_y: fy,
            max_x: fx,
            max_y: fy,
        };
        for (x, y) in iter {
            bounds.min_x = bounds.min_x.min(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_x = bounds.max_x.max(x);
            bounds.max_y = bounds.max_y.max(y);
        }
        Some(bounds)
    }

    /// Bounds of loose floor-plan points
    pub fn of_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Maps plan coordinates to centered, meter-scaled world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanTransform {
    pub center_x: f64,
    pub center_y: f64,
    pub units_per_meter: f64,
}

impl PlanTransform {
    pub fn new(center_x: f64, center_y: f64) -> Self {
        Self {
            center_x,
            center_y,
            units_per_meter: PLAN_UNITS_PER_METER,
        }
    }

    /// Transform centered on the plan bounds
    pub fn from_bounds(bounds: &PlanBounds) -> Self {
        Self::new(bounds.center_x(), bounds.center_y())
    }

    /// Plan (x, y) to a world point on the ground plane
    #[inline]
    pub fn to_world(&self, x: f64, y: f64) -> Point3<f64> {
        Point3::new(
            (x - self.center_x) / self.units_per_meter,
            0.0,
            (y - self.center_y) / self.units_per_meter,
        )
    }

    /// World ground-plane point back to plan coordinates
    #[inline]
    pub fn to_plan(&self, world: &Point3<f64>) -> (f64, f64) {
        (
            world.x * self.units_per_meter + self.center_x,
            world.z * self.units_per_meter + self.center_y,
        )
    }

    /// Scale a plan-unit length to meters
    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        value / self.units_per_meter
    }
}

/// Local coordinate frame of one wall
///
/// x runs along the wall, y is vertical, z crosses the wall thickness.
/// The origin sits at the wall's plan midpoint on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFrame {
    /// Wall midpoint on the world ground plane
    pub center: Point3<f64>,
    /// Wall direction angle in the world XZ plane
    pub angle: f64,
    /// Wall length in meters
    pub length: f64,
    cos: f64,
    sin: f64,
}

impl WallFrame {
    /// Frame of a wall line, `None` if the line is degenerate
    pub fn from_line(line: &Line, transform: &PlanTransform) -> Option<Self> {
        if line.is_degenerate() {
            return None;
        }
        let (mx, my) = line.midpoint();
        let angle = line.angle();
        Some(Self {
            center: transform.to_world(mx, my),
            angle,
            length: transform.scale(line.length()),
            cos: angle.cos(),
            sin: angle.sin(),
        })
    }

    /// Unit vector along the wall in world space
    #[inline]
    pub fn along(&self) -> Vector3<f64> {
        Vector3::new(self.cos, 0.0, self.sin)
    }

    /// Unit vector across the wall thickness in world space
    #[inline]
    pub fn across(&self) -> Vector3<f64> {
        Vector3::new(-self.sin, 0.0, self.cos)
    }

    /// Project a world point into the wall-local frame
    #[inline]
    pub fn to_local(&self, world: &Point3<f64>) -> Point3<f64> {
        let d = world - self.center;
        Point3::new(
            d.x * self.cos + d.z * self.sin,
            d.y,
            -d.x * self.sin + d.z * self.cos,
        )
    }

    /// Map a wall-local point back into world space
    #[inline]
    pub fn to_world(&self, local: &Point3<f64>) -> Point3<f64> {
        self.center + self.along() * local.x + Vector3::y() * local.y + self.across() * local.z
    }

    /// Local-to-world matrix, with an extra vertical lift of the origin
    ///
    /// Wall solids are modelled around their own center, so the builder
    /// lifts the frame origin by half the wall height.
    pub fn to_matrix(&self, lift_y: f64) -> Matrix4<f64> {
        let u = self.along();
        let w = self.across();
        Matrix4::new(
            u.x, 0.0, w.x, self.center.x,
            u.y, 1.0, w.y, self.center.y + lift_y,
            u.z, 0.0, w.z, self.center.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
