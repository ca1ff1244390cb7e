// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D profile definitions and triangulation
//!
//! Floor slabs extrude the reconstructed plan outline; wall solids
//! extrude rectangles. Both go through `Profile2D`.

use crate::error::{Error, Result};
use crate::triangulation::triangulate_polygon_with_holes;
use nalgebra::Point2;

/// 2D profile with optional holes
#[derive(Debug, Clone)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Signed area of the outer boundary (positive = counter-clockwise)
    pub fn signed_area(&self) -> f64 {
        let n = self.outer.len();
        let mut area = 0.0;
        for i in 0..n {
            let a = &self.outer[i];
            let b = &self.outer[(i + 1) % n];
            area += a.x * b.y - b.x * a.y;
        }
        area / 2.0
    }

    /// Triangulate the profile
    ///
    /// Returns triangle indices into the flattened vertex array (outer
    /// boundary first, then each hole in order).
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "profile must have at least 3 vertices".to_string(),
            ));
        }

        let indices = triangulate_polygon_with_holes(&self.outer, &self.holes)?;

        let mut points =
            Vec::with_capacity(self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>());
        points.extend_from_slice(&self.outer);
        for hole in &self.holes {
            if hole.len() >= 3 {
                points.extend_from_slice(hole);
            }
        }

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// Create a rectangular profile centered at the origin
#[inline]
pub fn create_rectangle(width: f64, height: f64) -> Profile2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Profile2D::new(vec![
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_profile() {
        let profile = create_rectangle(10.0, 5.0);
        assert_eq!(profile.outer.len(), 4);
        assert_eq!(profile.holes.len(), 0);

        assert_eq!(profile.outer[0], Point2::new(-5.0, -2.5));
        assert_eq!(profile.outer[2], Point2::new(5.0, 2.5));
        assert!(profile.signed_area() > 0.0);
        assert!((profile.signed_area() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_triangulate_rectangle() {
        let profile = create_rectangle(10.0, 5.0);
        let tri = profile.triangulate().unwrap();

        assert_eq!(tri.points.len(), 4);
        assert_eq!(tri.indices.len(), 6);
    }

    #[test]
    fn test_triangulate_with_hole() {
        let mut profile = create_rectangle(10.0, 10.0);
        let mut hole = vec![
            Point2::new(-2.0, -2.0),
            Point2::new(2.0, -2.0),
            Point2::new(2.0, 2.0),
            Point2::new(-2.0, 2.0),
        ];
        hole.reverse();
        profile.add_hole(hole);

        let tri = profile.triangulate().unwrap();
        assert_eq!(tri.points.len(), 8);
        assert!(tri.indices.len() > 6);
        assert_eq!(tri.indices.len() % 3, 0);
    }

    #[test]
    fn test_too_few_vertices() {
        let profile = Profile2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(profile.triangulate().is_err());
    }
}
