// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera rig
//!
//! Two exclusive modes: free orbit around a target, and tour mode that
//! circles the active tour point. Tour angles advance by elapsed time,
//! not frame count, and the position eases toward the orbit ring, so
//! the motion is frame-rate independent.

use nalgebra::{Point3, Vector3};
use plan3d_model::TourPoint;

/// Orbit distance around an active tour point, in meters
pub const TOUR_RADIUS: f64 = 2.0;
/// Tour orbit speed in radians per second
pub const TOUR_ANGULAR_SPEED: f64 = 0.5;
/// Per-frame easing factor toward the tour orbit position
pub const TOUR_LERP_FACTOR: f64 = 0.1;
/// Camera height above a tour point while orbiting it
pub const TOUR_HEIGHT: f64 = 0.6;

/// Perspective camera pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    /// Vertical field of view in radians
    pub fov_y: f64,
    pub aspect: f64,
}

impl Camera {
    pub fn new(position: Point3<f64>, target: Point3<f64>) -> Self {
        Self {
            position,
            target,
            fov_y: std::f64::consts::FRAC_PI_3,
            aspect: 16.0 / 9.0,
        }
    }

    /// World-space ray through a normalized device coordinate
    ///
    /// `ndc` components run from -1 to 1, x rightward, y upward.
    /// Returns origin and normalized direction.
    pub fn ray_through_ndc(&self, ndc_x: f64, ndc_y: f64) -> (Point3<f64>, Vector3<f64>) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);

        let half_h = (self.fov_y / 2.0).tan();
        let direction =
            (forward + right * (ndc_x * half_h * self.aspect) + up * (ndc_y * half_h)).normalize();

        (self.position, direction)
    }
}

/// Exclusive camera modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Orbit,
    /// Circling the tour point with this id
    Tour { point_id: u64 },
}

/// Stateful camera controller
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub camera: Camera,
    mode: CameraMode,
    /// Current angle on the tour orbit ring
    tour_angle: f64,
}

impl CameraRig {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            mode: CameraMode::Orbit,
            tour_angle: 0.0,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switch back to free orbit around the given target
    pub fn enter_orbit(&mut self, target: Point3<f64>) {
        self.mode = CameraMode::Orbit;
        self.camera.target = target;
    }

    /// Start touring a point
    ///
    /// Selecting a different point while touring simply overwrites the
    /// active target; the rig eases over from wherever it is.
    pub fn enter_tour(&mut self, point_id: u64) {
        if self.mode != (CameraMode::Tour { point_id }) {
            self.mode = CameraMode::Tour { point_id };
            self.tour_angle = 0.0;
        }
    }

    /// Advance tour motion by the elapsed frame time in seconds
    ///
    /// No-op outside tour mode or when the active point is missing.
    pub fn update_tour(&mut self, points: &[TourPoint], dt: f64) {
        let CameraMode::Tour { point_id } = self.mode else {
            return;
        };
        let Some(point) = points.iter().find(|p| p.id == point_id) else {
            tracing::warn!(point_id, "active tour point no longer exists");
            self.mode = CameraMode::Orbit;
            return;
        };

        self.tour_angle += TOUR_ANGULAR_SPEED * dt;

        let center = Point3::new(point.position[0], point.position[1], point.position[2]);
        let desired = Point3::new(
            center.x + TOUR_RADIUS * self.tour_angle.cos(),
            center.y + TOUR_HEIGHT,
            center.z + TOUR_RADIUS * self.tour_angle.sin(),
        );

        self.camera.position += (desired - self.camera.position) * TOUR_LERP_FACTOR;
        self.camera.target = center;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tour_point(id: u64, x: f64, z: f64) -> TourPoint {
        TourPoint {
            id,
            position: [x, 0.0, z],
            look_at: [x, 0.0, z + 1.0],
            title: format!("Point {id}"),
        }
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::new(Point3::new(0.0, 2.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let (origin, direction) = camera.ray_through_ndc(0.0, 0.0);

        assert_eq!(origin, camera.position);
        let expected = (camera.target - camera.position).normalize();
        assert_relative_eq!(direction.x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(direction.y, expected.y, epsilon = 1e-12);
        assert_relative_eq!(direction.z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn test_edge_ray_deviates_right() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let (_, direction) = camera.ray_through_ndc(1.0, 0.0);
        // Looking down -z, ndc +x is world +x
        assert!(direction.x > 0.0);
    }

    #[test]
    fn test_tour_angle_is_time_based() {
        let camera = Camera::new(Point3::new(5.0, 1.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let points = [tour_point(1, 0.0, 0.0)];

        let mut fast = CameraRig::new(camera);
        fast.enter_tour(1);
        for _ in 0..10 {
            fast.update_tour(&points, 0.1);
        }

        let mut slow = CameraRig::new(camera);
        slow.enter_tour(1);
        slow.update_tour(&points, 1.0);

        // Same elapsed time, same orbit angle
        assert_relative_eq!(fast.tour_angle, slow.tour_angle, epsilon = 1e-12);
    }

    #[test]
    fn test_tour_converges_to_orbit_ring() {
        let camera = Camera::new(Point3::new(50.0, 1.0, 50.0), Point3::new(0.0, 0.0, 0.0));
        let points = [tour_point(1, 0.0, 0.0)];
        let mut rig = CameraRig::new(camera);
        rig.enter_tour(1);

        for _ in 0..400 {
            rig.update_tour(&points, 1.0 / 60.0);
        }

        let radial = Vector3::new(rig.camera.position.x, 0.0, rig.camera.position.z).norm();
        assert!((radial - TOUR_RADIUS).abs() < 0.2);
        assert_eq!(rig.camera.target, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_new_tour_point_overwrites_target() {
        let camera = Camera::new(Point3::new(5.0, 1.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let points = [tour_point(1, 0.0, 0.0), tour_point(2, 10.0, 0.0)];
        let mut rig = CameraRig::new(camera);

        rig.enter_tour(1);
        rig.update_tour(&points, 0.5);
        assert_eq!(rig.mode(), CameraMode::Tour { point_id: 1 });

        rig.enter_tour(2);
        rig.update_tour(&points, 0.5);
        assert_eq!(rig.mode(), CameraMode::Tour { point_id: 2 });
        assert_relative_eq!(rig.camera.target.x, 10.0);
    }

    #[test]
    fn test_missing_tour_point_drops_to_orbit() {
        let camera = Camera::new(Point3::new(5.0, 1.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let mut rig = CameraRig::new(camera);
        rig.enter_tour(9);
        rig.update_tour(&[], 0.1);
        assert_eq!(rig.mode(), CameraMode::Orbit);
    }

    #[test]
    fn test_orbit_mode_ignores_tour_update() {
        let camera = Camera::new(Point3::new(5.0, 1.0, 5.0), Point3::new(0.0, 0.0, 0.0));
        let points = [tour_point(1, 0.0, 0.0)];
        let mut rig = CameraRig::new(camera);

        rig.update_tour(&points, 1.0);
        assert_eq!(rig.camera.position, Point3::new(5.0, 1.0, 5.0));
    }
}
