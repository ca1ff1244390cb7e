// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D profiles to 3D meshes

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Extrude a 2D profile along the Z axis
///
/// Profile x/y become mesh x/y, the extrusion runs from z = 0 to
/// z = depth. An optional transform maps the result into world space.
#[inline]
pub fn extrude_profile(
    profile: &Profile2D,
    depth: f64,
    transform: Option<Matrix4<f64>>,
) -> Result<Mesh> {
    if depth <= 0.0 {
        return Err(Error::InvalidExtrusion("depth must be positive".to_string()));
    }

    let triangulation = profile.triangulate()?;

    let side_vertices =
        (profile.outer.len() + profile.holes.iter().map(|h| h.len()).sum::<usize>()) * 4;
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + side_vertices,
        triangulation.indices.len() * 2 + side_vertices / 4 * 6,
    );

    create_cap_mesh(&triangulation, 0.0, Vector3::new(0.0, 0.0, -1.0), &mut mesh);
    create_cap_mesh(&triangulation, depth, Vector3::new(0.0, 0.0, 1.0), &mut mesh);

    create_side_walls(&profile.outer, depth, &mut mesh);
    for hole in &profile.holes {
        create_side_walls(hole, depth, &mut mesh);
    }

    if let Some(mat) = transform {
        apply_transform(&mut mesh, &mat);
    }

    Ok(mesh)
}

/// Extrude a horizontal slab directly in world space
///
/// Profile (x, y) maps to world (x, z); the slab spans from
/// `top_y - thickness` up to `top_y`. Used for floor plates, where an
/// extra mirror transform would flip the cap winding.
pub fn extrude_slab(profile: &Profile2D, thickness: f64, top_y: f64) -> Result<Mesh> {
    if thickness <= 0.0 {
        return Err(Error::InvalidExtrusion(
            "thickness must be positive".to_string(),
        ));
    }

    let triangulation = profile.triangulate()?;
    let bottom_y = top_y - thickness;

    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + profile.outer.len() * 4,
        triangulation.indices.len() * 2 + profile.outer.len() * 6,
    );

    // Top cap, +Y normal. Profile y maps to world z, which flips the
    // apparent winding, so the index order is reversed here.
    let base = mesh.vertex_count() as u32;
    for p in &triangulation.points {
        mesh.add_vertex(Point3::new(p.x, top_y, p.y), Vector3::y());
    }
    for tri in triangulation.indices.chunks_exact(3) {
        mesh.add_triangle(
            base + tri[0] as u32,
            base + tri[2] as u32,
            base + tri[1] as u32,
        );
    }

    // Bottom cap, -Y normal
    let base = mesh.vertex_count() as u32;
    for p in &triangulation.points {
        mesh.add_vertex(Point3::new(p.x, bottom_y, p.y), -Vector3::y());
    }
    for tri in triangulation.indices.chunks_exact(3) {
        mesh.add_triangle(
            base + tri[0] as u32,
            base + tri[1] as u32,
            base + tri[2] as u32,
        );
    }

    // Vertical rim
    for boundary in std::iter::once(&profile.outer).chain(profile.holes.iter()) {
        for i in 0..boundary.len() {
            let j = (i + 1) % boundary.len();
            let p0 = &boundary[i];
            let p1 = &boundary[j];

            let edge = Vector3::new(p1.x - p0.x, 0.0, p1.y - p0.y);
            let normal = match Vector3::new(edge.z, 0.0, -edge.x).try_normalize(1e-10) {
                Some(n) => n,
                None => continue, // Skip degenerate edge
            };

            let idx = mesh.vertex_count() as u32;
            mesh.add_vertex(Point3::new(p0.x, bottom_y, p0.y), normal);
            mesh.add_vertex(Point3::new(p1.x, bottom_y, p1.y), normal);
            mesh.add_vertex(Point3::new(p1.x, top_y, p1.y), normal);
            mesh.add_vertex(Point3::new(p0.x, top_y, p0.y), normal);

            mesh.add_triangle(idx, idx + 1, idx + 2);
            mesh.add_triangle(idx, idx + 2, idx + 3);
        }
    }

    Ok(mesh)
}

/// Create a cap mesh (top or bottom) from a triangulation
#[inline]
fn create_cap_mesh(triangulation: &Triangulation, z: f64, normal: Vector3<f64>, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        // Reverse winding for the bottom cap
        if z == 0.0 {
            mesh.add_triangle(i0, i2, i1);
        } else {
            mesh.add_triangle(i0, i1, i2);
        }
    }
}

/// Create side walls for a profile boundary
#[inline]
fn create_side_walls(boundary: &[Point2<f64>], depth: f64, mesh: &mut Mesh) {
    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();
        let p0 = &boundary[i];
        let p1 = &boundary[j];

        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(-edge.y, edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue, // Skip degenerate edge (duplicate points in profile)
        };

        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(Point3::new(p0.x, p0.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, depth), normal);
        mesh.add_vertex(Point3::new(p0.x, p0.y, depth), normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);
    }
}

/// Apply a transformation matrix to a mesh in place
#[inline]
pub fn apply_transform(mesh: &mut Mesh, transform: &Matrix4<f64>) {
    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = transform.transform_point(&point);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    // Normals use the inverse transpose
    let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

    mesh.normals.chunks_exact_mut(3).for_each(|chunk| {
        let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = (normal_matrix * normal.to_homogeneous()).xyz().normalize();
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::create_rectangle;

    #[test]
    fn test_extrude_rectangle() {
        let profile = create_rectangle(10.0, 5.0);
        let mesh = extrude_profile(&profile, 20.0, None).unwrap();

        assert!(mesh.triangle_count() > 0);

        let (min, max) = mesh.bounds();
        assert!((min.x - -5.0).abs() < 0.01);
        assert!((max.x - 5.0).abs() < 0.01);
        assert!((min.y - -2.5).abs() < 0.01);
        assert!((max.y - 2.5).abs() < 0.01);
        assert!((min.z - 0.0).abs() < 0.01);
        assert!((max.z - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_extrude_with_transform() {
        let profile = create_rectangle(10.0, 5.0);
        let transform = Matrix4::new_translation(&Vector3::new(100.0, 200.0, 300.0));
        let mesh = extrude_profile(&profile, 20.0, Some(transform)).unwrap();

        let (min, max) = mesh.bounds();
        assert!((min.x - 95.0).abs() < 0.01);
        assert!((max.x - 105.0).abs() < 0.01);
        assert!((min.z - 300.0).abs() < 0.01);
        assert!((max.z - 320.0).abs() < 0.01);
    }

    #[test]
    fn test_invalid_depth() {
        let profile = create_rectangle(10.0, 5.0);
        assert!(extrude_profile(&profile, -1.0, None).is_err());
        assert!(extrude_slab(&profile, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_slab_spans_thickness() {
        let profile = create_rectangle(5.0, 4.0);
        let mesh = extrude_slab(&profile, 0.1, 0.0).unwrap();

        let (min, max) = mesh.bounds();
        assert!((max.y - 0.0).abs() < 1e-6);
        assert!((min.y - -0.1).abs() < 1e-6);
        // Profile y maps to world z
        assert!((min.z - -2.0).abs() < 1e-6);
        assert!((max.z - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_slab_top_cap_faces_up() {
        let profile = create_rectangle(2.0, 2.0);
        let mesh = extrude_slab(&profile, 0.2, 0.0).unwrap();

        // Every triangle on the top plane must have an upward normal
        let mut top_triangles = 0;
        for tri in mesh.indices.chunks_exact(3) {
            let ys: Vec<f32> = tri
                .iter()
                .map(|&i| mesh.positions[i as usize * 3 + 1])
                .collect();
            if ys.iter().all(|&y| y.abs() < 1e-6) {
                top_triangles += 1;
                let a = mesh.position(tri[0]);
                let b = mesh.position(tri[1]);
                let c = mesh.position(tri[2]);
                let normal = (b - a).cross(&(c - a));
                assert!(normal.y > 0.0, "top cap triangle winds downward");
            }
        }
        assert!(top_triangles >= 2);
    }
}
