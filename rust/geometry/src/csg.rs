// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG boolean operations for opening cutouts
//!
//! Wall solids subtract door and window volumes through csgrs. The
//! conversions here bridge between the indexed `Mesh` format and the
//! polygon soup csgrs operates on.

use crate::error::Result;
use crate::mesh::{box_mesh, Mesh};
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use nalgebra::{Point3, Vector3};

/// CSG processor for mesh subtraction
pub struct CsgProcessor {
    /// Epsilon for degenerate-geometry filtering
    pub epsilon: f64,
}

impl CsgProcessor {
    pub fn new() -> Self {
        Self { epsilon: 1e-6 }
    }

    /// Subtract a tool mesh from a host mesh (host - tool)
    pub fn subtract_mesh(&self, host_mesh: &Mesh, tool_mesh: &Mesh) -> Result<Mesh> {
        use csgrs::traits::CSG;

        // Fast path: nothing to subtract
        if tool_mesh.is_empty() {
            return Ok(host_mesh.clone());
        }
        if host_mesh.is_empty() {
            return Ok(Mesh::new());
        }

        let host_csg = Self::mesh_to_csgrs(host_mesh)?;
        let tool_csg = Self::mesh_to_csgrs(tool_mesh)?;

        let result_csg = host_csg.difference(&tool_csg);

        Self::csgrs_to_mesh(&result_csg)
    }

    /// Subtract an axis-aligned box volume from a mesh
    pub fn subtract_box(&self, mesh: &Mesh, min: Point3<f64>, max: Point3<f64>) -> Result<Mesh> {
        if mesh.is_empty() {
            return Ok(Mesh::new());
        }
        self.subtract_mesh(mesh, &box_mesh(min, max))
    }

    /// Convert the indexed mesh format to a csgrs polygon mesh
    fn mesh_to_csgrs(mesh: &Mesh) -> Result<csgrs::mesh::Mesh<()>> {
        use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};

        let mut polygons = Vec::with_capacity(mesh.triangle_count());

        for tri in mesh.indices.chunks_exact(3) {
            let v0 = mesh.position(tri[0]);
            let v1 = mesh.position(tri[1]);
            let v2 = mesh.position(tri[2]);

            // Face normal from the triangle edges; degenerate triangles
            // would propagate NaN through csgrs, so they are skipped
            let edge1 = v1 - v0;
            let edge2 = v2 - v0;
            let face_normal = match edge1.cross(&edge2).try_normalize(1e-10) {
                Some(n) => n,
                None => continue,
            };

            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];
            polygons.push(Polygon::new(vertices, None));
        }

        Ok(CSGMesh::from_polygons(&polygons, None))
    }

    /// Convert a csgrs polygon mesh back to the indexed mesh format
    ///
    /// csgrs produces n-gons after boolean operations; anything beyond a
    /// triangle is projected to its plane and re-triangulated.
    fn csgrs_to_mesh(csg_mesh: &csgrs::mesh::Mesh<()>) -> Result<Mesh> {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            // FAST PATH: triangle
            if vertices.len() == 3 {
                let base = mesh.vertex_count() as u32;
                for v in vertices {
                    mesh.add_vertex(v.pos, v.normal);
                }
                mesh.add_triangle(base, base + 1, base + 2);
                continue;
            }

            let points_3d: Vec<Point3<f64>> = vertices.iter().map(|v| v.pos).collect();

            // Prefer the polygon's own normal, falling back to a computed
            // one when csgrs hands back a zero/NaN normal
            let raw_normal = Vector3::new(
                vertices[0].normal[0],
                vertices[0].normal[1],
                vertices[0].normal[2],
            );
            let normal = match raw_normal.try_normalize(1e-10) {
                Some(n) if n.x.is_finite() && n.y.is_finite() && n.z.is_finite() => n,
                _ => match calculate_polygon_normal(&points_3d).try_normalize(1e-10) {
                    Some(n) => n,
                    None => continue, // Degenerate polygon
                },
            };

            let (points_2d, _, _, _) = project_to_2d(&points_3d, &normal);
            let indices = match triangulate_polygon(&points_2d) {
                Ok(idx) => idx,
                Err(_) => continue,
            };

            let base = mesh.vertex_count();
            for v in vertices {
                mesh.add_vertex(v.pos, v.normal);
            }
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(
                    (base + tri[0]) as u32,
                    (base + tri[1]) as u32,
                    (base + tri[2]) as u32,
                );
            }
        }

        Ok(mesh)
    }
}

impl Default for CsgProcessor {
    fn default() -> Self {
        Self::new()
    }
}
