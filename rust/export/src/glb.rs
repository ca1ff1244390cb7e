// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! glTF 2.0 binary (GLB) serialization
//!
//! Writes the composed scene as a single self-contained GLB: one mesh
//! per slab and wall, plus transform-only nodes for placed items whose
//! geometry lives in external model files. Buffer views are 4-byte
//! aligned as the container format requires.

use plan3d_geometry::Mesh;
use plan3d_scene::SceneDescription;
use serde_json::{json, Value};

use crate::error::{Error, Result};

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const GL_ARRAY_BUFFER: u32 = 34962;
const GL_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const GL_FLOAT: u32 = 5126;
const GL_UNSIGNED_INT: u32 = 5125;

/// Binary buffer under construction, with the JSON that indexes it
struct GlbBuilder {
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
    nodes: Vec<Value>,
}

impl GlbBuilder {
    fn new() -> Self {
        GlbBuilder {
            bin: Vec::new(),
            buffer_views: Vec::new(),
            accessors: Vec::new(),
            meshes: Vec::new(),
            nodes: Vec::new(),
        }
    }

    fn push_view(&mut self, bytes: &[u8], target: u32) -> usize {
        // Every element type here is 4 bytes wide, so section starts
        // stay aligned as long as we never write partial elements
        debug_assert_eq!(self.bin.len() % 4, 0);
        let index = self.buffer_views.len();
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": self.bin.len(),
            "byteLength": bytes.len(),
            "target": target,
        }));
        self.bin.extend_from_slice(bytes);
        index
    }

    /// Append one mesh and its named node
    fn add_mesh(&mut self, name: &str, mesh: &Mesh) -> Result<()> {
        if mesh.positions.len() != mesh.normals.len() {
            return Err(Error::Glb(format!(
                "mesh '{}' has {} position floats but {} normal floats",
                name,
                mesh.positions.len(),
                mesh.normals.len()
            )));
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(Error::Glb(format!(
                "mesh '{}' index count {} is not a triangle list",
                name,
                mesh.indices.len()
            )));
        }

        let vertex_count = mesh.positions.len() / 3;
        let (min, max) = position_extents(&mesh.positions);

        let positions_view = self.push_view(as_bytes_f32(&mesh.positions), GL_ARRAY_BUFFER);
        let normals_view = self.push_view(as_bytes_f32(&mesh.normals), GL_ARRAY_BUFFER);
        let indices_view = self.push_view(as_bytes_u32(&mesh.indices), GL_ELEMENT_ARRAY_BUFFER);

        let positions_accessor = self.accessors.len();
        self.accessors.push(json!({
            "bufferView": positions_view,
            "componentType": GL_FLOAT,
            "count": vertex_count,
            "type": "VEC3",
            "min": min,
            "max": max,
        }));
        let normals_accessor = self.accessors.len();
        self.accessors.push(json!({
            "bufferView": normals_view,
            "componentType": GL_FLOAT,
            "count": vertex_count,
            "type": "VEC3",
        }));
        let indices_accessor = self.accessors.len();
        self.accessors.push(json!({
            "bufferView": indices_view,
            "componentType": GL_UNSIGNED_INT,
            "count": mesh.indices.len(),
            "type": "SCALAR",
        }));

        let mesh_index = self.meshes.len();
        self.meshes.push(json!({
            "name": name,
            "primitives": [{
                "attributes": {
                    "POSITION": positions_accessor,
                    "NORMAL": normals_accessor,
                },
                "indices": indices_accessor,
            }],
        }));
        self.nodes.push(json!({ "name": name, "mesh": mesh_index }));
        Ok(())
    }
}

/// Serialize the scene into a GLB byte buffer
///
/// Slabs and walls carry their triangle meshes; items become
/// transform-only nodes with the model path in `extras`, so a consumer
/// can resolve the external geometry itself.
pub fn write_glb(scene: &SceneDescription) -> Result<Vec<u8>> {
    let mut builder = GlbBuilder::new();

    if let Some(floor) = &scene.floor {
        builder.add_mesh("floor", &floor.mesh)?;
    }
    if let Some(roof) = &scene.roof {
        builder.add_mesh("roof", &roof.mesh)?;
    }
    for wall in &scene.walls {
        builder.add_mesh(&format!("wall:{}", wall.line_id), &wall.mesh)?;
    }

    for item in &scene.items {
        let half = item.rotation[1] / 2.0;
        builder.nodes.push(json!({
            "name": format!("item:{}", item.id),
            "translation": item.position,
            "rotation": [0.0, half.sin(), 0.0, half.cos()],
            "extras": { "path": item.path, "kind": item.kind },
        }));
    }

    if builder.nodes.is_empty() {
        return Err(Error::EmptyScene);
    }

    let scene_nodes: Vec<usize> = (0..builder.nodes.len()).collect();
    let mut document = json!({
        "asset": { "version": "2.0", "generator": "plan3d-export" },
        "scene": 0,
        "scenes": [{ "nodes": scene_nodes }],
        "nodes": builder.nodes,
    });
    if !builder.meshes.is_empty() {
        let root = document
            .as_object_mut()
            .ok_or_else(|| Error::Glb("document root is not an object".to_string()))?;
        root.insert("meshes".to_string(), Value::Array(builder.meshes));
        root.insert("accessors".to_string(), Value::Array(builder.accessors));
        root.insert("bufferViews".to_string(), Value::Array(builder.buffer_views));
        root.insert(
            "buffers".to_string(),
            json!([{ "byteLength": builder.bin.len() }]),
        );
    }

    let mut json_bytes = serde_json::to_vec(&document).map_err(|e| Error::Glb(e.to_string()))?;
    // JSON chunks pad with spaces, BIN chunks with zeros
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    let mut bin = builder.bin;
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let mut total = 12 + 8 + json_bytes.len();
    if !bin.is_empty() {
        total += 8 + bin.len();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_bytes);
    if !bin.is_empty() {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin);
    }

    tracing::debug!(bytes = out.len(), "serialized GLB");
    Ok(out)
}

fn position_extents(positions: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let mut min = vec![f32::MAX; 3];
    let mut max = vec![f32::MIN; 3];
    for chunk in positions.chunks_exact(3) {
        for axis in 0..3 {
            min[axis] = min[axis].min(chunk[axis]);
            max[axis] = max[axis].max(chunk[axis]);
        }
    }
    (min, max)
}

fn as_bytes_f32(values: &[f32]) -> &[u8] {
    // f32 has no invalid bit patterns; layout is plain IEEE 754 LE
    unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<u8>(), values.len() * 4) }
}

fn as_bytes_u32(values: &[u32]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<u8>(), values.len() * 4) }
}
