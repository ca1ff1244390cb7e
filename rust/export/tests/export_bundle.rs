// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end export: a rectangular room with repeated openings goes
//! in, a ZIP with a valid GLB and a grouped schedule comes out.

use std::io::Read;

use flate2::read::DeflateDecoder;
use plan3d_export::{export_plan, export_to_file, Error, ExportOptions};
use plan3d_model::{Line, OpeningKind, PlanState, Point, ShapeData};

fn opening(id: u64, kind: OpeningKind, x: f64, y: f64, w: f64, h: f64, wall_id: u64) -> ShapeData {
    ShapeData {
        id,
        kind,
        x,
        y,
        width: Some(w),
        height: Some(h),
        rotation: None,
        flip: false,
        wall_id,
        model_name: None,
    }
}

fn room_with_openings() -> PlanState {
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
        shapes: vec![
            // Two identical doors and one window
            opening(10, OpeningKind::Door, 150.0, 0.0, 90.0, 210.0, 1),
            opening(11, OpeningKind::Door, 350.0, 0.0, 90.0, 210.0, 1),
            opening(12, OpeningKind::Window, 500.0, 200.0, 120.0, 100.0, 2),
        ],
        ..Default::default()
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Walk local file headers and inflate each entry
fn unzip(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut entries = Vec::new();
    let mut cursor = 0;
    while cursor + 4 <= archive.len() && read_u32(archive, cursor) == 0x0403_4b50 {
        let compressed_size = read_u32(archive, cursor + 18) as usize;
        let name_len = read_u16(archive, cursor + 26) as usize;
        let extra_len = read_u16(archive, cursor + 28) as usize;
        let name_start = cursor + 30;
        let name = String::from_utf8(archive[name_start..name_start + name_len].to_vec()).unwrap();

        let data_start = name_start + name_len + extra_len;
        let mut decoder = DeflateDecoder::new(&archive[data_start..data_start + compressed_size]);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data).unwrap();

        entries.push((name, data));
        cursor = data_start + compressed_size;
    }
    entries
}

#[test]
fn export_bundles_model_and_schedule() {
    let archive = export_plan(&room_with_openings(), &ExportOptions::default()).unwrap();
    let entries = unzip(&archive);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "model.glb");
    assert_eq!(entries[1].0, "schedule.html");

    // GLB container sanity
    let glb = &entries[0].1;
    assert_eq!(read_u32(glb, 0), 0x4654_6C67);
    assert_eq!(read_u32(glb, 4), 2);
    assert_eq!(read_u32(glb, 8) as usize, glb.len());

    let json_len = read_u32(glb, 12) as usize;
    let document: serde_json::Value = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
    let mesh_names: Vec<&str> = document["meshes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert!(mesh_names.contains(&"floor"));
    for wall in ["wall:1", "wall:2", "wall:3", "wall:4"] {
        assert!(mesh_names.contains(&wall), "missing {}", wall);
    }
}

#[test]
fn schedule_groups_identical_openings() {
    let archive = export_plan(&room_with_openings(), &ExportOptions::default()).unwrap();
    let entries = unzip(&archive);
    let html = String::from_utf8(entries[1].1.clone()).unwrap();

    // The two identical doors collapse into one row with count 2
    assert!(html.contains("<td>D1</td>"));
    assert!(!html.contains("<td>D2</td>"));
    assert!(html.contains("<td>W1</td>"));
    assert!(html.contains("<td>18900</td>")); // 90 x 210
    assert!(html.contains("data:image/svg+xml;base64,"));

    let d1_row = html
        .lines()
        .find(|l| l.contains("<td>D1</td>"))
        .expect("D1 row");
    assert!(d1_row.contains("<td>2</td>"));
}

#[test]
fn failed_export_writes_nothing() {
    let mut state = room_with_openings();
    state.shapes[0].wall_id = 99; // dangling reference

    let path = std::env::temp_dir().join("plan3d_failed_export.zip");
    let _ = std::fs::remove_file(&path);

    let result = export_to_file(&state, &ExportOptions::default(), &path);
    assert!(matches!(result, Err(Error::Model(_))));
    assert!(!path.exists());
}

#[test]
fn roof_option_adds_a_mesh() {
    let mut options = ExportOptions::default();
    options.scene.show_roof = true;

    let archive = export_plan(&room_with_openings(), &options).unwrap();
    let entries = unzip(&archive);
    let glb = &entries[0].1;
    let json_len = read_u32(glb, 12) as usize;
    let document: serde_json::Value = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();

    let mesh_names: Vec<&str> = document["meshes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert!(mesh_names.contains(&"roof"));
}
