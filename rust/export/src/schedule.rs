// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door and window schedule
//!
//! Groups opening instances into schedule rows and renders the tabular
//! document. The output format is isolated behind `render_document`, so
//! a different backend can replace the HTML rendering without touching
//! the grouping.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use plan3d_model::{OpeningKind, ShapeData};
use rustc_hash::FxHashMap;

/// One schedule row: a group of identical openings
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    /// Sequential per-kind id: `D1, D2, ...` / `W1, W2, ...`
    pub group_id: String,
    pub kind: OpeningKind,
    pub model_name: Option<String>,
    /// Opening size in plan units
    pub width: f64,
    pub height: f64,
    pub count: usize,
}

impl ScheduleRow {
    /// Opening area in plan units squared
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Group openings by `(kind, model, width, height)` into schedule rows
///
/// Rows keep first-seen order; group ids are numbered per kind.
pub fn build_schedule(shapes: &[ShapeData]) -> Vec<ScheduleRow> {
    let mut index: FxHashMap<(OpeningKind, Option<&str>, u64, u64), usize> = FxHashMap::default();
    let mut rows: Vec<ScheduleRow> = Vec::new();
    let mut door_count = 0usize;
    let mut window_count = 0usize;

    for shape in shapes {
        let (width, height) = shape.size();
        let key = (
            shape.kind,
            shape.model_name.as_deref(),
            width.to_bits(),
            height.to_bits(),
        );

        if let Some(&slot) = index.get(&key) {
            rows[slot].count += 1;
            continue;
        }

        let group_id = match shape.kind {
            OpeningKind::Door => {
                door_count += 1;
                format!("D{}", door_count)
            }
            OpeningKind::Window => {
                window_count += 1;
                format!("W{}", window_count)
            }
        };
        index.insert(key, rows.len());
        rows.push(ScheduleRow {
            group_id,
            kind: shape.kind,
            model_name: shape.model_name.clone(),
            width,
            height,
            count: 1,
        });
    }

    rows
}

/// Elevation thumbnail for one row, as a base64 SVG data URL
///
/// Doors draw floor-seated with a handle, windows as a crossed pane.
fn thumbnail_data_url(row: &ScheduleRow) -> String {
    // Fit the opening into a 96x96 viewbox, preserving aspect
    let scale = 80.0 / row.width.max(row.height);
    let w = row.width * scale;
    let h = row.height * scale;
    let x = (96.0 - w) / 2.0;
    let y = (96.0 - h) / 2.0;

    let detail = match row.kind {
        OpeningKind::Door => format!(
            r##"<circle cx="{:.1}" cy="{:.1}" r="2.5" fill="#555"/>"##,
            x + w * 0.82,
            y + h * 0.55
        ),
        OpeningKind::Window => format!(
            concat!(
                r##"<line x1="{0:.1}" y1="{2:.1}" x2="{1:.1}" y2="{2:.1}" stroke="#888"/>"##,
                r##"<line x1="{3:.1}" y1="{4:.1}" x2="{3:.1}" y2="{5:.1}" stroke="#888"/>"##
            ),
            x,
            x + w,
            y + h / 2.0,
            x + w / 2.0,
            y,
            y + h
        ),
    };

    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="96" viewBox="0 0 96 96">"#,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" "#,
            r##"fill="#eef2f5" stroke="#444" stroke-width="2"/>{}</svg>"##
        ),
        x, y, w, h, detail
    );

    format!("data:image/svg+xml;base64,{}", BASE64.encode(svg))
}

/// Render the schedule as a self-contained HTML document
pub fn render_document(rows: &[ScheduleRow]) -> String {
    let mut body = String::new();
    for row in rows {
        let kind = match row.kind {
            OpeningKind::Door => "Door",
            OpeningKind::Window => "Window",
        };
        body.push_str(&format!(
            concat!(
                "<tr><td>{}</td><td>{}</td><td>{}</td>",
                "<td>{:.0}</td><td>{:.0}</td><td>{:.0}</td><td>{}</td>",
                r#"<td><img src="{}" alt="{} elevation" width="48" height="48"/></td></tr>"#,
                "\n"
            ),
            row.group_id,
            kind,
            row.model_name.as_deref().unwrap_or("-"),
            row.width,
            row.height,
            row.area(),
            row.count,
            thumbnail_data_url(row),
            row.group_id,
        ));
    }

    format!(
        concat!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">",
            "<title>Door &amp; Window Schedule</title>",
            "<style>",
            "body{{font-family:sans-serif;margin:2em}}",
            "table{{border-collapse:collapse}}",
            "td,th{{border:1px solid #999;padding:4px 10px;text-align:left}}",
            "th{{background:#f0f0f0}}",
            "</style></head><body>\n",
            "<h1>Door &amp; Window Schedule</h1>\n",
            "<table>\n<tr><th>ID</th><th>Type</th><th>Model</th>",
            "<th>Width</th><th>Height</th><th>Area</th><th>Count</th>",
            "<th>Elevation</th></tr>\n{}</table>\n</body></html>\n"
        ),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opening(
        id: u64,
        kind: OpeningKind,
        width: f64,
        height: f64,
        model: Option<&str>,
    ) -> ShapeData {
        ShapeData {
            id,
            kind,
            x: 0.0,
            y: 0.0,
            width: Some(width),
            height: Some(height),
            rotation: None,
            flip: false,
            wall_id: 1,
            model_name: model.map(|m| m.to_string()),
        }
    }

    #[test]
    fn test_identical_openings_share_a_row() {
        let shapes = vec![
            opening(1, OpeningKind::Door, 90.0, 210.0, Some("oak")),
            opening(2, OpeningKind::Door, 90.0, 210.0, Some("oak")),
            opening(3, OpeningKind::Window, 120.0, 100.0, None),
        ];

        let rows = build_schedule(&shapes);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group_id, "D1");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].group_id, "W1");
        assert_eq!(rows[1].count, 1);
    }

    #[test]
    fn test_variants_get_their_own_rows() {
        let shapes = vec![
            opening(1, OpeningKind::Door, 90.0, 210.0, Some("oak")),
            opening(2, OpeningKind::Door, 90.0, 210.0, Some("pine")),
            opening(3, OpeningKind::Door, 80.0, 210.0, Some("oak")),
            opening(4, OpeningKind::Window, 120.0, 100.0, None),
            opening(5, OpeningKind::Window, 60.0, 50.0, None),
        ];

        let rows = build_schedule(&shapes);
        assert_eq!(rows.len(), 5);
        let ids: Vec<&str> = rows.iter().map(|r| r.group_id.as_str()).collect();
        assert_eq!(ids, vec!["D1", "D2", "D3", "W1", "W2"]);
    }

    #[test]
    fn test_default_sizes_group_together() {
        // No explicit sizes: the per-kind defaults apply and match
        let shapes = vec![
            ShapeData {
                width: None,
                height: None,
                ..opening(1, OpeningKind::Window, 0.0, 0.0, None)
            },
            ShapeData {
                width: None,
                height: None,
                ..opening(2, OpeningKind::Window, 0.0, 0.0, None)
            },
        ];

        let rows = build_schedule(&shapes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].width, 60.0);
        assert_eq!(rows[0].height, 50.0);
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn test_area() {
        let rows = build_schedule(&[opening(1, OpeningKind::Door, 90.0, 210.0, None)]);
        assert_eq!(rows[0].area(), 18900.0);
    }

    #[test]
    fn test_render_document() {
        let rows = build_schedule(&[
            opening(1, OpeningKind::Door, 90.0, 210.0, Some("oak")),
            opening(2, OpeningKind::Window, 120.0, 100.0, None),
        ]);

        let html = render_document(&rows);
        assert!(html.contains("<td>D1</td>"));
        assert!(html.contains("<td>W1</td>"));
        assert!(html.contains("<td>oak</td>"));
        assert!(html.contains("<td>18900</td>"));
        assert!(html.contains("data:image/svg+xml;base64,"));
        // Self-contained: no external references
        assert!(!html.contains("http://"));
    }
}
