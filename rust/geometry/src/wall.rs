// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall solid construction
//!
//! Builds each wall as a box solid in its local frame, subtracts door
//! and window volumes there (the cutouts stay axis-aligned, which keeps
//! the booleans robust), then transforms the result into world space.
//! Doors sit on the floor; windows center on the wall's mid height.

use crate::csg::CsgProcessor;
use crate::error::{Error, Result};
use crate::extrusion::apply_transform;
use crate::mesh::{box_mesh, Mesh};
use crate::transform::{PlanTransform, WallFrame};
use nalgebra::Point3;
use plan3d_model::{Line, OpeningKind, ShapeData, WallClassification};
use smallvec::SmallVec;

/// Extra cutout depth beyond the wall faces, in meters
const CUTOUT_PADDING: f64 = 1e-3;

/// Input for one wall solid, in plan units
#[derive(Debug, Clone)]
pub struct WallSolidSpec {
    pub line: Line,
    pub height: f64,
    pub thickness: f64,
}

/// Attachment point for a door/window model, in the wall's local frame
///
/// `local_x` runs along the wall from its midpoint, `local_y` is the
/// opening center above the floor line. Sizes are in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningAnchor {
    pub shape_id: u64,
    pub kind: OpeningKind,
    pub local_x: f64,
    pub local_y: f64,
    pub width: f64,
    pub height: f64,
    /// Yaw for the attached model: faces the plan centroid, plus the
    /// manual flip
    pub rotation_y: f64,
}

/// A finished wall: world-space mesh plus attachment metadata
#[derive(Debug, Clone)]
pub struct WallSolid {
    pub line_id: u64,
    pub mesh: Mesh,
    pub frame: WallFrame,
    pub classification: WallClassification,
    pub anchors: SmallVec<[OpeningAnchor; 2]>,
}

/// Opening center along the wall axis, in meters from the wall midpoint
#[inline]
fn local_offset(line: &Line, shape: &ShapeData, transform: &PlanTransform) -> f64 {
    let (mx, my) = line.midpoint();
    let angle = line.angle();
    let t = (shape.x - mx) * angle.cos() + (shape.y - my) * angle.sin();
    transform.scale(t)
}

/// Build one wall solid with its opening cutouts
///
/// Openings are clamped along the wall so the cutout never pokes past
/// either end. The wall's outer bounds are unchanged by any cutout.
pub fn build_wall(
    spec: &WallSolidSpec,
    openings: &[&ShapeData],
    classification: WallClassification,
    transform: &PlanTransform,
) -> Result<WallSolid> {
    let frame = WallFrame::from_line(&spec.line, transform)
        .ok_or(Error::DegenerateWall(spec.line.id))?;

    let height = transform.scale(spec.height);
    let thickness = transform.scale(spec.thickness);
    let half_len = frame.length / 2.0;
    let half_h = height / 2.0;
    let half_t = thickness / 2.0;

    // Box solid centered in the local frame
    let mut mesh = box_mesh(
        Point3::new(-half_len, -half_h, -half_t),
        Point3::new(half_len, half_h, half_t),
    );

    let processor = CsgProcessor::new();
    let mut anchors: SmallVec<[OpeningAnchor; 2]> = SmallVec::new();

    let base_rotation = if classification.is_facing_inward {
        std::f64::consts::PI
    } else {
        0.0
    };

    for shape in openings {
        let (w_units, h_units) = shape.size();
        let width = transform.scale(w_units);
        let opening_height = transform.scale(h_units).min(height);

        // Keep the cutout within the wall span
        let max_x = (half_len - width / 2.0).max(0.0);
        let local_x = local_offset(&spec.line, shape, transform).clamp(-max_x, max_x);

        // Doors rest on the floor, windows center vertically
        let local_y = match shape.kind {
            OpeningKind::Door => -half_h + opening_height / 2.0,
            OpeningKind::Window => 0.0,
        };

        mesh = processor.subtract_box(
            &mesh,
            Point3::new(
                local_x - width / 2.0,
                local_y - opening_height / 2.0,
                -(half_t + CUTOUT_PADDING),
            ),
            Point3::new(
                local_x + width / 2.0,
                local_y + opening_height / 2.0,
                half_t + CUTOUT_PADDING,
            ),
        )?;

        let rotation_y = base_rotation + if shape.flip { std::f64::consts::PI } else { 0.0 };
        anchors.push(OpeningAnchor {
            shape_id: shape.id,
            kind: shape.kind,
            local_x,
            // Anchor height measured from the floor line
            local_y: local_y + half_h,
            width,
            height: opening_height,
            rotation_y: rotation_y % std::f64::consts::TAU,
        });
    }

    // Lift by half the height so the wall stands on the ground plane
    apply_transform(&mut mesh, &frame.to_matrix(half_h));

    Ok(WallSolid {
        line_id: spec.line.id,
        mesh,
        frame,
        classification,
        anchors,
    })
}
