// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan3D Export
//!
//! Turns a composed scene into deliverables: a glTF 2.0 binary (GLB) of
//! the model, an HTML door/window schedule with embedded elevation
//! thumbnails, and a ZIP archive bundling both. The pipeline is
//! all-or-nothing; a failure at any stage produces no output at all.

pub mod archive;
pub mod error;
pub mod glb;
pub mod pipeline;
pub mod schedule;

pub use archive::ZipWriter;
pub use error::{Error, Result};
pub use glb::write_glb;
pub use pipeline::{export_plan, export_to_file, ExportOptions};
pub use schedule::{build_schedule, render_document, ScheduleRow};
