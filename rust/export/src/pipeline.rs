// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export pipeline
//!
//! Validates the plan, composes the scene, serializes the GLB and the
//! schedule document, and bundles both into one ZIP. Every stage runs
//! to completion before any bytes leave the process, so a failed
//! export never leaves a partial archive behind.

use std::path::Path;

use plan3d_model::PlanState;
use plan3d_scene::{compose_scene, SceneConfig};
use tracing::info;

use crate::archive::ZipWriter;
use crate::error::{Error, Result};
use crate::glb::write_glb;
use crate::schedule::{build_schedule, render_document};

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub scene: SceneConfig,
    /// Entry name of the GLB inside the archive
    pub model_entry: String,
    /// Entry name of the schedule document inside the archive
    pub schedule_entry: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            scene: SceneConfig::default(),
            model_entry: "model.glb".to_string(),
            schedule_entry: "schedule.html".to_string(),
        }
    }
}

/// Export a plan as a ZIP archive, returned as bytes
pub fn export_plan(state: &PlanState, options: &ExportOptions) -> Result<Vec<u8>> {
    state.validate()?;

    let scene = compose_scene(state, &options.scene)?;
    if scene.floor.is_none() && scene.roof.is_none() && scene.walls.is_empty() {
        return Err(Error::EmptyScene);
    }

    let glb = write_glb(&scene)?;
    let schedule = render_document(&build_schedule(&state.shapes));

    let mut writer = ZipWriter::new();
    writer.add_file(&options.model_entry, &glb)?;
    writer.add_file(&options.schedule_entry, schedule.as_bytes())?;
    let archive = writer.finish()?;

    info!(
        walls = scene.walls.len(),
        items = scene.items.len(),
        bytes = archive.len(),
        "exported plan"
    );
    Ok(archive)
}

/// Export a plan to a file on disk
///
/// The file is only written once the whole archive has been built.
pub fn export_to_file(state: &PlanState, options: &ExportOptions, path: &Path) -> Result<()> {
    let archive = export_plan(state, options)?;
    std::fs::write(path, archive)?;
    Ok(())
}
