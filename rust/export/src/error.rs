// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a scene
///
/// Export is all-or-nothing: the first error aborts the pipeline and no
/// partial archive is produced.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Scene composition failed: {0}")]
    Scene(#[from] plan3d_scene::Error),

    #[error("Invalid plan: {0}")]
    Model(#[from] plan3d_model::ModelError),

    #[error("GLB serialization failed: {0}")]
    Glb(String),

    #[error("Archive write failed: {0}")]
    Archive(#[from] std::io::Error),

    #[error("Nothing to export: the scene has no geometry")]
    EmptyScene,
}
