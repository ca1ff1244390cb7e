// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or mutating a scene
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(#[from] plan3d_geometry::Error),

    #[error("Model error: {0}")]
    Model(#[from] plan3d_model::ModelError),

    #[error("No placement in progress")]
    NotPlacing,

    #[error("Item {0} not found in the plan")]
    UnknownItem(u64),

    #[error("Asset fetch failed for {url}: {reason}")]
    AssetFetch { url: String, reason: String },
}
