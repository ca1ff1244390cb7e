// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Item and texture catalog contracts
//!
//! Maps the backend catalog payloads (`GET /api/items/`,
//! `GET /api/upload-texture/`) into the groups the editor sidebar shows,
//! and resolves fallback asset URLs against the media server.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One entry of the backend item catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub item_name: String,
    pub category: String,
    pub glb_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer3d: Option<String>,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    #[serde(rename = "type")]
    pub item_type: String,
}

/// Texture slot classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Wall,
    Floor,
    Ceiling,
}

/// One entry of the texture catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextureEntry {
    pub texture_name: String,
    pub texture_file: String,
    pub texture_type: TextureKind,
}

/// Items of one sidebar category, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarGroup {
    pub category: String,
    pub items: Vec<CatalogItem>,
}

/// Group catalog items per category for the floor-item picker
///
/// Ceiling- and wall-mounted items are placed through dedicated pickers and
/// are excluded here.
pub fn sidebar_groups(items: &[CatalogItem]) -> Vec<SidebarGroup> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<SidebarGroup> = Vec::new();

    for item in items {
        if item.item_type == "Ceiling" || item.item_type == "Wall" {
            continue;
        }
        let slot = *index.entry(item.category.as_str()).or_insert_with(|| {
            groups.push(SidebarGroup {
                category: item.category.clone(),
                items: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].items.push(item.clone());
    }

    groups
}

/// Group texture entries by their slot kind
pub fn texture_groups(entries: &[TextureEntry]) -> FxHashMap<TextureKind, Vec<TextureEntry>> {
    let mut groups: FxHashMap<TextureKind, Vec<TextureEntry>> = FxHashMap::default();
    for entry in entries {
        groups
            .entry(entry.texture_type)
            .or_default()
            .push(entry.clone());
    }
    groups
}

/// Fallback asset URL when the primary catalog URL fails to load
///
/// Pattern: `{media_server}/items/items/{basename(path)}`
pub fn fallback_asset_url(media_server: &str, path: &str) -> String {
    let basename = path.rsplit('/').next().unwrap_or(path);
    format!(
        "{}/items/items/{}",
        media_server.trim_end_matches('/'),
        basename
    )
}
