// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asset cache and model loading
//!
//! Models and textures are cached per resolved URL with manual
//! reference counts; the last release disposes the entry. Loads are
//! async with one retry against the fallback media-server URL, and a
//! cancel flag keeps superseded in-flight loads from applying stale
//! state.

use crate::error::{Error, Result};
use crate::placement::Aabb;
use nalgebra::Point3;
use plan3d_model::fallback_asset_url;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A fetched model payload with its measured bounds
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub bytes: Vec<u8>,
    pub bounds_min: [f64; 3],
    pub bounds_max: [f64; 3],
}

impl ModelData {
    /// Measured bounds for placement scaling
    pub fn measured_bounds(&self) -> Aabb {
        Aabb::new(
            Point3::new(self.bounds_min[0], self.bounds_min[1], self.bounds_min[2]),
            Point3::new(self.bounds_max[0], self.bounds_max[1], self.bounds_max[2]),
        )
    }
}

/// Fetches model payloads by URL
pub trait ModelFetcher {
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<ModelData>> + Send;
}

/// Shared cancellation handle for in-flight loads
///
/// Cloned flags observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Load a model, retrying once against the fallback media-server URL
///
/// Returns `None` when the load was cancelled or both attempts failed;
/// the item then renders absent rather than crashing the scene.
pub async fn load_with_fallback<F: ModelFetcher>(
    fetcher: &F,
    url: &str,
    media_server: &str,
    cancel: &CancelFlag,
) -> Option<ModelData> {
    let primary = fetcher.fetch(url).await;
    if cancel.is_cancelled() {
        return None;
    }

    let primary_err = match primary {
        Ok(data) => return Some(data),
        Err(err) => err,
    };

    let fallback = fallback_asset_url(media_server, url);
    tracing::warn!(%url, %fallback, error = %primary_err, "primary model load failed, retrying");

    let retry = fetcher.fetch(&fallback).await;
    if cancel.is_cancelled() {
        return None;
    }

    match retry {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::error!(%url, %fallback, error = %err, "model load failed on both URLs");
            None
        }
    }
}

struct CacheEntry<R> {
    resource: R,
    refs: usize,
}

/// Reference-counted resource cache keyed by resolved URL
pub struct AssetCache<R> {
    entries: FxHashMap<String, CacheEntry<R>>,
}

impl<R> Default for AssetCache<R> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<R> AssetCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take a reference to a cached resource, if present
    pub fn acquire(&mut self, url: &str) -> Option<&R> {
        let entry = self.entries.get_mut(url)?;
        entry.refs += 1;
        Some(&entry.resource)
    }

    /// Insert a freshly loaded resource with one reference
    ///
    /// Re-inserting an existing URL keeps the cached resource and adds
    /// a reference instead.
    pub fn insert(&mut self, url: &str, resource: R) -> &R {
        let entry = self
            .entries
            .entry(url.to_string())
            .and_modify(|e| e.refs += 1)
            .or_insert(CacheEntry { resource, refs: 1 });
        &entry.resource
    }

    /// Drop one reference; disposes and returns the resource when the
    /// count reaches zero
    pub fn release(&mut self, url: &str) -> Result<Option<R>> {
        let entry = self.entries.get_mut(url).ok_or_else(|| Error::AssetFetch {
            url: url.to_string(),
            reason: "release of uncached resource".to_string(),
        })?;

        entry.refs -= 1;
        if entry.refs == 0 {
            let entry = self.entries.remove(url);
            return Ok(entry.map(|e| e.resource));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fetcher that fails for every URL on a deny list
    struct StubFetcher {
        failing: Vec<String>,
        requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn failing(urls: &[&str]) -> Self {
            Self {
                failing: urls.iter().map(|s| s.to_string()).collect(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<ModelData> {
            self.requests.lock().unwrap().push(url.to_string());
            if self.failing.iter().any(|f| f == url) {
                return Err(Error::AssetFetch {
                    url: url.to_string(),
                    reason: "404".to_string(),
                });
            }
            Ok(ModelData {
                bytes: vec![0x67, 0x6c, 0x54, 0x46],
                bounds_min: [-1.0, 0.0, -1.0],
                bounds_max: [1.0, 2.0, 1.0],
            })
        }
    }

    #[tokio::test]
    async fn test_primary_load_succeeds() {
        let fetcher = StubFetcher::failing(&[]);
        let cancel = CancelFlag::new();

        let data = load_with_fallback(
            &fetcher,
            "https://cdn.example.com/models/sofa.glb",
            "https://media.example.com",
            &cancel,
        )
        .await
        .unwrap();

        assert_eq!(data.measured_bounds().max.y, 2.0);
        assert_eq!(fetcher.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_after_primary_failure() {
        let fetcher = StubFetcher::failing(&["https://cdn.example.com/models/sofa.glb"]);
        let cancel = CancelFlag::new();

        let data = load_with_fallback(
            &fetcher,
            "https://cdn.example.com/models/sofa.glb",
            "https://media.example.com",
            &cancel,
        )
        .await;

        assert!(data.is_some());
        let requests = fetcher.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], "https://media.example.com/items/items/sofa.glb");
    }

    #[tokio::test]
    async fn test_both_urls_failing_yields_none() {
        let fetcher = StubFetcher::failing(&[
            "https://cdn.example.com/models/sofa.glb",
            "https://media.example.com/items/items/sofa.glb",
        ]);
        let cancel = CancelFlag::new();

        let data = load_with_fallback(
            &fetcher,
            "https://cdn.example.com/models/sofa.glb",
            "https://media.example.com",
            &cancel,
        )
        .await;
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_load_never_applies() {
        let fetcher = StubFetcher::failing(&[]);
        let cancel = CancelFlag::new();
        cancel.cancel();

        let data = load_with_fallback(
            &fetcher,
            "https://cdn.example.com/models/sofa.glb",
            "https://media.example.com",
            &cancel,
        )
        .await;
        assert!(data.is_none());
    }

    #[test]
    fn test_cache_refcount_dispose() {
        let mut cache: AssetCache<&'static str> = AssetCache::new();
        cache.insert("a.glb", "model-a");
        assert!(cache.acquire("a.glb").is_some()); // refs = 2

        assert!(cache.release("a.glb").unwrap().is_none());
        assert_eq!(cache.len(), 1);
        // Last reference disposes
        assert_eq!(cache.release("a.glb").unwrap(), Some("model-a"));
        assert!(cache.is_empty());

        assert!(cache.release("a.glb").is_err());
    }

    #[test]
    fn test_reinsert_adds_reference() {
        let mut cache: AssetCache<u32> = AssetCache::new();
        cache.insert("tex.jpg", 7);
        cache.insert("tex.jpg", 9); // Kept: 7, refs = 2

        assert!(cache.release("tex.jpg").unwrap().is_none());
        assert_eq!(cache.release("tex.jpg").unwrap(), Some(7));
    }
}
