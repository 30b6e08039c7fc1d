//! Ring catalog and overlay artwork loading
//!
//! Fetching is external; this module decodes what the fetchers return, keeps
//! track of where each image came from, and caches decoded overlays for the
//! session. Preloading is best-effort: failures are logged and the asset is
//! fetched again on demand when it is actually rendered.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use futures::future::BoxFuture;
use image::RgbaImage;

use crate::domain::RingCatalog;
use crate::error::{Result, TryOnError};

/// Where an image was served from, as far as canvas export is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AssetOrigin {
    /// Served from the same origin as the session
    SameOrigin,
    /// Cross-origin with CORS headers allowing pixel access
    Cors,
    /// Cross-origin without CORS; drawing it taints the surface
    Opaque,
}

impl AssetOrigin {
    pub fn taints_surface(self) -> bool {
        matches!(self, AssetOrigin::Opaque)
    }
}

/// Raw bytes returned by an [`AssetFetcher`]
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub origin: AssetOrigin,
}

/// Fetches overlay artwork by URL
pub trait AssetFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<FetchedAsset>>;
}

/// Fetches the ring catalog document
pub trait CatalogSource {
    fn fetch_catalog<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<RingCatalog>>;
}

/// Decoded ring artwork
#[derive(Debug, Clone)]
pub struct OverlayAsset {
    pub url: String,
    pub image: RgbaImage,
    pub origin: AssetOrigin,
}

impl OverlayAsset {
    pub fn new(url: impl Into<String>, image: RgbaImage, origin: AssetOrigin) -> Self {
        Self {
            url: url.into(),
            image,
            origin,
        }
    }

    /// Decode fetched bytes
    pub fn decode(url: &str, fetched: FetchedAsset) -> Result<Self> {
        let image = image::load_from_memory(&fetched.bytes)
            .map_err(|e| TryOnError::AssetLoad {
                url: url.to_string(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        Ok(Self::new(url, image, fetched.origin))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Fetch and decode one overlay
pub async fn load_overlay<F: AssetFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<OverlayAsset> {
    let fetched = fetcher.fetch(url).await.map_err(|e| TryOnError::AssetLoad {
        url: url.to_string(),
        reason: format!("{e:#}"),
    })?;
    OverlayAsset::decode(url, fetched)
}

/// Per-session cache of decoded overlays
#[derive(Debug, Default)]
pub struct AssetCache {
    assets: HashMap<String, Arc<OverlayAsset>>,
}

impl AssetCache {
    pub fn get(&self, url: &str) -> Option<Arc<OverlayAsset>> {
        self.assets.get(url).cloned()
    }

    pub fn insert(&mut self, asset: OverlayAsset) -> Arc<OverlayAsset> {
        let asset = Arc::new(asset);
        self.assets.insert(asset.url.clone(), asset.clone());
        asset
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Return the cached overlay, fetching it if needed
    pub async fn get_or_load<F: AssetFetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        url: &str,
    ) -> Result<Arc<OverlayAsset>> {
        if let Some(asset) = self.get(url) {
            return Ok(asset);
        }
        let asset = load_overlay(fetcher, url).await?;
        log::debug!(
            "Loaded overlay {} ({}x{}, {:?})",
            url,
            asset.image.width(),
            asset.image.height(),
            asset.origin
        );
        Ok(self.insert(asset))
    }

    /// Move overlays from `other` that are not cached yet
    ///
    /// Returns how many were added.
    pub fn merge(&mut self, other: AssetCache) -> usize {
        let mut added = 0;
        for (url, asset) in other.assets {
            if let Entry::Vacant(slot) = self.assets.entry(url) {
                slot.insert(asset);
                added += 1;
            }
        }
        added
    }
}

/// Load overlays into a fresh cache, ignoring failures
///
/// Runs without touching any session, so the caller can keep handling user
/// actions and merge the result afterwards.
pub async fn preload_overlays<F, I>(fetcher: &F, urls: I) -> AssetCache
where
    F: AssetFetcher + ?Sized,
    I: IntoIterator<Item = String>,
{
    let mut cache = AssetCache::default();
    for url in urls {
        if let Err(e) = cache.get_or_load(fetcher, &url).await {
            log::warn!("Overlay preload failed, will retry on demand: {}", e);
        }
    }
    cache
}

/// Serves catalog and artwork from a local directory
///
/// URLs such as `/rings/gold.png` resolve relative to `root`; everything
/// served this way counts as same-origin.
#[derive(Debug, Clone)]
pub struct LocalAssets {
    root: PathBuf,
}

impl LocalAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> anyhow::Result<PathBuf> {
        if url.contains("://") {
            anyhow::bail!("remote URL `{url}` cannot be served from {}", self.root.display());
        }
        let relative = Path::new(url.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            anyhow::bail!("URL `{url}` escapes the asset root");
        }
        Ok(self.root.join(relative))
    }
}

impl AssetFetcher for LocalAssets {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<FetchedAsset>> {
        Box::pin(async move {
            let path = self.resolve(url)?;
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read asset: {}", path.display()))?;
            Ok(FetchedAsset {
                bytes,
                origin: AssetOrigin::SameOrigin,
            })
        })
    }
}

impl CatalogSource for LocalAssets {
    fn fetch_catalog<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<RingCatalog>> {
        Box::pin(async move {
            let path = self.resolve(url)?;
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
            let catalog = RingCatalog::from_json(&json)
                .with_context(|| format!("Invalid catalog: {}", path.display()))?;
            log::info!("Loaded ring catalog with {} rings", catalog.rings.len());
            Ok(catalog)
        })
    }
}
