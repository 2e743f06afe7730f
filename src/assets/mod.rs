//! Static asset delegation
//!
//! Paths the router does not own (the settings page, icons, the OpenSearch
//! descriptor) are delegated to an asset-store binding injected at
//! start-up. The core passes the stored bytes through unchanged; only the
//! response header policy is applied on the way out.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A stored static asset.
#[derive(Debug, Clone)]
pub struct Asset {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Asset {
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// Asset-store binding. External collaborator, injected at start-up.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Fetch the asset stored under `path`, if any.
    async fn fetch(&self, path: &str) -> Result<Option<Asset>>;
}

/// In-memory [`AssetStore`] seeded at start-up.
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: HashMap<String, Asset>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, asset: Asset) {
        self.assets.insert(path.into(), asset);
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn fetch(&self, path: &str) -> Result<Option<Asset>> {
        Ok(self.assets.get(path).cloned())
    }
}
