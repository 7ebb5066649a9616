//! Asset fetching and the texture cache.
//!
//! [`AssetLoader`] is the suspension point of the whole runtime: fetching an
//! image's raw bytes is the only asynchronous operation, everything else runs
//! to completion on the single logical thread. [`FsLoader`] reads from the
//! local filesystem; web or archive hosts supply their own implementation.

use std::path::PathBuf;

pub mod texture;

pub use texture::{TextureCache, TextureError, TextureKey, TextureRecord};

/// Capability for fetching raw asset bytes by source identifier.
pub trait AssetLoader {
    async fn fetch(&self, id: &str) -> anyhow::Result<Vec<u8>>;
}

/// Filesystem-backed [`AssetLoader`]; resolves identifiers against a root
/// directory.
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for FsLoader {
    async fn fetch(&self, id: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.root.join(id);
        let data = std::fs::read(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Ok(data)
    }
}
