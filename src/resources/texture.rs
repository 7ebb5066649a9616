//! Deduplicating GPU texture cache.
//!
//! The cache guarantees exactly-once GPU allocation per distinct
//! (source, premultiply) key, across both repeated and overlapping requests.
//! A completed load is held as an immutable [`TextureRecord`]; a load that is
//! still in flight is held as a shared future in a separate pending table,
//! and a second request for the same key subscribes to that future instead of
//! starting another decode. Every request eventually resolves with either the
//! record or a [`TextureError`] describing why the image never became usable.
//!
//! Everything here runs on one logical thread; "concurrency" means
//! interleaved completions at the [`AssetLoader`] suspension point, never
//! parallel execution. State is therefore `Rc`/`RefCell`, not locks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use image::GenericImageView;

use super::AssetLoader;
use crate::gfx::{TextureGpu, TextureHandle, UploadOptions};

/// Dedup key for one cached texture: which image, and in which pixel
/// convention it was uploaded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub source: String,
    pub premultiply: bool,
}

/// One loaded image-backed GPU texture.
///
/// Records are immutable once constructed and shared as `Rc`; the cache entry
/// keeps the GPU handle alive until one of the eviction operations releases
/// it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRecord {
    pub key: TextureKey,
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Why a texture load failed. `Clone` so one in-flight failure can fan out to
/// every subscribed caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    #[error("failed to fetch image `{id}`: {reason}")]
    Fetch { id: String, reason: String },
    #[error("failed to decode image `{id}`: {reason}")]
    Decode { id: String, reason: String },
}

type LoadResult = Result<Rc<TextureRecord>, TextureError>;
type PendingLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

#[derive(Default)]
struct CacheState {
    records: Vec<Rc<TextureRecord>>,
    pending: HashMap<TextureKey, PendingLoad>,
}

/// Deduplicating texture cache over an [`AssetLoader`] and a [`TextureGpu`].
///
/// Invariants: at most one record per key; a key is never simultaneously in
/// the record list and the pending table; eviction is the only way a record
/// is destroyed.
pub struct TextureCache<G, L> {
    gpu: Rc<G>,
    loader: Rc<L>,
    state: Rc<RefCell<CacheState>>,
}

impl<G, L> TextureCache<G, L>
where
    G: TextureGpu + 'static,
    L: AssetLoader + 'static,
{
    pub fn new(gpu: Rc<G>, loader: Rc<L>) -> Self {
        Self {
            gpu,
            loader,
            state: Rc::new(RefCell::new(CacheState::default())),
        }
    }

    /// Load-or-reuse the texture for `source`.
    ///
    /// Resolves immediately on a cache hit, subscribes to the in-flight load
    /// if one exists for the same key, and otherwise starts the single decode
    /// for this key. Each call completes exactly once, in decode-finish
    /// order across keys.
    pub async fn acquire(&self, source: &str, premultiply: bool) -> LoadResult {
        let key = TextureKey {
            source: source.to_string(),
            premultiply,
        };
        let load = {
            let mut state = self.state.borrow_mut();
            if let Some(record) = state.records.iter().find(|r| r.key == key) {
                log::debug!("texture cache hit for `{source}` (premultiply: {premultiply})");
                return Ok(Rc::clone(record));
            }
            match state.pending.get(&key) {
                Some(load) => {
                    log::debug!("subscribing to in-flight load of `{source}`");
                    load.clone()
                }
                None => {
                    let load = Self::load(
                        Rc::clone(&self.gpu),
                        Rc::clone(&self.loader),
                        Rc::clone(&self.state),
                        key.clone(),
                    )
                    .boxed_local()
                    .shared();
                    state.pending.insert(key, load.clone());
                    load
                }
            }
        };
        // The borrow is released above; completions of other keys may
        // interleave freely while this one is awaited.
        load.await
    }

    async fn load(
        gpu: Rc<G>,
        loader: Rc<L>,
        state: Rc<RefCell<CacheState>>,
        key: TextureKey,
    ) -> LoadResult {
        let result = Self::decode_and_upload(&gpu, &loader, &key).await;
        let mut state = state.borrow_mut();
        state.pending.remove(&key);
        match result {
            Ok(record) => {
                log::info!(
                    "loaded texture `{}` ({}x{}, handle {:?})",
                    record.key.source,
                    record.width,
                    record.height,
                    record.handle
                );
                state.records.push(Rc::clone(&record));
                Ok(record)
            }
            Err(e) => {
                log::warn!("texture load failed: {e}");
                Err(e)
            }
        }
    }

    async fn decode_and_upload(gpu: &G, loader: &L, key: &TextureKey) -> LoadResult {
        let bytes = loader.fetch(&key.source).await.map_err(|e| TextureError::Fetch {
            id: key.source.clone(),
            reason: e.to_string(),
        })?;
        let image = image::load_from_memory(&bytes).map_err(|e| TextureError::Decode {
            id: key.source.clone(),
            reason: e.to_string(),
        })?;
        let (width, height) = image.dimensions();
        let mut rgba = image.into_rgba8().into_raw();
        if key.premultiply {
            premultiply_alpha(&mut rgba);
        }
        let handle = gpu.create_texture(
            &rgba,
            width,
            height,
            UploadOptions {
                generate_mipmaps: true,
            },
        );
        Ok(Rc::new(TextureRecord {
            key: key.clone(),
            handle,
            width,
            height,
        }))
    }

    /// Synchronous lookup; `None` if the key has not finished loading.
    pub fn get(&self, source: &str, premultiply: bool) -> Option<Rc<TextureRecord>> {
        self.state
            .borrow()
            .records
            .iter()
            .find(|r| r.key.source == source && r.key.premultiply == premultiply)
            .map(Rc::clone)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().records.is_empty()
    }

    /// Release every held GPU handle and clear the record list.
    ///
    /// Safe on an empty cache. Loads still in flight are not cancelled; they
    /// complete and insert their record afterwards.
    pub fn evict_all(&self) {
        let records = std::mem::take(&mut self.state.borrow_mut().records);
        for record in &records {
            self.gpu.delete_texture(record.handle);
        }
        if !records.is_empty() {
            log::info!("evicted all {} cached textures", records.len());
        }
    }

    /// Release and remove the record owning `handle`. No-op if absent.
    pub fn evict_by_handle(&self, handle: TextureHandle) -> bool {
        let record = {
            let mut state = self.state.borrow_mut();
            match state.records.iter().position(|r| r.handle == handle) {
                Some(idx) => state.records.remove(idx),
                None => return false,
            }
        };
        self.gpu.delete_texture(record.handle);
        log::info!("evicted texture `{}` ({:?})", record.key.source, handle);
        true
    }

    /// Release and remove the first record whose source identifier starts
    /// with `prefix`. No-op if nothing matches.
    pub fn evict_by_source(&self, prefix: &str) -> bool {
        let record = {
            let mut state = self.state.borrow_mut();
            match state
                .records
                .iter()
                .position(|r| r.key.source.starts_with(prefix))
            {
                Some(idx) => state.records.remove(idx),
                None => return false,
            }
        };
        self.gpu.delete_texture(record.handle);
        log::info!("evicted texture `{}` ({:?})", record.key.source, record.handle);
        true
    }
}

/// Pre-scale color channels by alpha, in place. Expects tightly packed
/// 8-bit RGBA.
pub fn premultiply_alpha(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let alpha = px[3] as u32;
        px[0] = ((px[0] as u32 * alpha) / 255) as u8;
        px[1] = ((px[1] as u32 * alpha) / 255) as u8;
        px[2] = ((px[2] as u32 * alpha) / 255) as u8;
    }
}
