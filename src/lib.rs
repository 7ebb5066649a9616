//! stage2d
//!
//! Runtime support layer for an interactive 2D character-animation viewer.
//! The crate owns the two pieces of bookkeeping every such viewer needs and
//! nothing else: a deduplicating GPU texture cache with asynchronous image
//! loading, and a scene manager that drives the lifecycle of on-screen
//! animated model instances (per-frame update/draw, viewport projection,
//! tap/drag routing, exclusive scene switching). The model's own parsing,
//! physics and render pipeline stay behind the [`model::ModelInstance`]
//! capability trait and are supplied by the host.
//!
//! High-level modules
//! - `config`: the configuration surface (model directories, hit areas, motion groups)
//! - `gfx`: the GPU texture boundary and a wgpu-backed implementation
//! - `resources`: asset fetching and the deduplicating texture cache
//! - `model`: the opaque animated-model capability consumed by the scene manager
//! - `scene`: scene/model lifecycle, input routing and frame composition
//! - `view`: shared viewport-to-projection helpers
//!

pub mod config;
pub mod gfx;
pub mod model;
pub mod resources;
pub mod scene;
pub mod view;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::{Device, Queue};
