//! Scene and model lifecycle management.
//!
//! [`SceneManager`] exclusively owns the set of live model instances. It is
//! an explicitly constructed context object: the host builds one, drives it
//! once per frame via [`SceneManager::on_frame`] and on each input event via
//! [`SceneManager::on_tap`] / [`SceneManager::on_drag`], and switches scenes
//! through [`SceneManager::set_active_scene`]. Switching is destructive by
//! contract: every current instance is released before the replacement is
//! constructed, so no instance ever outlives a scene switch.

use instant::Instant;

use cgmath::Matrix4;

use crate::config::{MotionPriority, StageConfig};
use crate::model::{ModelError, ModelInstance, MotionCallbacks};
use crate::view::{compose, frame_layout};

/// Factory for fresh, not-yet-loaded model instances.
///
/// Boxed so hosts can capture whatever construction context the concrete
/// model type needs (GPU handles, caches, channels).
pub type ModelFactory<M> = Box<dyn FnMut() -> M>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("scene index {index} out of range ({count} scenes configured)")]
    InvalidScene { index: usize, count: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Owns and drives the active scene's model instances.
pub struct SceneManager<M: ModelInstance> {
    config: StageConfig,
    factory: ModelFactory<M>,
    models: Vec<M>,
    scene_index: usize,
    view_transform: Option<Matrix4<f32>>,
    last_frame: Option<Instant>,
}

impl<M: ModelInstance> SceneManager<M> {
    /// A fresh manager starts without a scene; nothing is updated or drawn
    /// until the first [`set_active_scene`](Self::set_active_scene).
    pub fn new(config: StageConfig, factory: ModelFactory<M>) -> Self {
        Self {
            config,
            factory,
            models: Vec::new(),
            scene_index: 0,
            view_transform: None,
            last_frame: None,
        }
    }

    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    pub fn instance_count(&self) -> usize {
        self.models.len()
    }

    /// Switch to the scene at `index`.
    ///
    /// Releases all current instances first, then constructs and loads
    /// exactly one new instance for the configured model directory. On a load
    /// failure the scene is left empty and the error propagates.
    pub fn set_active_scene(&mut self, index: usize) -> Result<(), SceneError> {
        let count = self.config.model_dirs.len();
        let dir = self
            .config
            .model_dirs
            .get(index)
            .ok_or(SceneError::InvalidScene { index, count })?
            .clone();
        if self.config.debug_log {
            log::info!("switching to scene {index} ({dir})");
        }

        // Prior instances must be gone before the replacement starts loading.
        self.models.clear();
        self.scene_index = index;

        let base_path = format!("{}{}/", self.config.assets_root, dir);
        let manifest = format!("{dir}.model3.json");
        let mut model = (self.factory)();
        model.load_assets(&base_path, &manifest).map_err(|e| {
            log::error!("scene {index}: {e}");
            e
        })?;
        self.models.push(model);
        Ok(())
    }

    /// Switch to the next configured scene, wrapping at the end of the list.
    pub fn advance_scene(&mut self) -> Result<(), SceneError> {
        let count = self.config.model_dirs.len();
        if count == 0 {
            return Err(SceneError::InvalidScene { index: 0, count: 0 });
        }
        self.set_active_scene((self.scene_index + 1) % count)
    }

    /// Forward normalized drag coordinates to every live instance. No-op
    /// while no scene is active.
    pub fn on_drag(&mut self, x: f32, y: f32) {
        for model in &mut self.models {
            model.set_dragging(x, y);
        }
    }

    /// Dispatch a tap at normalized view coordinates.
    ///
    /// Per instance, the head region is tested first and a hit changes the
    /// expression; only if the head misses is the body region tested, and a
    /// hit there starts a motion from the configured tap group. At most one
    /// action fires per instance per tap.
    pub fn on_tap(&mut self, x: f32, y: f32) {
        if self.config.debug_log {
            log::info!("tap at ({x:.3}, {y:.3})");
        }
        for model in &mut self.models {
            if model.hit_test(&self.config.hit_area_head, x, y) {
                if self.config.debug_log {
                    log::info!("hit area: {}", self.config.hit_area_head);
                }
                model.set_random_expression();
            } else if model.hit_test(&self.config.hit_area_body, x, y) {
                if self.config.debug_log {
                    log::info!("hit area: {}", self.config.hit_area_body);
                }
                model.start_motion(
                    &self.config.motion_group_tap_body,
                    MotionPriority::Normal,
                    MotionCallbacks {
                        on_began: Some(Box::new(|tag| {
                            log::info!("motion began: {}_{}", tag.group, tag.index);
                        })),
                        on_finished: Some(Box::new(|tag| {
                            log::info!("motion finished: {}_{}", tag.group, tag.index);
                        })),
                    },
                );
            }
        }
    }

    /// Drive one frame for the given viewport size in pixels.
    ///
    /// Builds a fresh projection per instance (wide-canvas portrait branch or
    /// letterbox branch, then the host view transform), then calls `update`
    /// followed by `draw` on each instance with the elapsed time since the
    /// previous frame.
    pub fn on_frame(&mut self, viewport_w: u32, viewport_h: u32) {
        let now = Instant::now();
        let dt = self.last_frame.map(|t| now - t).unwrap_or_default();
        self.last_frame = Some(now);

        for model in &mut self.models {
            let layout = frame_layout(viewport_w as f32, viewport_h as f32, model.canvas_width());
            if let Some(width) = layout.model_width {
                model.set_model_width(width);
            }
            let projection = compose(layout.projection, self.view_transform.as_ref());
            model.update(dt);
            model.draw(&projection);
        }
    }

    /// Store a copy of the host's view transform to compose into every
    /// subsequent frame. The caller's matrix is copied, never aliased.
    pub fn set_view_transform(&mut self, transform: &Matrix4<f32>) {
        self.view_transform = Some(*transform);
    }
}
