//! The animated-model capability consumed by the scene manager.
//!
//! A [`ModelInstance`] is one renderable, updatable, hit-testable entity.
//! Parsing the model's binary asset format, physics and the render pipeline
//! all live behind this trait; the crate only drives the lifecycle.

use instant::Duration;

use cgmath::Matrix4;

use crate::config::MotionPriority;

/// Identity of one started motion, handed to the begin/finish callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MotionTag {
    pub group: String,
    pub index: usize,
}

pub type MotionCallback = Box<dyn FnMut(&MotionTag)>;

/// Optional begin/finish notifications for a motion playback request. Both
/// fire on the single logical thread, never concurrently with other manager
/// operations.
#[derive(Default)]
pub struct MotionCallbacks {
    pub on_began: Option<MotionCallback>,
    pub on_finished: Option<MotionCallback>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load model assets from `{path}`: {reason}")]
    Assets { path: String, reason: String },
}

/// One animated model instance.
pub trait ModelInstance {
    /// Load the model's assets from `base_path`, starting at the named
    /// manifest file.
    fn load_assets(&mut self, base_path: &str, manifest: &str) -> Result<(), ModelError>;

    /// Advance animation/physics state by `dt`. Called once per frame,
    /// always before [`draw`](Self::draw).
    fn update(&mut self, dt: Duration);

    /// Render with the fully composed projection for this frame.
    fn draw(&mut self, projection: &Matrix4<f32>);

    /// Test a named hit region against normalized view coordinates.
    fn hit_test(&self, region: &str, x: f32, y: f32) -> bool;

    /// Set the drag-follow target in normalized view coordinates.
    fn set_dragging(&mut self, x: f32, y: f32);

    /// Start a random motion from `group` at `priority`.
    fn start_motion(&mut self, group: &str, priority: MotionPriority, callbacks: MotionCallbacks);

    /// Switch to a random expression.
    fn set_random_expression(&mut self);

    /// Width of the model's own canvas in logical units, `None` until the
    /// underlying model has finished loading.
    fn canvas_width(&self) -> Option<f32>;

    /// Resize the instance's model transform to the given logical width.
    fn set_model_width(&mut self, width: f32);
}
