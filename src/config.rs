//! Configuration surface for the viewer runtime.
//!
//! Everything the scene manager needs to know about the statically configured
//! asset set lives here: the ordered model directory list (which defines the
//! scene index space), the named hit-test regions, the motion groups and the
//! debug-log switch. The defaults mirror a conventional sample-asset layout.

/// Priority of a motion playback request. Higher priorities interrupt lower
/// ones; `Force` always wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MotionPriority {
    None = 0,
    Idle = 1,
    Normal = 2,
    Force = 3,
}

/// Static configuration for a [`crate::scene::SceneManager`].
///
/// `model_dirs` is ordered: index `i` is scene `i`, and each entry names a
/// directory under `assets_root` that contains `<dir>/<dir>.model3.json`.
#[derive(Clone, Debug)]
pub struct StageConfig {
    /// Root path (or URL prefix) all model directories are resolved against.
    pub assets_root: String,
    /// Ordered model directory names; defines the scene index space.
    pub model_dirs: Vec<String>,
    /// Named hit region checked first on tap; a hit changes the expression.
    pub hit_area_head: String,
    /// Named hit region checked second on tap; a hit starts a motion.
    pub hit_area_body: String,
    /// Motion group played while the model is idle.
    pub motion_group_idle: String,
    /// Motion group started when the body region is tapped.
    pub motion_group_tap_body: String,
    /// Emit verbose interaction/lifecycle logs.
    pub debug_log: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            assets_root: "resources/".to_string(),
            model_dirs: Vec::new(),
            hit_area_head: "Head".to_string(),
            hit_area_body: "Body".to_string(),
            motion_group_idle: "Idle".to_string(),
            motion_group_tap_body: "TapBody".to_string(),
            debug_log: false,
        }
    }
}

impl StageConfig {
    /// Convenience constructor for the common case of a default layout with a
    /// custom model list.
    pub fn with_models<S: Into<String>>(model_dirs: Vec<S>) -> Self {
        Self {
            model_dirs: model_dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
