//! Viewport-to-projection helpers.
//!
//! Pure math shared by the scene manager: picking the aspect-correct
//! letterbox branch for the current viewport and composing in an optional
//! host-supplied view transform.

use cgmath::Matrix4;

/// Logical width the model transform is widened to when the wide-canvas
/// portrait branch is taken.
pub const MODEL_LOGICAL_WIDTH: f32 = 2.0;

/// Per-frame projection decision: the base projection and, when the
/// wide-canvas portrait branch applies, the width to force onto the model's
/// own transform.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayout {
    pub projection: Matrix4<f32>,
    pub model_width: Option<f32>,
}

/// Build the frame layout for a viewport and a model canvas width.
///
/// A canvas wider than 1.0 logical unit shown in a portrait viewport is
/// pinned to [`MODEL_LOGICAL_WIDTH`] and the projection's X axis is scaled by
/// `w / h`; every other combination letterboxes by scaling the Y axis by
/// `h / w`. `canvas_width` is `None` while the model is still loading, which
/// always takes the letterbox branch.
pub fn frame_layout(viewport_w: f32, viewport_h: f32, canvas_width: Option<f32>) -> FrameLayout {
    let wide_canvas = canvas_width.is_some_and(|w| w > 1.0);
    if wide_canvas && viewport_w < viewport_h {
        FrameLayout {
            projection: Matrix4::from_nonuniform_scale(viewport_w / viewport_h, 1.0, 1.0),
            model_width: Some(MODEL_LOGICAL_WIDTH),
        }
    } else {
        FrameLayout {
            projection: Matrix4::from_nonuniform_scale(1.0, viewport_h / viewport_w, 1.0),
            model_width: None,
        }
    }
}

/// Right-multiply the host view transform into the projection, when one has
/// been supplied.
pub fn compose(projection: Matrix4<f32>, view: Option<&Matrix4<f32>>) -> Matrix4<f32> {
    match view {
        Some(view) => projection * *view,
        None => projection,
    }
}
