//! Mock collaborators for the behavioral tests: a recording GPU boundary, an
//! in-memory asset loader and a scripted model instance.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use stage2d::Matrix4;
use stage2d::config::MotionPriority;
use stage2d::gfx::{TextureGpu, TextureHandle, UploadOptions};
use stage2d::model::{ModelError, ModelInstance, MotionCallbacks, MotionTag};
use stage2d::resources::AssetLoader;
use stage2d::scene::ModelFactory;

/// Suspend once and wake immediately, so overlapping futures interleave under
/// `block_on` the way decode completions interleave in production.
pub(crate) async fn yield_now() {
    struct YieldNow(bool);
    impl Future for YieldNow {
        type Output = ();
        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
    YieldNow(false).await
}

/// Encode a solid-color RGBA PNG in memory.
pub(crate) fn tiny_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("png encoding");
    out
}

/// One recorded `create_texture` call.
#[derive(Clone, Debug)]
pub(crate) struct CreatedTexture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub opts: UploadOptions,
    pub first_pixel: [u8; 4],
}

/// [`TextureGpu`] double that records every allocation and deletion.
#[derive(Default)]
pub(crate) struct RecordingGpu {
    next_handle: Cell<u32>,
    pub created: RefCell<Vec<CreatedTexture>>,
    pub deleted: RefCell<Vec<TextureHandle>>,
}

impl RecordingGpu {
    pub fn create_count(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn delete_count_for(&self, handle: TextureHandle) -> usize {
        self.deleted.borrow().iter().filter(|h| **h == handle).count()
    }
}

impl TextureGpu for RecordingGpu {
    fn create_texture(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        opts: UploadOptions,
    ) -> TextureHandle {
        let handle = TextureHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        let mut first_pixel = [0u8; 4];
        first_pixel.copy_from_slice(&rgba[..4]);
        self.created.borrow_mut().push(CreatedTexture {
            handle,
            width,
            height,
            opts,
            first_pixel,
        });
        handle
    }

    fn delete_texture(&self, handle: TextureHandle) -> bool {
        let issued = self.created.borrow().iter().any(|c| c.handle == handle);
        let already_deleted = self.deleted.borrow().contains(&handle);
        if issued && !already_deleted {
            self.deleted.borrow_mut().push(handle);
            true
        } else {
            false
        }
    }
}

/// In-memory [`AssetLoader`]; optionally suspends once per fetch so tests can
/// overlap in-flight loads.
pub(crate) struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    yields: bool,
    pub fetch_count: Cell<u32>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            yields: false,
            fetch_count: Cell::new(0),
        }
    }

    pub fn with_file(mut self, id: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(id.to_string(), bytes);
        self
    }

    pub fn with_yield(mut self) -> Self {
        self.yields = true;
        self
    }
}

impl AssetLoader for MemoryLoader {
    async fn fetch(&self, id: &str) -> anyhow::Result<Vec<u8>> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        if self.yields {
            yield_now().await;
        }
        self.files
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such asset: {id}"))
    }
}

/// Everything a [`MockModel`] was asked to do, inspectable after the scene
/// manager has dropped the instance itself.
#[derive(Default)]
pub(crate) struct ModelCalls {
    pub loads: Vec<(String, String)>,
    pub updates: u32,
    pub dts: Vec<Duration>,
    pub draws: Vec<Matrix4<f32>>,
    pub sequence: Vec<&'static str>,
    pub drags: Vec<(f32, f32)>,
    pub expressions: u32,
    pub motions: Vec<(String, MotionPriority)>,
    pub widths: Vec<f32>,
}

/// Behavior knobs for models produced by [`mock_factory`].
#[derive(Clone, Default)]
pub(crate) struct MockSpec {
    /// Region names that report a hit at any coordinate.
    pub hit_regions: Vec<String>,
    pub canvas_width: Option<f32>,
    pub fail_load: bool,
    /// Fire the begin/finish callbacks synchronously from `start_motion`.
    pub fire_motion_callbacks: bool,
}

pub(crate) struct MockModel {
    spec: MockSpec,
    calls: Rc<RefCell<ModelCalls>>,
}

impl ModelInstance for MockModel {
    fn load_assets(&mut self, base_path: &str, manifest: &str) -> Result<(), ModelError> {
        if self.spec.fail_load {
            return Err(ModelError::Assets {
                path: format!("{base_path}{manifest}"),
                reason: "manifest missing".to_string(),
            });
        }
        self.calls
            .borrow_mut()
            .loads
            .push((base_path.to_string(), manifest.to_string()));
        Ok(())
    }

    fn update(&mut self, dt: Duration) {
        let mut calls = self.calls.borrow_mut();
        calls.updates += 1;
        calls.dts.push(dt);
        calls.sequence.push("update");
    }

    fn draw(&mut self, projection: &Matrix4<f32>) {
        let mut calls = self.calls.borrow_mut();
        calls.draws.push(*projection);
        calls.sequence.push("draw");
    }

    fn hit_test(&self, region: &str, _x: f32, _y: f32) -> bool {
        self.spec.hit_regions.iter().any(|r| r == region)
    }

    fn set_dragging(&mut self, x: f32, y: f32) {
        self.calls.borrow_mut().drags.push((x, y));
    }

    fn start_motion(&mut self, group: &str, priority: MotionPriority, callbacks: MotionCallbacks) {
        self.calls
            .borrow_mut()
            .motions
            .push((group.to_string(), priority));
        if self.spec.fire_motion_callbacks {
            let tag = MotionTag {
                group: group.to_string(),
                index: 0,
            };
            let MotionCallbacks {
                on_began,
                on_finished,
            } = callbacks;
            if let Some(mut began) = on_began {
                began(&tag);
            }
            if let Some(mut finished) = on_finished {
                finished(&tag);
            }
        }
    }

    fn set_random_expression(&mut self) {
        self.calls.borrow_mut().expressions += 1;
    }

    fn canvas_width(&self) -> Option<f32> {
        self.spec.canvas_width
    }

    fn set_model_width(&mut self, width: f32) {
        self.calls.borrow_mut().widths.push(width);
    }
}

pub(crate) type Probes = Rc<RefCell<Vec<Rc<RefCell<ModelCalls>>>>>;

/// Factory producing [`MockModel`]s from one spec, plus a probe handle per
/// constructed instance (probes outlive the instances).
pub(crate) fn mock_factory(spec: MockSpec) -> (ModelFactory<MockModel>, Probes) {
    let probes: Probes = Rc::new(RefCell::new(Vec::new()));
    let registry = Rc::clone(&probes);
    let factory: ModelFactory<MockModel> = Box::new(move || {
        let calls = Rc::new(RefCell::new(ModelCalls::default()));
        registry.borrow_mut().push(Rc::clone(&calls));
        MockModel {
            spec: spec.clone(),
            calls,
        }
    });
    (factory, probes)
}
