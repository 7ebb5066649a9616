//! GPU texture boundary.
//!
//! The texture cache never talks to a graphics API directly; it goes through
//! the [`TextureGpu`] capability, which covers exactly the primitives the
//! cache needs: upload a decoded RGBA image (with an optional mip chain) and
//! delete a previously issued handle. [`WgpuTextures`] is the wgpu-backed
//! implementation for real hosts; tests substitute a recording double.
//!
//! Handles are opaque integers in the manner of classic GL texture names.
//! The implementation owns the actual GPU objects exclusively, so every
//! upload is self-contained and leaves no binding state behind for unrelated
//! texture work to trip over.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use image::RgbaImage;

/// Opaque identifier for one GPU texture owned by a [`TextureGpu`]
/// implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Upload policies for [`TextureGpu::create_texture`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Generate and upload a full mip chain for the image.
    pub generate_mipmaps: bool,
}

/// The graphics-context-provider capability consumed by the texture cache.
///
/// `rgba` is tightly packed 8-bit RGBA pixel data of `width * height` pixels.
/// Alpha premultiplication, when requested by a caller, happens before this
/// boundary is crossed; implementations upload the bytes as given.
pub trait TextureGpu {
    /// Allocate a texture, upload the pixel data and return a fresh handle.
    fn create_texture(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        opts: UploadOptions,
    ) -> TextureHandle;

    /// Release the texture behind `handle`. Returns `false` if the handle is
    /// unknown (already deleted or never issued).
    fn delete_texture(&self, handle: TextureHandle) -> bool;
}

/// One uploaded texture with its view and sampler, ready for bind groups.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// wgpu-backed [`TextureGpu`] implementation.
///
/// Owns the mapping from opaque handles to live wgpu objects. `Device` and
/// `Queue` are internally reference counted, so the host keeps its own clones
/// for rendering.
#[derive(Debug)]
pub struct WgpuTextures {
    device: wgpu::Device,
    queue: wgpu::Queue,
    next_handle: Cell<u32>,
    entries: RefCell<HashMap<TextureHandle, GpuTexture>>,
}

impl WgpuTextures {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            next_handle: Cell::new(1),
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Look up the live GPU objects for a handle issued by this instance.
    ///
    /// Returns a clone; wgpu resources are internally reference counted.
    pub fn texture(&self, handle: TextureHandle) -> Option<GpuTexture> {
        self.entries.borrow().get(&handle).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn write_level(&self, texture: &wgpu::Texture, level: u32, rgba: &[u8], width: u32, height: u32) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture,
                mip_level: level,
                origin: wgpu::Origin3d::ZERO,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Number of mip levels for a `width` x `height` base image.
pub(crate) fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

impl TextureGpu for WgpuTextures {
    fn create_texture(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        opts: UploadOptions,
    ) -> TextureHandle {
        let levels = if opts.generate_mipmaps {
            mip_level_count(width, height)
        } else {
            1
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("stage2d cached texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.write_level(&texture, 0, rgba, width, height);

        if levels > 1 {
            // wgpu has no automatic mipmap generation; downscale on the CPU
            // from the base level and upload each level separately.
            let base = RgbaImage::from_raw(width, height, rgba.to_vec())
                .unwrap_or_else(|| RgbaImage::new(width, height));
            for level in 1..levels {
                let mip_w = (width >> level).max(1);
                let mip_h = (height >> level).max(1);
                let mip =
                    image::imageops::resize(&base, mip_w, mip_h, image::imageops::FilterType::Triangle);
                self.write_level(&texture, level, mip.as_raw(), mip_w, mip_h);
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let handle = TextureHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.entries.borrow_mut().insert(
            handle,
            GpuTexture {
                texture,
                view,
                sampler,
            },
        );
        log::debug!("created texture {:?} ({}x{}, {} mip levels)", handle, width, height, levels);
        handle
    }

    fn delete_texture(&self, handle: TextureHandle) -> bool {
        match self.entries.borrow_mut().remove(&handle) {
            Some(entry) => {
                entry.texture.destroy();
                log::debug!("deleted texture {:?}", handle);
                true
            }
            None => false,
        }
    }
}
