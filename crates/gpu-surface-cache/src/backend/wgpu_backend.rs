use std::cell::RefCell;
use std::sync::mpsc;

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface_params::{PixelFormat, SurfaceParams, SurfaceType};

use super::SurfaceBackend;

/// Host texture plus the wgpu format it was allocated with.
#[derive(Debug)]
pub struct WgpuTexture {
    texture: wgpu::Texture,
    format: wgpu::TextureFormat,
    surface_type: SurfaceType,
}

impl WgpuTexture {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn create_view(&self) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

/// Scratch transfer buffer, reallocated when a larger (or differently usable) one is needed.
#[derive(Debug, Default)]
pub struct WgpuFramebuffer {
    scratch: RefCell<Option<wgpu::Buffer>>,
}

impl WgpuFramebuffer {
    fn take_scratch(
        &self,
        device: &wgpu::Device,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        match self.scratch.take() {
            Some(buf) if buf.size() >= size && buf.usage().contains(usage) => buf,
            _ => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("surface cache scratch"),
                size,
                usage,
                mapped_at_creation: false,
            }),
        }
    }

    fn put_scratch(&self, buf: wgpu::Buffer) {
        self.scratch.replace(Some(buf));
    }
}

pub struct WgpuSurfaceBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

/// Host format for `format`, plus the device feature it needs (if any).
fn map_format(format: PixelFormat) -> Option<(wgpu::TextureFormat, wgpu::Features)> {
    use wgpu::TextureFormat as F;
    let none = wgpu::Features::empty();
    let bc = wgpu::Features::TEXTURE_COMPRESSION_BC;
    Some(match format {
        PixelFormat::ABGR8 => (F::Rgba8Unorm, none),
        PixelFormat::A2B10G10R10 => (F::Rgb10a2Unorm, none),
        PixelFormat::R8 => (F::R8Unorm, none),
        PixelFormat::RGBA16F => (F::Rgba16Float, none),
        PixelFormat::R11FG11FB10F => (F::Rg11b10Float, none),
        // No packed 16-bit colour formats in wgpu; the raw texels are kept as-is.
        PixelFormat::B5G6R5 | PixelFormat::A1B5G5R5 => (F::R16Uint, none),
        PixelFormat::DXT1 => (F::Bc1RgbaUnorm, bc),
        PixelFormat::DXT23 => (F::Bc2RgbaUnorm, bc),
        PixelFormat::DXT45 => (F::Bc3RgbaUnorm, bc),
        PixelFormat::DXN1 => (F::Bc4RUnorm, bc),
        PixelFormat::ASTC_2D_4X4 => (
            F::Astc {
                block: wgpu::AstcBlock::B4x4,
                channel: wgpu::AstcChannel::Unorm,
            },
            wgpu::Features::TEXTURE_COMPRESSION_ASTC,
        ),
        PixelFormat::Z24S8 | PixelFormat::S8Z24 => (F::Depth24PlusStencil8, none),
        PixelFormat::Z32F => (F::Depth32Float, none),
        PixelFormat::Z16 => (F::Depth16Unorm, none),
        PixelFormat::Invalid => return None,
    })
}

fn is_depth(surface_type: SurfaceType) -> bool {
    matches!(surface_type, SurfaceType::Depth | SurfaceType::DepthStencil)
}

struct CopyLayout {
    unpadded_bytes_per_row: u32,
    padded_bytes_per_row: u32,
    rows: u32,
}

impl CopyLayout {
    fn new(params: &SurfaceParams) -> Self {
        let unpadded = params.width_in_blocks() * params.bytes_per_block();
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        Self {
            unpadded_bytes_per_row: unpadded,
            padded_bytes_per_row: unpadded.div_ceil(align) * align,
            rows: params.height_in_blocks(),
        }
    }

    fn buffer_size(&self) -> u64 {
        u64::from(self.padded_bytes_per_row) * u64::from(self.rows)
    }

    fn buffer_copy<'a>(&self, buffer: &'a wgpu::Buffer) -> wgpu::ImageCopyBuffer<'a> {
        wgpu::ImageCopyBuffer {
            buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(self.padded_bytes_per_row),
                rows_per_image: Some(self.rows),
            },
        }
    }
}

fn texture_copy(texture: &wgpu::Texture) -> wgpu::ImageCopyTexture<'_> {
    wgpu::ImageCopyTexture {
        texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
    }
}

fn extent(params: &SurfaceParams) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: params.width,
        height: params.height,
        depth_or_array_layers: 1,
    }
}

/// Rejects extents the device would refuse, before they reach `create_texture`.
fn check_extent(params: &SurfaceParams, max_dimension: u32) -> SurfaceResult<()> {
    let (width, height) = (params.width, params.height);
    if width == 0 || height == 0 {
        return Err(SurfaceError::Backend(format!(
            "surface at 0x{:x} has empty extent {width}x{height}",
            params.addr
        )));
    }
    if width > max_dimension || height > max_dimension {
        return Err(SurfaceError::Backend(format!(
            "surface at 0x{:x} extent {width}x{height} exceeds device limit {max_dimension}",
            params.addr
        )));
    }
    Ok(())
}

fn check_len(params: &SurfaceParams, len: usize) -> SurfaceResult<()> {
    if len as u64 != params.size_in_bytes {
        return Err(SurfaceError::Backend(format!(
            "transfer of {len} bytes does not match surface size {}",
            params.size_in_bytes
        )));
    }
    Ok(())
}

impl WgpuSurfaceBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    /// Creates a backend on a fresh device without a presentation surface.
    ///
    /// BC and ASTC compression are enabled when the adapter supports them.
    pub async fn new_headless() -> SurfaceResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SurfaceError::AdapterNotFound)?;

        let wanted = wgpu::Features::TEXTURE_COMPRESSION_BC
            | wgpu::Features::TEXTURE_COMPRESSION_ASTC;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gpu surface cache"),
                    required_features: adapter.features() & wanted,
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|err| SurfaceError::Backend(err.to_string()))?;

        Ok(Self::new(device, queue))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn read_back(&self, buffer: &wgpu::Buffer, size: u64) -> SurfaceResult<Vec<u8>> {
        let slice = buffer.slice(..size);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = sender.send(res);
        });
        self.device.poll(wgpu::Maintain::Wait);

        receiver
            .recv()
            .map_err(|_| SurfaceError::Backend("readback callback dropped".into()))?
            .map_err(|err| SurfaceError::Backend(format!("readback map_async failed: {err:?}")))?;

        let mapped = slice.get_mapped_range();
        let out = mapped.to_vec();
        drop(mapped);
        buffer.unmap();
        Ok(out)
    }
}

impl SurfaceBackend for WgpuSurfaceBackend {
    type Texture = WgpuTexture;
    type Framebuffer = WgpuFramebuffer;

    fn create_texture(&self, params: &SurfaceParams) -> SurfaceResult<WgpuTexture> {
        let unsupported = SurfaceError::UnsupportedPixelFormat {
            format: params.pixel_format,
            target: "host texture",
        };
        let (format, needs) = map_format(params.pixel_format).ok_or_else(|| unsupported.clone())?;
        if !self.device.features().contains(needs) {
            tracing::warn!(
                format = ?params.pixel_format,
                missing = ?needs,
                "device lacks the feature required for this surface format"
            );
            return Err(unsupported);
        }
        check_extent(params, self.device.limits().max_texture_dimension_2d)?;

        let usage = if is_depth(params.surface_type) {
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
        } else if params.pixel_format.is_compressed()
            || params.pixel_format == PixelFormat::R11FG11FB10F
        {
            wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING
        } else {
            wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cached surface"),
            size: extent(params),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        Ok(WgpuTexture {
            texture,
            format,
            surface_type: params.surface_type,
        })
    }

    fn create_framebuffer(&self) -> WgpuFramebuffer {
        WgpuFramebuffer::default()
    }

    fn upload_texture(
        &self,
        texture: &WgpuTexture,
        params: &SurfaceParams,
        data: &[u8],
        _read_fb: &WgpuFramebuffer,
        draw_fb: &WgpuFramebuffer,
    ) -> SurfaceResult<()> {
        check_len(params, data.len())?;
        if is_depth(texture.surface_type) {
            tracing::debug!(addr = params.addr, format = ?params.pixel_format, "skipping depth surface upload");
            return Ok(());
        }

        let layout = CopyLayout::new(params);
        let mut padded = vec![0u8; layout.buffer_size() as usize];
        let src_stride = layout.unpadded_bytes_per_row as usize;
        let dst_stride = layout.padded_bytes_per_row as usize;
        for (row, src) in data.chunks_exact(src_stride).enumerate() {
            padded[row * dst_stride..row * dst_stride + src_stride].copy_from_slice(src);
        }

        let buffer = draw_fb.take_scratch(
            &self.device,
            layout.buffer_size(),
            wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
        );
        self.queue.write_buffer(&buffer, 0, &padded);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("surface upload"),
            });
        encoder.copy_buffer_to_texture(
            layout.buffer_copy(&buffer),
            texture_copy(&texture.texture),
            extent(params),
        );
        self.queue.submit([encoder.finish()]);
        draw_fb.put_scratch(buffer);
        Ok(())
    }

    fn download_texture(
        &self,
        texture: &WgpuTexture,
        params: &SurfaceParams,
        data: &mut [u8],
        read_fb: &WgpuFramebuffer,
        _draw_fb: &WgpuFramebuffer,
    ) -> SurfaceResult<()> {
        check_len(params, data.len())?;
        if is_depth(texture.surface_type) {
            tracing::debug!(addr = params.addr, format = ?params.pixel_format, "skipping depth surface download");
            return Ok(());
        }

        let layout = CopyLayout::new(params);
        let buffer = read_fb.take_scratch(
            &self.device,
            layout.buffer_size(),
            wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("surface download"),
            });
        encoder.copy_texture_to_buffer(
            texture_copy(&texture.texture),
            layout.buffer_copy(&buffer),
            extent(params),
        );
        self.queue.submit([encoder.finish()]);

        let result = self.read_back(&buffer, layout.buffer_size());
        read_fb.put_scratch(buffer);
        let padded = result?;

        let src_stride = layout.padded_bytes_per_row as usize;
        let dst_stride = layout.unpadded_bytes_per_row as usize;
        for (row, dst) in data.chunks_exact_mut(dst_stride).enumerate() {
            dst.copy_from_slice(&padded[row * src_stride..row * src_stride + dst_stride]);
        }
        Ok(())
    }
}
