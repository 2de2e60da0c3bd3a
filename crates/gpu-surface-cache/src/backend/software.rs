use std::cell::{Cell, Ref, RefCell};

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface_params::{PixelFormat, SurfaceParams};

use super::SurfaceBackend;

/// CPU-resident texture.
#[derive(Debug)]
pub struct SoftwareTexture {
    format: PixelFormat,
    width: u32,
    height: u32,
    data: RefCell<Vec<u8>>,
}

impl SoftwareTexture {
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> Ref<'_, [u8]> {
        Ref::map(self.data.borrow(), |v| v.as_slice())
    }

    /// Overwrites the texture contents, standing in for a draw into the texture.
    pub fn write(&self, offset: usize, bytes: &[u8]) {
        self.data.borrow_mut()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

/// Scratch framebuffer; counts how often it was bound for a transfer.
#[derive(Debug, Default)]
pub struct SoftwareFramebuffer {
    attachments: Cell<u64>,
}

impl SoftwareFramebuffer {
    pub fn attachments(&self) -> u64 {
        self.attachments.get()
    }

    fn attach(&self) {
        self.attachments.set(self.attachments.get() + 1);
    }
}

/// Backend keeping every texture in host memory.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    textures_created: Cell<u64>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textures_created(&self) -> u64 {
        self.textures_created.get()
    }
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

impl SurfaceBackend for SoftwareBackend {
    type Texture = SoftwareTexture;
    type Framebuffer = SoftwareFramebuffer;

    fn create_texture(&self, params: &SurfaceParams) -> SurfaceResult<SoftwareTexture> {
        if params.pixel_format == PixelFormat::Invalid {
            return Err(SurfaceError::UnsupportedPixelFormat {
                format: params.pixel_format,
                target: "host texture",
            });
        }
        self.textures_created.set(self.textures_created.get() + 1);
        Ok(SoftwareTexture {
            format: params.pixel_format,
            width: params.width,
            height: params.height,
            data: RefCell::new(vec![0u8; params.size_in_bytes as usize]),
        })
    }

    fn create_framebuffer(&self) -> SoftwareFramebuffer {
        SoftwareFramebuffer::default()
    }

    fn upload_texture(
        &self,
        texture: &SoftwareTexture,
        params: &SurfaceParams,
        data: &[u8],
        _read_fb: &SoftwareFramebuffer,
        draw_fb: &SoftwareFramebuffer,
    ) -> SurfaceResult<()> {
        check_len(params, data.len())?;
        draw_fb.attach();
        texture.data.borrow_mut().copy_from_slice(data);
        Ok(())
    }

    fn download_texture(
        &self,
        texture: &SoftwareTexture,
        params: &SurfaceParams,
        data: &mut [u8],
        read_fb: &SoftwareFramebuffer,
        _draw_fb: &SoftwareFramebuffer,
    ) -> SurfaceResult<()> {
        check_len(params, data.len())?;
        read_fb.attach();
        data.copy_from_slice(&texture.data.borrow());
        Ok(())
    }
}
