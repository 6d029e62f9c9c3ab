use std::sync::Arc;

use wgpu::TextureFormat;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

impl ColorSpace {
    #[inline]
    #[must_use]
    pub fn rgba8_format(self) -> TextureFormat {
        match self {
            ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => TextureFormat::Rgba8Unorm,
        }
    }
}

/// Decoded RGBA8 image ready for upload by the host.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Arc<Vec<u8>>,
}

impl TextureImage {
    /// CPU image decoding logic.
    pub fn decode(bytes: &[u8], color_space: ColorSpace, label: &str) -> Result<Self> {
        use image::GenericImageView;

        let img = image::load_from_memory(bytes)?;
        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        Ok(Self {
            label: label.to_string(),
            width,
            height,
            format: color_space.rgba8_format(),
            data: Arc::new(rgba.into_vec()),
        })
    }

    /// `(1/w, 1/h, w, h)`, the layout brush shaders expect in `*_TexelSize`.
    #[must_use]
    pub fn texel_size(&self) -> glam::Vec4 {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        glam::Vec4::new(1.0 / w, 1.0 / h, w, h)
    }
}
