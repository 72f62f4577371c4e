use image::RgbaImage;

use crate::error::{Result, TextureError};
use crate::gl::{self, Gl};
use crate::normalize::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl Wrap {
    fn to_gl(self) -> u32 {
        match self {
            Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            Wrap::Repeat => gl::REPEAT,
            Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl Filter {
    fn to_gl(self) -> u32 {
        match self {
            Filter::Nearest => gl::NEAREST,
            Filter::Linear => gl::LINEAR,
            Filter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
            Filter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
            Filter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
            Filter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
        }
    }
}

/// Sampling policy for a [`Texture`].
///
/// Filters only apply when `mipmap` is set; without mipmaps both filters are
/// nearest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub mipmap: bool,
    pub min_filter: Filter,
    pub mag_filter: Filter,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
            mipmap: true,
            min_filter: Filter::Nearest,
            mag_filter: Filter::Nearest,
        }
    }
}

/// Dimensions of the source bitmap before power-of-two normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
    pub aspect: f32,
}

/// One GPU texture built from a bitmap.
pub struct Texture<G: Gl> {
    gl: G,
    texture: Option<G::Texture>,
    size: TextureSize,
}

impl<G: Gl> Texture<G> {
    /// Normalizes `source`, uploads it through unit 0 and leaves the 2D
    /// target unbound.
    pub fn new(gl: &G, source: &RgbaImage, options: TextureOptions) -> Result<Self> {
        let data = normalize(source);
        let texture = gl.create_texture().ok_or(TextureError::Create)?;

        gl.active_texture(gl::TEXTURE0);
        gl.bind_texture(gl::TEXTURE_2D, Some(&texture));
        if let Err(err) = gl.tex_image_rgba(data.width(), data.height(), data.as_raw()) {
            gl.bind_texture(gl::TEXTURE_2D, None);
            gl.delete_texture(&texture);
            return Err(TextureError::Upload(err).into());
        }

        let (min, mag) = if options.mipmap {
            gl.generate_mipmap(gl::TEXTURE_2D);
            (options.min_filter.to_gl(), options.mag_filter.to_gl())
        } else {
            (gl::NEAREST, gl::NEAREST)
        };
        gl.tex_parameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min);
        gl.tex_parameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag);
        gl.tex_parameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, options.wrap_s.to_gl());
        gl.tex_parameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, options.wrap_t.to_gl());

        gl.bind_texture(gl::TEXTURE_2D, None);

        let (width, height) = source.dimensions();
        log::debug!(
            "uploaded {}x{} texture (source {}x{})",
            data.width(),
            data.height(),
            width,
            height
        );
        Ok(Self {
            gl: gl.clone(),
            texture: Some(texture),
            size: TextureSize {
                width,
                height,
                aspect: width as f32 / height.max(1) as f32,
            },
        })
    }

    /// `None` once disposed.
    pub fn handle(&self) -> Option<&G::Texture> {
        self.texture.as_ref()
    }

    pub fn size(&self) -> TextureSize {
        self.size
    }

    pub fn dispose(&mut self) {
        if let Some(texture) = self.texture.take() {
            self.gl.delete_texture(&texture);
        }
    }
}
