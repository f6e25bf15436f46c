//! 2D textures, either allocated empty or loaded from an image file.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{error, info, warn};
use thiserror::Error;

use crate::context::{GlContext, TextureFormat};

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("error reading texture file {}: {source}", .path.display())]
    Image { path: PathBuf, source: image::ImageError },

    #[error("unable to create a new texture")]
    Creation,

    #[error("framebuffer is incomplete (status 0x{0:04X})")]
    IncompleteFramebuffer(u32),
}

/// A texture object with its size. Clamped to the edge and linearly filtered.
#[derive(Debug, PartialEq, Eq)]
pub struct Texture2D {
    id: u32,
    width: u32,
    height: u32,
    format: TextureFormat,
}

impl Texture2D {
    /// Creates a `width` x `height` texture. Without `data` the storage is left undefined.
    pub fn from_raw<G: GlContext + ?Sized>(
        gl: &G,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
    ) -> Result<Texture2D, TextureError> {
        let id = gl.gen_texture();
        if id == 0 {
            error!("Unable to create a {}x{} texture", width, height);
            return Err(TextureError::Creation);
        }

        let data = match data {
            Some(d) if d.len() < width as usize * height as usize * format.pixel_size() => {
                warn!(
                    "Texture {} got {} bytes for {}x{} pixels; storage left undefined",
                    id, d.len(), width, height
                );
                None
            }
            other => other,
        };

        gl.texture_image_2d(id, format, width, height, data);
        Ok(Texture2D { id, width, height, format })
    }

    /// Uploads a decoded image as RGBA8.
    pub fn from_image<G: GlContext + ?Sized>(gl: &G, image: &RgbaImage) -> Result<Texture2D, TextureError> {
        Texture2D::from_raw(gl, image.width(), image.height(), TextureFormat::RGBA8, Some(image.as_raw()))
    }

    /// Reads an image file and uploads it. With `flip_y` the last row of the file becomes row 0 of
    /// the texture, which puts the picture the right way up for OpenGL texture coordinates.
    pub fn from_file<G: GlContext + ?Sized>(gl: &G, path: &Path, flip_y: bool) -> Result<Texture2D, TextureError> {
        let image = load_rgba(path, flip_y)?;
        info!("Reading texture file {}... OK [{}x{}]", path.display(), image.width(), image.height());
        Texture2D::from_image(gl, &image)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Binds the texture to unit `slot` and points the sampler uniform `name` at it. `program`
    /// has to be in use.
    pub fn bind_slot<G: GlContext + ?Sized>(&self, gl: &G, program: u32, name: &str, slot: u32) {
        gl.bind_texture_unit(slot, self.id);
        let location = gl.uniform_location(program, name);
        if location < 0 {
            warn!("Sampler {} not found in program {}", name, program);
            return;
        }
        gl.uniform_i32(location, slot as i32);
    }

    pub fn delete<G: GlContext + ?Sized>(self, gl: &G) {
        gl.delete_texture(self.id);
    }
}

/// Decodes an image file into RGBA8 rows, top row first unless `flip_y` is set.
pub fn load_rgba(path: &Path, flip_y: bool) -> Result<RgbaImage, TextureError> {
    let image = image::open(path)
        .map_err(|source| TextureError::Image { path: path.to_path_buf(), source })?;
    let image = if flip_y { image.flipv() } else { image };
    Ok(image.to_rgba8())
}
