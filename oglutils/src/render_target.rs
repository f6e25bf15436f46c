//! Off-screen framebuffers with float colour textures and a depth texture.

use gl;
use log::{debug, error, warn};

use crate::context::{GlContext, TextureFormat};
use crate::texture::{Texture2D, TextureError};

/// A framebuffer object whose attachments can be sampled once rendering into it is done.
#[derive(Debug)]
pub struct RenderTarget {
    framebuffer: u32,
    width: u32,
    height: u32,
    color: Vec<Texture2D>,
    depth: Texture2D,
    draw_buffers: Vec<u32>,
}

impl RenderTarget {
    /// A `width` x `height` target with `count` RGBA32F colour attachments and a depth attachment.
    /// At least one colour attachment is always made.
    pub fn new<G: GlContext + ?Sized>(
        gl: &G,
        width: u32,
        height: u32,
        count: usize,
    ) -> Result<RenderTarget, TextureError> {
        RenderTarget::with_format(gl, width, height, count, TextureFormat::RGBA32F)
    }

    pub fn with_format<G: GlContext + ?Sized>(
        gl: &G,
        width: u32,
        height: u32,
        count: usize,
        format: TextureFormat,
    ) -> Result<RenderTarget, TextureError> {
        let count = count.max(1);

        let mut color = Vec::with_capacity(count);
        for _ in 0..count {
            match Texture2D::from_raw(gl, width, height, format, None) {
                Ok(texture) => color.push(texture),
                Err(e) => {
                    color.into_iter().for_each(|t: Texture2D| t.delete(gl));
                    return Err(e);
                }
            }
        }

        let depth = match Texture2D::from_raw(gl, width, height, TextureFormat::DEPTH, None) {
            Ok(texture) => texture,
            Err(e) => {
                color.into_iter().for_each(|t| t.delete(gl));
                return Err(e);
            }
        };

        let framebuffer = gl.gen_framebuffer();
        let draw_buffers: Vec<u32> = (0..count as u32).map(|i| gl::COLOR_ATTACHMENT0 + i).collect();

        let target = RenderTarget { framebuffer, width, height, color, depth, draw_buffers };

        gl.bind_framebuffer(framebuffer);
        for (attachment, texture) in target.draw_buffers.iter().zip(&target.color) {
            gl.framebuffer_texture(*attachment, texture.id());
        }
        gl.framebuffer_texture(gl::DEPTH_ATTACHMENT, target.depth.id());

        let status = gl.framebuffer_status();
        gl.bind_framebuffer(0);

        if status != gl::FRAMEBUFFER_COMPLETE {
            error!("There is a problem with framebuffer {}: status 0x{:04X}", framebuffer, status);
            target.delete(gl);
            return Err(TextureError::IncompleteFramebuffer(status));
        }

        debug!("Framebuffer {} ready: {}x{}, {} colour texture(s)", framebuffer, width, height, count);
        Ok(target)
    }

    /// Directs drawing into every colour attachment and sets the viewport to the target's size.
    pub fn bind<G: GlContext + ?Sized>(&self, gl: &G) {
        gl.bind_framebuffer(self.framebuffer);
        gl.draw_buffers(&self.draw_buffers);
        gl.viewport(0, 0, self.width, self.height);
    }

    /// Samples colour attachment `index` through the uniform `name` on texture unit `slot`.
    pub fn bind_color_texture<G: GlContext + ?Sized>(
        &self,
        gl: &G,
        program: u32,
        name: &str,
        slot: u32,
        index: usize,
    ) {
        self.color_texture(index).bind_slot(gl, program, name, slot);
    }

    pub fn bind_depth_texture<G: GlContext + ?Sized>(&self, gl: &G, program: u32, name: &str, slot: u32) {
        self.depth.bind_slot(gl, program, name, slot);
    }

    /// Colour attachment `index`, or the first one when there is no such attachment.
    pub fn color_texture(&self, index: usize) -> &Texture2D {
        match self.color.get(index) {
            Some(texture) => texture,
            None => {
                warn!("Framebuffer {} has no colour texture {}; using 0", self.framebuffer, index);
                &self.color[0]
            }
        }
    }

    pub fn depth_texture(&self) -> &Texture2D {
        &self.depth
    }

    pub fn color_texture_count(&self) -> usize {
        self.color.len()
    }

    pub fn framebuffer(&self) -> u32 {
        self.framebuffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn delete<G: GlContext + ?Sized>(self, gl: &G) {
        gl.delete_framebuffer(self.framebuffer);
        for texture in self.color {
            texture.delete(gl);
        }
        self.depth.delete(gl);
    }
}

/// Goes back to drawing into the window.
pub fn bind_default_framebuffer<G: GlContext + ?Sized>(gl: &G, width: u32, height: u32) {
    gl.bind_framebuffer(0);
    gl.draw_buffers(&[gl::BACK_LEFT]);
    gl.viewport(0, 0, width, height);
}
