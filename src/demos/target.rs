use oglutils::render_target::bind_default_framebuffer;
use oglutils::shaders::load_from_directory;
use oglutils::{
    GeometryBuffer, GlContext, NativeGl, RenderTarget, ShaderProgram, Texture2D, Topology, VertexAttribute,
};

use crate::graphics::uniforms::{set_f32, set_i32, uniform_location};
use crate::renderer::{FrameContext, Key, KeyAction, Renderer};

use super::clear;

const MODES: i32 = 4;
const MODE_NAMES: [&str; MODES as usize] = ["plain", "grayscale", "inverted", "edges"];
const SPIN: f32 = 0.01;

struct Scene {
    textured: ShaderProgram,
    postprocess: ShaderProgram,
    texture: Texture2D,
    quad: GeometryBuffer,
    target: RenderTarget,
}

/// Draws a spinning textured quad into an off-screen target, then draws the target's colour
/// texture over the whole window through a post-processing shader. `M` picks the effect.
#[derive(Default)]
pub struct RenderToTexture {
    scene: Option<Scene>,
    angle: f32,
    mode: i32,
}

fn load_scene(ctx: &FrameContext) -> Result<Scene, String> {
    let textured = load_from_directory(ctx.gl, ctx.config.shader_path("target/textured"))
        .map_err(|e| e.to_string())?;
    let postprocess = load_from_directory(ctx.gl, ctx.config.shader_path("target/postprocess"))
        .map_err(|e| e.to_string())?;

    let texture = Texture2D::from_file(ctx.gl, &ctx.config.texture_path("mosaic.png"), true)
        .map_err(|e| e.to_string())?;
    let target = RenderTarget::new(ctx.gl, ctx.width, ctx.height, 1).map_err(|e| e.to_string())?;

    #[rustfmt::skip]
    let vertex_buffer_data = [
        -1.0, -1.0,   0.0, 0.0,
         1.0, -1.0,   1.0, 0.0,
        -1.0,  1.0,   0.0, 1.0,
         1.0,  1.0,   1.0, 1.0,
    ];
    let attributes = vec![
        VertexAttribute::new("inPosition", 2),
        VertexAttribute::new("inTexCoord", 2),
    ];
    let quad = GeometryBuffer::new(ctx.gl, &vertex_buffer_data, None, attributes, None);

    Ok(Scene { textured, postprocess, texture, quad, target })
}

impl Renderer for RenderToTexture {
    fn title(&self) -> &str {
        "Render to texture and post-process"
    }

    fn init(&mut self, ctx: &FrameContext) -> Result<(), String> {
        self.scene = Some(load_scene(ctx)?);
        info!("[M] post-processing effect");
        Ok(())
    }

    fn display(&mut self, ctx: &FrameContext) {
        let scene = match &mut self.scene {
            Some(scene) => scene,
            None => return,
        };

        if (scene.target.width(), scene.target.height()) != (ctx.width, ctx.height) {
            match RenderTarget::new(ctx.gl, ctx.width, ctx.height, 1) {
                Ok(target) => std::mem::replace(&mut scene.target, target).delete(ctx.gl),
                Err(e) => error!("Keeping the old render target: {}", e),
            }
        }

        self.angle += SPIN;

        scene.target.bind(ctx.gl);
        clear([0.2, 0.2, 0.3]);

        let textured = scene.textured.id();
        ctx.gl.use_program(textured);
        set_f32(uniform_location(textured, "angle"), self.angle);
        scene.texture.bind_slot(ctx.gl, textured, "textureSampler", 0);
        scene.quad.draw(ctx.gl, Topology::TriangleStrip, textured, None, 0);

        bind_default_framebuffer(ctx.gl, ctx.width, ctx.height);
        clear([0.0, 0.0, 0.0]);

        let postprocess = scene.postprocess.id();
        ctx.gl.use_program(postprocess);
        set_i32(uniform_location(postprocess, "mode"), self.mode);
        scene.target.bind_color_texture(ctx.gl, postprocess, "colorTexture", 0, 0);
        scene.quad.draw(ctx.gl, Topology::TriangleStrip, postprocess, None, 0);
    }

    fn on_key(&mut self, key: Key, action: KeyAction) {
        if key == Key::M && action == KeyAction::Press {
            self.mode = (self.mode + 1) % MODES;
            info!("Effect: {}", MODE_NAMES[self.mode as usize]);
        }
    }

    fn dispose(&mut self, gl: &NativeGl) {
        if let Some(scene) = self.scene.take() {
            scene.quad.delete(gl);
            scene.target.delete(gl);
            scene.texture.delete(gl);
            scene.textured.delete(gl);
            scene.postprocess.delete(gl);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    #[test]
    fn mode_wraps() {
        let mut demo = RenderToTexture::default();
        for _ in 0..MODES {
            demo.on_key(Key::M, KeyAction::Press);
        }
        assert_eq!(demo.mode, 0);
        demo.on_key(Key::M, KeyAction::Release);
        assert_eq!(demo.mode, 0);
    }

    #[test]
    fn mosaic_is_marked_at_its_top_left() {
        let config = crate::config::SampleConfig::default();
        let path = config.texture_path("mosaic.png");

        let image = oglutils::texture::load_rgba(Path::new(&path), false).unwrap();
        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);

        // Flipped for upload, the marker ends up on texture row 63, the top of the quad
        let flipped = oglutils::texture::load_rgba(&path, true).unwrap();
        assert_eq!(flipped.get_pixel(0, 63).0, [255, 255, 255, 255]);
    }
}
