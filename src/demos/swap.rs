use oglutils::shaders::load_from_directory;
use oglutils::{GeometryBuffer, NativeGl, ShaderProgram, Topology, VertexAttribute};

use crate::renderer::{FrameContext, Key, KeyAction, Renderer};

use super::begin_frame;

const FRAMES_PER_PROGRAM: u32 = 60;

struct Scene {
    colored: ShaderProgram,
    flat: ShaderProgram,
    buffers: GeometryBuffer,
}

/// One geometry, two programs. `colored` reads position and colour; `flat` only reads position,
/// so its colour lookup comes back empty and that attribute is left alone. The programs take
/// turns every second, or on `Space`.
#[derive(Default)]
pub struct SwapPrograms {
    scene: Option<Scene>,
    frame: u32,
    use_flat: bool,
}

impl Renderer for SwapPrograms {
    fn title(&self) -> &str {
        "One geometry, swapped shader programs"
    }

    fn init(&mut self, ctx: &FrameContext) -> Result<(), String> {
        let colored = load_from_directory(ctx.gl, ctx.config.shader_path("swap/colored"))
            .map_err(|e| e.to_string())?;
        let flat = load_from_directory(ctx.gl, ctx.config.shader_path("swap/flat"))
            .map_err(|e| e.to_string())?;

        #[rustfmt::skip]
        let vertex_buffer_data = [
            -0.8, -0.8,   1.0, 0.5, 0.0,
             0.8, -0.8,   0.0, 1.0, 0.5,
             0.8,  0.8,   0.5, 0.0, 1.0,
            -0.8,  0.8,   1.0, 1.0, 1.0,
        ];
        let attributes = vec![
            VertexAttribute::new("inPosition", 2),
            VertexAttribute::new("inColor", 3),
        ];
        let buffers = GeometryBuffer::new(ctx.gl, &vertex_buffer_data, None, attributes, Some(&[0, 1, 2, 0, 2, 3]));

        self.scene = Some(Scene { colored, flat, buffers });
        info!("[Space] swap programs");
        Ok(())
    }

    fn display(&mut self, ctx: &FrameContext) {
        let scene = match &self.scene {
            Some(scene) => scene,
            None => return,
        };

        self.frame += 1;
        if self.frame >= FRAMES_PER_PROGRAM {
            self.frame = 0;
            self.use_flat = !self.use_flat;
        }

        begin_frame(ctx.width, ctx.height, [0.1, 0.1, 0.1]);

        let program = if self.use_flat { &scene.flat } else { &scene.colored };
        scene.buffers.draw(ctx.gl, Topology::Triangles, program.id(), None, 0);
    }

    fn on_key(&mut self, key: Key, action: KeyAction) {
        if key == Key::Space && action == KeyAction::Press {
            self.use_flat = !self.use_flat;
            self.frame = 0;
        }
    }

    fn dispose(&mut self, gl: &NativeGl) {
        if let Some(scene) = self.scene.take() {
            scene.buffers.delete(gl);
            scene.colored.delete(gl);
            scene.flat.delete(gl);
        }
    }
}
