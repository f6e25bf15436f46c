use oglutils::shaders::load_from_directory;
use oglutils::{GeometryBuffer, NativeGl, ShaderProgram, Topology, VertexAttribute};

use crate::graphics::uniforms::{set_f32, uniform_location};
use crate::renderer::{FrameContext, Renderer};

use super::begin_frame;

struct Scene {
    program: ShaderProgram,
    program2: ShaderProgram,
    buffers: GeometryBuffer,
    buffers2: GeometryBuffer,
    loc_time: i32,
    loc_time2: i32,
}

/// Two triangles, each with its own shader program. The first keeps position and colour
/// interleaved in one buffer, the second keeps them in two.
#[derive(Default)]
pub struct Multiple {
    time: f32,
    scene: Option<Scene>,
}

fn create_buffers(gl: &NativeGl) -> (GeometryBuffer, GeometryBuffer) {
    #[rustfmt::skip]
    let vertex_buffer_data = [
        -1.0, -1.0,   0.7, 0.0, 0.0,
         1.0,  0.0,   0.0, 0.7, 0.0,
         0.0,  1.0,   0.0, 0.0, 0.7,
    ];
    let index_buffer_data = [0, 1, 2];

    let attributes = vec![
        VertexAttribute::new("inPosition", 2),
        VertexAttribute::new("inColor", 3),
    ];
    let buffers = GeometryBuffer::new(gl, &vertex_buffer_data, None, attributes, Some(&index_buffer_data));

    #[rustfmt::skip]
    let vertex_buffer_data_pos = [
        -1.0,  1.0,
         0.5,  0.0,
        -0.5, -1.0,
    ];
    #[rustfmt::skip]
    let vertex_buffer_data_col = [
        0.0, 1.0, 1.0,
        1.0, 0.0, 1.0,
        1.0, 1.0, 1.0,
    ];

    let mut buffers2 = GeometryBuffer::new(
        gl,
        &vertex_buffer_data_pos,
        None,
        vec![VertexAttribute::new("inPosition", 2)],
        Some(&index_buffer_data),
    );
    buffers2.add_vertex_buffer(gl, &vertex_buffer_data_col, vec![VertexAttribute::new("inColor", 3)], None);

    (buffers, buffers2)
}

impl Renderer for Multiple {
    fn title(&self) -> &str {
        "Two geometries, two shader programs"
    }

    fn init(&mut self, ctx: &FrameContext) -> Result<(), String> {
        let program = load_from_directory(ctx.gl, ctx.config.shader_path("multiple/start"))
            .map_err(|e| e.to_string())?;
        let program2 = load_from_directory(ctx.gl, ctx.config.shader_path("multiple/start2"))
            .map_err(|e| e.to_string())?;

        let (buffers, buffers2) = create_buffers(ctx.gl);
        debug!("First geometry: {}", buffers);
        debug!("Second geometry: {}", buffers2);

        self.scene = Some(Scene {
            loc_time: uniform_location(program.id(), "time"),
            loc_time2: uniform_location(program2.id(), "time"),
            program,
            program2,
            buffers,
            buffers2,
        });
        Ok(())
    }

    fn display(&mut self, ctx: &FrameContext) {
        let scene = match &self.scene {
            Some(scene) => scene,
            None => return,
        };

        begin_frame(ctx.width, ctx.height, [0.1, 0.1, 0.1]);
        self.time += 0.1;

        // A uniform is set on the program in use, so each program goes current first
        scene.program.use_program(ctx.gl);
        set_f32(scene.loc_time, self.time);
        scene.buffers.draw(ctx.gl, Topology::Triangles, scene.program.id(), None, 0);

        scene.program2.use_program(ctx.gl);
        set_f32(scene.loc_time2, self.time);
        scene.buffers2.draw(ctx.gl, Topology::Triangles, scene.program2.id(), None, 0);
    }

    fn dispose(&mut self, gl: &NativeGl) {
        if let Some(scene) = self.scene.take() {
            scene.buffers.delete(gl);
            scene.buffers2.delete(gl);
            scene.program.delete(gl);
            scene.program2.delete(gl);
        }
    }
}
