use oglutils::shaders::{load_from_directory, load_from_files};
use oglutils::{GeometryBuffer, NativeGl, ShaderProgram, ShaderStage, Topology, VertexAttribute};

use crate::graphics::texture::ImageTexture;
use crate::graphics::uniforms::{set_i32, uniform_location};
use crate::renderer::{FrameContext, Key, KeyAction, Renderer};

use super::begin_frame;

const IMAGE_SIZE: u32 = 256;
/// Must match `local_size_x`/`local_size_y` in computeImage.comp.
const LOCAL_SIZE: u32 = 32;
const MODES: i32 = 3;

fn create_buffers(gl: &NativeGl) -> GeometryBuffer {
    // position, colour, then texture coordinates at an explicit offset
    #[rustfmt::skip]
    let vertex_buffer_data = [
        -1.0, -1.0,   0.7, 0.0, 0.0,   0.0, 0.0,
         1.0,  0.0,   0.0, 0.7, 0.0,   0.0, 1.0,
         0.0,  1.0,   0.0, 0.0, 0.7,   1.0, 0.0,
    ];
    let index_buffer_data = [0, 1, 2];

    let attributes = vec![
        VertexAttribute::new("inPosition", 2),
        VertexAttribute::new("inColor", 3),
        VertexAttribute::new("inTexCoord", 2).with_offset_in_floats(5),
    ];
    GeometryBuffer::new(gl, &vertex_buffer_data, Some(7), attributes, Some(&index_buffer_data))
}

struct Scene {
    program: ShaderProgram,
    compute_program: ShaderProgram,
    buffers: GeometryBuffer,
    image: ImageTexture,
    loc_mode: i32,
}

/// A compute shader fills an image, then a triangle reads it back through the same image unit.
/// `M` switches between the compute shader's patterns.
#[derive(Default)]
pub struct ComputeImage {
    scene: Option<Scene>,
    mode: i32,
}

impl Renderer for ComputeImage {
    fn title(&self) -> &str {
        "Compute shader writing an image"
    }

    fn required_gl_version(&self) -> (u8, u8) {
        (4, 3)
    }

    fn init(&mut self, ctx: &FrameContext) -> Result<(), String> {
        let program = load_from_directory(ctx.gl, ctx.config.shader_path("compute/drawImage"))
            .map_err(|e| e.to_string())?;
        let compute_program = load_from_files(
            ctx.gl,
            &[(Some(ShaderStage::Compute), ctx.config.shader_path("compute/computeImage"))],
        )
        .map_err(|e| e.to_string())?;

        let buffers = create_buffers(ctx.gl);
        debug!("{}", buffers);

        for dim in 0..3 {
            let mut size = 0;
            unsafe { gl::GetIntegeri_v(gl::MAX_COMPUTE_WORK_GROUP_SIZE, dim, &mut size) };
            info!("GL_MAX_COMPUTE_WORK_GROUP_SIZE [{}] : {}", dim, size);
        }

        self.scene = Some(Scene {
            loc_mode: uniform_location(compute_program.id(), "mode"),
            image: ImageTexture::new(IMAGE_SIZE, IMAGE_SIZE),
            program,
            compute_program,
            buffers,
        });
        info!("[M]ode");
        Ok(())
    }

    fn display(&mut self, ctx: &FrameContext) {
        let scene = match &self.scene {
            Some(scene) => scene,
            None => return,
        };

        scene.image.bind_image(0, gl::WRITE_ONLY);
        scene.compute_program.use_program(ctx.gl);
        set_i32(scene.loc_mode, self.mode);
        unsafe {
            gl::DispatchCompute(scene.image.width() / LOCAL_SIZE, scene.image.height() / LOCAL_SIZE, 1);
            // Writes to the image have to land before the draw reads it
            gl::MemoryBarrier(gl::SHADER_IMAGE_ACCESS_BARRIER_BIT);
        }

        begin_frame(ctx.width, ctx.height, [0.1, 0.1, 0.1]);

        scene.image.bind_image(0, gl::READ_ONLY);
        scene.buffers.draw(ctx.gl, Topology::Triangles, scene.program.id(), None, 0);
    }

    fn on_key(&mut self, key: Key, action: KeyAction) {
        if key == Key::M && action == KeyAction::Press {
            self.mode = (self.mode + 1) % MODES;
            info!("[M]ode: {}", self.mode);
        }
    }

    fn dispose(&mut self, gl: &NativeGl) {
        if let Some(scene) = self.scene.take() {
            scene.buffers.delete(gl);
            scene.image.delete();
            scene.program.delete(gl);
            scene.compute_program.delete(gl);
        }
    }
}
