use oglutils::capabilities::{GlInfo, ShaderSupport};
use oglutils::shaders::load_from_directory;
use oglutils::{GeometryBuffer, NativeGl, ShaderProgram, ShaderStage, Topology, VertexAttribute};

use crate::renderer::{FrameContext, Key, KeyAction, MouseButton, Renderer};

use super::{begin_frame, polygon_mode};

const INITIAL_POINTS: [[f32; 2]; 6] = [
    [-0.5, 0.0],
    [0.0, 0.5],
    [0.0, -0.5],
    [0.5, 0.0],
    [0.7, 0.5],
    [0.9, -0.7],
];

/// A colour per point index, spread around the hue circle so neighbours differ.
fn palette_color(index: usize) -> [f32; 3] {
    let hue = (index as f32 * 0.618_034).fract() * 6.0;
    let x = 1.0 - (hue % 2.0 - 1.0).abs();
    match hue as u32 {
        0 => [1.0, x, 0.0],
        1 => [x, 1.0, 0.0],
        2 => [0.0, 1.0, x],
        3 => [0.0, x, 1.0],
        4 => [x, 0.0, 1.0],
        _ => [1.0, 0.0, x],
    }
}

/// Window coordinates (origin top left) to normalised device coordinates.
fn to_ndc(x: f64, y: f64, width: u32, height: u32) -> [f32; 2] {
    let width = width.max(1) as f64;
    let height = height.max(1) as f64;
    [
        ((x / width) * 2.0 - 1.0) as f32,
        (((height - y) / height) * 2.0 - 1.0) as f32,
    ]
}

/// The line strip the user is drawing, kept as two separate attribute arrays.
#[derive(Debug, Default, Clone, PartialEq)]
struct Points {
    positions: Vec<f32>,
    colors: Vec<f32>,
    indices: Vec<u32>,
}

impl Points {
    fn initial() -> Self {
        let mut points = Self::default();
        for (i, p) in INITIAL_POINTS.iter().enumerate() {
            points.push(*p, palette_color(i));
        }
        points
    }

    fn push(&mut self, position: [f32; 2], color: [f32; 3]) {
        self.indices.push(self.indices.len() as u32);
        self.positions.extend_from_slice(&position);
        self.colors.extend_from_slice(&color);
    }

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn upload(&self, gl: &NativeGl) -> GeometryBuffer {
        let mut buffers = GeometryBuffer::new(
            gl,
            &self.positions,
            None,
            vec![VertexAttribute::new("inPosition", 2)],
            Some(&self.indices),
        );
        buffers.add_vertex_buffer(gl, &self.colors, vec![VertexAttribute::new("inColor", 3)], None);
        buffers
    }
}

/// Clicks add points to a line strip; the geometry shader turns each segment, with its
/// neighbours as adjacency, into a band. `R` resets the points, `M` toggles wireframe.
pub struct GeometryShader {
    program: Option<ShaderProgram>,
    buffers: Option<GeometryBuffer>,
    points: Points,
    update: bool,
    wireframe: bool,
    width: u32,
    height: u32,
}

impl Default for GeometryShader {
    fn default() -> Self {
        Self {
            program: None,
            buffers: None,
            points: Points::initial(),
            update: true,
            wireframe: false,
            width: 1,
            height: 1,
        }
    }
}

impl Renderer for GeometryShader {
    fn title(&self) -> &str {
        "Geometry shader over a line strip with adjacency"
    }

    fn init(&mut self, ctx: &FrameContext) -> Result<(), String> {
        let info = GlInfo::query(ctx.gl);
        if !ShaderSupport::from_info(&info).supports(ShaderStage::Geometry) {
            return Err(format!("Geometry shaders are not supported by {}", info.glsl_version_string));
        }

        // Drivers without explicit attribute layouts get the variant that leaves them out
        let name = if info.has_extension("GL_ARB_enhanced_layouts") {
            "geometry/geometry"
        } else {
            "geometry/geometry_older"
        };
        let program = load_from_directory(ctx.gl, ctx.config.shader_path(name))
            .map_err(|e| e.to_string())?;

        self.program = Some(program);
        self.width = ctx.width;
        self.height = ctx.height;
        info!("[LMB] add point, [R]eset, [M]ode");
        Ok(())
    }

    fn display(&mut self, ctx: &FrameContext) {
        let program = match &self.program {
            Some(program) => program,
            None => return,
        };

        if self.update {
            if let Some(old) = self.buffers.take() {
                old.delete(ctx.gl);
            }
            self.buffers = Some(self.points.upload(ctx.gl));
            self.update = false;
            debug!("{} points", self.points.len());
        }

        begin_frame(ctx.width, ctx.height, [0.2, 0.2, 0.2]);
        polygon_mode(self.wireframe);

        if let Some(buffers) = &self.buffers {
            buffers.draw(ctx.gl, Topology::LineStripAdjacency, program.id(), Some(self.points.len()), 0);
        }
    }

    fn on_key(&mut self, key: Key, action: KeyAction) {
        if action != KeyAction::Press {
            return;
        }

        match key {
            Key::R => {
                self.points = Points::initial();
                self.update = true;
            }
            Key::M => self.wireframe = !self.wireframe,
            _ => {}
        }
    }

    fn on_mouse_button(&mut self, button: MouseButton, action: KeyAction, x: f64, y: f64) {
        if button == MouseButton::Left && action == KeyAction::Press {
            let position = to_ndc(x, y, self.width, self.height);
            let color = [position[0] / 2.0 + 0.5, position[1] / 2.0 + 0.5, 1.0];
            self.points.push(position, color);
            self.update = true;
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn dispose(&mut self, gl: &NativeGl) {
        if let Some(buffers) = self.buffers.take() {
            buffers.delete(gl);
        }
        if let Some(program) = self.program.take() {
            program.delete(gl);
        }
    }
}
