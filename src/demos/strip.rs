use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use oglutils::shaders::load_from_directory;
use oglutils::{Camera, GeometryBuffer, NativeGl, ShaderProgram, Topology, VertexAttribute};

use crate::graphics::uniforms::{set_mat4, uniform_location};
use crate::renderer::{FrameContext, Key, KeyAction, MouseButton, Renderer};

use super::{begin_frame, polygon_mode};

const RESTART_INDEX: u32 = 65535;

/// Six triangles stacked along y, position and normal per vertex.
#[rustfmt::skip]
const STRIP: [f32; 108] = [
    // 1st triangle
    1.0, 0.0, 0.0,  0.0, 0.0, -1.0,   0.0, 0.0, 0.0,  0.0, 0.0, -1.0,   1.0, 1.0, 0.0,  0.0, 0.0, -1.0,
    // 2nd
    0.0, 0.0, 0.0,  0.0, -1.0, 0.0,   1.0, 1.0, 0.0,  0.0, -1.0, 0.0,   0.0, 1.0, 0.0,  0.0, -1.0, 0.0,
    // 3rd
    1.0, 1.0, 0.0,  -1.0, 0.0, 0.0,   0.0, 1.0, 0.0,  -1.0, 0.0, 0.0,   1.0, 2.0, 0.0,  -1.0, 0.0, 0.0,
    // 4th
    0.0, 1.0, 0.0,  0.0, 1.0, 0.0,    1.0, 2.0, 0.0,  0.0, 1.0, 0.0,    0.0, 2.0, 0.0,  0.0, 1.0, 0.0,
    // 5th
    1.0, 2.0, 0.0,  0.0, 0.0, 1.0,    0.0, 2.0, 0.0,  0.0, 0.0, 1.0,    1.0, 3.0, 0.0,  0.0, 0.0, 1.0,
    // 6th
    0.0, 2.0, 0.0,  1.0, 0.0, 0.0,    1.0, 3.0, 0.0,  1.0, 0.0, 0.0,    0.0, 3.0, 0.0,  1.0, 1.0, 1.0,
];

const STRIP_INDICES: [u32; 8] = [0, 1, 2, 5, 8, 11, 14, 17];
const RESTART_INDICES: [u32; 9] = [0, 1, 2, 5, RESTART_INDEX, 12, 13, 14, 17];

/// Indices of the 1st, 3rd and 5th triangles of the list.
fn odd_triangle_indices() -> Vec<u32> {
    (0..3u32).flat_map(|t| (0..3u32).map(move |v| 6 * t + v)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    List,
    IndexedList,
    Strip,
    RestartStrip,
}

#[derive(Debug, Clone, Copy)]
struct Mode {
    source: Source,
    topology: Topology,
    count: Option<usize>,
    start: usize,
    description: &'static str,
}

const fn mode(
    source: Source,
    topology: Topology,
    count: Option<usize>,
    start: usize,
    description: &'static str,
) -> Mode {
    Mode { source, topology, count, start, description }
}

const MODES: [Mode; 11] = [
    mode(Source::List, Topology::Triangles, None, 0,
        "all triangles of triangle list, without index buffer"),
    mode(Source::List, Topology::Triangles, Some(9), 0,
        "first 3 triangles of triangle list, without index buffer"),
    mode(Source::List, Topology::Triangles, Some(9), 6,
        "3rd, 4th and 5th triangles of triangle list, without index buffer"),
    mode(Source::IndexedList, Topology::Triangles, None, 0,
        "odd triangles of triangle list, with index buffer"),
    mode(Source::IndexedList, Topology::Triangles, Some(6), 0,
        "1st and 2nd odd triangles of triangle list, with index buffer"),
    mode(Source::IndexedList, Topology::Triangles, Some(6), 3,
        "2nd and 3rd odd triangles of triangle list, with index buffer"),
    mode(Source::Strip, Topology::TriangleStrip, None, 0,
        "all triangles of triangle strip, with index buffer"),
    mode(Source::Strip, Topology::TriangleStrip, Some(5), 0,
        "first 3 triangles of triangle strip, with index buffer"),
    mode(Source::Strip, Topology::TriangleStrip, Some(4), 2,
        "3rd and 4th triangles of triangle strip, with index buffer and range"),
    mode(Source::RestartStrip, Topology::TriangleStrip, None, 0,
        "1st-2nd and 5th-6th triangles of triangle strip, with primitive restart index"),
    mode(Source::RestartStrip, Topology::TriangleStrip, Some(8), 1,
        "1st and 4th-6th triangles of triangle strip, with primitive restart index and range"),
];

struct Scene {
    program: ShaderProgram,
    loc_mat: i32,
    list: GeometryBuffer,
    indexed_list: GeometryBuffer,
    strip: GeometryBuffer,
    restart_strip: GeometryBuffer,
}

impl Scene {
    fn geometry(&self, source: Source) -> &GeometryBuffer {
        match source {
            Source::List => &self.list,
            Source::IndexedList => &self.indexed_list,
            Source::Strip => &self.strip,
            Source::RestartStrip => &self.restart_strip,
        }
    }
}

/// One vertex array drawn every way the geometry buffer allows: whole or ranged, with or without
/// indices, as a list or a strip, with and without primitive restart.
///
/// `M` cycles the modes, `P` toggles wireframe. The camera moves with WSAD, Shift and Ctrl,
/// turns with the left mouse button, and `Space` switches first and third person.
pub struct Strip {
    scene: Option<Scene>,
    camera: Camera,
    projection: Mat4,
    mode: usize,
    wireframe: bool,
    dragging: bool,
    last_cursor: (f64, f64),
    width: u32,
    height: u32,
}

impl Default for Strip {
    fn default() -> Self {
        Self {
            scene: None,
            camera: Camera::default()
                .with_position(Vec3::new(5.0, 5.0, 2.5))
                .with_azimuth(PI * 1.25)
                .with_zenith(PI * -0.125),
            projection: projection(1, 1),
            mode: 0,
            wireframe: false,
            dragging: false,
            last_cursor: (0.0, 0.0),
            width: 1,
            height: 1,
        }
    }
}

fn projection(width: u32, height: u32) -> Mat4 {
    Mat4::perspective_rh_gl(PI / 4.0, width as f32 / height as f32, 0.01, 1000.0)
}

impl Strip {
    fn current_mode(&self) -> Mode {
        MODES[self.mode % MODES.len()]
    }

    fn turn(&mut self, x: f64, y: f64) {
        let (ox, oy) = self.last_cursor;
        let width = self.width.max(1) as f64;
        self.camera = self.camera
            .add_azimuth((std::f64::consts::PI * (ox - x) / width) as f32)
            .add_zenith((std::f64::consts::PI * (oy - y) / width) as f32);
        self.last_cursor = (x, y);
    }
}

impl Renderer for Strip {
    fn title(&self) -> &str {
        "Triangle lists, strips and primitive restart"
    }

    fn init(&mut self, ctx: &FrameContext) -> Result<(), String> {
        let program = load_from_directory(ctx.gl, ctx.config.shader_path("strip/simple"))
            .map_err(|e| e.to_string())?;

        let attributes = || vec![
            VertexAttribute::new("inPosition", 3),
            VertexAttribute::new("inNormal", 3),
        ];

        let list = GeometryBuffer::new(ctx.gl, &STRIP, None, attributes(), None);
        let indexed_list = GeometryBuffer::new(ctx.gl, &STRIP, None, attributes(), Some(&odd_triangle_indices()));
        let strip = GeometryBuffer::new(ctx.gl, &STRIP, None, attributes(), Some(&STRIP_INDICES));
        let restart_strip = GeometryBuffer::new(ctx.gl, &STRIP, None, attributes(), Some(&RESTART_INDICES));

        for (name, geometry) in &[("list", &list), ("indexed list", &indexed_list), ("strip", &strip), ("restart strip", &restart_strip)] {
            debug!("{}: {}", name, geometry);
        }

        self.scene = Some(Scene {
            loc_mat: uniform_location(program.id(), "mat"),
            program,
            list,
            indexed_list,
            strip,
            restart_strip,
        });

        self.on_resize(ctx.width, ctx.height);

        unsafe {
            gl::Disable(gl::CULL_FACE);
            gl::FrontFace(gl::CCW);
            gl::Enable(gl::DEPTH_TEST);
        }
        info!("[LMB] camera, WSAD, [M]ode, [P]olygon");
        Ok(())
    }

    fn display(&mut self, ctx: &FrameContext) {
        let scene = match &self.scene {
            Some(scene) => scene,
            None => return,
        };

        begin_frame(ctx.width, ctx.height, [0.2, 0.2, 0.2]);

        scene.program.use_program(ctx.gl);
        set_mat4(scene.loc_mat, &(self.projection * self.camera.view_matrix()));

        polygon_mode(self.wireframe);

        let mode = self.current_mode();
        let restart = mode.source == Source::RestartStrip;
        if restart {
            unsafe {
                gl::Enable(gl::PRIMITIVE_RESTART);
                gl::PrimitiveRestartIndex(RESTART_INDEX);
            }
        }

        scene.geometry(mode.source).draw(ctx.gl, mode.topology, scene.program.id(), mode.count, mode.start);

        if restart {
            unsafe { gl::Disable(gl::PRIMITIVE_RESTART) }
        }
    }

    fn on_key(&mut self, key: Key, action: KeyAction) {
        if action != KeyAction::Press {
            return;
        }

        self.camera = match key {
            Key::W => self.camera.forward(1.0),
            Key::S => self.camera.backward(1.0),
            Key::D => self.camera.right(1.0),
            Key::A => self.camera.left(1.0),
            Key::LeftControl => self.camera.down(1.0),
            Key::LeftShift => self.camera.up(1.0),
            Key::Space => self.camera.with_first_person(!self.camera.is_first_person()),
            Key::R => self.camera.mul_radius(0.9),
            Key::F => self.camera.mul_radius(1.1),
            _ => self.camera,
        };

        match key {
            Key::P => self.wireframe = !self.wireframe,
            Key::M => {
                self.mode = (self.mode + 1) % MODES.len();
                info!("[M]ode {}: {}", self.mode, self.current_mode().description);
            }
            _ => {}
        }
    }

    fn on_cursor_moved(&mut self, x: f64, y: f64) {
        if self.dragging {
            self.turn(x, y);
        }
    }

    fn on_mouse_button(&mut self, button: MouseButton, action: KeyAction, x: f64, y: f64) {
        if button != MouseButton::Left {
            return;
        }

        match action {
            KeyAction::Press => {
                self.dragging = true;
                self.last_cursor = (x, y);
            }
            KeyAction::Release => {
                self.dragging = false;
                self.turn(x, y);
            }
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            self.projection = projection(width, height);
        }
    }

    fn dispose(&mut self, gl: &NativeGl) {
        if let Some(scene) = self.scene.take() {
            scene.list.delete(gl);
            scene.indexed_list.delete(gl);
            scene.strip.delete(gl);
            scene.restart_strip.delete(gl);
            scene.program.delete(gl);
        }
    }
}
