//! A recording stand-in for the driver. GLSL "fails" to compile when it has an `#error` line.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use gl;

use crate::context::{GlContext, TextureFormat};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ArrayData { id: u32, data: Vec<f32> },
    ElementData { id: u32, data: Vec<u32> },
    DeleteBuffer(u32),
    UseProgram(u32),
    Enable(u32),
    Disable(u32),
    AttribPointer { location: u32, size: i32, normalize: bool, stride: usize, offset: usize },
    DrawArrays { mode: u32, first: usize, count: usize },
    DrawElements { mode: u32, count: usize, byte_offset: usize },
    BindElementBuffer(u32),
    DeleteShader(u32),
    DeleteProgram(u32),
    Attach { program: u32, shader: u32 },
    Detach { program: u32, shader: u32 },
    Link(u32),
    TexImage { id: u32, format: TextureFormat, width: u32, height: u32, data: Option<Vec<u8>> },
    DeleteTexture(u32),
    BindTexture { slot: u32, id: u32 },
    Uniform1i { location: i32, value: i32 },
    BindFramebuffer(u32),
    FramebufferTexture { attachment: u32, texture: u32 },
    DrawBuffers(Vec<u32>),
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    DeleteFramebuffer(u32),
}

#[derive(Debug, Default)]
struct FakeShader {
    kind: u32,
    source: String,
    deleted: bool,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    locations: HashMap<String, i32>,
    uniforms: HashMap<String, i32>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    calls: Vec<Call>,
    enabled: BTreeSet<u32>,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    errors: Vec<u32>,
}

pub struct FakeGl {
    state: RefCell<State>,
    pub glsl_version: Option<&'static str>,
    pub gl_version: Option<&'static str>,
    pub extensions: Vec<&'static str>,
    pub unsupported_kinds: Vec<u32>,
    pub fail_link: bool,
    pub fail_program_creation: bool,
    pub fail_gen_buffer: bool,
    pub fail_gen_texture: bool,
    pub incomplete_framebuffer: bool,
}

impl FakeGl {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State { next_id: 1, ..State::default() }),
            glsl_version: Some("4.60 FakeGL"),
            gl_version: Some("4.6.0 FakeGL"),
            extensions: vec!["GL_ARB_debug_output", "GL_ARB_enhanced_layouts"],
            unsupported_kinds: vec![],
            fail_link: false,
            fail_program_creation: false,
            fail_gen_buffer: false,
            fail_gen_texture: false,
            incomplete_framebuffer: false,
        }
    }

    pub fn with_glsl_version(mut self, version: &'static str) -> Self {
        self.glsl_version = Some(version);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn enabled_locations(&self) -> BTreeSet<u32> {
        self.state.borrow().enabled.clone()
    }

    pub fn draws(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::DrawArrays { .. } | Call::DrawElements { .. }))
            .collect()
    }

    pub fn attached_kinds(&self, program: u32) -> Vec<u32> {
        let state = self.state.borrow();
        state.programs.get(&program)
            .map(|p| p.attached.iter().map(|s| state.shaders[s].kind).collect())
            .unwrap_or_default()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.values().filter(|s| !s.deleted).count()
    }

    pub fn program_exists(&self, program: u32) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push(code);
    }

    fn next_id(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        id
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Pulls attribute names out of `in vec3 inPosition;` style declarations.
fn declared_inputs(source: &str) -> Vec<String> {
    source.lines()
        .filter_map(|line| {
            let line = line.trim().trim_end_matches(';');
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["in", _, name] => Some(name.to_string()),
                _ => None,
            }
        })
        .collect()
}

impl GlContext for FakeGl {
    fn gen_buffer(&self) -> u32 {
        if self.fail_gen_buffer {
            return 0;
        }
        self.next_id()
    }

    fn delete_buffer(&self, id: u32) {
        self.record(Call::DeleteBuffer(id));
    }

    fn bind_array_buffer(&self, _id: u32) {}

    fn bind_element_buffer(&self, id: u32) {
        self.record(Call::BindElementBuffer(id));
    }

    fn array_buffer_data(&self, id: u32, data: &[f32]) {
        self.record(Call::ArrayData { id, data: data.to_vec() });
    }

    fn element_buffer_data(&self, id: u32, data: &[u32]) {
        self.record(Call::ElementData { id, data: data.to_vec() });
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        self.state.borrow().programs.get(&program)
            .and_then(|p| p.locations.get(name).copied())
            .unwrap_or(-1)
    }

    fn enable_vertex_attrib(&self, location: u32) {
        let mut state = self.state.borrow_mut();
        state.enabled.insert(location);
        state.calls.push(Call::Enable(location));
    }

    fn disable_vertex_attrib(&self, location: u32) {
        let mut state = self.state.borrow_mut();
        state.enabled.remove(&location);
        state.calls.push(Call::Disable(location));
    }

    fn vertex_attrib_pointer(&self, location: u32, size: i32, normalize: bool, stride: usize, offset: usize) {
        self.record(Call::AttribPointer { location, size, normalize, stride, offset });
    }

    fn use_program(&self, program: u32) {
        self.record(Call::UseProgram(program));
    }

    fn draw_arrays(&self, mode: u32, first: usize, count: usize) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: u32, count: usize, byte_offset: usize) {
        self.record(Call::DrawElements { mode, count, byte_offset });
    }

    fn create_shader(&self, kind: u32) -> u32 {
        if self.unsupported_kinds.contains(&kind) {
            return 0;
        }

        let id = self.next_id();
        self.state.borrow_mut().shaders.insert(id, FakeShader { kind, ..FakeShader::default() });
        id
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) -> bool {
        self.state.borrow().shaders.get(&shader)
            .map(|s| !s.source.contains("#error"))
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let state = self.state.borrow();
        let source = state.shaders.get(&shader).map(|s| s.source.as_str()).unwrap_or("");
        match source.lines().position(|l| l.contains("#error")) {
            Some(line) => format!("0:{}(1): error: #error directive", line + 1),
            None => String::new(),
        }
    }

    fn is_shader(&self, shader: u32) -> bool {
        self.state.borrow().shaders.get(&shader).map(|s| !s.deleted).unwrap_or(false)
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(s) = state.shaders.get_mut(&shader) {
            s.deleted = true;
        }
        state.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> u32 {
        if self.fail_program_creation {
            return 0;
        }

        let id = self.next_id();
        self.state.borrow_mut().programs.insert(id, FakeProgram::default());
        id
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(p) = state.programs.get_mut(&program) {
            p.attached.push(shader);
        }
        state.calls.push(Call::Attach { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(p) = state.programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
        state.calls.push(Call::Detach { program, shader });
    }

    fn link_program(&self, program: u32) -> bool {
        self.record(Call::Link(program));
        if self.fail_link {
            return false;
        }

        let mut state = self.state.borrow_mut();
        let inputs: Vec<String> = match state.programs.get(&program) {
            Some(p) => p.attached.iter()
                .filter_map(|s| state.shaders.get(s))
                .filter(|s| s.kind == gl::VERTEX_SHADER)
                .flat_map(|s| declared_inputs(&s.source))
                .collect(),
            None => return false,
        };

        if let Some(p) = state.programs.get_mut(&program) {
            p.locations = inputs.into_iter().enumerate().map(|(i, n)| (n, i as i32)).collect();
        }
        true
    }

    fn program_info_log(&self, _program: u32) -> String {
        if self.fail_link {
            "error: fragment shader output `fragColor' not written by vertex shader".to_string()
        } else {
            String::new()
        }
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        state.calls.push(Call::DeleteProgram(program));
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        // Any name is active; locations are handed out in the order they're asked for
        let mut state = self.state.borrow_mut();
        match state.programs.get_mut(&program) {
            Some(p) => {
                let next = p.uniforms.len() as i32;
                *p.uniforms.entry(name.to_string()).or_insert(next)
            }
            None => -1,
        }
    }

    fn uniform_i32(&self, location: i32, value: i32) {
        self.record(Call::Uniform1i { location, value });
    }

    fn gen_texture(&self) -> u32 {
        if self.fail_gen_texture {
            return 0;
        }
        self.next_id()
    }

    fn delete_texture(&self, id: u32) {
        self.record(Call::DeleteTexture(id));
    }

    fn texture_image_2d(&self, id: u32, format: TextureFormat, width: u32, height: u32, data: Option<&[u8]>) {
        self.record(Call::TexImage { id, format, width, height, data: data.map(|d| d.to_vec()) });
    }

    fn bind_texture_unit(&self, slot: u32, id: u32) {
        self.record(Call::BindTexture { slot, id });
    }

    fn gen_framebuffer(&self) -> u32 {
        self.next_id()
    }

    fn delete_framebuffer(&self, id: u32) {
        self.record(Call::DeleteFramebuffer(id));
    }

    fn bind_framebuffer(&self, id: u32) {
        self.record(Call::BindFramebuffer(id));
    }

    fn framebuffer_texture(&self, attachment: u32, texture: u32) {
        self.record(Call::FramebufferTexture { attachment, texture });
    }

    fn framebuffer_status(&self) -> u32 {
        if self.incomplete_framebuffer {
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT
        } else {
            gl::FRAMEBUFFER_COMPLETE
        }
    }

    fn draw_buffers(&self, attachments: &[u32]) {
        self.record(Call::DrawBuffers(attachments.to_vec()));
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record(Call::Viewport { x, y, width, height });
    }

    fn get_string(&self, name: u32) -> Option<String> {
        match name {
            gl::SHADING_LANGUAGE_VERSION => self.glsl_version.map(String::from),
            gl::VERSION => self.gl_version.map(String::from),
            gl::VENDOR => Some("Fake Vendor".to_string()),
            gl::RENDERER => Some("Fake Renderer".to_string()),
            gl::EXTENSIONS => Some(self.extensions.join(" ")),
            _ => None,
        }
    }

    fn get_string_i(&self, name: u32, index: u32) -> Option<String> {
        if name != gl::EXTENSIONS {
            return None;
        }
        self.extensions.get(index as usize).map(|e| e.to_string())
    }

    fn get_integer(&self, name: u32) -> i32 {
        match name {
            gl::NUM_EXTENSIONS => self.extensions.len() as i32,
            _ => 0,
        }
    }

    fn get_error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        if state.errors.is_empty() {
            gl::NO_ERROR
        } else {
            state.errors.remove(0)
        }
    }
}
