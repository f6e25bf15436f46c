//! The seam between this crate and the OpenGL driver.

use std::ffi::{c_void, CStr, CString};
use std::mem::size_of;
use std::os::raw::c_char;
use std::ptr::{null, null_mut};

use gl;
use gl::types::*;

/// The OpenGL entry points used by the geometry buffers, the shader loader and the capability
/// queries.
///
/// Object names are plain `u32`s, exactly as the driver hands them out. Attribute locations are
/// `i32` because the driver reports "no such attribute" as `-1`.
pub trait GlContext {
    fn gen_buffer(&self) -> u32;
    fn delete_buffer(&self, id: u32);
    fn bind_array_buffer(&self, id: u32);
    fn bind_element_buffer(&self, id: u32);

    /// Binds `id` as the array buffer and uploads `data` with `STATIC_DRAW` usage.
    fn array_buffer_data(&self, id: u32, data: &[f32]);

    /// Binds `id` as the element buffer and uploads `data` with `STATIC_DRAW` usage.
    fn element_buffer_data(&self, id: u32, data: &[u32]);

    fn attrib_location(&self, program: u32, name: &str) -> i32;
    fn enable_vertex_attrib(&self, location: u32);
    fn disable_vertex_attrib(&self, location: u32);

    /// Describes a float attribute. `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer(&self, location: u32, size: i32, normalize: bool, stride: usize, offset: usize);

    fn use_program(&self, program: u32);
    fn draw_arrays(&self, mode: u32, first: usize, count: usize);

    /// Draws `count` unsigned-int indices from the bound element buffer, starting `byte_offset`
    /// bytes into it.
    fn draw_elements(&self, mode: u32, count: usize, byte_offset: usize);

    fn create_shader(&self, kind: u32) -> u32;
    fn shader_source(&self, shader: u32, source: &str);

    /// Compiles the shader and reports `GL_COMPILE_STATUS`.
    fn compile_shader(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn is_shader(&self, shader: u32) -> bool;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> u32;
    fn attach_shader(&self, program: u32, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);

    /// Links the program and reports `GL_LINK_STATUS`.
    fn link_program(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn delete_program(&self, program: u32);

    fn uniform_location(&self, program: u32, name: &str) -> i32;

    /// Sets an `int`/`sampler` uniform of the program in use.
    fn uniform_i32(&self, location: i32, value: i32);

    fn gen_texture(&self) -> u32;
    fn delete_texture(&self, id: u32);

    /// Binds `id` as the 2D texture and allocates level 0, filling it from `data` when given.
    /// Wrapping is clamped to the edge and filtering is linear.
    fn texture_image_2d(&self, id: u32, format: TextureFormat, width: u32, height: u32, data: Option<&[u8]>);

    /// Makes texture unit `slot` active and binds `id` to it.
    fn bind_texture_unit(&self, slot: u32, id: u32);

    fn gen_framebuffer(&self) -> u32;
    fn delete_framebuffer(&self, id: u32);

    /// Binds `id` as the draw and read framebuffer. 0 is the window.
    fn bind_framebuffer(&self, id: u32);

    /// Attaches level 0 of a 2D texture to the bound framebuffer.
    fn framebuffer_texture(&self, attachment: u32, texture: u32);

    /// `glCheckFramebufferStatus` for the bound framebuffer.
    fn framebuffer_status(&self) -> u32;
    fn draw_buffers(&self, attachments: &[u32]);
    fn viewport(&self, x: i32, y: i32, width: u32, height: u32);

    fn get_string(&self, name: u32) -> Option<String>;
    fn get_string_i(&self, name: u32, index: u32) -> Option<String>;
    fn get_integer(&self, name: u32) -> i32;
    fn get_error(&self) -> u32;
}

/// Storage layout of a texture: internal format plus the format and type of the pixels handed to
/// the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFormat {
    pub internal_format: u32,
    pub pixel_format: u32,
    pub pixel_type: u32,
}

impl TextureFormat {
    /// Eight-bit RGBA, as decoded image files are uploaded.
    pub const RGBA8: TextureFormat = TextureFormat {
        internal_format: gl::RGBA8,
        pixel_format: gl::RGBA,
        pixel_type: gl::UNSIGNED_BYTE,
    };

    /// Float RGBA, for render target colour buffers.
    pub const RGBA32F: TextureFormat = TextureFormat {
        internal_format: gl::RGBA32F,
        pixel_format: gl::RGBA,
        pixel_type: gl::FLOAT,
    };

    pub const DEPTH: TextureFormat = TextureFormat {
        internal_format: gl::DEPTH_COMPONENT,
        pixel_format: gl::DEPTH_COMPONENT,
        pixel_type: gl::FLOAT,
    };

    /// Bytes per pixel of the data passed with this format.
    pub fn pixel_size(self) -> usize {
        let channels = match self.pixel_format {
            gl::DEPTH_COMPONENT | gl::RED => 1,
            gl::RG => 2,
            gl::RGB => 3,
            _ => 4,
        };
        let size = match self.pixel_type {
            gl::FLOAT => size_of::<f32>(),
            _ => 1,
        };
        channels * size
    }
}

/// Forwards every call to the globally loaded OpenGL function pointers.
///
/// The value carries no state; what makes it valid is that `gl::load_with` has been called and
/// the calling thread has a current context. Use it from that thread only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeGl;

impl GlContext for NativeGl {
    fn gen_buffer(&self) -> u32 {
        let mut id = 0u32;
        unsafe { gl::GenBuffers(1, &mut id) };
        id
    }

    fn delete_buffer(&self, id: u32) {
        unsafe { gl::DeleteBuffers(1, &id) };
    }

    fn bind_array_buffer(&self, id: u32) {
        unsafe { gl::BindBuffer(gl::ARRAY_BUFFER, id) };
    }

    fn bind_element_buffer(&self, id: u32) {
        unsafe { gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id) };
    }

    fn array_buffer_data(&self, id: u32, data: &[f32]) {
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, id);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (data.len() * size_of::<f32>()) as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn element_buffer_data(&self, id: u32, data: &[u32]) {
        unsafe {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                (data.len() * size_of::<u32>()) as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn attrib_location(&self, program: u32, name: &str) -> i32 {
        // A name with an interior NUL can't be a GLSL identifier anyway
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetAttribLocation(program, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        unsafe { gl::EnableVertexAttribArray(location) };
    }

    fn disable_vertex_attrib(&self, location: u32) {
        unsafe { gl::DisableVertexAttribArray(location) };
    }

    fn vertex_attrib_pointer(&self, location: u32, size: i32, normalize: bool, stride: usize, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                location,
                size,
                gl::FLOAT,
                if normalize { gl::TRUE } else { gl::FALSE },
                stride as GLsizei,
                offset as *const c_void,
            );
        }
    }

    fn use_program(&self, program: u32) {
        unsafe { gl::UseProgram(program) };
    }

    fn draw_arrays(&self, mode: u32, first: usize, count: usize) {
        unsafe { gl::DrawArrays(mode, first as GLint, count as GLsizei) };
    }

    fn draw_elements(&self, mode: u32, count: usize, byte_offset: usize) {
        unsafe {
            gl::DrawElements(mode, count as GLsizei, gl::UNSIGNED_INT, byte_offset as *const c_void);
        }
    }

    fn create_shader(&self, kind: u32) -> u32 {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: u32, source: &str) {
        // Passing an explicit length means the source doesn't need a trailing NUL
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) };
    }

    fn compile_shader(&self, shader: u32) -> bool {
        let mut success = 0;
        unsafe {
            gl::CompileShader(shader);
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        }
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let mut len = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };
        if len <= 0 {
            return String::new();
        }

        let log = whitespace_cstring(len as usize);
        unsafe { gl::GetShaderInfoLog(shader, len, null_mut(), log.as_ptr() as *mut GLchar) };
        trim_info_log(log)
    }

    fn is_shader(&self, shader: u32) -> bool {
        unsafe { gl::IsShader(shader) == gl::TRUE }
    }

    fn delete_shader(&self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&self, program: u32) -> bool {
        let mut success = 0;
        unsafe {
            gl::LinkProgram(program);
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: u32) -> String {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };
        if len <= 0 {
            return String::new();
        }

        let log = whitespace_cstring(len as usize);
        unsafe { gl::GetProgramInfoLog(program, len, null_mut(), log.as_ptr() as *mut GLchar) };
        trim_info_log(log)
    }

    fn delete_program(&self, program: u32) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn uniform_i32(&self, location: i32, value: i32) {
        unsafe { gl::Uniform1i(location, value) };
    }

    fn gen_texture(&self) -> u32 {
        let mut id = 0u32;
        unsafe { gl::GenTextures(1, &mut id) };
        id
    }

    fn delete_texture(&self, id: u32) {
        unsafe { gl::DeleteTextures(1, &id) };
    }

    fn texture_image_2d(&self, id: u32, format: TextureFormat, width: u32, height: u32, data: Option<&[u8]>) {
        let pixels = data.map_or(null(), |d| d.as_ptr() as *const c_void);
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, id);
            // Rows of RGB8 data aren't necessarily 4-byte aligned
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                format.internal_format as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                format.pixel_format,
                format.pixel_type,
                pixels,
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
        }
    }

    fn bind_texture_unit(&self, slot: u32, id: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + slot);
            gl::BindTexture(gl::TEXTURE_2D, id);
        }
    }

    fn gen_framebuffer(&self) -> u32 {
        let mut id = 0u32;
        unsafe { gl::GenFramebuffers(1, &mut id) };
        id
    }

    fn delete_framebuffer(&self, id: u32) {
        unsafe { gl::DeleteFramebuffers(1, &id) };
    }

    fn bind_framebuffer(&self, id: u32) {
        unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, id) };
    }

    fn framebuffer_texture(&self, attachment: u32, texture: u32) {
        unsafe { gl::FramebufferTexture2D(gl::FRAMEBUFFER, attachment, gl::TEXTURE_2D, texture, 0) };
    }

    fn framebuffer_status(&self) -> u32 {
        unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) }
    }

    fn draw_buffers(&self, attachments: &[u32]) {
        unsafe { gl::DrawBuffers(attachments.len() as GLsizei, attachments.as_ptr()) };
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { gl::Viewport(x, y, width as GLsizei, height as GLsizei) };
    }

    fn get_string(&self, name: u32) -> Option<String> {
        let ptr = unsafe { gl::GetString(name) };
        string_from_gl(ptr)
    }

    fn get_string_i(&self, name: u32, index: u32) -> Option<String> {
        let ptr = unsafe { gl::GetStringi(name, index) };
        string_from_gl(ptr)
    }

    fn get_integer(&self, name: u32) -> i32 {
        let mut value = 0;
        unsafe { gl::GetIntegerv(name, &mut value) };
        value
    }

    fn get_error(&self) -> u32 {
        unsafe { gl::GetError() }
    }
}

/// A `CString` of `len` spaces, used as the destination buffer for info logs.
fn whitespace_cstring(len: usize) -> CString {
    let mut buf: Vec<u8> = Vec::with_capacity(len + 1);
    buf.extend([b' '].iter().cycle().take(len));
    unsafe { CString::from_vec_unchecked(buf) }
}

/// The driver writes a NUL-terminated log into the buffer; keep what comes before it.
fn trim_info_log(log: CString) -> String {
    let bytes = log.into_bytes();
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

fn string_from_gl(ptr: *const GLubyte) -> Option<String> {
    if ptr.is_null() {
        return None;
    }

    let text = unsafe { CStr::from_ptr(ptr as *const c_char) };
    Some(text.to_string_lossy().into_owned())
}
