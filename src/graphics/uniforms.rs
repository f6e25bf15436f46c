use std::ffi::CString;

use glam::Mat4;

/// Location of `name` in `program`, or -1 if the program has no such active uniform. Setting a
/// value at -1 is a no-op in GL, so callers don't have to check.
pub fn uniform_location(program: u32, name: &str) -> i32 {
    match CString::new(name) {
        Ok(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
        Err(_) => {
            warn!("Uniform name {:?} contains a NUL byte", name);
            -1
        }
    }
}

// The setters act on the program currently in use.

pub fn set_f32(location: i32, value: f32) {
    unsafe { gl::Uniform1f(location, value) }
}

pub fn set_i32(location: i32, value: i32) {
    unsafe { gl::Uniform1i(location, value) }
}

pub fn set_mat4(location: i32, value: &Mat4) {
    let columns = value.to_cols_array();
    unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, columns.as_ptr()) }
}
