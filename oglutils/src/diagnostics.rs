//! Reading and naming OpenGL error and debug-message codes.

use std::fmt;

use gl;
use log::warn;

use crate::context::GlContext;

/// A value reported by `glGetError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlErrorKind {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    StackUnderflow,
    StackOverflow,
    Unknown(u32),
}

impl GlErrorKind {
    /// `None` for `GL_NO_ERROR`.
    pub fn from_code(code: u32) -> Option<Self> {
        let kind = match code {
            gl::NO_ERROR => return None,
            gl::INVALID_ENUM => GlErrorKind::InvalidEnum,
            gl::INVALID_VALUE => GlErrorKind::InvalidValue,
            gl::INVALID_OPERATION => GlErrorKind::InvalidOperation,
            gl::INVALID_FRAMEBUFFER_OPERATION => GlErrorKind::InvalidFramebufferOperation,
            gl::OUT_OF_MEMORY => GlErrorKind::OutOfMemory,
            gl::STACK_UNDERFLOW => GlErrorKind::StackUnderflow,
            gl::STACK_OVERFLOW => GlErrorKind::StackOverflow,
            other => GlErrorKind::Unknown(other),
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            GlErrorKind::InvalidEnum => "GL_INVALID_ENUM",
            GlErrorKind::InvalidValue => "GL_INVALID_VALUE",
            GlErrorKind::InvalidOperation => "GL_INVALID_OPERATION",
            GlErrorKind::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            GlErrorKind::OutOfMemory => "GL_OUT_OF_MEMORY",
            GlErrorKind::StackUnderflow => "GL_STACK_UNDERFLOW",
            GlErrorKind::StackOverflow => "GL_STACK_OVERFLOW",
            GlErrorKind::Unknown(_) => "GL_UNKNOWN_ERROR",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GlErrorKind::InvalidEnum =>
                "An unacceptable value is specified for an enumerated argument. The offending command is ignored.",
            GlErrorKind::InvalidValue =>
                "A numeric argument is out of range. The offending command is ignored.",
            GlErrorKind::InvalidOperation =>
                "The specified operation is not allowed in the current state. The offending command is ignored.",
            GlErrorKind::InvalidFramebufferOperation =>
                "The framebuffer object is not complete. The offending command is ignored.",
            GlErrorKind::OutOfMemory =>
                "There is not enough memory left to execute the command. The state of the GL is undefined.",
            GlErrorKind::StackUnderflow =>
                "An operation would have caused an internal stack to underflow.",
            GlErrorKind::StackOverflow =>
                "An operation would have caused an internal stack to overflow.",
            GlErrorKind::Unknown(_) => "The driver reported an error code this library doesn't know.",
        }
    }
}

impl fmt::Display for GlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlErrorKind::Unknown(code) => write!(f, "{} (0x{:04X})", self.name(), code),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Upper bound on how many queued errors one check will drain. A lost context can report
/// errors forever.
const MAX_DRAINED_ERRORS: usize = 64;

/// Drains the error queue, logging each error prefixed with `context`, and returns what was found.
pub fn check_gl_error<G: GlContext + ?Sized>(gl: &G, context: &str) -> Vec<GlErrorKind> {
    let errors = drain(gl);
    for error in &errors {
        warn!("{} GL error: {}: {}", context, error, error.description());
    }
    errors
}

/// Drains the error queue without reporting anything.
pub fn clear_gl_errors<G: GlContext + ?Sized>(gl: &G) {
    drain(gl);
}

fn drain<G: GlContext + ?Sized>(gl: &G) -> Vec<GlErrorKind> {
    let mut errors = Vec::new();
    while errors.len() < MAX_DRAINED_ERRORS {
        match GlErrorKind::from_code(gl.get_error()) {
            Some(error) => errors.push(error),
            None => break,
        }
    }
    errors
}

pub fn debug_source_name(code: u32) -> &'static str {
    match code {
        gl::DEBUG_SOURCE_API => "GL_DEBUG_SOURCE_API",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "GL_DEBUG_SOURCE_WINDOW_SYSTEM",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "GL_DEBUG_SOURCE_SHADER_COMPILER",
        gl::DEBUG_SOURCE_THIRD_PARTY => "GL_DEBUG_SOURCE_THIRD_PARTY",
        gl::DEBUG_SOURCE_APPLICATION => "GL_DEBUG_SOURCE_APPLICATION",
        gl::DEBUG_SOURCE_OTHER => "GL_DEBUG_SOURCE_OTHER",
        _ => "GL_DEBUG_SOURCE_UNKNOWN",
    }
}

pub fn debug_type_name(code: u32) -> &'static str {
    match code {
        gl::DEBUG_TYPE_ERROR => "GL_DEBUG_TYPE_ERROR",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "GL_DEBUG_TYPE_DEPRECATED_BEHAVIOR",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "GL_DEBUG_TYPE_UNDEFINED_BEHAVIOR",
        gl::DEBUG_TYPE_PORTABILITY => "GL_DEBUG_TYPE_PORTABILITY",
        gl::DEBUG_TYPE_PERFORMANCE => "GL_DEBUG_TYPE_PERFORMANCE",
        gl::DEBUG_TYPE_OTHER => "GL_DEBUG_TYPE_OTHER",
        gl::DEBUG_TYPE_MARKER => "GL_DEBUG_TYPE_MARKER",
        gl::DEBUG_TYPE_PUSH_GROUP => "GL_DEBUG_TYPE_PUSH_GROUP",
        gl::DEBUG_TYPE_POP_GROUP => "GL_DEBUG_TYPE_POP_GROUP",
        _ => "GL_DEBUG_TYPE_UNKNOWN",
    }
}

pub fn debug_severity_name(code: u32) -> &'static str {
    match code {
        gl::DEBUG_SEVERITY_HIGH => "GL_DEBUG_SEVERITY_HIGH",
        gl::DEBUG_SEVERITY_MEDIUM => "GL_DEBUG_SEVERITY_MEDIUM",
        gl::DEBUG_SEVERITY_LOW => "GL_DEBUG_SEVERITY_LOW",
        gl::DEBUG_SEVERITY_NOTIFICATION => "GL_DEBUG_SEVERITY_NOTIFICATION",
        _ => "GL_DEBUG_SEVERITY_UNKNOWN",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fake::FakeGl;

    #[test]
    fn queued_errors_are_drained_in_order() {
        let gl = FakeGl::new();
        gl.push_error(gl::INVALID_ENUM);
        gl.push_error(gl::OUT_OF_MEMORY);
        gl.push_error(0x1234);

        let errors = check_gl_error(&gl, "after draw");

        assert_eq!(errors, vec![
            GlErrorKind::InvalidEnum,
            GlErrorKind::OutOfMemory,
            GlErrorKind::Unknown(0x1234),
        ]);
        assert!(check_gl_error(&gl, "again").is_empty());
    }

    #[test]
    fn no_error_is_not_an_error() {
        assert_eq!(GlErrorKind::from_code(gl::NO_ERROR), None);
        assert_eq!(GlErrorKind::Unknown(0x1234).to_string(), "GL_UNKNOWN_ERROR (0x1234)");
    }

    #[test]
    fn debug_codes_have_names() {
        assert_eq!(debug_source_name(0x8248), "GL_DEBUG_SOURCE_SHADER_COMPILER");
        assert_eq!(debug_type_name(0x824C), "GL_DEBUG_TYPE_ERROR");
        assert_eq!(debug_severity_name(0x9146), "GL_DEBUG_SEVERITY_HIGH");
        assert_eq!(debug_severity_name(1), "GL_DEBUG_SEVERITY_UNKNOWN");
    }
}
