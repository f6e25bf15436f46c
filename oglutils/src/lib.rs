//! Small utilities shared by the OpenGL samples. Nothing here creates a window or owns a context.

pub mod buffers;
pub mod camera;
pub mod capabilities;
pub mod context;
pub mod diagnostics;
pub mod render_target;
pub mod shaders;
pub mod texture;

#[cfg(test)]
pub(crate) mod fake;

pub use buffers::{GeometryBuffer, Topology, VertexAttribute, VertexBufferBinding};
pub use camera::Camera;
pub use context::{GlContext, NativeGl, TextureFormat};
pub use render_target::RenderTarget;
pub use shaders::{ShaderError, ShaderProgram, ShaderSources, ShaderStage};
pub use texture::{Texture2D, TextureError};
