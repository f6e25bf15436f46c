pub mod texture;
pub mod uniforms;
