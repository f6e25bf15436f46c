//! The sample programs and the table the command line picks them from.

pub mod compute;
pub mod geometry;
pub mod multiple;
pub mod strip;
pub mod swap;
pub mod target;

use crate::renderer::Renderer;

pub struct DemoEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub create: fn() -> Box<dyn Renderer>,
}

lazy_static! {
    pub static ref DEMOS: Vec<DemoEntry> = vec![
        DemoEntry {
            name: "multiple",
            description: "Two geometries drawn with two shader programs; one is fed by two vertex buffers",
            create: || Box::new(multiple::Multiple::default()),
        },
        DemoEntry {
            name: "strip",
            description: "Triangle lists and strips, ranges, index buffers and primitive restart",
            create: || Box::new(strip::Strip::default()),
        },
        DemoEntry {
            name: "geometry",
            description: "A geometry shader expanding a line strip with adjacency; click to add points",
            create: || Box::new(geometry::GeometryShader::default()),
        },
        DemoEntry {
            name: "compute",
            description: "A compute shader writes an image that a textured triangle then samples",
            create: || Box::new(compute::ComputeImage::default()),
        },
        DemoEntry {
            name: "swap",
            description: "One geometry drawn with two programs that use different attributes",
            create: || Box::new(swap::SwapPrograms::default()),
        },
        DemoEntry {
            name: "target",
            description: "A textured quad rendered into a framebuffer, then post-processed onto the window",
            create: || Box::new(target::RenderToTexture::default()),
        },
    ];
}

pub fn find(name: &str) -> Option<&'static DemoEntry> {
    DEMOS.iter().find(|demo| demo.name.eq_ignore_ascii_case(name))
}

/// Sets the viewport to the whole window and clears colour and depth.
pub(crate) fn begin_frame(width: u32, height: u32, color: [f32; 3]) {
    unsafe { gl::Viewport(0, 0, width as i32, height as i32) };
    clear(color);
}

/// Clears colour and depth of whatever framebuffer is bound.
pub(crate) fn clear(color: [f32; 3]) {
    unsafe {
        gl::ClearColor(color[0], color[1], color[2], 1.0);
        gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
    }
}

pub(crate) fn polygon_mode(wireframe: bool) {
    let mode = if wireframe { gl::LINE } else { gl::FILL };
    unsafe { gl::PolygonMode(gl::FRONT_AND_BACK, mode) }
}
