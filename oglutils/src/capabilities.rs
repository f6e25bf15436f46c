//! What the current driver says about itself: vendor, versions, extensions, and from those, which
//! optional shader stages are worth asking for.

use std::fmt;

use gl;
use log::{info, warn};

use crate::context::GlContext;
use crate::shaders::ShaderStage;

/// Reads a GLSL version string such as `"4.60 NVIDIA"` or `"OpenGL ES GLSL ES 3.00"` as a number
/// in the form used by `#version`: 460, 300, ...
pub fn parse_glsl_version(version: &str) -> Option<u32> {
    let (major, minor) = version_numbers(version)?;
    Some(major * 100 + minor)
}

/// Reads an OpenGL version string such as `"3.3.0 Mesa 23.1"` as 330, `"4.6.0 NVIDIA"` as 460.
pub fn parse_gl_version(version: &str) -> Option<u32> {
    let (major, minor) = version_numbers(version)?;
    Some(major * 100 + minor * 10)
}

/// The first `major.minor` pair in the string. The minor part is read as written, so "4.60" is
/// (4, 60) and "3.3" is (3, 3).
fn version_numbers(version: &str) -> Option<(u32, u32)> {
    let token = version.split_whitespace()
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()) && t.contains('.'))?;

    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor: String = parts.next()?.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some((major, minor.parse().ok()?))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub glsl_version_string: String,
    pub gl_version: Option<u32>,
    pub glsl_version: Option<u32>,
    pub extensions: Vec<String>,
}

impl GlInfo {
    pub fn query<G: GlContext + ?Sized>(gl: &G) -> Self {
        let version = gl.get_string(gl::VERSION).unwrap_or_default();
        let glsl_version_string = gl.get_string(gl::SHADING_LANGUAGE_VERSION).unwrap_or_default();

        Self {
            vendor: gl.get_string(gl::VENDOR).unwrap_or_default(),
            renderer: gl.get_string(gl::RENDERER).unwrap_or_default(),
            gl_version: parse_gl_version(&version),
            glsl_version: parse_glsl_version(&glsl_version_string),
            extensions: query_extensions(gl),
            version,
            glsl_version_string,
        }
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e == name)
    }

    /// Logs everything the sample runner prints on start-up.
    pub fn log_parameters(&self) {
        info!("GL vendor: {}", self.vendor);
        info!("GL renderer: {}", self.renderer);
        info!("GL version: {}", self.version);
        info!(
            "GL shading language version: {} (#version {})",
            self.glsl_version_string,
            self.glsl_version.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
        );
        info!("GL extensions: {}", self.extensions.join(" "));
    }
}

/// Core profiles list extensions one at a time; older contexts only have the long string.
fn query_extensions<G: GlContext + ?Sized>(gl: &G) -> Vec<String> {
    let count = gl.get_integer(gl::NUM_EXTENSIONS);
    if count > 0 {
        let extensions: Vec<String> = (0..count as u32)
            .filter_map(|i| gl.get_string_i(gl::EXTENSIONS, i))
            .collect();
        // GetStringi doesn't exist before 3.0, and GetError would have told us so
        if !extensions.is_empty() {
            return extensions;
        }
    }

    gl.get_string(gl::EXTENSIONS)
        .map(|all| all.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

/// Which of the optional shader stages the driver can compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSupport {
    pub geometry: bool,
    pub tessellation: bool,
    pub compute: bool,
}

impl ShaderSupport {
    /// A stage is available if the GLSL version is new enough or the driver exposes the matching
    /// `*_shader` extension.
    pub fn from_info(info: &GlInfo) -> Self {
        let version = info.glsl_version.unwrap_or(0);
        let by_extension = |needle: &str| info.extensions.iter().any(|e| e.contains(needle));

        Self {
            geometry: version >= ShaderStage::Geometry.min_glsl_version() || by_extension("geometry_shader"),
            tessellation: version >= ShaderStage::TessControl.min_glsl_version() || by_extension("tessellation_shader"),
            compute: version >= ShaderStage::Compute.min_glsl_version() || by_extension("compute_shader"),
        }
    }

    pub fn supports(&self, stage: ShaderStage) -> bool {
        match stage {
            ShaderStage::Vertex | ShaderStage::Fragment => true,
            ShaderStage::Geometry => self.geometry,
            ShaderStage::TessControl | ShaderStage::TessEvaluation => self.tessellation,
            ShaderStage::Compute => self.compute,
        }
    }

    /// Logs the supported stages, warning about the ones that are missing.
    pub fn log_summary(&self, info: &GlInfo) {
        info!("This OpenGL ({}) supports: {}", info.glsl_version_string, self);

        for stage in ShaderStage::ALL.iter().copied() {
            if !self.supports(stage) {
                warn!("{} shaders are not available on this driver", stage);
            }
        }
    }
}

impl fmt::Display for ShaderSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex and fragment shader")?;
        if self.geometry {
            write!(f, ", geometry shader")?;
        }
        if self.tessellation {
            write!(f, ", tessellation")?;
        }
        if self.compute {
            write!(f, ", compute shader")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fake::FakeGl;

    #[test]
    fn glsl_versions_parse() {
        assert_eq!(parse_glsl_version("4.60 NVIDIA"), Some(460));
        assert_eq!(parse_glsl_version("1.20"), Some(120));
        assert_eq!(parse_glsl_version("OpenGL ES GLSL ES 3.00"), Some(300));
        assert_eq!(parse_glsl_version("4.50 - Build 31.0.101.2111"), Some(450));
        assert_eq!(parse_glsl_version("unknown"), None);
    }

    #[test]
    fn gl_versions_parse() {
        assert_eq!(parse_gl_version("3.3.0 Mesa 23.1.4"), Some(330));
        assert_eq!(parse_gl_version("4.6.0 NVIDIA 535.104.05"), Some(460));
        assert_eq!(parse_gl_version("OpenGL ES 3.2 Mesa 22.0"), Some(320));
        assert_eq!(parse_gl_version(""), None);
    }

    #[test]
    fn info_is_read_from_the_driver() {
        let gl = FakeGl::new();

        let info = GlInfo::query(&gl);

        assert_eq!(info.vendor, "Fake Vendor");
        assert_eq!(info.gl_version, Some(460));
        assert_eq!(info.glsl_version, Some(460));
        assert!(info.has_extension("GL_ARB_enhanced_layouts"));
        assert_eq!(info.extensions.len(), 2);
    }

    #[test]
    fn support_follows_the_glsl_version() {
        let gl = FakeGl::new().with_glsl_version("3.30");
        let support = ShaderSupport::from_info(&GlInfo::query(&gl));

        assert!(support.supports(ShaderStage::Geometry));
        assert!(!support.supports(ShaderStage::TessEvaluation));
        assert!(!support.supports(ShaderStage::Compute));
        assert_eq!(support.to_string(), "vertex and fragment shader, geometry shader");
    }

    #[test]
    fn extensions_can_provide_a_stage() {
        let mut gl = FakeGl::new().with_glsl_version("3.30");
        gl.extensions.push("GL_ARB_compute_shader");

        let support = ShaderSupport::from_info(&GlInfo::query(&gl));

        assert!(support.compute);
        assert!(!support.tessellation);
    }
}
