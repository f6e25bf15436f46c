//! Compiling and linking shader programs from up to six stage sources.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gl;
use log::{error, info, warn};
use thiserror::Error;

use crate::capabilities::{GlInfo, ShaderSupport};
use crate::context::GlContext;

/// One kind of shader unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    /// Every stage, in the order the loader compiles them.
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Compute,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
            ShaderStage::Geometry => "geom",
            ShaderStage::TessControl => "tesc",
            ShaderStage::TessEvaluation => "tese",
            ShaderStage::Compute => "comp",
        }
    }

    pub fn gl_kind(self) -> u32 {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER,
            ShaderStage::TessControl => gl::TESS_CONTROL_SHADER,
            ShaderStage::TessEvaluation => gl::TESS_EVALUATION_SHADER,
            ShaderStage::Compute => gl::COMPUTE_SHADER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex",
            ShaderStage::Fragment => "Fragment",
            ShaderStage::Geometry => "Geometry",
            ShaderStage::TessControl => "Control",
            ShaderStage::TessEvaluation => "Evaluation",
            ShaderStage::Compute => "Compute",
        }
    }

    /// Lowest GLSL version (times 100) that has this stage.
    pub fn min_glsl_version(self) -> u32 {
        match self {
            ShaderStage::Vertex | ShaderStage::Fragment => 120,
            ShaderStage::Geometry => 150,
            ShaderStage::TessControl | ShaderStage::TessEvaluation => 400,
            ShaderStage::Compute => 430,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        ShaderStage::ALL.iter().copied().find(|s| s.extension() == extension)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// A program has to start from one of these.
    pub fn is_entry(self) -> bool {
        matches!(self, ShaderStage::Vertex | ShaderStage::Compute)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("unable to create a new shader program")]
    ProgramCreation,

    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("shader program failed to link:\n{log}")]
    Link { log: String },

    #[error("no vertex or compute shader available")]
    MissingEntryStage,

    #[error("error reading shader file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{} is not a recognised shader file", .0.display())]
    UnknownExtension(PathBuf),

    #[error("no shader files for {} found", .0.display())]
    NoShaderFiles(PathBuf),
}

impl ShaderError {
    /// The driver's diagnostic text, for compile and link failures.
    pub fn log(&self) -> Option<&str> {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log } => Some(log),
            _ => None,
        }
    }
}

/// Source text for each stage of one program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderSources {
    sources: [Option<String>; 6],
}

impl ShaderSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, stage: ShaderStage, source: impl Into<String>) -> Self {
        self.set(stage, source);
        self
    }

    /// Joins literal source lines, adding the newline to any line that lacks one.
    pub fn with_lines(mut self, stage: ShaderStage, lines: &[&str]) -> Self {
        let mut source = String::new();
        for line in lines {
            source.push_str(line);
            if !line.ends_with('\n') {
                source.push('\n');
            }
        }
        self.set(stage, source);
        self
    }

    pub fn set(&mut self, stage: ShaderStage, source: impl Into<String>) {
        self.sources[stage.index()] = Some(source.into());
    }

    pub fn get(&self, stage: ShaderStage) -> Option<&str> {
        self.sources[stage.index()].as_deref()
    }

    /// The stages that have a source, in compile order.
    pub fn stages(&self) -> Vec<ShaderStage> {
        ShaderStage::ALL.iter().copied().filter(|s| self.get(*s).is_some()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(Option::is_none)
    }
}

/// A linked program.
#[derive(Debug, PartialEq, Eq)]
pub struct ShaderProgram {
    id: u32,
    stages: Vec<ShaderStage>,
}

impl ShaderProgram {
    pub fn id(&self) -> u32 { self.id }

    /// The stages that were compiled into the program. Stages the driver couldn't handle are not
    /// listed.
    pub fn stages(&self) -> &[ShaderStage] { &self.stages }

    pub fn has_stage(&self, stage: ShaderStage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn use_program<G: GlContext + ?Sized>(&self, gl: &G) {
        gl.use_program(self.id);
    }

    pub fn delete<G: GlContext + ?Sized>(self, gl: &G) {
        gl.delete_program(self.id);
    }
}

pub fn load_from_sources<G: GlContext + ?Sized>(
    gl: &G,
    sources: &ShaderSources,
) -> Result<ShaderProgram, ShaderError> {
    load_from_sources_with(gl, sources, |_| {})
}

/// Like [`load_from_sources`], calling `before_link` with the program name once every stage is
/// attached and before the program is linked. That's the place for
/// `glBindFragDataLocation`, `glTransformFeedbackVaryings` and friends.
pub fn load_from_sources_with<G, F>(
    gl: &G,
    sources: &ShaderSources,
    before_link: F,
) -> Result<ShaderProgram, ShaderError>
where
    G: GlContext + ?Sized,
    F: FnOnce(u32),
{
    let program = gl.create_program();
    if program == 0 {
        error!("Unable to create new shader program");
        return Err(ShaderError::ProgramCreation);
    }
    info!("New shader program {} created", program);

    // Same judgement the samples see through ShaderSupport. A GLSL version we can't read skips
    // nothing; the driver still gets to refuse the shader object.
    let info = GlInfo::query(gl);
    let support = info.glsl_version.map(|version| (version, ShaderSupport::from_info(&info)));
    let mut attached: Vec<(ShaderStage, u32)> = Vec::new();

    for stage in ShaderStage::ALL.iter().copied() {
        let source = match sources.get(stage) {
            Some(source) => source,
            None => continue,
        };

        if let Some((version, support)) = &support {
            if !support.supports(stage) {
                warn!(
                    "  {} shader is not supported by the OpenGL driver (GLSL {} < {}, no extension); skipped",
                    stage, version, stage.min_glsl_version()
                );
                continue;
            }
        }

        let shader = gl.create_shader(stage.gl_kind());
        if shader == 0 {
            warn!("  {} shader could not be created; skipped", stage);
            continue;
        }
        info!("  {} shader {} created", stage, shader);

        gl.shader_source(shader, source);
        if !gl.compile_shader(shader) {
            let mut log = gl.shader_info_log(shader);
            if log.is_empty() {
                log = "(the driver returned no info log)".to_string();
            }
            error!("  Compiling {} shader {} failed\n{}", stage, shader, log);

            gl.delete_shader(shader);
            discard(gl, program, &attached);
            return Err(ShaderError::Compile { stage, log });
        }
        info!("  Compiling {} shader {} OK", stage, shader);

        gl.attach_shader(program, shader);
        info!("  Attaching {} to {} OK", shader, program);
        attached.push((stage, shader));
    }

    if !attached.iter().any(|(stage, _)| stage.is_entry()) {
        error!("No vertex or compute shader available");
        discard(gl, program, &attached);
        return Err(ShaderError::MissingEntryStage);
    }

    before_link(program);

    if !gl.link_program(program) {
        let mut log = gl.program_info_log(program);
        if log.is_empty() {
            log = "(the driver returned no info log)".to_string();
        }
        error!("Linking shader program {} failed\n{}", program, log);

        discard(gl, program, &attached);
        return Err(ShaderError::Link { log });
    }
    info!("Linking shader program {} OK", program);

    // The linked program keeps everything it needs
    release_stages(gl, program, &attached);

    Ok(ShaderProgram {
        id: program,
        stages: attached.into_iter().map(|(stage, _)| stage).collect(),
    })
}

fn release_stages<G: GlContext + ?Sized>(gl: &G, program: u32, attached: &[(ShaderStage, u32)]) {
    for (_, shader) in attached {
        gl.detach_shader(program, *shader);
        if gl.is_shader(*shader) {
            gl.delete_shader(*shader);
        }
    }
}

fn discard<G: GlContext + ?Sized>(gl: &G, program: u32, attached: &[(ShaderStage, u32)]) {
    release_stages(gl, program, attached);
    gl.delete_program(program);
}

/// Works out which stage a shader file belongs to.
///
/// A path with a recognised extension names its own stage. A path with no extension gets
/// `default_stage`'s extension appended. Anything else is an error.
pub fn resolve_shader_path(
    default_stage: Option<ShaderStage>,
    path: &Path,
) -> Result<(ShaderStage, PathBuf), ShaderError> {
    if path.extension().is_none() {
        return match default_stage {
            Some(stage) => Ok((stage, path.with_extension(stage.extension()))),
            None => Err(ShaderError::UnknownExtension(path.to_path_buf())),
        };
    }

    match ShaderStage::from_path(path) {
        Some(stage) => Ok((stage, path.to_path_buf())),
        None => Err(ShaderError::UnknownExtension(path.to_path_buf())),
    }
}

/// Reads the given shader files into a [`ShaderSources`].
///
/// Each entry pairs a path with the stage to assume when the path has no extension.
pub fn read_sources<P: AsRef<Path>>(
    files: &[(Option<ShaderStage>, P)],
) -> Result<ShaderSources, ShaderError> {
    let mut sources = ShaderSources::new();

    for (default_stage, path) in files {
        let (stage, path) = resolve_shader_path(*default_stage, path.as_ref())?;
        info!("Shader file: {} Reading ...", path.display());

        let text = fs::read_to_string(&path)
            .map_err(|source| ShaderError::Io { path: path.clone(), source })?;

        if sources.get(stage).is_some() {
            warn!("More than one {} shader given; using {}", stage, path.display());
        }
        sources.set(stage, text);
    }

    Ok(sources)
}

/// Loads a program from shader files. See [`read_sources`] for how each path is interpreted.
pub fn load_from_files<G: GlContext + ?Sized, P: AsRef<Path>>(
    gl: &G,
    files: &[(Option<ShaderStage>, P)],
) -> Result<ShaderProgram, ShaderError> {
    let sources = read_sources(files)?;
    load_from_sources(gl, &sources)
}

/// Finds the stage files that belong to `path`.
///
/// If `path` is a directory, the files are the ones inside it named after the directory:
/// `shaders/simple/simple.vert`, `shaders/simple/simple.frag`, ... Otherwise `path` is taken as
/// a base name and the files are its siblings with a stage extension: `shaders/simple` finds
/// `shaders/simple.vert` and friends.
pub fn find_stage_files(path: &Path) -> Result<Vec<PathBuf>, ShaderError> {
    let (dir, base) = if path.is_dir() {
        (path.to_path_buf(), path.file_name())
    } else {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        (parent, path.file_name())
    };

    let base = match base.and_then(|b| b.to_str()) {
        Some(base) => base.to_string(),
        None => return Err(ShaderError::NoShaderFiles(path.to_path_buf())),
    };

    let entries = fs::read_dir(&dir)
        .map_err(|source| ShaderError::Io { path: dir.clone(), source })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|file| file.is_file())
        .filter(|file| file.file_stem().and_then(|s| s.to_str()) == Some(base.as_str()))
        .filter(|file| ShaderStage::from_path(file).is_some())
        .collect();

    if files.is_empty() {
        return Err(ShaderError::NoShaderFiles(path.to_path_buf()));
    }

    files.sort_by_key(|file| ShaderStage::from_path(file));
    Ok(files)
}

/// Loads every stage file belonging to `path`; see [`find_stage_files`].
pub fn load_from_directory<G: GlContext + ?Sized>(
    gl: &G,
    path: impl AsRef<Path>,
) -> Result<ShaderProgram, ShaderError> {
    let files: Vec<(Option<ShaderStage>, PathBuf)> = find_stage_files(path.as_ref())?
        .into_iter()
        .map(|file| (None, file))
        .collect();

    load_from_files(gl, &files)
}
