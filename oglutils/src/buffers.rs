//! Vertex and index buffers for a piece of geometry. Attributes are matched to shader inputs by
//! name on every draw.

use std::fmt;
use std::mem::size_of;

use gl;
use log::{debug, error, warn};

use crate::context::GlContext;

const FLOAT_SIZE: usize = size_of::<f32>();
const INDEX_SIZE: usize = size_of::<u32>();

/// One named input channel of a vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    name: String,
    dimension: usize,
    normalize: bool,
    offset: Option<usize>,
}

impl VertexAttribute {
    /// An attribute of `dimension` floats, matched against the shader input called `name`.
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        let name = name.into();
        if dimension == 0 || dimension > 4 {
            warn!("Attribute {} has {} components; OpenGL accepts 1 to 4", name, dimension);
        }

        Self { name, dimension, normalize: false, offset: None }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Places the attribute `floats` floats into the vertex instead of right after the previous
    /// attribute.
    pub fn with_offset_in_floats(mut self, floats: usize) -> Self {
        self.offset = Some(floats * FLOAT_SIZE);
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn dimension(&self) -> usize { self.dimension }
    pub fn is_normalized(&self) -> bool { self.normalize }

    /// Explicit byte offset within the vertex, if one was given.
    pub fn offset(&self) -> Option<usize> { self.offset }
}

impl fmt::Display for VertexAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} float(s)", self.name, self.dimension)?;
        if self.normalize {
            write!(f, ", normalized")?;
        }
        if let Some(offset) = self.offset {
            write!(f, ", at byte {}", offset)?;
        }
        Ok(())
    }
}

/// Primitive assembly mode for a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    LineStripAdjacency,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Patches,
}

impl Topology {
    pub fn gl_mode(self) -> u32 {
        match self {
            Topology::Points => gl::POINTS,
            Topology::Lines => gl::LINES,
            Topology::LineStrip => gl::LINE_STRIP,
            Topology::LineLoop => gl::LINE_LOOP,
            Topology::LineStripAdjacency => gl::LINE_STRIP_ADJACENCY,
            Topology::Triangles => gl::TRIANGLES,
            Topology::TriangleStrip => gl::TRIANGLE_STRIP,
            Topology::TriangleFan => gl::TRIANGLE_FAN,
            Topology::Patches => gl::PATCHES,
        }
    }
}

/// A single GPU buffer of interleaved vertex data.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferBinding {
    id: u32,
    stride: usize,
    attributes: Vec<VertexAttribute>,
}

impl VertexBufferBinding {
    pub fn id(&self) -> u32 { self.id }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> usize { self.stride }
    pub fn attributes(&self) -> &[VertexAttribute] { &self.attributes }

    /// Byte offset of each attribute within a vertex: the explicit offset if there is one,
    /// otherwise the sum of the sizes of the attributes declared before it.
    pub fn offsets(&self) -> Vec<usize> {
        let mut running = 0;
        self.attributes.iter()
            .map(|attribute| {
                let offset = attribute.offset.unwrap_or(running);
                running += attribute.dimension * FLOAT_SIZE;
                offset
            })
            .collect()
    }
}

impl fmt::Display for VertexBufferBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexBuffer {} (stride {} bytes)", self.id, self.stride)?;
        for attribute in &self.attributes {
            write!(f, "\n\t\t{}", attribute)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuffer {
    id: u32,
    count: usize,
}

impl IndexBuffer {
    pub fn id(&self) -> u32 { self.id }
    pub fn count(&self) -> usize { self.count }
}

/// Vertex buffers and an optional index buffer for one piece of geometry.
#[derive(Debug, Default)]
pub struct GeometryBuffer {
    vertex_buffers: Vec<VertexBufferBinding>,
    index_buffer: Option<IndexBuffer>,
    vertex_count: usize,
}

impl GeometryBuffer {
    /// Uploads `vertex_data` as the first vertex buffer and `index_data`, if any, as `u32`
    /// indices.
    ///
    /// When `floats_per_vertex` is `None` it's the sum of the attribute dimensions, which is right
    /// for tightly packed data. Pass it explicitly when the vertex has padding or attributes with
    /// explicit offsets.
    pub fn new<G: GlContext + ?Sized>(
        gl: &G,
        vertex_data: &[f32],
        floats_per_vertex: Option<usize>,
        attributes: Vec<VertexAttribute>,
        index_data: Option<&[u32]>,
    ) -> Self {
        let mut geometry = Self::default();
        geometry.add_vertex_buffer(gl, vertex_data, attributes, floats_per_vertex);
        if let Some(indices) = index_data {
            geometry.set_index_buffer(gl, indices);
        }

        geometry
    }

    /// Appends another interleaved buffer that feeds the same draw call, e.g. colours kept apart
    /// from positions.
    ///
    /// Every buffer is expected to hold the same number of vertices. A mismatch is logged and the
    /// first buffer's count stays authoritative.
    pub fn add_vertex_buffer<G: GlContext + ?Sized>(
        &mut self,
        gl: &G,
        data: &[f32],
        attributes: Vec<VertexAttribute>,
        floats_per_vertex: Option<usize>,
    ) {
        if attributes.is_empty() {
            warn!("Vertex buffer without attributes ignored");
            return;
        }

        let floats_per_vertex = floats_per_vertex
            .unwrap_or_else(|| attributes.iter().map(VertexAttribute::dimension).sum());
        if floats_per_vertex == 0 {
            warn!("Vertex buffer with zero floats per vertex ignored");
            return;
        }

        let id = gl.gen_buffer();
        if id == 0 {
            error!("Unable to create a vertex buffer; {} floats not uploaded", data.len());
            return;
        }
        gl.array_buffer_data(id, data);

        if data.len() % floats_per_vertex != 0 {
            warn!(
                "The total number of floats ({}) is incongruent with the number of floats per vertex ({})",
                data.len(), floats_per_vertex
            );
        }

        let vertex_count = data.len() / floats_per_vertex;
        if self.vertex_buffers.is_empty() {
            self.vertex_count = vertex_count;
        } else if self.vertex_count != vertex_count {
            warn!(
                "Vertex buffer {} holds {} vertices but the first one holds {}",
                id, vertex_count, self.vertex_count
            );
        }

        self.vertex_buffers.push(VertexBufferBinding {
            id,
            stride: floats_per_vertex * FLOAT_SIZE,
            attributes,
        });
    }

    /// Uploads `indices` as they are, so a primitive-restart marker such as `65535` reaches the
    /// GPU untouched. Replaces any previous index buffer.
    pub fn set_index_buffer<G: GlContext + ?Sized>(&mut self, gl: &G, indices: &[u32]) {
        if let Some(old) = self.index_buffer.take() {
            gl.delete_buffer(old.id);
        }

        let id = gl.gen_buffer();
        if id == 0 {
            error!("Unable to create an index buffer; {} indices not uploaded", indices.len());
            return;
        }
        gl.element_buffer_data(id, indices);
        self.index_buffer = Some(IndexBuffer { id, count: indices.len() });
    }

    pub fn vertex_buffers(&self) -> &[VertexBufferBinding] { &self.vertex_buffers }
    pub fn index_buffer(&self) -> Option<IndexBuffer> { self.index_buffer }
    pub fn vertex_count(&self) -> usize { self.vertex_count }
    pub fn index_count(&self) -> Option<usize> { self.index_buffer.map(|b| b.count) }

    /// Draws the geometry with `program`.
    ///
    /// * no index buffer: `count` vertices from vertex `start`, or every vertex if `count` is
    ///   `None`;
    /// * with an index buffer: `count` indices from index `start`, or every index if `count` is
    ///   `None`.
    ///
    /// Attribute locations are looked up in `program` on every call. Each location enabled here is
    /// disabled again before returning, so the next draw (possibly of another geometry with
    /// another program) starts with no vertex attributes enabled.
    pub fn draw<G: GlContext + ?Sized>(
        &self,
        gl: &G,
        topology: Topology,
        program: u32,
        count: Option<usize>,
        start: usize,
    ) {
        if self.vertex_buffers.is_empty() {
            debug!("Geometry has no vertex buffers; nothing to draw");
            return;
        }

        gl.use_program(program);
        let enabled = self.bind(gl, program);
        let mode = topology.gl_mode();

        match (self.index_buffer, count) {
            (None, None) => gl.draw_arrays(mode, 0, self.vertex_count),
            (None, Some(count)) => gl.draw_arrays(mode, start, count),
            (Some(indices), None) => gl.draw_elements(mode, indices.count, 0),
            (Some(_), Some(count)) => gl.draw_elements(mode, count, start * INDEX_SIZE),
        }

        for location in enabled {
            gl.disable_vertex_attrib(location);
        }
    }

    /// Resolves, enables and describes every attribute `program` knows about. Returns the
    /// locations that were enabled.
    fn bind<G: GlContext + ?Sized>(&self, gl: &G, program: u32) -> Vec<u32> {
        let mut enabled = Vec::new();

        for buffer in &self.vertex_buffers {
            gl.bind_array_buffer(buffer.id);

            for (attribute, offset) in buffer.attributes.iter().zip(buffer.offsets()) {
                let location = gl.attrib_location(program, &attribute.name);
                if location < 0 {
                    continue;
                }

                let location = location as u32;
                gl.enable_vertex_attrib(location);
                gl.vertex_attrib_pointer(
                    location,
                    attribute.dimension as i32,
                    attribute.normalize,
                    buffer.stride,
                    offset,
                );
                enabled.push(location);
            }
        }

        if let Some(indices) = self.index_buffer {
            gl.bind_element_buffer(indices.id);
        }

        enabled
    }

    /// Releases every buffer this geometry owns.
    pub fn delete<G: GlContext + ?Sized>(self, gl: &G) {
        for buffer in &self.vertex_buffers {
            gl.delete_buffer(buffer.id);
        }
        if let Some(indices) = self.index_buffer {
            gl.delete_buffer(indices.id);
        }
    }
}

impl fmt::Display for GeometryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index_buffer {
            Some(indices) => write!(f, "Geometry, index count: {}", indices.count)?,
            None => write!(f, "Geometry, no index buffer")?,
        }
        write!(f, ", vertex count: {}", self.vertex_count)?;
        for buffer in &self.vertex_buffers {
            write!(f, "\n\t{}", buffer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::GlContext;
    use crate::fake::{Call, FakeGl};

    /// A program whose vertex shader declares the given inputs, in location order.
    fn program_with_inputs(gl: &FakeGl, inputs: &[&str]) -> u32 {
        let mut source = String::from("#version 330\n");
        for input in inputs {
            source.push_str(&format!("in vec3 {};\n", input));
        }
        source.push_str("void main() {}\n");

        let program = gl.create_program();
        let shader = gl.create_shader(gl::VERTEX_SHADER);
        gl.shader_source(shader, &source);
        gl.attach_shader(program, shader);
        assert!(gl.link_program(program));
        gl.clear_calls();
        program
    }

    fn position_color() -> Vec<VertexAttribute> {
        vec![VertexAttribute::new("inPosition", 2), VertexAttribute::new("inColor", 3)]
    }

    #[test]
    fn failed_buffer_creation_keeps_nothing() {
        let mut gl = FakeGl::new();
        gl.fail_gen_buffer = true;

        let geometry = GeometryBuffer::new(&gl, &[0.0; 15], None, position_color(), Some(&[0, 1, 2]));

        assert!(geometry.vertex_buffers().is_empty());
        assert_eq!(geometry.index_buffer(), None);
        assert_eq!(geometry.vertex_count(), 0);
        assert!(gl.calls().is_empty());

        // Nothing to bind, so nothing is drawn
        geometry.draw(&gl, Topology::Triangles, 1, None, 0);
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn vertex_count_is_derived_from_attribute_dimensions() {
        let gl = FakeGl::new();
        let data = [0.0f32; 15];

        let geometry = GeometryBuffer::new(&gl, &data, None, position_color(), None);

        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.vertex_buffers().len(), 1);
        assert_eq!(geometry.vertex_buffers()[0].stride(), 20);
        assert_eq!(geometry.index_count(), None);
    }

    #[test]
    fn incongruent_data_still_uploads_and_draws() {
        let gl = FakeGl::new();
        let program = program_with_inputs(&gl, &["inPosition", "inColor"]);
        let data = [1.0f32; 9];

        let geometry = GeometryBuffer::new(&gl, &data, Some(5), position_color(), None);
        assert_eq!(geometry.vertex_count(), 1);

        geometry.draw(&gl, Topology::Triangles, program, None, 0);
        assert_eq!(gl.draws(), vec![Call::DrawArrays { mode: gl::TRIANGLES, first: 0, count: 1 }]);
    }

    #[test]
    fn explicit_offsets_override_the_running_offset() {
        let gl = FakeGl::new();
        let attributes = vec![
            VertexAttribute::new("inPosition", 2),
            VertexAttribute::new("inColor", 3),
            VertexAttribute::new("inTexCoord", 2).with_offset_in_floats(5),
        ];

        let geometry = GeometryBuffer::new(&gl, &[0.0; 21], Some(7), attributes, Some(&[0, 1, 2]));

        let binding = &geometry.vertex_buffers()[0];
        assert_eq!(binding.offsets(), vec![0, 8, 20]);
        assert_eq!(binding.stride(), 28);
        assert_eq!(geometry.vertex_count(), 3);
    }

    #[test]
    fn draw_without_indices_covers_every_case() {
        let gl = FakeGl::new();
        let program = program_with_inputs(&gl, &["inPosition", "inColor"]);
        let geometry = GeometryBuffer::new(&gl, &[0.0; 90], None, position_color(), None);

        geometry.draw(&gl, Topology::Triangles, program, None, 0);
        geometry.draw(&gl, Topology::Triangles, program, Some(9), 0);
        geometry.draw(&gl, Topology::Triangles, program, Some(9), 6);

        assert_eq!(gl.draws(), vec![
            Call::DrawArrays { mode: gl::TRIANGLES, first: 0, count: 18 },
            Call::DrawArrays { mode: gl::TRIANGLES, first: 0, count: 9 },
            Call::DrawArrays { mode: gl::TRIANGLES, first: 6, count: 9 },
        ]);
    }

    #[test]
    fn indexed_draw_converts_start_to_a_byte_offset() {
        let gl = FakeGl::new();
        let program = program_with_inputs(&gl, &["inPosition"]);
        let indices = [0u32, 1, 2, 5, 8, 11, 14, 17];
        let geometry = GeometryBuffer::new(
            &gl, &[0.0; 36], None, vec![VertexAttribute::new("inPosition", 2)], Some(&indices),
        );

        geometry.draw(&gl, Topology::TriangleStrip, program, None, 0);
        geometry.draw(&gl, Topology::TriangleStrip, program, Some(4), 2);

        assert_eq!(gl.draws(), vec![
            Call::DrawElements { mode: gl::TRIANGLE_STRIP, count: 8, byte_offset: 0 },
            Call::DrawElements { mode: gl::TRIANGLE_STRIP, count: 4, byte_offset: 8 },
        ]);
    }

    #[test]
    fn restart_marker_reaches_the_gpu_unmodified() {
        let gl = FakeGl::new();
        let indices = [0u32, 1, 2, 5, 65535, 12, 13, 14, 17];

        let geometry = GeometryBuffer::new(
            &gl, &[0.0; 108], None, vec![VertexAttribute::new("inPosition", 3), VertexAttribute::new("inNormal", 3)],
            Some(&indices),
        );

        let id = geometry.index_buffer().map(|b| b.id()).unwrap();
        assert!(gl.calls().contains(&Call::ElementData { id, data: indices.to_vec() }));
        assert_eq!(geometry.index_count(), Some(9));
    }

    #[test]
    fn draw_leaves_no_attribute_enabled() {
        let gl = FakeGl::new();
        let program = program_with_inputs(&gl, &["inPosition", "inColor"]);
        let mut geometry = GeometryBuffer::new(
            &gl, &[0.0; 6], None, vec![VertexAttribute::new("inPosition", 2)], Some(&[0, 1, 2]),
        );
        geometry.add_vertex_buffer(&gl, &[0.0; 9], vec![VertexAttribute::new("inColor", 3)], None);

        geometry.draw(&gl, Topology::Triangles, program, None, 0);

        let enables = gl.calls().iter().filter(|c| matches!(c, Call::Enable(_))).count();
        assert_eq!(enables, 2);
        assert!(gl.enabled_locations().is_empty());
    }

    #[test]
    fn attributes_missing_from_the_program_are_skipped() {
        let gl = FakeGl::new();
        let program = program_with_inputs(&gl, &["inPosition"]);
        let geometry = GeometryBuffer::new(&gl, &[0.0; 15], None, position_color(), None);

        geometry.draw(&gl, Topology::Triangles, program, None, 0);

        let pointers: Vec<Call> = gl.calls().into_iter()
            .filter(|c| matches!(c, Call::AttribPointer { .. }))
            .collect();
        assert_eq!(pointers, vec![
            Call::AttribPointer { location: 0, size: 2, normalize: false, stride: 20, offset: 0 },
        ]);
        assert_eq!(gl.draws().len(), 1);
    }

    #[test]
    fn same_geometry_resolves_locations_per_program() {
        let gl = FakeGl::new();
        let first = program_with_inputs(&gl, &["inPosition", "inColor"]);
        let second = program_with_inputs(&gl, &["inColor", "inPosition"]);
        let geometry = GeometryBuffer::new(&gl, &[0.0; 15], None, position_color(), None);

        geometry.draw(&gl, Topology::Triangles, second, None, 0);

        assert!(gl.calls().contains(&Call::UseProgram(second)));
        assert!(gl.calls().contains(
            &Call::AttribPointer { location: 1, size: 2, normalize: false, stride: 20, offset: 0 }
        ));
        assert!(!gl.calls().contains(&Call::UseProgram(first)));
    }

    #[test]
    fn mismatched_vertex_counts_keep_the_first_count() {
        let gl = FakeGl::new();
        let mut geometry = GeometryBuffer::new(
            &gl, &[0.0; 6], None, vec![VertexAttribute::new("inPosition", 2)], None,
        );

        geometry.add_vertex_buffer(&gl, &[0.0; 12], vec![VertexAttribute::new("inColor", 3)], None);

        assert_eq!(geometry.vertex_buffers().len(), 2);
        assert_eq!(geometry.vertex_count(), 3);
    }

    #[test]
    fn geometry_without_attributes_draws_nothing() {
        let gl = FakeGl::new();
        let geometry = GeometryBuffer::new(&gl, &[0.0; 6], None, vec![], None);

        geometry.draw(&gl, Topology::Triangles, 1, None, 0);

        assert!(geometry.vertex_buffers().is_empty());
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn delete_releases_every_buffer() {
        let gl = FakeGl::new();
        let mut geometry = GeometryBuffer::new(
            &gl, &[0.0; 6], None, vec![VertexAttribute::new("inPosition", 2)], Some(&[0, 1, 2]),
        );
        geometry.add_vertex_buffer(&gl, &[0.0; 9], vec![VertexAttribute::new("inColor", 3)], None);
        gl.clear_calls();

        geometry.delete(&gl);

        let deleted = gl.calls().iter().filter(|c| matches!(c, Call::DeleteBuffer(_))).count();
        assert_eq!(deleted, 3);
    }

    #[test]
    fn summary_lists_every_binding() {
        let gl = FakeGl::new();
        let geometry = GeometryBuffer::new(&gl, &[0.0; 15], None, position_color(), Some(&[0, 1, 2]));

        let text = geometry.to_string();
        assert!(text.starts_with("Geometry, index count: 3, vertex count: 3"));
        assert!(text.contains("inPosition: 2 float(s)"));
        assert!(text.contains("inColor: 3 float(s)"));
    }
}
