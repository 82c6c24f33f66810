//! Streaming vertex batch
//!
//! A growable per-attribute buffer set sized for a fixed number of vertices.
//! Attribute data arrives either as one bulk copy per attribute or through
//! immediate-mode-style per-vertex emission, where each attribute's buffer is
//! created and mapped lazily on its first write of a recording pass.

use crate::backend::traits::*;
use crate::backend::types::*;
use glam::{Vec2, Vec3, Vec4};

/// Texture-coordinate units supported per batch.
pub const MAX_TEXTURE_UNITS: usize = 4;

const TEXCOORD_LABELS: [&str; MAX_TEXTURE_UNITS] =
    ["texcoord0", "texcoord1", "texcoord2", "texcoord3"];

/// One per-vertex attribute stream.
///
/// The backend buffer is absent until the first write. The mapping is present
/// only between the first per-pass incremental write and the pass's
/// [`StreamingBatch::end`].
struct AttributeSlot {
    label: &'static str,
    format: VertexFormat,
    buffer: Option<BufferHandle>,
    mapping: Option<MappedBuffer>,
}

impl AttributeSlot {
    fn new(label: &'static str, format: VertexFormat) -> Self {
        Self {
            label,
            format,
            buffer: None,
            mapping: None,
        }
    }

    /// Lazily create the backend buffer sized for `vertex_count` elements.
    fn ensure_buffer<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        vertex_count: u32,
    ) -> BackendResult<BufferHandle> {
        if let Some(buffer) = self.buffer {
            return Ok(buffer);
        }
        let desc = BufferDescriptor::new(
            self.format.size() * vertex_count as u64,
            BufferUsage::VERTEX | BufferUsage::MAP_WRITE | BufferUsage::COPY_DST,
        )
        .with_hint(UsageHint::Dynamic)
        .with_label(self.label);
        let buffer = backend.create_buffer(&desc)?;
        self.buffer = Some(buffer);
        Ok(buffer)
    }

    /// Incremental path: write one element at `cursor`, mapping on first use.
    fn write_at<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        vertex_count: u32,
        cursor: u32,
        components: &[f32],
    ) -> BackendResult<()> {
        let buffer = self.ensure_buffer(backend, vertex_count)?;
        if self.mapping.is_none() {
            self.mapping = Some(backend.map_buffer_write(buffer)?);
        }
        if let Some(mapping) = self.mapping.as_mut() {
            let bytes: &[u8] = bytemuck::cast_slice(components);
            let offset = cursor as usize * self.format.size() as usize;
            if let Some(window) = mapping.bytes_mut().get_mut(offset..offset + bytes.len()) {
                window.copy_from_slice(bytes);
            }
        }
        Ok(())
    }

    /// Bulk path: create on first use, then re-upload in place.
    fn upload<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        vertex_count: u32,
        bytes: &[u8],
    ) -> BackendResult<()> {
        // A bulk copy supersedes any open mapping; commit it first so the
        // unmap at end() cannot overwrite the fresh data.
        if let Some(mapping) = self.mapping.take() {
            backend.unmap_buffer(mapping);
        }
        let buffer = self.ensure_buffer(backend, vertex_count)?;
        backend.write_buffer(buffer, 0, bytes);
        Ok(())
    }

    /// Commit and close the mapping if the pass left one open.
    fn finish<B: GraphicsBackend>(&mut self, backend: &mut B) {
        if let Some(mapping) = self.mapping.take() {
            backend.unmap_buffer(mapping);
        }
    }

    fn bind<B: GraphicsBackend>(&self, backend: &mut B, attribute: AttributeIndex) {
        if let Some(buffer) = self.buffer {
            backend.bind_attribute(attribute, buffer, self.format);
        }
    }

    fn destroy<B: GraphicsBackend>(&mut self, backend: &mut B) {
        if let Some(mapping) = self.mapping.take() {
            backend.unmap_buffer(mapping);
        }
        if let Some(buffer) = self.buffer.take() {
            backend.destroy_buffer(buffer);
        }
    }
}

/// A vertex batch with one GPU buffer per populated attribute.
///
/// Lifecycle: [`begin`](Self::begin) fixes the topology and vertex capacity,
/// attribute data arrives via the bulk `copy_*` methods or per-vertex
/// emission, [`end`](Self::end) commits and binds everything, and
/// [`draw`](Self::draw) replays the batch each frame. [`reset`](Self::reset)
/// opens a new recording pass that reuses the existing buffers, which is the
/// steady-state path for per-frame procedural geometry.
///
/// Overflow and invalid-state calls never fail: writes past the declared
/// capacity are dropped and drawing an unfinished batch is a no-op. The only
/// errors surfaced are backend allocation failures.
pub struct StreamingBatch {
    topology: PrimitiveTopology,
    vertex_count: u32,
    position: AttributeSlot,
    normal: AttributeSlot,
    color: AttributeSlot,
    texcoords: Vec<AttributeSlot>,
    cursor: u32,
    finalized: bool,
}

impl StreamingBatch {
    /// Create an empty batch. Nothing is allocated until data arrives.
    pub fn new() -> Self {
        Self {
            topology: PrimitiveTopology::TriangleList,
            vertex_count: 0,
            position: AttributeSlot::new("position", VertexFormat::Float32x3),
            normal: AttributeSlot::new("normal", VertexFormat::Float32x3),
            color: AttributeSlot::new("color", VertexFormat::Float32x4),
            texcoords: Vec::new(),
            cursor: 0,
            finalized: false,
        }
    }

    /// Start the batch: fix the topology, the vertex capacity, and how many
    /// texture-coordinate units it carries.
    ///
    /// `texture_units` above [`MAX_TEXTURE_UNITS`] is clamped, never an
    /// error. No buffers are allocated here; each attribute allocates on its
    /// first write so unused attributes cost nothing.
    pub fn begin(&mut self, topology: PrimitiveTopology, vertex_count: u32, texture_units: u32) {
        let texture_units = (texture_units as usize).min(MAX_TEXTURE_UNITS);

        self.topology = topology;
        self.vertex_count = vertex_count;
        self.cursor = 0;
        self.finalized = false;

        // Reuse already-allocated texcoord slots when begin() is called again.
        self.texcoords.truncate(texture_units);
        while self.texcoords.len() < texture_units {
            let unit = self.texcoords.len();
            self.texcoords
                .push(AttributeSlot::new(TEXCOORD_LABELS[unit], VertexFormat::Float32x2));
        }
    }

    /// Declared vertex capacity.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Vertices emitted so far in the current recording pass.
    pub fn recorded_vertices(&self) -> u32 {
        self.cursor
    }

    /// Number of active texture-coordinate units.
    pub fn texture_unit_count(&self) -> u32 {
        self.texcoords.len() as u32
    }

    /// Primitive topology the batch draws with.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Whether [`end`](Self::end) has run since the last begin/reset.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // Bulk upload. The first call per attribute allocates the buffer with a
    // dynamic hint; later calls re-upload in place, which is the per-frame
    // update path. Slices longer than the capacity are truncated.

    /// Bulk-load positions for the whole batch.
    pub fn copy_position_data<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        verts: &[Vec3],
    ) -> BackendResult<()> {
        if self.vertex_count == 0 {
            return Ok(());
        }
        let n = verts.len().min(self.vertex_count as usize);
        self.position
            .upload(backend, self.vertex_count, bytemuck::cast_slice(&verts[..n]))
    }

    /// Bulk-load normals for the whole batch.
    pub fn copy_normal_data<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        normals: &[Vec3],
    ) -> BackendResult<()> {
        if self.vertex_count == 0 {
            return Ok(());
        }
        let n = normals.len().min(self.vertex_count as usize);
        self.normal
            .upload(backend, self.vertex_count, bytemuck::cast_slice(&normals[..n]))
    }

    /// Bulk-load colors for the whole batch.
    pub fn copy_color_data<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        colors: &[Vec4],
    ) -> BackendResult<()> {
        if self.vertex_count == 0 {
            return Ok(());
        }
        let n = colors.len().min(self.vertex_count as usize);
        self.color
            .upload(backend, self.vertex_count, bytemuck::cast_slice(&colors[..n]))
    }

    /// Bulk-load texture coordinates for one unit. Writes to a unit the
    /// batch does not carry are ignored.
    pub fn copy_tex_coord_data<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        unit: usize,
        coords: &[Vec2],
    ) -> BackendResult<()> {
        if self.vertex_count == 0 {
            return Ok(());
        }
        let vertex_count = self.vertex_count;
        let Some(slot) = self.texcoords.get_mut(unit) else {
            return Ok(());
        };
        let n = coords.len().min(vertex_count as usize);
        slot.upload(backend, vertex_count, bytemuck::cast_slice(&coords[..n]))
    }

    // Incremental emission. Each attribute maps its buffer on the first
    // write of a pass and stays mapped until end(). Only vertex()/vertex_v()
    // advance the recording cursor, so callers must emit exactly one of them
    // per logical vertex: attributes first, position last (or in any fixed
    // order with the position write counted once).

    /// Emit a position and advance the recording cursor.
    pub fn vertex<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        x: f32,
        y: f32,
        z: f32,
    ) -> BackendResult<()> {
        // Ignore writes past the declared capacity.
        if self.cursor >= self.vertex_count {
            return Ok(());
        }
        self.position
            .write_at(backend, self.vertex_count, self.cursor, &[x, y, z])?;
        self.cursor += 1;
        Ok(())
    }

    /// Emit a position from a vector and advance the recording cursor.
    pub fn vertex_v<B: GraphicsBackend>(&mut self, backend: &mut B, v: Vec3) -> BackendResult<()> {
        self.vertex(backend, v.x, v.y, v.z)
    }

    /// Set the normal for the vertex at the current cursor position.
    pub fn normal<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        x: f32,
        y: f32,
        z: f32,
    ) -> BackendResult<()> {
        if self.cursor >= self.vertex_count {
            return Ok(());
        }
        self.normal
            .write_at(backend, self.vertex_count, self.cursor, &[x, y, z])
    }

    /// Set the normal from a vector.
    pub fn normal_v<B: GraphicsBackend>(&mut self, backend: &mut B, n: Vec3) -> BackendResult<()> {
        self.normal(backend, n.x, n.y, n.z)
    }

    /// Set the color for the vertex at the current cursor position.
    pub fn color<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> BackendResult<()> {
        if self.cursor >= self.vertex_count {
            return Ok(());
        }
        self.color
            .write_at(backend, self.vertex_count, self.cursor, &[r, g, b, a])
    }

    /// Set the color from a vector.
    pub fn color_v<B: GraphicsBackend>(&mut self, backend: &mut B, c: Vec4) -> BackendResult<()> {
        self.color(backend, c.x, c.y, c.z, c.w)
    }

    /// Set one texture-coordinate unit for the vertex at the current cursor
    /// position. Writes to a unit the batch does not carry are ignored.
    pub fn tex_coord<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        unit: usize,
        s: f32,
        t: f32,
    ) -> BackendResult<()> {
        if self.cursor >= self.vertex_count {
            return Ok(());
        }
        let vertex_count = self.vertex_count;
        let cursor = self.cursor;
        let Some(slot) = self.texcoords.get_mut(unit) else {
            return Ok(());
        };
        slot.write_at(backend, vertex_count, cursor, &[s, t])
    }

    /// Finish the recording pass: commit every still-open mapping, bind each
    /// populated attribute to its fixed slot, and mark the batch drawable.
    ///
    /// Legal with no attributes populated; the batch then draws degenerately
    /// with nothing bound.
    pub fn end<B: GraphicsBackend>(&mut self, backend: &mut B) {
        self.position.finish(backend);
        self.normal.finish(backend);
        self.color.finish(backend);
        for slot in &mut self.texcoords {
            slot.finish(backend);
        }

        self.bind_slots(backend);
        self.finalized = true;
    }

    /// Replay the batch: a non-indexed draw of the declared vertex count.
    ///
    /// Drawing before [`end`](Self::end) is a silent no-op rather than an
    /// error; a render loop must not fault on an unfinished batch.
    pub fn draw<B: GraphicsBackend>(&self, backend: &mut B) {
        if !self.finalized {
            return;
        }
        self.bind_slots(backend);
        backend.draw(self.topology, 0..self.vertex_count);
    }

    /// Open a new recording pass, keeping the buffers and their capacity.
    ///
    /// Buffer contents beyond what the next pass rewrites keep the previous
    /// pass's values; the capacity bound still holds.
    pub fn reset(&mut self) {
        self.finalized = false;
        self.cursor = 0;
    }

    /// Release every allocated backend buffer. Slots that never allocated
    /// are safe no-ops. The batch returns to its pre-`begin` state.
    pub fn destroy<B: GraphicsBackend>(&mut self, backend: &mut B) {
        self.position.destroy(backend);
        self.normal.destroy(backend);
        self.color.destroy(backend);
        for slot in &mut self.texcoords {
            slot.destroy(backend);
        }
        self.texcoords.clear();
        self.vertex_count = 0;
        self.cursor = 0;
        self.finalized = false;
    }

    fn bind_slots<B: GraphicsBackend>(&self, backend: &mut B) {
        self.position.bind(backend, AttributeIndex::Position);
        self.normal.bind(backend, AttributeIndex::Normal);
        self.color.bind(backend, AttributeIndex::Color);
        for (unit, slot) in self.texcoords.iter().enumerate() {
            slot.bind(backend, AttributeIndex::TEXCOORDS[unit]);
        }
    }
}

impl Default for StreamingBatch {
    fn default() -> Self {
        Self::new()
    }
}
