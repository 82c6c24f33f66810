//! Headless backend implementation
//!
//! A CPU-memory backend for tests and GPU-less development. Buffer contents
//! are retained, mappings behave like a write-only window over persistent
//! storage, and submitted draws are recorded for inspection.

use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::HashMap;

/// A buffer held in CPU memory.
struct CpuBuffer {
    data: Vec<u8>,
    usage: BufferUsage,
    hint: UsageHint,
    label: Option<String>,
    mapped: bool,
}

/// One recorded attribute binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub buffer: BufferHandle,
    pub format: VertexFormat,
}

/// A draw submitted to the headless backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Arrays {
        topology: PrimitiveTopology,
        vertices: std::ops::Range<u32>,
    },
    Indexed {
        topology: PrimitiveTopology,
        index_buffer: BufferHandle,
        format: IndexFormat,
        indices: std::ops::Range<u32>,
    },
}

/// Headless backend implementation
pub struct HeadlessBackend {
    // Resource storage
    buffers: HashMap<u64, CpuBuffer>,

    // Handle counter
    next_buffer_id: u64,

    // Current attribute bindings
    bindings: HashMap<AttributeIndex, AttributeBinding>,

    // Recorded draw submissions
    draws: Vec<DrawCall>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_buffer_id: 1,
            bindings: HashMap::new(),
            draws: Vec::new(),
        }
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Contents of a buffer, if it exists.
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(|b| b.data.as_slice())
    }

    /// Declared upload hint of a buffer, if it exists.
    pub fn buffer_hint(&self, buffer: BufferHandle) -> Option<UsageHint> {
        self.buffers.get(&buffer.0).map(|b| b.hint)
    }

    /// The binding currently registered for an attribute slot.
    pub fn attribute_binding(&self, attribute: AttributeIndex) -> Option<AttributeBinding> {
        self.bindings.get(&attribute).copied()
    }

    /// All draws submitted so far, in order.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Forget recorded draws (bindings and buffers are kept).
    pub fn clear_draw_calls(&mut self) {
        self.draws.clear();
    }

    fn alloc_handle(&mut self) -> BufferHandle {
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        BufferHandle(id)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        if desc.size == 0 {
            return Err(BackendError::BufferCreationFailed(
                "buffer size cannot be zero".to_string(),
            ));
        }
        let handle = self.alloc_handle();
        self.buffers.insert(
            handle.0,
            CpuBuffer {
                data: vec![0u8; desc.size as usize],
                usage: desc.usage,
                hint: desc.hint,
                label: desc.label.clone(),
                mapped: false,
            },
        );
        log::trace!(
            "HeadlessBackend: created buffer {:?} {:?} (size: {})",
            handle,
            desc.label,
            desc.size
        );
        Ok(handle)
    }

    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        let handle = self.create_buffer(desc)?;
        self.write_buffer(handle, 0, data);
        Ok(handle)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let Some(cpu) = self.buffers.get_mut(&buffer.0) else {
            log::warn!("HeadlessBackend: write to unknown buffer {:?}", buffer);
            return;
        };
        let offset = offset as usize;
        if offset >= cpu.data.len() {
            log::warn!(
                "HeadlessBackend: write at offset {} past end of {:?} (size {})",
                offset,
                buffer,
                cpu.data.len()
            );
            return;
        }
        let len = data.len().min(cpu.data.len() - offset);
        if len < data.len() {
            log::warn!(
                "HeadlessBackend: write to {:?} truncated to {} bytes",
                buffer,
                len
            );
        }
        cpu.data[offset..offset + len].copy_from_slice(&data[..len]);
        log::trace!(
            "HeadlessBackend: write_buffer {:?} offset={} len={}",
            buffer,
            offset,
            len
        );
    }

    fn map_buffer_write(&mut self, buffer: BufferHandle) -> BackendResult<MappedBuffer> {
        let Some(cpu) = self.buffers.get_mut(&buffer.0) else {
            return Err(BackendError::UnknownBuffer(buffer));
        };
        if !cpu.usage.contains(BufferUsage::MAP_WRITE) {
            return Err(BackendError::MapFailed(format!(
                "buffer {:?} was not created with MAP_WRITE",
                buffer
            )));
        }
        if cpu.mapped {
            return Err(BackendError::MapFailed(format!(
                "buffer {:?} is already mapped",
                buffer
            )));
        }
        cpu.mapped = true;
        log::trace!("HeadlessBackend: mapped {:?} ({:?})", buffer, cpu.label);
        // The window starts as the current contents, so unwritten bytes
        // survive the round trip like a real persistent mapping.
        Ok(MappedBuffer::new(buffer, cpu.data.clone()))
    }

    fn unmap_buffer(&mut self, mapping: MappedBuffer) {
        let (handle, data) = mapping.into_parts();
        let Some(cpu) = self.buffers.get_mut(&handle.0) else {
            log::warn!("HeadlessBackend: unmap of unknown buffer {:?}", handle);
            return;
        };
        cpu.data = data;
        cpu.mapped = false;
        log::trace!("HeadlessBackend: unmapped {:?}", handle);
    }

    fn bind_attribute(
        &mut self,
        attribute: AttributeIndex,
        buffer: BufferHandle,
        format: VertexFormat,
    ) {
        if !self.buffers.contains_key(&buffer.0) {
            log::warn!(
                "HeadlessBackend: binding unknown buffer {:?} to {:?}",
                buffer,
                attribute
            );
        }
        self.bindings
            .insert(attribute, AttributeBinding { buffer, format });
    }

    fn draw(&mut self, topology: PrimitiveTopology, vertices: std::ops::Range<u32>) {
        log::trace!(
            "HeadlessBackend: draw {:?} {}..{}",
            topology,
            vertices.start,
            vertices.end
        );
        self.draws.push(DrawCall::Arrays { topology, vertices });
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_buffer: BufferHandle,
        format: IndexFormat,
        indices: std::ops::Range<u32>,
    ) {
        log::trace!(
            "HeadlessBackend: draw_indexed {:?} {}..{} from {:?}",
            topology,
            indices.start,
            indices.end,
            index_buffer
        );
        self.draws.push(DrawCall::Indexed {
            topology,
            index_buffer,
            format,
            indices,
        });
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer.0).is_none() {
            log::warn!("HeadlessBackend: destroy of unknown buffer {:?}", buffer);
        } else {
            log::trace!("HeadlessBackend: destroyed {:?}", buffer);
        }
        self.bindings.retain(|_, binding| binding.buffer != buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_desc(size: u64) -> BufferDescriptor {
        BufferDescriptor::new(size, BufferUsage::VERTEX | BufferUsage::MAP_WRITE)
    }

    #[test]
    fn create_and_read_back() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend
            .create_buffer_init(&vertex_desc(4), &[1, 2, 3, 4])
            .unwrap();
        assert_eq!(backend.buffer_data(buffer), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(backend.buffer_count(), 1);
    }

    #[test]
    fn zero_size_rejected() {
        let mut backend = HeadlessBackend::new();
        assert!(backend.create_buffer(&vertex_desc(0)).is_err());
    }

    #[test]
    fn partial_write() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(&vertex_desc(4)).unwrap();
        backend.write_buffer(buffer, 2, &[9, 9]);
        assert_eq!(backend.buffer_data(buffer), Some(&[0u8, 0, 9, 9][..]));
    }

    #[test]
    fn map_preserves_unwritten_bytes() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend
            .create_buffer_init(&vertex_desc(4), &[1, 2, 3, 4])
            .unwrap();
        let mut mapping = backend.map_buffer_write(buffer).unwrap();
        mapping.bytes_mut()[0] = 7;
        backend.unmap_buffer(mapping);
        assert_eq!(backend.buffer_data(buffer), Some(&[7u8, 2, 3, 4][..]));
    }

    #[test]
    fn double_map_rejected() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(&vertex_desc(4)).unwrap();
        let mapping = backend.map_buffer_write(buffer).unwrap();
        assert!(backend.map_buffer_write(buffer).is_err());
        backend.unmap_buffer(mapping);
        assert!(backend.map_buffer_write(buffer).is_ok());
    }

    #[test]
    fn map_requires_map_write_usage() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend
            .create_buffer(&BufferDescriptor::new(4, BufferUsage::VERTEX))
            .unwrap();
        assert!(backend.map_buffer_write(buffer).is_err());
    }

    #[test]
    fn destroy_clears_bindings() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(&vertex_desc(12)).unwrap();
        backend.bind_attribute(AttributeIndex::Position, buffer, VertexFormat::Float32x3);
        assert!(backend.attribute_binding(AttributeIndex::Position).is_some());
        backend.destroy_buffer(buffer);
        assert!(backend.attribute_binding(AttributeIndex::Position).is_none());
        assert_eq!(backend.buffer_count(), 0);
    }

    #[test]
    fn draws_recorded_in_order() {
        let mut backend = HeadlessBackend::new();
        backend.draw(PrimitiveTopology::TriangleList, 0..3);
        backend.draw(PrimitiveTopology::LineStrip, 0..2);
        assert_eq!(backend.draw_calls().len(), 2);
        assert_eq!(
            backend.draw_calls()[0],
            DrawCall::Arrays {
                topology: PrimitiveTopology::TriangleList,
                vertices: 0..3
            }
        );
    }
}
