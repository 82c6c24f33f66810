//! Core backend abstraction traits
//!
//! These traits define the interface a graphics backend must implement for
//! batches to allocate, fill, and draw vertex data.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to map buffer: {0}")]
    MapFailed(String),
    #[error("Unknown buffer handle {0:?}")]
    UnknownBuffer(BufferHandle),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// A write-only mapping of a buffer's memory.
///
/// Obtained from [`GraphicsBackend::map_buffer_write`] and returned to the
/// backend via [`GraphicsBackend::unmap_buffer`], which commits the writes.
/// The mapping owns its memory window, so holding one across calls is safe;
/// the buffer it came from must not be drawn from until it is unmapped.
pub struct MappedBuffer {
    buffer: BufferHandle,
    data: Vec<u8>,
}

impl MappedBuffer {
    /// Wrap a memory window for `buffer`. Called by backend implementations.
    pub fn new(buffer: BufferHandle, data: Vec<u8>) -> Self {
        Self { buffer, data }
    }

    /// The buffer this mapping belongs to.
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// The writable memory window.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the mapping, yielding the handle and the written bytes.
    /// Called by backend implementations inside `unmap_buffer`.
    pub fn into_parts(self) -> (BufferHandle, Vec<u8>) {
        (self.buffer, self.data)
    }
}

impl std::fmt::Debug for MappedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedBuffer")
            .field("buffer", &self.buffer)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Main graphics backend trait
///
/// The surface batches need: buffer lifecycle, full and partial upload,
/// write-only mapping, attribute binding by fixed index, and draw submission
/// with an explicit primitive topology.
pub trait GraphicsBackend {
    /// Create a buffer
    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle>;

    /// Create a buffer with initial data
    fn create_buffer_init(&mut self, desc: &BufferDescriptor, data: &[u8])
        -> BackendResult<BufferHandle>;

    /// Write data to a buffer
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// Map a buffer for write-only client access.
    ///
    /// The returned window reflects the buffer's current contents; bytes the
    /// caller does not overwrite keep their previous values after unmap.
    fn map_buffer_write(&mut self, buffer: BufferHandle) -> BackendResult<MappedBuffer>;

    /// Commit a mapping's writes and release the window.
    fn unmap_buffer(&mut self, mapping: MappedBuffer);

    /// Register `buffer` as the data stream for a fixed attribute slot
    fn bind_attribute(&mut self, attribute: AttributeIndex, buffer: BufferHandle, format: VertexFormat);

    /// Submit a non-indexed draw
    fn draw(&mut self, topology: PrimitiveTopology, vertices: std::ops::Range<u32>);

    /// Submit an indexed draw
    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_buffer: BufferHandle,
        format: IndexFormat,
        indices: std::ops::Range<u32>,
    );

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);
}
