//! Vertex batch management
//!
//! Accumulates per-vertex attribute streams (position, normal, color, up to
//! four texture-coordinate sets), uploads them into GPU-resident buffers
//! through a pluggable backend, and replays them for drawing.
//!
//! # Features
//! - Streaming batches with bulk upload or immediate-mode-style per-vertex
//!   emission backed by lazy write-only buffer mapping
//! - Welded indexed triangle meshes that deduplicate near-identical corners
//!   within a floating-point tolerance
//! - Procedural generators for common solids (sphere, torus, cylinder, disk,
//!   cube)
//! - A headless CPU backend for tests and development without a GPU
//!
//! Overflow and out-of-order calls are deliberately forgiving: writes past a
//! batch's declared capacity are dropped and drawing an unfinished batch is a
//! silent no-op, so a render loop never faults mid-frame. Only backend
//! allocation failures surface as errors.

pub mod backend;
pub mod batch;
pub mod shapes;

pub use backend::headless::HeadlessBackend;
pub use backend::{
    AttributeIndex, BackendError, BackendResult, BufferDescriptor, BufferHandle, BufferUsage,
    GraphicsBackend, IndexFormat, MappedBuffer, PrimitiveTopology, UsageHint, VertexFormat,
};
pub use batch::{StreamingBatch, WeldedMeshBuilder, MAX_TEXTURE_UNITS, MAX_WELDED_VERTICES};
