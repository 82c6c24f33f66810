//! Vertex batching
//!
//! Two batch flavors cover the two common data flows:
//! - [`StreamingBatch`]: per-attribute buffers for bulk-uploaded or
//!   incrementally emitted vertices, rebuilt as often as every frame.
//! - [`WeldedMeshBuilder`]: static indexed triangle meshes with
//!   tolerance-welded vertices, built once and drawn many times.

pub mod streaming;
pub mod welded;

pub use streaming::{StreamingBatch, MAX_TEXTURE_UNITS};
pub use welded::{WeldedMeshBuilder, MAX_WELDED_VERTICES, WELD_EPSILON};
