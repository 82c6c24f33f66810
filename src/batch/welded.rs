//! Welded triangle mesh builder
//!
//! Accumulates triangles on the CPU while deduplicating corners that share
//! position, normal, and texture coordinate within a small tolerance, then
//! finalizes the compacted vertex set and its index stream into static GPU
//! buffers for indexed drawing.

use crate::backend::traits::*;
use crate::backend::types::*;
use glam::{Vec2, Vec3};

/// Absolute per-component tolerance for corner matching.
pub const WELD_EPSILON: f32 = 1e-5;

/// Hard ceiling on unique vertices, imposed by the 16-bit index stream.
pub const MAX_WELDED_VERTICES: u32 = u16::MAX as u32;

fn close_enough(a: f32, b: f32) -> bool {
    (a - b).abs() < WELD_EPSILON
}

/// The GPU-resident form of a finalized mesh.
struct MeshBuffers {
    position: BufferHandle,
    normal: BufferHandle,
    texcoord: BufferHandle,
    index: BufferHandle,
}

/// Builder for static, indexed triangle meshes with welded vertices.
///
/// Corners within [`WELD_EPSILON`] of an existing unique vertex on every
/// component of position, normal, and texture coordinate share that vertex's
/// index instead of growing the vertex set. Meshes with high corner reuse
/// (solids of revolution, tessellated primitives) compact drastically.
///
/// The match scan is linear in the unique-vertex count, O(V²) over a whole
/// mesh; acceptable for the mesh sizes a 16-bit index stream can address.
///
/// Forward-only lifecycle: [`begin_mesh`](Self::begin_mesh) →
/// [`add_triangle`](Self::add_triangle)* → [`end`](Self::end) →
/// [`draw`](Self::draw)*. There is no reset; building another mesh starts
/// with a fresh `begin_mesh`.
pub struct WeldedMeshBuilder {
    max_vertices: u32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    indices: Vec<u16>,
    index_count: u32,
    buffers: Option<MeshBuffers>,
    finalized: bool,
}

impl WeldedMeshBuilder {
    /// Create an empty builder. No scratch storage is held until
    /// [`begin_mesh`](Self::begin_mesh).
    pub fn new() -> Self {
        Self {
            max_vertices: 0,
            positions: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            indices: Vec::new(),
            index_count: 0,
            buffers: None,
            finalized: false,
        }
    }

    /// Start assembling a mesh, sizing scratch storage for at most
    /// `max_vertices` triangle corners.
    ///
    /// Size pessimistically: the bound covers the index stream, so it must be
    /// at least the total corner count (3 × triangles); the unique vertex set
    /// is usually far smaller. Requests above [`MAX_WELDED_VERTICES`] are
    /// clamped; the 16-bit index stream cannot address more.
    ///
    /// Safe to call repeatedly; any in-progress mesh is discarded.
    pub fn begin_mesh(&mut self, max_vertices: u32) {
        let max_vertices = if max_vertices > MAX_WELDED_VERTICES {
            log::warn!(
                "begin_mesh: {} vertices requested, clamping to the 16-bit index limit of {}",
                max_vertices,
                MAX_WELDED_VERTICES
            );
            MAX_WELDED_VERTICES
        } else {
            max_vertices
        };

        self.max_vertices = max_vertices;
        self.index_count = 0;
        self.finalized = false;

        self.positions.clear();
        self.normals.clear();
        self.texcoords.clear();
        self.indices.clear();
        self.positions.reserve(max_vertices as usize);
        self.normals.reserve(max_vertices as usize);
        self.texcoords.reserve(max_vertices as usize);
        self.indices.reserve(max_vertices as usize);
    }

    /// Unique vertices accumulated so far.
    pub fn unique_vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    /// Indices accumulated so far (three per fully retained triangle).
    pub fn index_count(&self) -> u32 {
        if self.finalized {
            self.index_count
        } else {
            self.indices.len() as u32
        }
    }

    /// The accumulated index stream (empty once finalized).
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Whether [`end`](Self::end) has committed the mesh.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Add one triangle.
    ///
    /// The incoming normals are normalized to unit length before matching
    /// and storage, so callers may pass unnormalized face or averaged
    /// normals. Each corner either reuses an existing unique vertex (all of
    /// position, normal, and texture coordinate within [`WELD_EPSILON`]) or
    /// appends a new one. Corners that would exceed the declared capacity
    /// are dropped; the mesh truncates silently instead of overflowing.
    pub fn add_triangle(
        &mut self,
        verts: [Vec3; 3],
        norms: [Vec3; 3],
        texcoords: [Vec2; 3],
    ) {
        let capacity = self.max_vertices as usize;

        for corner in 0..3 {
            let vert = verts[corner];
            let norm = norms[corner].normalize_or_zero();
            let uv = texcoords[corner];

            let found = (0..self.positions.len()).find(|&i| {
                close_enough(self.positions[i].x, vert.x)
                    && close_enough(self.positions[i].y, vert.y)
                    && close_enough(self.positions[i].z, vert.z)
                    && close_enough(self.normals[i].x, norm.x)
                    && close_enough(self.normals[i].y, norm.y)
                    && close_enough(self.normals[i].z, norm.z)
                    && close_enough(self.texcoords[i].x, uv.x)
                    && close_enough(self.texcoords[i].y, uv.y)
            });

            match found {
                Some(i) => {
                    if self.indices.len() < capacity {
                        self.indices.push(i as u16);
                    }
                }
                None => {
                    if self.positions.len() < capacity && self.indices.len() < capacity {
                        self.indices.push(self.positions.len() as u16);
                        self.positions.push(vert);
                        self.normals.push(norm);
                        self.texcoords.push(uv);
                    }
                }
            }
        }
    }

    /// Compact the mesh into static GPU buffers and free the CPU scratch.
    ///
    /// After this the builder can only draw (or start over with
    /// [`begin_mesh`](Self::begin_mesh)); the welded data is gone from the
    /// CPU side. Finalizing an empty mesh creates no buffers and the mesh
    /// draws as a no-op. Buffers from a previously finalized mesh are
    /// released first.
    pub fn end<B: GraphicsBackend>(&mut self, backend: &mut B) -> BackendResult<()> {
        if let Some(old) = self.buffers.take() {
            backend.destroy_buffer(old.position);
            backend.destroy_buffer(old.normal);
            backend.destroy_buffer(old.texcoord);
            backend.destroy_buffer(old.index);
        }

        self.index_count = self.indices.len() as u32;

        if !self.indices.is_empty() {
            let vertex_usage = BufferUsage::VERTEX | BufferUsage::COPY_DST;
            let position = backend.create_buffer_init(
                &BufferDescriptor::new(
                    VertexFormat::Float32x3.size() * self.positions.len() as u64,
                    vertex_usage,
                )
                .with_label("mesh position"),
                bytemuck::cast_slice(&self.positions),
            )?;
            let normal = backend.create_buffer_init(
                &BufferDescriptor::new(
                    VertexFormat::Float32x3.size() * self.normals.len() as u64,
                    vertex_usage,
                )
                .with_label("mesh normal"),
                bytemuck::cast_slice(&self.normals),
            )?;
            let texcoord = backend.create_buffer_init(
                &BufferDescriptor::new(
                    VertexFormat::Float32x2.size() * self.texcoords.len() as u64,
                    vertex_usage,
                )
                .with_label("mesh texcoord"),
                bytemuck::cast_slice(&self.texcoords),
            )?;
            let index = backend.create_buffer_init(
                &BufferDescriptor::new(
                    (std::mem::size_of::<u16>() * self.indices.len()) as u64,
                    BufferUsage::INDEX | BufferUsage::COPY_DST,
                )
                .with_label("mesh index"),
                bytemuck::cast_slice(&self.indices),
            )?;
            self.buffers = Some(MeshBuffers {
                position,
                normal,
                texcoord,
                index,
            });

            log::trace!(
                "WeldedMeshBuilder: finalized {} unique vertices, {} indices",
                self.positions.len(),
                self.indices.len()
            );
        }

        // Free the larger scratch arrays; the compacted data lives on the GPU.
        self.positions = Vec::new();
        self.normals = Vec::new();
        self.texcoords = Vec::new();
        self.indices = Vec::new();

        self.finalized = true;
        Ok(())
    }

    /// Replay the mesh: an indexed draw of the accumulated index stream with
    /// 16-bit indices. A no-op before [`end`](Self::end) or for an empty
    /// mesh.
    pub fn draw<B: GraphicsBackend>(&self, backend: &mut B) {
        if !self.finalized {
            return;
        }
        let Some(buffers) = self.buffers.as_ref() else {
            return;
        };
        backend.bind_attribute(
            AttributeIndex::Position,
            buffers.position,
            VertexFormat::Float32x3,
        );
        backend.bind_attribute(
            AttributeIndex::Normal,
            buffers.normal,
            VertexFormat::Float32x3,
        );
        backend.bind_attribute(
            AttributeIndex::TexCoord0,
            buffers.texcoord,
            VertexFormat::Float32x2,
        );
        backend.draw_indexed(
            PrimitiveTopology::TriangleList,
            buffers.index,
            IndexFormat::Uint16,
            0..self.index_count,
        );
    }

    /// Release the GPU buffers and any still-resident scratch.
    pub fn destroy<B: GraphicsBackend>(&mut self, backend: &mut B) {
        if let Some(buffers) = self.buffers.take() {
            backend.destroy_buffer(buffers.position);
            backend.destroy_buffer(buffers.normal);
            backend.destroy_buffer(buffers.texcoord);
            backend.destroy_buffer(buffers.index);
        }
        self.positions = Vec::new();
        self.normals = Vec::new();
        self.texcoords = Vec::new();
        self.indices = Vec::new();
        self.max_vertices = 0;
        self.index_count = 0;
        self.finalized = false;
    }
}

impl Default for WeldedMeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}
