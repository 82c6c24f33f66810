//! Common types shared between backends

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage(u32);

impl BufferUsage {
    pub const MAP_WRITE: Self = Self(1 << 0);
    pub const COPY_DST: Self = Self(1 << 1);
    pub const INDEX: Self = Self(1 << 2);
    pub const VERTEX: Self = Self(1 << 3);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Expected upload frequency for a buffer.
///
/// A hint only; backends may use it to place the allocation but must not
/// reject re-uploads to a `Static` buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageHint {
    /// Uploaded once, drawn many times.
    #[default]
    Static,
    /// Re-uploaded regularly (per-frame streaming or procedural updates).
    Dynamic,
}

/// Buffer descriptor
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    pub size: u64,
    pub usage: BufferUsage,
    pub hint: UsageHint,
}

impl BufferDescriptor {
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
            hint: UsageHint::Static,
        }
    }

    pub fn with_hint(mut self, hint: UsageHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Vertex attribute format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    /// Size of one element in bytes.
    pub fn size(&self) -> u64 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }

    /// Number of float components per element.
    pub fn components(&self) -> usize {
        match self {
            VertexFormat::Float32x2 => 2,
            VertexFormat::Float32x3 => 3,
            VertexFormat::Float32x4 => 4,
        }
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    LineLoop,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

/// Index format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

/// The fixed set of vertex attribute binding slots.
///
/// Batches never choose binding indices dynamically; every attribute stream
/// binds to one of these well-known slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeIndex {
    Position,
    Normal,
    Color,
    TexCoord0,
    TexCoord1,
    TexCoord2,
    TexCoord3,
}

impl AttributeIndex {
    /// The four texture-coordinate slots, in unit order.
    pub const TEXCOORDS: [AttributeIndex; 4] = [
        AttributeIndex::TexCoord0,
        AttributeIndex::TexCoord1,
        AttributeIndex::TexCoord2,
        AttributeIndex::TexCoord3,
    ];

    /// Shader-facing binding location.
    pub fn location(self) -> u32 {
        match self {
            AttributeIndex::Position => 0,
            AttributeIndex::Normal => 1,
            AttributeIndex::Color => 2,
            AttributeIndex::TexCoord0 => 3,
            AttributeIndex::TexCoord1 => 4,
            AttributeIndex::TexCoord2 => 5,
            AttributeIndex::TexCoord3 => 6,
        }
    }
}
