//! Packed vertex and index formats.
//!
//! Every geometry stores two vertex streams: positions (one vec4 per vertex)
//! and attributes (normal vec4 followed by `extra_attributes` vec4 slots).
//! Components are either f32 or IEEE half floats, fixed per scene. The views
//! here are the only place that knows the stride, so consumers never do
//! byte arithmetic themselves.

use crate::util::Vec4;
use half::f16;

/// Stride description shared by all geometries of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexFormat {
    pub fp16: bool,
    pub extra_attributes: u32,
}

impl VertexFormat {
    /// Bytes per vec4 component group.
    #[inline]
    pub const fn vec4_size(&self) -> usize {
        if self.fp16 {
            4 * std::mem::size_of::<f16>()
        } else {
            4 * std::mem::size_of::<f32>()
        }
    }

    /// Bytes per vertex in the position stream.
    #[inline]
    pub const fn vertex_size(&self) -> usize {
        self.vec4_size()
    }

    /// Bytes per vertex in the attribute stream.
    #[inline]
    pub const fn attribute_size(&self) -> usize {
        self.vec4_size() * (1 + self.extra_attributes as usize)
    }

    /// Append one vec4 in this format.
    #[inline]
    pub(crate) fn push_vec4(&self, out: &mut Vec<u8>, v: Vec4) {
        if self.fp16 {
            let h = v.to_array().map(f16::from_f32);
            out.extend_from_slice(bytemuck::bytes_of(&h));
        } else {
            out.extend_from_slice(bytemuck::bytes_of(&v.to_array()));
        }
    }

    #[inline]
    fn read_vec4(&self, bytes: &[u8]) -> Vec4 {
        if self.fp16 {
            let h: [f16; 4] = bytemuck::pod_read_unaligned(&bytes[..8]);
            Vec4::from_array(h.map(f16::to_f32))
        } else {
            Vec4::from_array(bytemuck::pod_read_unaligned(&bytes[..16]))
        }
    }
}

/// Index width of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    /// Narrowest width allowed for `num_vertices`. 0xFFFF stays reserved as
    /// the primitive restart value.
    pub fn for_vertex_count(num_vertices: usize, allow_shorts: bool) -> Self {
        if allow_shorts && num_vertices <= u16::MAX as usize {
            Self::U16
        } else {
            Self::U32
        }
    }

    /// Bytes per index.
    #[inline]
    pub const fn size(&self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Append indices in this width.
    pub(crate) fn push_indices(&self, out: &mut Vec<u8>, indices: &[u32]) {
        match self {
            Self::U16 => {
                for &i in indices {
                    out.extend_from_slice(bytemuck::bytes_of(&(i as u16)));
                }
            }
            Self::U32 => out.extend_from_slice(bytemuck::cast_slice(indices)),
        }
    }

    /// Read index `i` from a packed buffer.
    pub fn read(&self, data: &[u8], i: usize) -> Option<u32> {
        let size = self.size();
        let bytes = data.get(i * size..(i + 1) * size)?;
        Some(match self {
            Self::U16 => bytemuck::pod_read_unaligned::<u16>(bytes) as u32,
            Self::U32 => bytemuck::pod_read_unaligned::<u32>(bytes),
        })
    }
}

/// Typed read access to a packed position stream.
#[derive(Clone, Copy)]
pub struct VertexView<'a> {
    data: &'a [u8],
    format: VertexFormat,
}

impl<'a> VertexView<'a> {
    pub fn new(data: &'a [u8], format: VertexFormat) -> Self {
        Self { data, format }
    }

    /// Number of vertices in the stream.
    pub fn len(&self) -> usize {
        self.data.len() / self.format.vertex_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of vertex `i`, w = 1.
    pub fn position(&self, i: usize) -> Option<Vec4> {
        let stride = self.format.vertex_size();
        let bytes = self.data.get(i * stride..(i + 1) * stride)?;
        Some(self.format.read_vec4(bytes))
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec4> + '_ {
        (0..self.len()).filter_map(move |i| self.position(i))
    }
}

/// Typed read access to a packed attribute stream.
#[derive(Clone, Copy)]
pub struct AttributeView<'a> {
    data: &'a [u8],
    format: VertexFormat,
}

impl<'a> AttributeView<'a> {
    pub fn new(data: &'a [u8], format: VertexFormat) -> Self {
        Self { data, format }
    }

    /// Number of vertices in the stream.
    pub fn len(&self) -> usize {
        self.data.len() / self.format.attribute_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normal of vertex `i`, w = 0.
    pub fn normal(&self, i: usize) -> Option<Vec4> {
        self.slot(i, 0)
    }

    /// Extra attribute `slot` (0-based, after the normal) of vertex `i`.
    pub fn extra(&self, i: usize, slot: u32) -> Option<Vec4> {
        if slot >= self.format.extra_attributes {
            return None;
        }
        self.slot(i, slot as usize + 1)
    }

    fn slot(&self, i: usize, slot: usize) -> Option<Vec4> {
        let start = i * self.format.attribute_size() + slot * self.format.vec4_size();
        let bytes = self.data.get(start..start + self.format.vec4_size())?;
        Some(self.format.read_vec4(bytes))
    }
}
