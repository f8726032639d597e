//! Draw range helpers for building indirect argument buffers.

use super::geometry::{DrawRange, MeshletRange};
use bytemuck::{Pod, Zeroable};

/// One drawable object part with every handle resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub object: usize,
    pub geometry: usize,
    pub part: usize,
    pub material: usize,
    pub matrix: usize,
    pub face_ccw: bool,
    pub index: DrawRange,
    pub meshlet: MeshletRange,
}

/// Indexed indirect draw arguments (20 bytes, GL/Vulkan layout).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndirectElements {
    pub count: u32,
    pub prim_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub base_instance: u32,
}

impl Default for DrawIndirectElements {
    fn default() -> Self {
        Self {
            count: 0,
            prim_count: 1,
            first_index: 0,
            base_vertex: 0,
            base_instance: 0,
        }
    }
}

impl From<&DrawItem> for DrawIndirectElements {
    /// `base_instance` carries the matrix handle so shaders can fetch the
    /// placement record without a separate binding per draw.
    fn from(item: &DrawItem) -> Self {
        Self {
            count: item.index.count,
            first_index: item.index.first_index,
            base_instance: item.matrix as u32,
            ..Default::default()
        }
    }
}
