//! Parsed scene handed to the loader.
//!
//! File parsing happens elsewhere; these types are the in-memory graph it
//! produces. Handles are plain indices into the sibling vectors.

use super::material::MaterialSide;
use crate::util::{Mat4, Vec3, Vec4};

/// Drawable index sub-range of a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartInput {
    pub index_offset: usize,
    pub index_count: usize,
}

/// Raw triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct MeshInput {
    pub positions: Vec<Vec3>,
    /// Per-vertex normals; generated from the triangles when absent.
    pub normals: Option<Vec<Vec3>>,
    /// Triangle list.
    pub indices: Vec<u32>,
    /// Parts in index order. Empty means one part over all indices.
    pub parts: Vec<PartInput>,
}

impl MeshInput {
    /// Mesh with a single part covering all indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: None,
            indices,
            parts: Vec::new(),
        }
    }

    /// Split the index list into parts of the given index counts.
    pub fn with_part_counts(mut self, counts: &[usize]) -> Self {
        let mut offset = 0;
        self.parts = counts
            .iter()
            .map(|&index_count| {
                let part = PartInput { index_offset: offset, index_count };
                offset += index_count;
                part
            })
            .collect();
        self
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Parts as declared, or the implicit whole-mesh part.
    pub fn effective_parts(&self) -> Vec<PartInput> {
        if self.parts.is_empty() {
            vec![PartInput {
                index_offset: 0,
                index_count: self.indices.len(),
            }]
        } else {
            self.parts.clone()
        }
    }
}

/// Two-sided material.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialInput {
    pub front: MaterialSide,
    pub back: MaterialSide,
}

impl MaterialInput {
    /// Same diffuse color on both sides.
    pub fn diffuse(color: Vec4) -> Self {
        let side = MaterialSide {
            diffuse: color,
            ..Default::default()
        };
        Self { front: side, back: side }
    }
}

/// Placement node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixInput {
    pub world: Mat4,
    pub object: Mat4,
    /// Debug color; a per-matrix hue is generated when `None`.
    pub color: Option<Vec4>,
}

impl MatrixInput {
    pub fn new(world: Mat4) -> Self {
        Self {
            world,
            object: world,
            color: None,
        }
    }
}

impl Default for MatrixInput {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

/// Override for one geometry part of an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectPartInput {
    pub active: bool,
    pub material: usize,
    /// Matrix for this part; the object's matrix when `None`.
    pub matrix: Option<usize>,
}

/// Scene instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInput {
    pub geometry: usize,
    pub matrix: usize,
    pub face_ccw: bool,
    /// One entry per geometry part, in part order.
    pub parts: Vec<ObjectPartInput>,
}

impl ObjectInput {
    /// Object drawing every part with one material.
    pub fn uniform(geometry: usize, matrix: usize, material: usize, part_count: usize) -> Self {
        Self {
            geometry,
            matrix,
            face_ccw: true,
            parts: vec![
                ObjectPartInput {
                    active: true,
                    material,
                    matrix: None,
                };
                part_count
            ],
        }
    }
}

/// Whole parsed scene.
#[derive(Clone, Debug, Default)]
pub struct SceneInput {
    pub materials: Vec<MaterialInput>,
    pub matrices: Vec<MatrixInput>,
    pub geometries: Vec<MeshInput>,
    pub objects: Vec<ObjectInput>,
}
