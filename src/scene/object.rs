//! Scene instances and their per-part overrides.

use super::material::MaterialTable;
use super::matrix::TransformTable;
use crate::util::{Error, Result};
use std::collections::BTreeMap;

/// Per-part instance override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPart {
    pub active: bool,
    pub material_index: usize,
    pub matrix_index: usize,
}

/// One scene instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// First part in the scene-wide flattened object part list.
    pub part_offset: usize,
    pub matrix_index: usize,
    pub geometry_index: usize,
    pub face_ccw: bool,
    /// One override per geometry part.
    pub parts: Vec<ObjectPart>,
}

#[derive(Debug, Clone)]
struct PendingObject {
    geometry: usize,
    matrix: usize,
    face_ccw: bool,
    parts: BTreeMap<usize, ObjectPart>,
}

/// Tables the finished objects are checked against.
#[derive(Debug, Clone, Copy)]
pub struct ObjectLimits<'a> {
    /// Part count of every geometry.
    pub geometry_parts: &'a [usize],
    pub materials: &'a MaterialTable,
    pub matrices: &'a TransformTable,
}

/// Collects objects and part overrides, then checks them all at once.
///
/// Overrides are never defaulted: an object whose override list does not
/// match its geometry's part count fails [`ObjectTable::finalize`].
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    pending: Vec<PendingObject>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Add an object and return its handle.
    pub fn add_object(&mut self, geometry: usize, matrix: usize, face_ccw: bool) -> usize {
        self.pending.push(PendingObject {
            geometry,
            matrix,
            face_ccw,
            parts: BTreeMap::new(),
        });
        self.pending.len() - 1
    }

    /// Set the override of part `part` of `object`, drawn with the object's matrix.
    pub fn set_part_override(&mut self, object: usize, part: usize, material: usize, active: bool) -> Result<()> {
        let matrix = self.object(object)?.matrix;
        self.set_part(object, part, ObjectPart {
            active,
            material_index: material,
            matrix_index: matrix,
        })
    }

    /// Set the override of part `part` of `object` with its own matrix.
    ///
    /// `part` is only range-checked by [`finalize`](Self::finalize), once the
    /// geometry's part count is known.
    pub fn set_part(&mut self, object: usize, part: usize, value: ObjectPart) -> Result<()> {
        self.object_mut(object)?.parts.insert(part, value);
        Ok(())
    }

    fn object(&self, object: usize) -> Result<&PendingObject> {
        let count = self.pending.len();
        self.pending.get(object).ok_or(Error::InvalidHandle {
            kind: "object",
            handle: object,
            count,
        })
    }

    fn object_mut(&mut self, object: usize) -> Result<&mut PendingObject> {
        let count = self.pending.len();
        self.pending.get_mut(object).ok_or(Error::InvalidHandle {
            kind: "object",
            handle: object,
            count,
        })
    }

    /// Check every handle and part count, and assign flattened part offsets.
    pub fn finalize(self, limits: ObjectLimits<'_>) -> Result<Vec<ObjectEntry>> {
        let mut part_offset = 0;
        let mut objects = Vec::with_capacity(self.pending.len());
        for (index, mut obj) in self.pending.into_iter().enumerate() {
            let expected = *limits.geometry_parts.get(obj.geometry).ok_or(Error::InvalidHandle {
                kind: "geometry",
                handle: obj.geometry,
                count: limits.geometry_parts.len(),
            })?;
            limits.matrices.check(obj.matrix)?;

            // highest part set plus one; gaps below it surface as missing overrides
            let actual = obj.parts.keys().next_back().map_or(0, |&p| p.saturating_add(1));
            if actual != expected {
                return Err(Error::PartCountMismatch {
                    object: index,
                    expected,
                    actual,
                });
            }

            let mut parts = Vec::with_capacity(expected);
            for part in 0..expected {
                let value = obj
                    .parts
                    .remove(&part)
                    .ok_or(Error::MissingPartOverride { object: index, part })?;
                limits.materials.check(value.material_index)?;
                limits.matrices.check(value.matrix_index)?;
                parts.push(value);
            }

            objects.push(ObjectEntry {
                part_offset,
                matrix_index: obj.matrix,
                geometry_index: obj.geometry,
                face_ccw: obj.face_ccw,
                parts,
            });
            part_offset += expected;
        }
        Ok(objects)
    }
}
