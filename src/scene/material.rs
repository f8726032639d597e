//! Material table: one 256-byte record per material.

use super::input::MaterialInput;
use super::UBO_RANGE_ALIGNMENT;
use crate::util::{Error, Result, Vec4};
use bytemuck::{Pod, Zeroable};

/// Shading parameters for one face side.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialSide {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub emissive: Vec4,
}

/// GPU material record, padded to one uniform-buffer binding range.
///
/// Bytes 0..128 hold the front and back sides, bytes 128..256 are `_pad`
/// and always zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialRecord {
    pub sides: [MaterialSide; 2],
    pub _pad: [u32; 32],
}

const _: () = assert!(std::mem::size_of::<MaterialRecord>() == UBO_RANGE_ALIGNMENT);

impl MaterialRecord {
    pub fn new(front: MaterialSide, back: MaterialSide) -> Self {
        Self {
            sides: [front, back],
            _pad: [0; 32],
        }
    }
}

impl From<&MaterialInput> for MaterialRecord {
    fn from(m: &MaterialInput) -> Self {
        Self::new(m.front, m.back)
    }
}

/// All materials of a scene, indexed by material handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialTable {
    records: Vec<MaterialRecord>,
}

impl MaterialTable {
    pub fn from_inputs(inputs: &[MaterialInput]) -> Self {
        Self {
            records: inputs.iter().map(MaterialRecord::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, handle: usize) -> Option<&MaterialRecord> {
        self.records.get(handle)
    }

    pub fn records(&self) -> &[MaterialRecord] {
        &self.records
    }

    /// Upload bytes; record `i` starts at `i * 256`.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    pub(crate) fn check(&self, handle: usize) -> Result<()> {
        if handle < self.records.len() {
            Ok(())
        } else {
            Err(Error::InvalidHandle {
                kind: "material",
                handle,
                count: self.records.len(),
            })
        }
    }
}
