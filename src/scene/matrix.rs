//! Transform table: one 256-byte placement record per matrix handle.

use super::input::MatrixInput;
use super::UBO_RANGE_ALIGNMENT;
use crate::util::{inverse_transpose, winding, BBox4f, Error, Mat4, Result, Vec3, Vec4};
use bytemuck::{Pod, Zeroable};

/// GPU placement record.
///
/// Bytes 0..192 hold the three matrices, 192..224 the bbox, 224..236 are
/// `_pad0` (zero), 236..240 the winding sign, 240..256 the color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformRecord {
    pub world_matrix: Mat4,
    pub world_matrix_it: Mat4,
    pub object_matrix: Mat4,
    pub bbox_min: Vec4,
    pub bbox_max: Vec4,
    pub _pad0: [f32; 3],
    /// -1 for mirroring transforms, +1 otherwise.
    pub winding: f32,
    pub color: Vec4,
}

const _: () = assert!(std::mem::size_of::<TransformRecord>() == UBO_RANGE_ALIGNMENT);

impl TransformRecord {
    pub fn new(world: Mat4, object: Mat4, color: Vec4) -> Self {
        Self {
            world_matrix: world,
            world_matrix_it: inverse_transpose(&world),
            object_matrix: object,
            bbox_min: Vec4::ZERO,
            bbox_max: Vec4::ZERO,
            _pad0: [0.0; 3],
            winding: winding(&world),
            color,
        }
    }

    /// Store the local bbox drawn with this matrix; empty boxes store zeros.
    pub(crate) fn set_bbox(&mut self, bbox: &BBox4f) {
        if bbox.is_empty() {
            self.bbox_min = Vec4::ZERO;
            self.bbox_max = Vec4::ZERO;
        } else {
            self.bbox_min = bbox.min;
            self.bbox_max = bbox.max;
        }
    }
}

/// Deterministic debug color for matrix `index`.
pub(crate) fn matrix_color(index: usize) -> Vec4 {
    // golden-ratio hue walk
    let hue = (index as f32 * 0.618_034).fract();
    let rgb = (Vec3::splat(hue * 6.0) - Vec3::new(3.0, 2.0, 4.0)).abs() * Vec3::new(1.0, -1.0, -1.0)
        + Vec3::new(-1.0, 2.0, 2.0);
    rgb.clamp(Vec3::ZERO, Vec3::ONE).extend(1.0)
}

/// All placement records of a scene, indexed by matrix handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformTable {
    records: Vec<TransformRecord>,
}

impl TransformTable {
    /// Build records; `scale` is applied to the translation columns.
    pub fn from_inputs(inputs: &[MatrixInput], scale: f32) -> Self {
        let records = inputs
            .iter()
            .enumerate()
            .map(|(i, m)| {
                TransformRecord::new(
                    crate::util::scale_translation(&m.world, scale),
                    crate::util::scale_translation(&m.object, scale),
                    m.color.unwrap_or_else(|| matrix_color(i)),
                )
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, handle: usize) -> Option<&TransformRecord> {
        self.records.get(handle)
    }

    pub fn records(&self) -> &[TransformRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [TransformRecord] {
        &mut self.records
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
                kind: "matrix",
                handle,
                count: self.records.len(),
            })
        }
    }
}
