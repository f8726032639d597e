//! Whole-scene aggregate built by a single load pass.

use super::draw::{DrawIndirectElements, DrawItem};
use super::geometry::{BuiltGeometry, GeometryEntry};
use super::input::{MatrixInput, MeshInput, ObjectInput, SceneInput};
use super::material::MaterialTable;
use super::matrix::TransformTable;
use super::object::{ObjectEntry, ObjectLimits, ObjectPart, ObjectTable};
use super::vertex::VertexFormat;
use crate::config::LoadConfig;
use crate::util::{BBox4f, Mat4, Result, Vec3};
use rayon::prelude::*;
use std::borrow::Cow;

/// Spacing of clone copies, relative to the scene extent.
const CLONE_SPACING: f32 = 1.25;

/// Loaded scene. Read-only once [`SceneModel::load`] returns.
#[derive(Debug, Clone)]
pub struct SceneModel {
    materials: MaterialTable,
    matrices: TransformTable,
    geometry: Vec<GeometryEntry>,
    objects: Vec<ObjectEntry>,

    part_bboxes: Vec<BBox4f>,
    object_bboxes: Vec<BBox4f>,
    bbox: BBox4f,
    bbox_instanced: BBox4f,

    vbo_size: usize,
    abo_size: usize,
    ibo_size: usize,
    mesh_size: usize,
    num_geometry_parts: usize,
    num_object_parts: usize,

    num_orig_geometries: usize,
    num_orig_matrices: usize,
    num_orig_objects: usize,

    cfg: LoadConfig,
}

impl SceneModel {
    /// Build the packed model from a parsed scene.
    ///
    /// All-or-nothing: the first geometry or object that fails validation
    /// aborts the load.
    pub fn load(input: &SceneInput, cfg: &LoadConfig) -> Result<Self> {
        Self::load_with_clones(input, cfg, 0, 0)
    }

    /// Like [`load`](Self::load), then repeat every matrix and object
    /// `clones` more times on a grid over the axes in `clone_axis`
    /// (bit 0 x, bit 1 y, bit 2 z; 0 means x). Geometry is shared.
    #[tracing::instrument(skip_all, fields(geometries = input.geometries.len(), objects = input.objects.len(), clones = clones))]
    pub fn load_with_clones(input: &SceneInput, cfg: &LoadConfig, clones: u32, clone_axis: u32) -> Result<Self> {
        cfg.validate()?;

        let built = build_geometries(&input.geometries, cfg)?;

        let mut geometry = Vec::with_capacity(built.len());
        let mut part_bboxes = Vec::new();
        let mut num_geometry_parts = 0;
        for BuiltGeometry { mut entry, part_bboxes: parts } in built {
            entry.part_offset = num_geometry_parts;
            entry.part_bbox_offset = part_bboxes.len();
            num_geometry_parts += entry.parts.len();
            part_bboxes.extend(parts);
            geometry.push(entry);
        }

        let mut bbox = BBox4f::EMPTY;
        for g in &geometry {
            bbox.merge(&g.bbox);
        }

        let (matrices_in, objects_in) = if clones > 0 {
            let (m, o) = clone_instances(input, &geometry, cfg.scale, clones, clone_axis);
            (Cow::Owned(m), Cow::Owned(o))
        } else {
            (Cow::Borrowed(&input.matrices), Cow::Borrowed(&input.objects))
        };

        let materials = MaterialTable::from_inputs(&input.materials);
        let mut matrices = TransformTable::from_inputs(&matrices_in, cfg.scale);

        let mut table = ObjectTable::new();
        for obj in objects_in.iter() {
            let handle = table.add_object(obj.geometry, obj.matrix, obj.face_ccw);
            for (part, p) in obj.parts.iter().enumerate() {
                table.set_part(handle, part, ObjectPart {
                    active: p.active,
                    material_index: p.material,
                    matrix_index: p.matrix.unwrap_or(obj.matrix),
                })?;
            }
        }
        let geometry_parts: Vec<usize> = geometry.iter().map(|g| g.parts.len()).collect();
        let objects = table.finalize(ObjectLimits {
            geometry_parts: &geometry_parts,
            materials: &materials,
            matrices: &matrices,
        })?;
        let num_object_parts: usize = objects.iter().map(|o| o.parts.len()).sum();

        let mut matrix_bboxes = vec![BBox4f::EMPTY; matrices.len()];
        let mut object_bboxes = Vec::with_capacity(objects.len());
        let mut bbox_instanced = BBox4f::EMPTY;
        for obj in &objects {
            let local = &geometry[obj.geometry_index].bbox;
            matrix_bboxes[obj.matrix_index].merge(local);

            let world = matrices.records()[obj.matrix_index].world_matrix;
            let instanced = local.transformed(&world, 3);
            bbox_instanced.merge(&instanced);
            object_bboxes.push(instanced);
        }
        for (record, b) in matrices.records_mut().iter_mut().zip(&matrix_bboxes) {
            record.set_bbox(b);
        }

        let scene = Self {
            vbo_size: geometry.iter().map(|g| g.vbo_size).sum(),
            abo_size: geometry.iter().map(|g| g.abo_size).sum(),
            ibo_size: geometry.iter().map(|g| g.ibo_size).sum(),
            mesh_size: geometry.iter().map(|g| g.mesh_size + g.mesh_indices_size).sum(),
            num_geometry_parts,
            num_object_parts,
            num_orig_geometries: input.geometries.len(),
            num_orig_matrices: input.matrices.len(),
            num_orig_objects: input.objects.len(),
            materials,
            matrices,
            geometry,
            objects,
            part_bboxes,
            object_bboxes,
            bbox,
            bbox_instanced,
            cfg: cfg.clone(),
        };

        if cfg.verbose {
            tracing::info!(
                geometries = scene.geometry.len(),
                objects = scene.objects.len(),
                materials = scene.materials.len(),
                matrices = scene.matrices.len(),
                geometry_parts = scene.num_geometry_parts,
                object_parts = scene.num_object_parts,
                vbo = scene.vbo_size,
                ibo = scene.ibo_size,
                meshlets = scene.mesh_size,
                "scene loaded"
            );
        }
        Ok(scene)
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn matrices(&self) -> &TransformTable {
        &self.matrices
    }

    pub fn geometry(&self) -> &[GeometryEntry] {
        &self.geometry
    }

    pub fn objects(&self) -> &[ObjectEntry] {
        &self.objects
    }

    /// Local bbox of every geometry part, indexed through
    /// [`GeometryEntry::part_bbox_offset`].
    pub fn part_bboxes(&self) -> &[BBox4f] {
        &self.part_bboxes
    }

    /// World-space bbox of every object.
    pub fn object_bboxes(&self) -> &[BBox4f] {
        &self.object_bboxes
    }

    /// Merge of all geometry bboxes, in object space.
    pub fn bbox(&self) -> &BBox4f {
        &self.bbox
    }

    /// Merge of all object bboxes, in world space.
    pub fn bbox_instanced(&self) -> &BBox4f {
        &self.bbox_instanced
    }

    pub fn config(&self) -> &LoadConfig {
        &self.cfg
    }

    pub fn vertex_format(&self) -> VertexFormat {
        VertexFormat {
            fp16: self.cfg.fp16,
            extra_attributes: self.cfg.extra_attributes,
        }
    }

    /// Bytes per vertex in every geometry's position stream.
    pub fn vertex_size(&self) -> usize {
        self.vertex_format().vertex_size()
    }

    /// Bytes per vertex in every geometry's attribute stream.
    pub fn vertex_attribute_size(&self) -> usize {
        self.vertex_format().attribute_size()
    }

    pub fn vbo_size(&self) -> usize {
        self.vbo_size
    }

    pub fn abo_size(&self) -> usize {
        self.abo_size
    }

    pub fn ibo_size(&self) -> usize {
        self.ibo_size
    }

    /// Descriptor plus primitive bytes over all meshlet topologies.
    pub fn mesh_size(&self) -> usize {
        self.mesh_size
    }

    pub fn num_geometry_parts(&self) -> usize {
        self.num_geometry_parts
    }

    pub fn num_object_parts(&self) -> usize {
        self.num_object_parts
    }

    pub fn num_orig_geometries(&self) -> usize {
        self.num_orig_geometries
    }

    pub fn num_orig_matrices(&self) -> usize {
        self.num_orig_matrices
    }

    pub fn num_orig_objects(&self) -> usize {
        self.num_orig_objects
    }

    /// One item per active, non-empty object part, in object then part order.
    pub fn draw_items(&self) -> Vec<DrawItem> {
        let mut items = Vec::with_capacity(self.num_object_parts);
        for (object, obj) in self.objects.iter().enumerate() {
            let geo = &self.geometry[obj.geometry_index];
            for (part, (op, gp)) in obj.parts.iter().zip(&geo.parts).enumerate() {
                if !op.active || gp.index_solid.count == 0 {
                    continue;
                }
                items.push(DrawItem {
                    object,
                    geometry: obj.geometry_index,
                    part,
                    material: op.material_index,
                    matrix: op.matrix_index,
                    face_ccw: obj.face_ccw,
                    index: gp.index_solid,
                    meshlet: gp.mesh_solid,
                });
            }
        }
        items
    }

    /// Indexed indirect draw arguments for [`draw_items`](Self::draw_items).
    pub fn indirect_elements(&self) -> Vec<DrawIndirectElements> {
        self.draw_items().iter().map(DrawIndirectElements::from).collect()
    }
}

fn build_geometries(meshes: &[MeshInput], cfg: &LoadConfig) -> Result<Vec<BuiltGeometry>> {
    let build = |(index, mesh): (usize, &MeshInput)| {
        GeometryEntry::build(index, mesh, cfg).inspect_err(|e| {
            tracing::warn!(geometry = index, error = %e, "geometry rejected");
        })
    };
    if cfg.parallel {
        meshes.par_iter().enumerate().map(build).collect()
    } else {
        meshes.iter().enumerate().map(build).collect()
    }
}

/// Smallest side length `s` with `s^axes >= copies`.
fn grid_side(copies: u32, axes: u32) -> u32 {
    let mut side = 1u32;
    while side.saturating_pow(axes) < copies {
        side += 1;
    }
    side
}

/// Repeat matrices and objects for clone copies `1..=clones`.
fn clone_instances(
    input: &SceneInput,
    geometry: &[GeometryEntry],
    scale: f32,
    clones: u32,
    clone_axis: u32,
) -> (Vec<MatrixInput>, Vec<ObjectInput>) {
    // extent of the uncloned placement, in unscaled input space
    let mut extent = BBox4f::EMPTY;
    for obj in &input.objects {
        if let (Some(g), Some(m)) = (geometry.get(obj.geometry), input.matrices.get(obj.matrix)) {
            let world = crate::util::scale_translation(&m.world, scale);
            extent.merge(&g.bbox.transformed(&world, 3));
        }
    }
    let size = extent.size() / scale;
    let step = Vec3::new(
        if size.x > 0.0 { size.x } else { 1.0 },
        if size.y > 0.0 { size.y } else { 1.0 },
        if size.z > 0.0 { size.z } else { 1.0 },
    ) * CLONE_SPACING;

    let axis_mask = if clone_axis & 7 == 0 { 1 } else { clone_axis & 7 };
    let axes: Vec<usize> = (0..3).filter(|a| axis_mask & (1 << a) != 0).collect();
    let side = grid_side(clones + 1, axes.len() as u32);

    let num_matrices = input.matrices.len();
    let mut matrices = input.matrices.clone();
    let mut objects = input.objects.clone();
    for copy in 1..=clones {
        let mut offset = Vec3::ZERO;
        let mut rest = copy;
        for &a in &axes {
            offset[a] = (rest % side) as f32 * step[a];
            rest /= side;
        }
        let shift = Mat4::from_translation(offset);

        for m in &input.matrices {
            matrices.push(MatrixInput {
                world: shift * m.world,
                object: m.object,
                color: m.color,
            });
        }
        let base = copy as usize * num_matrices;
        for obj in &input.objects {
            let mut obj = obj.clone();
            obj.matrix += base;
            for p in &mut obj.parts {
                if let Some(m) = p.matrix.as_mut() {
                    *m += base;
                }
            }
            objects.push(obj);
        }
    }
    (matrices, objects)
}
