//! Per-mesh packed buffers and draw ranges.

use super::input::{MeshInput, PartInput};
use super::vertex::{AttributeView, IndexFormat, VertexFormat, VertexView};
use crate::config::LoadConfig;
use crate::meshlet::{MeshletBuilder, MeshletTopology};
use crate::util::{alloc_bytes, BBox4f, Error, Result, Vec3};

/// Index range of a triangle draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawRange {
    pub first_index: u32,
    pub count: u32,
}

impl DrawRange {
    /// Byte offset into the index buffer.
    pub fn byte_offset(&self, format: IndexFormat) -> usize {
        self.first_index as usize * format.size()
    }
}

/// Range of clusters in a geometry's meshlet topology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshletRange {
    pub offset: u32,
    pub count: u32,
}

/// One drawable sub-range of a geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryPart {
    pub index_solid: DrawRange,
    pub mesh_solid: MeshletRange,
    /// Part is drawn through the cluster path.
    pub use_meshlets: bool,
}

/// Packed data of one unique mesh.
#[derive(Debug, Clone)]
pub struct GeometryEntry {
    pub(crate) num_vertices: usize,
    pub(crate) num_index_solid: usize,
    pub(crate) vertex_format: VertexFormat,
    pub(crate) index_format: IndexFormat,

    pub(crate) vbo_data: Vec<u8>,
    pub(crate) abo_data: Vec<u8>,
    pub(crate) ibo_data: Vec<u8>,
    pub(crate) meshlet: Option<MeshletTopology>,

    pub(crate) vbo_size: usize,
    pub(crate) abo_size: usize,
    pub(crate) ibo_size: usize,
    pub(crate) mesh_size: usize,
    pub(crate) mesh_indices_size: usize,

    pub(crate) parts: Vec<GeometryPart>,
    /// First part in the scene-wide flattened part list.
    pub(crate) part_offset: usize,
    /// First part bbox in `SceneModel::part_bboxes`.
    pub(crate) part_bbox_offset: usize,
    pub(crate) bbox: BBox4f,
}

/// Result of building one geometry, before scene-wide offsets are known.
#[derive(Debug)]
pub(crate) struct BuiltGeometry {
    pub entry: GeometryEntry,
    pub part_bboxes: Vec<BBox4f>,
}

impl GeometryEntry {
    /// Validate, encode and cluster one mesh.
    #[tracing::instrument(skip_all, fields(geometry = index, vertices = mesh.positions.len(), indices = mesh.indices.len()))]
    pub(crate) fn build(index: usize, mesh: &MeshInput, cfg: &LoadConfig) -> Result<BuiltGeometry> {
        let num_vertices = mesh.positions.len();
        let num_indices = mesh.indices.len();

        if num_indices % 3 != 0 {
            return Err(Error::IndexCountNotTriangles {
                geometry: index,
                count: num_indices,
            });
        }
        if let Some((position, &bad)) = mesh
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= num_vertices)
        {
            return Err(Error::IndexOutOfRange {
                geometry: index,
                position,
                index: bad,
                vertex_count: num_vertices,
            });
        }
        if let Some(normals) = &mesh.normals {
            if normals.len() != num_vertices {
                return Err(Error::AttributeCountMismatch {
                    geometry: index,
                    expected: num_vertices,
                    actual: normals.len(),
                });
            }
        }
        let part_inputs = mesh.effective_parts();
        check_parts(index, &part_inputs, num_indices)?;

        let vertex_format = VertexFormat {
            fp16: cfg.fp16,
            extra_attributes: cfg.extra_attributes,
        };
        let index_format = IndexFormat::for_vertex_count(num_vertices, cfg.allow_shorts);

        let positions: Vec<Vec3> = mesh.positions.iter().map(|p| *p * cfg.scale).collect();
        let generated;
        let normals = match &mesh.normals {
            Some(n) => n.as_slice(),
            None => {
                generated = vertex_normals(&positions, &mesh.indices);
                generated.as_slice()
            }
        };

        let vbo_size = num_vertices * vertex_format.vertex_size();
        let abo_size = num_vertices * vertex_format.attribute_size();
        let ibo_size = num_indices * index_format.size();

        let mut vbo_data = alloc_bytes("vertex buffer", vbo_size)?;
        let mut abo_data = alloc_bytes("attribute buffer", abo_size)?;
        let mut ibo_data = alloc_bytes("index buffer", ibo_size)?;

        let mut extent = BBox4f::EMPTY;
        for p in &positions {
            extent.merge_point(p.extend(1.0));
        }
        let extent_size = extent.size().max(Vec3::splat(f32::EPSILON));

        for (p, n) in positions.iter().zip(normals) {
            vertex_format.push_vec4(&mut vbo_data, p.extend(1.0));
            let normal = n.normalize_or_zero().extend(0.0);
            vertex_format.push_vec4(&mut abo_data, normal);
            for _ in 0..vertex_format.extra_attributes {
                let extra = if cfg.colorize_extra {
                    ((*p - extent.min.truncate()) / extent_size).extend(1.0)
                } else {
                    normal
                };
                vertex_format.push_vec4(&mut abo_data, extra);
            }
        }
        index_format.push_indices(&mut ibo_data, &mesh.indices);

        debug_assert_eq!(vbo_data.len(), vbo_size);
        debug_assert_eq!(abo_data.len(), abo_size);
        debug_assert_eq!(ibo_data.len(), ibo_size);

        let view = VertexView::new(&vbo_data, vertex_format);
        let part_bboxes: Vec<BBox4f> = part_inputs
            .iter()
            .map(|part| {
                let mut bbox = BBox4f::EMPTY;
                for &i in &mesh.indices[part.index_offset..part.index_offset + part.index_count] {
                    if let Some(p) = view.position(i as usize) {
                        bbox.merge_point(p);
                    }
                }
                bbox
            })
            .collect();
        let mut bbox = BBox4f::EMPTY;
        for b in &part_bboxes {
            bbox.merge(b);
        }

        let mut parts: Vec<GeometryPart> = part_inputs
            .iter()
            .map(|p| GeometryPart {
                index_solid: DrawRange {
                    first_index: p.index_offset as u32,
                    count: p.index_count as u32,
                },
                ..Default::default()
            })
            .collect();

        let meshlet = if cfg.build_meshlets {
            let builder = MeshletBuilder::from_config(cfg);
            let mut clusters = Vec::new();
            for (part, input) in parts.iter_mut().zip(&part_inputs) {
                let range = &mesh.indices[input.index_offset..input.index_offset + input.index_count];
                let built = builder
                    .build(range, input.index_offset / 3)
                    .map_err(|e| e.with_geometry(index))?;
                part.mesh_solid = MeshletRange {
                    offset: clusters.len() as u32,
                    count: built.len() as u32,
                };
                part.use_meshlets = !built.is_empty();
                clusters.extend(built);
            }
            Some(MeshletTopology::pack(&clusters, index_format, view)?)
        } else {
            None
        };
        let (mesh_size, mesh_indices_size) = meshlet
            .as_ref()
            .map_or((0, 0), |m| (m.desc_size(), m.prim_size()));

        tracing::debug!(
            geometry = index,
            parts = parts.len(),
            meshlets = meshlet.as_ref().map_or(0, |m| m.num_meshlets()),
            "built geometry"
        );

        Ok(BuiltGeometry {
            entry: GeometryEntry {
                num_vertices,
                num_index_solid: num_indices,
                vertex_format,
                index_format,
                vbo_data,
                abo_data,
                ibo_data,
                meshlet,
                vbo_size,
                abo_size,
                ibo_size,
                mesh_size,
                mesh_indices_size,
                parts,
                part_offset: 0,
                part_bbox_offset: 0,
                bbox,
            },
            part_bboxes,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_index_solid(&self) -> usize {
        self.num_index_solid
    }

    pub fn num_triangles(&self) -> usize {
        self.num_index_solid / 3
    }

    /// Indices are 16-bit.
    pub fn use_shorts(&self) -> bool {
        self.index_format == IndexFormat::U16
    }

    /// Vertex streams are half precision.
    pub fn use_fp16(&self) -> bool {
        self.vertex_format.fp16
    }

    pub fn vertex_format(&self) -> VertexFormat {
        self.vertex_format
    }

    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    pub fn vbo_data(&self) -> &[u8] {
        &self.vbo_data
    }

    pub fn abo_data(&self) -> &[u8] {
        &self.abo_data
    }

    pub fn ibo_data(&self) -> &[u8] {
        &self.ibo_data
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

    /// Meshlet descriptor buffer size (0 without meshlets).
    pub fn mesh_size(&self) -> usize {
        self.mesh_size
    }

    /// Meshlet primitive buffer size (0 without meshlets).
    pub fn mesh_indices_size(&self) -> usize {
        self.mesh_indices_size
    }

    pub fn meshlet(&self) -> Option<&MeshletTopology> {
        self.meshlet.as_ref()
    }

    pub fn parts(&self) -> &[GeometryPart] {
        &self.parts
    }

    pub fn part_offset(&self) -> usize {
        self.part_offset
    }

    pub fn part_bbox_offset(&self) -> usize {
        self.part_bbox_offset
    }

    /// Local bbox, merge of all part bboxes.
    pub fn bbox(&self) -> &BBox4f {
        &self.bbox
    }

    pub fn positions(&self) -> VertexView<'_> {
        VertexView::new(&self.vbo_data, self.vertex_format)
    }

    pub fn attributes(&self) -> AttributeView<'_> {
        AttributeView::new(&self.abo_data, self.vertex_format)
    }

    /// Index `i` of the index buffer.
    pub fn index(&self, i: usize) -> Option<u32> {
        self.index_format.read(&self.ibo_data, i)
    }
}

/// Parts must tile the index buffer in order: start at 0, no gaps or
/// overlaps, whole triangles, end at the last index.
fn check_parts(geometry: usize, parts: &[PartInput], total: usize) -> Result<()> {
    let mut expected = 0usize;
    for (part, p) in parts.iter().enumerate() {
        let end = p.index_offset.checked_add(p.index_count);
        if end.map_or(true, |end| end > total) || p.index_count % 3 != 0 {
            return Err(Error::PartOutOfRange {
                geometry,
                part,
                offset: p.index_offset,
                count: p.index_count,
                total,
            });
        }
        if p.index_offset != expected {
            return Err(Error::PartsNotContiguous {
                geometry,
                part,
                expected,
            });
        }
        expected += p.index_count;
    }
    if expected != total {
        return Err(Error::PartsNotContiguous {
            geometry,
            part: parts.len(),
            expected,
        });
    }
    Ok(())
}

/// Area-weighted vertex normals.
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Z
            } else {
                n
            }
        })
        .collect()
}
