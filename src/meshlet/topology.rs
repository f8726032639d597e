//! Packed meshlet buffers consumed by cluster draw paths.
//!
//! Layout of the primitive buffer, per cluster, in descriptor order:
//! - vertex remap block: global vertex indices in the geometry's index width
//! - local triangle block: 3 bytes per triangle
//!
//! Both blocks start on a 4-byte boundary; tail bytes are zero.

use super::builder::Cluster;
use crate::scene::vertex::{IndexFormat, VertexView};
use crate::util::{alloc_bytes, BBox4f, Result};
use bytemuck::{Pod, Zeroable};

/// Per-cluster descriptor (48 bytes, matches the shader-side struct).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshletDesc {
    pub bbox_min: [f32; 3],
    /// Byte offset of the vertex remap block in the primitive buffer.
    pub vertex_offset: u32,
    pub bbox_max: [f32; 3],
    /// Byte offset of the local triangle block in the primitive buffer.
    pub prim_offset: u32,
    pub vertex_count: u32,
    pub prim_count: u32,
    pub _pad: [u32; 2],
}

const _: () = assert!(std::mem::size_of::<MeshletDesc>() == 48);

#[inline]
const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

/// Decoded view of one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshletCluster {
    pub vertices: Vec<u32>,
    pub triangles: Vec<[u8; 3]>,
}

impl MeshletCluster {
    /// Triangles with global vertex indices.
    pub fn global_triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangles
            .iter()
            .map(|t| t.map(|l| self.vertices[l as usize]))
    }
}

/// Cluster acceleration structure of one geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshletTopology {
    desc_data: Vec<u8>,
    prim_data: Vec<u8>,
    num_meshlets: u32,
    index_format: IndexFormat,
}

impl MeshletTopology {
    /// Pack clusters into descriptor and primitive buffers.
    ///
    /// Sizes are computed up front and the buffers allocated exactly once,
    /// so `desc_size()`/`prim_size()` are valid upload sizes.
    pub fn pack(clusters: &[Cluster], index_format: IndexFormat, positions: VertexView<'_>) -> Result<Self> {
        let desc_size = clusters.len() * std::mem::size_of::<MeshletDesc>();
        let prim_size: usize = clusters
            .iter()
            .map(|c| align4(c.vertices.len() * index_format.size()) + align4(c.triangles.len() * 3))
            .sum();

        let mut desc_data = alloc_bytes("meshlet descriptors", desc_size)?;
        let mut prim_data = alloc_bytes("meshlet primitives", prim_size)?;

        for cluster in clusters {
            let mut bbox = BBox4f::EMPTY;
            for &v in &cluster.vertices {
                if let Some(p) = positions.position(v as usize) {
                    bbox.merge_point(p);
                }
            }

            let vertex_offset = prim_data.len();
            index_format.push_indices(&mut prim_data, &cluster.vertices);
            prim_data.resize(align4(prim_data.len()), 0);

            let prim_offset = prim_data.len();
            for tri in &cluster.triangles {
                prim_data.extend_from_slice(tri);
            }
            prim_data.resize(align4(prim_data.len()), 0);

            let desc = MeshletDesc {
                bbox_min: bbox.min.truncate().to_array(),
                vertex_offset: vertex_offset as u32,
                bbox_max: bbox.max.truncate().to_array(),
                prim_offset: prim_offset as u32,
                vertex_count: cluster.vertices.len() as u32,
                prim_count: cluster.triangles.len() as u32,
                _pad: [0; 2],
            };
            desc_data.extend_from_slice(bytemuck::bytes_of(&desc));
        }

        debug_assert_eq!(desc_data.len(), desc_size);
        debug_assert_eq!(prim_data.len(), prim_size);

        Ok(Self {
            desc_data,
            prim_data,
            num_meshlets: clusters.len() as u32,
            index_format,
        })
    }

    pub fn num_meshlets(&self) -> u32 {
        self.num_meshlets
    }

    /// Descriptor buffer bytes.
    pub fn desc_data(&self) -> &[u8] {
        &self.desc_data
    }

    /// Primitive buffer bytes.
    pub fn prim_data(&self) -> &[u8] {
        &self.prim_data
    }

    pub fn desc_size(&self) -> usize {
        self.desc_data.len()
    }

    pub fn prim_size(&self) -> usize {
        self.prim_data.len()
    }

    /// Descriptor `i`.
    pub fn desc(&self, i: usize) -> Option<MeshletDesc> {
        let size = std::mem::size_of::<MeshletDesc>();
        let bytes = self.desc_data.get(i * size..(i + 1) * size)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn descs(&self) -> impl Iterator<Item = MeshletDesc> + '_ {
        (0..self.num_meshlets as usize).filter_map(move |i| self.desc(i))
    }

    /// Decode cluster `i` back out of the packed buffers.
    pub fn cluster(&self, i: usize) -> Option<MeshletCluster> {
        let desc = self.desc(i)?;

        let vertex_base = desc.vertex_offset as usize / self.index_format.size();
        let vertices = (0..desc.vertex_count as usize)
            .map(|v| self.index_format.read(&self.prim_data, vertex_base + v))
            .collect::<Option<Vec<u32>>>()?;

        let start = desc.prim_offset as usize;
        let bytes = self.prim_data.get(start..start + desc.prim_count as usize * 3)?;
        let triangles = bytes.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();

        Some(MeshletCluster { vertices, triangles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::vertex::VertexFormat;
    use crate::util::Vec4;

    const F32: VertexFormat = VertexFormat { fp16: false, extra_attributes: 0 };

    fn positions(points: &[[f32; 3]]) -> Vec<u8> {
        let mut buf = Vec::new();
        for p in points {
            F32.push_vec4(&mut buf, Vec4::new(p[0], p[1], p[2], 1.0));
        }
        buf
    }

    fn sample_clusters() -> Vec<Cluster> {
        vec![
            Cluster {
                vertices: vec![0, 1, 2],
                triangles: vec![[0, 1, 2]],
            },
            Cluster {
                vertices: vec![1, 3, 2, 4, 5],
                triangles: vec![[0, 1, 2], [2, 3, 4]],
            },
        ]
    }

    #[test]
    fn test_pack_sizes_u16() {
        let vbo = positions(&[[0.0; 3]; 6]);
        let topo = MeshletTopology::pack(&sample_clusters(), IndexFormat::U16, VertexView::new(&vbo, F32)).unwrap();

        assert_eq!(topo.num_meshlets(), 2);
        assert_eq!(topo.desc_size(), 96);
        // (6 -> 8) + (3 -> 4) + (10 -> 12) + (6 -> 8)
        assert_eq!(topo.prim_size(), 32);

        let d1 = topo.desc(1).unwrap();
        assert_eq!(d1.vertex_offset, 12);
        assert_eq!(d1.prim_offset, 24);
        assert_eq!(d1.vertex_count, 5);
        assert_eq!(d1.prim_count, 2);
    }

    #[test]
    fn test_pack_decode_u32() {
        let vbo = positions(&[[0.0; 3]; 6]);
        let clusters = sample_clusters();
        let topo = MeshletTopology::pack(&clusters, IndexFormat::U32, VertexView::new(&vbo, F32)).unwrap();

        for (i, c) in clusters.iter().enumerate() {
            let decoded = topo.cluster(i).unwrap();
            assert_eq!(decoded.vertices, c.vertices);
            assert_eq!(decoded.triangles, c.triangles);
            assert_eq!(topo.desc(i).unwrap().vertex_offset % 4, 0);
            assert_eq!(topo.desc(i).unwrap().prim_offset % 4, 0);
        }
        assert!(topo.cluster(2).is_none());

        let tris: Vec<_> = topo.cluster(1).unwrap().global_triangles().collect();
        assert_eq!(tris, vec![[1, 3, 2], [2, 4, 5]]);
    }

    #[test]
    fn test_cluster_bbox() {
        let vbo = positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [5.0, 5.0, 5.0]]);
        let clusters = vec![Cluster {
            vertices: vec![0, 1, 2],
            triangles: vec![[0, 1, 2]],
        }];
        let topo = MeshletTopology::pack(&clusters, IndexFormat::U16, VertexView::new(&vbo, F32)).unwrap();
        let d = topo.desc(0).unwrap();
        assert_eq!(d.bbox_min, [0.0, 0.0, 0.0]);
        assert_eq!(d.bbox_max, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_pack_empty() {
        let topo = MeshletTopology::pack(&[], IndexFormat::U16, VertexView::new(&[], F32)).unwrap();
        assert_eq!(topo.num_meshlets(), 0);
        assert_eq!(topo.desc_size(), 0);
        assert_eq!(topo.prim_size(), 0);
        assert_eq!(topo.descs().count(), 0);
    }
}
