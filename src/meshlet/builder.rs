//! Triangle clustering under vertex and primitive budgets.
//!
//! Both strategies are greedy and deterministic: the same index list and
//! limits always produce the same clusters in the same order.

use crate::config::{LoadConfig, MeshletBuilderKind};
use crate::util::{Error, Result};
use smallvec::SmallVec;
use std::collections::HashMap;

/// One cluster before packing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    /// Global vertex index for every local index, in first-use order.
    pub vertices: Vec<u32>,
    /// Triangles as local indices into `vertices`.
    pub triangles: Vec<[u8; 3]>,
}

/// Cluster being filled.
struct OpenCluster {
    cluster: Cluster,
    local: HashMap<u32, u8>,
}

impl OpenCluster {
    fn new() -> Self {
        Self {
            cluster: Cluster::default(),
            local: HashMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.cluster.triangles.is_empty()
    }

    fn new_vertices(&self, tri: &[u32]) -> usize {
        distinct(tri).iter().filter(|v| !self.local.contains_key(v)).count()
    }

    fn fits(&self, tri: &[u32], max_vertices: usize, max_primitives: usize) -> bool {
        self.cluster.triangles.len() < max_primitives
            && self.cluster.vertices.len() + self.new_vertices(tri) <= max_vertices
    }

    fn push(&mut self, tri: &[u32]) {
        let mut local = [0u8; 3];
        for (slot, &v) in local.iter_mut().zip(tri) {
            let next = self.cluster.vertices.len();
            *slot = *self.local.entry(v).or_insert_with(|| {
                self.cluster.vertices.push(v);
                // budget is capped at 256 so the local index fits a byte
                next as u8
            });
        }
        self.cluster.triangles.push(local);
    }

    fn take(&mut self) -> Cluster {
        self.local.clear();
        std::mem::take(&mut self.cluster)
    }
}

#[inline]
fn triangle(indices: &[u32], t: usize) -> &[u32] {
    &indices[t * 3..t * 3 + 3]
}

fn distinct(tri: &[u32]) -> SmallVec<[u32; 3]> {
    let mut out = SmallVec::new();
    for &v in tri {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Partitions triangle lists into clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshletBuilder {
    pub kind: MeshletBuilderKind,
    pub max_vertices: u32,
    pub max_primitives: u32,
}

impl MeshletBuilder {
    pub fn new(kind: MeshletBuilderKind, max_vertices: u32, max_primitives: u32) -> Self {
        Self {
            kind,
            max_vertices,
            max_primitives,
        }
    }

    pub fn from_config(cfg: &LoadConfig) -> Self {
        Self::new(cfg.mesh_builder, cfg.mesh_vertex_count, cfg.mesh_primitive_count)
    }

    /// Cluster a triangle list.
    ///
    /// `first_triangle` only offsets the triangle number reported in errors,
    /// so parts of a larger index buffer can be clustered one at a time.
    /// Fails with [`Error::MeshletBudget`] when a single triangle cannot fit
    /// an empty cluster; nothing is retried.
    pub fn build(&self, indices: &[u32], first_triangle: usize) -> Result<Vec<Cluster>> {
        let max_vertices = self.max_vertices.min(crate::config::MAX_MESHLET_LIMIT) as usize;
        let max_primitives = self.max_primitives.min(crate::config::MAX_MESHLET_LIMIT) as usize;

        for (t, tri) in indices.chunks_exact(3).enumerate() {
            if max_primitives == 0 || distinct(tri).len() > max_vertices {
                return Err(Error::MeshletBudget {
                    geometry: None,
                    triangle: first_triangle + t,
                    max_vertices: self.max_vertices,
                    max_primitives: self.max_primitives,
                });
            }
        }

        let clusters = match self.kind {
            MeshletBuilderKind::PackBasic => pack_basic(indices, max_vertices, max_primitives),
            MeshletBuilderKind::Locality => pack_locality(indices, max_vertices, max_primitives),
        };
        Ok(clusters)
    }
}

/// Close the open cluster whenever the next triangle would overflow it.
fn pack_basic(indices: &[u32], max_vertices: usize, max_primitives: usize) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut open = OpenCluster::new();

    for tri in indices.chunks_exact(3) {
        if !open.fits(tri, max_vertices, max_primitives) {
            clusters.push(open.take());
        }
        open.push(tri);
    }
    if !open.is_empty() {
        clusters.push(open.take());
    }
    clusters
}

/// Seed each cluster with the first unassigned triangle, then keep adding
/// the unassigned neighbour that costs the fewest new vertices (lowest
/// triangle number on ties). With no neighbour left the next unassigned
/// triangle in input order is tried before the cluster is closed.
fn pack_locality(indices: &[u32], max_vertices: usize, max_primitives: usize) -> Vec<Cluster> {
    let tri_count = indices.len() / 3;
    let tri = |t: usize| triangle(indices, t);

    let mut adjacency: HashMap<u32, SmallVec<[u32; 8]>> = HashMap::new();
    for t in 0..tri_count {
        for v in distinct(tri(t)) {
            adjacency.entry(v).or_default().push(t as u32);
        }
    }

    let mut assigned = vec![false; tri_count];
    let mut cursor = 0usize;
    let mut clusters = Vec::new();

    loop {
        while cursor < tri_count && assigned[cursor] {
            cursor += 1;
        }
        if cursor == tri_count {
            break;
        }

        let mut open = OpenCluster::new();
        open.push(tri(cursor));
        assigned[cursor] = true;

        while open.cluster.triangles.len() < max_primitives {
            let mut best: Option<(usize, usize)> = None;
            for v in &open.cluster.vertices {
                let Some(neighbours) = adjacency.get(v) else {
                    continue;
                };
                for &t in neighbours {
                    let t = t as usize;
                    if assigned[t] {
                        continue;
                    }
                    let cost = open.new_vertices(tri(t));
                    if open.cluster.vertices.len() + cost > max_vertices {
                        continue;
                    }
                    if best.map_or(true, |(bc, bt)| (cost, t) < (bc, bt)) {
                        best = Some((cost, t));
                    }
                }
            }

            let next = match best {
                Some((_, t)) => t,
                None => {
                    while cursor < tri_count && assigned[cursor] {
                        cursor += 1;
                    }
                    if cursor == tri_count || !open.fits(tri(cursor), max_vertices, max_primitives) {
                        break;
                    }
                    cursor
                }
            };
            open.push(tri(next));
            assigned[next] = true;
        }

        clusters.push(open.take());
    }
    clusters
}
