//! Property tests for meshlet clustering on random and synthetic meshes.

use cadscene::meshlet::{Cluster, MeshletBuilder, MeshletTopology};
use cadscene::scene::{IndexFormat, VertexFormat, VertexView};
use cadscene::MeshletBuilderKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const KINDS: [MeshletBuilderKind; 2] = [MeshletBuilderKind::PackBasic, MeshletBuilderKind::Locality];

/// Random triangle soup over `num_vertices` vertices; may contain degenerates.
fn random_indices(rng: &mut StdRng, num_triangles: usize, num_vertices: u32) -> Vec<u32> {
    (0..num_triangles * 3).map(|_| rng.gen_range(0..num_vertices)).collect()
}

fn sorted_triangles(clusters: &[Cluster]) -> Vec<[u32; 3]> {
    let mut out: Vec<[u32; 3]> = clusters
        .iter()
        .flat_map(|c| c.triangles.iter().map(move |t| t.map(|l| c.vertices[l as usize])))
        .collect();
    out.sort_unstable();
    out
}

fn check_budgets(clusters: &[Cluster], max_vertices: usize, max_primitives: usize) {
    for c in clusters {
        assert!(!c.triangles.is_empty(), "empty cluster emitted");
        assert!(c.vertices.len() <= max_vertices, "{} vertices > {max_vertices}", c.vertices.len());
        assert!(c.triangles.len() <= max_primitives, "{} triangles > {max_primitives}", c.triangles.len());
        for t in &c.triangles {
            assert!(t.iter().all(|&l| (l as usize) < c.vertices.len()));
        }
        let mut unique = c.vertices.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), c.vertices.len(), "duplicate vertex in cluster");
    }
}

#[test]
fn test_random_meshes_covered_within_budget() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for &num_triangles in &[1usize, 2, 7, 63, 64, 127, 500, 2048, 10_000] {
        let num_vertices = rng.gen_range(3..=(num_triangles as u32 * 3).max(3));
        let indices = random_indices(&mut rng, num_triangles, num_vertices);
        let mut expected: Vec<[u32; 3]> = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
        expected.sort_unstable();

        for kind in KINDS {
            for (max_vertices, max_primitives) in [(64, 126), (3, 1), (32, 32), (256, 256)] {
                let builder = MeshletBuilder::new(kind, max_vertices, max_primitives);
                let clusters = builder.build(&indices, 0).expect("build failed");
                check_budgets(&clusters, max_vertices as usize, max_primitives as usize);
                assert_eq!(
                    sorted_triangles(&clusters),
                    expected,
                    "{kind:?} {max_vertices}/{max_primitives} lost or duplicated triangles"
                );
            }
        }
    }
}

#[test]
fn test_pack_basic_keeps_input_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let indices = random_indices(&mut rng, 1000, 400);
    let clusters = MeshletBuilder::new(MeshletBuilderKind::PackBasic, 64, 126)
        .build(&indices, 0)
        .expect("build failed");
    let flat: Vec<u32> = clusters
        .iter()
        .flat_map(|c| c.triangles.iter().flat_map(move |t| t.map(|l| c.vertices[l as usize])))
        .collect();
    assert_eq!(flat, indices);
}

#[test]
fn test_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    let indices = random_indices(&mut rng, 3000, 1200);
    for kind in KINDS {
        let builder = MeshletBuilder::new(kind, 64, 126);
        let a = builder.build(&indices, 0).expect("build failed");
        let b = builder.build(&indices, 0).expect("build failed");
        assert_eq!(a, b);
    }
}

#[test]
fn test_fan_single_cluster() {
    let indices = [0, 1, 2, 0, 2, 3, 0, 3, 4];
    for kind in KINDS {
        let clusters = MeshletBuilder::new(kind, 64, 126).build(&indices, 0).expect("build failed");
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].vertices, vec![0, 1, 2, 3, 4]);
        assert_eq!(clusters[0].triangles.len(), 3);
    }
}

#[test]
fn test_disjoint_triangles_split() {
    // 200 triangles sharing nothing: 600 vertices at 64 per cluster
    let indices: Vec<u32> = (0..600).collect();
    for kind in KINDS {
        let clusters = MeshletBuilder::new(kind, 64, 126).build(&indices, 0).expect("build failed");
        assert!(clusters.len() >= 10, "{kind:?} made {} clusters", clusters.len());
        check_budgets(&clusters, 64, 126);
    }
}

#[test]
fn test_packed_topology_round_trips_clusters() {
    let mut rng = StdRng::seed_from_u64(99);
    let num_vertices = 500u32;
    let indices = random_indices(&mut rng, 800, num_vertices);

    let format = VertexFormat { fp16: false, extra_attributes: 0 };
    let mut vbo = Vec::new();
    for v in 0..num_vertices {
        let p = [v as f32, (v % 7) as f32, (v % 13) as f32, 1.0f32];
        vbo.extend_from_slice(bytemuck::bytes_of(&p));
    }
    let positions = VertexView::new(&vbo, format);

    for index_format in [IndexFormat::U16, IndexFormat::U32] {
        let clusters = MeshletBuilder::new(MeshletBuilderKind::Locality, 64, 126)
            .build(&indices, 0)
            .expect("build failed");
        let topo = MeshletTopology::pack(&clusters, index_format, positions).expect("pack failed");
        assert_eq!(topo.num_meshlets() as usize, clusters.len());
        assert_eq!(topo.prim_size() % 4, 0);

        for (i, cluster) in clusters.iter().enumerate() {
            let decoded = topo.cluster(i).expect("cluster");
            assert_eq!(decoded.vertices, cluster.vertices);
            assert_eq!(decoded.triangles, cluster.triangles);

            let desc = topo.desc(i).expect("desc");
            assert_eq!(desc.vertex_offset % 4, 0);
            assert_eq!(desc.prim_offset % 4, 0);
            for &v in &cluster.vertices {
                let x = v as f32;
                assert!(desc.bbox_min[0] <= x && x <= desc.bbox_max[0]);
            }
        }
    }
}
