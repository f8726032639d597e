//! Shared fixtures for integration tests.

#![allow(dead_code)]

use cadscene::prelude::*;
use glam::{Mat4, Vec3, Vec4};

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Unit quad in the xy plane, two triangles.
pub fn quad() -> MeshInput {
    MeshInput::new(
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

/// Unit cube, 8 shared corners, one part per face.
pub fn cube() -> MeshInput {
    let positions = (0..8)
        .map(|i| Vec3::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32))
        .collect();
    let indices = vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    MeshInput::new(positions, indices).with_part_counts(&[6; 6])
}

/// Regular grid of `n` x `n` quads, `2 * n * n` triangles.
pub fn grid(n: u32) -> MeshInput {
    let row = n + 1;
    let positions = (0..row * row)
        .map(|i| Vec3::new((i % row) as f32, (i / row) as f32, 0.0))
        .collect();
    let mut indices = Vec::with_capacity((n * n * 6) as usize);
    for y in 0..n {
        for x in 0..n {
            let a = y * row + x;
            indices.extend_from_slice(&[a, a + 1, a + row + 1, a, a + row + 1, a + row]);
        }
    }
    MeshInput::new(positions, indices)
}

/// One geometry placed once with a single material.
pub fn single(mesh: MeshInput, world: Mat4) -> SceneInput {
    let part_count = mesh.effective_parts().len();
    SceneInput {
        materials: vec![MaterialInput::diffuse(Vec4::new(0.8, 0.8, 0.8, 1.0))],
        matrices: vec![MatrixInput::new(world)],
        geometries: vec![mesh],
        objects: vec![ObjectInput::uniform(0, 0, 0, part_count)],
    }
}

pub fn sequential() -> LoadConfig {
    LoadConfig {
        verbose: false,
        parallel: false,
        ..Default::default()
    }
}
