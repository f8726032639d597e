//! Meshlet (cluster) construction for mesh-shading and cluster-culling paths.
//!
//! - [`MeshletBuilder`] partitions a triangle list into [`Cluster`]s that
//!   respect the vertex and primitive budgets
//! - [`MeshletTopology`] packs clusters into the descriptor and primitive
//!   buffers uploaded per geometry

mod builder;
mod topology;

pub use builder::*;
pub use topology::*;

/// Number of task (or mesh) workgroups needed to cover `meshlet_count`
/// clusters when each workgroup handles `per_task` of them.
#[inline]
pub fn mesh_task_count(meshlet_count: u32, per_task: u32) -> u32 {
    if per_task == 0 {
        return 0;
    }
    meshlet_count.div_ceil(per_task)
}
