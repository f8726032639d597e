//! # cadscene
//!
//! Static CAD-style scene model re-packed into GPU-ready memory layouts.
//!
//! A parsed scene (meshes, materials, placements, instances) is turned into
//! vertex/attribute/index byte blocks, 256-byte material and transform
//! records, per-part draw ranges and, optionally, meshlet clusters for
//! mesh-shading and cluster-culling pipelines. Uploading the buffers and
//! issuing draws is left to the caller.
//!
//! ## Modules
//!
//! - [`util`] - Bounding volumes, math helpers, errors
//! - [`config`] - Load options
//! - [`meshlet`] - Cluster builder and packed meshlet topology
//! - [`scene`] - Geometry, material, transform and object tables
//!
//! ## Example
//!
//! ```ignore
//! use cadscene::prelude::*;
//!
//! let scene = SceneModel::load(&input, &LoadConfig::default())?;
//! for geo in scene.geometry() {
//!     upload(geo.vbo_data(), geo.ibo_data());
//! }
//! ```

pub mod util;
pub mod config;
pub mod meshlet;
pub mod scene;

// Re-export commonly used types
pub use config::{LoadConfig, MeshletBuilderKind};
pub use scene::SceneModel;
pub use util::{BBox4f, Error, ErrorKind, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{LoadConfig, MeshletBuilderKind};
    pub use crate::meshlet::{MeshletBuilder, MeshletDesc, MeshletTopology};
    pub use crate::scene::*;
    pub use crate::util::{BBox4f, Error, ErrorKind, Result};
}
