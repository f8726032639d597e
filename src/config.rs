//! Scene load configuration

use crate::util::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default meshlet vertex budget.
pub const DEFAULT_MESH_VERTEX_COUNT: u32 = 64;
/// Default meshlet primitive budget.
pub const DEFAULT_MESH_PRIMITIVE_COUNT: u32 = 126;
/// Local meshlet indices are stored as bytes.
pub const MAX_MESHLET_LIMIT: u32 = 256;
/// Upper bound on extra per-vertex attribute slots.
pub const MAX_EXTRA_ATTRIBUTES: u32 = 8;

/// Meshlet clustering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshletBuilderKind {
    /// Fill clusters strictly in input triangle order.
    #[default]
    PackBasic,
    /// Grow clusters through triangles sharing vertices with the open cluster.
    Locality,
}

/// Options for [`SceneModel::load`](crate::SceneModel::load).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Uniform scale applied to positions and matrix translations.
    pub scale: f32,
    /// Log a load summary at info level.
    pub verbose: bool,
    /// Store positions and attributes as half floats.
    pub fp16: bool,
    /// Use 16-bit indices for geometries small enough.
    pub allow_shorts: bool,
    /// Fill extra attribute slots with a debug color instead of the normal.
    pub colorize_extra: bool,
    /// Additional vec4 attribute slots after the normal.
    pub extra_attributes: u32,

    // the two budgets stay adjacent and in this order, vertices first
    /// Meshlet vertex budget, at most [`MAX_MESHLET_LIMIT`].
    pub mesh_vertex_count: u32,
    /// Meshlet primitive budget, 1 to [`MAX_MESHLET_LIMIT`].
    pub mesh_primitive_count: u32,

    /// Clustering strategy used when `build_meshlets` is set.
    pub mesh_builder: MeshletBuilderKind,
    /// Build meshlet topology for every geometry.
    pub build_meshlets: bool,
    /// Build geometries on the rayon pool.
    pub parallel: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            verbose: true,
            fp16: false,
            allow_shorts: true,
            colorize_extra: false,
            extra_attributes: 0,
            mesh_vertex_count: DEFAULT_MESH_VERTEX_COUNT,
            mesh_primitive_count: DEFAULT_MESH_PRIMITIVE_COUNT,
            mesh_builder: MeshletBuilderKind::default(),
            build_meshlets: true,
            parallel: true,
        }
    }
}

impl LoadConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject option values that can never produce a usable scene.
    ///
    /// A vertex budget below three is left to the meshlet builder, which
    /// reports the first triangle that does not fit.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::config(format!("scale must be positive, got {}", self.scale)));
        }
        if self.mesh_vertex_count > MAX_MESHLET_LIMIT {
            return Err(Error::config(format!(
                "mesh_vertex_count {} exceeds {}",
                self.mesh_vertex_count, MAX_MESHLET_LIMIT
            )));
        }
        if self.mesh_primitive_count == 0 || self.mesh_primitive_count > MAX_MESHLET_LIMIT {
            return Err(Error::config(format!(
                "mesh_primitive_count must be in 1..={}, got {}",
                MAX_MESHLET_LIMIT, self.mesh_primitive_count
            )));
        }
        if self.extra_attributes > MAX_EXTRA_ATTRIBUTES {
            return Err(Error::config(format!(
                "extra_attributes {} exceeds {}",
                self.extra_attributes, MAX_EXTRA_ATTRIBUTES
            )));
        }
        Ok(())
    }
}
