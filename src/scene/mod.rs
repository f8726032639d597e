//! Scene model: packed geometry, material and transform tables, instances.
//!
//! Everything is created by [`SceneModel::load`] and never mutated after.
//! Cross references are plain indices ("handles") into the owning tables.

mod draw;
mod geometry;
mod input;
mod material;
mod matrix;
mod model;
mod object;
pub(crate) mod vertex;

pub use draw::*;
pub use geometry::{DrawRange, GeometryEntry, GeometryPart, MeshletRange};
pub use input::*;
pub use material::*;
pub use matrix::{TransformRecord, TransformTable};
pub use model::SceneModel;
pub use object::{ObjectEntry, ObjectLimits, ObjectPart, ObjectTable};
pub use vertex::{AttributeView, IndexFormat, VertexFormat, VertexView};

/// Size every material and transform record is padded to, so each one can
/// be bound as its own uniform-buffer range.
pub const UBO_RANGE_ALIGNMENT: usize = 256;
