//! Utility types and functions shared by the scene model.
//!
//! This module contains fundamental types used throughout the library:
//! - [`BBox4f`] - Homogeneous axis-aligned bounding volume
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod error;
mod math;

pub use error::*;
pub use math::*;
