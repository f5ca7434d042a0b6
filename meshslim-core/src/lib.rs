//! Core data structures and traits for meshslim
//!
//! This crate provides the in-memory representation shared by every other
//! meshslim crate: mesh buffers with material groups, scenes, bounding boxes
//! and the per-file optimization configuration.

pub mod point;
pub mod mesh;
pub mod scene;
pub mod traits;
pub mod config;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use scene::*;
pub use traits::*;
pub use config::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
