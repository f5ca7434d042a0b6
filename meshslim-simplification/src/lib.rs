//! Adaptive mesh simplification
//!
//! This crate reduces vertex and triangle counts while guarding visual
//! fidelity:
//! - Feature-size analysis of small and thin detail
//! - Feature-loss comparison between an original and a candidate
//! - Crease-aware normal recomputation
//! - Material group remapping after topology changes
//! - An adaptive retry loop that relaxes its target on rejection
//! - A background worker with a wall-clock budget

pub mod analyzer;
pub mod comparator;
pub mod normals;
pub mod material_groups;
pub mod policy;
pub mod dedup;
pub mod edge_collapse;
pub mod adaptive;
pub mod worker;

pub use analyzer::*;
pub use comparator::*;
pub use normals::*;
pub use material_groups::*;
pub use policy::*;
pub use dedup::*;
pub use edge_collapse::*;
pub use adaptive::*;
pub use worker::*;

use meshslim_core::{MeshBuffer, Result};
use std::fmt;

/// Reduce a mesh to at most a target number of vertices
pub trait VertexReducer: Send + Sync {
    /// Return a new buffer with no more than `target` vertices where the
    /// topology allows it. The input is never modified.
    fn reduce_to_vertex_count(&self, mesh: &MeshBuffer, target: usize) -> Result<MeshBuffer>;
}

/// Merge vertices closer than a positional epsilon
pub trait DuplicateMerger: Send + Sync {
    fn merge_duplicate_vertices(&self, mesh: &MeshBuffer, epsilon: f32) -> Result<MeshBuffer>;
}

impl<T: VertexReducer + ?Sized> VertexReducer for Box<T> {
    fn reduce_to_vertex_count(&self, mesh: &MeshBuffer, target: usize) -> Result<MeshBuffer> {
        (**self).reduce_to_vertex_count(mesh, target)
    }
}

impl<T: DuplicateMerger + ?Sized> DuplicateMerger for Box<T> {
    fn merge_duplicate_vertices(&self, mesh: &MeshBuffer, epsilon: f32) -> Result<MeshBuffer> {
        (**self).merge_duplicate_vertices(mesh, epsilon)
    }
}

/// Why a simplification attempt was not accepted
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptRejection {
    /// The reducer did not lower the vertex count below the original
    ReductionViolation { original: usize, result: usize },
    /// The candidate distorted the shape or lost too much detail
    QualityRejection { reason: String },
    /// The reducer returned an error
    PrimitiveFailure(String),
}

impl fmt::Display for AttemptRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptRejection::ReductionViolation { original, result } => write!(
                f,
                "reduction produced {} vertices from {}",
                result, original
            ),
            AttemptRejection::QualityRejection { reason } => write!(f, "rejected: {}", reason),
            AttemptRejection::PrimitiveFailure(message) => {
                write!(f, "reducer failed: {}", message)
            }
        }
    }
}
