//! Mesh buffer data structures

use crate::error::Error;
use crate::point::*;
use crate::Result;
use serde::{Deserialize, Serialize};

/// A contiguous range of the index buffer drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialGroup {
    pub start: usize,
    pub count: usize,
    pub material_index: usize,
}

impl MaterialGroup {
    pub fn new(start: usize, count: usize, material_index: usize) -> Self {
        Self {
            start,
            count,
            material_index,
        }
    }

    /// One past the last index covered by this group
    pub fn end(&self) -> usize {
        self.start + self.count
    }
}

/// In-memory geometry of one drawable mesh.
///
/// Positions are mandatory; normals and UVs are optional per-vertex
/// attributes. When `indices` is `None` the positions are read as
/// sequential triangles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffer {
    pub positions: Vec<Point3f>,
    pub normals: Option<Vec<Vector3f>>,
    pub uvs: Option<Vec<Uv>>,
    pub indices: Option<Vec<u32>>,
    pub groups: Vec<MaterialGroup>,
}

impl MeshBuffer {
    /// Create a new empty mesh buffer
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            uvs: None,
            indices: None,
            groups: Vec::new(),
        }
    }

    /// Create an indexed mesh from positions and triangles
    pub fn from_triangles(positions: Vec<Point3f>, triangles: &[[u32; 3]]) -> Self {
        let indices = triangles.iter().flat_map(|t| t.iter().copied()).collect();
        Self {
            positions,
            normals: None,
            uvs: None,
            indices: Some(indices),
            groups: Vec::new(),
        }
    }

    /// Create a non-indexed mesh; every three positions form a triangle
    pub fn from_positions(positions: Vec<Point3f>) -> Self {
        Self {
            positions,
            ..Self::new()
        }
    }

    pub fn with_groups(mut self, groups: Vec<MaterialGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Length of the index range material groups refer to
    pub fn index_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.positions.len(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.index_count() / 3
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangle_count() == 0
    }

    /// Vertex indices of triangle `i`
    pub fn triangle(&self, i: usize) -> [usize; 3] {
        let base = i * 3;
        match &self.indices {
            Some(indices) => [
                indices[base] as usize,
                indices[base + 1] as usize,
                indices[base + 2] as usize,
            ],
            None => [base, base + 1, base + 2],
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }

    /// Triangle corner positions
    pub fn triangle_positions(&self, i: usize) -> [Point3f; 3] {
        let [a, b, c] = self.triangle(i);
        [self.positions[a], self.positions[b], self.positions[c]]
    }

    /// Set vertex normals; ignored when the length does not match
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.positions.len() {
            self.normals = Some(normals);
        }
    }

    /// Set texture coordinates; ignored when the length does not match
    pub fn set_uvs(&mut self, uvs: Vec<Uv>) {
        if uvs.len() == self.positions.len() {
            self.uvs = Some(uvs);
        }
    }

    /// Check index bounds, attribute lengths and the material group invariant
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.positions.len();
        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(Error::InvalidData(format!(
                    "normal count {} does not match vertex count {}",
                    normals.len(),
                    vertex_count
                )));
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count {
                return Err(Error::InvalidData(format!(
                    "uv count {} does not match vertex count {}",
                    uvs.len(),
                    vertex_count
                )));
            }
        }
        if let Some(indices) = &self.indices {
            if indices.len() % 3 != 0 {
                return Err(Error::InvalidData(
                    "index count is not a multiple of 3".to_string(),
                ));
            }
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::InvalidData(format!(
                    "index {} out of range for {} vertices",
                    bad, vertex_count
                )));
            }
        }

        let index_count = self.index_count();
        let mut previous_end = 0;
        for group in &self.groups {
            if group.end() > index_count {
                return Err(Error::InvalidData(format!(
                    "material group [{}, {}) exceeds index count {}",
                    group.start,
                    group.end(),
                    index_count
                )));
            }
            if group.start < previous_end {
                return Err(Error::InvalidData(format!(
                    "material group starting at {} overlaps the previous group",
                    group.start
                )));
            }
            previous_end = group.end();
        }
        Ok(())
    }
}

impl Default for MeshBuffer {
    fn default() -> Self {
        Self::new()
    }
}
