//! Duplicate vertex merging

use crate::DuplicateMerger;
use meshslim_core::{Error, MaterialGroup, MeshBuffer, Result};
use std::collections::HashMap;

/// Cell key: quantized position, plus quantized UV when the mesh has UVs so
/// texture seams survive the merge
type VertexKey = (i64, i64, i64, Option<(i64, i64)>);

/// Merges vertices whose positions (and UVs) fall into the same
/// epsilon-sized grid cell. The first vertex of each cell is kept.
/// Triangles that collapse to a line or point are dropped and material
/// groups are recomputed from the surviving triangles.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridMerger;

impl GridMerger {
    pub fn new() -> Self {
        Self
    }
}

fn quantize(value: f32, epsilon: f32) -> i64 {
    (value as f64 / epsilon as f64).round() as i64
}

impl DuplicateMerger for GridMerger {
    fn merge_duplicate_vertices(&self, mesh: &MeshBuffer, epsilon: f32) -> Result<MeshBuffer> {
        if !(epsilon > 0.0 && epsilon.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Merge epsilon must be positive, got {}",
                epsilon
            )));
        }
        mesh.validate()?;

        let mut cells: HashMap<VertexKey, u32> = HashMap::with_capacity(mesh.vertex_count());
        let mut remap = Vec::with_capacity(mesh.vertex_count());
        let mut positions = Vec::new();
        let mut normals = mesh.normals.as_ref().map(|_| Vec::new());
        let mut uvs = mesh.uvs.as_ref().map(|_| Vec::new());

        for (vi, p) in mesh.positions.iter().enumerate() {
            let uv_key = mesh
                .uvs
                .as_ref()
                .map(|uvs| (quantize(uvs[vi][0], epsilon), quantize(uvs[vi][1], epsilon)));
            let key = (
                quantize(p.x, epsilon),
                quantize(p.y, epsilon),
                quantize(p.z, epsilon),
                uv_key,
            );

            let index = *cells.entry(key).or_insert_with(|| {
                positions.push(*p);
                if let (Some(out), Some(src)) = (normals.as_mut(), mesh.normals.as_ref()) {
                    out.push(src[vi]);
                }
                if let (Some(out), Some(src)) = (uvs.as_mut(), mesh.uvs.as_ref()) {
                    out.push(src[vi]);
                }
                (positions.len() - 1) as u32
            });
            remap.push(index);
        }

        // surviving_indices[t] = number of indices kept before triangle t
        let triangle_count = mesh.triangle_count();
        let mut indices = Vec::with_capacity(mesh.index_count());
        let mut surviving_indices = Vec::with_capacity(triangle_count + 1);
        for triangle in mesh.triangles() {
            surviving_indices.push(indices.len());
            let [a, b, c] = triangle.map(|v| remap[v]);
            if a != b && b != c && c != a {
                indices.extend_from_slice(&[a, b, c]);
            }
        }
        surviving_indices.push(indices.len());

        let groups = mesh
            .groups
            .iter()
            .map(|g| {
                let first = (g.start / 3).min(triangle_count);
                let last = ((g.end() + 2) / 3).min(triangle_count);
                let start = surviving_indices[first];
                MaterialGroup::new(start, surviving_indices[last] - start, g.material_index)
            })
            .collect();

        Ok(MeshBuffer {
            positions,
            normals,
            uvs,
            indices: Some(indices),
            groups,
        })
    }
}
