//! Scene containers holding meshes, materials and textures

use crate::mesh::MeshBuffer;
use serde::{Deserialize, Serialize};

/// Surface material referenced by material groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub base_color_texture: Option<usize>,
}

impl Material {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
        }
    }
}

/// Encoded image payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One entry of the scene's node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub mesh: Option<MeshBuffer>,
}

impl SceneNode {
    pub fn new<S: Into<String>>(name: S, mesh: Option<MeshBuffer>) -> Self {
        Self {
            name: name.into(),
            mesh,
        }
    }
}

/// A loaded asset: a flat, traversable node list plus shared materials and textures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh<S: Into<String>>(&mut self, name: S, mesh: MeshBuffer) -> usize {
        self.nodes.push(SceneNode::new(name, Some(mesh)));
        self.nodes.len() - 1
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshBuffer> {
        self.nodes.iter().filter_map(|n| n.mesh.as_ref())
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes().map(MeshBuffer::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes().map(MeshBuffer::triangle_count).sum()
    }

    /// Total size of all texture payloads in bytes
    pub fn texture_payload_bytes(&self) -> usize {
        self.textures.iter().map(|t| t.data.len()).sum()
    }

    /// Drop nodes whose mesh has no triangles left. Nodes without a mesh are kept.
    /// Returns the names of the pruned nodes.
    pub fn prune_empty_nodes(&mut self) -> Vec<String> {
        let mut pruned = Vec::new();
        self.nodes.retain(|node| match &node.mesh {
            Some(mesh) if mesh.triangle_count() == 0 => {
                pruned.push(node.name.clone());
                false
            }
            _ => true,
        });
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point3f;

    fn triangle() -> MeshBuffer {
        MeshBuffer::from_positions(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_scene_totals() {
        let mut scene = Scene::new();
        scene.add_mesh("a", triangle());
        scene.add_mesh("b", triangle());
        scene.nodes.push(SceneNode::new("empty-group", None));
        scene.textures.push(Texture {
            name: "albedo".to_string(),
            mime_type: "image/png".to_string(),
            data: vec![0; 128],
        });

        assert_eq!(scene.vertex_count(), 6);
        assert_eq!(scene.triangle_count(), 2);
        assert_eq!(scene.texture_payload_bytes(), 128);
    }

    #[test]
    fn test_prune_empty_nodes() {
        let mut scene = Scene::new();
        scene.add_mesh("kept", triangle());
        scene.add_mesh("collapsed", MeshBuffer::new());
        scene.nodes.push(SceneNode::new("transform-only", None));

        let pruned = scene.prune_empty_nodes();
        assert_eq!(pruned, vec!["collapsed".to_string()]);
        assert_eq!(scene.nodes.len(), 2);
    }
}
