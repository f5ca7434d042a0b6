//! Crease-aware vertex normal recomputation
//!
//! Each vertex gathers the face normals of its incident triangles and groups
//! them greedily by angle. The vertex takes the average of its largest group,
//! so faces across a hard edge never bleed into each other while gently
//! curved surfaces still shade smoothly.

use meshslim_core::{MeshBuffer, Vector3f};

const DEGENERATE_AREA: f32 = 1e-12;

#[derive(Debug, Clone)]
struct NormalCluster {
    reference: Vector3f,
    sum: Vector3f,
    members: usize,
}

/// Unit face normal of every triangle, `None` for degenerate triangles
pub fn face_normals(mesh: &MeshBuffer) -> Vec<Option<Vector3f>> {
    mesh.triangles()
        .map(|[a, b, c]| {
            let e1 = mesh.positions[b] - mesh.positions[a];
            let e2 = mesh.positions[c] - mesh.positions[a];
            let n = e1.cross(&e2);
            let len = n.norm();
            if len > DEGENERATE_AREA && len.is_finite() {
                Some(n / len)
            } else {
                None
            }
        })
        .collect()
}

/// Pick the shading normal for one vertex from its incident face normals
fn cluster_vertex_normal(incident: &[Vector3f], cos_threshold: f32) -> Option<Vector3f> {
    let mut clusters: Vec<NormalCluster> = Vec::new();

    for n in incident {
        match clusters
            .iter_mut()
            .find(|c| c.reference.dot(n) > cos_threshold)
        {
            Some(cluster) => {
                cluster.sum += n;
                cluster.members += 1;
            }
            None => clusters.push(NormalCluster {
                reference: *n,
                sum: *n,
                members: 1,
            }),
        }
    }

    // Earlier clusters win ties
    let mut best: Option<&NormalCluster> = None;
    for cluster in &clusters {
        if best.map_or(true, |b| cluster.members > b.members) {
            best = Some(cluster);
        }
    }

    best.and_then(|c| {
        let avg = c.sum / c.members as f32;
        let len = avg.norm();
        if len > DEGENERATE_AREA {
            Some(avg / len)
        } else {
            Some(c.reference)
        }
    })
}

/// Recompute the mesh's vertex normals in place using the given crease angle.
pub fn recompute_normals(mesh: &mut MeshBuffer, crease_angle_degrees: f32) {
    let cos_threshold = crease_angle_degrees.to_radians().cos();
    let normals_per_face = face_normals(mesh);

    let mut incident: Vec<Vec<Vector3f>> = vec![Vec::new(); mesh.vertex_count()];
    for (triangle, normal) in mesh.triangles().zip(&normals_per_face) {
        if let Some(n) = normal {
            for v in triangle {
                incident[v].push(*n);
            }
        }
    }

    let normals = incident
        .iter()
        .map(|faces| cluster_vertex_normal(faces, cos_threshold).unwrap_or_else(Vector3f::z))
        .collect();
    mesh.normals = Some(normals);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshslim_core::Point3f;

    /// Two triangles meeting at a 90-degree dihedral along the x-axis.
    /// Vertices 0 and 1 lie on the shared edge.
    fn make_right_angle_hinge() -> MeshBuffer {
        MeshBuffer::from_triangles(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            &[[0, 1, 2], [1, 0, 3]],
        )
    }

    #[test]
    fn test_sharp_angle_keeps_edge_hard() {
        for crease in [2.5, 3.0] {
            let mut mesh = make_right_angle_hinge();
            recompute_normals(&mut mesh, crease);
            let normals = mesh.normals.as_ref().unwrap();
            // Shared-edge vertices take the first face's normal untouched
            assert_relative_eq!(normals[0], Vector3f::new(0.0, 0.0, 1.0), epsilon = 1e-6);
            assert_relative_eq!(normals[1], Vector3f::new(0.0, 0.0, 1.0), epsilon = 1e-6);
            assert_relative_eq!(normals[3], Vector3f::new(0.0, 1.0, 0.0), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_wide_angle_merges_edge() {
        let mut mesh = make_right_angle_hinge();
        recompute_normals(&mut mesh, 95.0);
        let normals = mesh.normals.as_ref().unwrap();
        let expected = Vector3f::new(0.0, 1.0, 1.0).normalize();
        assert_relative_eq!(normals[0], expected, epsilon = 1e-6);
        assert_relative_eq!(normals[1], expected, epsilon = 1e-6);
    }

    #[test]
    fn test_largest_cluster_wins() {
        // Vertex 0 touches two coplanar faces and one perpendicular face
        let mut mesh = MeshBuffer::from_triangles(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            &[[1, 0, 4], [0, 1, 2], [0, 2, 3]],
        );
        recompute_normals(&mut mesh, 3.0);
        let normals = mesh.normals.as_ref().unwrap();
        assert_relative_eq!(normals[0], Vector3f::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_unreferenced_vertex_defaults_up() {
        let mut mesh = make_right_angle_hinge();
        mesh.positions.push(Point3f::new(5.0, 5.0, 5.0));
        recompute_normals(&mut mesh, 30.0);
        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.len(), 5);
        assert_eq!(normals[4], Vector3f::z());
    }
}
