//! Quadric edge-collapse reducer
//!
//! Collapses edges in order of quadric error (QEM) on a half-edge structure
//! until the number of live vertices reaches the requested target. Boundary
//! edges are left alone by default so open shells keep their silhouette.
//!
//! The reducer does not track material membership of surviving triangles:
//! the returned buffer has no groups and callers remap them.

use crate::VertexReducer;
use meshslim_core::{Error, MeshBuffer, Point3f, Result, Uv, Vector3f};
use nalgebra::{Matrix4, Vector4};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

const INVALID: usize = usize::MAX;
const QUEUE_REBUILD_INTERVAL: usize = 100;

#[derive(Debug, Clone)]
struct HalfEdge {
    target: usize,
    twin: usize,
    next: usize,
    prev: usize,
    face: usize,
}

/// Half-edge view of a mesh buffer with per-vertex quadrics
struct CollapseMesh {
    half_edges: Vec<HalfEdge>,
    /// One outgoing half-edge per vertex (INVALID if removed or isolated)
    vertex_edge: Vec<usize>,
    /// One half-edge per face (INVALID if removed)
    face_edge: Vec<usize>,
    live_vertex_count: usize,
    positions: Vec<Point3f>,
    normals: Option<Vec<Vector3f>>,
    uvs: Option<Vec<Uv>>,
    quadrics: Vec<Matrix4<f64>>,
    vertex_removed: Vec<bool>,
}

impl CollapseMesh {
    fn from_buffer(mesh: &MeshBuffer) -> Self {
        let nv = mesh.vertex_count();
        let nf = mesh.triangle_count();

        let mut half_edges = Vec::with_capacity(nf * 3);
        let mut vertex_edge = vec![INVALID; nv];
        let mut face_edge = Vec::with_capacity(nf);

        for (fi, face) in mesh.triangles().enumerate() {
            let base = fi * 3;
            for j in 0..3usize {
                half_edges.push(HalfEdge {
                    target: face[(j + 1) % 3],
                    twin: INVALID,
                    next: base + (j + 1) % 3,
                    prev: base + (j + 2) % 3,
                    face: fi,
                });
                if vertex_edge[face[j]] == INVALID {
                    vertex_edge[face[j]] = base + j;
                }
            }
            face_edge.push(base);
        }

        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::with_capacity(nf * 3);
        for (he_idx, he) in half_edges.iter().enumerate() {
            let src = half_edges[he.prev].target;
            edge_map.insert((src, he.target), he_idx);
        }
        for he_idx in 0..half_edges.len() {
            if half_edges[he_idx].twin != INVALID {
                continue;
            }
            let src = half_edges[half_edges[he_idx].prev].target;
            let tgt = half_edges[he_idx].target;
            if let Some(&twin_idx) = edge_map.get(&(tgt, src)) {
                if half_edges[twin_idx].twin == INVALID && twin_idx != he_idx {
                    half_edges[he_idx].twin = twin_idx;
                    half_edges[twin_idx].twin = he_idx;
                }
            }
        }

        let live_vertex_count = vertex_edge.iter().filter(|&&e| e != INVALID).count();
        let mut collapse_mesh = CollapseMesh {
            half_edges,
            vertex_edge,
            face_edge,
            live_vertex_count,
            positions: mesh.positions.clone(),
            normals: mesh.normals.clone(),
            uvs: mesh.uvs.clone(),
            quadrics: vec![Matrix4::zeros(); nv],
            vertex_removed: vec![false; nv],
        };
        collapse_mesh.initialize_quadrics();
        collapse_mesh
    }

    #[inline]
    fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].target
    }

    fn plane(v0: &Point3f, v1: &Point3f, v2: &Point3f) -> Vector4<f64> {
        let n = (v1 - v0).cross(&(v2 - v0)).normalize();
        if !n.iter().all(|x| x.is_finite()) {
            return Vector4::new(0.0, 0.0, 1.0, 0.0);
        }
        let d = -n.dot(&v0.coords);
        Vector4::new(n.x as f64, n.y as f64, n.z as f64, d as f64)
    }

    fn plane_quadric(p: &Vector4<f64>) -> Matrix4<f64> {
        p * p.transpose()
    }

    fn initialize_quadrics(&mut self) {
        for fi in 0..self.face_edge.len() {
            let he0 = self.face_edge[fi];
            let he1 = self.half_edges[he0].next;
            let v0 = self.source(he0);
            let v1 = self.half_edges[he0].target;
            let v2 = self.half_edges[he1].target;
            let q = Self::plane_quadric(&Self::plane(
                &self.positions[v0],
                &self.positions[v1],
                &self.positions[v2],
            ));
            self.quadrics[v0] += q;
            self.quadrics[v1] += q;
            self.quadrics[v2] += q;
        }
    }

    /// All outgoing half-edges of a vertex, walking both ways around boundaries
    fn outgoing_half_edges(&self, v: usize) -> Vec<usize> {
        let start = self.vertex_edge[v];
        if start == INVALID {
            return vec![];
        }

        let mut result = Vec::new();
        let mut current = start;
        loop {
            result.push(current);
            let twin = self.half_edges[self.half_edges[current].prev].twin;
            if twin == INVALID {
                break;
            }
            current = twin;
            if current == start || result.len() > self.half_edges.len() {
                return result;
            }
        }

        let twin_of_start = self.half_edges[start].twin;
        if twin_of_start != INVALID {
            let mut current = self.half_edges[twin_of_start].next;
            while current != start && result.len() <= self.half_edges.len() {
                result.push(current);
                let twin = self.half_edges[current].twin;
                if twin == INVALID {
                    break;
                }
                current = self.half_edges[twin].next;
            }
        }

        result
    }

    fn neighbors(&self, v: usize) -> HashSet<usize> {
        self.outgoing_half_edges(v)
            .iter()
            .map(|&he| self.half_edges[he].target)
            .collect()
    }

    fn is_boundary_vertex(&self, v: usize) -> bool {
        self.outgoing_half_edges(v)
            .iter()
            .any(|&he| self.half_edges[he].twin == INVALID)
    }

    fn find_half_edge(&self, from: usize, to: usize) -> Option<usize> {
        self.outgoing_half_edges(from)
            .into_iter()
            .find(|&he| self.half_edges[he].target == to)
    }

    /// Link condition: the endpoints share exactly the apices of the faces
    /// adjacent to the edge (two for interior edges, one on the boundary)
    fn check_link_condition(&self, v1: usize, v2: usize) -> bool {
        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };
        let common = self.neighbors(v1).intersection(&self.neighbors(v2)).count();
        let expected = if self.half_edges[h].twin == INVALID { 1 } else { 2 };
        common == expected
    }

    fn collapse_cost(&self, v1: usize, v2: usize) -> (Point3f, f64) {
        let q = self.quadrics[v1] + self.quadrics[v2];
        let q3 = q.fixed_view::<3, 3>(0, 0);
        let q1 = q.fixed_view::<3, 1>(0, 3);

        let optimal = match q3.try_inverse() {
            Some(inv) => {
                let p = -inv * q1;
                Point3f::new(p[0] as f32, p[1] as f32, p[2] as f32)
            }
            None => nalgebra::center(&self.positions[v1], &self.positions[v2]),
        };
        let optimal = if optimal.coords.iter().all(|x| x.is_finite()) {
            optimal
        } else {
            nalgebra::center(&self.positions[v1], &self.positions[v2])
        };

        let vh = Vector4::new(optimal.x as f64, optimal.y as f64, optimal.z as f64, 1.0);
        let cost = (vh.transpose() * q * vh)[0].max(0.0);
        (optimal, cost)
    }

    fn find_valid_outgoing(&self, v: usize) -> usize {
        (0..self.half_edges.len())
            .find(|&i| self.half_edges[i].face != INVALID && self.source(i) == v)
            .unwrap_or(INVALID)
    }

    fn repair_vertex_edge(&mut self, v: usize, preferred: usize) {
        if v == INVALID || self.vertex_edge[v] == INVALID {
            return;
        }
        if self.half_edges[self.vertex_edge[v]].face != INVALID {
            return;
        }
        self.vertex_edge[v] = if preferred != INVALID && self.half_edges[preferred].face != INVALID
        {
            preferred
        } else {
            self.find_valid_outgoing(v)
        };
    }

    /// Merge `v2` into `v1` at `new_pos`
    fn collapse_edge(&mut self, v1: usize, v2: usize, new_pos: Point3f) -> bool {
        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };

        let h_twin = self.half_edges[h].twin;
        let h_next = self.half_edges[h].next;
        let h_prev = self.half_edges[h].prev;
        let face_a = self.half_edges[h].face;
        let h_next_twin = self.half_edges[h_next].twin;
        let h_prev_twin = self.half_edges[h_prev].twin;
        let c = self.half_edges[h_next].target;

        let (face_b, ht_next, ht_prev, ht_next_twin, ht_prev_twin, d) = if h_twin != INVALID {
            let hn = self.half_edges[h_twin].next;
            let hp = self.half_edges[h_twin].prev;
            (
                self.half_edges[h_twin].face,
                hn,
                hp,
                self.half_edges[hn].twin,
                self.half_edges[hp].twin,
                self.half_edges[hn].target,
            )
        } else {
            (INVALID, INVALID, INVALID, INVALID, INVALID, INVALID)
        };

        let v2_outgoing = self.outgoing_half_edges(v2);

        if h_next_twin != INVALID {
            self.half_edges[h_next_twin].twin = h_prev_twin;
        }
        if h_prev_twin != INVALID {
            self.half_edges[h_prev_twin].twin = h_next_twin;
        }
        for he in [h, h_next, h_prev] {
            self.half_edges[he].face = INVALID;
        }
        self.face_edge[face_a] = INVALID;

        if face_b != INVALID {
            if ht_next_twin != INVALID {
                self.half_edges[ht_next_twin].twin = ht_prev_twin;
            }
            if ht_prev_twin != INVALID {
                self.half_edges[ht_prev_twin].twin = ht_next_twin;
            }
            for he in [h_twin, ht_next, ht_prev] {
                self.half_edges[he].face = INVALID;
            }
            self.face_edge[face_b] = INVALID;
        }

        for &he in &v2_outgoing {
            let prev = self.half_edges[he].prev;
            self.half_edges[prev].target = v1;
            let twin = self.half_edges[he].twin;
            if twin != INVALID && self.half_edges[twin].face != INVALID {
                self.half_edges[twin].target = v1;
            }
        }

        self.repair_vertex_edge(v1, h_prev_twin);
        self.repair_vertex_edge(c, h_next_twin);
        if d != c {
            self.repair_vertex_edge(d, ht_next_twin);
        }

        self.vertex_edge[v2] = INVALID;
        self.vertex_removed[v2] = true;
        self.live_vertex_count -= 1;

        let v2_quadric = self.quadrics[v2];
        self.positions[v1] = new_pos;
        self.quadrics[v1] += v2_quadric;

        if let Some(normals) = self.normals.as_mut() {
            let avg = (normals[v1] + normals[v2]).normalize();
            if avg.iter().all(|x| x.is_finite()) {
                normals[v1] = avg;
            }
        }
        if let Some(uvs) = self.uvs.as_mut() {
            let (a, b) = (uvs[v1], uvs[v2]);
            uvs[v1] = [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5];
        }

        true
    }

    fn into_buffer(self) -> MeshBuffer {
        let mut old_to_new = vec![INVALID; self.positions.len()];
        let mut positions = Vec::new();
        let mut normals = self.normals.as_ref().map(|_| Vec::new());
        let mut uvs = self.uvs.as_ref().map(|_| Vec::new());

        for i in 0..self.positions.len() {
            if self.vertex_removed[i] || self.vertex_edge[i] == INVALID {
                continue;
            }
            old_to_new[i] = positions.len();
            positions.push(self.positions[i]);
            if let (Some(out), Some(src)) = (normals.as_mut(), self.normals.as_ref()) {
                out.push(src[i]);
            }
            if let (Some(out), Some(src)) = (uvs.as_mut(), self.uvs.as_ref()) {
                out.push(src[i]);
            }
        }

        let mut indices = Vec::new();
        for &he0 in &self.face_edge {
            if he0 == INVALID {
                continue;
            }
            let he1 = self.half_edges[he0].next;
            let corners = [
                old_to_new[self.source(he0)],
                old_to_new[self.half_edges[he0].target],
                old_to_new[self.half_edges[he1].target],
            ];
            let [a, b, c] = corners;
            if corners.contains(&INVALID) || a == b || b == c || c == a {
                continue;
            }
            indices.extend(corners.iter().map(|&v| v as u32));
        }

        MeshBuffer {
            positions,
            normals,
            uvs,
            indices: Some(indices),
            groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct EdgeCost {
    v1: usize,
    v2: usize,
    cost: f64,
}

impl PartialEq for EdgeCost {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}
impl Eq for EdgeCost {}

impl PartialOrd for EdgeCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first
        other.cost.total_cmp(&self.cost)
    }
}

/// Vertex reducer built on half-edge QEM edge collapse
#[derive(Debug, Clone)]
pub struct QuadricReducer {
    /// Never collapse edges touching the mesh boundary
    pub preserve_boundary: bool,
    /// Cost penalty for boundary edges when they may be collapsed
    pub boundary_weight: f64,
}

impl Default for QuadricReducer {
    fn default() -> Self {
        Self {
            preserve_boundary: true,
            boundary_weight: 100.0,
        }
    }
}

impl QuadricReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(preserve_boundary: bool, boundary_weight: f64) -> Self {
        Self {
            preserve_boundary,
            boundary_weight,
        }
    }

    fn edge_cost(&self, mesh: &CollapseMesh, v1: usize, v2: usize) -> Option<EdgeCost> {
        let on_boundary = mesh.is_boundary_vertex(v1) || mesh.is_boundary_vertex(v2);
        if on_boundary && self.preserve_boundary {
            return None;
        }
        let (_, mut cost) = mesh.collapse_cost(v1, v2);
        if on_boundary {
            cost += self.boundary_weight;
        }
        Some(EdgeCost { v1, v2, cost })
    }

    fn build_queue(&self, mesh: &CollapseMesh, id_offset: usize) -> PriorityQueue<usize, EdgeCost> {
        let mut queue = PriorityQueue::new();
        let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();
        let mut edge_id = id_offset;

        for vi in 0..mesh.positions.len() {
            if mesh.vertex_removed[vi] || mesh.vertex_edge[vi] == INVALID {
                continue;
            }
            for he in mesh.outgoing_half_edges(vi) {
                if mesh.half_edges[he].face == INVALID {
                    continue;
                }
                let target = mesh.half_edges[he].target;
                if !seen_edges.insert((vi.min(target), vi.max(target))) {
                    continue;
                }
                if let Some(cost) = self.edge_cost(mesh, vi, target) {
                    queue.push(edge_id, cost);
                    edge_id += 1;
                }
            }
        }

        queue
    }
}

impl VertexReducer for QuadricReducer {
    fn reduce_to_vertex_count(&self, mesh: &MeshBuffer, target: usize) -> Result<MeshBuffer> {
        if mesh.is_empty() {
            return Err(Error::InvalidData("Mesh is empty".to_string()));
        }
        mesh.validate()?;

        let mut collapse_mesh = CollapseMesh::from_buffer(mesh);
        let mut queue = self.build_queue(&collapse_mesh, 0);
        let mut next_id = queue.len();
        let mut collapse_count = 0usize;
        let mut collapses_at_rebuild = 0usize;

        while collapse_mesh.live_vertex_count > target {
            let edge = match queue.pop() {
                Some((_, edge)) => edge,
                // Stale entries may have hidden edges created by collapses
                None if collapse_count > collapses_at_rebuild => {
                    collapses_at_rebuild = collapse_count;
                    queue = self.build_queue(&collapse_mesh, next_id);
                    next_id += queue.len();
                    continue;
                }
                None => break,
            };
            let (v1, v2) = (edge.v1, edge.v2);

            if collapse_mesh.vertex_removed[v1]
                || collapse_mesh.vertex_removed[v2]
                || collapse_mesh.vertex_edge[v1] == INVALID
                || collapse_mesh.vertex_edge[v2] == INVALID
            {
                continue;
            }
            if !collapse_mesh.check_link_condition(v1, v2) {
                continue;
            }

            // Quadrics may have changed since the edge was queued
            let (position, _) = collapse_mesh.collapse_cost(v1, v2);
            if !collapse_mesh.collapse_edge(v1, v2, position) {
                continue;
            }
            collapse_count += 1;

            if collapse_count % QUEUE_REBUILD_INTERVAL == 0 {
                collapses_at_rebuild = collapse_count;
                queue = self.build_queue(&collapse_mesh, next_id);
                next_id += queue.len();
            } else if collapse_mesh.vertex_edge[v1] != INVALID {
                // Sorted so ties in the queue resolve the same way every run
                let mut neighbors: Vec<usize> = collapse_mesh.neighbors(v1).into_iter().collect();
                neighbors.sort_unstable();
                for neighbor in neighbors {
                    if let Some(cost) = self.edge_cost(&collapse_mesh, v1, neighbor) {
                        queue.push(next_id, cost);
                        next_id += 1;
                    }
                }
            }
        }

        Ok(collapse_mesh.into_buffer())
    }
}
