//! Feature-size analysis
//!
//! Samples a mesh's triangles and summarizes how much small or thin detail it
//! carries. All thresholds are derived from the bounding-box diagonal so the
//! metric behaves the same on tiny and huge assets.
//!
//! Sampling is deterministic: meshes with at most `max_samples` triangles are
//! measured exhaustively, larger meshes draw a distinct random subset from a
//! `StdRng` seeded with the analyzer's seed.

use meshslim_core::{Bounded, MeshBuffer, Point3f};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_MAX_SAMPLES: usize = 10_000;
pub const DEFAULT_SAMPLE_SEED: u64 = 0x6d65_7368_736c_696d;

const SMALL_FEATURE_SCALE: f32 = 0.001;
const THIN_FEATURE_SCALE: f32 = 0.002;
const THIN_ASPECT_RATIO: f32 = 8.0;
/// Centroids are rounded to two decimals for the density map
const DENSITY_CELL_SCALE: f32 = 100.0;
const DENSE_BUCKET_MIN_TRIANGLES: usize = 2;

const SMALL_WEIGHT: f32 = 0.6;
const THIN_WEIGHT: f32 = 0.4;
const CLUSTER_WEIGHT: f32 = 0.5;
pub const HIGH_DETAIL_THRESHOLD: f32 = 0.4;

/// Statistical summary of one mesh's fine and thin detail
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureProfile {
    pub small_feature_count: usize,
    pub thin_feature_count: usize,
    /// Number of triangles sampled
    pub total_features: usize,
    /// Share of density buckets where flagged triangles cluster
    pub complexity_ratio: f32,
    pub geometry_complexity: f32,
    pub is_high_detail: bool,
}

impl FeatureProfile {
    pub fn small_ratio(&self) -> f32 {
        ratio(self.small_feature_count, self.total_features)
    }

    pub fn thin_ratio(&self) -> f32 {
        ratio(self.thin_feature_count, self.total_features)
    }
}

fn ratio(count: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        count as f32 / total as f32
    }
}

#[derive(Debug, Clone, Copy)]
struct TriangleMetrics {
    centroid: Point3f,
    is_small: bool,
    is_thin: bool,
}

#[derive(Debug, Default)]
struct DensityBucket {
    triangles: usize,
    flagged: bool,
}

fn measure_triangle(corners: [Point3f; 3], small_area: f32, thin_edge: f32) -> TriangleMetrics {
    let [a, b, c] = corners;
    let e0 = (b - a).norm();
    let e1 = (c - b).norm();
    let e2 = (a - c).norm();

    // Heron's formula; the product can dip just below zero for slivers
    let s = (e0 + e1 + e2) * 0.5;
    let area = (s * (s - e0) * (s - e1) * (s - e2)).max(0.0).sqrt();

    let max_edge = e0.max(e1).max(e2);
    let min_edge = e0.min(e1).min(e2);

    let is_small = area < small_area;
    let is_thin = max_edge / min_edge > THIN_ASPECT_RATIO || min_edge < thin_edge;

    TriangleMetrics {
        centroid: Point3f::from((a.coords + b.coords + c.coords) / 3.0),
        is_small,
        is_thin,
    }
}

fn density_key(p: &Point3f) -> (i64, i64, i64) {
    (
        (p.x * DENSITY_CELL_SCALE).round() as i64,
        (p.y * DENSITY_CELL_SCALE).round() as i64,
        (p.z * DENSITY_CELL_SCALE).round() as i64,
    )
}

/// Feature-size analyzer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureAnalyzer {
    /// Upper bound on the number of triangles sampled
    pub max_samples: usize,
    /// Seed for the sampling RNG
    pub seed: u64,
}

impl Default for FeatureAnalyzer {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl FeatureAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(max_samples: usize, seed: u64) -> Self {
        Self { max_samples, seed }
    }

    /// Analyze a mesh using this analyzer's sampling policy
    pub fn analyze(&self, mesh: &MeshBuffer) -> FeatureProfile {
        let samples = self.sample_triangles(mesh);
        self.analyze_samples(mesh, &samples)
    }

    /// Pick up to `max_samples` distinct triangle indices
    pub fn sample_triangles(&self, mesh: &MeshBuffer) -> Vec<usize> {
        let triangle_count = mesh.triangle_count();
        if triangle_count <= self.max_samples {
            return (0..triangle_count).collect();
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut samples = index::sample(&mut rng, triangle_count, self.max_samples).into_vec();
        samples.sort_unstable();
        samples
    }

    /// Analyze a mesh over an explicit set of triangle indices.
    ///
    /// Repeated and out-of-range indices are ignored.
    pub fn analyze_samples(&self, mesh: &MeshBuffer, samples: &[usize]) -> FeatureProfile {
        let triangle_count = mesh.triangle_count();
        let vertex_count = mesh.vertex_count();

        let mut seen = HashSet::with_capacity(samples.len());
        let samples: Vec<usize> = samples
            .iter()
            .copied()
            .filter(|&t| t < triangle_count && seen.insert(t))
            .filter(|&t| mesh.triangle(t).iter().all(|&v| v < vertex_count))
            .collect();

        if samples.is_empty() {
            return FeatureProfile::default();
        }

        let diagonal = mesh.bounding_box().diagonal();
        let small_threshold = diagonal * SMALL_FEATURE_SCALE;
        let thin_threshold = diagonal * THIN_FEATURE_SCALE;
        let small_area = small_threshold * small_threshold;

        let metrics: Vec<TriangleMetrics> = samples
            .par_iter()
            .map(|&t| measure_triangle(mesh.triangle_positions(t), small_area, thin_threshold))
            .collect();

        let mut small_feature_count = 0;
        let mut thin_feature_count = 0;
        let mut density: HashMap<(i64, i64, i64), DensityBucket> = HashMap::new();

        for m in &metrics {
            if m.is_small {
                small_feature_count += 1;
            }
            if m.is_thin {
                thin_feature_count += 1;
            }
            let bucket = density.entry(density_key(&m.centroid)).or_default();
            bucket.triangles += 1;
            bucket.flagged |= m.is_small || m.is_thin;
        }

        let clustered = density
            .values()
            .filter(|b| b.triangles > DENSE_BUCKET_MIN_TRIANGLES && b.flagged)
            .count();
        let complexity_ratio = ratio(clustered, density.len());

        let total_features = metrics.len();
        let small_ratio = ratio(small_feature_count, total_features);
        let thin_ratio = ratio(thin_feature_count, total_features);
        let geometry_complexity = (small_ratio * SMALL_WEIGHT
            + thin_ratio * THIN_WEIGHT
            + complexity_ratio * CLUSTER_WEIGHT)
            .clamp(0.0, 1.0);

        FeatureProfile {
            small_feature_count,
            thin_feature_count,
            total_features,
            complexity_ratio,
            geometry_complexity,
            is_high_detail: geometry_complexity > HIGH_DETAIL_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_plane_grid(size: usize, spacing: f32) -> MeshBuffer {
        let mut positions = Vec::new();
        for y in 0..size {
            for x in 0..size {
                positions.push(Point3f::new(x as f32 * spacing, y as f32 * spacing, 0.0));
            }
        }
        let mut triangles = Vec::new();
        for y in 0..(size - 1) {
            for x in 0..(size - 1) {
                let tl = (y * size + x) as u32;
                let tr = tl + 1;
                let bl = ((y + 1) * size + x) as u32;
                let br = bl + 1;
                triangles.push([tl, bl, tr]);
                triangles.push([tr, bl, br]);
            }
        }
        MeshBuffer::from_triangles(positions, &triangles)
    }

    /// A unit grid plus a cluster of slivers packed into one density bucket
    fn make_grid_with_slivers(sliver_count: usize) -> MeshBuffer {
        let mut mesh = make_plane_grid(11, 0.1);
        let mut indices = mesh.indices.take().unwrap();
        for i in 0..sliver_count {
            let base = mesh.positions.len() as u32;
            let x = 0.5 + i as f32 * 1e-4;
            mesh.positions.push(Point3f::new(x, 0.5, 0.1));
            mesh.positions.push(Point3f::new(x + 0.002, 0.5, 0.1));
            mesh.positions.push(Point3f::new(x, 0.5001, 0.1));
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        mesh.indices = Some(indices);
        mesh
    }

    #[test]
    fn test_regular_grid_is_simple() {
        let mesh = make_plane_grid(20, 0.1);
        let profile = FeatureAnalyzer::new().analyze(&mesh);
        assert_eq!(profile.total_features, mesh.triangle_count());
        assert_eq!(profile.small_feature_count, 0);
        assert_eq!(profile.thin_feature_count, 0);
        assert_eq!(profile.complexity_ratio, 0.0);
        assert_eq!(profile.geometry_complexity, 0.0);
        assert!(!profile.is_high_detail);
    }

    #[test]
    fn test_scale_invariance() {
        let small = make_grid_with_slivers(6);
        let mut large = small.clone();
        for p in &mut large.positions {
            *p = Point3f::from(p.coords * 1000.0);
        }
        let analyzer = FeatureAnalyzer::new();
        let a = analyzer.analyze(&small);
        let b = analyzer.analyze(&large);
        assert_eq!(a.small_feature_count, b.small_feature_count);
        assert_eq!(a.thin_feature_count, b.thin_feature_count);
    }

    #[test]
    fn test_slivers_are_thin_and_clustered() {
        let mesh = make_grid_with_slivers(6);
        let profile = FeatureAnalyzer::new().analyze(&mesh);
        assert_eq!(profile.thin_feature_count, 6);
        assert!(profile.complexity_ratio > 0.0);
        assert!(profile.geometry_complexity > 0.0);
        assert!(profile.geometry_complexity <= 1.0);
    }

    #[test]
    fn test_injected_samples_deduplicated() {
        let mesh = make_plane_grid(5, 1.0);
        let analyzer = FeatureAnalyzer::new();
        let profile = analyzer.analyze_samples(&mesh, &[0, 0, 1, 1, 2, 999]);
        assert_eq!(profile.total_features, 3);
    }

    #[test]
    fn test_degenerate_triangle_has_no_nan() {
        let mesh = MeshBuffer::from_triangles(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(2.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 1, 3]],
        );
        let profile = FeatureAnalyzer::new().analyze(&mesh);
        assert!(profile.geometry_complexity.is_finite());
        assert_eq!(profile.small_feature_count, 1);
    }

    #[test]
    fn test_sampling_is_capped_distinct_and_deterministic() {
        let mesh = make_plane_grid(30, 0.1);
        let analyzer = FeatureAnalyzer::with_params(100, 7);
        let a = analyzer.sample_triangles(&mesh);
        let b = analyzer.sample_triangles(&mesh);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        let unique: HashSet<_> = a.iter().collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_empty_mesh() {
        let profile = FeatureAnalyzer::new().analyze(&MeshBuffer::new());
        assert_eq!(profile, FeatureProfile::default());
        assert_relative_eq!(profile.small_ratio(), 0.0);
    }
}
