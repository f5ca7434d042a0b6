//! Tunable thresholds and step sizes for the adaptive simplifier

use std::time::Duration;

/// Policy table for the adaptive simplification loop.
///
/// Every constant the retry loop and its acceptance checks depend on lives
/// here so tuning never touches control flow.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplificationPolicy {
    /// Maximum number of reduction attempts per mesh
    pub max_attempts: usize,
    /// Positional epsilon for duplicate-vertex merging, in model units
    pub dedup_epsilon: f32,

    /// `geometry_complexity` above which the mesh is treated as very complex
    pub very_complex_threshold: f32,
    /// `geometry_complexity` above which the mesh is treated as complex
    pub complex_threshold: f32,
    /// Simplification factor multipliers for very complex, complex and simple meshes
    pub very_complex_factor: f32,
    pub complex_factor: f32,
    pub simple_factor: f32,

    /// Lower bound of the initial target ratio (never plan to remove more than 40% up front)
    pub min_initial_target_ratio: f32,
    /// Target ratio increase after a rejected attempt
    pub ratio_step: f32,
    /// Upper bound of the target ratio
    pub max_target_ratio: f32,
    /// Once the target ratio exceeds this, a rejection ends the loop
    pub give_up_ratio: f32,

    /// Per-axis bounding box deviation allowed for high-detail / other meshes
    pub detailed_distortion_threshold: f32,
    pub distortion_threshold: f32,

    /// Crease angles in degrees for high-detail / other meshes
    pub detailed_crease_angle: f32,
    pub crease_angle: f32,

    /// Wall-clock budget for the background worker
    pub worker_timeout: Duration,
}

impl Default for SimplificationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            dedup_epsilon: 1e-4,
            very_complex_threshold: 0.7,
            complex_threshold: 0.4,
            very_complex_factor: 0.15,
            complex_factor: 0.3,
            simple_factor: 0.7,
            min_initial_target_ratio: 0.6,
            ratio_step: 0.05,
            max_target_ratio: 0.98,
            give_up_ratio: 0.9,
            detailed_distortion_threshold: 0.01,
            distortion_threshold: 0.02,
            detailed_crease_angle: 2.5,
            crease_angle: 3.0,
            worker_timeout: Duration::from_secs(30),
        }
    }
}

impl SimplificationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of vertices to remove, derived from the mesh complexity and
    /// the requested simplification ratio
    pub fn simplification_factor(&self, geometry_complexity: f32, requested_ratio: f32) -> f32 {
        let multiplier = if geometry_complexity > self.very_complex_threshold {
            self.very_complex_factor
        } else if geometry_complexity > self.complex_threshold {
            self.complex_factor
        } else {
            self.simple_factor
        };
        multiplier * requested_ratio
    }

    pub fn initial_target_ratio(&self, factor: f32) -> f32 {
        (1.0 - factor).max(self.min_initial_target_ratio)
    }

    /// Relaxed target after a rejection, or `None` when the loop should give up
    pub fn relax_target_ratio(&self, current: f32) -> Option<f32> {
        if current > self.give_up_ratio {
            None
        } else {
            Some((current + self.ratio_step).min(self.max_target_ratio))
        }
    }

    pub fn distortion_threshold_for(&self, high_detail: bool) -> f32 {
        if high_detail {
            self.detailed_distortion_threshold
        } else {
            self.distortion_threshold
        }
    }

    pub fn crease_angle_for(&self, high_detail: bool) -> f32 {
        if high_detail {
            self.detailed_crease_angle
        } else {
            self.crease_angle
        }
    }
}
