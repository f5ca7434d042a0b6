//! Adaptive simplification loop
//!
//! A mesh first goes through one duplicate-merge pass, then through a bounded
//! series of reduction attempts. Every attempt reduces the unmodified
//! loop-entry geometry to a vertex target, repairs material groups and
//! normals, and is accepted only if the bounding box barely moved and the
//! feature-loss comparator is satisfied. Rejected attempts relax the target
//! ratio until the policy gives up.

use crate::analyzer::{FeatureAnalyzer, FeatureProfile};
use crate::comparator::{features_lost, loss_threshold, FeatureLossComparator};
use crate::material_groups::remap_groups;
use crate::normals::recompute_normals;
use crate::policy::SimplificationPolicy;
use crate::{AttemptRejection, DuplicateMerger, VertexReducer};
use meshslim_core::{Aabb, Bounded, MeshBuffer, OptimizationConfig};
use tracing::{debug, info, warn};

const DEGENERATE_EXTENT: f32 = 1e-9;

/// What happened to one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimplificationOutcome {
    /// Whether the mesh was changed at all
    pub modified: bool,
    pub deduplicated: bool,
    pub simplified: bool,
    /// Number of reduction attempts made
    pub attempts: usize,
    pub original_vertex_count: usize,
    pub final_vertex_count: usize,
    /// Target ratio used by each attempt, in order
    pub target_ratios: Vec<f32>,
    pub rejections: Vec<AttemptRejection>,
    /// Human-readable change log lines
    pub changes: Vec<String>,
}

/// Per-mesh state of the reduction loop
#[derive(Debug, Clone)]
pub struct SimplificationState {
    pub original_vertex_count: usize,
    pub original_face_count: usize,
    /// Geometry the loop started from; every attempt reduces this
    pub current_best: MeshBuffer,
    pub current_best_vertex_count: usize,
    pub current_target_ratio: f32,
    pub attempts: usize,
    pub target_ratios: Vec<f32>,
}

impl SimplificationState {
    pub fn new(entry: MeshBuffer, initial_target_ratio: f32) -> Self {
        Self {
            original_vertex_count: entry.vertex_count(),
            original_face_count: entry.triangle_count(),
            current_best_vertex_count: entry.vertex_count(),
            current_best: entry,
            current_target_ratio: initial_target_ratio,
            attempts: 0,
            target_ratios: Vec::new(),
        }
    }

    /// Vertex target for the next attempt, or `None` once no strict
    /// improvement over the current best is possible
    pub fn next_target(&self) -> Option<usize> {
        let planned = (self.original_vertex_count as f64 * self.current_target_ratio as f64)
            .floor() as usize;
        let target = planned.min(self.current_best_vertex_count.saturating_sub(1));
        if target == 0 || target >= self.current_best_vertex_count {
            None
        } else {
            Some(target)
        }
    }
}

/// Largest per-axis relative size change between two bounding boxes.
///
/// Axes with no extent in the original (flat meshes) are measured against
/// the original diagonal instead.
pub fn bounding_box_distortion(original: &Aabb, candidate: &Aabb) -> f32 {
    let old = original.size();
    let new = candidate.size();
    let diagonal = original.diagonal();

    (0..3)
        .map(|axis| {
            if old[axis] > DEGENERATE_EXTENT {
                (new[axis] / old[axis] - 1.0).abs()
            } else if diagonal > DEGENERATE_EXTENT {
                new[axis].abs() / diagonal
            } else {
                0.0
            }
        })
        .fold(0.0, f32::max)
}

/// Drives a vertex reducer and a duplicate merger under a quality guard
#[derive(Debug, Clone)]
pub struct AdaptiveSimplifier<R, M> {
    reducer: R,
    merger: M,
    policy: SimplificationPolicy,
    comparator: FeatureLossComparator,
}

impl<R: VertexReducer, M: DuplicateMerger> AdaptiveSimplifier<R, M> {
    pub fn new(reducer: R, merger: M) -> Self {
        Self {
            reducer,
            merger,
            policy: SimplificationPolicy::default(),
            comparator: FeatureLossComparator::default(),
        }
    }

    pub fn with_policy(mut self, policy: SimplificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_analyzer(mut self, analyzer: FeatureAnalyzer) -> Self {
        self.comparator = FeatureLossComparator::new(analyzer);
        self
    }

    pub fn policy(&self) -> &SimplificationPolicy {
        &self.policy
    }

    pub fn analyzer(&self) -> &FeatureAnalyzer {
        self.comparator.analyzer()
    }

    /// Deduplicate and simplify `mesh` in place.
    ///
    /// Never fails: reducer errors and rejected candidates are recorded in
    /// the outcome and the mesh keeps its best accepted state.
    pub fn simplify(&self, mesh: &mut MeshBuffer, config: &OptimizationConfig) -> SimplificationOutcome {
        let mut outcome = SimplificationOutcome {
            original_vertex_count: mesh.vertex_count(),
            ..Default::default()
        };

        if !mesh.is_empty() {
            outcome.deduplicated = config.remove_duplicates && self.deduplicate(mesh, &mut outcome);

            if outcome.deduplicated || config.simplify_geometry {
                let profile = self.analyzer().analyze(mesh);
                if outcome.deduplicated && (mesh.normals.is_some() || config.preserve_normals) {
                    recompute_normals(mesh, self.policy.crease_angle_for(profile.is_high_detail));
                }
                if config.simplify_geometry {
                    self.simplify_loop(mesh, &profile, config, &mut outcome);
                }
            }
        }

        outcome.final_vertex_count = mesh.vertex_count();
        outcome.modified = outcome.deduplicated || outcome.simplified;
        outcome
    }

    /// One merge pass. Returns true when the merged geometry replaced the mesh.
    fn deduplicate(&self, mesh: &mut MeshBuffer, outcome: &mut SimplificationOutcome) -> bool {
        let before = mesh.vertex_count();
        let merged = match self
            .merger
            .merge_duplicate_vertices(mesh, self.policy.dedup_epsilon)
        {
            Ok(merged) => merged,
            Err(e) => {
                warn!(error = %e, "Duplicate merge failed, keeping original geometry");
                return false;
            }
        };

        let after = merged.vertex_count();
        if after > before {
            warn!(before, after, "Duplicate merge increased vertex count, discarding");
            return false;
        }
        if after == before && merged.triangle_count() == mesh.triangle_count() && mesh.is_indexed()
        {
            return false;
        }

        debug!(before, after, "Merged duplicate vertices");
        outcome
            .changes
            .push(format!("Merged {} duplicate vertices", before - after));
        *mesh = merged;
        true
    }

    fn simplify_loop(
        &self,
        mesh: &mut MeshBuffer,
        profile: &FeatureProfile,
        config: &OptimizationConfig,
        outcome: &mut SimplificationOutcome,
    ) {
        let requested_ratio = config.simplification_ratio.clamp(0.0, 1.0);
        if requested_ratio <= 0.0 {
            return;
        }

        let factor = self
            .policy
            .simplification_factor(profile.geometry_complexity, requested_ratio);
        let crease_angle = self.policy.crease_angle_for(profile.is_high_detail);
        let distortion_threshold = self.policy.distortion_threshold_for(profile.is_high_detail);

        let mut state = SimplificationState::new(
            std::mem::take(mesh),
            self.policy.initial_target_ratio(factor),
        );
        let entry_box = state.current_best.bounding_box();
        let mut accepted = None;

        debug!(
            vertices = state.original_vertex_count,
            faces = state.original_face_count,
            complexity = profile.geometry_complexity,
            high_detail = profile.is_high_detail,
            target_ratio = state.current_target_ratio,
            "Starting adaptive simplification"
        );

        while state.attempts < self.policy.max_attempts {
            let target = match state.next_target() {
                Some(target) => target,
                None => break,
            };
            state.attempts += 1;
            state.target_ratios.push(state.current_target_ratio);

            let result = self.attempt(
                &state.current_best,
                profile,
                &entry_box,
                target,
                crease_angle,
                distortion_threshold,
            );

            match result {
                Ok(candidate) => {
                    info!(
                        attempt = state.attempts,
                        original = state.original_vertex_count,
                        result = candidate.vertex_count(),
                        "Accepted simplified mesh"
                    );
                    state.current_best_vertex_count = candidate.vertex_count();
                    accepted = Some(candidate);
                    break;
                }
                Err(rejection) => {
                    debug!(
                        attempt = state.attempts,
                        target,
                        target_ratio = state.current_target_ratio,
                        %rejection,
                        "Attempt rejected"
                    );
                    let is_violation =
                        matches!(rejection, AttemptRejection::ReductionViolation { .. });
                    outcome.rejections.push(rejection);
                    if is_violation {
                        break;
                    }
                    match self.policy.relax_target_ratio(state.current_target_ratio) {
                        Some(ratio) => state.current_target_ratio = ratio,
                        None => break,
                    }
                }
            }
        }

        outcome.attempts = state.attempts;
        outcome.target_ratios = state.target_ratios;

        match accepted {
            Some(candidate) => {
                let before = state.original_vertex_count;
                let after = candidate.vertex_count();
                outcome.simplified = true;
                outcome.changes.push(format!(
                    "Simplified from {} to {} vertices ({:.1}% reduction)",
                    before,
                    after,
                    (1.0 - after as f64 / before as f64) * 100.0
                ));
                *mesh = candidate;
            }
            None => {
                if state.attempts > 0 {
                    debug!(attempts = state.attempts, "No simplification accepted");
                }
                *mesh = state.current_best;
            }
        }
    }

    /// Produce and check one candidate. The candidate is dropped on every
    /// rejection path.
    fn attempt(
        &self,
        entry: &MeshBuffer,
        entry_profile: &FeatureProfile,
        entry_box: &Aabb,
        target: usize,
        crease_angle: f32,
        distortion_threshold: f32,
    ) -> Result<MeshBuffer, AttemptRejection> {
        let mut candidate = self
            .reducer
            .reduce_to_vertex_count(entry, target)
            .map_err(|e| AttemptRejection::PrimitiveFailure(e.to_string()))?;

        if candidate.vertex_count() >= entry.vertex_count() {
            return Err(AttemptRejection::ReductionViolation {
                original: entry.vertex_count(),
                result: candidate.vertex_count(),
            });
        }
        if candidate.is_empty() {
            return Err(AttemptRejection::QualityRejection {
                reason: "candidate has no triangles".to_string(),
            });
        }

        candidate.groups = remap_groups(&entry.groups, candidate.index_count(), entry.index_count());
        candidate
            .validate()
            .map_err(|e| AttemptRejection::PrimitiveFailure(e.to_string()))?;
        recompute_normals(&mut candidate, crease_angle);

        let distortion = bounding_box_distortion(entry_box, &candidate.bounding_box());
        if distortion > distortion_threshold {
            return Err(AttemptRejection::QualityRejection {
                reason: format!(
                    "bounding box changed by {:.2}% (limit {:.2}%)",
                    distortion * 100.0,
                    distortion_threshold * 100.0
                ),
            });
        }

        let loss = self.comparator.compare_with_profile(entry_profile, &candidate);
        if features_lost(&loss, entry_profile) {
            return Err(AttemptRejection::QualityRejection {
                reason: format!(
                    "feature loss {:.3} exceeds {:.3}",
                    loss.loss_ratio,
                    loss_threshold(entry_profile)
                ),
            });
        }

        Ok(candidate)
    }

    /// Direct pass without the adaptive loop: one merge and one plain
    /// reduce-to-ratio call, kept when it strictly lowers the vertex count.
    pub fn fallback_simplify(
        &self,
        mesh: &mut MeshBuffer,
        config: &OptimizationConfig,
    ) -> SimplificationOutcome {
        let mut outcome = SimplificationOutcome {
            original_vertex_count: mesh.vertex_count(),
            ..Default::default()
        };

        if !mesh.is_empty() {
            outcome.deduplicated = config.remove_duplicates && self.deduplicate(mesh, &mut outcome);

            let ratio = config.simplification_ratio.clamp(0.0, 1.0);
            if config.simplify_geometry && ratio > 0.0 {
                let before = mesh.vertex_count();
                let target = (before as f64 * (1.0 - ratio as f64)).floor() as usize;
                outcome.attempts = 1;
                outcome.target_ratios.push(1.0 - ratio);

                match self.reducer.reduce_to_vertex_count(mesh, target) {
                    Ok(mut reduced) if reduced.vertex_count() < before && !reduced.is_empty() => {
                        reduced.groups =
                            remap_groups(&mesh.groups, reduced.index_count(), mesh.index_count());
                        if let Err(e) = reduced.validate() {
                            warn!(error = %e, "Fallback reduction produced an invalid mesh");
                            outcome
                                .rejections
                                .push(AttemptRejection::PrimitiveFailure(e.to_string()));
                            outcome.final_vertex_count = mesh.vertex_count();
                            outcome.modified = outcome.deduplicated;
                            return outcome;
                        }
                        if mesh.normals.is_some() || config.preserve_normals {
                            recompute_normals(&mut reduced, self.policy.crease_angle);
                        }
                        outcome.simplified = true;
                        outcome.changes.push(format!(
                            "Reduced from {} to {} vertices",
                            before,
                            reduced.vertex_count()
                        ));
                        *mesh = reduced;
                    }
                    Ok(reduced) => outcome.rejections.push(AttemptRejection::ReductionViolation {
                        original: before,
                        result: reduced.vertex_count(),
                    }),
                    Err(e) => {
                        warn!(error = %e, "Fallback reduction failed");
                        outcome
                            .rejections
                            .push(AttemptRejection::PrimitiveFailure(e.to_string()));
                    }
                }
            }
        }

        outcome.final_vertex_count = mesh.vertex_count();
        outcome.modified = outcome.deduplicated || outcome.simplified;
        outcome
    }
}
