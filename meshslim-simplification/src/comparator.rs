//! Feature-loss comparison between an original mesh and a simplified candidate

use crate::analyzer::{FeatureAnalyzer, FeatureProfile};
use meshslim_core::MeshBuffer;

const SMALL_LOSS_WEIGHT: f32 = 0.35;
const THIN_LOSS_WEIGHT: f32 = 0.45;
const COMPLEXITY_CHANGE_WEIGHT: f32 = 0.20;
const MIN_COMPLEXITY_DENOMINATOR: f32 = 0.1;

pub const DETAILED_LOSS_THRESHOLD: f32 = 0.12;
pub const LOSS_THRESHOLD: f32 = 0.18;

/// How much small and thin detail a candidate destroyed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureLoss {
    pub loss_ratio: f32,
    pub small_feature_loss_ratio: f32,
    pub thin_feature_loss_ratio: f32,
    pub complexity_change_ratio: f32,
}

/// Compares feature profiles of an original and a candidate geometry.
///
/// Thin-feature loss carries the highest weight: thin structures are the
/// first casualties of simplification and the most visible ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureLossComparator {
    analyzer: FeatureAnalyzer,
}

impl FeatureLossComparator {
    pub fn new(analyzer: FeatureAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &FeatureAnalyzer {
        &self.analyzer
    }

    pub fn compare(&self, original: &MeshBuffer, candidate: &MeshBuffer) -> FeatureLoss {
        let original_profile = self.analyzer.analyze(original);
        self.compare_with_profile(&original_profile, candidate)
    }

    /// Compare against an already computed original profile
    pub fn compare_with_profile(
        &self,
        original: &FeatureProfile,
        candidate: &MeshBuffer,
    ) -> FeatureLoss {
        let candidate_profile = self.analyzer.analyze(candidate);
        compare_profiles(original, &candidate_profile)
    }
}

/// Fraction of one feature class that disappeared. A class the original
/// never had cannot be lost, and gained features do not offset losses.
fn class_loss(original: usize, candidate: usize) -> f32 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - candidate as f32 / original.max(1) as f32).max(0.0)
}

pub fn compare_profiles(original: &FeatureProfile, candidate: &FeatureProfile) -> FeatureLoss {
    let small_feature_loss_ratio =
        class_loss(original.small_feature_count, candidate.small_feature_count);
    let thin_feature_loss_ratio =
        class_loss(original.thin_feature_count, candidate.thin_feature_count);
    let complexity_change_ratio = (candidate.geometry_complexity - original.geometry_complexity)
        .abs()
        / original.geometry_complexity.max(MIN_COMPLEXITY_DENOMINATOR);

    let loss_ratio = small_feature_loss_ratio * SMALL_LOSS_WEIGHT
        + thin_feature_loss_ratio * THIN_LOSS_WEIGHT
        + complexity_change_ratio * COMPLEXITY_CHANGE_WEIGHT;

    FeatureLoss {
        loss_ratio,
        small_feature_loss_ratio,
        thin_feature_loss_ratio,
        complexity_change_ratio,
    }
}

/// Loss ratio above which features count as lost; tighter for detailed meshes
pub fn loss_threshold(original: &FeatureProfile) -> f32 {
    if original.is_high_detail {
        DETAILED_LOSS_THRESHOLD
    } else {
        LOSS_THRESHOLD
    }
}

pub fn features_lost(loss: &FeatureLoss, original: &FeatureProfile) -> bool {
    loss.loss_ratio > loss_threshold(original)
}
