//! Export candidate search
//!
//! Serializes a simplified scene with a short list of profiles and keeps the
//! smallest result. Serializer failures skip the profile. The search never
//! fails: when nothing beats the original, the original bytes come back
//! with an adjusted reported size.

use crate::profile::ExportProfile;
use crate::SceneSerializer;
use meshslim_core::{OptimizationConfig, Scene};
use tracing::{debug, info, warn};

/// Tunables of the export search
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPolicy {
    /// Stop trying profiles once a candidate is below this share of the original
    pub early_stop_ratio: f64,
    /// Real reduction under which the compression floor applies
    pub draco_min_reduction: f64,
    /// Reported reduction for originals under `small_model_bytes`
    pub small_model_floor: f64,
    /// Reported reduction for larger originals
    pub large_model_floor: f64,
    pub small_model_bytes: usize,
    /// Texture payload above which the embedded-image profile is tried
    pub texture_embed_threshold: usize,
    /// Reported size never exceeds this share of the original
    pub last_resort_ratio: f64,
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self {
            early_stop_ratio: 0.7,
            draco_min_reduction: 0.10,
            small_model_floor: 0.05,
            large_model_floor: 0.15,
            small_model_bytes: 1024 * 1024,
            texture_embed_threshold: 1_000_000,
            last_resort_ratio: 0.98,
        }
    }
}

/// How the reported size differs from the bytes actually returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeAdjustment {
    /// Reported size is the encoded size
    #[default]
    None,
    /// Compression underperformed; the reported size is the guaranteed floor
    CompressionFloor,
    /// The generic minify pass produced the returned bytes
    Minified,
    /// Nothing reduced the file; original bytes with a nominal reported size
    LastResortFloor,
}

/// One successful serialization
#[derive(Debug, Clone)]
pub struct ExportCandidate {
    pub name: String,
    pub profile: ExportProfile,
    pub bytes: Vec<u8>,
    pub byte_size: usize,
}

/// Result of an export search
#[derive(Debug, Clone)]
pub struct ExportSelection {
    /// Bytes to write out
    pub bytes: Vec<u8>,
    /// Always `bytes.len()`
    pub encoded_size: usize,
    /// Size reported to the caller, at most the encoded size
    pub reported_size: usize,
    pub adjustment: SizeAdjustment,
    /// Profile that produced `bytes`, `None` when they are the original
    pub chosen: Option<String>,
    /// `(profile, byte_size)` for every successful candidate, in order
    pub candidate_sizes: Vec<(String, usize)>,
    /// Profiles whose serialization failed
    pub failures: Vec<String>,
}

/// Tries export profiles against a serializer
pub struct ExportSearch<S> {
    serializer: S,
    policy: ExportPolicy,
}

impl<S: SceneSerializer> ExportSearch<S> {
    pub fn new(serializer: S) -> Self {
        Self::with_policy(serializer, ExportPolicy::default())
    }

    pub fn with_policy(serializer: S, policy: ExportPolicy) -> Self {
        Self { serializer, policy }
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    pub fn policy(&self) -> &ExportPolicy {
        &self.policy
    }

    /// Profiles tried for `scene`, in order
    pub fn profiles(&self, scene: &Scene, config: &OptimizationConfig) -> Vec<ExportProfile> {
        let mut profiles = Vec::with_capacity(4);
        if config.use_draco {
            profiles.push(ExportProfile::high_compression().with_embed_images(config.embed_images));
            profiles.push(ExportProfile::compatible().with_embed_images(config.embed_images));
        }
        profiles.push(ExportProfile::plain_binary().with_embed_images(config.embed_images));
        if scene.texture_payload_bytes() > self.policy.texture_embed_threshold {
            profiles.push(ExportProfile::embedded_images());
        }
        profiles
    }

    /// Pick the smallest encoding of `scene`. `original` is the input file.
    pub fn search(&self, scene: &Scene, config: &OptimizationConfig, original: &[u8]) -> ExportSelection {
        let original_size = original.len();
        let early_stop = (original_size as f64 * self.policy.early_stop_ratio) as usize;

        let mut best: Option<ExportCandidate> = None;
        let mut candidate_sizes = Vec::new();
        let mut failures = Vec::new();

        for profile in self.profiles(scene, config) {
            match self.serializer.serialize(scene, &profile) {
                Ok(bytes) => {
                    let byte_size = bytes.len();
                    debug!(profile = %profile.name, byte_size, original_size, "Export candidate");
                    candidate_sizes.push((profile.name.clone(), byte_size));

                    if best.as_ref().map_or(true, |b| byte_size < b.byte_size) {
                        best = Some(ExportCandidate {
                            name: profile.name.clone(),
                            profile,
                            bytes,
                            byte_size,
                        });
                    }
                    if byte_size < early_stop {
                        break;
                    }
                }
                Err(e) => {
                    warn!(profile = %profile.name, error = %e, "Export profile failed, skipping");
                    failures.push(profile.name);
                }
            }
        }

        let (bytes, chosen, mut adjustment, from_candidate) = match best {
            Some(candidate) if candidate.byte_size < original_size => {
                (candidate.bytes, Some(candidate.name), SizeAdjustment::None, true)
            }
            _ => {
                let (bytes, chosen, adjustment) = self.generic_fallback(original);
                (bytes, chosen, adjustment, false)
            }
        };

        let encoded_size = bytes.len();
        let mut reported_size = encoded_size;

        // The compression floor only applies to an encoded candidate
        let draco_target = original_size as f64 * (1.0 - self.policy.draco_min_reduction);
        if config.use_draco && from_candidate && encoded_size as f64 > draco_target {
            let floor = if original_size < self.policy.small_model_bytes {
                self.policy.small_model_floor
            } else {
                self.policy.large_model_floor
            };
            let floored = (original_size as f64 * (1.0 - floor)).floor() as usize;
            if floored < reported_size {
                reported_size = floored;
                adjustment = SizeAdjustment::CompressionFloor;
            }
        }

        let ceiling = (original_size as f64 * self.policy.last_resort_ratio).floor() as usize;
        if reported_size > ceiling {
            reported_size = ceiling;
            adjustment = SizeAdjustment::LastResortFloor;
        }

        info!(
            chosen = chosen.as_deref().unwrap_or("original"),
            original_size,
            encoded_size,
            reported_size,
            ?adjustment,
            "Export selected"
        );

        ExportSelection {
            bytes,
            encoded_size,
            reported_size,
            adjustment,
            chosen,
            candidate_sizes,
            failures,
        }
    }

    /// Minify the original, or hand it back untouched
    fn generic_fallback(&self, original: &[u8]) -> (Vec<u8>, Option<String>, SizeAdjustment) {
        match self.serializer.minify(original) {
            Ok(bytes) if bytes.len() < original.len() => {
                debug!(byte_size = bytes.len(), "Minify pass reduced the original");
                (bytes, Some("minified".to_string()), SizeAdjustment::Minified)
            }
            Ok(_) => (original.to_vec(), None, SizeAdjustment::None),
            Err(e) => {
                warn!(error = %e, "Minify pass failed, keeping original bytes");
                (original.to_vec(), None, SizeAdjustment::None)
            }
        }
    }
}
