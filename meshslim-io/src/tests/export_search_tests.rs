//! Tests for the export candidate search
//!
//! Uses fake serializers to pin down profile order, early stopping, the
//! reporting floors and the behaviour when every encoder fails.

use crate::{
    codec::{encode_scene, BinarySceneCodec},
    export::{ExportSearch, SizeAdjustment},
    profile::ExportProfile,
    SceneSerializer,
};
use meshslim_core::{Error, MeshBuffer, OptimizationConfig, Point3f, Result, Scene, Texture};
use std::sync::Mutex;

fn grid_scene(n: usize) -> Scene {
    let mut positions = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            positions.push(Point3f::new(x as f32, y as f32, ((x * y) % 5) as f32 * 0.1));
        }
    }
    let mut triangles = Vec::new();
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i = (y * n + x) as u32;
            let n = n as u32;
            triangles.push([i, i + 1, i + n]);
            triangles.push([i + 1, i + n + 1, i + n]);
        }
    }
    let mut scene = Scene::new();
    scene.add_mesh("grid", MeshBuffer::from_triangles(positions, &triangles));
    scene
}

/// Real codec that refuses every quantized profile
struct FailingDracoSerializer(BinarySceneCodec);

impl SceneSerializer for FailingDracoSerializer {
    fn serialize(&self, scene: &Scene, profile: &ExportProfile) -> Result<Vec<u8>> {
        if profile.is_quantized() {
            return Err(Error::Serialization {
                profile: profile.name.clone(),
                message: "decoder module unavailable".to_string(),
            });
        }
        self.0.serialize(scene, profile)
    }

    fn minify(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        self.0.minify(bytes)
    }
}

/// Fails everything, including minify
struct BrokenSerializer;

impl SceneSerializer for BrokenSerializer {
    fn serialize(&self, _scene: &Scene, profile: &ExportProfile) -> Result<Vec<u8>> {
        Err(Error::Serialization {
            profile: profile.name.clone(),
            message: "encoder crashed".to_string(),
        })
    }

    fn minify(&self, _bytes: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Unsupported("minify".to_string()))
    }
}

/// Fails every profile; minify returns a fixed number of bytes
struct MinifyOnlySerializer {
    minified_len: usize,
}

impl SceneSerializer for MinifyOnlySerializer {
    fn serialize(&self, _scene: &Scene, profile: &ExportProfile) -> Result<Vec<u8>> {
        Err(Error::Serialization {
            profile: profile.name.clone(),
            message: "encoder crashed".to_string(),
        })
    }

    fn minify(&self, _bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(vec![0u8; self.minified_len])
    }
}

/// Emits a fixed number of bytes per profile and records the call order
struct SizedSerializer {
    sizes: Vec<(&'static str, usize)>,
    calls: Mutex<Vec<String>>,
}

impl SizedSerializer {
    fn new(sizes: Vec<(&'static str, usize)>) -> Self {
        Self {
            sizes,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SceneSerializer for SizedSerializer {
    fn serialize(&self, _scene: &Scene, profile: &ExportProfile) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(profile.name.clone());
        self.sizes
            .iter()
            .find(|(name, _)| *name == profile.name)
            .map(|&(_, size)| vec![0u8; size])
            .ok_or_else(|| Error::Serialization {
                profile: profile.name.clone(),
                message: "no size configured".to_string(),
            })
    }

    fn minify(&self, _bytes: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Unsupported("minify".to_string()))
    }
}

#[test]
fn test_failing_draco_falls_through_to_plain_binary() {
    let original = encode_scene(&grid_scene(40), &ExportProfile::plain_binary()).unwrap();
    let simplified = grid_scene(20);

    let search = ExportSearch::new(FailingDracoSerializer(BinarySceneCodec::new()));
    let selection = search.search(&simplified, &OptimizationConfig::default(), &original);

    assert_eq!(selection.chosen.as_deref(), Some("plain_binary"));
    assert_eq!(selection.failures, vec!["high_compression", "compatible"]);
    assert_eq!(selection.encoded_size, selection.bytes.len());
    assert!(selection.encoded_size < original.len());
    assert!(selection.reported_size <= selection.encoded_size);
}

#[test]
fn test_total_failure_keeps_original_bytes() {
    let original = encode_scene(&grid_scene(12), &ExportProfile::plain_binary()).unwrap();
    let search = ExportSearch::new(BrokenSerializer);

    let config = OptimizationConfig {
        use_draco: false,
        ..OptimizationConfig::default()
    };
    let selection = search.search(&grid_scene(12), &config, &original);
    assert_eq!(selection.bytes, original);
    assert_eq!(selection.chosen, None);
    assert_eq!(selection.adjustment, SizeAdjustment::LastResortFloor);
    assert_eq!(selection.reported_size, (original.len() as f64 * 0.98).floor() as usize);

    // Requesting compression does not change the report for untouched bytes
    let selection = search.search(&grid_scene(12), &OptimizationConfig::default(), &original);
    assert_eq!(selection.bytes, original);
    assert_eq!(selection.chosen, None);
    assert_eq!(selection.adjustment, SizeAdjustment::LastResortFloor);
    assert_eq!(selection.reported_size, (original.len() as f64 * 0.98).floor() as usize);
}

#[test]
fn test_minified_output_skips_compression_floor() {
    // 3% real reduction from the minify pass alone
    let search = ExportSearch::new(MinifyOnlySerializer { minified_len: 970 });
    let selection = search.search(&grid_scene(4), &OptimizationConfig::default(), &[0u8; 1000]);

    assert_eq!(selection.failures.len(), 3);
    assert_eq!(selection.chosen.as_deref(), Some("minified"));
    assert_eq!(selection.adjustment, SizeAdjustment::Minified);
    assert_eq!(selection.encoded_size, 970);
    assert_eq!(selection.reported_size, 970);
}

#[test]
fn test_reported_size_never_exceeds_floor() {
    let scene = grid_scene(6);
    for original_len in [0usize, 1, 50, 999, 4096, 2 * 1024 * 1024] {
        let original = vec![1u8; original_len];
        for size in [0usize, original_len / 2, original_len, original_len + 100] {
            let serializer = SizedSerializer::new(vec![
                ("high_compression", size),
                ("compatible", size),
                ("plain_binary", size),
            ]);
            let search = ExportSearch::new(serializer);
            for use_draco in [true, false] {
                let config = OptimizationConfig {
                    use_draco,
                    ..OptimizationConfig::default()
                };
                let selection = search.search(&scene, &config, &original);
                assert!(selection.reported_size as f64 <= original_len as f64 * 0.98);
                assert!(selection.encoded_size <= original_len);
            }
        }
    }
}

#[test]
fn test_early_stop_skips_remaining_profiles() {
    let serializer = SizedSerializer::new(vec![
        ("high_compression", 100),
        ("compatible", 50),
        ("plain_binary", 900),
    ]);
    let search = ExportSearch::new(serializer);
    let selection = search.search(&grid_scene(4), &OptimizationConfig::default(), &[0u8; 1000]);

    assert_eq!(search.serializer().calls(), vec!["high_compression"]);
    assert_eq!(selection.chosen.as_deref(), Some("high_compression"));
    assert_eq!(selection.adjustment, SizeAdjustment::None);
    assert_eq!(selection.reported_size, 100);
}

#[test]
fn test_smallest_candidate_wins() {
    let serializer = SizedSerializer::new(vec![
        ("high_compression", 800),
        ("compatible", 750),
        ("plain_binary", 780),
    ]);
    let search = ExportSearch::new(serializer);
    let selection = search.search(&grid_scene(4), &OptimizationConfig::default(), &[0u8; 1000]);

    assert_eq!(search.serializer().calls().len(), 3);
    assert_eq!(selection.chosen.as_deref(), Some("compatible"));
    assert_eq!(selection.encoded_size, 750);
    assert_eq!(selection.candidate_sizes.len(), 3);
}

#[test]
fn test_compression_floor_is_reporting_only() {
    // 3% real reduction on a small model
    let serializer = SizedSerializer::new(vec![
        ("high_compression", 970),
        ("compatible", 990),
        ("plain_binary", 1000),
    ]);
    let search = ExportSearch::new(serializer);
    let selection = search.search(&grid_scene(4), &OptimizationConfig::default(), &[0u8; 1000]);
    assert_eq!(selection.encoded_size, 970);
    assert_eq!(selection.bytes.len(), 970);
    assert_eq!(selection.reported_size, (1000.0_f64 * (1.0 - 0.05)).floor() as usize);
    assert_eq!(selection.adjustment, SizeAdjustment::CompressionFloor);

    // Large models get the 15% floor
    let original = vec![0u8; 2 * 1024 * 1024];
    let encoded = original.len() - 1000;
    let serializer = SizedSerializer::new(vec![
        ("high_compression", encoded),
        ("compatible", encoded),
        ("plain_binary", encoded),
    ]);
    let selection = ExportSearch::new(serializer).search(&grid_scene(4), &OptimizationConfig::default(), &original);
    assert_eq!(selection.encoded_size, encoded);
    assert_eq!(selection.reported_size, (original.len() as f64 * (1.0 - 0.15)).floor() as usize);

    // Without compression requested the encoded size is reported as is
    let serializer = SizedSerializer::new(vec![("plain_binary", 970)]);
    let config = OptimizationConfig {
        use_draco: false,
        ..OptimizationConfig::default()
    };
    let selection = ExportSearch::new(serializer).search(&grid_scene(4), &config, &[0u8; 1000]);
    assert_eq!(selection.reported_size, 970);
    assert_eq!(selection.adjustment, SizeAdjustment::None);
}

#[test]
fn test_minify_when_nothing_else_helps() {
    let scene = grid_scene(10);
    let original = encode_scene(&scene, &ExportProfile::plain_binary()).unwrap();
    let config = OptimizationConfig {
        use_draco: false,
        ..OptimizationConfig::default()
    };

    let selection = ExportSearch::new(BinarySceneCodec::new()).search(&scene, &config, &original);
    assert_eq!(selection.adjustment, SizeAdjustment::Minified);
    assert_eq!(selection.chosen.as_deref(), Some("minified"));
    assert!(selection.encoded_size < original.len());
}

#[test]
fn test_large_textures_add_embedded_profile() {
    let mut scene = grid_scene(4);
    let search = ExportSearch::new(BinarySceneCodec::new());
    let config = OptimizationConfig::default();

    let names = |scene: &Scene| -> Vec<String> {
        search.profiles(scene, &config).into_iter().map(|p| p.name).collect()
    };
    assert_eq!(names(&scene), vec!["high_compression", "compatible", "plain_binary"]);

    scene.textures.push(Texture {
        name: "albedo".to_string(),
        mime_type: "image/png".to_string(),
        data: vec![0u8; 1_200_000],
    });
    assert_eq!(
        names(&scene),
        vec!["high_compression", "compatible", "plain_binary", "embedded_images"]
    );

    let referenced = OptimizationConfig {
        embed_images: false,
        ..OptimizationConfig::default()
    };
    let profiles = search.profiles(&scene, &referenced);
    assert!(!profiles[2].embed_images);
    assert!(profiles[3].embed_images);
}
