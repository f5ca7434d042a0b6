//! File optimization pipeline
//!
//! One file goes through: load, per-mesh simplification (optionally on the
//! background worker), pruning of meshes left without triangles, and the
//! export candidate search. Only a load failure is reported as an error;
//! everything after loading degrades to "no improvement".

use crate::change_log::ChangeLogEntry;
use meshslim_core::{MeshBuffer, OptimizationConfig, Result, Scene};
use meshslim_io::{
    BinarySceneCodec, ExportPolicy, ExportSearch, SceneLoader, SceneSerializer, SizeAdjustment,
};
use meshslim_simplification::{
    AdaptiveSimplifier, DuplicateMerger, GridMerger, QuadricReducer, SimplificationOutcome,
    SimplificationPolicy, SimplificationWorker, VertexReducer,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Configuration for the optimization pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Run per-mesh simplification on the background worker
    pub use_worker: bool,
    pub policy: SimplificationPolicy,
    pub export: ExportPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_worker: true,
            policy: SimplificationPolicy::default(),
            export: ExportPolicy::default(),
        }
    }
}

/// Result of optimizing one file
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub original_size: usize,
    /// Reported size, after any reporting floor
    pub optimized_size: usize,
    /// Length of `optimized_bytes`
    pub encoded_size: usize,
    #[serde(skip)]
    pub optimized_bytes: Vec<u8>,
    #[serde(skip)]
    pub size_adjustment: SizeAdjustment,
    /// Export profile that produced the bytes, `None` for the original
    pub export_profile: Option<String>,
    pub original_vertex_count: usize,
    pub original_poly_count: usize,
    pub optimized_vertex_count: usize,
    pub optimized_poly_count: usize,
    pub change_log: Vec<ChangeLogEntry>,
    /// Wall-clock processing time
    pub processing_time: Duration,
}

impl OptimizationResult {
    /// Reported size reduction as a fraction of the original
    pub fn reduction_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        1.0 - self.optimized_size as f64 / self.original_size as f64
    }
}

/// One file of a batch
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Per-file result of a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub result: Result<OptimizationResult>,
}

/// Loads, simplifies and re-exports scenes
pub struct OptimizationPipeline {
    config: PipelineConfig,
    loader: Box<dyn SceneLoader>,
    export: ExportSearch<Box<dyn SceneSerializer>>,
    worker: SimplificationWorker<Box<dyn VertexReducer>, Box<dyn DuplicateMerger>>,
}

impl OptimizationPipeline {
    /// Pipeline with the built-in codec, quadric reducer and grid merger
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_components(
            config,
            Box::new(BinarySceneCodec::new()),
            Box::new(BinarySceneCodec::new()),
            Box::new(QuadricReducer::new()),
            Box::new(GridMerger::new()),
        )
    }

    pub fn with_components(
        config: PipelineConfig,
        loader: Box<dyn SceneLoader>,
        serializer: Box<dyn SceneSerializer>,
        reducer: Box<dyn VertexReducer>,
        merger: Box<dyn DuplicateMerger>,
    ) -> Self {
        let simplifier = AdaptiveSimplifier::new(reducer, merger).with_policy(config.policy.clone());
        Self {
            export: ExportSearch::with_policy(serializer, config.export.clone()),
            worker: SimplificationWorker::new(simplifier),
            loader,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Optimize one input file.
    ///
    /// Fails only when the input cannot be loaded or `options` is invalid.
    pub fn optimize_file(
        &self,
        name: &str,
        bytes: &[u8],
        options: &OptimizationConfig,
    ) -> Result<OptimizationResult> {
        options.validate()?;
        let started = Instant::now();

        let scene = self.loader.load(name, bytes).map_err(|e| {
            error!(file = name, error = %e, "Failed to load input");
            e
        })?;

        let mut result = self.optimize_scene(scene, bytes, options);
        result.processing_time = started.elapsed();
        info!(
            file = name,
            original_size = result.original_size,
            optimized_size = result.optimized_size,
            vertices_before = result.original_vertex_count,
            vertices_after = result.optimized_vertex_count,
            "Optimized file"
        );
        Ok(result)
    }

    /// Simplify and re-export an already loaded scene. `original` is the
    /// file the scene came from.
    pub fn optimize_scene(
        &self,
        mut scene: Scene,
        original: &[u8],
        options: &OptimizationConfig,
    ) -> OptimizationResult {
        let started = Instant::now();
        let original_vertex_count = scene.vertex_count();
        let original_poly_count = scene.triangle_count();
        let mut change_log = Vec::new();

        for node in scene.nodes.iter_mut() {
            let Some(mesh) = node.mesh.as_mut() else {
                continue;
            };
            let outcome = self.simplify_mesh(mesh, options);
            debug!(
                node = %node.name,
                attempts = outcome.attempts,
                before = outcome.original_vertex_count,
                after = outcome.final_vertex_count,
                "Processed mesh"
            );
            if outcome.modified && !outcome.changes.is_empty() {
                change_log.push(ChangeLogEntry::new(node.name.clone(), outcome.changes));
            }
        }

        for pruned in scene.prune_empty_nodes() {
            change_log.push(ChangeLogEntry::single(pruned, "Removed mesh without triangles"));
        }

        if !options.embed_images {
            for texture in scene.textures.iter().filter(|t| !t.data.is_empty()) {
                change_log.push(ChangeLogEntry::single(
                    texture.name.clone(),
                    "Stored as external reference",
                ));
            }
        }

        let selection = self.export.search(&scene, options, original);
        if let Some(profile) = &selection.chosen {
            change_log.push(ChangeLogEntry::single(
                "export",
                format!("Encoded with {} profile", profile),
            ));
        }

        OptimizationResult {
            original_size: original.len(),
            optimized_size: selection.reported_size,
            encoded_size: selection.encoded_size,
            optimized_bytes: selection.bytes,
            size_adjustment: selection.adjustment,
            export_profile: selection.chosen,
            original_vertex_count,
            original_poly_count,
            optimized_vertex_count: scene.vertex_count(),
            optimized_poly_count: scene.triangle_count(),
            change_log,
            processing_time: started.elapsed(),
        }
    }

    fn simplify_mesh(
        &self,
        mesh: &mut MeshBuffer,
        options: &OptimizationConfig,
    ) -> SimplificationOutcome {
        if self.config.use_worker {
            self.worker
                .simplify_offloaded(mesh, options, self.config.policy.worker_timeout)
        } else {
            self.worker.simplifier().simplify(mesh, options)
        }
    }

    /// Optimize files one after another. A file that fails to load does not
    /// stop the rest.
    pub fn optimize_batch(&self, files: Vec<InputFile>, options: &OptimizationConfig) -> Vec<FileOutcome> {
        files
            .into_iter()
            .map(|file| FileOutcome {
                result: self.optimize_file(&file.name, &file.bytes, options),
                name: file.name,
            })
            .collect()
    }
}

impl Default for OptimizationPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
