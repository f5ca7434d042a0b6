//! # meshslim
//!
//! Adaptive mesh simplification and export selection for 3D assets.
//!
//! This is the umbrella crate that provides convenient access to all meshslim functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Mesh buffers, material groups, scenes and the optimization configuration
//! - **Simplification**: Feature analysis, crease-aware normals and the adaptive simplifier
//! - **I/O**: The binary scene container and the export candidate search
//! - **Pipeline**: Per-file and batch optimization with change logs
//!
//! ## Quick Start
//!
//! ```rust
//! use meshslim::prelude::*;
//!
//! let positions = vec![
//!     Point3f::new(0.0, 0.0, 0.0),
//!     Point3f::new(1.0, 0.0, 0.0),
//!     Point3f::new(0.0, 1.0, 0.0),
//! ];
//! let mut scene = Scene::new();
//! scene.add_mesh("triangle", MeshBuffer::from_triangles(positions, &[[0, 1, 2]]));
//!
//! let input = encode_scene(&scene, &ExportProfile::plain_binary()).unwrap();
//! let result = OptimizationPipeline::default()
//!     .optimize_file("triangle.mslm", &input, &OptimizationConfig::default())
//!     .unwrap();
//! assert!(result.optimized_size < result.original_size);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables simplification, io and pipeline
//! - `simplification`: Adaptive simplification and its default primitives
//! - `io`: Container codec and export search
//! - `pipeline`: File and batch optimization (implies `simplification` and `io`)
//! - `all`: Enables all features

// Re-export core functionality
pub use meshslim_core::*;

// Re-export sub-crates
#[cfg(feature = "simplification")]
pub use meshslim_simplification as simplification;

#[cfg(feature = "io")]
pub use meshslim_io as io;

#[cfg(feature = "pipeline")]
pub use meshslim_pipeline as pipeline;

/// Convenient imports for common use cases
pub mod prelude {
    pub use meshslim_core::*;

    #[cfg(feature = "simplification")]
    pub use meshslim_simplification::*;

    #[cfg(feature = "io")]
    pub use meshslim_io::{
        decode_scene, encode_scene, strip_png_metadata, BinarySceneCodec, CodecError,
        ExportCandidate, ExportPolicy, ExportProfile, ExportSearch, ExportSelection,
        Quantization, SceneLoader, SceneSerializer, SizeAdjustment,
    };

    #[cfg(feature = "pipeline")]
    pub use meshslim_pipeline::*;
}
