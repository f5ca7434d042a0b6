//! Scene loading, serialization and export selection
//!
//! This crate provides the container side of meshslim:
//! - `SceneLoader`/`SceneSerializer` traits for container adapters
//! - `BinarySceneCodec`, a chunked little-endian container
//! - Export profiles and the export candidate search

pub mod codec;
pub mod error;
pub mod export;
pub mod profile;

#[cfg(test)]
mod tests;

pub use codec::{decode_scene, encode_scene, strip_png_metadata, BinarySceneCodec};
pub use error::*;
pub use export::*;
pub use profile::*;

use meshslim_core::{Result, Scene};

/// Trait for turning container bytes into a scene
pub trait SceneLoader: Send + Sync {
    /// `name` identifies the input in errors and logs
    fn load(&self, name: &str, bytes: &[u8]) -> Result<Scene>;
}

/// Trait for writing a scene with a given profile
pub trait SceneSerializer: Send + Sync {
    fn serialize(&self, scene: &Scene, profile: &ExportProfile) -> Result<Vec<u8>>;

    /// Generic size reduction of already-encoded bytes
    fn minify(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}

impl<T: SceneLoader + ?Sized> SceneLoader for Box<T> {
    fn load(&self, name: &str, bytes: &[u8]) -> Result<Scene> {
        (**self).load(name, bytes)
    }
}

impl<T: SceneSerializer + ?Sized> SceneSerializer for Box<T> {
    fn serialize(&self, scene: &Scene, profile: &ExportProfile) -> Result<Vec<u8>> {
        (**self).serialize(scene, profile)
    }

    fn minify(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        (**self).minify(bytes)
    }
}
