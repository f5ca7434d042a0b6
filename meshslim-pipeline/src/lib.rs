//! # meshslim pipeline
//!
//! Ties loading, adaptive simplification and export selection together for
//! single files and sequential batches.

pub mod change_log;
pub mod pipeline;

pub use change_log::*;
pub use pipeline::*;
