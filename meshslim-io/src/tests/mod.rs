//! Test modules for meshslim-io
//!
//! Container codec behaviour across profiles and the export search with
//! misbehaving serializers.

pub mod export_search_tests;
