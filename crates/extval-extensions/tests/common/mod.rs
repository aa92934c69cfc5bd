//! Common test utilities for extval-extensions
//!
//! Provides a fluent builder that writes extension directories
//! (manifest, rootfs files, service specs, checksums) into a temp dir.

#![allow(dead_code)]

pub mod builders;

pub use builders::*;
