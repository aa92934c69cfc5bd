//! Extension rootfs validation for extval
//!
//! This crate handles:
//! - Loading an extension directory (manifest + rootfs)
//! - Service spec discovery and validation
//! - Platform constraint checks
//! - Rootfs layout and checksum verification
//! - The validation pipeline tying the steps together

pub mod constraints;
pub mod contents;
pub mod loader;
pub mod pipeline;
pub mod services;

pub use loader::{ExtensionLoader, LoadedExtension, ValidateOptions};
pub use pipeline::{RootfsValidator, ValidationSummary};
pub use services::{discover_service_specs, ServiceSpecValidator};
