//! # extval-core
//!
//! Core library for extval providing:
//! - The error taxonomy shared by every validation step
//! - Version format classification under a permissive or strict policy
//! - Expected package identity checks
//! - Layered configuration (embedded defaults, file, environment)
//! - JSON Schema validation for manifests and service specs
//! - Manifest and service spec type definitions

pub mod config;
pub mod error;
pub mod identity;
pub mod schema;
pub mod types;
pub mod version;

pub use config::{ConfigLoader, ValidatorConfig};
pub use error::{Error, Result};
pub use identity::{check_identity, PackageDefinition};
pub use schema::SchemaValidator;
pub use version::{VersionPolicy, VersionShape};
