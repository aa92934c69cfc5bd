//! Type definitions for extension manifests and service specs

mod manifest_types;
mod service_types;

pub use manifest_types::*;
pub use service_types::*;
