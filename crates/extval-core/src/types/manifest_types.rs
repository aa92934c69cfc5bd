//! Extension manifest types matching manifest.schema.json

use serde::{Deserialize, Serialize};

/// The only manifest format this tool understands
pub const MANIFEST_FORMAT_VERSION: &str = "v1alpha1";

/// Extension manifest from `manifest.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// Manifest format version (`v1alpha1`)
    pub version: String,

    /// Extension metadata
    pub metadata: ExtensionMetadata,
}

/// Extension metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    /// Extension name
    pub name: String,

    /// Version exactly as written in the manifest, format checked later by
    /// the version policy. Unquoted scalars such as `1.10` keep their text.
    pub version: String,

    /// Author name
    #[serde(default)]
    pub author: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Compatibility constraints
    #[serde(default)]
    pub compatibility: Option<Compatibility>,
}

/// Declared compatibility with the host platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compatibility {
    /// Required platform version range
    #[serde(default)]
    pub platform: Option<VersionConstraint>,
}

/// A version requirement such as `>= v1.5.0`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConstraint {
    /// Requirement expression
    pub version: String,
}

impl ExtensionMetadata {
    /// Platform version requirement, if one is declared
    pub fn platform_requirement(&self) -> Option<&str> {
        self.compatibility
            .as_ref()
            .and_then(|c| c.platform.as_ref())
            .map(|p| p.version.as_str())
    }
}
