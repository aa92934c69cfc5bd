//! Service spec types matching service-spec.schema.json
//!
//! A service spec describes a container an extension wants started on the
//! host. Specs live as standalone YAML files inside the extension rootfs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use regex::Regex;

static SERVICE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("service name regex is valid"));

/// Network conditions a service may wait for
pub const NETWORK_CONDITIONS: &[&str] = &["addresses", "connectivity", "hostname", "etcfiles"];

/// Service spec from `<rootfs>/usr/local/etc/containers/<name>.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Service name (lowercase, digits, hyphens)
    pub name: String,

    /// Container to run
    pub container: ContainerSpec,

    /// Conditions to wait for before starting
    #[serde(default)]
    pub depends: Vec<ServiceDependency>,

    /// Restart behaviour
    #[serde(default)]
    pub restart: RestartKind,

    /// Mirror service logs to the console
    #[serde(default)]
    pub log_to_console: bool,
}

/// Container definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    /// Path of the binary to run inside the container
    pub entrypoint: String,

    /// Arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// `KEY=VALUE` environment entries
    #[serde(default)]
    pub environment: Vec<String>,

    /// Mounts
    #[serde(default)]
    pub mounts: Vec<Mount>,

    /// Security settings
    #[serde(default)]
    pub security: Option<SecuritySpec>,
}

/// Container mount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mount {
    pub source: String,
    pub destination: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Container security settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySpec {
    #[serde(default)]
    pub write_to_rootfs: bool,
    #[serde(default)]
    pub rootfs_propagation: Option<String>,
    #[serde(default)]
    pub masked_paths: Vec<String>,
    #[serde(default)]
    pub read_only_paths: Vec<String>,
}

/// A single start condition. Exactly one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDependency {
    /// Another service that must be running
    #[serde(default)]
    pub service: Option<String>,

    /// A path that must exist
    #[serde(default)]
    pub path: Option<String>,

    /// Network conditions
    #[serde(default)]
    pub network: Option<Vec<String>>,

    /// Wait for machine configuration
    #[serde(default)]
    pub configuration: Option<bool>,
}

/// Restart behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestartKind {
    #[default]
    Always,
    Never,
    UntilSuccess,
}

impl ServiceSpec {
    /// Check the rules a schema cannot express.
    ///
    /// All problems are reported together in a single
    /// [`Error::SchemaValidation`].
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !SERVICE_NAME_RE.is_match(&self.name) {
            errors.push(format!(
                "  - name: '{}' must contain only lowercase letters, digits and hyphens",
                self.name
            ));
        }

        if self.container.entrypoint.trim().is_empty() {
            errors.push("  - container.entrypoint: must not be empty".to_string());
        }

        for entry in &self.container.environment {
            match entry.split_once('=') {
                Some((key, _)) if !key.is_empty() => {}
                _ => errors.push(format!(
                    "  - container.environment: '{}' is not KEY=VALUE",
                    entry
                )),
            }
        }

        for mount in &self.container.mounts {
            if !mount.destination.starts_with('/') {
                errors.push(format!(
                    "  - container.mounts: destination '{}' must be absolute",
                    mount.destination
                ));
            }
        }

        for (i, dependency) in self.depends.iter().enumerate() {
            if let Err(msg) = dependency.validate() {
                errors.push(format!("  - depends[{}]: {}", i, msg));
            }
        }

        if !errors.is_empty() {
            return Err(Error::schema_validation(errors));
        }

        Ok(())
    }
}

impl ServiceDependency {
    fn validate(&self) -> std::result::Result<(), String> {
        let set = [
            self.service.is_some(),
            self.path.is_some(),
            self.network.is_some(),
            self.configuration.is_some(),
        ]
        .into_iter()
        .filter(|s| *s)
        .count();

        if set != 1 {
            return Err(format!(
                "exactly one of service, path, network, configuration must be set, found {}",
                set
            ));
        }

        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                return Err(format!("path '{}' must be absolute", path));
            }
        }

        if let Some(conditions) = &self.network {
            if conditions.is_empty() {
                return Err("network must list at least one condition".to_string());
            }
            for condition in conditions {
                if !NETWORK_CONDITIONS.contains(&condition.as_str()) {
                    return Err(format!(
                        "unknown network condition '{}' (valid: {})",
                        condition,
                        NETWORK_CONDITIONS.join(", ")
                    ));
                }
            }
        }

        if self.configuration == Some(false) {
            return Err("configuration dependency must be true when present".to_string());
        }

        Ok(())
    }
}
