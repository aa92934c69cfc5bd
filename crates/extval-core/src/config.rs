//! Validator configuration with layered precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Config file passed with `--config`
//! 3. Environment variables (EXTVAL_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::version::VersionPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use tracing::debug;

/// Environment variable selecting the version policy
pub const ENV_VERSION_POLICY: &str = "EXTVAL_VERSION_POLICY";

/// Environment variable with the platform version used for constraint checks
pub const ENV_PLATFORM_VERSION: &str = "EXTVAL_PLATFORM_VERSION";

/// Environment variable overriding the service spec directory
pub const ENV_SERVICE_SPEC_DIR: &str = "EXTVAL_SERVICE_SPEC_DIR";

const DEFAULTS_FILE: &str = "validator-defaults.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Settings for one validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ValidatorConfig {
    /// Which version strings are accepted
    pub version_policy: VersionPolicy,

    /// Platform version that declared compatibility ranges are checked against
    #[serde(default)]
    pub platform_version: Option<String>,

    /// Service spec directory, relative to the extension rootfs
    pub service_spec_dir: String,

    /// Absolute path prefixes an extension rootfs may populate
    pub allowed_paths: Vec<String>,
}

/// Partial config as read from a user file; unset keys keep the lower layer
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigOverlay {
    version_policy: Option<VersionPolicy>,
    platform_version: Option<String>,
    service_spec_dir: Option<String>,
    allowed_paths: Option<Vec<String>>,
}

impl ValidatorConfig {
    /// Check that every field is usable
    pub fn validate(&self) -> Result<()> {
        self.parsed_platform_version()?;

        let spec_dir = Utf8Path::new(&self.service_spec_dir);
        if self.service_spec_dir.is_empty()
            || spec_dir.is_absolute()
            || spec_dir.components().any(|c| c.as_str() == "..")
        {
            return Err(Error::invalid_config(format!(
                "service-spec-dir must be a relative path inside the rootfs, got '{}'",
                self.service_spec_dir
            )));
        }

        if self.allowed_paths.is_empty() {
            return Err(Error::invalid_config("allowed-paths must not be empty"));
        }
        for path in &self.allowed_paths {
            if !path.starts_with('/') || path.trim_end_matches('/').is_empty() {
                return Err(Error::invalid_config(format!(
                    "allowed-paths entries must be absolute, non-root paths, got '{}'",
                    path
                )));
            }
        }

        Ok(())
    }

    /// Platform version as semver, tolerating a leading `v`
    pub fn parsed_platform_version(&self) -> Result<Option<semver::Version>> {
        self.platform_version
            .as_deref()
            .map(|raw| {
                semver::Version::parse(raw.strip_prefix('v').unwrap_or(raw)).map_err(|e| {
                    Error::invalid_config(format!("invalid platform-version '{}': {}", raw, e))
                })
            })
            .transpose()
    }

    fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(policy) = overlay.version_policy {
            self.version_policy = policy;
        }
        if overlay.platform_version.is_some() {
            self.platform_version = overlay.platform_version;
        }
        if let Some(dir) = overlay.service_spec_dir {
            self.service_spec_dir = dir;
        }
        if let Some(paths) = overlay.allowed_paths {
            self.allowed_paths = paths;
        }
    }
}

/// Configuration loader
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Optional user config file
    config_file: Option<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Loader using embedded defaults and the environment only
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that also reads a user config file
    pub fn with_file(config_file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_file: Some(config_file.into()),
        }
    }

    /// Embedded defaults alone, ignoring files and environment
    pub fn defaults() -> Result<ValidatorConfig> {
        let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
            Error::invalid_config(format!("Embedded config not found: {}", DEFAULTS_FILE))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", DEFAULTS_FILE))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                DEFAULTS_FILE, e
            ))
        })
    }

    /// Load configuration with layered precedence
    pub fn load(&self) -> Result<ValidatorConfig> {
        let mut config = Self::defaults()?;

        if let Some(path) = &self.config_file {
            debug!("Loading config file: {}", path);
            config.apply(Self::load_yaml_file(path)?);
        }

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn load_yaml_file(path: &Utf8Path) -> Result<ConfigOverlay> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!("Failed to read config file {}: {}", path, e))
        })?;

        // An empty file is a valid "no overrides" config
        if content.trim().is_empty() {
            return Ok(ConfigOverlay::default());
        }

        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    fn apply_env_overrides(config: &mut ValidatorConfig) -> Result<()> {
        if let Ok(val) = env::var(ENV_VERSION_POLICY) {
            config.version_policy = val.parse()?;
        }

        if let Ok(val) = env::var(ENV_PLATFORM_VERSION) {
            config.platform_version = Some(val);
        }

        if let Ok(val) = env::var(ENV_SERVICE_SPEC_DIR) {
            config.service_spec_dir = val;
        }

        Ok(())
    }
}
