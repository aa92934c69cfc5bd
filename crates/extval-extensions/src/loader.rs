//! Extension loading
//!
//! An extension directory holds a `manifest.yaml` next to a `rootfs/` tree:
//!
//! ```text
//! <path>/manifest.yaml
//! <path>/rootfs/...
//! <path>/checksums.sha256   (optional)
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use extval_core::schema::MANIFEST_SCHEMA;
use extval_core::types::{ExtensionManifest, MANIFEST_FORMAT_VERSION};
use extval_core::{Error, Result, SchemaValidator, ValidatorConfig};
use serde_json::Value;
use tracing::{debug, info};

use crate::constraints;
use crate::contents;

/// Manifest file name inside an extension directory
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Payload directory inside an extension directory
pub const ROOTFS_DIR: &str = "rootfs";

/// Optional checksum list inside an extension directory
pub const CHECKSUMS_FILE: &str = "checksums.sha256";

/// Which delegated checks [`LoadedExtension::validate`] runs on top of the
/// baseline structural check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Check declared platform compatibility ranges
    pub validate_constraints: bool,
    /// Walk the rootfs and verify layout, file types and checksums
    pub validate_contents: bool,
}

impl ValidateOptions {
    /// Also check declared platform constraints
    pub fn with_validate_constraints(mut self) -> Self {
        self.validate_constraints = true;
        self
    }

    /// Also verify rootfs contents
    pub fn with_validate_contents(mut self) -> Self {
        self.validate_contents = true;
        self
    }

    /// Every delegated check enabled
    pub fn all() -> Self {
        Self::default()
            .with_validate_constraints()
            .with_validate_contents()
    }
}

/// An extension read from disk. Never mutated after loading.
#[derive(Debug, Clone)]
pub struct LoadedExtension {
    /// Parsed manifest
    pub manifest: ExtensionManifest,

    /// Extension directory passed to the loader
    base_path: Utf8PathBuf,
}

impl LoadedExtension {
    /// Extension name from the manifest
    pub fn name(&self) -> &str {
        &self.manifest.metadata.name
    }

    /// Raw extension version from the manifest
    pub fn version(&self) -> &str {
        &self.manifest.metadata.version
    }

    /// Extension directory
    pub fn base_path(&self) -> &Utf8Path {
        &self.base_path
    }

    /// Root of the payload tree
    pub fn rootfs_path(&self) -> Utf8PathBuf {
        self.base_path.join(ROOTFS_DIR)
    }

    /// Run the baseline structural check plus whichever checks `options` enables
    pub fn validate(&self, options: &ValidateOptions, config: &ValidatorConfig) -> Result<()> {
        self.validate_structure()?;

        if options.validate_constraints {
            let platform_version = config.parsed_platform_version()?;
            constraints::check_constraints(&self.manifest.metadata, platform_version.as_ref())?;
        }

        if options.validate_contents {
            contents::check_contents(
                self.name(),
                &self.rootfs_path(),
                &config.allowed_paths,
            )?;

            let checksums = self.base_path.join(CHECKSUMS_FILE);
            if checksums.is_file() {
                contents::verify_checksums(self.name(), &self.rootfs_path(), &checksums)?;
            } else {
                debug!("No {} for {}, skipping digest checks", CHECKSUMS_FILE, self.name());
            }
        }

        Ok(())
    }

    fn validate_structure(&self) -> Result<()> {
        if self.name().trim().is_empty() {
            return Err(Error::content_validation(
                self.name(),
                "metadata.name must not be empty",
            ));
        }

        if self.version().trim().is_empty() {
            return Err(Error::content_validation(
                self.name(),
                "metadata.version must not be empty",
            ));
        }

        if !self.rootfs_path().is_dir() {
            return Err(Error::content_validation(
                self.name(),
                format!("rootfs {} is not a directory", self.rootfs_path()),
            ));
        }

        Ok(())
    }
}

/// Reads extension directories, checking the manifest against its schema
pub struct ExtensionLoader<'a> {
    schema_validator: &'a SchemaValidator,
}

impl<'a> ExtensionLoader<'a> {
    /// Create a new loader
    pub fn new(schema_validator: &'a SchemaValidator) -> Self {
        Self { schema_validator }
    }

    /// Load an extension directory.
    ///
    /// The metadata version is carried verbatim; its format is not checked here.
    pub fn load(&self, path: &Utf8Path) -> Result<LoadedExtension> {
        info!("Loading extension from {}", path);

        if !path.is_dir() {
            return Err(Error::load_failure(format!(
                "extension path {} is not a directory",
                path
            )));
        }

        let manifest_path = path.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| {
            Error::load_failure(format!("failed to read {}: {}", manifest_path, e))
        })?;

        let value: Value = serde_yaml_ng::from_str(&content).map_err(|e| {
            Error::load_failure(format!("failed to parse {}: {}", manifest_path, e))
        })?;

        self.schema_validator
            .validate(&value, MANIFEST_SCHEMA)
            .map_err(|e| Error::load_failure(format!("invalid {}: {}", manifest_path, e)))?;

        let manifest: ExtensionManifest = serde_yaml_ng::from_str(&content).map_err(|e| {
            Error::load_failure(format!("failed to parse {}: {}", manifest_path, e))
        })?;

        if manifest.version != MANIFEST_FORMAT_VERSION {
            return Err(Error::load_failure(format!(
                "unsupported manifest version {} in {}, expected {}",
                manifest.version, manifest_path, MANIFEST_FORMAT_VERSION
            )));
        }

        let rootfs = path.join(ROOTFS_DIR);
        if !rootfs.is_dir() {
            return Err(Error::load_failure(format!(
                "rootfs directory {} not found",
                rootfs
            )));
        }

        debug!(
            "Loaded extension {} {}",
            manifest.metadata.name, manifest.metadata.version
        );

        Ok(LoadedExtension {
            manifest,
            base_path: path.to_path_buf(),
        })
    }
}
