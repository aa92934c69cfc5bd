//! Validation pipeline
//!
//! Runs every check against one extension directory, in order, and stops at
//! the first failure:
//! 1. Non-empty rootfs path
//! 2. Load the extension
//! 3. Expected package identity (only when one is supplied)
//! 4. Version format
//! 5. Service specs, one file at a time in file name order
//! 6. Delegated structural, constraint and content validation

use camino::Utf8Path;
use extval_core::{
    check_identity, Error, Result, SchemaValidator, ValidatorConfig, VersionShape,
};
use tracing::info;

use crate::loader::{ExtensionLoader, ValidateOptions};
use crate::services::{discover_service_specs, ServiceSpecValidator};

/// What a successful run learned about the extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub name: String,
    pub version: String,
    pub version_shape: VersionShape,
    /// Names of the validated service specs, in validation order
    pub services: Vec<String>,
}

/// Validates extension directories against one configuration
pub struct RootfsValidator {
    config: ValidatorConfig,
    options: ValidateOptions,
    schema_validator: SchemaValidator,
}

impl RootfsValidator {
    /// Create a validator with every delegated check enabled
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        Ok(Self {
            config,
            options: ValidateOptions::all(),
            schema_validator: SchemaValidator::new()?,
        })
    }

    /// Override the delegated validation options
    pub fn with_options(mut self, options: ValidateOptions) -> Self {
        self.options = options;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate the extension at `rootfs`.
    ///
    /// `expected_name`, when given, must equal the manifest name exactly.
    pub fn validate(&self, rootfs: &str, expected_name: Option<&str>) -> Result<ValidationSummary> {
        if rootfs.is_empty() {
            return Err(Error::MissingInput);
        }

        let extension = ExtensionLoader::new(&self.schema_validator).load(Utf8Path::new(rootfs))?;
        let name = extension.name();

        check_identity(expected_name, name)?;

        let version_shape = self
            .config
            .version_policy
            .validate(extension.version(), name)?;
        info!(
            "Extension {} version {} accepted as {}",
            name,
            extension.version(),
            version_shape
        );

        let spec_dir = extension.rootfs_path().join(&self.config.service_spec_dir);
        let spec_validator = ServiceSpecValidator::new(&self.schema_validator);
        let mut services = Vec::new();
        for file in discover_service_specs(&spec_dir)? {
            let spec = spec_validator.validate_file(&file)?;
            services.push(spec.name);
        }
        info!("Validated {} service spec(s) for {}", services.len(), name);

        extension.validate(&self.options, &self.config)?;
        info!("Extension {} passed content validation", name);

        Ok(ValidationSummary {
            name: name.to_string(),
            version: extension.version().to_string(),
            version_shape,
            services,
        })
    }
}
