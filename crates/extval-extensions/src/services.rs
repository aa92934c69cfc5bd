//! Service spec discovery and validation

use camino::{Utf8Path, Utf8PathBuf};
use extval_core::schema::SERVICE_SPEC_SCHEMA;
use extval_core::types::ServiceSpec;
use extval_core::{Error, Result, SchemaValidator};
use serde_json::Value;
use tracing::debug;

/// List `*.yaml` files directly inside `dir`, sorted by file name.
///
/// A missing directory yields no files.
pub fn discover_service_specs(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    if !dir.is_dir() {
        debug!("No service spec directory at {}", dir);
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        if entry.path().extension() == Some("yaml") {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Validates service spec files: JSON Schema first, then the typed rules
pub struct ServiceSpecValidator<'a> {
    schema_validator: &'a SchemaValidator,
}

impl<'a> ServiceSpecValidator<'a> {
    /// Create a new service spec validator
    pub fn new(schema_validator: &'a SchemaValidator) -> Self {
        Self { schema_validator }
    }

    /// Read, parse and validate one spec file
    pub fn validate_file(&self, path: &Utf8Path) -> Result<ServiceSpec> {
        let file = path.file_name().unwrap_or(path.as_str());
        debug!("Validating service spec: {}", path);

        let content =
            std::fs::read_to_string(path).map_err(|e| Error::spec_read_failure(path.as_str(), e))?;

        let spec = self.parse(file, &content)?;

        spec.validate()
            .map_err(|e| Error::spec_schema_invalid(file, e.to_string()))?;

        debug!("Service spec {} ({}) is valid", spec.name, file);
        Ok(spec)
    }

    fn parse(&self, file: &str, content: &str) -> Result<ServiceSpec> {
        let value: Value = serde_yaml_ng::from_str(content)
            .map_err(|e| Error::spec_parse_failure(file, e.to_string()))?;

        self.schema_validator
            .validate(&value, SERVICE_SPEC_SCHEMA)
            .map_err(|e| Error::spec_schema_invalid(file, e.to_string()))?;

        serde_yaml_ng::from_str(content).map_err(|e| Error::spec_parse_failure(file, e.to_string()))
    }
}
