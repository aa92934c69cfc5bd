//! JSON Schema validation for manifests and service specs

use crate::error::{Error, Result};
use jsonschema::Validator;
use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Schema name for `manifest.yaml`
pub const MANIFEST_SCHEMA: &str = "manifest";

/// Schema name for service spec files
pub const SERVICE_SPEC_SCHEMA: &str = "service-spec";

/// Embedded schema files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../schemas/"]
#[prefix = ""]
struct EmbeddedSchemas;

/// Schema validator with pre-compiled schemas
#[derive(Debug)]
pub struct SchemaValidator {
    /// Compiled schemas by name
    schemas: HashMap<String, Validator>,
}

impl SchemaValidator {
    /// Create a new schema validator with embedded schemas
    pub fn new() -> Result<Self> {
        let mut schemas = HashMap::new();

        for file in EmbeddedSchemas::iter() {
            if file.ends_with(".schema.json") {
                let name = file.trim_end_matches(".schema.json").to_string();

                debug!("Loading embedded schema: {}", name);

                if let Some(content) = EmbeddedSchemas::get(&file) {
                    let json_str = std::str::from_utf8(&content.data).map_err(|_| {
                        Error::invalid_config(format!("Invalid UTF-8 in schema: {}", file))
                    })?;

                    let schema_value: Value = serde_json::from_str(json_str)?;
                    schemas.insert(name.clone(), Self::compile(&name, &schema_value)?);
                }
            }
        }

        Self::require(&schemas, &[MANIFEST_SCHEMA, SERVICE_SPEC_SCHEMA])?;

        Ok(Self { schemas })
    }

    fn compile(name: &str, schema: &Value) -> Result<Validator> {
        jsonschema::validator_for(schema)
            .map_err(|e| Error::invalid_config(format!("Failed to compile schema {}: {}", name, e)))
    }

    /// Validate JSON value against a schema
    pub fn validate(&self, value: &Value, schema_name: &str) -> Result<()> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| Error::schema_not_found(schema_name))?;

        let errors: Vec<String> = schema
            .iter_errors(value)
            .map(|e| {
                let path = e.instance_path().to_string();
                if path.is_empty() {
                    format!("  - {}", e)
                } else {
                    format!("  - {}: {}", path, e)
                }
            })
            .collect();

        if !errors.is_empty() {
            return Err(Error::schema_validation(errors));
        }

        Ok(())
    }

    /// Validate YAML string against a schema
    pub fn validate_yaml(&self, yaml: &str, schema_name: &str) -> Result<()> {
        let value: Value = serde_yaml_ng::from_str(yaml)?;
        self.validate(&value, schema_name)
    }

    /// Check if a schema exists
    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    fn require(schemas: &HashMap<String, Validator>, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| !schemas.contains_key(**name)) {
            Some(missing) => Err(Error::schema_not_found(*missing)),
            None => Ok(()),
        }
    }
}
