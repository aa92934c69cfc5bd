//! Error types for extval-core

use thiserror::Error;

/// Result type alias using extval-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a validation run can surface.
///
/// All kinds are terminal: the pipeline stops at the first one and reports
/// it with enough context (file, extension name, offending value) to act on.
#[derive(Error, Debug)]
pub enum Error {
    /// Required rootfs path absent
    #[error("rootfs path is required")]
    MissingInput,

    /// Rootfs could not be read or the manifest could not be parsed
    #[error("error loading extension: {message}")]
    LoadFailure { message: String },

    /// Package definition given as the expected identity could not be used
    #[error("error reading pkg file {path}: {message}")]
    PkgFileFailure { path: String, message: String },

    /// Expected package name differs from the declared one
    #[error("pkg name does not match extension name: {expected} != {declared}")]
    IdentityMismatch { expected: String, declared: String },

    /// Version string matches none of the accepted shapes
    #[error("invalid version format {version} for extension: {extension}")]
    VersionFormatInvalid { version: String, extension: String },

    /// Service spec file could not be read
    #[error("error reading service spec file {path}: {source}")]
    SpecReadFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Service spec file could not be deserialized
    #[error("error unmarshalling service spec file {file}: {message}")]
    SpecParseFailure { file: String, message: String },

    /// Deserialized service spec failed its own validation
    #[error("error validating service spec file {file}: {message}")]
    SpecSchemaInvalid { file: String, message: String },

    /// Delegated structural, content or constraint validation rejected the extension
    #[error("extension {extension} failed validation: {message}")]
    ContentValidationFailure { extension: String, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Schema validation error
    #[error("Schema validation failed:\n{errors}")]
    SchemaValidation { errors: String },

    /// Schema not found
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a load failure error
    pub fn load_failure(message: impl Into<String>) -> Self {
        Self::LoadFailure {
            message: message.into(),
        }
    }

    /// Create a pkg file error
    pub fn pkg_file_failure(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PkgFileFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an identity mismatch error
    pub fn identity_mismatch(expected: impl Into<String>, declared: impl Into<String>) -> Self {
        Self::IdentityMismatch {
            expected: expected.into(),
            declared: declared.into(),
        }
    }

    /// Create an invalid version format error
    pub fn version_format_invalid(
        version: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self::VersionFormatInvalid {
            version: version.into(),
            extension: extension.into(),
        }
    }

    /// Create a service spec read error
    pub fn spec_read_failure(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpecReadFailure {
            path: path.into(),
            source,
        }
    }

    /// Create a service spec parse error
    pub fn spec_parse_failure(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SpecParseFailure {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a service spec validation error
    pub fn spec_schema_invalid(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SpecSchemaInvalid {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a content validation error
    pub fn content_validation(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContentValidationFailure {
            extension: extension.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a schema validation error from a list of errors
    pub fn schema_validation(errors: Vec<String>) -> Self {
        Self::SchemaValidation {
            errors: errors.join("\n"),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Stable identifier of the error kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing-input",
            Self::LoadFailure { .. } => "load-failure",
            Self::PkgFileFailure { .. } => "pkg-file-failure",
            Self::IdentityMismatch { .. } => "identity-mismatch",
            Self::VersionFormatInvalid { .. } => "version-format-invalid",
            Self::SpecReadFailure { .. } => "spec-read-failure",
            Self::SpecParseFailure { .. } => "spec-parse-failure",
            Self::SpecSchemaInvalid { .. } => "spec-schema-invalid",
            Self::ContentValidationFailure { .. } => "content-validation-failure",
            Self::InvalidConfig { .. } => "invalid-config",
            Self::SchemaValidation { .. } => "schema-validation",
            Self::SchemaNotFound { .. } => "schema-not-found",
            Self::YamlParse(_) => "yaml-parse",
            Self::JsonParse(_) => "json-parse",
            Self::Io(_) => "io",
        }
    }
}
