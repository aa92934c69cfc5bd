//! Extension directory builders for creating test fixtures

#![allow(dead_code)]

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

/// Default test extension name
pub const TEST_EXTENSION_NAME: &str = "test-extension";

/// Default test extension version
pub const TEST_EXTENSION_VERSION: &str = "1.0.0";

/// A minimal valid service spec
pub const VALID_SPEC: &str = "name: hello\ncontainer:\n  entrypoint: ./hello\nrestart: always\n";

/// A service spec that is not valid YAML
pub const MALFORMED_SPEC: &str = "name: [unterminated\ncontainer:\n";

/// Builder for extension directories on disk
pub struct ExtensionBuilder {
    name: String,
    version: String,
    quote_version: bool,
    manifest_format: String,
    platform_constraint: Option<String>,
    files: Vec<(String, Vec<u8>)>,
    specs: Vec<(String, String)>,
    checksums: Option<String>,
    with_rootfs: bool,
}

/// A built extension; the directory lives as long as this value
pub struct BuiltExtension {
    _temp: TempDir,
    pub path: Utf8PathBuf,
}

impl BuiltExtension {
    pub fn path_str(&self) -> &str {
        self.path.as_str()
    }

    pub fn rootfs(&self) -> Utf8PathBuf {
        self.path.join("rootfs")
    }
}

impl ExtensionBuilder {
    pub fn new() -> Self {
        Self {
            name: TEST_EXTENSION_NAME.to_string(),
            version: TEST_EXTENSION_VERSION.to_string(),
            quote_version: true,
            manifest_format: "v1alpha1".to_string(),
            platform_constraint: None,
            files: Vec::new(),
            specs: Vec::new(),
            checksums: None,
            with_rootfs: true,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Write the version as a plain YAML scalar, e.g. `version: 1.10`
    pub fn with_unquoted_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self.quote_version = false;
        self
    }

    pub fn with_manifest_format(mut self, format: &str) -> Self {
        self.manifest_format = format.to_string();
        self
    }

    pub fn with_platform_constraint(mut self, constraint: &str) -> Self {
        self.platform_constraint = Some(constraint.to_string());
        self
    }

    /// Add a file under the rootfs; `path` is relative to the rootfs root
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.push((path.to_string(), content.to_vec()));
        self
    }

    /// Add a service spec under `usr/local/etc/containers`
    pub fn with_spec(mut self, file_name: &str, content: &str) -> Self {
        self.specs.push((file_name.to_string(), content.to_string()));
        self
    }

    pub fn with_checksums(mut self, content: &str) -> Self {
        self.checksums = Some(content.to_string());
        self
    }

    pub fn without_rootfs(mut self) -> Self {
        self.with_rootfs = false;
        self
    }

    pub fn build(self) -> Result<BuiltExtension> {
        let temp = TempDir::new().context("Failed to create temp directory")?;
        let path = Utf8PathBuf::from_path_buf(temp.path().join(&self.name))
            .map_err(|p| anyhow::anyhow!("non UTF-8 temp path: {:?}", p))?;
        fs::create_dir_all(&path)?;

        let version = if self.quote_version {
            format!("\"{}\"", self.version)
        } else {
            self.version.clone()
        };
        let mut manifest = format!(
            "version: {}\nmetadata:\n  name: {}\n  version: {}\n  author: Test Author\n  description: Test extension\n",
            self.manifest_format, self.name, version
        );
        if let Some(constraint) = &self.platform_constraint {
            manifest.push_str(&format!(
                "  compatibility:\n    platform:\n      version: \"{}\"\n",
                constraint
            ));
        }
        fs::write(path.join("manifest.yaml"), manifest).context("Failed to write manifest")?;

        if self.with_rootfs {
            let rootfs = path.join("rootfs");
            fs::create_dir_all(&rootfs)?;

            for (relative, content) in &self.files {
                let file = rootfs.join(relative);
                if let Some(parent) = file.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&file, content)?;
            }

            if !self.specs.is_empty() {
                let spec_dir = rootfs.join("usr/local/etc/containers");
                fs::create_dir_all(&spec_dir)?;
                for (file_name, content) in &self.specs {
                    fs::write(spec_dir.join(file_name), content)?;
                }
            }
        }

        if let Some(checksums) = &self.checksums {
            fs::write(path.join("checksums.sha256"), checksums)?;
        }

        Ok(BuiltExtension { _temp: temp, path })
    }
}

impl Default for ExtensionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
