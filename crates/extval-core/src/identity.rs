//! Expected package identity
//!
//! A caller may pin the extension name it expects, either directly or via
//! the package definition file the extension was built from. Names are
//! compared byte-for-byte: no case folding, no trimming.

use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;
use tracing::debug;

/// Package definition file (`pkg.yaml`), only the fields extval cares about
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDefinition {
    /// Package name, expected to equal the extension manifest name
    pub name: String,
}

impl PackageDefinition {
    /// Read a package definition from disk
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::pkg_file_failure(path.as_str(), e.to_string()))?;

        let definition: PackageDefinition = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::pkg_file_failure(path.as_str(), e.to_string()))?;

        debug!("Loaded pkg definition {} from {}", definition.name, path);
        Ok(definition)
    }
}

/// Compare the expected package name against the declared extension name.
///
/// `None` skips the check entirely.
pub fn check_identity(expected: Option<&str>, declared: &str) -> Result<()> {
    let Some(expected) = expected else {
        debug!("No expected pkg name supplied, skipping identity check");
        return Ok(());
    };

    if expected != declared {
        return Err(Error::identity_mismatch(expected, declared));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_matching_names_pass() {
        assert!(check_identity(Some("foo"), "foo").is_ok());
    }

    #[test]
    fn test_mismatch_names_both() {
        let err = check_identity(Some("foo"), "bar").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("foo"));
        assert!(msg.contains("bar"));
        assert!(matches!(err, Error::IdentityMismatch { .. }));
    }

    #[test]
    fn test_no_expected_name_skips() {
        assert!(check_identity(None, "anything").is_ok());
    }

    #[test]
    fn test_comparison_is_exact() {
        assert!(check_identity(Some("Foo"), "foo").is_err());
        assert!(check_identity(Some("foo "), "foo").is_err());
        assert!(check_identity(Some(""), "foo").is_err());
    }

    #[test]
    fn test_load_pkg_definition() {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("pkg.yaml")).unwrap();
        fs::write(
            &path,
            "name: gvisor\nvariant: scratch\nsteps:\n  - sources: []\n",
        )
        .unwrap();

        let definition = PackageDefinition::load(&path).unwrap();
        assert_eq!(definition.name, "gvisor");
    }

    #[test]
    fn test_load_pkg_definition_missing_name() {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("pkg.yaml")).unwrap();
        fs::write(&path, "variant: scratch\n").unwrap();

        let err = PackageDefinition::load(&path).unwrap_err();
        assert!(matches!(err, Error::PkgFileFailure { .. }));
        assert!(err.to_string().starts_with("error reading pkg file"), "{}", err);
        assert!(err.to_string().contains("name"), "{}", err);
    }

    #[test]
    fn test_load_pkg_definition_missing_file() {
        let err = PackageDefinition::load(Utf8Path::new("/nonexistent/pkg.yaml")).unwrap_err();
        assert!(matches!(err, Error::PkgFileFailure { .. }));
        assert!(!err.to_string().contains("error loading extension"), "{}", err);
        assert!(err.to_string().contains("/nonexistent/pkg.yaml"), "{}", err);
    }
}
