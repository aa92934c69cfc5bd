//! Extension version format classification
//!
//! Extension versions come from several build systems: plain semver
//! releases, date-stamped snapshots, vendor driver builds re-tagged with a
//! `git describe` suffix, and partial `MAJOR.MINOR` pins. The permissive
//! policy recognises all of them; the strict policy only takes semver.
//! Neither policy rewrites the input.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// `v1.2.3`, `1.2.3-alpha.1`
static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+\.\d+\.\d+(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?)$")
        .expect("semver regex is valid")
});

/// `20210914`, `20210914.1`
static DATE_STAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}(\.\d)?$").expect("date stamp regex is valid"));

/// `535.129.03-v1.8.0-alpha.0-10-g336fa0f-dirty`
static BUILD_ARG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d+\.\d+\.\d+)-v(\d+\.\d+\.\d+(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?)(-(\d+)-g([0-9a-f]+)(-dirty)?)?$",
    )
    .expect("build arg regex is valid")
});

/// `5815ee3-v1.8.0-alpha.0-10-g336fa0f-dirty`
static COMMIT_BUILD_ARG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9a-f]+)-v(\d+\.\d+\.\d+(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?)(-(\d+)-g([0-9a-f]+)(-dirty)?)?$",
    )
    .expect("commit build arg regex is valid")
});

/// `v4.3`, `4.3`
static PARTIAL_SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?(\d+\.\d+)$").expect("partial semver regex is valid"));

/// Which recognised shape a version string matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionShape {
    Semver,
    DateStamp,
    BuildArg,
    CommitBuildArg,
    PartialSemver,
}

impl VersionShape {
    /// Shapes in evaluation order. The first match wins; the shapes overlap
    /// (a build-arg version is also a valid semver with a long pre-release),
    /// so this order is part of the contract.
    pub const ORDERED: [VersionShape; 5] = [
        VersionShape::Semver,
        VersionShape::DateStamp,
        VersionShape::BuildArg,
        VersionShape::CommitBuildArg,
        VersionShape::PartialSemver,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            VersionShape::Semver => &SEMVER_RE,
            VersionShape::DateStamp => &DATE_STAMP_RE,
            VersionShape::BuildArg => &BUILD_ARG_RE,
            VersionShape::CommitBuildArg => &COMMIT_BUILD_ARG_RE,
            VersionShape::PartialSemver => &PARTIAL_SEMVER_RE,
        }
    }

    /// Whether `version` has this shape, independent of precedence
    pub fn matches(self, version: &str) -> bool {
        self.pattern().is_match(version)
    }
}

impl fmt::Display for VersionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionShape::Semver => "semver",
            VersionShape::DateStamp => "date-stamp",
            VersionShape::BuildArg => "build-arg",
            VersionShape::CommitBuildArg => "commit-build-arg",
            VersionShape::PartialSemver => "partial-semver",
        };
        f.write_str(name)
    }
}

/// Which set of version strings a deployment accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionPolicy {
    /// Any of the five [`VersionShape`]s
    #[default]
    Permissive,
    /// Only strings that parse as semver after stripping one leading `v`
    Strict,
}

impl VersionPolicy {
    /// Classify `version` under this policy.
    ///
    /// Returns the matched shape, or `None` when the string is rejected.
    pub fn classify(self, version: &str) -> Option<VersionShape> {
        match self {
            VersionPolicy::Permissive => VersionShape::ORDERED
                .into_iter()
                .find(|shape| shape.matches(version)),
            VersionPolicy::Strict => {
                let body = version.strip_prefix('v').unwrap_or(version);
                semver::Version::parse(body)
                    .ok()
                    .map(|_| VersionShape::Semver)
            }
        }
    }

    /// Check an extension's declared version, naming the extension on failure
    pub fn validate(self, version: &str, extension: &str) -> Result<VersionShape> {
        match self.classify(version) {
            Some(shape) => {
                debug!(
                    "Version {} of {} matched {} ({} policy)",
                    version, extension, shape, self
                );
                Ok(shape)
            }
            None => Err(Error::version_format_invalid(version, extension)),
        }
    }
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPolicy::Permissive => f.write_str("permissive"),
            VersionPolicy::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for VersionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "permissive" => Ok(VersionPolicy::Permissive),
            "strict" => Ok(VersionPolicy::Strict),
            other => Err(Error::invalid_config(format!(
                "unknown version policy '{}', expected 'permissive' or 'strict'",
                other
            ))),
        }
    }
}
