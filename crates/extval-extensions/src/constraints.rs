//! Platform compatibility constraints

use extval_core::types::ExtensionMetadata;
use extval_core::{Error, Result};
use semver::{Version, VersionReq};
use tracing::{debug, warn};

/// Parse a requirement such as `>= v1.5.0, < v2.0.0`.
///
/// A `v` in front of a comparator's version is dropped before parsing.
pub fn parse_requirement(raw: &str) -> std::result::Result<VersionReq, semver::Error> {
    let normalized = raw
        .split(',')
        .map(|comparator| {
            let comparator = comparator.trim();
            let split = comparator
                .find(|c: char| !matches!(c, '>' | '<' | '=' | '~' | '^' | ' '))
                .unwrap_or(comparator.len());
            let (op, version) = comparator.split_at(split);
            format!("{}{}", op, version.strip_prefix('v').unwrap_or(version))
        })
        .collect::<Vec<_>>()
        .join(", ");

    VersionReq::parse(&normalized)
}

/// Check the extension's declared platform range.
///
/// Without a platform version the range is only parsed. Pre-release and
/// build metadata of the platform version are ignored when matching, so a
/// `1.8.0-alpha.0` platform satisfies `>= 1.8.0`.
pub fn check_constraints(
    metadata: &ExtensionMetadata,
    platform_version: Option<&Version>,
) -> Result<()> {
    let Some(raw) = metadata.platform_requirement() else {
        debug!("{} declares no platform constraint", metadata.name);
        return Ok(());
    };

    let requirement = parse_requirement(raw).map_err(|e| {
        Error::content_validation(
            &metadata.name,
            format!("invalid platform version constraint '{}': {}", raw, e),
        )
    })?;

    let Some(platform) = platform_version else {
        warn!(
            "No platform version configured, not checking {} against '{}'",
            metadata.name, raw
        );
        return Ok(());
    };

    let core = Version::new(platform.major, platform.minor, platform.patch);
    if !requirement.matches(&core) {
        return Err(Error::content_validation(
            &metadata.name,
            format!(
                "platform version {} does not satisfy constraint '{}'",
                platform, raw
            ),
        ));
    }

    debug!("{} compatible with platform {}", metadata.name, platform);
    Ok(())
}
