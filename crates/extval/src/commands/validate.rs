//! Validate command

use anyhow::{Context, Result};
use camino::Utf8Path;
use extval_core::{ConfigLoader, Error, PackageDefinition, ValidatorConfig};
use extval_extensions::{RootfsValidator, ValidateOptions};
use tracing::debug;

use crate::cli::ValidateArgs;
use crate::output;

pub fn run(args: ValidateArgs, config_file: Option<&Utf8Path>, quiet: bool) -> Result<()> {
    // Nothing else is read when there is no rootfs to validate
    if args.rootfs.is_empty() {
        return Err(Error::MissingInput.into());
    }

    let config = load_config(&args, config_file)?;
    debug!("Effective config: {:?}", config);

    let expected_name = match (&args.pkg_name, &args.pkg_file) {
        (Some(name), _) => Some(name.clone()),
        (None, Some(file)) => Some(PackageDefinition::load(file)?.name),
        (None, None) => None,
    };

    let options = ValidateOptions {
        validate_constraints: !args.skip_constraints,
        validate_contents: !args.skip_contents,
    };

    if !quiet {
        output::info(&format!("Validating extension at {}", args.rootfs));
    }

    let validator = RootfsValidator::new(config)?.with_options(options);
    let summary = validator.validate(&args.rootfs, expected_name.as_deref())?;

    output::success(&format!(
        "Extension {} {} is valid",
        summary.name, summary.version
    ));
    if !quiet {
        output::kv("version format", &summary.version_shape.to_string());
        if !summary.services.is_empty() {
            output::kv("services", &summary.services.join(", "));
        }
    }

    Ok(())
}

/// Layer CLI flags on top of defaults, config file and environment
fn load_config(args: &ValidateArgs, config_file: Option<&Utf8Path>) -> Result<ValidatorConfig> {
    let loader = match config_file {
        Some(path) => ConfigLoader::with_file(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load().context("Failed to load configuration")?;

    if let Some(policy) = &args.version_policy {
        config.version_policy = policy.parse()?;
    }
    if let Some(platform) = &args.platform_version {
        config.platform_version = Some(platform.clone());
    }
    config.validate().context("Invalid configuration")?;

    Ok(config)
}
