//! Rootfs content validation
//!
//! An extension may only populate a fixed set of host locations, may only
//! ship directories, regular files and symlinks, and, when it carries a
//! `checksums.sha256`, every listed file must match its digest.

use camino::Utf8Path;
use extval_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use tracing::debug;
use walkdir::WalkDir;

/// Walk `rootfs` and reject anything outside `allowed_paths`.
///
/// Directories that are ancestors of an allowed prefix (`/usr` for
/// `/usr/local`) are permitted so the prefix itself can exist.
pub fn check_contents(extension: &str, rootfs: &Utf8Path, allowed_paths: &[String]) -> Result<()> {
    let mut checked = 0usize;

    for entry in WalkDir::new(rootfs).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::content_validation(extension, format!("failed to walk rootfs: {}", e))
        })?;

        let relative = entry.path().strip_prefix(rootfs).map_err(|_| {
            Error::content_validation(
                extension,
                format!("{} escapes rootfs {}", entry.path().display(), rootfs),
            )
        })?;
        let item = format!("/{}", relative.to_string_lossy());
        let file_type = entry.file_type();

        if !(file_type.is_dir() || file_type.is_file() || file_type.is_symlink()) {
            return Err(Error::content_validation(
                extension,
                format!("{} is not a regular file, directory or symlink", item),
            ));
        }

        if is_within_allowed(&item, allowed_paths) {
            checked += 1;
            continue;
        }

        if file_type.is_dir() && is_ancestor_of_allowed(&item, allowed_paths) {
            continue;
        }

        return Err(Error::content_validation(
            extension,
            format!(
                "path {} is not allowed, extensions may only populate: {}",
                item,
                allowed_paths.join(", ")
            ),
        ));
    }

    debug!("{}: {} rootfs entries within allowed paths", extension, checked);
    Ok(())
}

// `/usr/local/` and `/usr/local` name the same prefix
fn normalized(allowed: &str) -> &str {
    allowed.trim_end_matches('/')
}

fn is_within_allowed(item: &str, allowed_paths: &[String]) -> bool {
    allowed_paths.iter().map(|a| normalized(a)).any(|allowed| {
        item == allowed
            || item
                .strip_prefix(allowed)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

fn is_ancestor_of_allowed(item: &str, allowed_paths: &[String]) -> bool {
    allowed_paths.iter().map(|a| normalized(a)).any(|allowed| {
        allowed
            .strip_prefix(item)
            .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Verify files listed in a `sha256sum`-style checksum file.
///
/// Each line is `<hex digest>  <path>`, path relative to the rootfs, with an
/// optional `*` binary marker or `./` prefix. Blank lines and `#` comments
/// are ignored.
pub fn verify_checksums(extension: &str, rootfs: &Utf8Path, checksums: &Utf8Path) -> Result<()> {
    let content = std::fs::read_to_string(checksums).map_err(|e| {
        Error::content_validation(extension, format!("failed to read {}: {}", checksums, e))
    })?;

    let mut verified = 0usize;
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (expected, path) = parse_checksum_line(line).ok_or_else(|| {
            Error::content_validation(
                extension,
                format!("{}:{}: malformed checksum line", checksums, lineno + 1),
            )
        })?;

        let relative = Utf8Path::new(path);
        if relative.is_absolute() || relative.components().any(|c| c.as_str() == "..") {
            return Err(Error::content_validation(
                extension,
                format!("{}:{}: path {} must stay inside rootfs", checksums, lineno + 1, path),
            ));
        }

        let file = rootfs.join(relative);
        let actual = sha256_file(&file).map_err(|e| {
            Error::content_validation(extension, format!("failed to hash {}: {}", file, e))
        })?;

        if !actual.eq_ignore_ascii_case(expected) {
            return Err(Error::content_validation(
                extension,
                format!(
                    "checksum mismatch for /{}: expected {}, got {}",
                    path, expected, actual
                ),
            ));
        }
        verified += 1;
    }

    debug!("{}: verified {} checksums", extension, verified);
    Ok(())
}

fn parse_checksum_line(line: &str) -> Option<(&str, &str)> {
    let (digest, rest) = line.split_once(char::is_whitespace)?;
    if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let path = rest.trim_start();
    let path = path.strip_prefix('*').unwrap_or(path);
    let path = path.strip_prefix("./").unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    Some((digest, path))
}

/// SHA-256 of a file as lowercase hex
pub fn sha256_file(path: &Utf8Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
