use std::path::Path;

use crate::{
    error::{Error, Result},
    types::SkillManifest,
};

/// Validate a skill name: lowercase ASCII, digits, hyphens, 1-64 chars.
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
}

/// Parse the contents of a `skill.yaml` file.
///
/// `path` is only used for error reporting.
pub fn parse_manifest(raw: &str, path: &Path) -> Result<SkillManifest> {
    let manifest: SkillManifest =
        serde_yaml::from_str(raw).map_err(|e| Error::malformed(path, e.to_string()))?;

    if !validate_name(&manifest.name) {
        return Err(Error::malformed(
            path,
            format!(
                "invalid skill name '{}': must be 1-64 lowercase alphanumeric/hyphen chars",
                manifest.name
            ),
        ));
    }
    if manifest.description.trim().is_empty() {
        return Err(Error::malformed(path, "description must not be empty"));
    }

    Ok(manifest)
}
