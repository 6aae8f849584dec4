//! Artifact classification and file-name version extraction
//!
//! Pure helpers over artifact file names. The platform labels are
//! deliberately asymmetric: macOS artifacts populate `OperatingSystem` while
//! Windows and Linux populate the generic `OS` field. Feed consumers key off
//! that exact shape.

use serde::{Deserialize, Serialize};

use crate::ci::error::CiError;
use crate::ci::types::Artifact;
use crate::config::{
    ARTIFACTS_PREFIX, CLI_VERSION_MARKER, NO_RUNTIME_MARKER, TEMPLATE_ENTRY_PREFIX,
    TEMPLATE_ENTRY_SUFFIX, ZIP_SUFFIX,
};

/// One standalone CLI entry in the published feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandaloneCliEntry {
    #[serde(rename = "OperatingSystem", skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(rename = "OS", skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(rename = "Architecture")]
    pub architecture: String,
    #[serde(rename = "downloadLink")]
    pub download_link: String,
    pub sha2: String,
}

/// Classify one artifact by the platform and architecture markers in its
/// file name.
pub fn classify(file_name: &str, version: &str, cdn_root: &str, sha2: String) -> StandaloneCliEntry {
    let architecture = if file_name.contains("-x64.") { "x64" } else { "x86" };

    let (operating_system, os) = if file_name.contains(".osx-") {
        (Some("MacOS".to_string()), None)
    } else if file_name.contains(".win-") {
        (None, Some("Windows".to_string()))
    } else if file_name.contains(".linux-") {
        (None, Some("Linux".to_string()))
    } else {
        (None, None)
    };

    StandaloneCliEntry {
        operating_system,
        os,
        architecture: architecture.to_string(),
        download_link: download_link(cdn_root, version, file_name),
        sha2,
    }
}

/// Published download link for an artifact: `<cdn>/<version>/<file name>`
/// with the CI provider's artifacts prefix stripped.
pub fn download_link(cdn_root: &str, version: &str, file_name: &str) -> String {
    let name = file_name.strip_prefix(ARTIFACTS_PREFIX).unwrap_or(file_name);
    format!("{cdn_root}/{version}/{name}")
}

/// Whether an artifact belongs in the standalone CLI list.
pub fn is_standalone_zip(file_name: &str) -> bool {
    file_name.ends_with(ZIP_SUFFIX) && !file_name.contains(NO_RUNTIME_MARKER)
}

/// Locate the Windows x86 CLI zip and the build version embedded in its
/// file name.
///
/// The canonical version is the token between the `.win-x86.` marker and the
/// `.zip` suffix. That artifact is a hard dependency of every aggregation
/// run; its absence is a named failure.
pub fn extract_cli_version(artifacts: &[Artifact]) -> Result<(&Artifact, String), CiError> {
    for artifact in artifacts {
        let name = &artifact.file_name;
        if let Some(idx) = name.find(CLI_VERSION_MARKER) {
            if let Some(version) = name[idx + CLI_VERSION_MARKER.len()..].strip_suffix(ZIP_SUFFIX) {
                return Ok((artifact, version.to_string()));
            }
        }
    }
    Err(CiError::MissingCliArtifact(format!(
        "*{CLI_VERSION_MARKER}*{ZIP_SUFFIX}"
    )))
}

/// Derive the template package version from an archive's entry names.
///
/// Exactly one entry must start with the template package prefix; the
/// version is what remains after stripping the prefix and the `.nupkg`
/// extension.
pub fn extract_template_version<'a, I>(entry_names: I) -> Result<String, CiError>
where
    I: Iterator<Item = &'a str>,
{
    let matches: Vec<&str> = entry_names
        .filter(|name| name.starts_with(TEMPLATE_ENTRY_PREFIX))
        .collect();

    match matches.as_slice() {
        [single] => {
            let rest = &single[TEMPLATE_ENTRY_PREFIX.len()..];
            let version = rest.strip_suffix(TEMPLATE_ENTRY_SUFFIX).unwrap_or(rest);
            Ok(version.to_string())
        }
        other => Err(CiError::TemplateEntry {
            prefix: TEMPLATE_ENTRY_PREFIX.to_string(),
            matches: other.len(),
        }),
    }
}
