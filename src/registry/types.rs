//! Registry configuration and probe results

use serde::Serialize;

/// A package registry to probe. Static configuration, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySource {
    pub name: String,
    /// URL of the registry's self-describing service index
    pub index_url: String,
    /// Template for a human-facing package page, with `{package}` and
    /// `{version}` placeholders. Registries without a browsable gallery
    /// leave this unset.
    pub gallery_template: Option<String>,
}

/// Latest known versions of one package in one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersionInfo {
    pub package: String,
    /// Newest stable version; `None` when the package is absent from the
    /// registry.
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_url: Option<String>,
}

/// Per-registry result set, one entry per probed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryReport {
    pub registry: String,
    pub packages: Vec<PackageVersionInfo>,
}
