//! Latest-version probing across package registries
//!
//! Each registry self-describes through a service index; the probe discovers
//! the search endpoint from it, then queries per package. Every
//! (registry, package) pair is an independent unit of work and all pairs run
//! concurrently; the first failure fails the whole probe. A package that a
//! registry simply does not carry is not a failure.

use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SEARCH_SERVICE_TYPE;
use crate::registry::error::RegistryError;
use crate::registry::types::{PackageVersionInfo, RegistryReport, RegistrySource};

/// Registry self-description document.
#[derive(Debug, Deserialize)]
struct ServiceIndex {
    resources: Vec<ServiceResource>,
}

#[derive(Debug, Deserialize)]
struct ServiceResource {
    #[serde(rename = "@type")]
    resource_type: String,
    #[serde(rename = "@id")]
    id: String,
}

/// Search endpoint response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    versions: Vec<SearchVersion>,
}

#[derive(Debug, Deserialize)]
struct SearchVersion {
    version: String,
}

pub struct RegistryProbe {
    client: reqwest::Client,
    sources: Vec<RegistrySource>,
    packages: Vec<String>,
}

impl RegistryProbe {
    pub fn new(sources: Vec<RegistrySource>, packages: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("feedgen")
                .build()
                .expect("Failed to create HTTP client"),
            sources,
            packages,
        }
    }

    /// Discover a registry's search endpoint from its service index.
    pub async fn resolve_search_endpoint(&self, index_url: &str) -> Result<String, RegistryError> {
        let response = self.client.get(index_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Service index returned status {}: {}", status, index_url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let index: ServiceIndex = response.json().await.map_err(|e| {
            warn!("Failed to parse service index: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        index
            .resources
            .into_iter()
            .find(|r| r.resource_type == SEARCH_SERVICE_TYPE)
            .map(|r| r.id)
            .ok_or_else(|| RegistryError::MissingSearchService(index_url.to_string()))
    }

    /// Newest version of one package, or `None` when the registry does not
    /// carry it.
    ///
    /// Registries return comparably-formatted numeric versions, so this uses
    /// a plain ascending sort and takes the last entry.
    pub async fn latest_version(
        &self,
        search_url: &str,
        package: &str,
        include_prerelease: bool,
    ) -> Result<Option<String>, RegistryError> {
        let url = format!("{search_url}?q=PackageId:{package}&prerelease={include_prerelease}");
        debug!("Searching {} for {}", search_url, package);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Search endpoint returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let search: SearchResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse search response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        let mut versions: Vec<String> = search
            .data
            .into_iter()
            .flat_map(|result| result.versions)
            .map(|v| v.version)
            .collect();

        if versions.is_empty() {
            return Ok(None);
        }

        versions.sort();
        Ok(versions.pop())
    }

    /// Probe one registry for every configured package.
    async fn probe_registry(
        &self,
        source: &RegistrySource,
        include_prerelease: bool,
    ) -> Result<RegistryReport, RegistryError> {
        let search_url = self.resolve_search_endpoint(&source.index_url).await?;

        let lookups = self.packages.iter().map(|package| {
            let search_url = search_url.as_str();
            let gallery_template = source.gallery_template.as_deref();
            async move {
                let version = self.latest_version(search_url, package, false).await?;
                let prerelease_version = if include_prerelease {
                    self.latest_version(search_url, package, true).await?
                } else {
                    None
                };

                let details_url = match (gallery_template, &version) {
                    (Some(template), Some(v)) => Some(
                        template
                            .replace("{package}", package)
                            .replace("{version}", v),
                    ),
                    _ => None,
                };

                Ok::<_, RegistryError>(PackageVersionInfo {
                    package: package.clone(),
                    version,
                    prerelease_version,
                    details_url,
                })
            }
        });

        let packages = try_join_all(lookups).await?;
        Ok(RegistryReport {
            registry: source.name.clone(),
            packages,
        })
    }

    /// Fan out across every configured registry and package concurrently.
    pub async fn probe_all(
        &self,
        include_prerelease: bool,
    ) -> Result<Vec<RegistryReport>, RegistryError> {
        try_join_all(
            self.sources
                .iter()
                .map(|source| self.probe_registry(source, include_prerelease)),
        )
        .await
    }
}
