//! Raw REST client for the CI provider's API

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ci::error::CiError;
use crate::ci::types::{Artifact, Build, Project};

/// Build lookups come wrapped in an envelope object.
#[derive(Debug, Deserialize)]
struct BuildResponse {
    build: Build,
}

/// Client for the CI provider's REST API.
///
/// Every call carries the account's bearer token. The base URL is injectable
/// so tests can point at a local mock server.
pub struct AppVeyorClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl AppVeyorClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("feedgen")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            token: token.to_string(),
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, CiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("CI API returned status {}: {}", status, path);
            return Err(CiError::UnexpectedStatus {
                path: path.to_string(),
                status,
            });
        }

        Ok(response)
    }

    /// Full project listing for the authenticated account.
    pub async fn projects(&self) -> Result<Vec<Project>, CiError> {
        Ok(self.get("/api/projects").await?.json().await?)
    }

    /// One build of a project, addressed by its version string.
    pub async fn build(
        &self,
        account: &str,
        slug: &str,
        version: &str,
    ) -> Result<Build, CiError> {
        let path = format!("/api/projects/{account}/{slug}/build/{version}");
        let response: BuildResponse = self.get(&path).await?.json().await?;
        Ok(response.build)
    }

    /// Artifact listing for one job.
    pub async fn artifacts(&self, job_id: &str) -> Result<Vec<Artifact>, CiError> {
        let path = format!("/api/buildjobs/{job_id}/artifacts");
        Ok(self.get(&path).await?.json().await?)
    }

    /// Download an artifact as text (checksum sidecars).
    pub async fn artifact_text(&self, job_id: &str, file_name: &str) -> Result<String, CiError> {
        let path = format!("/api/buildjobs/{job_id}/artifacts/{file_name}");
        Ok(self.get(&path).await?.text().await?)
    }

    /// Download an artifact's raw bytes (archives).
    pub async fn artifact_bytes(&self, job_id: &str, file_name: &str) -> Result<Vec<u8>, CiError> {
        let path = format!("/api/buildjobs/{job_id}/artifacts/{file_name}");
        Ok(self.get(&path).await?.bytes().await?.to_vec())
    }
}
