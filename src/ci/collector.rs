//! Memoized access to CI builds and artifacts
//!
//! Wraps the raw client with process-wide single-flight caches so that
//! repeated and concurrent lookups of one project, build, or job hit the
//! upstream API exactly once. Checksums are the exception: a run needs each
//! checksum exactly once, so they are always fetched fresh.

use std::io::Cursor;
use std::sync::Arc;

use crate::ci::artifact::extract_template_version;
use crate::ci::client::AppVeyorClient;
use crate::ci::error::CiError;
use crate::ci::types::{Artifact, Job, Project};
use crate::config::CHECKSUM_SUFFIX;
use crate::memo::{FailurePolicy, MemoMap};

/// Process-wide caches for CI lookups, threaded through constructors rather
/// than held globally. Entries live for the process lifetime.
pub struct CiCaches {
    projects: MemoMap<Option<Project>, CiError>,
    jobs: MemoMap<Vec<Job>, CiError>,
    artifacts: MemoMap<Vec<Artifact>, CiError>,
    template_versions: MemoMap<String, CiError>,
}

impl CiCaches {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            projects: MemoMap::new(policy),
            jobs: MemoMap::new(policy),
            artifacts: MemoMap::new(policy),
            template_versions: MemoMap::new(policy),
        }
    }
}

pub struct ArtifactCollector {
    client: Arc<AppVeyorClient>,
    caches: Arc<CiCaches>,
}

impl ArtifactCollector {
    pub fn new(client: Arc<AppVeyorClient>, caches: Arc<CiCaches>) -> Self {
        Self { client, caches }
    }

    /// Case-insensitive lookup against the full project listing.
    ///
    /// An unknown project is `Ok(None)`, not an error.
    pub async fn project_by_name(&self, name: &str) -> Result<Option<Project>, Arc<CiError>> {
        let key = name.to_lowercase();
        let client = Arc::clone(&self.client);
        let wanted = key.clone();

        self.caches
            .projects
            .get_or_compute(&key, move || async move {
                let projects = client.projects().await?;
                Ok(projects
                    .into_iter()
                    .find(|p| p.name.eq_ignore_ascii_case(&wanted)))
            })
            .await
    }

    /// Jobs of one build, memoized by the (project, version) pair.
    pub async fn jobs_for_build(
        &self,
        project: &Project,
        version: &str,
    ) -> Result<Vec<Job>, Arc<CiError>> {
        let key = format!("{}/{}@{}", project.account_name, project.slug, version);
        let client = Arc::clone(&self.client);
        let account = project.account_name.clone();
        let slug = project.slug.clone();
        let version = version.to_string();

        self.caches
            .jobs
            .get_or_compute(&key, move || async move {
                let build = client.build(&account, &slug, &version).await?;
                Ok(build.jobs)
            })
            .await
    }

    /// Artifact listing of one job, memoized by job id.
    pub async fn artifacts(&self, job_id: &str) -> Result<Vec<Artifact>, Arc<CiError>> {
        let client = Arc::clone(&self.client);
        let job = job_id.to_string();

        self.caches
            .artifacts
            .get_or_compute(job_id, move || async move { client.artifacts(&job).await })
            .await
    }

    /// Download an artifact's checksum sidecar and normalize it for
    /// publication by dropping the dash separators.
    pub async fn checksum(&self, job_id: &str, file_name: &str) -> Result<String, CiError> {
        let sidecar = format!("{file_name}{CHECKSUM_SUFFIX}");
        let body = self.client.artifact_text(job_id, &sidecar).await?;
        Ok(body.trim().replace('-', ""))
    }

    /// Template package version read from inside the CLI zip.
    ///
    /// Downloading and opening the archive is the most expensive lookup of a
    /// run, so the result is memoized per job.
    pub async fn template_version(
        &self,
        job_id: &str,
        file_name: &str,
    ) -> Result<String, Arc<CiError>> {
        let client = Arc::clone(&self.client);
        let job = job_id.to_string();
        let file = file_name.to_string();

        self.caches
            .template_versions
            .get_or_compute(job_id, move || async move {
                let bytes = client.artifact_bytes(&job, &file).await?;
                let archive = zip::ZipArchive::new(Cursor::new(bytes))?;
                extract_template_version(archive.file_names())
            })
            .await
    }
}
