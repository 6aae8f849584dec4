//! The aggregation pipeline
//!
//! One run turns a build identifier into an updated release entry: CI
//! artifacts are classified and checksummed, the template version is read
//! out of the CLI zip concurrently, the published feed is fetched eagerly in
//! parallel with all of that, and the fresh values are overlaid onto the
//! feed's most recent release.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ci::artifact::{self, StandaloneCliEntry};
use crate::ci::collector::ArtifactCollector;
use crate::ci::error::CiError;
use crate::ci::types::Artifact;
use crate::config::{ITEM_TEMPLATES_URL, PROJECT_TEMPLATES_URL};
use crate::feed::document::{FeedDocument, FeedEntry};
use crate::feed::error::FeedError;

/// Result of one aggregation run: the release key and the entry to publish
/// under it. Publishing is the caller's responsibility.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedRelease {
    pub version: String,
    pub entry: FeedEntry,
}

/// Everything collected from the CI side of a run.
struct BuildOutput {
    version: String,
    standalone: Vec<StandaloneCliEntry>,
    cli: StandaloneCliEntry,
    template_version: String,
}

pub struct FeedAggregator {
    collector: Arc<ArtifactCollector>,
    client: reqwest::Client,
    feed_url: String,
    cdn_root: String,
    project_name: String,
}

impl FeedAggregator {
    pub fn new(
        collector: Arc<ArtifactCollector>,
        feed_url: &str,
        cdn_root: &str,
        project_name: &str,
    ) -> Self {
        Self {
            collector,
            client: reqwest::Client::builder()
                .user_agent("feedgen")
                .build()
                .expect("Failed to create HTTP client"),
            feed_url: feed_url.to_string(),
            cdn_root: cdn_root.to_string(),
            project_name: project_name.to_string(),
        }
    }

    /// Produce the updated release entry for one build.
    pub async fn aggregate(&self, build: &str) -> Result<UpdatedRelease, FeedError> {
        // The published feed has no data dependency on the CI lookups, so
        // both sides run concurrently from the start.
        let (feed, output) = tokio::try_join!(self.fetch_feed(), self.collect_build(build))?;

        let mut entry = match feed.latest_release() {
            Some((version, entry)) => {
                debug!("Overlaying onto release {}", version);
                entry.clone()
            }
            None => FeedEntry::default(),
        };

        entry.cli = Some(output.cli.download_link.clone());
        entry.sha2 = Some(output.cli.sha2.clone());
        entry.standalone_cli = output.standalone;
        entry.item_templates =
            Some(ITEM_TEMPLATES_URL.replace("{version}", &output.template_version));
        entry.project_templates =
            Some(PROJECT_TEMPLATES_URL.replace("{version}", &output.template_version));

        info!("Aggregated build {} into release {}", build, output.version);
        Ok(UpdatedRelease {
            version: output.version,
            entry,
        })
    }

    async fn collect_build(&self, build: &str) -> Result<BuildOutput, FeedError> {
        let project = self
            .collector
            .project_by_name(&self.project_name)
            .await?
            .ok_or_else(|| CiError::ProjectNotFound(self.project_name.clone()))?;

        let jobs = self.collector.jobs_for_build(&project, build).await?;
        let job = jobs.first().ok_or_else(|| CiError::NoJobs(build.to_string()))?;

        let artifacts = self.collector.artifacts(&job.job_id).await?;
        let (cli_artifact, version) = artifact::extract_cli_version(&artifacts)?;
        let cli_file = cli_artifact.file_name.clone();

        let standalone_artifacts: Vec<&Artifact> = artifacts
            .iter()
            .filter(|a| artifact::is_standalone_zip(&a.file_name))
            .collect();

        let classified = standalone_artifacts.iter().map(|a| {
            let job_id = job.job_id.as_str();
            let version = version.as_str();
            async move {
                let sha2 = self.collector.checksum(job_id, &a.file_name).await?;
                Ok::<_, FeedError>(artifact::classify(&a.file_name, version, &self.cdn_root, sha2))
            }
        });

        // The template extraction only needs the CLI zip, so it runs in
        // parallel with the checksum/classification pass.
        let (standalone, template_version) = tokio::try_join!(
            try_join_all(classified),
            async {
                self.collector
                    .template_version(&job.job_id, &cli_file)
                    .await
                    .map_err(FeedError::from)
            }
        )?;

        let cli = standalone_artifacts
            .iter()
            .position(|a| a.file_name == cli_file)
            .map(|i| standalone[i].clone())
            .ok_or_else(|| CiError::MissingCliArtifact(cli_file.clone()))?;

        Ok(BuildOutput {
            version,
            standalone,
            cli,
            template_version,
        })
    }

    async fn fetch_feed(&self) -> Result<FeedDocument, FeedError> {
        debug!("Fetching published feed from {}", self.feed_url);

        let response = self.client.get(&self.feed_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Feed endpoint returned status {}: {}", status, self.feed_url);
            return Err(FeedError::UnexpectedStatus {
                url: self.feed_url.clone(),
                status,
            });
        }

        Ok(response.json().await?)
    }
}
