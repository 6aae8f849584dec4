//! CI provider entities

use serde::Deserialize;

/// A CI project as returned by the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: u64,
    pub account_name: String,
    pub slug: String,
    pub name: String,
}

/// One build of a project, with its jobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub build_id: u64,
    pub version: String,
    pub status: BuildStatus,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Success,
    Failed,
    Queued,
    Running,
    Cancelled,
}

/// One execution unit of a build.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub status: BuildStatus,
    #[serde(default)]
    pub tests_count: u32,
    #[serde(default)]
    pub passed_tests_count: u32,
    #[serde(default)]
    pub failed_tests_count: u32,
}

/// A file produced by a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub file_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}
