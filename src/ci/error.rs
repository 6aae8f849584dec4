use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("CI API returned status {status} for {path}")]
    UnexpectedStatus {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Build {0} has no jobs")]
    NoJobs(String),

    #[error("No CLI artifact matching `{0}` in the build output")]
    MissingCliArtifact(String),

    #[error("Expected exactly one archive entry starting with `{prefix}`, found {matches}")]
    TemplateEntry { prefix: String, matches: usize },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}
