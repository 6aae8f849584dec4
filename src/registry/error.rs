use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No search service resource in service index {0}")]
    MissingSearchService(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
