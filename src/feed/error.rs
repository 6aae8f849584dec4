use std::sync::Arc;

use thiserror::Error;

use crate::ci::error::CiError;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Ci(#[from] CiError),

    /// Failures surfaced through the memoized caches are shared between all
    /// callers of one cache key.
    #[error(transparent)]
    SharedCi(#[from] Arc<CiError>),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Feed endpoint returned status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },
}
