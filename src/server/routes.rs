//! Inbound HTTP endpoints.

use axum::Json;
use axum::Router;
use axum::extract::{RawQuery, State};
use axum::routing::get;

use crate::feed::document::FeedEntry;
use crate::registry::types::RegistryReport;
use crate::server::AppState;
use crate::server::error::ApiError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/feed", get(feed))
        .route("/api/packages", get(packages))
        .with_state(state)
}

/// Aggregate one build into an updated feed entry.
async fn feed(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<FeedEntry>, ApiError> {
    let build = single_param(query.as_deref(), "build")?
        .ok_or_else(|| ApiError::BadRequest("missing required parameter: build".to_string()))?;

    let release = state.aggregator.aggregate(&build).await?;
    Ok(Json(release.entry))
}

/// Report latest package versions across the configured registries.
async fn packages(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<RegistryReport>>, ApiError> {
    let include_prerelease = match single_param(query.as_deref(), "preRelease")? {
        Some(raw) => raw.parse::<bool>().map_err(|_| {
            ApiError::BadRequest(format!("invalid boolean for preRelease: {raw}"))
        })?,
        None => false,
    };

    let reports = state.probe.probe_all(include_prerelease).await?;
    Ok(Json(reports))
}

/// Extract a query parameter that must appear at most once.
///
/// The raw pair list is inspected because a duplicated parameter is a client
/// error, not a value to silently pick from.
fn single_param(query: Option<&str>, name: &str) -> Result<Option<String>, ApiError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.unwrap_or(""))
        .map_err(|e| ApiError::BadRequest(format!("invalid query string: {e}")))?;

    let mut values = pairs
        .into_iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value);

    let first = values.next();
    if values.next().is_some() {
        return Err(ApiError::BadRequest(format!(
            "parameter {name} supplied more than once"
        )));
    }

    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_param_returns_the_one_value() {
        let result = single_param(Some("build=2.2.27"), "build").unwrap();
        assert_eq!(result, Some("2.2.27".to_string()));
    }

    #[test]
    fn single_param_is_none_when_absent() {
        let result = single_param(Some("other=1"), "build").unwrap();
        assert_eq!(result, None);

        let result = single_param(None, "build").unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn single_param_rejects_duplicates() {
        let result = single_param(Some("build=1&build=2"), "build");
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn single_param_ignores_unrelated_duplicates() {
        let result = single_param(Some("a=1&a=2&build=2.2.27"), "build").unwrap();
        assert_eq!(result, Some("2.2.27".to_string()));
    }
}
