//! Published feed document model
//!
//! The feed is a historical record this generator does not own: it models
//! only the fields it overwrites and round-trips everything else through a
//! flattened map, so a release entry never loses fields it happens not to
//! understand.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ci::artifact::StandaloneCliEntry;
use crate::version_order::compare_versions;

/// One release entry in the published feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha2: Option<String>,
    #[serde(rename = "standaloneCli", default, skip_serializing_if = "Vec::is_empty")]
    pub standalone_cli: Vec<StandaloneCliEntry>,
    #[serde(rename = "itemTemplates", skip_serializing_if = "Option::is_none")]
    pub item_templates: Option<String>,
    #[serde(rename = "projectTemplates", skip_serializing_if = "Option::is_none")]
    pub project_templates: Option<String>,
    /// Fields this generator does not model, preserved untouched.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The full published history, keyed by release version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub releases: IndexMap<String, FeedEntry>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl FeedDocument {
    /// The release with the greatest version key.
    pub fn latest_release(&self) -> Option<(&str, &FeedEntry)> {
        self.releases
            .iter()
            .max_by(|(a, _), (b, _)| compare_versions(a, b))
            .map(|(version, entry)| (version.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn latest_release_is_selected_by_version_order_not_lexically() {
        let doc: FeedDocument = serde_json::from_value(json!({
            "releases": {
                "2.2.9": {"cli": "https://cdn.example/2.2.9/cli.zip"},
                "2.2.10": {"cli": "https://cdn.example/2.2.10/cli.zip"}
            }
        }))
        .unwrap();

        let (version, entry) = doc.latest_release().unwrap();
        assert_eq!(version, "2.2.10");
        assert_eq!(
            entry.cli.as_deref(),
            Some("https://cdn.example/2.2.10/cli.zip")
        );
    }

    #[test]
    fn latest_release_of_an_empty_document_is_none() {
        let doc = FeedDocument::default();
        assert!(doc.latest_release().is_none());
    }

    #[test]
    fn unknown_entry_fields_survive_a_round_trip() {
        let input = json!({
            "releases": {
                "2.2.27": {
                    "cli": "https://cdn.example/2.2.27/cli.zip",
                    "minimumRuntimeVersion": "2.0.12286",
                    "FUNCTIONS_EXTENSION_VERSION": "~2"
                }
            },
            "tags": {"v2": {"release": "2.2.27"}}
        });

        let doc: FeedDocument = serde_json::from_value(input.clone()).unwrap();
        let output = serde_json::to_value(&doc).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn entry_extra_captures_unmodeled_fields() {
        let entry: FeedEntry = serde_json::from_value(json!({
            "cli": "https://cdn.example/cli.zip",
            "minimumRuntimeVersion": "2.0.12286"
        }))
        .unwrap();

        assert_eq!(
            entry.extra.get("minimumRuntimeVersion"),
            Some(&json!("2.0.12286"))
        );
    }
}
