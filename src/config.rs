use crate::registry::types::RegistrySource;

// =============================================================================
// Upstream defaults
// =============================================================================

/// Default base URL for the CI provider's REST API
pub const DEFAULT_CI_BASE_URL: &str = "https://ci.appveyor.com";

/// Default URL of the published feed document
pub const DEFAULT_FEED_URL: &str = "https://functionscdn.azureedge.net/public/cli-feed-v3.json";

/// Default CDN root that download links are built from
pub const DEFAULT_CDN_ROOT: &str = "https://functionscdn.azureedge.net/public";

/// Default CI project whose builds are aggregated
pub const DEFAULT_PROJECT_NAME: &str = "azure-functions-cli";

// =============================================================================
// Artifact naming conventions
// =============================================================================

/// Prefix the CI provider prepends to artifact file names; stripped from
/// published download links
pub const ARTIFACTS_PREFIX: &str = "artifacts/";

/// Marker identifying the Windows x86 CLI zip; the canonical build version
/// sits between this marker and the `.zip` suffix
pub const CLI_VERSION_MARKER: &str = ".win-x86.";

/// Artifacts carrying this marker ship without a bundled runtime and are
/// excluded from the standalone CLI list
pub const NO_RUNTIME_MARKER: &str = "no-runtime";

pub const ZIP_SUFFIX: &str = ".zip";

/// Sidecar file extension holding an artifact's checksum
pub const CHECKSUM_SUFFIX: &str = ".sha2";

/// The single archive entry inside the CLI zip that the template version is
/// read from
pub const TEMPLATE_ENTRY_PREFIX: &str = "Microsoft.Azure.WebJobs.ItemTemplates.";
pub const TEMPLATE_ENTRY_SUFFIX: &str = ".nupkg";

/// Download URL templates for the template packages, keyed by the version
/// extracted from the CLI zip
pub const ITEM_TEMPLATES_URL: &str =
    "https://www.nuget.org/api/v2/package/Microsoft.Azure.WebJobs.ItemTemplates/{version}";
pub const PROJECT_TEMPLATES_URL: &str =
    "https://www.nuget.org/api/v2/package/Microsoft.Azure.WebJobs.ProjectTemplates/{version}";

// =============================================================================
// Registry probing
// =============================================================================

/// Resource type that marks a registry's search endpoint in its service index
pub const SEARCH_SERVICE_TYPE: &str = "SearchQueryService";

/// Packages whose latest versions are probed on every registry
pub const PROBED_PACKAGES: &[&str] = &[
    "Microsoft.NET.Sdk.Functions",
    "Microsoft.Azure.WebJobs.Script.ExtensionsMetadataGenerator",
    "Microsoft.Azure.Functions.Extensions",
];

pub fn probed_packages() -> Vec<String> {
    PROBED_PACKAGES.iter().map(|p| p.to_string()).collect()
}

/// Registries probed for package versions. The public gallery gets a
/// details-page template; the staging feed has no browsable gallery.
pub fn default_registry_sources() -> Vec<RegistrySource> {
    vec![
        RegistrySource {
            name: "nuget.org".to_string(),
            index_url: "https://api.nuget.org/v3/index.json".to_string(),
            gallery_template: Some("https://www.nuget.org/packages/{package}/{version}".to_string()),
        },
        RegistrySource {
            name: "appservice-staging".to_string(),
            index_url: "https://www.myget.org/F/azure-appservice-staging/api/v3/index.json"
                .to_string(),
            gallery_template: None,
        },
    ]
}

// =============================================================================
// Runtime settings
// =============================================================================

/// Process configuration sourced from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Bearer token for the CI provider's API
    pub ci_token: String,
    pub ci_base_url: String,
    pub feed_url: String,
    pub cdn_root: String,
    pub project_name: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let ci_token = lookup("APPVEYOR_API_TOKEN")
            .ok_or_else(|| anyhow::anyhow!("APPVEYOR_API_TOKEN is not set"))?;

        Ok(Self {
            ci_token,
            ci_base_url: lookup("FEEDGEN_CI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CI_BASE_URL.to_string()),
            feed_url: lookup("FEEDGEN_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            cdn_root: lookup("FEEDGEN_CDN_ROOT").unwrap_or_else(|| DEFAULT_CDN_ROOT.to_string()),
            project_name: lookup("FEEDGEN_PROJECT")
                .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
        })
    }
}
