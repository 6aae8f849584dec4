use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use feedgen::ci::client::AppVeyorClient;
use feedgen::ci::collector::{ArtifactCollector, CiCaches};
use feedgen::config::{self, Settings};
use feedgen::feed::aggregator::FeedAggregator;
use feedgen::memo::FailurePolicy;
use feedgen::registry::probe::RegistryProbe;
use feedgen::server::{self, AppState};

#[derive(Parser)]
#[command(name = "feedgen")]
#[command(version, about = "Build-artifact feed generator")]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.addr, settings))
}

async fn run(addr: SocketAddr, settings: Settings) -> anyhow::Result<()> {
    let ci_client = Arc::new(AppVeyorClient::new(&settings.ci_base_url, &settings.ci_token));
    let caches = Arc::new(CiCaches::new(FailurePolicy::Pin));
    let collector = Arc::new(ArtifactCollector::new(ci_client, caches));

    let aggregator = Arc::new(FeedAggregator::new(
        collector,
        &settings.feed_url,
        &settings.cdn_root,
        &settings.project_name,
    ));
    let probe = Arc::new(RegistryProbe::new(
        config::default_registry_sources(),
        config::probed_packages(),
    ));

    server::serve(addr, AppState { aggregator, probe }).await
}
