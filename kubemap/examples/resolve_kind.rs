//! Resolves kinds against a live apiserver and prints the endpoints serving them:
//! resolve_kind [--version <apiVersion>] <kind>...
//! or, with --all, every endpoint the cluster serves.
use anyhow::{bail, Result};
use kubemap::{Client, Config, TypeMapper};
use tracing::*;

#[derive(clap::Parser)]
struct App {
    /// Cluster url, defaults to KUBEMAP_CLUSTER_URL
    #[arg(long, short)]
    server: Option<String>,
    /// Blank for the preferred legacy version, `v1` or `group/version`
    #[arg(long, short, default_value = "")]
    version: String,
    /// Named groups to leave out of discovery
    #[arg(long, short = 'x')]
    exclude: Vec<String>,
    /// Print every discovered endpoint
    #[arg(long, short)]
    all: bool,
    kinds: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let app: App = clap::Parser::parse();
    let config = match &app.server {
        Some(url) => Config::from_cluster_url(url)?,
        None => Config::from_env()?,
    };
    let excluded: Vec<&str> = app.exclude.iter().map(String::as_str).collect();
    let mapper = TypeMapper::new(Client::try_from(config)?).exclude(&excluded);

    if app.all {
        for endpoint in mapper.endpoints().await? {
            let caps: Vec<_> = endpoint.capabilities().collect();
            println!("{}\t{}\t{}", endpoint.kind(), endpoint.path(), caps.join(","));
        }
        return Ok(());
    }
    if app.kinds.is_empty() {
        bail!("no kinds given");
    }

    for kind in &app.kinds {
        info!(version = app.version.as_str(), kind = kind.as_str(), "resolving");
        match mapper.endpoint_for(&app.version, kind).await {
            Ok(endpoint) => println!(
                "{}\t{}\tnamespaced={}",
                kind,
                endpoint.path(),
                endpoint.namespaced()
            ),
            Err(err) if err.is_not_found() => println!("{kind}\tnot served"),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
