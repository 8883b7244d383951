//! dockhubd: the dockhub daemon.
//!
//! Single binary that assembles the dockhub pieces:
//! - Container discovery (`docker ps`)
//! - Metadata store (JSON file)
//! - REST API + dashboard
//!
//! # Usage
//!
//! ```text
//! dockhubd serve --port 5000 --store /var/lib/dockhub/services.json
//! dockhubd scan --host hub.lan
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use dockhub_core::{HubConfig, build_catalog, client_host, process_env};
use dockhub_docker::{ContainerSource, DockerCli};
use dockhub_state::MetadataStore;

#[derive(Parser)]
#[command(name = "dockhubd", about = "Docker services hub")]
struct Cli {
    /// Path to the TOML config file. Missing file means defaults.
    #[arg(long, global = true, default_value = "dockhub.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard and REST API.
    Serve {
        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,

        /// Path of the metadata store JSON file.
        #[arg(long)]
        store: Option<PathBuf>,

        /// Container runtime CLI to poll.
        #[arg(long)]
        docker_bin: Option<String>,

        /// Seconds to wait for the container runtime before giving up.
        #[arg(long)]
        docker_timeout: Option<u64>,
    },
    /// Run one discovery pass and print the catalog as JSON.
    Scan {
        /// Host used to build service links.
        #[arg(long, default_value = "localhost")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dockhubd=debug,dockhub=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = HubConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    match cli.command {
        Command::Serve {
            port,
            store,
            docker_bin,
            docker_timeout,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(store) = store {
                config.store.path = store;
            }
            if let Some(bin) = docker_bin {
                config.docker.binary = bin;
            }
            if let Some(secs) = docker_timeout {
                config.docker.timeout_secs = secs;
            }
            run_server(config).await
        }
        Command::Scan { host } => run_scan(config, &host).await,
    }
}

fn docker_source(config: &HubConfig) -> DockerCli {
    DockerCli::new(
        &config.docker.binary,
        Duration::from_secs(config.docker.timeout_secs),
    )
}

async fn run_server(config: HubConfig) -> anyhow::Result<()> {
    info!("dockhub daemon starting");

    let store_path = config.store.path.clone();
    if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating store directory {}", parent.display()))?;
    }
    let store = MetadataStore::open(&store_path);
    info!(path = ?store_path, "metadata store opened");

    let containers: Arc<dyn ContainerSource> = Arc::new(docker_source(&config));
    info!(
        binary = %config.docker.binary,
        timeout_secs = config.docker.timeout_secs,
        "container discovery configured"
    );

    let bind = (config.server.bind.clone(), config.server.port);
    let router = dockhub_api::build_router(store, containers, Arc::new(config), process_env);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {}:{}", bind.0, bind.1))?;
    info!(addr = %listener.local_addr()?, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("dockhub daemon stopped");
    Ok(())
}

async fn run_scan(config: HubConfig, host: &str) -> anyhow::Result<()> {
    let store = MetadataStore::open(&config.store.path);
    let containers = docker_source(&config).list_containers().await;
    let snapshot = store.load();
    let settings = config.view_settings(process_env);
    let catalog = build_catalog(
        &containers,
        &snapshot.document,
        &settings,
        &client_host(Some(host)),
    );
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}
