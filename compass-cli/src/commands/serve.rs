//! Run the compass HTTP server

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use compass_core::CatalogDocument;
use compass_server::{AppState, CompassServer, ServerConfig};
use tracing::info;

use super::StoreArgs;
use crate::config::CompassConfig;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides [server] port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides [server] host)
    #[arg(long)]
    pub host: Option<String>,

    /// Load the built-in question catalog before serving
    #[arg(long)]
    pub seed: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl ServeArgs {
    fn server_config(&self, config: &CompassConfig) -> ServerConfig {
        ServerConfig::new(
            self.host.clone().unwrap_or_else(|| config.server.host.clone()),
            self.port.unwrap_or(config.server.port),
        )
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs, config: &CompassConfig) -> Result<()> {
    let store = args.store.open(config)?;
    let state = Arc::new(AppState::new(store, config.engine.to_engine_config()));

    if args.seed {
        let report = state.engine.load_catalog(&CatalogDocument::builtin()?)?;
        info!(
            "Seeded catalog: {} new questions, {} new rules",
            report.questions_inserted, report.rules_inserted
        );
    }

    let server_config = args.server_config(config);
    info!(
        "Starting compass server on {}:{}",
        server_config.host, server_config.port
    );
    CompassServer::with_state(server_config, state).run().await?;
    Ok(())
}
