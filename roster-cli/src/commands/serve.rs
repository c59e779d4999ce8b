//! HTTP server command

use std::sync::Arc;

use clap::Args;
use roster_core::{Config, ConfigOverrides, InMemoryStore, ReviewerPicker, Services};
use roster_server::{router, AppState};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::open_services;

/// Run the HTTP server
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config and env)
    #[arg(long, env = "ROSTER_HOST")]
    pub host: Option<String>,

    /// Port to listen on (overrides config and env)
    #[arg(short, long, env = "ROSTER_PORT")]
    pub port: Option<u16>,

    /// Fixed seed for reviewer selection
    #[arg(long, env = "ROSTER_SEED")]
    pub seed: Option<u64>,

    /// Keep all state in memory instead of SQLite
    #[arg(long)]
    pub in_memory: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(self, config: Config) -> anyhow::Result<()> {
        let config = config.with_cli_overrides(ConfigOverrides {
            host: self.host,
            port: self.port,
            db_path: None,
            seed: self.seed,
        });

        let (db, services) = if self.in_memory {
            tracing::info!("Using in-memory store");
            let store = Arc::new(InMemoryStore::new());
            let picker = ReviewerPicker::from_seed(config.assignment.seed);
            (None, Services::new(store.clone(), store, picker))
        } else {
            let (db, services) = open_services(&config).await?;
            tracing::info!(path = %config.database.path.display(), "Using SQLite store");
            (Some(db), services)
        };

        let shutdown = CancellationToken::new();
        let app = router(AppState::new(
            services,
            shutdown.clone(),
            config.server.request_timeout,
        ));

        let listener = TcpListener::bind(config.server.bind_addr()).await?;

        let signal = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            signal.cancel();
        });

        roster_server::serve(listener, app, shutdown).await?;

        if let Some(db) = db {
            db.close().await;
        }
        tracing::info!("Server stopped");
        Ok(())
    }
}
