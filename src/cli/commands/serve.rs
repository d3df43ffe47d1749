//! Serve command implementation
//!
//! Runs the HTTP export endpoint until a shutdown signal arrives.

use super::exit_code_for;
use crate::adapters::database::create_data_source;
use crate::config::load_config;
use crate::core::export::ExportCoordinator;
use crate::server::{self, build_router, ApiKeyStore, AppState};
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override `server.bind_address`
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        if let Some(bind) = &self.bind {
            tracing::info!(bind = %bind, "Overriding bind address from CLI");
            config.server.bind_address = bind.clone();
        }

        let keys = match ApiKeyStore::from_config(&config.server.api_keys) {
            Ok(k) => k,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };
        if keys.is_empty() {
            tracing::warn!("No API keys configured; every export request will be rejected");
        }

        let source = match create_data_source(&config) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to initialize data source: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if let Err(e) = source.test_connection().await {
            tracing::error!(error = %e, "Database connection test failed");
            eprintln!("❌ Database connection failed: {e}");
            return Ok(4);
        }

        let listener = match TcpListener::bind(&config.server.bind_address).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, bind = %config.server.bind_address, "Failed to bind");
                eprintln!("❌ Failed to bind {}: {e}", config.server.bind_address);
                return Ok(5);
            }
        };

        let app = build_router(
            AppState {
                coordinator: ExportCoordinator::new(source, config.document.clone()),
                keys: Arc::new(keys),
            },
            &config.server.allowed_origins,
        );

        server::serve(listener, app, shutdown_signal).await?;
        Ok(0)
    }
}
