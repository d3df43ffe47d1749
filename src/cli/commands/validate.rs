//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates; this reports the outcome and a summary
    /// without printing any secret.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Organization: {}", config.document.organization_name);
        println!("  Organization OID: {}", config.document.organization_oid);
        match &config.postgresql {
            Some(pg) => {
                println!("  PostgreSQL: configured (ssl_mode = {})", pg.ssl_mode);
                println!("  Max Connections: {}", pg.max_connections);
            }
            None => println!("  PostgreSQL: not configured (render only)"),
        }
        println!("  Bind Address: {}", config.server.bind_address);
        println!("  API Keys: {}", config.server.api_keys.len());
        println!();

        Ok(0)
    }
}
