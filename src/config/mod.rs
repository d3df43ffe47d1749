//! Configuration management
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CCDA_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ccda_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ccda-export.toml")?;
//!
//! println!("Organization: {}", config.document.organization_name);
//! println!("Listening on: {}", config.server.bind_address);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`PostgreSQLConfig`] - clinical database connection
//! - [`DocumentConfig`] - organization identity stamped into documents
//! - [`ServerConfig`] - HTTP bind address, CORS origins, API keys
//! - [`LoggingConfig`] - rolling file logs
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [postgresql]
//! connection_string = "${CCDA_DATABASE_URL}"
//! ssl_mode = "require"
//!
//! [document]
//! organization_name = "Riverside Clinic"
//! organization_oid = "2.16.840.1.113883.19.5"
//!
//! [[server.api_keys]]
//! key = "${CCDA_CLINICIAN_KEY}"
//! tenant_id = "riverside"
//! role = "clinician"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApiKeyConfig, ApiKeyRole, ApplicationConfig, CcdaConfig, DocumentConfig, Environment,
    LoggingConfig, PostgreSQLConfig, ServerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
