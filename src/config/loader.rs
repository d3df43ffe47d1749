//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CcdaConfig, PostgreSQLConfig};
use super::secret::secret_string;
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`CcdaConfig`]
/// 4. Applies environment variable overrides (`CCDA_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ExportError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use ccda_export::config::loader::load_config;
///
/// let config = load_config("ccda-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CcdaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn parse_config(contents: &str) -> Result<CcdaConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: CcdaConfig = toml::from_str(&contents)
        .map_err(|e| ExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExportError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ExportError::Configuration(format!("Environment variable {name} has invalid value '{value}'"))
    })
}

/// Applies environment variable overrides using the `CCDA_*` prefix
///
/// Variables follow the pattern `CCDA_<SECTION>_<KEY>`, for example
/// `CCDA_POSTGRESQL_CONNECTION_STRING` or `CCDA_SERVER_BIND_ADDRESS`.
/// Setting the connection string creates the `[postgresql]` section if the
/// file has none.
fn apply_env_overrides(config: &mut CcdaConfig) -> Result<()> {
    if let Ok(val) = std::env::var("CCDA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("CCDA_ENVIRONMENT") {
        config.environment = val.parse().map_err(ExportError::Configuration)?;
    }

    // PostgreSQL overrides
    if let Ok(val) = std::env::var("CCDA_POSTGRESQL_CONNECTION_STRING") {
        match config.postgresql {
            Some(ref mut pg) => pg.connection_string = secret_string(val),
            None => config.postgresql = Some(PostgreSQLConfig::new(secret_string(val))),
        }
    }
    if let Some(ref mut pg) = config.postgresql {
        if let Ok(val) = std::env::var("CCDA_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_env("CCDA_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Ok(val) = std::env::var("CCDA_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS") {
            pg.statement_timeout_seconds =
                parse_env("CCDA_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS", &val)?;
        }
        if let Ok(val) = std::env::var("CCDA_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    // Document overrides
    if let Ok(val) = std::env::var("CCDA_DOCUMENT_ORGANIZATION_NAME") {
        config.document.organization_name = val;
    }
    if let Ok(val) = std::env::var("CCDA_DOCUMENT_ORGANIZATION_OID") {
        config.document.organization_oid = val;
    }

    // Server overrides
    if let Ok(val) = std::env::var("CCDA_SERVER_BIND_ADDRESS") {
        config.server.bind_address = val;
    }
    if let Ok(val) = std::env::var("CCDA_SERVER_ALLOWED_ORIGINS") {
        config.server.allowed_origins = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CCDA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("CCDA_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("CCDA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
