//! Data source factory
//!
//! Builds the configured [`ClinicalDataSource`] implementation.

use crate::adapters::database::traits::ClinicalDataSource;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLSource};
use crate::config::schema::CcdaConfig;
use crate::domain::{ExportError, Result};
use std::sync::Arc;

/// Create the data source described by the configuration
///
/// # Errors
///
/// Returns an error if the `[postgresql]` section is missing or the pool
/// cannot be created.
pub fn create_data_source(config: &CcdaConfig) -> Result<Arc<dyn ClinicalDataSource>> {
    let pg_config = config
        .require_postgresql()
        .map_err(ExportError::Configuration)?;

    tracing::info!("Creating PostgreSQL data source");
    let client = PostgreSQLClient::new(pg_config.clone())?;
    tracing::debug!(target_db = %client.connection_string_safe(), "PostgreSQL client ready");

    Ok(Arc::new(PostgreSQLSource::new(client)))
}
