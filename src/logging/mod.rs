//! Logging and observability
//!
//! Structured logging with:
//! - Human-readable console output on stderr
//! - Optional JSON-formatted rolling log files
//! - Level filtering, overridable through `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use ccda_export::logging::init_logging;
//! use ccda_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! Clinical values never appear in log fields. The export macros below only
//! record identifiers, counts and timings.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export operation
///
/// # Example
///
/// ```no_run
/// use ccda_export::log_export_start;
/// use ccda_export::domain::{PatientId, TenantId};
///
/// let patient_id = PatientId::new("p-123").unwrap();
/// let tenant_id = TenantId::new("clinic-a").unwrap();
/// log_export_start!(&patient_id, &tenant_id);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($patient_id:expr, $tenant_id:expr) => {
        tracing::info!(
            patient_id = %$patient_id,
            tenant_id = %$tenant_id,
            "Starting C-CDA export"
        );
    };
}

/// Log the completion of an export operation
///
/// # Example
///
/// ```no_run
/// use ccda_export::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!("p-123", 42, 18_400, Duration::from_millis(85));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($patient_id:expr, $records:expr, $bytes:expr, $duration:expr) => {
        tracing::info!(
            patient_id = %$patient_id,
            records = $records,
            bytes = $bytes,
            duration_ms = $duration.as_millis() as u64,
            "C-CDA export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use ccda_export::log_error_with_context;
/// use ccda_export::domain::ExportError;
///
/// let error = ExportError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
