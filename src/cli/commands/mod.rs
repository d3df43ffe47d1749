//! CLI command implementations
//!
//! Each command returns its process exit code:
//! 0 success, 2 configuration error, 4 connection error, 5 fatal error.

pub mod export;
pub mod init;
pub mod render;
pub mod serve;
pub mod validate;

use crate::domain::ExportError;

/// Exit code for a failed export or startup step
pub(crate) fn exit_code_for(error: &ExportError) -> i32 {
    match error {
        ExportError::Configuration(_) | ExportError::Validation(_) => 2,
        ExportError::Database(_) => 4,
        _ => 5,
    }
}

/// Write the document to `output`, or stdout when no path is given
pub(crate) fn write_document(xml: &str, output: Option<&std::path::Path>) -> std::io::Result<()> {
    use std::io::Write;

    match output {
        Some(path) => std::fs::write(path, xml),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(xml.as_bytes())?;
            stdout.write_all(b"\n")?;
            stdout.flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DatabaseError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&ExportError::Configuration("x".into())), 2);
        assert_eq!(
            exit_code_for(&ExportError::Database(DatabaseError::ConnectionFailed("x".into()))),
            4
        );
        assert_eq!(exit_code_for(&ExportError::NotFound("x".into())), 5);
    }
}
