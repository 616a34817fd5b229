//! Error types for audit runs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort an audit.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A required header is absent from the export.
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// A data row could not be turned into a task record.
    #[error("Malformed row {row}, column '{column}': {message}")]
    MalformedRow {
        /// 1-based data row number (the header is not counted).
        row: usize,
        column: String,
        message: String,
    },

    /// Uploaded bytes are not UTF-8 text.
    #[error("Input is not valid UTF-8: {source}")]
    InvalidEncoding {
        #[source]
        source: std::str::Utf8Error,
    },

    /// Summed durations exceed the decimal range.
    #[error("Total duration for user '{user}' is too large")]
    DurationOverflow { user: String },

    /// Two users map to the same report file name.
    #[error("Users '{first}' and '{second}' would both be written to {filename}")]
    ReportNameCollision {
        filename: String,
        first: String,
        second: String,
    },

    /// The CSV reader rejected the input.
    #[error("Unreadable CSV: {message}")]
    Csv { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Filesystem failure while persisting reports.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report could not be encoded as JSON.
    #[error("Failed to serialize {path}: {message}")]
    Serialize { path: PathBuf, message: String },
}

impl AuditError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed row error.
    pub fn malformed_row(row: usize, column: &str, message: impl Into<String>) -> Self {
        Self::MalformedRow {
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error is caused by the uploaded data rather than the host.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. }
                | Self::MalformedRow { .. }
                | Self::InvalidEncoding { .. }
                | Self::Csv { .. }
                | Self::DurationOverflow { .. }
                | Self::ReportNameCollision { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_classification() {
        let err = AuditError::malformed_row(3, "Start Date", "bad date");
        assert!(err.is_malformed_input());
        assert_eq!(
            err.to_string(),
            "Malformed row 3, column 'Start Date': bad date"
        );

        let err = AuditError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn test_data_driven_failures_are_malformed_input() {
        let err = AuditError::DurationOverflow {
            user: "Alice".to_string(),
        };
        assert!(err.is_malformed_input());

        let err = AuditError::ReportNameCollision {
            filename: "alice_smith_report.json".to_string(),
            first: "Alice Smith".to_string(),
            second: "alice smith".to_string(),
        };
        assert!(err.is_malformed_input());
        assert_eq!(
            err.to_string(),
            "Users 'Alice Smith' and 'alice smith' would both be written to alice_smith_report.json"
        );
    }
}
