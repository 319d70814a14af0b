//! Error types for csvchat
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for csvchat operations
///
/// Covers the failure taxonomy of the client: local validation, upload
/// failures, backend HTTP errors, stream faults, and transcript misuse,
/// plus conversions from the underlying libraries.
#[derive(Error, Debug)]
pub enum CsvChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any network call (e.g. wrong file type)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upload rejected by the backend or failed in transit
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Non-success HTTP status returned by the backend
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// Best-effort detail extracted from the response body
        message: String,
    },

    /// Chat stream could not be opened or broke mid-read
    #[error("Stream error: {0}")]
    Stream(String),

    /// Invalid transcript operation (stale or foreign turn handle)
    #[error("Transcript error: {0}")]
    Transcript(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL construction errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for csvchat operations
///
/// Uses `anyhow::Error` so callers can attach context while the typed
/// `CsvChatError` stays recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = CsvChatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_validation_error_display() {
        let error = CsvChatError::Validation("Please upload a CSV file.".to_string());
        assert_eq!(
            error.to_string(),
            "Validation error: Please upload a CSV file."
        );
    }

    #[test]
    fn test_upload_error_display() {
        let error = CsvChatError::Upload("Only CSV files are supported".to_string());
        assert_eq!(
            error.to_string(),
            "Upload failed: Only CSV files are supported"
        );
    }

    #[test]
    fn test_api_error_display() {
        let error = CsvChatError::Api {
            status: 404,
            message: "Session not found".to_string(),
        };
        assert_eq!(error.to_string(), "API error (404): Session not found");
    }

    #[test]
    fn test_stream_error_display() {
        let error = CsvChatError::Stream("connection reset".to_string());
        assert_eq!(error.to_string(), "Stream error: connection reset");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CsvChatError = io_error.into();
        assert!(matches!(error, CsvChatError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: CsvChatError = json_error.into();
        assert!(matches!(error, CsvChatError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: CsvChatError = yaml_error.into();
        assert!(matches!(error, CsvChatError::Yaml(_)));
    }

    #[test]
    fn test_url_error_conversion() {
        let url_error = url::Url::parse("not a url").unwrap_err();
        let error: CsvChatError = url_error.into();
        assert!(matches!(error, CsvChatError::Url(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CsvChatError>();
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = CsvChatError::Transcript("stale handle".to_string()).into();
        assert!(matches!(
            err.downcast_ref::<CsvChatError>(),
            Some(CsvChatError::Transcript(_))
        ));
    }
}
