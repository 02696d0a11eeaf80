//! Application error types with MCP protocol conversion.

use rmcp::model::ErrorCode;
use thiserror::Error;

/// Application-level errors for Cyberlex.
#[derive(Error, Debug)]
pub enum AppError {
    // Upstream errors
    #[error("Transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Malformed response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    #[error("Failed to resolve types for {id}: {source}")]
    Resolution {
        id: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Query error: {message}")]
    Query { message: String, query: String },

    // Domain errors
    #[error("Invalid type policy: {0}")]
    Policy(String),

    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    // Output errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps an upstream failure as a resolution error scoped to one entity.
    pub fn resolution(id: impl Into<String>, source: AppError) -> Self {
        AppError::Resolution {
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Builds a transport error from an HTTP client failure.
    pub fn transport(endpoint: &str, err: impl std::fmt::Display) -> Self {
        AppError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    /// Builds a parse error for a response body that had the wrong shape.
    pub fn parse(endpoint: &str, err: impl std::fmt::Display) -> Self {
        AppError::Parse {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<AppError> for rmcp::model::ErrorData {
    fn from(err: AppError) -> Self {
        let (code, app_code) = match &err {
            AppError::Transport { .. } => (ErrorCode::INTERNAL_ERROR, "TRANSPORT_ERROR"),
            AppError::Parse { .. } => (ErrorCode::INTERNAL_ERROR, "PARSE_ERROR"),
            AppError::Resolution { .. } => (ErrorCode::INTERNAL_ERROR, "RESOLUTION_ERROR"),
            AppError::Query { .. } => (ErrorCode::INTERNAL_ERROR, "QUERY_ERROR"),
            AppError::Policy(_) => (ErrorCode::INVALID_PARAMS, "POLICY_ERROR"),
            AppError::InvalidEntityId(_) => (ErrorCode::INVALID_PARAMS, "INVALID_ENTITY_ID"),
            AppError::EntityNotFound(_) => (ErrorCode::RESOURCE_NOT_FOUND, "ENTITY_NOT_FOUND"),
            AppError::Io(_) => (ErrorCode::INTERNAL_ERROR, "IO_ERROR"),
            AppError::Config(_) => (ErrorCode::INTERNAL_ERROR, "CONFIG_ERROR"),
            AppError::Internal(_) => (ErrorCode::INTERNAL_ERROR, "INTERNAL_ERROR"),
        };

        rmcp::model::ErrorData::new(code, format!("[{}] {}", app_code, err), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_names_entity_and_cause() {
        let err = AppError::resolution("Q42", AppError::transport("sparql", "timed out"));
        let msg = err.to_string();
        assert!(msg.contains("Q42"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn test_policy_error_maps_to_invalid_params() {
        let data = rmcp::model::ErrorData::from(AppError::Policy("overlap".into()));
        assert_eq!(data.code, ErrorCode::INVALID_PARAMS);
        assert!(data.message.contains("POLICY_ERROR"));
    }
}
