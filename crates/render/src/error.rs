// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types for the rendering layer

use serde::Serialize;
use unified_sql_ir::{ColumnType, Dialect, QueryError};

/// Result type alias for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering a query to SQL
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum RenderError {
    /// The active dialect has no way to express the requested operation
    #[error("{operation} is not supported by {dialect}")]
    UnsupportedByDialect { operation: String, dialect: String },

    /// Rendering was requested without a database context
    #[error("No active database dialect")]
    NoActiveDialect,

    /// No registered vendor matches the identifier
    #[error("Unknown database dialect: {identifier}")]
    UnknownDialect { identifier: String },

    /// A value cannot be converted to or from its column type
    #[error("Cannot convert {column_type} value: {message}")]
    Conversion { column_type: String, message: String },

    /// Expression or subquery nesting exceeds the configured limit
    #[error("Nesting too deep: depth {depth} exceeds limit {limit}")]
    NestingTooDeep { depth: usize, limit: usize },

    /// The render configuration is invalid
    #[error("Invalid render configuration: {message}")]
    InvalidConfig { message: String },

    /// The query itself is malformed
    #[error(transparent)]
    Build(#[from] QueryError),
}

impl RenderError {
    pub fn unsupported(operation: impl Into<String>, dialect: Dialect) -> Self {
        RenderError::UnsupportedByDialect {
            operation: operation.into(),
            dialect: dialect.name().to_string(),
        }
    }

    pub fn conversion(column_type: &ColumnType, message: impl Into<String>) -> Self {
        RenderError::Conversion {
            column_type: column_type.to_string(),
            message: message.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::UnsupportedByDialect { .. } => ErrorKind::DialectCapability,
            RenderError::NoActiveDialect
            | RenderError::UnknownDialect { .. }
            | RenderError::InvalidConfig { .. } => ErrorKind::Configuration,
            RenderError::Conversion { .. } => ErrorKind::Conversion,
            RenderError::NestingTooDeep { .. } | RenderError::Build(_) => ErrorKind::Build,
        }
    }

    /// Rendering is deterministic; retrying the same call fails the same way
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed query (caller bug)
    Build,
    /// Feature missing on the active dialect
    DialectCapability,
    /// Missing or unknown dialect, bad configuration
    Configuration,
    /// Value does not fit its column type
    Conversion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = RenderError::unsupported("FULL JOIN", Dialect::MySQL);
        assert_eq!(err.to_string(), "FULL JOIN is not supported by MySQL");
        assert_eq!(err.kind(), ErrorKind::DialectCapability);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(RenderError::NoActiveDialect.kind(), ErrorKind::Configuration);
        assert_eq!(
            RenderError::from(QueryError::EmptyProjection).kind(),
            ErrorKind::Build
        );
        assert_eq!(
            RenderError::conversion(&ColumnType::Integer, "out of range").kind(),
            ErrorKind::Conversion
        );
    }

    #[test]
    fn test_build_error_is_transparent() {
        let err = RenderError::from(QueryError::HavingAlreadySet);
        assert_eq!(err.to_string(), QueryError::HavingAlreadySet.to_string());
    }

    #[test]
    fn test_error_serialization() {
        let err = RenderError::NestingTooDeep {
            depth: 65,
            limit: 64,
        };
        let json = serde_json::to_string(&err);
        assert!(json.is_ok());
    }
}
