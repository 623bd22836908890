// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Errors raised while assembling queries and join graphs

use serde::Serialize;

/// Result type alias for query assembly operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Semantic errors detected while a query or join is being built
///
/// These fail synchronously at the mutator that introduced the problem. A
/// [`SelectStatement`](crate::SelectStatement) assembled by hand or
/// deserialized is checked again when it is rendered.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum QueryError {
    /// A query must project at least one expression
    #[error("Query has an empty projection")]
    EmptyProjection,

    /// `DISTINCT` and `DISTINCT ON` cannot both be requested
    #[error("Cannot combine DISTINCT with DISTINCT ON: {message}")]
    ConflictingDistinct { message: String },

    /// `DISTINCT ON` needs at least one expression
    #[error("DISTINCT ON requires at least one expression")]
    EmptyDistinctOn,

    /// HAVING was already set; use `replace_having` to overwrite it
    #[error("HAVING clause is already set")]
    HavingAlreadySet,

    /// A comment already occupies this position
    #[error("A comment is already set at position {position}")]
    CommentAlreadySet { position: String },

    /// Comment text would terminate the enclosing `/* */` block
    #[error("Invalid comment text: {message}")]
    InvalidComment { message: String },

    /// Implicit join found no foreign key between the two sides
    #[error("Cannot join {left} with {right}: no matching primary/foreign key pair")]
    NoMatchingKey { left: String, right: String },

    /// Implicit join found more than one candidate foreign key
    #[error("Cannot join {left} with {right}: ambiguous foreign keys ({candidates})")]
    AmbiguousJoin {
        left: String,
        right: String,
        candidates: String,
    },

    /// Implicit join found a multi-column key, which needs an explicit condition
    #[error("Cannot join {left} with {right}: foreign key spans {columns} columns")]
    MultiColumnKey {
        left: String,
        right: String,
        columns: usize,
    },

    /// A non-cross join was requested without any usable condition
    #[error("{join_type} join with {right} requires a join condition")]
    MissingJoinCondition { join_type: String, right: String },

    /// Cross joins take no condition
    #[error("CROSS join with {right} does not accept a join condition")]
    UnexpectedJoinCondition { right: String },

    /// Composite key columns and values do not line up
    #[error("Composite key has {columns} columns but {values} values")]
    InvalidCompositeKey { columns: usize, values: usize },

    /// A column is not declared on the table it was looked up in
    #[error("Column '{column}' does not exist on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// A CASE expression needs at least one WHEN branch
    #[error("CASE expression has no WHEN branches")]
    EmptyCase,
}

impl QueryError {
    /// Errors produced while resolving joins (as opposed to clause mutators)
    pub fn is_join_error(&self) -> bool {
        matches!(
            self,
            QueryError::NoMatchingKey { .. }
                | QueryError::AmbiguousJoin { .. }
                | QueryError::MultiColumnKey { .. }
                | QueryError::MissingJoinCondition { .. }
                | QueryError::UnexpectedJoinCondition { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::NoMatchingKey {
            left: "users".to_string(),
            right: "products".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot join users with products: no matching primary/foreign key pair"
        );
        assert!(err.is_join_error());
        assert!(!QueryError::HavingAlreadySet.is_join_error());
    }

    #[test]
    fn test_error_serializes() {
        let err = QueryError::InvalidCompositeKey {
            columns: 2,
            values: 1,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["InvalidCompositeKey"]["columns"], 2);
    }
}
