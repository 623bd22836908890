// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified SQL - Query Representation
//!
//! This crate provides the typed representation of SQL queries:
//! - Expression trees whose nodes carry their logical result type
//! - Sources and join graphs, with foreign-key based join inference
//! - SELECT assembly through a validating builder and immutable snapshots
//! - Dialect identity and capability flags
//!
//! Nothing here produces SQL text; see the `unified-sql-render` crate.

pub mod dialect;
pub mod error;
pub mod expr;
pub mod ops;
pub mod query;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use dialect::{Dialect, DialectExtensions, DialectFamily};
pub use error::{QueryError, QueryResult};
pub use expr::{
    AggregateFunction, ArithmeticOp, BitwiseOp, ColumnRef, ComparisonOp, Expr, LogicalOp,
    MembershipSource, Quantifier,
};
pub use ops::CaseBuilder;
pub use query::{
    CommentPosition, Distinct, LockMode, OrderBy, SelectBuilder, SelectItem, SelectStatement,
    SortOrder,
};
pub use source::{ColumnDef, ForeignKey, JoinGraph, JoinPart, JoinType, Source, Table};
pub use types::{ColumnType, DriverValue, TypedValue, Value};
