// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Dialect-specific rendering implementations

use std::sync::Arc;

use unified_sql_ir::{Dialect, DialectFamily};

pub mod base;
pub mod shared;

pub mod h2;
pub mod mysql;
pub mod oracle;
pub mod postgresql;
pub mod sqlite;
pub mod sqlserver;

pub use base::DialectStrategy;
pub use h2::H2Strategy;
pub use mysql::MySQLStrategy;
pub use oracle::OracleStrategy;
pub use postgresql::PostgreSQLStrategy;
pub use shared::SharedRendering;
pub use sqlite::SQLiteStrategy;
pub use sqlserver::SQLServerStrategy;

/// Built-in strategy for a dialect
pub fn builtin_strategy(dialect: Dialect) -> Arc<dyn DialectStrategy> {
    match dialect.family() {
        DialectFamily::MySQL => Arc::new(MySQLStrategy::new(dialect)),
        DialectFamily::PostgreSQL => Arc::new(PostgreSQLStrategy::new(dialect)),
        DialectFamily::SQLite => Arc::new(SQLiteStrategy::new()),
        DialectFamily::Oracle => Arc::new(OracleStrategy::new()),
        DialectFamily::SQLServer => Arc::new(SQLServerStrategy::new()),
        DialectFamily::H2 => Arc::new(H2Strategy::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_strategy_keeps_dialect() {
        for dialect in Dialect::ALL {
            assert_eq!(builtin_strategy(dialect).dialect(), dialect);
        }
    }
}
