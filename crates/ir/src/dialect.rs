// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! This module identifies the SQL dialects a query can be rendered for and the
//! capabilities that vary between them.
//!
//! ## Design
//!
//! The dialect system is organized into two levels:
//!
//! 1. **Dialect Family**: Groupings that share rendering rules (MySQL, PostgreSQL,
//!    SQLite, Oracle, SQL Server, H2)
//! 2. **Specific Dialect**: Individual database products (MySQL, MariaDB, TiDB,
//!    PostgreSQL, CockroachDB, ...)
//!
//! ## Dialect Families
//!
//! - **MySQL Family**: MySQL, MariaDB and TiDB
//!   - `LIMIT n OFFSET m`, backtick identifiers, native `<=>` null-safe equality
//!   - MariaDB locks shared rows with `LOCK IN SHARE MODE`
//!
//! - **PostgreSQL Family**: PostgreSQL and CockroachDB
//!   - `DISTINCT ON`, arrays, `IS [NOT] DISTINCT FROM`, `~` regular expressions
//!
//! - **SQLite**: `IS` / `IS NOT` as null-safe comparison, no row locking
//!
//! - **Oracle**: `FROM DUAL`, `OFFSET .. FETCH`, no boolean literals, `DECODE`
//!
//! - **SQL Server**: bracket identifiers, `OFFSET .. FETCH`, `BIT` booleans
//!
//! - **H2**: ANSI-leaning embedded database
//!
//! ## Dialect Extensions
//!
//! [`DialectExtensions`] lists the features that are not portable. The render
//! layer checks them before emitting vendor syntax and reports a typed
//! "unsupported by dialect" error when a feature is missing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Dialect {
    /// MySQL (5.7, 8.0)
    MySQL,
    /// MariaDB (10.x, 11.x)
    MariaDB,
    /// TiDB (5.0 - 8.0)
    TiDB,
    /// PostgreSQL (12+)
    PostgreSQL,
    /// CockroachDB (21.x+)
    CockroachDB,
    /// SQLite (3.39+)
    SQLite,
    /// Oracle (12c+)
    Oracle,
    /// Microsoft SQL Server (2017+)
    SQLServer,
    /// H2 (2.x)
    H2,
}

impl Dialect {
    /// Every dialect known to the engine
    pub const ALL: [Dialect; 9] = [
        Dialect::MySQL,
        Dialect::MariaDB,
        Dialect::TiDB,
        Dialect::PostgreSQL,
        Dialect::CockroachDB,
        Dialect::SQLite,
        Dialect::Oracle,
        Dialect::SQLServer,
        Dialect::H2,
    ];

    /// Returns the family this dialect belongs to
    pub fn family(&self) -> DialectFamily {
        match self {
            Dialect::MySQL | Dialect::TiDB | Dialect::MariaDB => DialectFamily::MySQL,
            Dialect::PostgreSQL | Dialect::CockroachDB => DialectFamily::PostgreSQL,
            Dialect::SQLite => DialectFamily::SQLite,
            Dialect::Oracle => DialectFamily::Oracle,
            Dialect::SQLServer => DialectFamily::SQLServer,
            Dialect::H2 => DialectFamily::H2,
        }
    }

    /// Human readable product name
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySQL => "MySQL",
            Dialect::MariaDB => "MariaDB",
            Dialect::TiDB => "TiDB",
            Dialect::PostgreSQL => "PostgreSQL",
            Dialect::CockroachDB => "CockroachDB",
            Dialect::SQLite => "SQLite",
            Dialect::Oracle => "Oracle",
            Dialect::SQLServer => "SQL Server",
            Dialect::H2 => "H2",
        }
    }

    /// Vendor identifier used as a registry key and connection URL scheme
    pub fn vendor_prefix(&self) -> &'static str {
        match self {
            Dialect::MySQL => "mysql",
            Dialect::MariaDB => "mariadb",
            Dialect::TiDB => "tidb",
            Dialect::PostgreSQL => "postgresql",
            Dialect::CockroachDB => "cockroachdb",
            Dialect::SQLite => "sqlite",
            Dialect::Oracle => "oracle",
            Dialect::SQLServer => "sqlserver",
            Dialect::H2 => "h2",
        }
    }

    /// Check if this dialect supports a specific extension
    pub fn supports(&self, ext: DialectExtensions) -> bool {
        use DialectExtensions as Ext;

        // TiDB follows MySQL except for lock waits it cannot skip
        if *self == Dialect::TiDB && ext == Ext::SkipLocked {
            return false;
        }

        match self.family() {
            DialectFamily::MySQL => matches!(
                ext,
                Ext::LimitOffset
                    | Ext::NullSafeEqualityOperator
                    | Ext::BooleanLiterals
                    | Ext::ForUpdate
                    | Ext::ForShare
                    | Ext::NoWait
                    | Ext::SkipLocked
                    | Ext::Regexp
                    | Ext::QuantifiedComparison
                    | Ext::RandomSeed
            ),
            DialectFamily::PostgreSQL => matches!(
                ext,
                Ext::LimitOffset
                    | Ext::DistinctOn
                    | Ext::FullOuterJoin
                    | Ext::BooleanLiterals
                    | Ext::ForUpdate
                    | Ext::ForShare
                    | Ext::NoWait
                    | Ext::SkipLocked
                    | Ext::Regexp
                    | Ext::Arrays
                    | Ext::QuantifiedComparison
            ),
            DialectFamily::SQLite => matches!(
                ext,
                Ext::LimitOffset | Ext::FullOuterJoin | Ext::BooleanLiterals
            ),
            DialectFamily::Oracle => matches!(
                ext,
                Ext::FullOuterJoin
                    | Ext::ForUpdate
                    | Ext::NoWait
                    | Ext::SkipLocked
                    | Ext::Regexp
                    | Ext::QuantifiedComparison
                    | Ext::DualTable
            ),
            DialectFamily::SQLServer => matches!(
                ext,
                Ext::FullOuterJoin | Ext::QuantifiedComparison | Ext::RandomSeed
            ),
            DialectFamily::H2 => matches!(
                ext,
                Ext::LimitOffset
                    | Ext::DistinctOn
                    | Ext::FullOuterJoin
                    | Ext::BooleanLiterals
                    | Ext::ForUpdate
                    | Ext::Regexp
                    | Ext::Arrays
                    | Ext::QuantifiedComparison
                    | Ext::RandomSeed
            ),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dialect family groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialectFamily {
    MySQL,
    PostgreSQL,
    SQLite,
    Oracle,
    SQLServer,
    H2,
}

/// Dialect-specific extensions and features
///
/// These represent syntax or features that are not part of the portable SQL
/// subset the renderer emits by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DialectExtensions {
    /// `LIMIT n OFFSET m` (otherwise `OFFSET m ROWS FETCH NEXT n ROWS ONLY`)
    LimitOffset,

    /// `DISTINCT ON (...)`
    DistinctOn,

    /// `FULL JOIN`
    FullOuterJoin,

    /// Native `<=>` null-safe equality operator
    NullSafeEqualityOperator,

    /// `TRUE` / `FALSE` keywords (otherwise `1` / `0`)
    BooleanLiterals,

    /// `FOR UPDATE` row locking
    ForUpdate,

    /// Shared row locking
    ForShare,

    /// `NOWAIT` lock modifier
    NoWait,

    /// `SKIP LOCKED` lock modifier
    SkipLocked,

    /// Regular expression matching
    Regexp,

    /// Array values and `ANY (array)` membership
    Arrays,

    /// `ANY` / `ALL` quantified comparison over a subquery
    QuantifiedComparison,

    /// A `FROM DUAL` source is mandatory for table-less selects
    DualTable,

    /// Seeded random number generation
    RandomSeed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_grouping() {
        assert_eq!(Dialect::MariaDB.family(), DialectFamily::MySQL);
        assert_eq!(Dialect::TiDB.family(), DialectFamily::MySQL);
        assert_eq!(Dialect::CockroachDB.family(), DialectFamily::PostgreSQL);
        assert_eq!(Dialect::H2.family(), DialectFamily::H2);
    }

    #[test]
    fn test_vendor_prefix_is_unique() {
        let mut prefixes: Vec<_> = Dialect::ALL.iter().map(|d| d.vendor_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), Dialect::ALL.len());
    }

    #[test]
    fn test_supports() {
        assert!(Dialect::PostgreSQL.supports(DialectExtensions::DistinctOn));
        assert!(!Dialect::MySQL.supports(DialectExtensions::DistinctOn));
        assert!(Dialect::MySQL.supports(DialectExtensions::NullSafeEqualityOperator));
        assert!(!Dialect::MySQL.supports(DialectExtensions::FullOuterJoin));
        assert!(!Dialect::Oracle.supports(DialectExtensions::BooleanLiterals));
        assert!(Dialect::Oracle.supports(DialectExtensions::DualTable));
        assert!(!Dialect::SQLite.supports(DialectExtensions::ForUpdate));
        assert!(Dialect::MariaDB.supports(DialectExtensions::SkipLocked));
        assert!(!Dialect::TiDB.supports(DialectExtensions::SkipLocked));
    }
}
