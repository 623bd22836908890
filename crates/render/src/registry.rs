// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Registry
//!
//! Maps vendor identifiers to strategy factories.
//!
//! A process-wide registry is created with the built-in vendors on first use.
//! [`register_dialect`] adds or replaces a vendor, [`resolve_dialect`] turns a
//! vendor name or connection URL into a strategy:
//!
//! ```rust
//! use unified_sql_ir::Dialect;
//! use unified_sql_render::resolve_dialect;
//!
//! let strategy = resolve_dialect("jdbc:mysql://localhost:3306/shop").unwrap();
//! assert_eq!(strategy.dialect(), Dialect::MySQL);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::{debug, warn};
use unified_sql_ir::Dialect;

use crate::dialect::{DialectStrategy, builtin_strategy};
use crate::error::{RenderError, RenderResult};

/// Creates a strategy for a vendor
pub type DialectFactory = Arc<dyn Fn() -> Arc<dyn DialectStrategy> + Send + Sync>;

/// Alternate spellings of built-in vendor prefixes
const ALIASES: &[(&str, &str)] = &[
    ("postgres", "postgresql"),
    ("pgsql", "postgresql"),
    ("mssql", "sqlserver"),
    ("cockroach", "cockroachdb"),
    ("sqlite3", "sqlite"),
];

static GLOBAL_REGISTRY: LazyLock<RwLock<DialectRegistry>> =
    LazyLock::new(|| RwLock::new(DialectRegistry::with_builtin()));

/// Vendor prefix to strategy factory
#[derive(Clone, Default)]
pub struct DialectRegistry {
    factories: HashMap<String, DialectFactory>,
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("prefixes", &self.prefixes())
            .finish()
    }
}

impl DialectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in vendor
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for dialect in Dialect::ALL {
            registry.factories.insert(
                dialect.vendor_prefix().to_string(),
                Arc::new(move || builtin_strategy(dialect)),
            );
        }
        registry
    }

    /// Add or replace the factory for `prefix`
    ///
    /// Returns true when an existing vendor was replaced.
    pub fn register(&mut self, prefix: &str, factory: DialectFactory) -> bool {
        let prefix = prefix.to_ascii_lowercase();
        let replaced = self.factories.insert(prefix.clone(), factory).is_some();
        if replaced {
            warn!(prefix = %prefix, "replacing registered dialect");
        } else {
            debug!(prefix = %prefix, "registered dialect");
        }
        replaced
    }

    /// Strategy for a vendor name or connection URL
    ///
    /// Accepts `mysql`, `PostgreSQL`, `jdbc:mysql://host/db`,
    /// `postgres://user@host/db` and `sqlite:memory`.
    pub fn resolve(&self, identifier: &str) -> RenderResult<Arc<dyn DialectStrategy>> {
        let prefix = vendor_prefix(identifier);
        let factory = self
            .factories
            .get(prefix.as_str())
            .ok_or_else(|| RenderError::UnknownDialect {
                identifier: identifier.to_string(),
            })?;

        let strategy = factory();
        debug!(identifier, dialect = %strategy.dialect(), "resolved dialect");
        Ok(strategy)
    }

    /// Registered vendor prefixes, sorted
    pub fn prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.factories.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }
}

/// Vendor prefix of an identifier: scheme of a URL, `jdbc:` stripped, aliases
/// applied
fn vendor_prefix(identifier: &str) -> String {
    let lowered = identifier.trim().to_ascii_lowercase();
    let without_jdbc = lowered.strip_prefix("jdbc:").unwrap_or(&lowered);
    let scheme = without_jdbc
        .split(':')
        .next()
        .unwrap_or(without_jdbc)
        .to_string();

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == scheme)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(scheme)
}

/// Register a vendor in the process-wide registry
pub fn register_dialect<F>(prefix: &str, factory: F) -> bool
where
    F: Fn() -> Arc<dyn DialectStrategy> + Send + Sync + 'static,
{
    GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(prefix, Arc::new(factory))
}

/// Resolve a vendor name or connection URL against the process-wide registry
pub fn resolve_dialect(identifier: &str) -> RenderResult<Arc<dyn DialectStrategy>> {
    GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(identifier)
}
