// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Database context: the active dialect for a render call
//!
//! A [`DatabaseContext`] is passed explicitly to every render. Queries and
//! expressions never carry one, so the same statement renders for any
//! database.

use std::fmt;
use std::sync::Arc;

use unified_sql_ir::{Dialect, Expr, SelectStatement};

use crate::config::RenderConfig;
use crate::context::RenderedSql;
use crate::dialect::{DialectStrategy, builtin_strategy};
use crate::error::{RenderError, RenderResult};
use crate::registry::resolve_dialect;

/// Dialect strategy and configuration for rendering
#[derive(Clone)]
pub struct DatabaseContext {
    /// Connection URL this context was resolved from, if any
    url: Option<String>,
    strategy: Arc<dyn DialectStrategy>,
    config: RenderConfig,
}

impl fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseContext")
            .field("url", &self.url)
            .field("dialect", &self.strategy.dialect())
            .field("config", &self.config)
            .finish()
    }
}

impl DatabaseContext {
    /// Context for a connection URL or vendor name, via the global registry
    pub fn from_url(url: &str) -> RenderResult<Self> {
        let strategy = resolve_dialect(url)?;
        Ok(Self {
            url: Some(url.to_string()),
            strategy,
            config: RenderConfig::default(),
        })
    }

    /// Context for a built-in dialect
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::with_strategy(builtin_strategy(dialect))
    }

    /// Context for a custom strategy
    pub fn with_strategy(strategy: Arc<dyn DialectStrategy>) -> Self {
        Self {
            url: None,
            strategy,
            config: RenderConfig::default(),
        }
    }

    /// Replace the configuration, validating it first
    pub fn with_config(mut self, config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// The context to render with, or `NoActiveDialect` when there is none
    pub fn require(context: Option<&DatabaseContext>) -> RenderResult<&DatabaseContext> {
        context.ok_or(RenderError::NoActiveDialect)
    }

    pub fn dialect(&self) -> Dialect {
        self.strategy.dialect()
    }

    pub fn strategy(&self) -> &dyn DialectStrategy {
        self.strategy.as_ref()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Render a statement in the configured mode
    pub fn render(&self, statement: &SelectStatement) -> RenderResult<RenderedSql> {
        crate::render_query(statement, self, self.config.mode)
    }

    /// Render an expression in the configured mode
    pub fn render_expr(&self, expr: &Expr) -> RenderResult<RenderedSql> {
        crate::render_expr(expr, self, self.config.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderMode;

    #[test]
    fn test_from_url() {
        let db = DatabaseContext::from_url("jdbc:mariadb://localhost/shop").unwrap();
        assert_eq!(db.dialect(), Dialect::MariaDB);
        assert_eq!(db.url(), Some("jdbc:mariadb://localhost/shop"));
        assert!(DatabaseContext::from_url("informix://host").is_err());
    }

    #[test]
    fn test_require() {
        assert_eq!(
            DatabaseContext::require(None).unwrap_err(),
            RenderError::NoActiveDialect
        );
        let db = DatabaseContext::for_dialect(Dialect::H2);
        assert_eq!(DatabaseContext::require(Some(&db)).unwrap().dialect(), Dialect::H2);
    }

    #[test]
    fn test_with_config_validates() {
        let db = DatabaseContext::for_dialect(Dialect::SQLite);
        assert!(
            db.clone()
                .with_config(RenderConfig::default().with_max_nesting_depth(0))
                .is_err()
        );
        let db = db
            .with_config(RenderConfig::default().with_mode(RenderMode::Literal))
            .unwrap();
        assert_eq!(db.config().mode, RenderMode::Literal);
    }
}
