// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified SQL - Rendering Layer
//!
//! This crate turns typed queries from `unified-sql-ir` into SQL text for a
//! specific database, together with the parameters to bind.
//!
//! ## Overview
//!
//! The rendering layer is responsible for:
//! - Walking expression trees and SELECT statements in a single forward pass
//! - Registering bound parameters in placeholder order
//! - Dispatching vendor differences to a [`DialectStrategy`]
//! - Converting values to literals, driver values and back
//!
//! ## Rendering Process
//!
//! ```text
//! SelectBuilder → build() → SelectStatement → render_query(DatabaseContext) → RenderedSql
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use unified_sql_ir::ops::{and, col, eq};
//! use unified_sql_ir::{ColumnType, SelectBuilder, Table};
//! use unified_sql_render::{DatabaseContext, RenderMode, render_query};
//! use unified_sql_ir::Dialect;
//!
//! let id = col("t", "id", ColumnType::Integer);
//! let name = col("t", "name", ColumnType::Text);
//!
//! let mut builder = SelectBuilder::new(Table::new("t"));
//! builder
//!     .select(vec![id.clone(), name.clone()])
//!     .unwrap()
//!     .and_where(and(eq(id, 5), eq(name, "Bob")));
//! let statement = builder.build().unwrap();
//!
//! let db = DatabaseContext::for_dialect(Dialect::PostgreSQL);
//! let rendered = render_query(&statement, &db, RenderMode::Prepared).unwrap();
//! assert_eq!(
//!     rendered.sql,
//!     "SELECT t.id, t.name FROM t WHERE (t.id = ?) AND (t.name = ?)"
//! );
//! assert_eq!(rendered.parameters.len(), 2);
//! ```

pub mod config;
pub mod context;
pub mod convert;
pub mod database;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod query;
pub mod registry;

pub use config::{DEFAULT_MAX_NESTING_DEPTH, RenderConfig};
pub use context::{BoundParameter, PLACEHOLDER, RenderContext, RenderMode, RenderedSql};
pub use convert::ValueTypeStrategy;
pub use database::DatabaseContext;
pub use dialect::{DialectStrategy, builtin_strategy};
pub use error::{ErrorKind, RenderError, RenderResult};
pub use registry::{DialectFactory, DialectRegistry, register_dialect, resolve_dialect};

use tracing::debug;
use unified_sql_ir::{Expr, SelectStatement};

/// A node that can write itself into a [`RenderContext`]
///
/// Implementations append their fragment left to right and register every
/// bound value at the point its placeholder is written.
pub trait Render {
    fn render(&self, ctx: &mut RenderContext<'_>) -> RenderResult<()>;
}

/// Render a finalized SELECT statement
///
/// The dialect and configuration come from `db`; `mode` decides whether
/// values become placeholders or inline literals.
#[tracing::instrument(skip_all, fields(dialect = %db.dialect(), mode = ?mode))]
pub fn render_query(
    statement: &SelectStatement,
    db: &DatabaseContext,
    mode: RenderMode,
) -> RenderResult<RenderedSql> {
    let config = db.config();
    let mut ctx = RenderContext::new(db.strategy(), config, mode);
    ctx.render(statement)?;
    let rendered = ctx.finish();

    debug!(
        parameters = rendered.parameters.len(),
        length = rendered.sql.len(),
        "rendered statement"
    );
    Ok(rendered)
}

/// Render a standalone expression (e.g. a predicate for another tool)
pub fn render_expr(expr: &Expr, db: &DatabaseContext, mode: RenderMode) -> RenderResult<RenderedSql> {
    let mut ctx = RenderContext::new(db.strategy(), db.config(), mode);
    ctx.render(expr)?;
    Ok(ctx.finish())
}
