// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! PostgreSQL family rendering (PostgreSQL, CockroachDB)
//!
//! PostgreSQL is closest to the defaults. It differs in:
//! - `STRPOS(haystack, needle)` instead of `LOCATE`
//! - `STRING_AGG(e, sep ORDER BY ...)` for string aggregation
//! - `RANDOM()` without a seed argument
//! - `#` for bitwise xor
//! - `~` / `~*` regular expression operators

use unified_sql_ir::{BitwiseOp, Dialect, Expr, OrderBy};

use crate::context::RenderContext;
use crate::dialect::{DialectStrategy, SharedRendering};
use crate::error::{RenderError, RenderResult};

/// PostgreSQL family strategy
#[derive(Debug, Clone, Copy)]
pub struct PostgreSQLStrategy {
    dialect: Dialect,
}

impl PostgreSQLStrategy {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Default for PostgreSQLStrategy {
    fn default() -> Self {
        Self::new(Dialect::PostgreSQL)
    }
}

impl DialectStrategy for PostgreSQLStrategy {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn locate(&self, ctx: &mut RenderContext<'_>, haystack: &Expr, needle: &Expr) -> RenderResult<()> {
        SharedRendering::function_call(ctx, "STRPOS", &[haystack.clone(), needle.clone()])
    }

    fn group_concat(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        separator: Option<&str>,
        distinct: bool,
        order_by: &[OrderBy],
    ) -> RenderResult<()> {
        ctx.append("STRING_AGG(");
        if distinct {
            ctx.append("DISTINCT ");
        }
        ctx.render(expr)?;
        ctx.append(", ");
        SharedRendering::string_literal(ctx, separator.unwrap_or(","))?;
        if !order_by.is_empty() {
            ctx.append(" ORDER BY ");
            ctx.render_list(order_by, ", ", |ctx, item| self.order_by_item(ctx, item))?;
        }
        ctx.append(")");
        Ok(())
    }

    fn random(&self, ctx: &mut RenderContext<'_>, seed: Option<i64>) -> RenderResult<()> {
        if seed.is_some() {
            return Err(RenderError::unsupported("seeded RANDOM", self.dialect));
        }
        ctx.append("RANDOM()");
        Ok(())
    }

    fn bitwise(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Expr,
        op: BitwiseOp,
        right: &Expr,
    ) -> RenderResult<()> {
        let symbol = match op {
            BitwiseOp::And => "&",
            BitwiseOp::Or => "|",
            BitwiseOp::Xor => "#",
        };
        SharedRendering::infix(ctx, left, symbol, right)
    }

    fn regexp(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        pattern: &Expr,
        case_sensitive: bool,
    ) -> RenderResult<()> {
        SharedRendering::infix(ctx, expr, if case_sensitive { "~" } else { "~*" }, pattern)
    }
}
