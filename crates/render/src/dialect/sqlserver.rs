// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL Server rendering
//!
//! Bracket identifiers, `CHARINDEX`, `STRING_AGG ... WITHIN GROUP`, and
//! `OFFSET .. FETCH` paging, which SQL Server only accepts after an
//! `ORDER BY`. SQL Server has no `NULLS FIRST` / `NULLS LAST` and no row
//! locking clause.

use unified_sql_ir::{BitwiseOp, Dialect, Expr, OrderBy};

use crate::context::RenderContext;
use crate::dialect::{DialectStrategy, SharedRendering};
use crate::error::{RenderError, RenderResult};

/// SQL Server strategy (2017+)
#[derive(Debug, Clone, Copy, Default)]
pub struct SQLServerStrategy;

impl SQLServerStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl DialectStrategy for SQLServerStrategy {
    fn dialect(&self) -> Dialect {
        Dialect::SQLServer
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn locate(&self, ctx: &mut RenderContext<'_>, haystack: &Expr, needle: &Expr) -> RenderResult<()> {
        SharedRendering::function_call(ctx, "CHARINDEX", &[needle.clone(), haystack.clone()])
    }

    fn group_concat(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        separator: Option<&str>,
        distinct: bool,
        order_by: &[OrderBy],
    ) -> RenderResult<()> {
        if distinct {
            return Err(RenderError::unsupported("STRING_AGG with DISTINCT", Dialect::SQLServer));
        }
        ctx.append("STRING_AGG(");
        ctx.render(expr)?;
        ctx.append(", ");
        SharedRendering::string_literal(ctx, separator.unwrap_or(","))?;
        ctx.append(")");
        if !order_by.is_empty() {
            ctx.append(" WITHIN GROUP (ORDER BY ");
            ctx.render_list(order_by, ", ", |ctx, item| self.order_by_item(ctx, item))?;
            ctx.append(")");
        }
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
            BitwiseOp::Xor => "^",
        };
        SharedRendering::infix(ctx, left, symbol, right)
    }

    fn substring(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        start: &Expr,
        length: Option<&Expr>,
    ) -> RenderResult<()> {
        ctx.append("SUBSTRING(");
        ctx.render(expr)?;
        ctx.append(", ");
        ctx.render(start)?;
        ctx.append(", ");
        match length {
            Some(length) => ctx.render(length)?,
            // The length argument is mandatory
            None => {
                ctx.append("LEN(");
                ctx.render(expr)?;
                ctx.append(")");
            }
        }
        ctx.append(")");
        Ok(())
    }

    fn limit_offset(
        &self,
        ctx: &mut RenderContext<'_>,
        limit: Option<u64>,
        offset: Option<u64>,
        has_order_by: bool,
    ) -> RenderResult<()> {
        if (limit.is_some() || offset.is_some()) && !has_order_by {
            return Err(RenderError::unsupported(
                "OFFSET / FETCH without ORDER BY",
                Dialect::SQLServer,
            ));
        }
        SharedRendering::offset_fetch(ctx, limit, offset);
        Ok(())
    }

    fn order_by_item(&self, ctx: &mut RenderContext<'_>, item: &OrderBy) -> RenderResult<()> {
        SharedRendering::emulated_nulls_order(ctx, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::context::RenderMode;
    use unified_sql_ir::ColumnType;
    use unified_sql_ir::ops::col;

    fn render_with<F>(f: F) -> RenderResult<String>
    where
        F: FnOnce(&SQLServerStrategy, &mut RenderContext<'_>) -> RenderResult<()>,
    {
        let strategy = SQLServerStrategy::new();
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&strategy, &config, RenderMode::Prepared);
        f(&strategy, &mut ctx)?;
        Ok(ctx.finish().sql)
    }

    #[test]
    fn test_bracket_quoting() {
        let strategy = SQLServerStrategy::new();
        assert_eq!(strategy.quote_identifier("user", false), "[user]");
        assert_eq!(strategy.quote_identifier("a]b", true), "[a]]b]");
    }

    #[test]
    fn test_paging_requires_order_by() {
        let err = render_with(|s, ctx| s.limit_offset(ctx, Some(10), None, false)).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedByDialect { .. }));
        assert_eq!(
            render_with(|s, ctx| s.limit_offset(ctx, Some(10), Some(20), true)).unwrap(),
            " OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_substring_without_length() {
        let name = col("t", "name", ColumnType::Text);
        let start = Expr::from(2);
        assert_eq!(
            render_with(|s, ctx| s.substring(ctx, &name, &start, None)).unwrap(),
            "SUBSTRING(t.name, ?, LEN(t.name))"
        );
    }

    #[test]
    fn test_charindex() {
        let name = col("t", "name", ColumnType::Text);
        let needle = Expr::from("x");
        assert_eq!(
            render_with(|s, ctx| s.locate(ctx, &name, &needle)).unwrap(),
            "CHARINDEX(?, t.name)"
        );
    }

    #[test]
    fn test_string_agg_distinct_rejected() {
        let name = col("t", "name", ColumnType::Text);
        assert!(render_with(|s, ctx| s.group_concat(ctx, &name, None, true, &[])).is_err());
    }
}
