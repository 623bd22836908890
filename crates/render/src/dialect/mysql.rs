// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! MySQL family rendering (MySQL, MariaDB, TiDB)
//!
//! Differences from the defaults:
//! - Backtick identifiers
//! - `GROUP_CONCAT(... SEPARATOR ...)`
//! - Native `<=>` null-safe equality
//! - `& | ^` bitwise operators
//! - `LIMIT` is mandatory before `OFFSET`
//! - No `NULLS FIRST` / `NULLS LAST`; placement is emulated with a sort key
//! - MariaDB spells shared locks `LOCK IN SHARE MODE`
//! - TiDB cannot `SKIP LOCKED`

use unified_sql_ir::{BitwiseOp, ColumnType, Dialect, DialectExtensions, Expr, LockMode, OrderBy};

use crate::context::RenderContext;
use crate::dialect::{DialectStrategy, SharedRendering};
use crate::error::{RenderError, RenderResult};

/// Row count meaning "no limit", MySQL has no bare `OFFSET`
const MAX_ROWS: u64 = u64::MAX;

/// MySQL family strategy
#[derive(Debug, Clone, Copy)]
pub struct MySQLStrategy {
    dialect: Dialect,
}

impl MySQLStrategy {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Default for MySQLStrategy {
    fn default() -> Self {
        Self::new(Dialect::MySQL)
    }
}

impl DialectStrategy for MySQLStrategy {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('`', '`')
    }

    fn group_concat(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        separator: Option<&str>,
        distinct: bool,
        order_by: &[OrderBy],
    ) -> RenderResult<()> {
        ctx.append("GROUP_CONCAT(");
        if distinct {
            ctx.append("DISTINCT ");
        }
        ctx.render(expr)?;
        if !order_by.is_empty() {
            ctx.append(" ORDER BY ");
            ctx.render_list(order_by, ", ", |ctx, item| self.order_by_item(ctx, item))?;
        }
        if let Some(separator) = separator {
            ctx.append(" SEPARATOR ");
            SharedRendering::string_literal(ctx, separator)?;
        }
        ctx.append(")");
        Ok(())
    }

    fn cast_type_name(&self, target: &ColumnType) -> RenderResult<String> {
        let name = match target {
            ColumnType::Boolean | ColumnType::Short | ColumnType::Integer | ColumnType::Long => {
                "SIGNED".to_string()
            }
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            ColumnType::Varchar(len) => format!("CHAR({len})"),
            ColumnType::Text => "CHAR".to_string(),
            ColumnType::Binary => "BINARY".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME(6)".to_string(),
            ColumnType::DateTime => "DATETIME(6)".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Array(_) => {
                return Err(RenderError::unsupported("CAST to ARRAY", self.dialect));
            }
        };
        Ok(name)
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

    fn null_safe_comparison(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Expr,
        right: &Expr,
        equal: bool,
    ) -> RenderResult<()> {
        if !self.supports(DialectExtensions::NullSafeEqualityOperator) {
            return Err(RenderError::unsupported("<=>", self.dialect));
        }
        if !equal {
            ctx.append("NOT (");
        }
        SharedRendering::infix(ctx, left, "<=>", right)?;
        if !equal {
            ctx.append(")");
        }
        Ok(())
    }

    fn limit_offset(
        &self,
        ctx: &mut RenderContext<'_>,
        limit: Option<u64>,
        offset: Option<u64>,
        _has_order_by: bool,
    ) -> RenderResult<()> {
        match (limit, offset) {
            (None, None) => {}
            (Some(limit), None) => {
                ctx.append_clause("LIMIT").append(&format!(" {limit}"));
            }
            (limit, Some(offset)) => {
                let limit = limit.unwrap_or(MAX_ROWS);
                ctx.append_clause("LIMIT")
                    .append(&format!(" {limit}"))
                    .append_clause("OFFSET")
                    .append(&format!(" {offset}"));
            }
        }
        Ok(())
    }

    fn lock_clause(&self, mode: LockMode) -> RenderResult<&'static str> {
        let (required, text) = SharedRendering::lock_text(mode);
        if !self.supports(required) {
            return Err(RenderError::unsupported(text, self.dialect));
        }
        if mode == LockMode::ForShare && self.dialect == Dialect::MariaDB {
            return Ok("LOCK IN SHARE MODE");
        }
        Ok(text)
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
    use unified_sql_ir::SortOrder;
    use unified_sql_ir::ops::col;

    fn render_with<F>(dialect: Dialect, f: F) -> String
    where
        F: FnOnce(&MySQLStrategy, &mut RenderContext<'_>) -> RenderResult<()>,
    {
        let strategy = MySQLStrategy::new(dialect);
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&strategy, &config, RenderMode::Prepared);
        f(&strategy, &mut ctx).unwrap();
        ctx.finish().sql
    }

    #[test]
    fn test_backtick_quoting() {
        let strategy = MySQLStrategy::default();
        assert_eq!(strategy.quote_identifier("order", false), "`order`");
        assert_eq!(strategy.quote_identifier("id", false), "id");
    }

    #[test]
    fn test_null_safe() {
        let a = col("t", "a", ColumnType::Integer);
        let b = col("t", "b", ColumnType::Integer);
        assert_eq!(
            render_with(Dialect::MySQL, |s, ctx| s.null_safe_comparison(ctx, &a, &b, true)),
            "t.a <=> t.b"
        );
        assert_eq!(
            render_with(Dialect::MySQL, |s, ctx| s.null_safe_comparison(ctx, &a, &b, false)),
            "NOT (t.a <=> t.b)"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        assert_eq!(
            render_with(Dialect::MySQL, |s, ctx| s.limit_offset(ctx, None, Some(20), false)),
            " LIMIT 18446744073709551615 OFFSET 20"
        );
    }

    #[test]
    fn test_group_concat() {
        let name = col("t", "name", ColumnType::Text);
        let order = vec![OrderBy::new(name.clone(), SortOrder::Desc)];
        assert_eq!(
            render_with(Dialect::MySQL, |s, ctx| s.group_concat(ctx, &name, Some("; "), true, &order)),
            "GROUP_CONCAT(DISTINCT t.name ORDER BY t.name DESC SEPARATOR '; ')"
        );
    }

    #[test]
    fn test_emulated_nulls_last() {
        let name = col("t", "name", ColumnType::Text);
        let item = OrderBy::new(name, SortOrder::AscNullsLast);
        assert_eq!(
            render_with(Dialect::MySQL, |s, ctx| s.order_by_item(ctx, &item)),
            "CASE WHEN t.name IS NULL THEN 1 ELSE 0 END, t.name ASC"
        );
    }

    #[test]
    fn test_mariadb_share_lock() {
        assert_eq!(
            MySQLStrategy::new(Dialect::MariaDB).lock_clause(LockMode::ForShare).unwrap(),
            "LOCK IN SHARE MODE"
        );
        assert_eq!(
            MySQLStrategy::new(Dialect::MySQL).lock_clause(LockMode::ForShare).unwrap(),
            "FOR SHARE"
        );
    }

    #[test]
    fn test_lock_modes_follow_capabilities() {
        assert_eq!(
            MySQLStrategy::new(Dialect::MariaDB)
                .lock_clause(LockMode::ForUpdateSkipLocked)
                .unwrap(),
            "FOR UPDATE SKIP LOCKED"
        );
        let err = MySQLStrategy::new(Dialect::TiDB)
            .lock_clause(LockMode::ForUpdateSkipLocked)
            .unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedByDialect { .. }));
        assert_eq!(
            MySQLStrategy::new(Dialect::TiDB).lock_clause(LockMode::ForUpdateNoWait).unwrap(),
            "FOR UPDATE NOWAIT"
        );
    }

    #[test]
    fn test_cast_type_names() {
        let strategy = MySQLStrategy::default();
        assert_eq!(strategy.cast_type_name(&ColumnType::Long).unwrap(), "SIGNED");
        assert_eq!(strategy.cast_type_name(&ColumnType::Varchar(10)).unwrap(), "CHAR(10)");
        assert!(strategy.cast_type_name(&ColumnType::Array(Box::new(ColumnType::Integer))).is_err());
    }
}
