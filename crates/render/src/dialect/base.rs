// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Base trait providing the default rendering of dialect-dependent nodes
//!
//! Every method has an ANSI-leaning default. Vendor strategies override
//! only what their database spells differently, and check
//! [`DialectExtensions`] before emitting syntax that is not portable.

use std::fmt;

use unified_sql_ir::{
    BitwiseOp, ColumnType, Dialect, DialectExtensions, Expr, JoinType, LockMode,
    MembershipSource, OrderBy, Quantifier, Value,
};

use crate::context::RenderContext;
use crate::convert::ValueTypeStrategy;
use crate::dialect::SharedRendering;
use crate::error::{RenderError, RenderResult};

/// Vendor-specific rendering rules
///
/// Strategies are stateless and shared between threads. The active strategy
/// is reached through [`RenderContext::strategy`], never through the AST.
pub trait DialectStrategy: Send + Sync + fmt::Debug {
    /// Dialect this strategy renders for
    fn dialect(&self) -> Dialect;

    fn supports(&self, ext: DialectExtensions) -> bool {
        self.dialect().supports(ext)
    }

    /// Opening and closing identifier quote characters
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    /// Identifier as written in SQL text
    ///
    /// Quoted when `force` is set or when the name is not a plain,
    /// non-reserved identifier.
    fn quote_identifier(&self, name: &str, force: bool) -> String {
        if !force && !SharedRendering::needs_quoting(name) {
            return name.to_string();
        }
        let (open, close) = self.identifier_quotes();
        SharedRendering::quote_with(name, open, close)
    }

    /// Predicate that holds for every row
    fn always_true(&self) -> &'static str {
        if self.supports(DialectExtensions::BooleanLiterals) {
            "TRUE"
        } else {
            "1 = 1"
        }
    }

    /// Predicate that holds for no row
    fn always_false(&self) -> &'static str {
        if self.supports(DialectExtensions::BooleanLiterals) {
            "FALSE"
        } else {
            "1 = 0"
        }
    }

    /// `CONCAT(a, b)` / `CONCAT_WS(sep, a, b)`
    fn concat(
        &self,
        ctx: &mut RenderContext<'_>,
        separator: Option<&str>,
        args: &[Expr],
    ) -> RenderResult<()> {
        match separator {
            Some(separator) => {
                ctx.append("CONCAT_WS(");
                SharedRendering::string_literal(ctx, separator)?;
                for arg in args {
                    ctx.append(", ");
                    ctx.render(arg)?;
                }
                ctx.append(")");
                Ok(())
            }
            None => SharedRendering::function_call(ctx, "CONCAT", args),
        }
    }

    /// 1-based position of `needle` in `haystack`, 0 when absent
    fn locate(&self, ctx: &mut RenderContext<'_>, haystack: &Expr, needle: &Expr) -> RenderResult<()> {
        ctx.append("LOCATE(");
        ctx.render(needle)?;
        ctx.append(", ");
        ctx.render(haystack)?;
        ctx.append(")");
        Ok(())
    }

    /// `LISTAGG([DISTINCT] e, sep) [WITHIN GROUP (ORDER BY ...)]`
    fn group_concat(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        separator: Option<&str>,
        distinct: bool,
        order_by: &[OrderBy],
    ) -> RenderResult<()> {
        ctx.append("LISTAGG(");
        if distinct {
            ctx.append("DISTINCT ");
        }
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

    /// `RAND([seed])`
    fn random(&self, ctx: &mut RenderContext<'_>, seed: Option<i64>) -> RenderResult<()> {
        match seed {
            Some(seed) => {
                if !self.supports(DialectExtensions::RandomSeed) {
                    return Err(RenderError::unsupported("seeded RANDOM", self.dialect()));
                }
                ctx.append(&format!("RAND({seed})"));
            }
            None => {
                ctx.append("RAND()");
            }
        }
        Ok(())
    }

    /// Type name used inside `CAST`
    fn cast_type_name(&self, target: &ColumnType) -> RenderResult<String> {
        target.sql_type_name(self.dialect())
    }

    /// `CAST(e AS type)`
    fn cast(&self, ctx: &mut RenderContext<'_>, expr: &Expr, target: &ColumnType) -> RenderResult<()> {
        let type_name = self.cast_type_name(target)?;
        ctx.append("CAST(");
        ctx.render(expr)?;
        ctx.append(" AS ").append(&type_name).append(")");
        Ok(())
    }

    /// `BITAND(a, b)` family
    fn bitwise(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Expr,
        op: BitwiseOp,
        right: &Expr,
    ) -> RenderResult<()> {
        let name = match op {
            BitwiseOp::And => "BITAND",
            BitwiseOp::Or => "BITOR",
            BitwiseOp::Xor => "BITXOR",
        };
        SharedRendering::function_call(ctx, name, &[left.clone(), right.clone()])
    }

    /// `REGEXP_LIKE(e, pattern, 'c' | 'i')`
    fn regexp(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        pattern: &Expr,
        case_sensitive: bool,
    ) -> RenderResult<()> {
        if !self.supports(DialectExtensions::Regexp) {
            return Err(RenderError::unsupported("REGEXP", self.dialect()));
        }
        ctx.append("REGEXP_LIKE(");
        ctx.render(expr)?;
        ctx.append(", ");
        ctx.render(pattern)?;
        ctx.append(if case_sensitive { ", 'c')" } else { ", 'i')" });
        Ok(())
    }

    /// `SUBSTRING(e, start[, length])`
    fn substring(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        start: &Expr,
        length: Option<&Expr>,
    ) -> RenderResult<()> {
        let mut args = vec![expr.clone(), start.clone()];
        args.extend(length.cloned());
        SharedRendering::function_call(ctx, "SUBSTRING", &args)
    }

    /// `a IS [NOT] DISTINCT FROM b`
    ///
    /// `equal` selects null-safe equality (`IS NOT DISTINCT FROM`).
    fn null_safe_comparison(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Expr,
        right: &Expr,
        equal: bool,
    ) -> RenderResult<()> {
        let keyword = if equal {
            "IS NOT DISTINCT FROM"
        } else {
            "IS DISTINCT FROM"
        };
        SharedRendering::infix(ctx, left, keyword, right)
    }

    /// `LIMIT n OFFSET m`
    fn limit_offset(
        &self,
        ctx: &mut RenderContext<'_>,
        limit: Option<u64>,
        offset: Option<u64>,
        _has_order_by: bool,
    ) -> RenderResult<()> {
        if let Some(limit) = limit {
            ctx.append_clause("LIMIT").append(&format!(" {limit}"));
        }
        if let Some(offset) = offset {
            ctx.append_clause("OFFSET").append(&format!(" {offset}"));
        }
        Ok(())
    }

    /// Locking clause text
    fn lock_clause(&self, mode: LockMode) -> RenderResult<&'static str> {
        let (required, text) = SharedRendering::lock_text(mode);
        if !self.supports(required) {
            return Err(RenderError::unsupported(text, self.dialect()));
        }
        Ok(text)
    }

    /// `DISTINCT ON (a, b)`
    fn distinct_on(&self, ctx: &mut RenderContext<'_>, exprs: &[Expr]) -> RenderResult<()> {
        if !self.supports(DialectExtensions::DistinctOn) {
            return Err(RenderError::unsupported("DISTINCT ON", self.dialect()));
        }
        ctx.append("DISTINCT ON (");
        ctx.render_list(exprs, ", ", |ctx, e| ctx.render(e))?;
        ctx.append(")");
        Ok(())
    }

    /// Whether a table-less SELECT needs `FROM DUAL`
    fn requires_dual(&self) -> bool {
        self.supports(DialectExtensions::DualTable)
    }

    /// One ORDER BY item
    fn order_by_item(&self, ctx: &mut RenderContext<'_>, item: &OrderBy) -> RenderResult<()> {
        SharedRendering::order_item(ctx, item)
    }

    /// Join keyword, checked against the dialect
    fn join_keyword(&self, join_type: JoinType) -> RenderResult<&'static str> {
        if join_type == JoinType::Full && !self.supports(DialectExtensions::FullOuterJoin) {
            return Err(RenderError::unsupported("FULL JOIN", self.dialect()));
        }
        Ok(join_type.keyword())
    }

    /// `ANY (...)` / `ALL (...)`
    fn quantified(
        &self,
        ctx: &mut RenderContext<'_>,
        quantifier: Quantifier,
        source: &MembershipSource,
    ) -> RenderResult<()> {
        if !self.supports(DialectExtensions::QuantifiedComparison) {
            return Err(RenderError::unsupported(
                format!("{} comparison", quantifier.keyword()),
                self.dialect(),
            ));
        }

        ctx.append(quantifier.keyword()).append(" (");
        match source {
            MembershipSource::Query(query) => ctx.render(query.as_ref())?,
            MembershipSource::Array(values, element_type) => {
                if !self.supports(DialectExtensions::Arrays) {
                    return Err(RenderError::unsupported(
                        format!("{} over an array", quantifier.keyword()),
                        self.dialect(),
                    ));
                }
                ctx.register_parameter(
                    &ColumnType::Array(Box::new(element_type.clone())),
                    &Value::Array(values.clone()),
                )?;
            }
            MembershipSource::Table(table) => {
                ctx.append("SELECT * FROM ");
                ctx.append_identifier(table);
            }
            MembershipSource::Expression(expr) => ctx.render(expr.as_ref())?,
        }
        ctx.append(")");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::context::RenderMode;
    use unified_sql_ir::ops::col;

    #[derive(Debug)]
    struct AnsiStrategy;

    impl DialectStrategy for AnsiStrategy {
        fn dialect(&self) -> Dialect {
            Dialect::H2
        }
    }

    fn render_with<F>(f: F) -> RenderResult<String>
    where
        F: FnOnce(&AnsiStrategy, &mut RenderContext<'_>) -> RenderResult<()>,
    {
        let strategy = AnsiStrategy;
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&strategy, &config, RenderMode::Prepared);
        f(&strategy, &mut ctx)?;
        Ok(ctx.finish().sql)
    }

    #[test]
    fn test_default_quoting() {
        let strategy = AnsiStrategy;
        assert_eq!(strategy.quote_identifier("users", false), "users");
        assert_eq!(strategy.quote_identifier("users", true), "\"users\"");
        assert_eq!(strategy.quote_identifier("group", false), "\"group\"");
    }

    #[test]
    fn test_default_null_safe() {
        let a = col("t", "a", ColumnType::Integer);
        let b = col("t", "b", ColumnType::Integer);
        let sql = render_with(|s, ctx| s.null_safe_comparison(ctx, &a, &b, true)).unwrap();
        assert_eq!(sql, "t.a IS NOT DISTINCT FROM t.b");
    }

    #[test]
    fn test_default_limit_offset() {
        let sql = render_with(|s, ctx| s.limit_offset(ctx, Some(10), Some(5), false)).unwrap();
        assert_eq!(sql, " LIMIT 10 OFFSET 5");
    }

    #[test]
    fn test_default_group_concat_without_order() {
        let name = col("t", "name", ColumnType::Text);
        let sql = render_with(|s, ctx| s.group_concat(ctx, &name, None, false, &[])).unwrap();
        assert_eq!(sql, "LISTAGG(t.name, ',')");
    }

    #[test]
    fn test_quantified_table_source() {
        let sql = render_with(|s, ctx| {
            s.quantified(ctx, Quantifier::All, &MembershipSource::Table("ids".into()))
        })
        .unwrap();
        assert_eq!(sql, "ALL (SELECT * FROM ids)");
    }
}
