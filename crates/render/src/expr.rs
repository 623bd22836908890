// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Expression rendering
//!
//! Portable node shapes are written here. Anything a vendor spells
//! differently is forwarded to the active [`DialectStrategy`].
//!
//! [`DialectStrategy`]: crate::dialect::DialectStrategy

use unified_sql_ir::{ComparisonOp, Expr, LogicalOp};

use crate::Render;
use crate::context::RenderContext;
use crate::dialect::SharedRendering;
use crate::error::RenderResult;

impl Render for Expr {
    fn render(&self, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
        ctx.enter_nested()?;
        let result = render_node(self, ctx);
        ctx.exit_nested();
        result
    }
}

fn render_node(expr: &Expr, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
    let strategy = ctx.strategy();

    match expr {
        Expr::Column(column) => {
            if let Some(table) = &column.table {
                ctx.append_identifier(table).append(".");
            }
            ctx.append_identifier(&column.column);
            Ok(())
        }

        Expr::Literal(value) => ctx.register_literal(&value.column_type, &value.value),

        Expr::Parameter(value) => ctx.register_parameter(&value.column_type, &value.value),

        Expr::Comparison { left, op, right } => match op.symbol() {
            Some(symbol) => SharedRendering::infix(ctx, left, symbol, right),
            None => strategy.null_safe_comparison(
                ctx,
                left,
                right,
                *op == ComparisonOp::IsNotDistinctFrom,
            ),
        },

        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => {
            ctx.render_operand(expr)?;
            ctx.append(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
            ctx.render_operand(low)?;
            ctx.append(" AND ");
            ctx.render_operand(high)
        }

        Expr::IsNull { expr, negated } => {
            ctx.render_operand(expr)?;
            ctx.append(if *negated { " IS NOT NULL" } else { " IS NULL" });
            Ok(())
        }

        Expr::Compound { op, operands } => {
            let separator = match op {
                LogicalOp::And => " AND ",
                LogicalOp::Or => " OR ",
            };
            ctx.render_list(operands, separator, |ctx, operand| ctx.render_operand(operand))
        }

        Expr::Not(inner) => {
            ctx.append("NOT ");
            ctx.render_operand(inner)
        }

        Expr::Arithmetic { left, op, right } => SharedRendering::infix(ctx, left, op.symbol(), right),

        Expr::Bitwise { left, op, right } => strategy.bitwise(ctx, left, *op, right),

        Expr::Function { name, args, .. } => SharedRendering::function_call(ctx, name, args),

        Expr::Aggregate {
            function,
            arg,
            distinct,
        } => {
            ctx.append(function.name()).append("(");
            if *distinct {
                ctx.append("DISTINCT ");
            }
            ctx.render(arg.as_ref())?;
            ctx.append(")");
            Ok(())
        }

        Expr::CountAll => {
            ctx.append("COUNT(*)");
            Ok(())
        }

        Expr::CustomOperator {
            symbol,
            left,
            right,
            ..
        } => SharedRendering::infix(ctx, left, symbol, right),

        Expr::Concat { separator, args } => strategy.concat(ctx, separator.as_deref(), args),

        Expr::Locate { haystack, needle } => strategy.locate(ctx, haystack, needle),

        Expr::GroupConcat {
            expr,
            separator,
            distinct,
            order_by,
        } => strategy.group_concat(ctx, expr, separator.as_deref(), *distinct, order_by),

        Expr::Random { seed } => strategy.random(ctx, *seed),

        Expr::Cast { expr, target } => strategy.cast(ctx, expr, target),

        Expr::Regexp {
            expr,
            pattern,
            case_sensitive,
        } => strategy.regexp(ctx, expr, pattern, *case_sensitive),

        Expr::Substring {
            expr,
            start,
            length,
        } => strategy.substring(ctx, expr, start, length.as_deref()),

        Expr::Case {
            value,
            branches,
            default,
        } => {
            ctx.append("CASE");
            if let Some(value) = value {
                ctx.append(" ");
                ctx.render_operand(value)?;
            }
            for (condition, result) in branches {
                ctx.append(" WHEN ");
                ctx.render(condition)?;
                ctx.append(" THEN ");
                ctx.render(result)?;
            }
            if let Some(default) = default {
                ctx.append(" ELSE ");
                ctx.render(default.as_ref())?;
            }
            ctx.append(" END");
            Ok(())
        }

        Expr::Exists { query, negated } => {
            ctx.append(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
            ctx.render(query.as_ref())?;
            ctx.append(")");
            Ok(())
        }

        Expr::InList {
            expr,
            list,
            negated,
        } => match list.as_slice() {
            [] => {
                ctx.append(if *negated {
                    strategy.always_true()
                } else {
                    strategy.always_false()
                });
                Ok(())
            }
            [single] => {
                SharedRendering::infix(ctx, expr, if *negated { "<>" } else { "=" }, single)
            }
            items => {
                ctx.render_operand(expr)?;
                ctx.append(if *negated { " NOT IN (" } else { " IN (" });
                ctx.render_list(items, ", ", |ctx, item| ctx.render(item))?;
                ctx.append(")");
                Ok(())
            }
        },

        Expr::InSubquery {
            expr,
            query,
            negated,
        } => {
            ctx.render_operand(expr)?;
            ctx.append(if *negated { " NOT IN (" } else { " IN (" });
            ctx.render(query.as_ref())?;
            ctx.append(")");
            Ok(())
        }

        Expr::Subquery(query) => {
            ctx.append("(");
            ctx.render(query.as_ref())?;
            ctx.append(")");
            Ok(())
        }

        Expr::Quantified { quantifier, source } => strategy.quantified(ctx, *quantifier, source),

        Expr::Wildcard => {
            ctx.append("*");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::context::{RenderMode, RenderedSql};
    use crate::dialect::{OracleStrategy, PostgreSQLStrategy};
    use crate::error::RenderError;
    use unified_sql_ir::ops::*;
    use unified_sql_ir::{ColumnType, Dialect, Value};

    fn render_pg(expr: &Expr, mode: RenderMode) -> RenderedSql {
        let strategy = PostgreSQLStrategy::new(Dialect::PostgreSQL);
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&strategy, &config, mode);
        ctx.render(expr).unwrap();
        ctx.finish()
    }

    fn id() -> Expr {
        col("t", "id", ColumnType::Integer)
    }

    fn name() -> Expr {
        col("t", "name", ColumnType::Text)
    }

    #[test]
    fn test_comparison_binds_column_type() {
        let rendered = render_pg(&eq(id(), 5i64), RenderMode::Prepared);
        assert_eq!(rendered.sql, "t.id = ?");
        assert_eq!(rendered.parameters[0].column_type, ColumnType::Integer);
        assert_eq!(rendered.parameters[0].value, Value::Int(5));
    }

    #[test]
    fn test_nested_operands_parenthesized() {
        let expr = eq(plus(id(), 1), times(id(), 2));
        assert_eq!(render_pg(&expr, RenderMode::Prepared).sql, "(t.id + ?) = (t.id * ?)");

        let expr = not(and(eq(id(), 1), eq(name(), "a")));
        assert_eq!(
            render_pg(&expr, RenderMode::Prepared).sql,
            "NOT ((t.id = ?) AND (t.name = ?))"
        );
    }

    #[test]
    fn test_in_list_shapes() {
        let empty: Vec<Expr> = Vec::new();
        assert_eq!(render_pg(&in_list(id(), empty.clone()), RenderMode::Prepared).sql, "FALSE");
        assert_eq!(render_pg(&not_in_list(id(), empty), RenderMode::Prepared).sql, "TRUE");
        assert_eq!(render_pg(&in_list(id(), vec![1]), RenderMode::Prepared).sql, "t.id = ?");
        assert_eq!(
            render_pg(&not_in_list(id(), vec![1, 2, 3]), RenderMode::Literal).sql,
            "t.id NOT IN (1, 2, 3)"
        );
    }

    #[test]
    fn test_case_expression() {
        let expr = case()
            .when(greater(id(), 10), "big")
            .otherwise("small")
            .unwrap();
        assert_eq!(
            render_pg(&expr, RenderMode::Literal).sql,
            "CASE WHEN t.id > 10 THEN 'big' ELSE 'small' END"
        );
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(render_pg(&count_distinct(name()), RenderMode::Prepared).sql, "COUNT(DISTINCT t.name)");
        assert_eq!(render_pg(&count_all(), RenderMode::Prepared).sql, "COUNT(*)");
        assert_eq!(render_pg(&upper(name()), RenderMode::Prepared).sql, "UPPER(t.name)");
    }

    #[test]
    fn test_oracle_has_no_boolean_literals() {
        let strategy = OracleStrategy::new();
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(&strategy, &config, RenderMode::Prepared);
        let empty: Vec<Expr> = Vec::new();
        ctx.render(&in_list(id(), empty)).unwrap();
        assert_eq!(ctx.finish().sql, "1 = 0");
    }

    #[test]
    fn test_nesting_limit_applies_to_expressions() {
        let strategy = PostgreSQLStrategy::new(Dialect::PostgreSQL);
        let config = RenderConfig::default().with_max_nesting_depth(3);
        let mut ctx = RenderContext::new(&strategy, &config, RenderMode::Prepared);
        let deep = not(not(not(eq(id(), 1))));
        assert!(matches!(
            ctx.render(&deep),
            Err(RenderError::NestingTooDeep { limit: 3, .. })
        ));
    }
}
