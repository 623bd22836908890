// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQLite rendering

use unified_sql_ir::{BitwiseOp, Dialect, Expr, OrderBy};

use crate::context::RenderContext;
use crate::dialect::{DialectStrategy, SharedRendering};
use crate::error::{RenderError, RenderResult};

/// SQLite strategy (3.39+)
#[derive(Debug, Clone, Copy, Default)]
pub struct SQLiteStrategy;

impl SQLiteStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// `(a || b || c)`, optionally with a separator between arguments
///
/// Shared with Oracle, which has no variadic `CONCAT`.
pub(crate) fn pipe_concat(
    ctx: &mut RenderContext<'_>,
    separator: Option<&str>,
    args: &[Expr],
) -> RenderResult<()> {
    if args.is_empty() {
        return SharedRendering::string_literal(ctx, "");
    }
    ctx.append("(");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            ctx.append(" || ");
            if let Some(separator) = separator {
                SharedRendering::string_literal(ctx, separator)?;
                ctx.append(" || ");
            }
        }
        ctx.render_operand(arg)?;
    }
    ctx.append(")");
    Ok(())
}

impl DialectStrategy for SQLiteStrategy {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn concat(
        &self,
        ctx: &mut RenderContext<'_>,
        separator: Option<&str>,
        args: &[Expr],
    ) -> RenderResult<()> {
        pipe_concat(ctx, separator, args)
    }

    fn locate(&self, ctx: &mut RenderContext<'_>, haystack: &Expr, needle: &Expr) -> RenderResult<()> {
        SharedRendering::function_call(ctx, "INSTR", &[haystack.clone(), needle.clone()])
    }

    fn group_concat(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        separator: Option<&str>,
        distinct: bool,
        order_by: &[OrderBy],
    ) -> RenderResult<()> {
        if !order_by.is_empty() {
            return Err(RenderError::unsupported("ordered GROUP_CONCAT", Dialect::SQLite));
        }
        if distinct && separator.is_some() {
            return Err(RenderError::unsupported(
                "GROUP_CONCAT with DISTINCT and a separator",
                Dialect::SQLite,
            ));
        }

        ctx.append("GROUP_CONCAT(");
        if distinct {
            ctx.append("DISTINCT ");
        }
        ctx.render(expr)?;
        if let Some(separator) = separator {
            ctx.append(", ");
            SharedRendering::string_literal(ctx, separator)?;
        }
        ctx.append(")");
        Ok(())
    }

    fn random(&self, ctx: &mut RenderContext<'_>, seed: Option<i64>) -> RenderResult<()> {
        if seed.is_some() {
            return Err(RenderError::unsupported("seeded RANDOM", Dialect::SQLite));
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
        match op {
            BitwiseOp::And => SharedRendering::infix(ctx, left, "&", right),
            BitwiseOp::Or => SharedRendering::infix(ctx, left, "|", right),
            // a ^ b == (a | b) - (a & b)
            BitwiseOp::Xor => {
                ctx.append("(");
                SharedRendering::infix(ctx, left, "|", right)?;
                ctx.append(") - (");
                SharedRendering::infix(ctx, left, "&", right)?;
                ctx.append(")");
                Ok(())
            }
        }
    }

    fn substring(
        &self,
        ctx: &mut RenderContext<'_>,
        expr: &Expr,
        start: &Expr,
        length: Option<&Expr>,
    ) -> RenderResult<()> {
        let mut args = vec![expr.clone(), start.clone()];
        args.extend(length.cloned());
        SharedRendering::function_call(ctx, "SUBSTR", &args)
    }

    fn null_safe_comparison(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Expr,
        right: &Expr,
        equal: bool,
    ) -> RenderResult<()> {
        SharedRendering::infix(ctx, left, if equal { "IS" } else { "IS NOT" }, right)
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
            (Some(limit), Some(offset)) => {
                ctx.append_clause("LIMIT")
                    .append(&format!(" {limit}"))
                    .append_clause("OFFSET")
                    .append(&format!(" {offset}"));
            }
            // A negative limit means no limit
            (None, Some(offset)) => {
                ctx.append_clause("LIMIT")
                    .append(" -1")
                    .append_clause("OFFSET")
                    .append(&format!(" {offset}"));
            }
        }
        Ok(())
    }
}
