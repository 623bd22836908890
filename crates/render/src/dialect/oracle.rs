// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Oracle rendering
//!
//! Oracle has no boolean literals, no `LIMIT`, and only `BITAND` among the
//! bitwise operations. Table-less selects read from `DUAL`.

use unified_sql_ir::{BitwiseOp, Dialect, Expr};

use crate::context::RenderContext;
use crate::dialect::sqlite::pipe_concat;
use crate::dialect::{DialectStrategy, SharedRendering};
use crate::error::{RenderError, RenderResult};

/// Oracle strategy (12c+)
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleStrategy;

impl OracleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl DialectStrategy for OracleStrategy {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
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

    fn random(&self, ctx: &mut RenderContext<'_>, seed: Option<i64>) -> RenderResult<()> {
        if seed.is_some() {
            return Err(RenderError::unsupported("seeded RANDOM", Dialect::Oracle));
        }
        ctx.append("DBMS_RANDOM.VALUE");
        Ok(())
    }

    fn bitwise(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Expr,
        op: BitwiseOp,
        right: &Expr,
    ) -> RenderResult<()> {
        let bitand = [left.clone(), right.clone()];
        match op {
            BitwiseOp::And => SharedRendering::function_call(ctx, "BITAND", &bitand),
            // a | b == a + b - (a & b)
            BitwiseOp::Or => {
                SharedRendering::infix(ctx, left, "+", right)?;
                ctx.append(" - ");
                SharedRendering::function_call(ctx, "BITAND", &bitand)
            }
            // a ^ b == a + b - 2 * (a & b)
            BitwiseOp::Xor => {
                SharedRendering::infix(ctx, left, "+", right)?;
                ctx.append(" - ");
                SharedRendering::function_call(ctx, "BITAND", &bitand)?;
                ctx.append(" * 2");
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
        ctx.append("DECODE(");
        ctx.render(left)?;
        ctx.append(", ");
        ctx.render(right)?;
        ctx.append(if equal { ", 1, 0) = 1" } else { ", 0, 1) = 1" });
        Ok(())
    }

    fn limit_offset(
        &self,
        ctx: &mut RenderContext<'_>,
        limit: Option<u64>,
        offset: Option<u64>,
        _has_order_by: bool,
    ) -> RenderResult<()> {
        SharedRendering::offset_fetch(ctx, limit, offset);
        Ok(())
    }
}
