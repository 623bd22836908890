// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Shared rendering logic for all SQL dialects
//!
//! This module provides fragments that several vendors spell the same way,
//! so the vendor strategies only keep what is actually different.

use unified_sql_ir::{ColumnType, DialectExtensions, Expr, LockMode, OrderBy, Value};

use crate::context::RenderContext;
use crate::error::RenderResult;

/// Words that must be quoted when used as identifiers on any dialect
///
/// Sorted, upper case.
const RESERVED_KEYWORDS: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP",
    "ELSE", "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL",
    "GRANT", "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY",
    "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY",
    "REFERENCES", "RIGHT", "ROWS", "SELECT", "SET", "SOME", "TABLE", "THEN", "TO", "TRUE",
    "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Shared rendering utilities for all dialects
pub struct SharedRendering;

impl SharedRendering {
    /// Standard locking clause and the capability it needs
    pub fn lock_text(mode: LockMode) -> (DialectExtensions, &'static str) {
        match mode {
            LockMode::ForUpdate => (DialectExtensions::ForUpdate, "FOR UPDATE"),
            LockMode::ForUpdateNoWait => (DialectExtensions::NoWait, "FOR UPDATE NOWAIT"),
            LockMode::ForUpdateSkipLocked => {
                (DialectExtensions::SkipLocked, "FOR UPDATE SKIP LOCKED")
            }
            LockMode::ForShare => (DialectExtensions::ForShare, "FOR SHARE"),
        }
    }

    /// Whether an identifier must be quoted to be read back verbatim
    pub fn needs_quoting(name: &str) -> bool {
        let mut chars = name.chars();
        let starts_well = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !starts_well || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return true;
        }
        Self::is_reserved(name)
    }

    pub fn is_reserved(name: &str) -> bool {
        let upper = name.to_ascii_uppercase();
        RESERVED_KEYWORDS.binary_search(&upper.as_str()).is_ok()
    }

    /// Wrap `name` in quote characters, doubling embedded closing quotes
    pub fn quote_with(name: &str, open: char, close: char) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        out.push(open);
        for c in name.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
        out
    }

    /// `NAME(arg, arg, ...)`
    pub fn function_call(ctx: &mut RenderContext<'_>, name: &str, args: &[Expr]) -> RenderResult<()> {
        ctx.append(name).append("(");
        ctx.render_list(args, ", ", |ctx, arg| ctx.render(arg))?;
        ctx.append(")");
        Ok(())
    }

    /// `left symbol right`, operands parenthesized as needed
    pub fn infix(
        ctx: &mut RenderContext<'_>,
        left: &Expr,
        symbol: &str,
        right: &Expr,
    ) -> RenderResult<()> {
        ctx.render_operand(left)?;
        ctx.append(" ").append(symbol).append(" ");
        ctx.render_operand(right)
    }

    /// A string constant, always inlined
    pub fn string_literal(ctx: &mut RenderContext<'_>, text: &str) -> RenderResult<()> {
        ctx.register_literal(&ColumnType::Text, &Value::Text(text.to_string()))
    }

    /// `OFFSET m ROWS [FETCH NEXT n ROWS ONLY]`
    pub fn offset_fetch(ctx: &mut RenderContext<'_>, limit: Option<u64>, offset: Option<u64>) {
        if limit.is_none() && offset.is_none() {
            return;
        }
        ctx.append_clause("OFFSET")
            .append(&format!(" {} ROWS", offset.unwrap_or(0)));
        if let Some(limit) = limit {
            ctx.append(&format!(" FETCH NEXT {limit} ROWS ONLY"));
        }
    }

    /// `e ASC|DESC [NULLS FIRST|LAST]`
    pub fn order_item(ctx: &mut RenderContext<'_>, item: &OrderBy) -> RenderResult<()> {
        ctx.render(&item.expr)?;
        ctx.append(Self::direction(item));
        match item.order.nulls_first() {
            Some(true) => {
                ctx.append(" NULLS FIRST");
            }
            Some(false) => {
                ctx.append(" NULLS LAST");
            }
            None => {}
        }
        Ok(())
    }

    /// NULL placement through a leading sort key, for dialects without
    /// `NULLS FIRST` / `NULLS LAST`
    ///
    /// `CASE WHEN e IS NULL THEN 0 ELSE 1 END, e ASC`
    pub fn emulated_nulls_order(ctx: &mut RenderContext<'_>, item: &OrderBy) -> RenderResult<()> {
        let Some(nulls_first) = item.order.nulls_first() else {
            ctx.render(&item.expr)?;
            ctx.append(Self::direction(item));
            return Ok(());
        };

        let (null_rank, value_rank) = if nulls_first { ("0", "1") } else { ("1", "0") };
        ctx.append("CASE WHEN ");
        ctx.render_operand(&item.expr)?;
        ctx.append(" IS NULL THEN ")
            .append(null_rank)
            .append(" ELSE ")
            .append(value_rank)
            .append(" END, ");
        ctx.render(&item.expr)?;
        ctx.append(Self::direction(item));
        Ok(())
    }

    fn direction(item: &OrderBy) -> &'static str {
        if item.order.is_descending() {
            " DESC"
        } else {
            " ASC"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_keywords_sorted() {
        let mut sorted = RESERVED_KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_KEYWORDS);
    }

    #[test]
    fn test_needs_quoting() {
        assert!(!SharedRendering::needs_quoting("users"));
        assert!(!SharedRendering::needs_quoting("_tmp1"));
        assert!(SharedRendering::needs_quoting("order"));
        assert!(SharedRendering::needs_quoting("Select"));
        assert!(SharedRendering::needs_quoting("first name"));
        assert!(SharedRendering::needs_quoting("1st"));
        assert!(SharedRendering::needs_quoting(""));
    }

    #[test]
    fn test_quote_with_doubles_closing_quote() {
        assert_eq!(SharedRendering::quote_with("a\"b", '"', '"'), "\"a\"\"b\"");
        assert_eq!(SharedRendering::quote_with("a]b", '[', ']'), "[a]]b]");
        assert_eq!(SharedRendering::quote_with("a`b", '`', '`'), "`a``b`");
    }
}
