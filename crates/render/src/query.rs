// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SELECT statement and FROM source rendering
//!
//! Clauses are written in a fixed order:
//!
//! ```text
//! [/*front*/] SELECT [/*after select*/] [DISTINCT | DISTINCT ON (..)] projection
//! [FROM source] [WHERE ..] [GROUP BY ..] [HAVING ..] [ORDER BY ..]
//! [LIMIT / OFFSET ..] [lock] [/*back*/]
//! ```
//!
//! A count-only statement projects `COUNT(*)` and drops `DISTINCT`,
//! `GROUP BY`, `HAVING`, `ORDER BY` and paging, which cannot change the
//! number of matching rows.

use tracing::trace;
use unified_sql_ir::{CommentPosition, Distinct, JoinGraph, JoinType, SelectStatement, Source, Table};

use crate::Render;
use crate::context::RenderContext;
use crate::dialect::SharedRendering;
use crate::error::{RenderError, RenderResult};

impl Render for SelectStatement {
    fn render(&self, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
        ctx.enter_nested()?;
        let result = render_select(self, ctx);
        ctx.exit_nested();
        result
    }
}

impl Render for Source {
    fn render(&self, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
        match self {
            Source::Table(table) => {
                render_table(table, ctx);
                Ok(())
            }
            Source::Join(graph) => render_join_graph(graph, ctx),
            Source::Subquery { query, alias } => {
                ctx.append("(");
                ctx.render(query.as_ref())?;
                ctx.append(") ");
                ctx.append_identifier(alias);
                Ok(())
            }
            Source::Dual => {
                if !ctx.strategy().requires_dual() {
                    return Err(RenderError::unsupported("DUAL source", ctx.dialect()));
                }
                ctx.append("DUAL");
                Ok(())
            }
        }
    }
}

/// Start a clause and note it in the trace log
fn clause(ctx: &mut RenderContext<'_>, keyword: &str) {
    trace!(clause = keyword, "emitting clause");
    ctx.append_clause(keyword);
}

fn render_comment(ctx: &mut RenderContext<'_>, text: &str) {
    ctx.append("/*").append(text).append("*/");
}

fn render_select(statement: &SelectStatement, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
    statement.validate()?;
    let strategy = ctx.strategy();
    let count_only = statement.is_count_only();

    if let Some(text) = statement.comment(CommentPosition::Front) {
        render_comment(ctx, text);
        ctx.append(" ");
    }
    ctx.append("SELECT");
    if let Some(text) = statement.comment(CommentPosition::AfterSelect) {
        ctx.append(" ");
        render_comment(ctx, text);
    }

    if count_only {
        ctx.append(" COUNT(*)");
    } else {
        match statement.distinct() {
            Distinct::None => {}
            Distinct::Distinct => {
                ctx.append(" DISTINCT");
            }
            Distinct::DistinctOn(exprs) => {
                ctx.append(" ");
                strategy.distinct_on(ctx, exprs)?;
            }
        }
        ctx.append(" ");
        ctx.render_list(statement.projection(), ", ", |ctx, item| {
            ctx.render(&item.expr)?;
            if let Some(alias) = &item.alias {
                ctx.append(" AS ");
                ctx.append_identifier(alias);
            }
            Ok(())
        })?;
    }

    match statement.source() {
        Source::Dual => {
            if strategy.requires_dual() {
                clause(ctx, "FROM");
                ctx.append(" DUAL");
            }
        }
        source => {
            clause(ctx, "FROM");
            ctx.append(" ");
            ctx.render(source)?;
        }
    }

    if let Some(predicate) = statement.where_clause() {
        clause(ctx, "WHERE");
        ctx.append(" ");
        ctx.render(predicate)?;
    }

    if !count_only {
        if !statement.group_by().is_empty() {
            clause(ctx, "GROUP BY");
            ctx.append(" ");
            ctx.render_list(statement.group_by(), ", ", |ctx, e| ctx.render(e))?;
        }

        if let Some(predicate) = statement.having() {
            clause(ctx, "HAVING");
            ctx.append(" ");
            ctx.render(predicate)?;
        }

        if !statement.order_by().is_empty() {
            clause(ctx, "ORDER BY");
            ctx.append(" ");
            ctx.render_list(statement.order_by(), ", ", |ctx, item| {
                strategy.order_by_item(ctx, item)
            })?;
        }

        strategy.limit_offset(
            ctx,
            statement.limit(),
            statement.offset(),
            !statement.order_by().is_empty(),
        )?;
    }

    if let Some(mode) = statement.lock() {
        let text = strategy.lock_clause(mode)?;
        clause(ctx, text);
    }

    if let Some(text) = statement.comment(CommentPosition::Back) {
        ctx.append(" ");
        render_comment(ctx, text);
    }

    Ok(())
}

/// `[schema.]name[ alias]`
fn render_table(table: &Table, ctx: &mut RenderContext<'_>) {
    if let Some(schema) = &table.schema {
        ctx.append_identifier(schema).append(".");
    }
    ctx.append_identifier(&table.name);
    if let Some(alias) = &table.alias {
        ctx.append(" ");
        ctx.append_identifier(alias);
    }
}

fn render_join_graph(graph: &JoinGraph, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
    let strategy = ctx.strategy();

    ctx.render(graph.root.as_ref())?;
    for part in &graph.parts {
        part.validate()?;
        let keyword = strategy.join_keyword(part.join_type)?;
        ctx.append(" ").append(keyword).append(" ");

        if let Source::Join(_) = part.source {
            ctx.append("(");
            ctx.render(&part.source)?;
            ctx.append(")");
        } else {
            ctx.render(&part.source)?;
        }

        if part.join_type == JoinType::Cross {
            continue;
        }

        ctx.append(" ON ");
        ctx.render_list(&part.conditions, " AND ", |ctx, (left, right)| {
            SharedRendering::infix(ctx, left, "=", right)
        })?;
        if let Some(additional) = &part.additional {
            if part.conditions.is_empty() {
                ctx.render(additional)?;
            } else {
                ctx.append(" AND ");
                ctx.render_operand(additional)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::context::RenderMode;
    use crate::dialect::{OracleStrategy, PostgreSQLStrategy, SQLServerStrategy};
    use unified_sql_ir::ops::{col, count_all, eq, greater};
    use unified_sql_ir::{ColumnType, Dialect, QueryError, SelectBuilder, SortOrder};

    fn render_with(strategy: &dyn crate::dialect::DialectStrategy, statement: &SelectStatement) -> RenderResult<String> {
        let config = RenderConfig::default();
        let mut ctx = RenderContext::new(strategy, &config, RenderMode::Prepared);
        ctx.render(statement)?;
        Ok(ctx.finish().sql)
    }

    fn id() -> unified_sql_ir::Expr {
        col("t", "id", ColumnType::Integer)
    }

    #[test]
    fn test_clause_order() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder
            .select(vec![id()])
            .unwrap()
            .and_where(greater(id(), 1))
            .group_by(vec![id()])
            .order_by(id(), SortOrder::Desc)
            .limit(10)
            .offset(5);
        builder.having(greater(count_all(), 1)).unwrap();
        builder.comment("audit", CommentPosition::Front).unwrap();

        let sql = render_with(&PostgreSQLStrategy::new(Dialect::PostgreSQL), &builder.build().unwrap()).unwrap();
        assert_eq!(
            sql,
            "/*audit*/ SELECT t.id FROM t WHERE t.id > ? GROUP BY t.id HAVING COUNT(*) > ? \
             ORDER BY t.id DESC LIMIT 10 OFFSET 5"
        );
    }

    #[test]
    fn test_count_only_drops_ordering_and_paging() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder
            .select(vec![id()])
            .unwrap()
            .order_by(id(), SortOrder::Asc)
            .limit(10)
            .count_only(true);
        builder.distinct().unwrap();

        let sql = render_with(&PostgreSQLStrategy::new(Dialect::PostgreSQL), &builder.build().unwrap()).unwrap();
        assert_eq!(sql, "SELECT COUNT(*) FROM t");
    }

    #[test]
    fn test_dual_source() {
        let mut builder = SelectBuilder::new(Source::Dual);
        builder.select(vec![count_all()]).unwrap();
        let statement = builder.build().unwrap();

        assert_eq!(render_with(&OracleStrategy::new(), &statement).unwrap(), "SELECT COUNT(*) FROM DUAL");
        assert_eq!(
            render_with(&PostgreSQLStrategy::new(Dialect::PostgreSQL), &statement).unwrap(),
            "SELECT COUNT(*)"
        );
    }

    #[test]
    fn test_sqlserver_paging_without_order_by_fails() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.select(vec![id()]).unwrap().limit(1);
        let err = render_with(&SQLServerStrategy::new(), &builder.build().unwrap()).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedByDialect { .. }));
    }

    #[test]
    fn test_join_without_condition_is_rejected() {
        let source = Source::Join(JoinGraph {
            root: Box::new(Source::from(Table::new("a"))),
            parts: vec![unified_sql_ir::JoinPart {
                join_type: JoinType::Inner,
                source: Source::from(Table::new("b")),
                conditions: Vec::new(),
                additional: None,
            }],
        });
        let mut builder = SelectBuilder::new(source);
        builder.select(vec![col("a", "id", ColumnType::Integer)]).unwrap();

        let err = render_with(&PostgreSQLStrategy::new(Dialect::PostgreSQL), &builder.build().unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Build(QueryError::MissingJoinCondition { .. })
        ));
    }

    #[test]
    fn test_deserialized_statement_is_validated() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.select(vec![id()]).unwrap();
        let mut json = serde_json::to_value(builder.build().unwrap()).unwrap();
        json["projection"] = serde_json::json!([]);
        let statement: SelectStatement = serde_json::from_value(json).unwrap();

        let err = render_with(&PostgreSQLStrategy::new(Dialect::PostgreSQL), &statement).unwrap_err();
        assert_eq!(err, RenderError::Build(QueryError::EmptyProjection));
    }

    #[test]
    fn test_aliases_and_subquery_source() {
        let mut inner = SelectBuilder::new(Table::new("t"));
        inner
            .select(vec![id()])
            .unwrap()
            .and_where(eq(id(), 3));
        let source = Source::subquery(inner.build().unwrap(), "sub");

        let mut outer = SelectBuilder::new(source);
        outer.add_select(unified_sql_ir::SelectItem::aliased(col("sub", "id", ColumnType::Integer), "user"));
        let sql = render_with(&PostgreSQLStrategy::new(Dialect::PostgreSQL), &outer.build().unwrap()).unwrap();
        assert_eq!(sql, "SELECT sub.id AS \"user\" FROM (SELECT t.id FROM t WHERE t.id = ?) sub");
    }
}
