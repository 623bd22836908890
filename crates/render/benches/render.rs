// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use unified_sql_ir::ops::{and, eq, greater, in_list, like};
use unified_sql_ir::{ColumnDef, ColumnType, Dialect, ForeignKey, SelectBuilder, SelectStatement, SortOrder, Source, Table};
use unified_sql_render::{DatabaseContext, RenderMode, render_query};

fn users() -> Table {
    Table::new("users")
        .with_column(ColumnDef::new("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDef::new("name", ColumnType::Varchar(50)))
}

fn orders() -> Table {
    Table::new("orders")
        .with_column(ColumnDef::new("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDef::new("user_id", ColumnType::Integer))
        .with_foreign_key(ForeignKey::single("user_id", "users", "id"))
}

fn join_query() -> SelectStatement {
    let users = users();
    let orders = orders();
    let source = Source::from(users.clone()).inner_join(orders.clone()).unwrap();

    let mut builder = SelectBuilder::new(source);
    builder
        .select(vec![users.column("name").unwrap(), orders.column("id").unwrap()])
        .unwrap()
        .and_where(and(
            like(users.column("name").unwrap(), "A%"),
            greater(orders.column("id").unwrap(), 100),
        ))
        .and_where(in_list(users.column("id").unwrap(), 1..=50))
        .order_by(orders.column("id").unwrap(), SortOrder::Desc)
        .limit(25)
        .offset(50);
    builder.build().unwrap()
}

fn wide_predicate(n: i32) -> SelectStatement {
    let users = users();
    let id = users.column("id").unwrap();
    let mut builder = SelectBuilder::new(users);
    builder.select(vec![id.clone()]).unwrap();
    for v in 0..n {
        builder.or_where(eq(id.clone(), v));
    }
    builder.build().unwrap()
}

fn benchmark_dialects(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_join_query");
    let statement = join_query();

    for dialect in [Dialect::MySQL, Dialect::PostgreSQL, Dialect::Oracle, Dialect::SQLServer] {
        let db = DatabaseContext::for_dialect(dialect);
        group.bench_with_input(BenchmarkId::from_parameter(dialect), &statement, |b, statement| {
            b.iter(|| db.render(black_box(statement)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_predicate_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_wide_predicate");
    let db = DatabaseContext::for_dialect(Dialect::PostgreSQL);

    for n in [10, 100, 1000] {
        let statement = wide_predicate(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &statement, |b, statement| {
            b.iter(|| render_query(black_box(statement), &db, RenderMode::Prepared).unwrap())
        });
    }

    group.finish();
}

fn benchmark_literal_mode(c: &mut Criterion) {
    let statement = join_query();
    let db = DatabaseContext::for_dialect(Dialect::MySQL);
    c.bench_function("render_literal_mode", |b| {
        b.iter(|| render_query(black_box(&statement), &db, RenderMode::Literal).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_dialects,
    benchmark_predicate_width,
    benchmark_literal_mode
);
criterion_main!(benches);
