// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Concurrent renders of shared statements

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use unified_sql_ir::ops::{and, eq, greater};
use unified_sql_ir::{Dialect, SelectBuilder, SelectStatement, SortOrder};
use unified_sql_render::{DatabaseContext, RenderedSql};
use unified_sql_test_utils::{ShopSchema, SqlAssertions};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn statement() -> SelectStatement {
    let users = ShopSchema::users();
    let id = ShopSchema::column(&users, "id");
    let name = ShopSchema::column(&users, "name");

    let mut builder = SelectBuilder::new(users);
    builder
        .select(vec![id.clone(), name.clone()])
        .unwrap()
        .and_where(and(greater(id.clone(), 10), eq(name, "Zoe")))
        .order_by(id, SortOrder::Asc)
        .limit(20);
    builder.build().unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renders_keep_their_dialect() {
    init_tracing();

    let statement = Arc::new(statement());
    let expected: Vec<RenderedSql> = Dialect::ALL
        .iter()
        .map(|d| DatabaseContext::for_dialect(*d).render(&statement).unwrap())
        .collect();

    let mut handles = Vec::new();
    for round in 0..8 {
        for (i, dialect) in Dialect::ALL.into_iter().enumerate() {
            let statement = Arc::clone(&statement);
            handles.push(tokio::task::spawn_blocking(move || {
                let db = DatabaseContext::for_dialect(dialect);
                (round, i, db.render(&statement).unwrap())
            }));
        }
    }

    for handle in handles {
        let (round, i, rendered) = handle.await.unwrap();
        assert_eq!(rendered, expected[i], "round {round}");
        SqlAssertions::assert_placeholders_match(&rendered);
    }
}

#[tokio::test]
async fn test_url_resolution_from_tasks() {
    init_tracing();

    let urls = [
        ("jdbc:mysql://db/shop", Dialect::MySQL),
        ("postgres://db/shop", Dialect::PostgreSQL),
        ("jdbc:oracle:thin:@db:1521:shop", Dialect::Oracle),
    ];
    let handles: Vec<_> = urls
        .into_iter()
        .map(|(url, dialect)| {
            tokio::spawn(async move {
                let db = DatabaseContext::from_url(url).unwrap();
                assert_eq!(db.dialect(), dialect);
                db.render(&statement()).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let rendered = handle.await.unwrap();
        assert!(rendered.sql.starts_with("SELECT users.id, users.name FROM users"));
    }
}
