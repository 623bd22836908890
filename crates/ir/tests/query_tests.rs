// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Tests for SELECT assembly and join graphs

use unified_sql_ir::ops::{count_all, eq, greater};
use unified_sql_ir::{
    ColumnType, CommentPosition, Distinct, JoinType, LockMode, QueryError, SelectBuilder,
    SelectItem, Source,
};
use unified_sql_test_utils::ShopSchema;

#[test]
fn test_builder_snapshot_and_clauses() {
    let users = ShopSchema::users();
    let id = ShopSchema::column(&users, "id");

    let mut builder = SelectBuilder::new(users.clone());
    builder
        .select(vec![id.clone()])
        .unwrap()
        .and_where(greater(id.clone(), 1))
        .limit(10)
        .offset(5)
        .lock(LockMode::ForUpdate);
    let statement = builder.build().unwrap();

    assert_eq!(statement.projection().len(), 1);
    assert_eq!(statement.limit(), Some(10));
    assert_eq!(statement.offset(), Some(5));
    assert_eq!(statement.lock(), Some(LockMode::ForUpdate));
    assert_eq!(statement.result_type(), ColumnType::Integer);
    assert_eq!(statement.source().tables(), vec![&users]);
}

#[test]
fn test_to_builder_round_trip() {
    let users = ShopSchema::users();
    let mut builder = SelectBuilder::new(users.clone());
    builder
        .select(vec![SelectItem::aliased(ShopSchema::column(&users, "name"), "n")])
        .unwrap()
        .distinct()
        .unwrap();
    let statement = builder.build().unwrap();

    let mut copy = statement.to_builder();
    assert_eq!(copy.build().unwrap(), statement);

    copy.no_distinct().no_lock();
    let changed = copy.build().unwrap();
    assert_eq!(changed.distinct(), &Distinct::None);
    assert_eq!(statement.distinct(), &Distinct::Distinct);
}

#[test]
fn test_count_only_needs_no_projection() {
    let mut builder = SelectBuilder::new(ShopSchema::orders());
    assert_eq!(builder.build().unwrap_err(), QueryError::EmptyProjection);

    builder.count_only(true);
    let statement = builder.build().unwrap();
    assert!(statement.is_count_only());
    assert_eq!(statement.result_type(), ColumnType::Long);
}

#[test]
fn test_comments() {
    let mut builder = SelectBuilder::new(Source::Dual);
    builder.select(vec![count_all()]).unwrap();
    builder.comment("hint", CommentPosition::AfterSelect).unwrap();
    assert!(matches!(
        builder.comment("again", CommentPosition::AfterSelect),
        Err(QueryError::CommentAlreadySet { .. })
    ));
    builder
        .replace_comment("other", CommentPosition::AfterSelect)
        .unwrap();
    assert!(matches!(
        builder.comment("a */ b", CommentPosition::Back),
        Err(QueryError::InvalidComment { .. })
    ));

    let statement = builder.build().unwrap();
    assert_eq!(statement.comment(CommentPosition::AfterSelect), Some("other"));
    assert_eq!(statement.comment(CommentPosition::Back), None);
}

#[test]
fn test_inferred_join_chain() {
    let users = ShopSchema::users();
    let orders = ShopSchema::orders();
    let products = ShopSchema::products();

    let source = Source::from(users.clone())
        .inner_join(orders.clone())
        .unwrap()
        .left_join(products.clone())
        .unwrap();
    let Source::Join(graph) = &source else {
        panic!("expected join graph");
    };

    assert_eq!(graph.parts.len(), 2);
    assert_eq!(graph.parts[1].join_type, JoinType::Left);
    assert_eq!(
        graph.parts[1].conditions,
        vec![(
            ShopSchema::column(&orders, "product_id"),
            ShopSchema::column(&products, "id")
        )]
    );
    assert_eq!(source.describe(), "users, orders, products");
}

#[test]
fn test_explicit_condition_overrides_inference() {
    let users = ShopSchema::users();
    let products = ShopSchema::products();
    let on = (
        ShopSchema::column(&users, "name"),
        ShopSchema::column(&products, "name"),
    );

    let source = Source::from(users)
        .join(products, JoinType::Inner, Some(on.clone()), None)
        .unwrap();
    let Source::Join(graph) = source else {
        panic!("expected join graph");
    };
    assert_eq!(graph.parts[0].conditions, vec![on]);
}

#[test]
fn test_subquery_side_needs_explicit_condition() {
    let orders = ShopSchema::orders();
    let mut inner = SelectBuilder::new(orders.clone());
    inner
        .select(vec![ShopSchema::column(&orders, "user_id")])
        .unwrap();
    let derived = Source::subquery(inner.build().unwrap(), "o");

    let err = Source::from(ShopSchema::users())
        .inner_join(derived.clone())
        .unwrap_err();
    assert!(matches!(err, QueryError::MissingJoinCondition { .. }));
    assert!(err.is_join_error());

    let users = ShopSchema::users();
    let joined = Source::from(users.clone()).join(
        derived,
        JoinType::Inner,
        None,
        Some(eq(
            ShopSchema::column(&users, "id"),
            unified_sql_ir::ops::col("o", "user_id", ColumnType::Integer),
        )),
    );
    assert!(joined.is_ok());
}
