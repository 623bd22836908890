// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: a shop schema and dialect lists

use unified_sql_ir::{ColumnDef, ColumnType, Dialect, Expr, ForeignKey, Table};

/// Tables of a small shop database
///
/// ```text
/// users(id PK, name, email NULL, created_at)
/// orders(id PK, user_id -> users.id, product_id -> products.id, total, status)
/// products(id PK, name, price, tags NULL)
/// order_lines(order_id PK -> orders.id, line_no PK, quantity)
/// ```
pub struct ShopSchema;

impl ShopSchema {
    pub fn users() -> Table {
        Table::new("users")
            .with_column(ColumnDef::new("id", ColumnType::Integer).primary_key())
            .with_column(ColumnDef::new("name", ColumnType::Varchar(50)))
            .with_column(ColumnDef::new("email", ColumnType::Varchar(120)).nullable())
            .with_column(ColumnDef::new("created_at", ColumnType::DateTime))
    }

    pub fn orders() -> Table {
        Table::new("orders")
            .with_column(ColumnDef::new("id", ColumnType::Integer).primary_key())
            .with_column(ColumnDef::new("user_id", ColumnType::Integer))
            .with_column(ColumnDef::new("product_id", ColumnType::Integer))
            .with_column(ColumnDef::new(
                "total",
                ColumnType::Decimal {
                    precision: 10,
                    scale: 2,
                },
            ))
            .with_column(ColumnDef::new("status", ColumnType::Varchar(20)))
            .with_foreign_key(ForeignKey::single("user_id", "users", "id"))
            .with_foreign_key(ForeignKey::single("product_id", "products", "id"))
    }

    pub fn products() -> Table {
        Table::new("products")
            .with_column(ColumnDef::new("id", ColumnType::Integer).primary_key())
            .with_column(ColumnDef::new("name", ColumnType::Varchar(80)))
            .with_column(ColumnDef::new("price", ColumnType::Double))
            .with_column(
                ColumnDef::new("tags", ColumnType::Array(Box::new(ColumnType::Text))).nullable(),
            )
    }

    /// Table with a composite primary key
    pub fn order_lines() -> Table {
        Table::new("order_lines")
            .with_column(ColumnDef::new("order_id", ColumnType::Integer).primary_key())
            .with_column(ColumnDef::new("line_no", ColumnType::Short).primary_key())
            .with_column(ColumnDef::new("quantity", ColumnType::Integer))
            .with_foreign_key(ForeignKey::single("order_id", "orders", "id"))
    }

    /// Column of a fixture table
    ///
    /// # Panics
    ///
    /// Panics if the column is not declared on the table.
    pub fn column(table: &Table, name: &str) -> Expr {
        table
            .column(name)
            .unwrap_or_else(|e| panic!("fixture column lookup failed: {e}"))
    }
}

/// Every dialect, for matrix tests
pub fn all_dialects() -> Vec<Dialect> {
    Dialect::ALL.to_vec()
}

/// Dialects that spell `LIMIT n OFFSET m` natively
pub fn limit_offset_dialects() -> Vec<Dialect> {
    Dialect::ALL
        .into_iter()
        .filter(|d| d.supports(unified_sql_ir::DialectExtensions::LimitOffset))
        .collect()
}
