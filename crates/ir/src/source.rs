// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Sources and joins
//!
//! This module models the FROM clause: tables with their column and key
//! metadata, derived tables, and join graphs built from them.
//!
//! ## Joins
//!
//! [`Source::join`] accepts the join condition in three shapes:
//!
//! - an explicit `(left, right)` column pair, optionally with an extra
//!   constraint ANDed onto it
//! - only an extra constraint, used as the whole `ON` condition
//! - nothing, in which case the condition is inferred from foreign keys
//!
//! Inference looks at every table already in the left graph and every table
//! of the right source, and must find exactly one single-column foreign key
//! linking the two sides:
//!
//! ```sql
//! -- orders.user_id references users.id
//! FROM users INNER JOIN orders ON users.id = orders.user_id
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::expr::{ColumnRef, Expr};
use crate::query::SelectStatement;
use crate::types::ColumnType;

/// Column declaration on a [`Table`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key: false,
        }
    }

    /// Builder method: mark nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Builder method: mark as (part of) the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Foreign key from columns of the owning table to columns of `target_table`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    pub from_columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
}

impl ForeignKey {
    pub fn new(
        from_columns: impl IntoIterator<Item = impl Into<String>>,
        target_table: impl Into<String>,
        target_columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            from_columns: from_columns.into_iter().map(Into::into).collect(),
            target_table: target_table.into(),
            target_columns: target_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Single-column foreign key
    pub fn single(
        from_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self::new([from_column.into()], target_table, [target_column.into()])
    }
}

/// A table with its column and key metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub schema: Option<String>,
    pub alias: Option<String>,
    pub columns: Vec<ColumnDef>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            alias: None,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_foreign_key(mut self, key: ForeignKey) -> Self {
        self.foreign_keys.push(key);
        self
    }

    /// Aliased copy of this table
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// Name columns of this table are qualified with (alias if any)
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Qualified reference to a declared column
    pub fn column_ref(&self, name: &str) -> QueryResult<ColumnRef> {
        let def = self
            .column_def(name)
            .ok_or_else(|| QueryError::UnknownColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })?;
        Ok(ColumnRef::new(&def.name, def.column_type.clone()).with_table(self.reference_name()))
    }

    /// Column expression for a declared column
    pub fn column(&self, name: &str) -> QueryResult<Expr> {
        self.column_ref(name).map(Expr::Column)
    }

    /// All declared columns, in declaration order
    pub fn all_columns(&self) -> Vec<Expr> {
        self.columns
            .iter()
            .map(|def| {
                Expr::Column(
                    ColumnRef::new(&def.name, def.column_type.clone())
                        .with_table(self.reference_name()),
                )
            })
            .collect()
    }

    pub fn primary_key(&self) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}

/// Join kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
            JoinType::Cross => "CROSS",
        }
    }
}

/// One joined source and its `ON` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPart {
    pub join_type: JoinType,
    pub source: Source,
    /// Column equalities, ANDed together
    pub conditions: Vec<(Expr, Expr)>,
    /// Extra constraint ANDed after the equalities
    pub additional: Option<Expr>,
}

impl JoinPart {
    /// Check the condition rules `Source::join` enforces
    ///
    /// Cross joins take no condition, every other join needs one.
    pub fn validate(&self) -> QueryResult<()> {
        let has_condition = !self.conditions.is_empty() || self.additional.is_some();
        match (self.join_type, has_condition) {
            (JoinType::Cross, true) => Err(QueryError::UnexpectedJoinCondition {
                right: self.source.describe(),
            }),
            (JoinType::Cross, false) | (_, true) => Ok(()),
            (join_type, false) => Err(QueryError::MissingJoinCondition {
                join_type: join_type.label().to_string(),
                right: self.source.describe(),
            }),
        }
    }
}

/// A root source followed by joins, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinGraph {
    pub root: Box<Source>,
    pub parts: Vec<JoinPart>,
}

/// Anything that can appear in a FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Source {
    Table(Table),
    Join(JoinGraph),
    /// Derived table `(SELECT ...) alias`
    Subquery {
        query: Box<SelectStatement>,
        alias: String,
    },
    /// No table; dialects that require one render `FROM DUAL`
    Dual,
}

impl From<Table> for Source {
    fn from(table: Table) -> Self {
        Source::Table(table)
    }
}

impl From<JoinGraph> for Source {
    fn from(graph: JoinGraph) -> Self {
        Source::Join(graph)
    }
}

impl Source {
    pub fn subquery(query: SelectStatement, alias: impl Into<String>) -> Self {
        Source::Subquery {
            query: Box::new(query),
            alias: alias.into(),
        }
    }

    /// Every table reachable from this source, left to right
    ///
    /// Derived tables are opaque and contribute none.
    pub fn tables(&self) -> Vec<&Table> {
        let mut out = Vec::new();
        self.collect_tables(&mut out);
        out
    }

    fn collect_tables<'a>(&'a self, out: &mut Vec<&'a Table>) {
        match self {
            Source::Table(table) => out.push(table),
            Source::Join(graph) => {
                graph.root.collect_tables(out);
                for part in &graph.parts {
                    part.source.collect_tables(out);
                }
            }
            Source::Subquery { .. } | Source::Dual => {}
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Source::Table(table) => table.reference_name().to_string(),
            Source::Join(graph) => {
                let mut names = vec![graph.root.describe()];
                names.extend(graph.parts.iter().map(|p| p.source.describe()));
                names.join(", ")
            }
            Source::Subquery { alias, .. } => alias.clone(),
            Source::Dual => "DUAL".to_string(),
        }
    }

    /// Joins `other` onto this source
    ///
    /// - `on`: explicit column pair, becomes the sole equality condition
    /// - `additional`: extra constraint, or the whole condition when `on` is
    ///   absent
    ///
    /// With neither, the condition is inferred from foreign keys. Cross joins
    /// reject any condition.
    pub fn join(
        self,
        other: impl Into<Source>,
        join_type: JoinType,
        on: Option<(Expr, Expr)>,
        additional: Option<Expr>,
    ) -> QueryResult<Source> {
        let other = other.into();

        let conditions = if join_type == JoinType::Cross {
            if on.is_some() || additional.is_some() {
                return Err(QueryError::UnexpectedJoinCondition {
                    right: other.describe(),
                });
            }
            Vec::new()
        } else {
            match (on, &additional) {
                (Some(pair), _) => vec![pair],
                (None, Some(_)) => Vec::new(),
                (None, None) => vec![self.infer_condition(&other, join_type)?],
            }
        };

        tracing::trace!(
            join_type = join_type.label(),
            right = %other.describe(),
            conditions = conditions.len(),
            "Adding join part"
        );

        let part = JoinPart {
            join_type,
            source: other,
            conditions,
            additional,
        };

        Ok(match self {
            Source::Join(mut graph) => {
                graph.parts.push(part);
                Source::Join(graph)
            }
            root => Source::Join(JoinGraph {
                root: Box::new(root),
                parts: vec![part],
            }),
        })
    }

    pub fn inner_join(self, other: impl Into<Source>) -> QueryResult<Source> {
        self.join(other, JoinType::Inner, None, None)
    }

    pub fn left_join(self, other: impl Into<Source>) -> QueryResult<Source> {
        self.join(other, JoinType::Left, None, None)
    }

    pub fn right_join(self, other: impl Into<Source>) -> QueryResult<Source> {
        self.join(other, JoinType::Right, None, None)
    }

    pub fn full_join(self, other: impl Into<Source>) -> QueryResult<Source> {
        self.join(other, JoinType::Full, None, None)
    }

    pub fn cross_join(self, other: impl Into<Source>) -> QueryResult<Source> {
        self.join(other, JoinType::Cross, None, None)
    }

    /// Finds the single foreign key linking this graph with `other`
    fn infer_condition(&self, other: &Source, join_type: JoinType) -> QueryResult<(Expr, Expr)> {
        let left_tables = self.tables();
        let right_tables = other.tables();
        if left_tables.is_empty() || right_tables.is_empty() {
            return Err(QueryError::MissingJoinCondition {
                join_type: join_type.label().to_string(),
                right: other.describe(),
            });
        }

        // (left table, right table, key, key declared on the left side)
        let mut candidates: Vec<(&Table, &Table, &ForeignKey, bool)> = Vec::new();
        for left in &left_tables {
            for right in &right_tables {
                for key in &left.foreign_keys {
                    if key.target_table == right.name {
                        candidates.push((left, right, key, true));
                    }
                }
                for key in &right.foreign_keys {
                    if key.target_table == left.name {
                        candidates.push((left, right, key, false));
                    }
                }
            }
        }

        match candidates.as_slice() {
            [] => Err(QueryError::NoMatchingKey {
                left: self.describe(),
                right: other.describe(),
            }),
            [(left, right, key, key_on_left)] => {
                if key.from_columns.len() != 1 || key.target_columns.len() != 1 {
                    return Err(QueryError::MultiColumnKey {
                        left: left.reference_name().to_string(),
                        right: right.reference_name().to_string(),
                        columns: key.from_columns.len(),
                    });
                }
                let (left_column, right_column) = if *key_on_left {
                    (&key.from_columns[0], &key.target_columns[0])
                } else {
                    (&key.target_columns[0], &key.from_columns[0])
                };
                Ok((left.column(left_column)?, right.column(right_column)?))
            }
            many => Err(QueryError::AmbiguousJoin {
                left: self.describe(),
                right: other.describe(),
                candidates: many
                    .iter()
                    .map(|(left, right, key, key_on_left)| {
                        let (owner, target) = if *key_on_left {
                            (left, right)
                        } else {
                            (right, left)
                        };
                        format!(
                            "{}({}) -> {}({})",
                            owner.reference_name(),
                            key.from_columns.join(", "),
                            target.reference_name(),
                            key.target_columns.join(", ")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_inferred_join_condition_orientation() {
        let joined = Source::from(users()).inner_join(orders()).unwrap();
        let Source::Join(graph) = joined else {
            panic!("expected join graph");
        };
        let (left, right) = &graph.parts[0].conditions[0];
        assert_eq!(left, &users().column("id").unwrap());
        assert_eq!(right, &orders().column("user_id").unwrap());
    }

    #[test]
    fn test_no_matching_key() {
        let products = Table::new("products")
            .with_column(ColumnDef::new("id", ColumnType::Integer).primary_key());
        let err = Source::from(users()).inner_join(products).unwrap_err();
        assert!(matches!(err, QueryError::NoMatchingKey { .. }));
    }

    #[test]
    fn test_cross_join_rejects_condition() {
        let err = Source::from(users())
            .join(
                orders(),
                JoinType::Cross,
                Some((
                    users().column("id").unwrap(),
                    orders().column("user_id").unwrap(),
                )),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedJoinCondition { .. }));
        assert!(Source::from(users()).cross_join(orders()).is_ok());
    }

    #[test]
    fn test_join_part_validate() {
        let part = JoinPart {
            join_type: JoinType::Left,
            source: Source::from(orders()),
            conditions: Vec::new(),
            additional: None,
        };
        assert!(matches!(
            part.validate(),
            Err(QueryError::MissingJoinCondition { .. })
        ));

        let cross = JoinPart {
            join_type: JoinType::Cross,
            additional: Some(Expr::from(true)),
            ..part.clone()
        };
        assert!(matches!(
            cross.validate(),
            Err(QueryError::UnexpectedJoinCondition { .. })
        ));

        let Source::Join(graph) = Source::from(users()).inner_join(orders()).unwrap() else {
            panic!("expected join graph");
        };
        assert!(graph.parts[0].validate().is_ok());
    }

    #[test]
    fn test_unknown_column() {
        let err = users().column("missing").unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownColumn {
                table: "users".to_string(),
                column: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_alias_qualifies_columns() {
        let u = users().with_alias("u");
        let Expr::Column(c) = u.column("id").unwrap() else {
            panic!("expected column");
        };
        assert_eq!(c.qualified(), "u.id");
    }
}
