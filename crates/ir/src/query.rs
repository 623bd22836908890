// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Assembly
//!
//! This module assembles SELECT statements.
//!
//! ## Design
//!
//! Assembly is split in two types:
//!
//! - [`SelectBuilder`]: mutable, single-writer. Every mutator takes
//!   `&mut self` and validates its input immediately, so a misuse fails at the
//!   call that caused it.
//! - [`SelectStatement`]: immutable snapshot produced by
//!   [`SelectBuilder::build`]. Only snapshots can be rendered or used as
//!   subqueries, so a statement can never change while it is being rendered.
//!
//! ## Clauses
//!
//! - **Projection**: [`SelectItem`]s, optionally aliased
//! - **Distinct**: `DISTINCT` or `DISTINCT ON (...)`, never both
//! - **WHERE** / **HAVING**: single predicate, extended with `and_where` /
//!   `or_where`
//! - **GROUP BY** / **ORDER BY**: appended in call order
//! - **LIMIT** / **OFFSET**: row counts
//! - **Locking**: `FOR UPDATE` and friends
//! - **Comments**: one `/* ... */` per [`CommentPosition`]
//! - **Count only**: replaces the projection with `COUNT(*)` and drops the
//!   clauses that cannot apply to a count
//!
//! ## Example
//!
//! ```rust
//! use unified_sql_ir::ops::{col, eq};
//! use unified_sql_ir::{ColumnType, SelectBuilder, SortOrder, Table};
//!
//! let id = col("t", "id", ColumnType::Integer);
//! let mut builder = SelectBuilder::new(Table::new("t"));
//! builder
//!     .select(vec![id.clone()])
//!     .unwrap()
//!     .and_where(eq(id.clone(), 5))
//!     .order_by(id, SortOrder::Asc)
//!     .limit(10);
//! let statement = builder.build().unwrap();
//! assert_eq!(statement.limit(), Some(10));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::expr::Expr;
use crate::ops;
use crate::source::Source;
use crate::types::ColumnType;

/// Item in a SELECT projection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn aliased(expr: impl Into<Expr>, alias: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            alias: Some(alias.into()),
        }
    }
}

impl From<Expr> for SelectItem {
    fn from(expr: Expr) -> Self {
        Self { expr, alias: None }
    }
}

/// Sort direction, with optional NULL placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
    AscNullsFirst,
    AscNullsLast,
    DescNullsFirst,
    DescNullsLast,
}

impl SortOrder {
    pub fn is_descending(&self) -> bool {
        matches!(
            self,
            SortOrder::Desc | SortOrder::DescNullsFirst | SortOrder::DescNullsLast
        )
    }

    /// `Some(true)` for NULLS FIRST, `Some(false)` for NULLS LAST
    pub fn nulls_first(&self) -> Option<bool> {
        match self {
            SortOrder::Asc | SortOrder::Desc => None,
            SortOrder::AscNullsFirst | SortOrder::DescNullsFirst => Some(true),
            SortOrder::AscNullsLast | SortOrder::DescNullsLast => Some(false),
        }
    }
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expr,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn new(expr: impl Into<Expr>, order: SortOrder) -> Self {
        Self {
            expr: expr.into(),
            order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Distinct {
    #[default]
    None,
    Distinct,
    DistinctOn(Vec<Expr>),
}

/// Row locking clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockMode {
    ForUpdate,
    ForUpdateNoWait,
    ForUpdateSkipLocked,
    ForShare,
}

/// Where a comment is placed in the statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CommentPosition {
    /// Before `SELECT`
    Front,
    /// Right after `SELECT`, where optimizer hints go
    AfterSelect,
    /// After every other clause
    Back,
}

impl fmt::Display for CommentPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentPosition::Front => f.write_str("front"),
            CommentPosition::AfterSelect => f.write_str("after select"),
            CommentPosition::Back => f.write_str("back"),
        }
    }
}

/// Mutable SELECT under construction
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    source: Source,
    projection: Vec<SelectItem>,
    distinct: Distinct,
    where_clause: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    lock: Option<LockMode>,
    comments: BTreeMap<CommentPosition, String>,
    count_only: bool,
}

impl SelectBuilder {
    pub fn new(source: impl Into<Source>) -> Self {
        Self {
            source: source.into(),
            projection: Vec::new(),
            distinct: Distinct::None,
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            lock: None,
            comments: BTreeMap::new(),
            count_only: false,
        }
    }

    /// Replaces the projection
    pub fn select<I>(&mut self, items: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<SelectItem>,
    {
        let items: Vec<SelectItem> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(QueryError::EmptyProjection);
        }
        self.projection = items;
        Ok(self)
    }

    /// Appends to the projection
    pub fn add_select(&mut self, item: impl Into<SelectItem>) -> &mut Self {
        self.projection.push(item.into());
        self
    }

    pub fn distinct(&mut self) -> QueryResult<&mut Self> {
        if let Distinct::DistinctOn(_) = self.distinct {
            return Err(QueryError::ConflictingDistinct {
                message: "DISTINCT ON is already set".to_string(),
            });
        }
        self.distinct = Distinct::Distinct;
        Ok(self)
    }

    /// Adds `DISTINCT ON` expressions, appending to any already set
    pub fn distinct_on(&mut self, exprs: Vec<Expr>) -> QueryResult<&mut Self> {
        if exprs.is_empty() {
            return Err(QueryError::EmptyDistinctOn);
        }
        match &mut self.distinct {
            Distinct::Distinct => {
                return Err(QueryError::ConflictingDistinct {
                    message: "DISTINCT is already set".to_string(),
                });
            }
            Distinct::DistinctOn(existing) => existing.extend(exprs),
            Distinct::None => self.distinct = Distinct::DistinctOn(exprs),
        }
        Ok(self)
    }

    /// Clears both `DISTINCT` and `DISTINCT ON`
    pub fn no_distinct(&mut self) -> &mut Self {
        self.distinct = Distinct::None;
        self
    }

    pub fn and_where(&mut self, predicate: Expr) -> &mut Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => ops::and(existing, predicate),
            None => predicate,
        });
        self
    }

    pub fn or_where(&mut self, predicate: Expr) -> &mut Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => ops::or(existing, predicate),
            None => predicate,
        });
        self
    }

    pub fn replace_where(&mut self, predicate: Option<Expr>) -> &mut Self {
        self.where_clause = predicate;
        self
    }

    pub fn group_by(&mut self, exprs: Vec<Expr>) -> &mut Self {
        self.group_by.extend(exprs);
        self
    }

    pub fn having(&mut self, predicate: Expr) -> QueryResult<&mut Self> {
        if self.having.is_some() {
            return Err(QueryError::HavingAlreadySet);
        }
        self.having = Some(predicate);
        Ok(self)
    }

    pub fn replace_having(&mut self, predicate: Option<Expr>) -> &mut Self {
        self.having = predicate;
        self
    }

    pub fn order_by(&mut self, expr: impl Into<Expr>, order: SortOrder) -> &mut Self {
        self.order_by.push(OrderBy::new(expr, order));
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn lock(&mut self, mode: LockMode) -> &mut Self {
        self.lock = Some(mode);
        self
    }

    pub fn no_lock(&mut self) -> &mut Self {
        self.lock = None;
        self
    }

    /// Attaches a comment; each position holds at most one
    pub fn comment(
        &mut self,
        text: impl Into<String>,
        position: CommentPosition,
    ) -> QueryResult<&mut Self> {
        if self.comments.contains_key(&position) {
            return Err(QueryError::CommentAlreadySet {
                position: position.to_string(),
            });
        }
        self.replace_comment(text, position)
    }

    /// Attaches a comment, overwriting any comment at that position
    pub fn replace_comment(
        &mut self,
        text: impl Into<String>,
        position: CommentPosition,
    ) -> QueryResult<&mut Self> {
        let text = text.into();
        if text.contains("*/") {
            return Err(QueryError::InvalidComment {
                message: "comment text must not contain '*/'".to_string(),
            });
        }
        self.comments.insert(position, text);
        Ok(self)
    }

    pub fn remove_comment(&mut self, position: CommentPosition) -> &mut Self {
        self.comments.remove(&position);
        self
    }

    /// Renders as `SELECT COUNT(*)` over the same source and filter
    pub fn count_only(&mut self, count_only: bool) -> &mut Self {
        self.count_only = count_only;
        self
    }

    /// Finalizes the current state into an immutable statement
    pub fn build(&self) -> QueryResult<SelectStatement> {
        if self.projection.is_empty() && !self.count_only {
            return Err(QueryError::EmptyProjection);
        }

        tracing::trace!(
            projection = self.projection.len(),
            count_only = self.count_only,
            "Building select statement"
        );

        Ok(SelectStatement {
            source: self.source.clone(),
            projection: self.projection.clone(),
            distinct: self.distinct.clone(),
            where_clause: self.where_clause.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            lock: self.lock,
            comments: self.comments.clone(),
            count_only: self.count_only,
        })
    }
}

/// Finalized SELECT statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    source: Source,
    projection: Vec<SelectItem>,
    distinct: Distinct,
    where_clause: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    lock: Option<LockMode>,
    comments: BTreeMap<CommentPosition, String>,
    count_only: bool,
}

impl SelectStatement {
    /// Re-check the invariants `SelectBuilder` enforces
    ///
    /// A statement that did not come from [`SelectBuilder::build`] (one
    /// deserialized from JSON, say) may violate them.
    pub fn validate(&self) -> QueryResult<()> {
        if self.projection.is_empty() && !self.count_only {
            return Err(QueryError::EmptyProjection);
        }
        if matches!(&self.distinct, Distinct::DistinctOn(exprs) if exprs.is_empty()) {
            return Err(QueryError::EmptyDistinctOn);
        }
        Ok(())
    }

    /// Builder pre-populated with this statement's clauses
    pub fn to_builder(&self) -> SelectBuilder {
        SelectBuilder {
            source: self.source.clone(),
            projection: self.projection.clone(),
            distinct: self.distinct.clone(),
            where_clause: self.where_clause.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            lock: self.lock,
            comments: self.comments.clone(),
            count_only: self.count_only,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn projection(&self) -> &[SelectItem] {
        &self.projection
    }

    pub fn distinct(&self) -> &Distinct {
        &self.distinct
    }

    pub fn where_clause(&self) -> Option<&Expr> {
        self.where_clause.as_ref()
    }

    pub fn group_by(&self) -> &[Expr] {
        &self.group_by
    }

    pub fn having(&self) -> Option<&Expr> {
        self.having.as_ref()
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn lock(&self) -> Option<LockMode> {
        self.lock
    }

    pub fn comment(&self, position: CommentPosition) -> Option<&str> {
        self.comments.get(&position).map(String::as_str)
    }

    pub fn is_count_only(&self) -> bool {
        self.count_only
    }

    /// Type of the first projected column, the value of a scalar subquery
    pub fn result_type(&self) -> ColumnType {
        if self.count_only {
            return ColumnType::Long;
        }
        self.projection
            .first()
            .map(|item| item.expr.column_type())
            .unwrap_or(ColumnType::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{col, eq};
    use crate::source::Table;

    fn id() -> Expr {
        col("t", "id", ColumnType::Integer)
    }

    #[test]
    fn test_build_requires_projection() {
        let builder = SelectBuilder::new(Table::new("t"));
        assert_eq!(builder.build().unwrap_err(), QueryError::EmptyProjection);

        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.count_only(true);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_validate_rechecks_projection() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.select(vec![id()]).unwrap();
        let mut statement = builder.build().unwrap();
        assert!(statement.validate().is_ok());

        statement.projection.clear();
        assert_eq!(statement.validate().unwrap_err(), QueryError::EmptyProjection);
        statement.count_only = true;
        assert!(statement.validate().is_ok());

        statement.distinct = Distinct::DistinctOn(Vec::new());
        assert_eq!(statement.validate().unwrap_err(), QueryError::EmptyDistinctOn);
    }

    #[test]
    fn test_select_rejects_empty_list() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        let err = builder.select(Vec::<Expr>::new()).unwrap_err();
        assert_eq!(err, QueryError::EmptyProjection);
    }

    #[test]
    fn test_distinct_conflicts() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.distinct().unwrap();
        assert!(matches!(
            builder.distinct_on(vec![id()]),
            Err(QueryError::ConflictingDistinct { .. })
        ));

        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.distinct_on(vec![id()]).unwrap();
        assert!(matches!(
            builder.distinct(),
            Err(QueryError::ConflictingDistinct { .. })
        ));
        builder.no_distinct();
        assert!(builder.distinct().is_ok());
    }

    #[test]
    fn test_distinct_on_requires_expression() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        assert_eq!(
            builder.distinct_on(Vec::new()).unwrap_err(),
            QueryError::EmptyDistinctOn
        );
    }

    #[test]
    fn test_having_set_once() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.having(eq(id(), 1)).unwrap();
        assert_eq!(
            builder.having(eq(id(), 2)).unwrap_err(),
            QueryError::HavingAlreadySet
        );
        builder.replace_having(Some(eq(id(), 2)));
    }

    #[test]
    fn test_comment_rules() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.comment("hint", CommentPosition::Front).unwrap();
        assert!(matches!(
            builder.comment("again", CommentPosition::Front),
            Err(QueryError::CommentAlreadySet { .. })
        ));
        assert!(matches!(
            builder.comment("bad */ text", CommentPosition::Back),
            Err(QueryError::InvalidComment { .. })
        ));
        builder
            .replace_comment("other", CommentPosition::Front)
            .unwrap();
        builder.select(vec![id()]).unwrap();
        let statement = builder.build().unwrap();
        assert_eq!(statement.comment(CommentPosition::Front), Some("other"));
        assert_eq!(statement.comment(CommentPosition::Back), None);
    }

    #[test]
    fn test_snapshot_is_detached_from_builder() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder.select(vec![id()]).unwrap();
        let first = builder.build().unwrap();
        builder.limit(5);
        assert_eq!(first.limit(), None);
        assert_eq!(builder.build().unwrap().limit(), Some(5));
    }

    #[test]
    fn test_and_where_accumulates() {
        let mut builder = SelectBuilder::new(Table::new("t"));
        builder
            .select(vec![id()])
            .unwrap()
            .and_where(eq(id(), 1))
            .and_where(eq(id(), 2))
            .and_where(eq(id(), 3));
        let statement = builder.build().unwrap();
        match statement.where_clause() {
            Some(Expr::Compound { operands, .. }) => assert_eq!(operands.len(), 3),
            other => panic!("expected compound, got {other:?}"),
        }
    }
}
