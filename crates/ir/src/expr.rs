// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module defines the typed expression tree.
//!
//! ## Design
//!
//! Expressions are the building blocks of queries and can represent:
//!
//! - **Column references**: `table.column` with the column's logical type
//! - **Literals and parameters**: typed values, inlined or bound as `?`
//! - **Predicates**: comparisons, `BETWEEN`, `IS NULL`, `IN`, `EXISTS`
//! - **Logical compounds**: flat `AND` / `OR` operand lists
//! - **Arithmetic and bitwise operations**
//! - **Function calls**: plain, aggregate, and dialect-dispatched functions
//! - **Subqueries**: scalar, `IN (...)`, `EXISTS (...)` and `ANY` / `ALL`
//!
//! Every node is immutable once built and reports its result type through
//! [`Expr::column_type`]. Nodes never hold dialect state; vendor differences
//! are resolved by the render crate.
//!
//! ## Parenthesization
//!
//! A composite node wraps a child in parentheses exactly when
//! [`Expr::needs_parens`] is true for that child. Operator nodes need
//! parentheses, leaves and function-call shaped nodes do not:
//!
//! ```text
//! Compound { And, [Comparison(t.id = ?), Comparison(t.name = ?)] }
//! ```
//!
//! Renders as: `(t.id = ?) AND (t.name = ?)`
//!
//! ## Compounds
//!
//! [`crate::ops::and`] and [`crate::ops::or`] splice operand lists when an
//! argument is already a compound of the same kind, one level deep. Nesting
//! introduced through another node (e.g. `NOT`) is kept as is.

use serde::{Deserialize, Serialize};

use crate::query::{OrderBy, SelectStatement};
use crate::types::{ColumnType, TypedValue, Value};

/// A typed SQL expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Column reference (e.g., `users.id`)
    Column(ColumnRef),

    /// Constant, always inlined into the SQL text
    Literal(TypedValue),

    /// Value bound as a placeholder in prepared mode
    Parameter(TypedValue),

    /// Binary comparison (e.g., `a = b`, `a LIKE b`)
    Comparison {
        left: Box<Expr>,
        op: ComparisonOp,
        right: Box<Expr>,
    },

    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },

    /// Flat `AND` / `OR` of two or more operands
    Compound { op: LogicalOp, operands: Vec<Expr> },

    /// `NOT expr`
    Not(Box<Expr>),

    Arithmetic {
        left: Box<Expr>,
        op: ArithmeticOp,
        right: Box<Expr>,
    },

    Bitwise {
        left: Box<Expr>,
        op: BitwiseOp,
        right: Box<Expr>,
    },

    /// Plain function call (e.g., `UPPER(name)`)
    Function {
        name: String,
        args: Vec<Expr>,
        result_type: ColumnType,
    },

    /// Aggregate function call
    Aggregate {
        function: AggregateFunction,
        arg: Box<Expr>,
        distinct: bool,
    },

    /// `COUNT(*)`
    CountAll,

    /// Infix operator not known to the engine (e.g., `a @> b`)
    CustomOperator {
        symbol: String,
        left: Box<Expr>,
        right: Box<Expr>,
        result_type: ColumnType,
    },

    /// String concatenation, with an optional separator
    Concat {
        separator: Option<String>,
        args: Vec<Expr>,
    },

    /// Position of `needle` inside `haystack` (1-based, 0 when absent)
    Locate {
        haystack: Box<Expr>,
        needle: Box<Expr>,
    },

    /// String aggregation
    GroupConcat {
        expr: Box<Expr>,
        separator: Option<String>,
        distinct: bool,
        order_by: Vec<OrderBy>,
    },

    Random { seed: Option<i64> },

    Cast { expr: Box<Expr>, target: ColumnType },

    /// Regular expression match
    Regexp {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        case_sensitive: bool,
    },

    Substring {
        expr: Box<Expr>,
        start: Box<Expr>,
        length: Option<Box<Expr>>,
    },

    /// `CASE [value] WHEN .. THEN .. [ELSE ..] END`
    Case {
        value: Option<Box<Expr>>,
        branches: Vec<(Expr, Expr)>,
        default: Option<Box<Expr>>,
    },

    /// `[NOT] EXISTS (query)`
    Exists {
        query: Box<SelectStatement>,
        negated: bool,
    },

    /// `expr [NOT] IN (a, b, ...)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// `expr [NOT] IN (query)`
    InSubquery {
        expr: Box<Expr>,
        query: Box<SelectStatement>,
        negated: bool,
    },

    /// Scalar subquery
    Subquery(Box<SelectStatement>),

    /// `ANY (...)` / `ALL (...)`, the right-hand side of a comparison
    Quantified {
        quantifier: Quantifier,
        source: MembershipSource,
    },

    /// `*`
    Wildcard,
}

impl Expr {
    /// Whether this node must be parenthesized when nested in another node
    pub fn needs_parens(&self) -> bool {
        matches!(
            self,
            Expr::Comparison { .. }
                | Expr::Between { .. }
                | Expr::IsNull { .. }
                | Expr::Compound { .. }
                | Expr::Arithmetic { .. }
                | Expr::Bitwise { .. }
                | Expr::CustomOperator { .. }
                | Expr::InList { .. }
                | Expr::InSubquery { .. }
                | Expr::Regexp { .. }
        )
    }

    /// The logical type this expression evaluates to
    ///
    /// Wildcards and table membership sources have no single column type and
    /// report [`ColumnType::Text`].
    pub fn column_type(&self) -> ColumnType {
        match self {
            Expr::Column(column) => column.column_type.clone(),
            Expr::Literal(value) | Expr::Parameter(value) => value.column_type.clone(),
            Expr::Comparison { .. }
            | Expr::Between { .. }
            | Expr::IsNull { .. }
            | Expr::Compound { .. }
            | Expr::Not(_)
            | Expr::Regexp { .. }
            | Expr::Exists { .. }
            | Expr::InList { .. }
            | Expr::InSubquery { .. } => ColumnType::Boolean,
            Expr::Arithmetic { left, .. } | Expr::Bitwise { left, .. } => left.column_type(),
            Expr::Function { result_type, .. } | Expr::CustomOperator { result_type, .. } => {
                result_type.clone()
            }
            Expr::Aggregate { function, arg, .. } => match function {
                AggregateFunction::Count => ColumnType::Long,
                AggregateFunction::Avg => ColumnType::Double,
                AggregateFunction::Sum | AggregateFunction::Min | AggregateFunction::Max => {
                    arg.column_type()
                }
            },
            Expr::CountAll => ColumnType::Long,
            Expr::Concat { .. } | Expr::GroupConcat { .. } => ColumnType::Text,
            Expr::Locate { .. } => ColumnType::Integer,
            Expr::Random { .. } => ColumnType::Double,
            Expr::Cast { target, .. } => target.clone(),
            Expr::Substring { expr, .. } => expr.column_type(),
            Expr::Case {
                branches, default, ..
            } => branches
                .first()
                .map(|(_, result)| result.column_type())
                .or_else(|| default.as_ref().map(|d| d.column_type()))
                .unwrap_or(ColumnType::Text),
            Expr::Subquery(query) => query.result_type(),
            Expr::Quantified { source, .. } => source.element_type(),
            Expr::Wildcard => ColumnType::Text,
        }
    }

    /// Copy of this expression reporting another result type
    ///
    /// Applies to columns, literals, parameters, function calls and custom
    /// operators; every other node is returned unchanged.
    pub fn with_type(&self, column_type: ColumnType) -> Expr {
        match self {
            Expr::Column(column) => Expr::Column(column.with_type(column_type)),
            Expr::Literal(value) => Expr::Literal(value.with_type(column_type)),
            Expr::Parameter(value) => Expr::Parameter(value.with_type(column_type)),
            Expr::Function { name, args, .. } => Expr::Function {
                name: name.clone(),
                args: args.clone(),
                result_type: column_type,
            },
            Expr::CustomOperator {
                symbol,
                left,
                right,
                ..
            } => Expr::CustomOperator {
                symbol: symbol.clone(),
                left: left.clone(),
                right: right.clone(),
                result_type: column_type,
            },
            other => other.clone(),
        }
    }

    /// Whether this is an `AND` / `OR` compound of the given kind
    pub fn is_compound(&self, kind: LogicalOp) -> bool {
        matches!(self, Expr::Compound { op, .. } if *op == kind)
    }
}

/// Column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional table/alias name
    pub table: Option<String>,
    /// Column name
    pub column: String,
    pub column_type: ColumnType,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            table: None,
            column: column.into(),
            column_type,
        }
    }

    pub fn with_table(&self, table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..self.clone()
        }
    }

    pub fn with_type(&self, column_type: ColumnType) -> Self {
        Self {
            column_type,
            ..self.clone()
        }
    }

    pub fn qualified(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

impl From<ColumnRef> for Expr {
    fn from(column: ColumnRef) -> Self {
        Expr::Column(column)
    }
}

impl From<TypedValue> for Expr {
    fn from(value: TypedValue) -> Self {
        Expr::Parameter(value)
    }
}

macro_rules! expr_from_value {
    ($($rust:ty),* $(,)?) => {
        $(
            impl From<$rust> for Expr {
                fn from(v: $rust) -> Self {
                    Expr::Parameter(TypedValue::from(v))
                }
            }
        )*
    };
}

expr_from_value!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    &str,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    serde_json::Value,
);

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Like,
    NotLike,
    /// Null-safe inequality
    IsDistinctFrom,
    /// Null-safe equality
    IsNotDistinctFrom,
}

impl ComparisonOp {
    /// SQL symbol for operators every dialect spells the same way
    ///
    /// Null-safe operators return `None` and are rendered by the dialect.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            ComparisonOp::Eq => Some("="),
            ComparisonOp::NotEq => Some("<>"),
            ComparisonOp::Less => Some("<"),
            ComparisonOp::LessEq => Some("<="),
            ComparisonOp::Greater => Some(">"),
            ComparisonOp::GreaterEq => Some(">="),
            ComparisonOp::Like => Some("LIKE"),
            ComparisonOp::NotLike => Some("NOT LIKE"),
            ComparisonOp::IsDistinctFrom | ComparisonOp::IsNotDistinctFrom => None,
        }
    }
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Plus => "+",
            ArithmeticOp::Minus => "-",
            ArithmeticOp::Times => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulo => "%",
        }
    }
}

/// Bitwise operators, spelled per dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Any,
    All,
}

impl Quantifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Quantifier::Any => "ANY",
            Quantifier::All => "ALL",
        }
    }
}

/// What an `ANY` / `ALL` quantifier ranges over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MembershipSource {
    Query(Box<SelectStatement>),
    /// Array of values of the given element type
    Array(Vec<Value>, ColumnType),
    /// Every row of a single-column table
    Table(String),
    Expression(Box<Expr>),
}

impl MembershipSource {
    pub fn element_type(&self) -> ColumnType {
        match self {
            MembershipSource::Query(query) => query.result_type(),
            MembershipSource::Array(_, element_type) => element_type.clone(),
            MembershipSource::Table(_) => ColumnType::Text,
            MembershipSource::Expression(expr) => match expr.column_type() {
                ColumnType::Array(inner) => *inner,
                other => other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref() {
        let col = ColumnRef::new("id", ColumnType::Integer);
        assert_eq!(col.qualified(), "id");
        assert!(col.table.is_none());

        let qualified = col.with_table("users");
        assert_eq!(qualified.qualified(), "users.id");
        assert_eq!(qualified.table.as_deref(), Some("users"));
        assert_eq!(qualified.column_type, ColumnType::Integer);
    }

    #[test]
    fn test_needs_parens() {
        let id = Expr::Column(ColumnRef::new("id", ColumnType::Integer));
        assert!(!id.needs_parens());
        assert!(!Expr::CountAll.needs_parens());

        let cmp = Expr::Comparison {
            left: Box::new(id.clone()),
            op: ComparisonOp::Eq,
            right: Box::new(Expr::from(1)),
        };
        assert!(cmp.needs_parens());
        assert!(!Expr::Not(Box::new(cmp)).needs_parens());
    }

    #[test]
    fn test_with_type() {
        let param = Expr::from(5i64).with_type(ColumnType::Integer);
        assert_eq!(param.column_type(), ColumnType::Integer);
        assert_eq!(Expr::CountAll.with_type(ColumnType::Text), Expr::CountAll);
    }
}
