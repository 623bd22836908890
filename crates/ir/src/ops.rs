// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expression constructors
//!
//! Named functions that build [`Expr`] nodes. Arguments take `impl Into<Expr>`,
//! so Rust values can be passed directly and become bound parameters:
//!
//! ```rust
//! use unified_sql_ir::ops::{and, col, eq};
//! use unified_sql_ir::ColumnType;
//!
//! let id = col("t", "id", ColumnType::Integer);
//! let name = col("t", "name", ColumnType::Text);
//! let filter = and(eq(id, 5), eq(name, "Bob"));
//! ```
//!
//! When one side of a comparison is a column and the other a bare value, the
//! value is bound with the column's type so it converts the way the column
//! stores it.

use crate::error::{QueryError, QueryResult};
use crate::expr::{
    AggregateFunction, ArithmeticOp, BitwiseOp, ColumnRef, ComparisonOp, Expr, LogicalOp,
    MembershipSource, Quantifier,
};
use crate::query::{OrderBy, SelectStatement};
use crate::types::{ColumnType, TypedValue};

/// Qualified column reference
pub fn col(table: impl Into<String>, column: impl Into<String>, column_type: ColumnType) -> Expr {
    Expr::Column(ColumnRef::new(column, column_type).with_table(table))
}

/// Inlined constant
pub fn literal(value: impl Into<TypedValue>) -> Expr {
    Expr::Literal(value.into())
}

/// Bound parameter
pub fn param(value: impl Into<TypedValue>) -> Expr {
    Expr::Parameter(value.into())
}

/// Re-types a bare value so it matches the type of the expression it is
/// compared with, converting it to the variant that type stores
fn bind_to(anchor: &Expr, operand: Expr) -> Expr {
    let target = match anchor {
        Expr::Column(column) => &column.column_type,
        _ => return operand,
    };
    match operand {
        Expr::Parameter(value) if value.column_type != *target => match value.coerce_to(target) {
            Some(bound) => Expr::Parameter(bound),
            None => Expr::Parameter(value),
        },
        Expr::Literal(value) if value.column_type != *target => match value.coerce_to(target) {
            Some(bound) => Expr::Literal(bound),
            None => Expr::Literal(value),
        },
        other => other,
    }
}

fn comparison(left: impl Into<Expr>, op: ComparisonOp, right: impl Into<Expr>) -> Expr {
    let left = left.into();
    let right = bind_to(&left, right.into());
    let left = bind_to(&right, left);
    Expr::Comparison {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::Eq, right)
}

pub fn neq(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::NotEq, right)
}

pub fn less(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::Less, right)
}

pub fn less_eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::LessEq, right)
}

pub fn greater(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::Greater, right)
}

pub fn greater_eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::GreaterEq, right)
}

pub fn like(expr: impl Into<Expr>, pattern: impl Into<Expr>) -> Expr {
    comparison(expr, ComparisonOp::Like, pattern)
}

pub fn not_like(expr: impl Into<Expr>, pattern: impl Into<Expr>) -> Expr {
    comparison(expr, ComparisonOp::NotLike, pattern)
}

/// Null-safe inequality: true when exactly one side is NULL or the values differ
pub fn is_distinct_from(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::IsDistinctFrom, right)
}

/// Null-safe equality: true when both sides are NULL or the values are equal
pub fn is_not_distinct_from(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    comparison(left, ComparisonOp::IsNotDistinctFrom, right)
}

fn between_impl(
    expr: impl Into<Expr>,
    low: impl Into<Expr>,
    high: impl Into<Expr>,
    negated: bool,
) -> Expr {
    let expr = expr.into();
    let low = bind_to(&expr, low.into());
    let high = bind_to(&expr, high.into());
    Expr::Between {
        expr: Box::new(expr),
        low: Box::new(low),
        high: Box::new(high),
        negated,
    }
}

pub fn between(expr: impl Into<Expr>, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
    between_impl(expr, low, high, false)
}

pub fn not_between(expr: impl Into<Expr>, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
    between_impl(expr, low, high, true)
}

pub fn is_null(expr: impl Into<Expr>) -> Expr {
    Expr::IsNull {
        expr: Box::new(expr.into()),
        negated: false,
    }
}

pub fn is_not_null(expr: impl Into<Expr>) -> Expr {
    Expr::IsNull {
        expr: Box::new(expr.into()),
        negated: true,
    }
}

/// Combines two operands, splicing either side that is already a compound of
/// the same kind
fn compound(kind: LogicalOp, left: Expr, right: Expr) -> Expr {
    let mut operands = Vec::new();
    for side in [left, right] {
        match side {
            Expr::Compound { op, operands: inner } if op == kind => operands.extend(inner),
            other => operands.push(other),
        }
    }
    Expr::Compound { op: kind, operands }
}

pub fn and(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    compound(LogicalOp::And, left.into(), right.into())
}

pub fn or(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    compound(LogicalOp::Or, left.into(), right.into())
}

/// Left fold of `and`; `None` when there is nothing to combine
pub fn and_all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(|acc, next| compound(LogicalOp::And, acc, next))
}

/// Left fold of `or`; `None` when there is nothing to combine
pub fn or_all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(|acc, next| compound(LogicalOp::Or, acc, next))
}

pub fn not(expr: impl Into<Expr>) -> Expr {
    Expr::Not(Box::new(expr.into()))
}

fn arithmetic(left: impl Into<Expr>, op: ArithmeticOp, right: impl Into<Expr>) -> Expr {
    let left = left.into();
    let right = bind_to(&left, right.into());
    Expr::Arithmetic {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn plus(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, ArithmeticOp::Plus, right)
}

pub fn minus(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, ArithmeticOp::Minus, right)
}

pub fn times(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, ArithmeticOp::Times, right)
}

pub fn divide(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, ArithmeticOp::Divide, right)
}

pub fn modulo(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    arithmetic(left, ArithmeticOp::Modulo, right)
}

fn bitwise(left: impl Into<Expr>, op: BitwiseOp, right: impl Into<Expr>) -> Expr {
    let left = left.into();
    let right = bind_to(&left, right.into());
    Expr::Bitwise {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn bit_and(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    bitwise(left, BitwiseOp::And, right)
}

pub fn bit_or(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    bitwise(left, BitwiseOp::Or, right)
}

pub fn bit_xor(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    bitwise(left, BitwiseOp::Xor, right)
}

/// Plain function call
pub fn function(name: impl Into<String>, args: Vec<Expr>, result_type: ColumnType) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        result_type,
    }
}

pub fn upper(expr: impl Into<Expr>) -> Expr {
    let expr = expr.into();
    let result_type = expr.column_type();
    function("UPPER", vec![expr], result_type)
}

pub fn lower(expr: impl Into<Expr>) -> Expr {
    let expr = expr.into();
    let result_type = expr.column_type();
    function("LOWER", vec![expr], result_type)
}

pub fn trim(expr: impl Into<Expr>) -> Expr {
    let expr = expr.into();
    let result_type = expr.column_type();
    function("TRIM", vec![expr], result_type)
}

fn aggregate(function: AggregateFunction, arg: impl Into<Expr>, distinct: bool) -> Expr {
    Expr::Aggregate {
        function,
        arg: Box::new(arg.into()),
        distinct,
    }
}

pub fn count(expr: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunction::Count, expr, false)
}

pub fn count_distinct(expr: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunction::Count, expr, true)
}

pub fn count_all() -> Expr {
    Expr::CountAll
}

pub fn sum(expr: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunction::Sum, expr, false)
}

pub fn avg(expr: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunction::Avg, expr, false)
}

pub fn min(expr: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunction::Min, expr, false)
}

pub fn max(expr: impl Into<Expr>) -> Expr {
    aggregate(AggregateFunction::Max, expr, false)
}

/// Infix operator rendered verbatim between its operands
pub fn custom_op(
    symbol: impl Into<String>,
    left: impl Into<Expr>,
    right: impl Into<Expr>,
    result_type: ColumnType,
) -> Expr {
    Expr::CustomOperator {
        symbol: symbol.into(),
        left: Box::new(left.into()),
        right: Box::new(right.into()),
        result_type,
    }
}

pub fn concat(args: Vec<Expr>) -> Expr {
    Expr::Concat {
        separator: None,
        args,
    }
}

pub fn concat_ws(separator: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::Concat {
        separator: Some(separator.into()),
        args,
    }
}

pub fn locate(haystack: impl Into<Expr>, needle: impl Into<Expr>) -> Expr {
    Expr::Locate {
        haystack: Box::new(haystack.into()),
        needle: Box::new(needle.into()),
    }
}

pub fn group_concat(
    expr: impl Into<Expr>,
    separator: Option<&str>,
    distinct: bool,
    order_by: Vec<OrderBy>,
) -> Expr {
    Expr::GroupConcat {
        expr: Box::new(expr.into()),
        separator: separator.map(str::to_string),
        distinct,
        order_by,
    }
}

pub fn random(seed: Option<i64>) -> Expr {
    Expr::Random { seed }
}

pub fn cast(expr: impl Into<Expr>, target: ColumnType) -> Expr {
    Expr::Cast {
        expr: Box::new(expr.into()),
        target,
    }
}

pub fn regexp(expr: impl Into<Expr>, pattern: impl Into<Expr>, case_sensitive: bool) -> Expr {
    Expr::Regexp {
        expr: Box::new(expr.into()),
        pattern: Box::new(pattern.into()),
        case_sensitive,
    }
}

/// `SUBSTRING(expr, start[, length])`, `start` is 1-based
pub fn substring(expr: impl Into<Expr>, start: impl Into<Expr>, length: Option<Expr>) -> Expr {
    Expr::Substring {
        expr: Box::new(expr.into()),
        start: Box::new(start.into()),
        length: length.map(Box::new),
    }
}

pub fn exists(query: SelectStatement) -> Expr {
    Expr::Exists {
        query: Box::new(query),
        negated: false,
    }
}

pub fn not_exists(query: SelectStatement) -> Expr {
    Expr::Exists {
        query: Box::new(query),
        negated: true,
    }
}

fn in_list_impl<I>(expr: impl Into<Expr>, list: I, negated: bool) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    let expr = expr.into();
    let list = list
        .into_iter()
        .map(|item| bind_to(&expr, item.into()))
        .collect();
    Expr::InList {
        expr: Box::new(expr),
        list,
        negated,
    }
}

pub fn in_list<I>(expr: impl Into<Expr>, list: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    in_list_impl(expr, list, false)
}

pub fn not_in_list<I>(expr: impl Into<Expr>, list: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Expr>,
{
    in_list_impl(expr, list, true)
}

pub fn in_subquery(expr: impl Into<Expr>, query: SelectStatement) -> Expr {
    Expr::InSubquery {
        expr: Box::new(expr.into()),
        query: Box::new(query),
        negated: false,
    }
}

pub fn not_in_subquery(expr: impl Into<Expr>, query: SelectStatement) -> Expr {
    Expr::InSubquery {
        expr: Box::new(expr.into()),
        query: Box::new(query),
        negated: true,
    }
}

pub fn subquery(query: SelectStatement) -> Expr {
    Expr::Subquery(Box::new(query))
}

/// `ANY (source)`, compared against with the usual comparison constructors
pub fn any_of(source: MembershipSource) -> Expr {
    Expr::Quantified {
        quantifier: Quantifier::Any,
        source,
    }
}

/// `ALL (source)`
pub fn all_of(source: MembershipSource) -> Expr {
    Expr::Quantified {
        quantifier: Quantifier::All,
        source,
    }
}

/// Equality over a composite key, one `column = value` per component
///
/// Components keep the column order given here, which is also the order their
/// parameters are bound in. A single-column key yields a plain comparison.
pub fn composite_eq(columns: &[ColumnRef], values: Vec<TypedValue>) -> QueryResult<Expr> {
    if columns.is_empty() || columns.len() != values.len() {
        return Err(QueryError::InvalidCompositeKey {
            columns: columns.len(),
            values: values.len(),
        });
    }

    let mut comparisons = columns
        .iter()
        .zip(values)
        .map(|(column, value)| eq(Expr::Column(column.clone()), Expr::Parameter(value)));

    let first = comparisons
        .next()
        .ok_or(QueryError::InvalidCompositeKey {
            columns: 0,
            values: 0,
        })?;
    Ok(comparisons.fold(first, |acc, next| compound(LogicalOp::And, acc, next)))
}

/// Starts a searched `CASE WHEN cond THEN result ... END`
pub fn case() -> CaseBuilder {
    CaseBuilder::default()
}

/// Starts a simple `CASE value WHEN match THEN result ... END`
pub fn case_value(value: impl Into<Expr>) -> CaseBuilder {
    CaseBuilder {
        value: Some(value.into()),
        ..CaseBuilder::default()
    }
}

/// Builder for [`Expr::Case`]
#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    value: Option<Expr>,
    branches: Vec<(Expr, Expr)>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: impl Into<Expr>, result: impl Into<Expr>) -> Self {
        self.branches.push((condition.into(), result.into()));
        self
    }

    /// Finishes with an `ELSE` branch
    pub fn otherwise(self, default: impl Into<Expr>) -> QueryResult<Expr> {
        self.finish(Some(default.into()))
    }

    /// Finishes without an `ELSE` branch
    pub fn end(self) -> QueryResult<Expr> {
        self.finish(None)
    }

    fn finish(self, default: Option<Expr>) -> QueryResult<Expr> {
        if self.branches.is_empty() {
            return Err(QueryError::EmptyCase);
        }
        Ok(Expr::Case {
            value: self.value.map(Box::new),
            branches: self.branches,
            default: default.map(Box::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn id() -> Expr {
        col("t", "id", ColumnType::Integer)
    }

    #[test]
    fn test_and_splices_both_sides() {
        let a = eq(id(), 1);
        let b = eq(id(), 2);
        let c = eq(id(), 3);
        let d = eq(id(), 4);

        let left = and(a.clone(), b.clone());
        let right = and(c.clone(), d.clone());
        match and(left, right) {
            Expr::Compound { op, operands } => {
                assert_eq!(op, LogicalOp::And);
                assert_eq!(operands, vec![a, b, c, d]);
            }
            other => panic!("expected compound, got {other:?}"),
        }
    }

    #[test]
    fn test_and_does_not_splice_or() {
        let a = eq(id(), 1);
        let b = eq(id(), 2);
        let c = eq(id(), 3);

        match and(or(a, b), c) {
            Expr::Compound { operands, .. } => {
                assert_eq!(operands.len(), 2);
                assert!(operands[0].is_compound(LogicalOp::Or));
            }
            other => panic!("expected compound, got {other:?}"),
        }
    }

    #[test]
    fn test_flattening_is_shallow() {
        let inner = and(eq(id(), 1), eq(id(), 2));
        let wrapped = not(inner.clone());
        match and(wrapped.clone(), eq(id(), 3)) {
            Expr::Compound { operands, .. } => assert_eq!(operands[0], wrapped),
            other => panic!("expected compound, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_value_takes_column_type() {
        let short = col("t", "code", ColumnType::Short);
        match eq(short, 7) {
            Expr::Comparison { right, .. } => {
                assert_eq!(
                    *right,
                    Expr::Parameter(TypedValue::new(ColumnType::Short, Value::Int(7)))
                );
            }
            other => panic!("expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_and_all() {
        assert!(and_all(Vec::new()).is_none());
        let single = and_all(vec![eq(id(), 1)]).unwrap();
        assert!(matches!(single, Expr::Comparison { .. }));
        let many = and_all(vec![eq(id(), 1), eq(id(), 2), eq(id(), 3)]).unwrap();
        match many {
            Expr::Compound { operands, .. } => assert_eq!(operands.len(), 3),
            other => panic!("expected compound, got {other:?}"),
        }
    }

    #[test]
    fn test_composite_eq() {
        let columns = vec![
            ColumnRef::new("a", ColumnType::Integer).with_table("k"),
            ColumnRef::new("b", ColumnType::Text).with_table("k"),
        ];
        let expr = composite_eq(&columns, vec![1.into(), "x".into()]).unwrap();
        match expr {
            Expr::Compound { op, operands } => {
                assert_eq!(op, LogicalOp::And);
                assert_eq!(operands.len(), 2);
            }
            other => panic!("expected compound, got {other:?}"),
        }

        let err = composite_eq(&columns, vec![1.into()]).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidCompositeKey {
                columns: 2,
                values: 1
            }
        );
    }

    #[test]
    fn test_case_requires_branch() {
        assert_eq!(case().end().unwrap_err(), QueryError::EmptyCase);
        let expr = case().when(is_null(id()), 0).otherwise(1).unwrap();
        assert_eq!(expr.column_type(), ColumnType::Integer);
    }
}
