// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Render context for accumulating SQL text and bound parameters
//!
//! The context is the only mutable state of a render pass. Text is appended
//! strictly left to right and every placeholder is registered at the moment
//! it is written, so the Nth `?` in the output always corresponds to the Nth
//! bound parameter.

use serde::{Deserialize, Serialize};
use unified_sql_ir::{ColumnType, Dialect, DriverValue, Expr, Value};

use crate::Render;
use crate::config::RenderConfig;
use crate::convert::ValueTypeStrategy;
use crate::dialect::DialectStrategy;
use crate::error::{RenderError, RenderResult};

/// Placeholder token written for each bound parameter
pub const PLACEHOLDER: &str = "?";

/// How values are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Parameters become `?` placeholders with bound values
    #[default]
    Prepared,
    /// Every value is inlined as a SQL literal
    Literal,
}

/// A value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundParameter {
    pub column_type: ColumnType,
    pub value: Value,
}

/// Output of a render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedSql {
    pub sql: String,
    pub parameters: Vec<BoundParameter>,
    /// Dialect the text was rendered for
    pub dialect: Dialect,
}

impl RenderedSql {
    /// Parameters encoded for the execution layer, in placeholder order
    pub fn encoded_parameters(&self) -> RenderResult<Vec<DriverValue>> {
        self.parameters
            .iter()
            .map(|p| p.column_type.to_parameter_value(&p.value, self.dialect))
            .collect()
    }
}

/// Context for a single render pass
///
/// The context maintains:
/// - The growing SQL text
/// - Bound parameters in placeholder order
/// - The active dialect strategy and configuration
/// - Nesting depth tracking
pub struct RenderContext<'a> {
    /// Output buffer
    sql: String,

    /// Bound parameters, in the order their placeholders were written
    parameters: Vec<BoundParameter>,

    mode: RenderMode,

    strategy: &'a dyn DialectStrategy,

    config: &'a RenderConfig,

    /// Current nesting depth
    depth: usize,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context
    pub fn new(strategy: &'a dyn DialectStrategy, config: &'a RenderConfig, mode: RenderMode) -> Self {
        Self {
            sql: String::with_capacity(128),
            parameters: Vec::new(),
            mode,
            strategy,
            config,
            depth: 0,
        }
    }

    /// The active dialect strategy
    ///
    /// Returned with the context's lifetime so it can be called with the
    /// context itself as argument.
    pub fn strategy(&self) -> &'a dyn DialectStrategy {
        self.strategy
    }

    pub fn dialect(&self) -> Dialect {
        self.strategy.dialect()
    }

    pub fn config(&self) -> &'a RenderConfig {
        self.config
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// SQL written so far
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[BoundParameter] {
        &self.parameters
    }

    /// Append raw text
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// Append an identifier, quoted if the dialect or configuration needs it
    pub fn append_identifier(&mut self, name: &str) -> &mut Self {
        let quoted = self
            .strategy
            .quote_identifier(name, self.config.quote_all_identifiers);
        self.sql.push_str(&quoted);
        self
    }

    /// Start a major clause (`FROM`, `WHERE`, ...) on a new token or line
    pub fn append_clause(&mut self, keyword: &str) -> &mut Self {
        self.sql.push(if self.config.pretty { '\n' } else { ' ' });
        self.sql.push_str(keyword);
        self
    }

    /// Render a value as a placeholder (prepared mode) or literal
    ///
    /// NULL is bound like any other value in prepared mode.
    pub fn register_parameter(&mut self, column_type: &ColumnType, value: &Value) -> RenderResult<()> {
        match self.mode {
            RenderMode::Prepared => {
                // Reject unconvertible values at the call that introduced them
                column_type.to_parameter_value(value, self.dialect())?;
                self.parameters.push(BoundParameter {
                    column_type: column_type.clone(),
                    value: value.clone(),
                });
                self.sql.push_str(PLACEHOLDER);
                Ok(())
            }
            RenderMode::Literal => self.register_literal(column_type, value),
        }
    }

    /// Render a value inline regardless of mode
    pub fn register_literal(&mut self, column_type: &ColumnType, value: &Value) -> RenderResult<()> {
        let text = column_type.to_literal_text(value, self.dialect())?;
        self.sql.push_str(&text);
        Ok(())
    }

    /// Render any node
    pub fn render<R: Render + ?Sized>(&mut self, node: &R) -> RenderResult<()> {
        node.render(self)
    }

    /// Render an expression nested in another, parenthesized if it needs it
    pub fn render_operand(&mut self, expr: &Expr) -> RenderResult<()> {
        if expr.needs_parens() {
            self.sql.push('(');
            expr.render(self)?;
            self.sql.push(')');
            Ok(())
        } else {
            expr.render(self)
        }
    }

    /// Render items separated by `separator`
    pub fn render_list<T, F>(&mut self, items: &[T], separator: &str, mut render_fn: F) -> RenderResult<()>
    where
        F: FnMut(&mut Self, &T) -> RenderResult<()>,
    {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(separator);
            }
            render_fn(self, item)?;
        }
        Ok(())
    }

    /// Increment nesting depth and check the configured limit
    pub fn enter_nested(&mut self) -> RenderResult<()> {
        self.depth += 1;
        if self.depth > self.config.max_nesting_depth {
            return Err(RenderError::NestingTooDeep {
                depth: self.depth,
                limit: self.config.max_nesting_depth,
            });
        }
        Ok(())
    }

    /// Decrement nesting depth when leaving a nested node
    pub fn exit_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Consume the context and return the rendered text and parameters
    pub fn finish(self) -> RenderedSql {
        RenderedSql {
            sql: self.sql,
            parameters: self.parameters,
            dialect: self.strategy.dialect(),
        }
    }
}
