// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Render Configuration
//!
//! Knobs that change how SQL text is produced without changing its meaning:
//! - Default [`RenderMode`] (prepared placeholders or inlined literals)
//! - Identifier quoting policy
//! - Nesting limit for expressions and subqueries
//! - Pretty printing (major clauses start on a new line)
//!
//! ## Example
//!
//! ```rust
//! use unified_sql_render::{RenderConfig, RenderMode};
//!
//! let config = RenderConfig::from_json(r#"{ "mode": "literal", "pretty": true }"#).unwrap();
//! assert_eq!(config.mode, RenderMode::Literal);
//! assert!(!config.quote_all_identifiers);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RenderMode;
use crate::error::{RenderError, RenderResult};

/// Default nesting limit for expressions and subqueries
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Mode used when a call does not pass one explicitly
    pub mode: RenderMode,

    /// Quote every identifier, not only those that need it
    pub quote_all_identifiers: bool,

    /// Maximum nesting of expressions and subqueries
    pub max_nesting_depth: usize,

    /// Put each major clause on its own line
    pub pretty: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Prepared,
            quote_all_identifiers: false,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            pretty: false,
        }
    }
}

impl RenderConfig {
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_quote_all_identifiers(mut self, quote_all: bool) -> Self {
        self.quote_all_identifiers = quote_all;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> RenderResult<()> {
        if self.max_nesting_depth == 0 {
            return Err(RenderError::InvalidConfig {
                message: "max_nesting_depth must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON text
    ///
    /// Missing fields take their default values.
    pub fn from_json(text: &str) -> RenderResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| RenderError::InvalidConfig {
            message: e.to_string(),
        })?;
        Self::from_json_value(value)
    }

    /// Build and validate a configuration from an already parsed JSON value
    pub fn from_json_value(value: Value) -> RenderResult<Self> {
        let config: RenderConfig =
            serde_json::from_value(value).map_err(|e| RenderError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }
}
