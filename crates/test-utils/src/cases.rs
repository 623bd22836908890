// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! YAML dialect case suites
//!
//! A suite lists named cases with the SQL each dialect is expected to render,
//! or the error category it is expected to fail with. The statement itself is
//! built in Rust and looked up by case name.
//!
//! ```yaml
//! name: paging
//! cases:
//!   - name: limit_only
//!     expected:
//!       oracle: "SELECT t.id FROM t OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
//!       sqlserver: { error: DialectCapability }
//!       others: "SELECT t.id FROM t LIMIT 10"
//! ```
//!
//! Keys are vendor prefixes (`mysql`, `postgresql`, ...). `others` covers
//! every dialect not listed explicitly.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unified_sql_ir::Dialect;

/// Key that applies to every dialect without its own entry
const OTHERS: &str = "others";

/// A named collection of cases
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaseSuite {
    pub name: String,
    pub cases: Vec<DialectCase>,
}

/// Expected output of one statement across dialects
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DialectCase {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Vendor prefix (or `others`) to expectation
    pub expected: BTreeMap<String, Expectation>,
}

/// Rendered SQL or a failure category
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Expectation {
    Sql(String),
    /// Error kind name, as printed by `ErrorKind`'s `Debug`
    Error { error: String },
}

/// Case loading errors
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown dialect key '{key}' in case '{case}'")]
    UnknownDialect { case: String, key: String },

    #[error("No case named '{0}'")]
    MissingCase(String),

    #[error("Case '{case}' has no expectation for {dialect}")]
    MissingExpectation { case: String, dialect: Dialect },

    #[error("Duplicate case name '{0}'")]
    DuplicateCase(String),
}

/// Dialect for a vendor prefix
pub fn parse_dialect(key: &str) -> Option<Dialect> {
    let key = key.trim().to_ascii_lowercase();
    Dialect::ALL.into_iter().find(|d| d.vendor_prefix() == key)
}

impl CaseSuite {
    /// Parse and check a suite
    pub fn from_yaml(yaml: &str) -> Result<Self, CaseError> {
        let suite: CaseSuite = serde_yaml::from_str(yaml)?;
        suite.check()?;
        Ok(suite)
    }

    /// Parse and check a suite file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn case(&self, name: &str) -> Result<&DialectCase, CaseError> {
        self.cases
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CaseError::MissingCase(name.to_string()))
    }

    fn check(&self) -> Result<(), CaseError> {
        let mut seen = std::collections::HashSet::new();
        for case in &self.cases {
            if !seen.insert(case.name.as_str()) {
                return Err(CaseError::DuplicateCase(case.name.clone()));
            }
            for key in case.expected.keys() {
                if key != OTHERS && parse_dialect(key).is_none() {
                    return Err(CaseError::UnknownDialect {
                        case: case.name.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl DialectCase {
    /// Expectation for one dialect, falling back to `others`
    pub fn expectation(&self, dialect: Dialect) -> Result<&Expectation, CaseError> {
        self.expected
            .iter()
            .find(|(key, _)| parse_dialect(key) == Some(dialect))
            .or_else(|| self.expected.get_key_value(OTHERS))
            .map(|(_, expectation)| expectation)
            .ok_or_else(|| CaseError::MissingExpectation {
                case: self.name.clone(),
                dialect,
            })
    }

    /// Expectation for every dialect, in `Dialect::ALL` order
    pub fn expectations(&self) -> Result<Vec<(Dialect, &Expectation)>, CaseError> {
        Dialect::ALL
            .into_iter()
            .map(|dialect| self.expectation(dialect).map(|e| (dialect, e)))
            .collect()
    }
}
