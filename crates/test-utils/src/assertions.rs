// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL-specific test helpers and custom assertions

use unified_sql_ir::{ColumnType, Value};
use unified_sql_render::{PLACEHOLDER, RenderedSql};

/// Custom assertion helpers for rendered SQL
pub struct SqlAssertions;

impl SqlAssertions {
    /// Collapse runs of whitespace to single spaces
    pub fn normalize(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Assert two statements are equal up to whitespace
    pub fn assert_sql_eq(actual: &str, expected: &str) {
        assert_eq!(
            Self::normalize(actual),
            Self::normalize(expected),
            "SQL mismatch"
        );
    }

    /// Placeholders in `sql`, ignoring those inside quoted strings
    pub fn count_placeholders(sql: &str) -> usize {
        let mut count = 0;
        let mut in_string = false;
        for ch in sql.chars() {
            match ch {
                '\'' => in_string = !in_string,
                c if !in_string && PLACEHOLDER.starts_with(c) => count += 1,
                _ => {}
            }
        }
        count
    }

    /// Assert every placeholder has exactly one bound parameter
    pub fn assert_placeholders_match(rendered: &RenderedSql) {
        assert_eq!(
            Self::count_placeholders(&rendered.sql),
            rendered.parameters.len(),
            "placeholder count differs from parameter count in: {}",
            rendered.sql
        );
    }

    /// Assert the bound parameters, in order
    pub fn assert_parameters(rendered: &RenderedSql, expected: &[(ColumnType, Value)]) {
        Self::assert_placeholders_match(rendered);
        let actual: Vec<(ColumnType, Value)> = rendered
            .parameters
            .iter()
            .map(|p| (p.column_type.clone(), p.value.clone()))
            .collect();
        assert_eq!(actual, expected, "parameter mismatch for: {}", rendered.sql);
    }

    /// Assert no value was bound and no placeholder emitted
    pub fn assert_no_parameters(rendered: &RenderedSql) {
        assert!(
            rendered.parameters.is_empty(),
            "expected no parameters, found {:?}",
            rendered.parameters
        );
        assert_eq!(Self::count_placeholders(&rendered.sql), 0, "{}", rendered.sql);
    }
}
