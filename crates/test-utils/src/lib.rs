// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for Unified SQL
//!
//! This crate provides common testing components including:
//! - A small shop schema (users, orders, products) with foreign keys
//! - Assertions over rendered SQL and bound parameters
//! - A YAML loader for per-dialect expectation suites

pub mod assertions;
pub mod cases;
pub mod fixtures;

// Re-exports for convenience
pub use assertions::SqlAssertions;
pub use cases::{CaseError, CaseSuite, DialectCase, Expectation, parse_dialect};
pub use fixtures::ShopSchema;
