// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! H2 rendering
//!
//! H2 follows the standard closely, so every rule comes from the defaults.

use unified_sql_ir::Dialect;

use crate::dialect::DialectStrategy;

/// H2 strategy (2.x)
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Strategy;

impl H2Strategy {
    pub fn new() -> Self {
        Self
    }
}

impl DialectStrategy for H2Strategy {
    fn dialect(&self) -> Dialect {
        Dialect::H2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unified_sql_ir::{JoinType, LockMode};

    #[test]
    fn test_h2_capabilities() {
        let strategy = H2Strategy::new();
        assert_eq!(strategy.always_true(), "TRUE");
        assert!(!strategy.requires_dual());
        assert_eq!(strategy.join_keyword(JoinType::Full).unwrap(), "FULL JOIN");
        assert_eq!(strategy.lock_clause(LockMode::ForUpdate).unwrap(), "FOR UPDATE");
        assert!(strategy.lock_clause(LockMode::ForUpdateSkipLocked).is_err());
    }
}
