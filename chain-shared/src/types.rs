//! Shared type aliases and the validated network configuration surface.

use crate::error::ChainError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Amount of currency locked in a UTXO.
pub type Amount = u64;

/// Nanosecond-resolution timestamp, signed so it serializes identically
/// regardless of sign.
pub type Timestamp = i64;

/// Index of a block in the chain; genesis is height 0.
pub type BlockHeight = u64;

/// The sub-second nanosecond component of the current wall-clock time.
#[must_use]
pub fn current_timestamp() -> Timestamp {
    i64::from(Utc::now().timestamp_subsec_nanos())
}

/// The four recognized configuration options, validated at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub account_number: usize,
    pub init_amount: u64,
    pub max_transaction_count: usize,
    pub difficulty: u32,
}

impl NetworkConfig {
    /// Builds a configuration, rejecting account/pool/amount combinations
    /// that could never produce a sound run.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Configuration` describing the first invalid
    /// option found.
    pub fn new(
        account_number: usize,
        init_amount: u64,
        max_transaction_count: usize,
        difficulty: u32,
    ) -> Result<Self, ChainError> {
        if account_number < 2 {
            return Err(ChainError::configuration(format!(
                "account_number must be at least 2, got {account_number}"
            )));
        }
        if max_transaction_count < 1 {
            return Err(ChainError::configuration(format!(
                "max_transaction_count must be at least 1, got {max_transaction_count}"
            )));
        }
        if init_amount < 1 {
            return Err(ChainError::configuration(format!(
                "init_amount must be at least 1, got {init_amount}"
            )));
        }
        Ok(Self {
            account_number,
            init_amount,
            max_transaction_count,
            difficulty,
        })
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            account_number: 4,
            init_amount: 1000,
            max_transaction_count: 2,
            difficulty: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_fewer_than_two_accounts() {
        assert!(NetworkConfig::new(1, 100, 1, 1).is_err());
    }

    #[test]
    fn test_rejects_zero_capacity_pool() {
        assert!(NetworkConfig::new(2, 100, 0, 1).is_err());
    }

    #[test]
    fn test_rejects_zero_init_amount() {
        assert!(NetworkConfig::new(2, 0, 1, 1).is_err());
    }

    #[test]
    fn test_accepts_a_sane_configuration() {
        let config = NetworkConfig::new(4, 1000, 2, 2).unwrap();
        assert_eq!(config.account_number, 4);
        assert_eq!(config.difficulty, 2);
    }
}
