use chain_shared::ChainError;
use serde::{Deserialize, Serialize};

/// An amount locked to a public-key hash, spendable exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub wallet_address: String,
    pub amount: u64,
    pub public_key_hash: [u8; 20],
    used: bool,
}

impl Utxo {
    #[must_use]
    pub fn new(wallet_address: String, amount: u64, public_key_hash: [u8; 20]) -> Self {
        Self {
            wallet_address,
            amount,
            public_key_hash,
            used: false,
        }
    }

    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used
    }

    /// Flips the spend flag. Calling this twice on the same UTXO is a double-spend.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Invariant` if the UTXO is already spent.
    pub fn set_used(&mut self) -> Result<(), ChainError> {
        if self.used {
            return Err(ChainError::invariant(format!(
                "utxo for {} already spent",
                self.wallet_address
            )));
        }
        self.used = true;
        Ok(())
    }

    /// Canonical form: `UTXO{walletAddress=<addr>,amount=<n>,publicKeyHash=<hex>}`.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!(
            "UTXO{{walletAddress={},amount={},publicKeyHash={}}}",
            self.wallet_address,
            self.amount,
            hex::encode(self.public_key_hash)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form_matches_the_documented_recipe() {
        let utxo = Utxo::new("1abc".to_string(), 30, [0u8; 20]);
        assert_eq!(
            utxo.canonical(),
            format!(
                "UTXO{{walletAddress=1abc,amount=30,publicKeyHash={}}}",
                "0".repeat(40)
            )
        );
    }

    #[test]
    fn test_set_used_is_idempotent_forbidden() {
        let mut utxo = Utxo::new("addr".to_string(), 10, [1u8; 20]);
        assert!(!utxo.is_used());
        utxo.set_used().unwrap();
        assert!(utxo.is_used());
        assert!(utxo.set_used().is_err());
    }
}
