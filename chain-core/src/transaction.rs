use crate::utxo::Utxo;
use chain_shared::{ecdsa_verify, sha256_hex, ChainError};
use serde::{Deserialize, Serialize};

/// Joins UTXOs' canonical forms with newlines.
fn join_utxos(utxos: &[Utxo]) -> String {
    utxos
        .iter()
        .map(Utxo::canonical)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The payload signed by the sender: input list then output list, each
/// rendered through each UTXO's canonical form.
#[must_use]
pub fn signing_payload(in_utxo: &[Utxo], out_utxo: &[Utxo]) -> String {
    format!("inUTXO={},outUTXO={}", join_utxos(in_utxo), join_utxos(out_utxo))
}

/// A transfer of value: consumes `in_utxo` (empty only for genesis),
/// mints `out_utxo`, signed by `signer_public_key`'s owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub in_utxo: Vec<Utxo>,
    pub out_utxo: Vec<Utxo>,
    pub signer_public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub timestamp: i64,
}

impl Transaction {
    #[must_use]
    pub fn new(
        in_utxo: Vec<Utxo>,
        out_utxo: Vec<Utxo>,
        signer_public_key: Vec<u8>,
        signature: Vec<u8>,
        timestamp: i64,
    ) -> Self {
        Self {
            in_utxo,
            out_utxo,
            signer_public_key,
            signature,
            timestamp,
        }
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.in_utxo.is_empty()
    }

    #[must_use]
    pub fn total_in(&self) -> u64 {
        self.in_utxo.iter().map(|u| u.amount).sum()
    }

    #[must_use]
    pub fn total_out(&self) -> u64 {
        self.out_utxo.iter().map(|u| u.amount).sum()
    }

    /// The canonical textual form this transaction's hash is computed over.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!(
            "Transaction{{inUTXO={}, outUTXO={}, sendSign={}, sendPublicKey={}, timestamp={}}}",
            join_utxos(&self.in_utxo),
            join_utxos(&self.out_utxo),
            hex::encode(&self.signature),
            hex::encode(&self.signer_public_key),
            self.timestamp
        )
    }

    #[must_use]
    pub fn hash_hex(&self) -> String {
        sha256_hex(&self.canonical())
    }

    /// Non-genesis transactions must conserve value and carry a non-empty output list.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Invariant` if outputs are empty, or if a
    /// non-genesis transaction's inputs and outputs don't sum equal.
    pub fn validate_basic(&self) -> Result<(), ChainError> {
        if self.out_utxo.is_empty() {
            return Err(ChainError::invariant("transaction has no outputs"));
        }
        if !self.is_genesis() && self.total_in() != self.total_out() {
            return Err(ChainError::invariant(format!(
                "transaction does not conserve value: in={} out={}",
                self.total_in(),
                self.total_out()
            )));
        }
        Ok(())
    }

    /// Re-runs `ecdsa_verify` over the signed payload.
    ///
    /// # Errors
    ///
    /// Propagates structural crypto errors (malformed key/signature).
    pub fn verify_signature(&self) -> Result<bool, ChainError> {
        let payload = signing_payload(&self.in_utxo, &self.out_utxo);
        ecdsa_verify(payload.as_bytes(), &self.signature, &self.signer_public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_shared::KeyPair;

    fn signed_transaction(in_utxo: Vec<Utxo>, out_utxo: Vec<Utxo>, signer: &KeyPair) -> Transaction {
        let payload = signing_payload(&in_utxo, &out_utxo);
        let signature = signer.sign(payload.as_bytes()).0;
        Transaction::new(in_utxo, out_utxo, signer.public_key().as_bytes().to_vec(), signature, 1)
    }

    #[test]
    fn test_genesis_transaction_has_no_inputs() {
        let tx = Transaction::new(vec![], vec![Utxo::new("a".into(), 100, [0u8; 20])], vec![], vec![], 0);
        assert!(tx.is_genesis());
        assert!(tx.validate_basic().is_ok());
    }

    #[test]
    fn test_ordinary_transaction_must_conserve_value() {
        let signer = KeyPair::generate();
        let pkh = signer.public_key().public_key_hash();
        let in_utxo = vec![Utxo::new("a".into(), 100, pkh)];
        let out_utxo = vec![Utxo::new("b".into(), 100, [1u8; 20])];
        let tx = signed_transaction(in_utxo, out_utxo, &signer);
        assert!(tx.validate_basic().is_ok());
    }

    #[test]
    fn test_value_mismatch_is_rejected() {
        let signer = KeyPair::generate();
        let pkh = signer.public_key().public_key_hash();
        let in_utxo = vec![Utxo::new("a".into(), 100, pkh)];
        let out_utxo = vec![Utxo::new("b".into(), 999, [1u8; 20])];
        let tx = signed_transaction(in_utxo, out_utxo, &signer);
        assert!(tx.validate_basic().is_err());
    }

    #[test]
    fn test_signature_verifies_over_the_canonical_payload() {
        let signer = KeyPair::generate();
        let pkh = signer.public_key().public_key_hash();
        let in_utxo = vec![Utxo::new("a".into(), 50, pkh)];
        let out_utxo = vec![Utxo::new("b".into(), 50, [2u8; 20])];
        let tx = signed_transaction(in_utxo, out_utxo, &signer);
        assert!(tx.verify_signature().unwrap());
    }

    #[test]
    fn test_tampering_with_amount_breaks_signature_verification() {
        let signer = KeyPair::generate();
        let pkh = signer.public_key().public_key_hash();
        let in_utxo = vec![Utxo::new("a".into(), 50, pkh)];
        let out_utxo = vec![Utxo::new("b".into(), 50, [2u8; 20])];
        let mut tx = signed_transaction(in_utxo, out_utxo, &signer);
        tx.out_utxo[0].amount = 999;
        assert!(!tx.verify_signature().unwrap());
    }
}
