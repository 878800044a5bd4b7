//! The UTXO unlocking procedure, expressed as a small tagged-opcode
//! program run by a minimal stack machine.

use chain_shared::{ecdsa_verify, hash160, ChainError};
use serde::{Deserialize, Serialize};

/// Opcodes for the fixed unlocking program built by `unlocking_script`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpCode {
    /// Push literal bytes onto the stack.
    PushBytes(Vec<u8>),
    /// Duplicate the top stack item.
    Dup,
    /// Pop the top item, push `ripemd160(sha256(item))`.
    Hash160,
    /// Pop two items; abort (script fails) if they differ.
    EqualVerify,
    /// Pop the public key then the signature; verify the signature
    /// against the public key bytes used as both message and key, push
    /// the boolean result.
    CheckSig,
}

/// Builds the fixed unlocking program: push the signature and public key,
/// duplicate and hash the key, compare against the UTXO's stored
/// public-key hash, then check the signature.
#[must_use]
pub fn unlocking_script(signature: &[u8], public_key_bytes: &[u8], stored_pubkey_hash: &[u8; 20]) -> Vec<OpCode> {
    vec![
        OpCode::PushBytes(signature.to_vec()),
        OpCode::PushBytes(public_key_bytes.to_vec()),
        OpCode::Dup,
        OpCode::Hash160,
        OpCode::PushBytes(stored_pubkey_hash.to_vec()),
        OpCode::EqualVerify,
        OpCode::CheckSig,
    ]
}

/// A minimal stack machine executing `OpCode` programs.
#[derive(Debug, Default)]
pub struct ScriptVm {
    stack: Vec<Vec<u8>>,
}

impl ScriptVm {
    #[must_use]
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn pop(&mut self) -> Result<Vec<u8>, ChainError> {
        self.stack
            .pop()
            .ok_or_else(|| ChainError::invariant("script stack underflow"))
    }

    /// Executes `ops` to completion. Returns `Ok(true)` iff the program
    /// ran without an `EqualVerify` mismatch and the final `CheckSig` succeeded.
    ///
    /// # Errors
    ///
    /// Returns `ChainError` for structural failures (stack underflow,
    /// malformed signature/key bytes); a failing comparison returns
    /// `Ok(false)` rather than erroring.
    pub fn execute(&mut self, ops: &[OpCode]) -> Result<bool, ChainError> {
        for op in ops {
            match op {
                OpCode::PushBytes(bytes) => self.stack.push(bytes.clone()),
                OpCode::Dup => {
                    let top = self
                        .stack
                        .last()
                        .cloned()
                        .ok_or_else(|| ChainError::invariant("script stack underflow"))?;
                    self.stack.push(top);
                }
                OpCode::Hash160 => {
                    let top = self.pop()?;
                    self.stack.push(hash160(&top).to_vec());
                }
                OpCode::EqualVerify => {
                    let a = self.pop()?;
                    let b = self.pop()?;
                    if a != b {
                        return Ok(false);
                    }
                }
                OpCode::CheckSig => {
                    let public_key = self.pop()?;
                    let signature = self.pop()?;
                    let ok = ecdsa_verify(&public_key, &signature, &public_key)?;
                    return Ok(ok);
                }
            }
        }
        Ok(false)
    }
}

/// Runs the fixed unlocking program for one UTXO. Returns `true` iff the
/// presented key hashes to the UTXO's stored hash and the signature
/// verifies against that key used as its own message.
pub fn unlock(signature: &[u8], public_key_bytes: &[u8], stored_pubkey_hash: &[u8; 20]) -> Result<bool, ChainError> {
    let ops = unlocking_script(signature, public_key_bytes, stored_pubkey_hash);
    ScriptVm::new().execute(&ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_shared::KeyPair;

    #[test]
    fn test_unlock_succeeds_for_the_rightful_owner() {
        let keypair = KeyPair::generate();
        let pk_bytes = keypair.public_key().as_bytes().to_vec();
        let pk_hash = keypair.public_key().public_key_hash();
        let signature = keypair.sign(&pk_bytes).0;

        assert!(unlock(&signature, &pk_bytes, &pk_hash).unwrap());
    }

    #[test]
    fn test_unlock_fails_when_pubkey_hash_does_not_match() {
        let keypair = KeyPair::generate();
        let pk_bytes = keypair.public_key().as_bytes().to_vec();
        let signature = keypair.sign(&pk_bytes).0;

        assert!(!unlock(&signature, &pk_bytes, &[0u8; 20]).unwrap());
    }

    #[test]
    fn test_unlock_fails_for_a_signature_from_a_different_key() {
        let owner = KeyPair::generate();
        let impostor = KeyPair::generate();
        let pk_bytes = owner.public_key().as_bytes().to_vec();
        let pk_hash = owner.public_key().public_key_hash();
        let wrong_signature = impostor.sign(&pk_bytes).0;

        assert!(!unlock(&wrong_signature, &pk_bytes, &pk_hash).unwrap());
    }
}
