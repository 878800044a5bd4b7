//! Accounts: a key pair plus its derived wallet address, created once at
//! network construction and immutable thereafter.

use chain_shared::{KeyPair, PublicKey};

/// A participant in the network: a key pair and its derived wallet address.
#[derive(Debug, Clone)]
pub struct Account {
    keypair: KeyPair,
    address: String,
}

impl Account {
    /// Generates a fresh keypair and derives its wallet address.
    #[must_use]
    pub fn new() -> Self {
        let keypair = KeyPair::generate();
        let address = keypair.public_key().wallet_address();
        Self { keypair, address }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    #[must_use]
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.keypair.public_key().as_bytes().to_vec()
    }

    #[must_use]
    pub fn public_key_hash(&self) -> [u8; 20] {
        self.keypair.public_key().public_key_hash()
    }

    /// Signs `message` with this account's private key.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.keypair.sign(message).0
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_shared::ecdsa_verify;

    #[test]
    fn test_two_accounts_have_distinct_addresses() {
        let a = Account::new();
        let b = Account::new();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_account_can_sign_over_its_own_public_key() {
        let account = Account::new();
        let pk_bytes = account.public_key_bytes();
        let signature = account.sign(&pk_bytes);
        assert!(ecdsa_verify(&pk_bytes, &signature, &pk_bytes).unwrap());
    }

    #[test]
    fn test_address_is_derived_from_the_public_key_hash() {
        let account = Account::new();
        assert_eq!(account.public_key().public_key_hash(), account.public_key_hash());
    }
}
