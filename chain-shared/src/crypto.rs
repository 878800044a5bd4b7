//! secp256k1 ECDSA key management, signing, verification and Base58Check
//! address derivation.

use crate::hash::{hash160, Hash256};
use crate::{ChainError, Result};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};

/// An ECDSA/secp256k1 key pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

/// A public key in its uncompressed SEC1 form (`0x04 || X || Y`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

/// A raw `r || s` ECDSA signature, no DER framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBytes(pub Vec<u8>);

impl KeyPair {
    /// Generates a new random keypair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.verifying_key.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    /// Signs `message` with the private key.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        let signature: Signature = self.signing_key.sign(message);
        SignatureBytes(signature.to_bytes().to_vec())
    }
}

impl PublicKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Derives the Base58Check wallet address for this key.
    #[must_use]
    pub fn wallet_address(&self) -> String {
        address_from_public_key_bytes(&self.bytes)
    }

    #[must_use]
    pub fn public_key_hash(&self) -> [u8; 20] {
        hash160(&self.bytes)
    }
}

/// Verifies `signature` against `message` and `public_key_bytes`.
pub fn ecdsa_verify(message: &[u8], signature: &[u8], public_key_bytes: &[u8]) -> Result<bool> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key_bytes)
        .map_err(|e| ChainError::CryptographicError(e.to_string()))?;
    let signature = Signature::from_slice(signature)
        .map_err(|e| ChainError::CryptographicError(e.to_string()))?;
    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Derives the Base58Check wallet address from uncompressed public key bytes.
#[must_use]
pub fn address_from_public_key_bytes(public_key_bytes: &[u8]) -> String {
    let pubkey_hash = hash160(public_key_bytes);
    let mut payload = Vec::with_capacity(1 + 20 + 4);
    payload.push(0x00u8);
    payload.extend_from_slice(&pubkey_hash);
    let checksum = Hash256::sha256(&Hash256::sha256(&payload).as_bytes()[..]);
    payload.extend_from_slice(&checksum.as_bytes()[..4]);
    bs58::encode(payload).into_string()
}

/// Decodes a Base58Check wallet address, verifying its checksum.
pub fn decode_address(address: &str) -> Result<(u8, [u8; 20], [u8; 4])> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| ChainError::CryptographicError(e.to_string()))?;
    if decoded.len() != 25 {
        return Err(ChainError::InvalidKeySize {
            expected: 25,
            actual: decoded.len(),
        });
    }
    let version = decoded[0];
    let mut pubkey_hash = [0u8; 20];
    pubkey_hash.copy_from_slice(&decoded[1..21]);
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&decoded[21..25]);

    let payload = &decoded[0..21];
    let expected_checksum = Hash256::sha256(&Hash256::sha256(payload).as_bytes()[..]);
    if expected_checksum.as_bytes()[..4] != checksum {
        return Err(ChainError::InvalidHash);
    }
    Ok((version, pubkey_hash, checksum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify_round_trips() {
        let keypair = KeyPair::generate();
        let message = b"own my own public key";
        let signature = keypair.sign(message);
        let pk_bytes = keypair.public_key().as_bytes().to_vec();
        assert!(ecdsa_verify(message, &signature.0, &pk_bytes).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_message() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(b"message one");
        let pk_bytes = keypair.public_key().as_bytes().to_vec();
        assert!(!ecdsa_verify(b"message two", &signature.0, &pk_bytes).unwrap());
    }

    #[test]
    fn test_address_round_trips_through_base58check() {
        let keypair = KeyPair::generate();
        let address = keypair.public_key().wallet_address();
        let (version, pubkey_hash, _checksum) = decode_address(&address).unwrap();
        assert_eq!(version, 0x00);
        assert_eq!(pubkey_hash, keypair.public_key().public_key_hash());
    }

    #[test]
    fn test_tampered_address_fails_checksum() {
        let keypair = KeyPair::generate();
        let mut address = keypair.public_key().wallet_address().into_bytes();
        let last = address.len() - 1;
        address[last] = if address[last] == b'1' { b'2' } else { b'1' };
        let address = String::from_utf8(address).unwrap();
        assert!(decode_address(&address).is_err());
    }
}
