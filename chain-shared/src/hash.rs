use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 256-bit hash used for transaction ids, block ids and Merkle nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes SHA-256 of the provided bytes.
    #[must_use]
    pub fn sha256(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Self(hash)
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<String> for Hash256 {
    fn from(hex_string: String) -> Self {
        let bytes = hex::decode(hex_string).expect("invalid hex string");
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Self(hash)
    }
}

/// SHA-256 of UTF-8 bytes, returned as lowercase hex.
#[must_use]
pub fn sha256_hex(s: &str) -> String {
    Hash256::sha256(s.as_bytes()).to_hex()
}

/// SHA-256 of two hex-encoded hashes concatenated as strings.
#[must_use]
pub fn sha256_hex_concat(left: &str, right: &str) -> String {
    let mut joined = String::with_capacity(left.len() + right.len());
    joined.push_str(left);
    joined.push_str(right);
    sha256_hex(&joined)
}

/// RIPEMD-160 of the provided bytes.
#[must_use]
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    use ripemd::Ripemd160;
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut out = [0u8; 20];
    out.copy_from_slice(&result);
    out
}

/// `ripemd160(sha256(data))`, the public-key-hash construction.
#[must_use]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&Hash256::sha256(data).0)
}

/// A string of `difficulty` `'0'` characters.
#[must_use]
pub fn hash_prefix_target(difficulty: u32) -> String {
    "0".repeat(difficulty as usize)
}

/// True iff `hash_hex` begins with `difficulty` leading hex zeros.
#[must_use]
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    hash_hex.starts_with(&hash_prefix_target(difficulty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hash_displays_as_64_zero_digits() {
        let hash = Hash256::zero();
        assert_eq!(hash.to_string(), "0".repeat(64));
    }

    #[test]
    fn test_sha256_of_distinct_input_is_nonzero() {
        let hash = Hash256::sha256(b"hello world");
        assert_ne!(hash, Hash256::zero());
    }

    #[test]
    fn test_difficulty_check() {
        assert!(meets_difficulty("000abc", 3));
        assert!(!meets_difficulty("00fabc", 3));
        assert!(meets_difficulty("anything", 0));
    }

    #[test]
    fn test_hash160_matches_ripemd_of_sha256() {
        let data = b"a public key";
        let expected = ripemd160(&Hash256::sha256(data).0);
        assert_eq!(hash160(data), expected);
    }
}
