pub mod crypto;
pub mod error;
pub mod hash;
pub mod types;

pub use crypto::{address_from_public_key_bytes, decode_address, ecdsa_verify, KeyPair, PublicKey, SignatureBytes};
pub use error::ChainError;
pub use hash::{hash160, hash_prefix_target, meets_difficulty, ripemd160, sha256_hex, sha256_hex_concat, Hash256};
pub use types::{current_timestamp, Amount, BlockHeight, NetworkConfig, Timestamp};

pub type Result<T> = std::result::Result<T, ChainError>;
