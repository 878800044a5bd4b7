use thiserror::Error;

/// The crate-wide error taxonomy.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("not found")]
    NotFound,

    #[error("invalid hash")]
    InvalidHash,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("cryptographic error: {0}")]
    CryptographicError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl ChainError {
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_error_carries_its_message() {
        let err = ChainError::invariant("double spend on utxo 3");
        assert_eq!(err.to_string(), "invariant violated: double spend on utxo 3");
    }

    #[test]
    fn test_configuration_error_carries_its_message() {
        let err = ChainError::configuration("difficulty must be >= 0");
        assert_eq!(err.to_string(), "configuration error: difficulty must be >= 0");
    }
}
