use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid threshold configuration: {0}")]
    InvalidConfig(String),

    #[error("secret must be 1..=32 bytes with value below the field modulus")]
    InvalidSecret,

    #[error("insufficient shares: have {have}, need {need}")]
    InsufficientShares { have: usize, need: usize },

    #[error("share set is degenerate (duplicate indices): no modular inverse exists")]
    NotInvertible,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("payload canonicalization failed: {0}")]
    Canonicalization(String),
}
