//! Error types for `virtuepai-core`.
//!
//! Codec errors describe what was wrong with the input shape. They never carry
//! key material, plaintext, or partially decrypted bytes.

/// Errors from the credential codec.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// The configured key is not 32 raw bytes or 64 hex characters.
    #[error("invalid encryption key: {reason}")]
    InvalidKey { reason: String },

    /// The encoded value has no `:` between IV and ciphertext.
    #[error("encoded value is missing the ':' separator")]
    MissingSeparator,

    /// One of the two segments is not valid hexadecimal.
    #[error("{segment} segment is not valid hex")]
    InvalidHex { segment: &'static str },

    /// The IV segment does not decode to a full AES block.
    #[error("iv must be {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    /// The ciphertext is empty or not a whole number of AES blocks.
    #[error("ciphertext length {actual} is not a non-zero multiple of {block}")]
    InvalidCiphertextLength { block: usize, actual: usize },

    /// Padding check failed: wrong key or corrupted ciphertext.
    #[error("decryption failed")]
    Decryption,

    /// Decryption succeeded but the plaintext is not UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    InvalidUtf8,
}
