//! Credential codec for secrets kept in configuration.
//!
//! Encrypts short secrets (the outbound mail password) so they can sit in an
//! environment file without being readable at a glance.
//!
//! # Format
//!
//! - AES-256-CBC with PKCS#7 padding.
//! - Every encryption draws a fresh 16-byte IV from `OsRng`.
//! - Encoded form: `hex(iv) ":" hex(ciphertext)`, lowercase hex.
//!
//! CBC is unauthenticated. A wrong key is usually caught by the padding check
//! but not always, so callers should not treat a successful decrypt as proof
//! that the key is right.

use std::fmt;

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CodecError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size, which is also the IV length.
const BLOCK_LEN: usize = 16;

/// AES-256 key length.
const KEY_LEN: usize = 32;

/// Separator between the IV and ciphertext segments.
const SEPARATOR: char = ':';

/// A 256-bit codec key that is zeroized on drop.
///
/// The inner bytes are never exposed in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Create a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a new random key using the OS CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse a key from its configuration form.
    ///
    /// Accepts either 64 hex characters or a string of exactly 32 bytes,
    /// which is used verbatim. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKey`] for any other shape.
    pub fn from_config_str(value: &str) -> Result<Self, CodecError> {
        let value = value.trim();

        if value.len() == KEY_LEN * 2 && value.bytes().all(|b| b.is_ascii_hexdigit()) {
            let mut bytes = [0u8; KEY_LEN];
            hex::decode_to_slice(value, &mut bytes).map_err(|e| CodecError::InvalidKey {
                reason: e.to_string(),
            })?;
            return Ok(Self(bytes));
        }

        if value.len() == KEY_LEN {
            let mut bytes = [0u8; KEY_LEN];
            bytes.copy_from_slice(value.as_bytes());
            return Ok(Self(bytes));
        }

        Err(CodecError::InvalidKey {
            reason: format!(
                "expected {} hex characters or {KEY_LEN} bytes, got {} bytes",
                KEY_LEN * 2,
                value.len()
            ),
        })
    }

    /// Borrow the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Encrypts and decrypts configuration secrets under a single key.
#[derive(Debug, Clone)]
pub struct CredentialCodec {
    key: EncryptionKey,
}

impl CredentialCodec {
    #[must_use]
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` into the `iv:ciphertext` hex form.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKey`] only if the cipher rejects the key
    /// length, which the key type rules out.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        let mut iv = [0u8; BLOCK_LEN];
        OsRng.fill_bytes(&mut iv);

        let cipher = Aes256CbcEnc::new_from_slices(self.key.as_bytes(), &iv).map_err(|e| {
            CodecError::InvalidKey {
                reason: e.to_string(),
            }
        })?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        Ok(format!(
            "{}{SEPARATOR}{}",
            hex::encode(iv),
            hex::encode(ciphertext)
        ))
    }

    /// Decrypt a value produced by [`encrypt`](Self::encrypt).
    ///
    /// Failures are logged once at `warn` with the shape problem only.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] describing why the input could not be
    /// decrypted: missing separator, bad hex, wrong IV or ciphertext length,
    /// failed padding check, or non-UTF-8 plaintext.
    pub fn decrypt(&self, encoded: &str) -> Result<String, CodecError> {
        self.decrypt_inner(encoded).inspect_err(|e| {
            warn!(reason = %e, "credential decryption failed");
        })
    }

    fn decrypt_inner(&self, encoded: &str) -> Result<String, CodecError> {
        let (iv_hex, ct_hex) = encoded
            .split_once(SEPARATOR)
            .ok_or(CodecError::MissingSeparator)?;

        let iv = hex::decode(iv_hex).map_err(|_| CodecError::InvalidHex { segment: "iv" })?;
        if iv.len() != BLOCK_LEN {
            return Err(CodecError::InvalidIvLength {
                expected: BLOCK_LEN,
                actual: iv.len(),
            });
        }

        let ciphertext = hex::decode(ct_hex).map_err(|_| CodecError::InvalidHex {
            segment: "ciphertext",
        })?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CodecError::InvalidCiphertextLength {
                block: BLOCK_LEN,
                actual: ciphertext.len(),
            });
        }

        let cipher = Aes256CbcDec::new_from_slices(self.key.as_bytes(), &iv).map_err(|e| {
            CodecError::InvalidKey {
                reason: e.to_string(),
            }
        })?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CodecError::Decryption)?;

        String::from_utf8(plaintext).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            CodecError::InvalidUtf8
        })
    }

    /// Render a ready-to-paste `EMAIL_PASSWORD=<encoded>` configuration line.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`encrypt`](Self::encrypt).
    pub fn encrypted_env_line(&self, password: &str) -> Result<String, CodecError> {
        Ok(format!("EMAIL_PASSWORD={}", self.encrypt(password)?))
    }
}

/// Whether a configuration value is in codec-encoded form.
///
/// Any value containing `:` is treated as encoded; everything else is taken
/// to be plaintext.
#[must_use]
pub fn looks_encoded(value: &str) -> bool {
    value.contains(SEPARATOR)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn codec() -> CredentialCodec {
        CredentialCodec::new(EncryptionKey::generate())
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let codec = codec();
        for plaintext in ["hunter2", "", "邮箱密码 with spaces", "a:b:c", "exactly16bytes!!"] {
            let encoded = codec.encrypt(plaintext).unwrap();
            assert_eq!(codec.decrypt(&encoded).unwrap(), plaintext);
        }
    }

    #[test]
    fn encoded_form_is_hex_iv_colon_hex_ciphertext() {
        let encoded = codec().encrypt("password").unwrap();
        let (iv, ct) = encoded.split_once(':').unwrap();
        assert_eq!(iv.len(), 32);
        assert!(iv.bytes().all(|b| b.is_ascii_hexdigit()));
        // 8 bytes of plaintext pad to one block.
        assert_eq!(ct.len(), 32);
    }

    #[test]
    fn block_aligned_plaintext_gets_a_full_padding_block() {
        let encoded = codec().encrypt("0123456789abcdef").unwrap();
        let (_, ct) = encoded.split_once(':').unwrap();
        assert_eq!(ct.len(), 64);
    }

    #[test]
    fn two_encryptions_produce_different_output() {
        let codec = codec();
        let a = codec.encrypt("same").unwrap();
        let b = codec.encrypt("same").unwrap();
        assert_ne!(a, b);
        assert_eq!(codec.decrypt(&a).unwrap(), "same");
        assert_eq!(codec.decrypt(&b).unwrap(), "same");
    }

    #[test]
    fn decrypt_rejects_missing_separator() {
        let codec = codec();
        assert_eq!(codec.decrypt("not-valid"), Err(CodecError::MissingSeparator));
        assert_eq!(codec.decrypt(""), Err(CodecError::MissingSeparator));
    }

    #[test]
    fn decrypt_rejects_bad_hex() {
        let codec = codec();
        assert_eq!(
            codec.decrypt("zz:00"),
            Err(CodecError::InvalidHex { segment: "iv" })
        );
        let iv = "00".repeat(16);
        assert_eq!(
            codec.decrypt(&format!("{iv}:xyz")),
            Err(CodecError::InvalidHex {
                segment: "ciphertext"
            })
        );
    }

    #[test]
    fn decrypt_rejects_wrong_segment_lengths() {
        let codec = codec();
        assert_eq!(
            codec.decrypt(&format!("{}:{}", "00".repeat(8), "00".repeat(16))),
            Err(CodecError::InvalidIvLength {
                expected: 16,
                actual: 8
            })
        );
        assert_eq!(
            codec.decrypt(&format!("{}:{}", "00".repeat(16), "00".repeat(15))),
            Err(CodecError::InvalidCiphertextLength {
                block: 16,
                actual: 15
            })
        );
        assert_eq!(
            codec.decrypt(&format!("{}:", "00".repeat(16))),
            Err(CodecError::InvalidCiphertextLength {
                block: 16,
                actual: 0
            })
        );
    }

    #[test]
    fn decrypt_with_wrong_key_never_returns_original() {
        let encoded = codec().encrypt("mail-password").unwrap();
        let other = codec();
        // Unauthenticated CBC: a wrong key almost always fails the padding
        // check, and must never yield the original plaintext.
        assert_ne!(other.decrypt(&encoded).ok().as_deref(), Some("mail-password"));
    }

    #[test]
    fn key_from_hex_config() {
        let hex_key = "ab".repeat(32);
        let key = EncryptionKey::from_config_str(&hex_key).unwrap();
        assert_eq!(key.as_bytes(), &[0xab; 32]);
    }

    #[test]
    fn key_from_raw_32_byte_config() {
        let raw = "a_complex_32_char_encryption_key";
        assert_eq!(raw.len(), 32);
        let key = EncryptionKey::from_config_str(raw).unwrap();
        assert_eq!(key.as_bytes(), raw.as_bytes());
    }

    #[test]
    fn key_from_config_rejects_other_lengths() {
        assert!(matches!(
            EncryptionKey::from_config_str("short"),
            Err(CodecError::InvalidKey { .. })
        ));
        assert!(matches!(
            EncryptionKey::from_config_str(""),
            Err(CodecError::InvalidKey { .. })
        ));
    }

    #[test]
    fn same_key_decrypts_across_codec_instances() {
        let key = EncryptionKey::from_config_str(&"01".repeat(32)).unwrap();
        let encoded = CredentialCodec::new(key.clone()).encrypt("shared").unwrap();
        assert_eq!(CredentialCodec::new(key).decrypt(&encoded).unwrap(), "shared");
    }

    #[test]
    fn encrypted_env_line_decrypts_back() {
        let codec = codec();
        let line = codec.encrypted_env_line("p@ss").unwrap();
        let value = line.strip_prefix("EMAIL_PASSWORD=").unwrap();
        assert!(looks_encoded(value));
        assert_eq!(codec.decrypt(value).unwrap(), "p@ss");
    }

    #[test]
    fn looks_encoded_checks_for_separator() {
        assert!(looks_encoded("aa:bb"));
        assert!(!looks_encoded("plain-password"));
    }

    #[test]
    fn encryption_key_debug_redacts_bytes() {
        let key = EncryptionKey::from_bytes([7u8; 32]);
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains('7'));
    }
}
