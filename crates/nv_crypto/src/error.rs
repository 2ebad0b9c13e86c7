use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("AEAD encryption failed")]
    AeadEncrypt,

    #[error("AEAD decryption failed (authentication tag mismatch, wrong key or tampering)")]
    AeadDecrypt,

    #[error("Malformed ciphertext token: {0}")]
    MalformedToken(String),

    #[error("Unsupported token version {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("Decrypted content is not valid UTF-8")]
    InvalidUtf8,

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Encryption key file '{}' not found. Create it with `nv-cli keygen`.", path.display())]
    KeyMissing { path: PathBuf },

    #[error("Invalid key material in '{}': {reason}", path.display())]
    InvalidKey { path: PathBuf, reason: String },

    #[error("Key file '{}' already exists; refusing to overwrite", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Key file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
