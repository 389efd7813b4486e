//! Encryption layer for readguard.
//!
//! Provides content protection using:
//! - PBKDF2-HMAC-SHA256 (or Argon2id) for key derivation
//! - AES-256-GCM for authenticated encryption
//! - Secure key handling with zeroization
//!
//! # Device-bound keys
//!
//! Keys are derived from `password | device fingerprint`. Nothing is ever
//! stored: the same inputs always re-derive the same key, so a package
//! encrypted today can be opened weeks later on the same device with the
//! same password, and on no other device.
//!
//! The live reading path uses the same derivation with a per-session
//! random token in place of the password (see [`derive_session_key`]).

mod cipher;
mod error;
mod key;
mod password;
mod token;

pub use cipher::{decrypt, encrypt, Iv, IV_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    derive_key, derive_session_key, EncryptionKey, KdfParams, Salt, APPLICATION_SALT, KEY_SIZE,
    MAX_ARGON2_ITERATIONS, MAX_ARGON2_MEMORY_KIB, MAX_ARGON2_PARALLELISM, MAX_PBKDF2_ITERATIONS,
    MIN_PBKDF2_ITERATIONS, SALT_SIZE,
};
pub use password::{
    generate_password, generate_password_with_length, PASSWORD_ALPHABET, PASSWORD_LENGTH,
};
pub use token::SessionToken;
