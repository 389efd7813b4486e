//! Live reading-session tokens.

use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

const TOKEN_BYTES: usize = 32;

/// Random high-entropy token identifying one live reading session.
///
/// Held in memory only; the `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generates 256 bits of randomness, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        bytes.zeroize();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, suitable for watermark payloads and logs.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({}…)", self.short())
    }
}
