//! Opaque blob tokens

use crate::error::{Result, StoreError};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Random identifier for a stored blob.
///
/// Always 32 lowercase hex characters (16 bytes from the OS RNG), so it can
/// be embedded in a URL path as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Number of random bytes behind each token
    pub const BYTE_LEN: usize = 16;
    /// Length of the hex encoding
    pub const ENCODED_LEN: usize = Self::BYTE_LEN * 2;

    /// Draw a fresh token from the operating system RNG
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; Self::BYTE_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| StoreError::Entropy(e.to_string()))?;
        Ok(Self(hex::encode(bytes)))
    }

    /// Parse a token received from a client (e.g. a URL path segment)
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != Self::ENCODED_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StoreError::InvalidInput(format!("malformed token: {:?}", s)));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Token {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Token {
    type Error = StoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}
