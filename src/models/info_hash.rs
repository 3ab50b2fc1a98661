use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a SHA-1 info-hash in bytes.
pub const INFO_HASH_LEN: usize = 20;

/// Length of the hex representation of an info-hash.
pub const INFO_HASH_HEX_LEN: usize = INFO_HASH_LEN * 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InfoHashError {
    #[error("expected {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// 20-byte torrent identifier
///
/// Parsed from exactly 40 hex characters (either case), displayed as
/// lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoHash([u8; INFO_HASH_LEN]);

impl InfoHash {
    pub const fn new(bytes: [u8; INFO_HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(input: &str) -> Result<Self, InfoHashError> {
        // Length is checked on bytes so multi-byte characters can't sneak past.
        if input.len() != INFO_HASH_HEX_LEN {
            return Err(InfoHashError::InvalidLength {
                expected: INFO_HASH_HEX_LEN,
                actual: input.len(),
            });
        }

        let mut bytes = [0u8; INFO_HASH_LEN];
        hex::decode_to_slice(input, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; INFO_HASH_LEN] {
        &self.0
    }
}

impl FromStr for InfoHash {
    type Err = InfoHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; INFO_HASH_LEN]> for InfoHash {
    fn from(bytes: [u8; INFO_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}
