use derive_more::{AsRef, Deref, Display, Into};

use crate::error::InvalidObjectReason;

/// A Git commit hash.
///
/// Always 40 lowercase hex characters.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Into,
    AsRef,
    Deref,
)]
#[serde(transparent)]
pub struct CommitHash(String);

impl CommitHash {
    const LENGTH: usize = 40;

    /// Parse a full hex object name. Uppercase digits are accepted and normalized.
    pub fn parse(hex: &str) -> Result<Self, InvalidObjectReason> {
        if hex.len() != Self::LENGTH || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(InvalidObjectReason::Malformed);
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    /// Get an abbreviated 8-character Git hash.
    pub fn abbrev(&self) -> &str {
        &self.0[..8]
    }
}
