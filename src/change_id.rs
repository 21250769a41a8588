use derive_more::{AsRef, Constructor, Deref, Display, From, Into};

/// A Gerrit change ID.
///
/// In practice this is a string starting with `I` and followed by 40 hex characters, but nothing
/// here depends on that shape. The value is kept exactly as it was written; use
/// [`ChangeId::match_key`] to compare IDs the way Gerrit does.
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
    From,
    AsRef,
    Deref,
    Constructor,
)]
#[serde(transparent)]
pub struct ChangeId(String);

impl ChangeId {
    /// A key which is equal for two IDs exactly when they're equal ignoring ASCII case.
    pub fn match_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl From<&str> for ChangeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
