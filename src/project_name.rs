use camino::Utf8Component;
use camino::Utf8Path;
use derive_more::{AsRef, Constructor, Deref, Display, From, Into};

/// The name of a project hosted on Gerrit, e.g. `platform/build`.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    Default,
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
pub struct ProjectName(String);

impl ProjectName {
    /// The project name as a relative path, if it can't escape the directory it's joined onto.
    pub fn as_relative_path(&self) -> Option<&Utf8Path> {
        let path = Utf8Path::new(&self.0);
        let mut components = path.components().peekable();
        components.peek()?;
        components
            .all(|component| matches!(component, Utf8Component::Normal(_)))
            .then_some(path)
    }
}

impl From<&str> for ProjectName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
