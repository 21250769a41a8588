use std::collections::BTreeMap;

use crate::change_id::ChangeId;
use crate::commit_message::Revision;
use crate::project_name::ProjectName;

/// A change, as returned by the Gerrit REST API with `CURRENT_REVISION` and `CURRENT_COMMIT`.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct ChangeInfo {
    pub project: ProjectName,
    pub branch: String,
    pub change_id: ChangeId,
    pub subject: Option<String>,
    pub current_revision: Option<String>,
    /// Revisions by commit hash. Usually only contains the current revision.
    #[serde(default)]
    pub revisions: BTreeMap<String, RevisionInfo>,
}

impl ChangeInfo {
    /// The change's current revision, if its commit was loaded.
    pub fn current_revision(&self) -> Option<Revision> {
        let current = self.current_revision.as_deref()?;
        let commit = self.revisions.get(current)?.commit.clone()?;
        Some(Revision::Loaded(commit))
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct RevisionInfo {
    #[serde(rename = "_number")]
    pub number: Option<u64>,
    pub commit: Option<CommitInfo>,
}

/// Commit metadata for a revision.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub subject: Option<String>,
    /// The full commit message.
    pub message: String,
}

impl CommitInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            subject: None,
            message: message.into(),
        }
    }
}
