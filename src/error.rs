use crate::change_id::ChangeId;
use crate::project_name::ProjectName;
use crate::repository::ObjectKind;

/// Errors from resolving a change's dependencies.
///
/// These are passed through to the caller unchanged; nothing in this crate retries or recovers
/// from them.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CrdError {
    /// The project's repository doesn't exist.
    #[error("Repository for project `{project}` not found")]
    #[diagnostic(code(git_crd::not_found))]
    NotFound { project: ProjectName },

    /// The revision doesn't name a commit.
    #[error("Revision `{revision}` is not a commit: {reason}")]
    #[diagnostic(code(git_crd::invalid_object))]
    InvalidObject {
        revision: String,
        reason: InvalidObjectReason,
    },

    /// Searching the change index for dependent changes failed.
    #[error("Failed to query changes which depend on {change_id}")]
    #[diagnostic(code(git_crd::query))]
    Query {
        change_id: ChangeId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The object store couldn't be read.
    ///
    /// When `git` itself failed, the source carries its exit status and `stderr`.
    #[error("Failed to read objects from repository for project `{project}`")]
    #[diagnostic(code(git_crd::store))]
    Store {
        project: ProjectName,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Why a revision failed to resolve to a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidObjectReason {
    #[error("not a full hex object name")]
    Malformed,
    #[error("object does not exist")]
    Missing,
    #[error("object is a {0}")]
    WrongType(ObjectKind),
    #[error("commit object is corrupt")]
    Corrupt,
}

impl CrdError {
    pub fn invalid_object(revision: impl Into<String>, reason: InvalidObjectReason) -> Self {
        Self::InvalidObject {
            revision: revision.into(),
            reason,
        }
    }
}
