use crate::change_info::CommitInfo;
use crate::commit_hash::CommitHash;
use crate::error::CrdError;
use crate::error::InvalidObjectReason;
use crate::project_name::ProjectName;
use crate::repository::ObjectKind;
use crate::repository::Repository;
use crate::repository::RepositoryManager;

/// A change revision whose commit message we want to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// A commit in a project's repository.
    ///
    /// The revision is parsed when it's fetched, so a malformed hash is reported like any other
    /// revision that doesn't name a commit.
    Commit {
        project: ProjectName,
        revision: String,
    },
    /// A revision whose commit metadata has already been loaded.
    Loaded(CommitInfo),
}

impl Revision {
    pub fn commit(project: impl Into<ProjectName>, revision: impl Into<String>) -> Self {
        Self::Commit {
            project: project.into(),
            revision: revision.into(),
        }
    }
}

/// Reads commit messages for [`Revision`]s.
#[derive(Debug, Clone)]
pub struct CommitMessageFetcher<R> {
    repositories: R,
}

impl<R> CommitMessageFetcher<R>
where
    R: RepositoryManager,
{
    pub fn new(repositories: R) -> Self {
        Self { repositories }
    }

    pub fn repositories(&self) -> &R {
        &self.repositories
    }

    /// Get the full commit message of a revision.
    pub fn fetch(&self, revision: &Revision) -> Result<String, CrdError> {
        match revision {
            Revision::Commit { project, revision } => self.fetch_commit(project, revision),
            Revision::Loaded(commit) => Ok(commit.message.clone()),
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn fetch_commit(&self, project: &ProjectName, revision: &str) -> Result<String, CrdError> {
        let invalid = |reason: InvalidObjectReason| CrdError::invalid_object(revision, reason);

        let id = CommitHash::parse(revision).map_err(invalid)?;
        let mut repository = self.repositories.open_repository(project)?;
        let object = repository
            .read_object(&id, ObjectKind::Commit)?
            .ok_or_else(|| invalid(InvalidObjectReason::Missing))?;

        if object.kind != ObjectKind::Commit {
            return Err(invalid(InvalidObjectReason::WrongType(object.kind)));
        }

        tracing::debug!(commit = id.abbrev(), "Read commit");
        parse_commit_message(&object.data).ok_or_else(|| invalid(InvalidObjectReason::Corrupt))
    }
}

/// Get the message out of a raw commit object.
///
/// The message is everything after the first blank line. A commit with no blank line has an
/// empty message.
fn parse_commit_message(data: &[u8]) -> Option<String> {
    if !data.starts_with(b"tree ") {
        return None;
    }
    let message = data
        .windows(2)
        .position(|window| window == b"\n\n")
        .map(|position| &data[position + 2..])
        .unwrap_or_default();
    Some(String::from_utf8_lossy(message).into_owned())
}
