use std::sync::OnceLock;

use regex::Regex;

use crate::change_id::ChangeId;
use crate::commit_message::CommitMessageFetcher;
use crate::commit_message::Revision;
use crate::error::CrdError;
use crate::repository::RepositoryManager;

/// Get the change IDs from the `Depends-On:` trailers in a commit message, top to bottom.
///
/// A trailer must be on its own line and name a full change ID, `I` followed by 40 lowercase hex
/// characters. The label is case-insensitive. Anything else is not a trailer and is skipped.
pub fn extract_depends_on(commit_message: &str) -> Vec<ChangeId> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^
            (?i:Depends-On):\ (?P<change_id>I[0-9a-f]{40})
            $
            ",
        )
        .expect("Regex parses")
    });

    commit_message
        .lines()
        .filter_map(|line| re.captures(line.trim_end()))
        .map(|captures| ChangeId::from(&captures["change_id"]))
        .collect()
}

/// Finds the changes a revision depends on.
#[derive(Debug, Clone)]
pub struct DependsOnFetcher<R> {
    commit_messages: CommitMessageFetcher<R>,
}

impl<R> DependsOnFetcher<R>
where
    R: RepositoryManager,
{
    pub fn new(commit_messages: CommitMessageFetcher<R>) -> Self {
        Self { commit_messages }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn fetch_for_revision(&self, revision: &Revision) -> Result<Vec<ChangeId>, CrdError> {
        let commit_message = self.commit_messages.fetch(revision)?;
        let depends_on = extract_depends_on(&commit_message);
        tracing::debug!(?depends_on, "Found dependencies");
        Ok(depends_on)
    }
}
