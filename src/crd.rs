use std::collections::BTreeSet;

use crate::change_id::ChangeId;
use crate::commit_message::Revision;
use crate::depends_on::DependsOnFetcher;
use crate::error::CrdError;
use crate::needed_by::ChangeIndex;
use crate::needed_by::NeededByFetcher;
use crate::repository::RepositoryManager;

/// Cross-repository dependencies of a change revision.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CrdInfo {
    /// Changes this revision declares a dependency on, in commit message order.
    pub depends_on: Vec<ChangeId>,
    /// Changes which declare a dependency on this change, in index order.
    pub needed_by: Vec<ChangeId>,
    /// Whether a change is in both lists, i.e. two changes depend on each other.
    ///
    /// Longer cycles aren't detected.
    pub cycle: bool,
}

impl CrdInfo {
    pub fn new(depends_on: Vec<ChangeId>, needed_by: Vec<ChangeId>) -> Self {
        let cycle = has_cycle(&depends_on, &needed_by);
        Self {
            depends_on,
            needed_by,
            cycle,
        }
    }
}

/// True if any change ID appears in both lists, ignoring case.
pub fn has_cycle(depends_on: &[ChangeId], needed_by: &[ChangeId]) -> bool {
    let needed_by = needed_by
        .iter()
        .map(ChangeId::match_key)
        .collect::<BTreeSet<_>>();
    depends_on
        .iter()
        .any(|change_id| needed_by.contains(&change_id.match_key()))
}

/// Computes [`CrdInfo`] for change revisions.
#[derive(Debug, Clone)]
pub struct CrdComputer<R, I> {
    depends_on: DependsOnFetcher<R>,
    needed_by: NeededByFetcher<I>,
}

impl<R, I> CrdComputer<R, I>
where
    R: RepositoryManager + Sync,
    I: ChangeIndex + Sync,
{
    pub fn new(depends_on: DependsOnFetcher<R>, needed_by: NeededByFetcher<I>) -> Self {
        Self {
            depends_on,
            needed_by,
        }
    }

    /// Get the dependencies of `revision`, which belongs to the change `change_id`.
    ///
    /// The two lookups run in parallel. If either fails, its error is returned.
    #[tracing::instrument(level = "debug", skip(self, revision))]
    pub fn compute(&self, revision: &Revision, change_id: &ChangeId) -> Result<CrdInfo, CrdError> {
        let (depends_on, needed_by) = std::thread::scope(|scope| {
            let needed_by = scope.spawn(|| self.needed_by.fetch_for_change_id(change_id));
            let depends_on = self.depends_on.fetch_for_revision(revision);
            let needed_by = needed_by
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (depends_on, needed_by)
        });

        let crd = CrdInfo::new(depends_on?, needed_by?);
        if crd.cycle {
            tracing::info!(%change_id, "Dependency cycle detected");
        }
        Ok(crd)
    }
}
