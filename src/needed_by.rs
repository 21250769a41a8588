use crate::change_id::ChangeId;
use crate::error::CrdError;

/// A searchable index of changes.
pub trait ChangeIndex {
    /// Find the changes whose commit messages contain a `Depends-On:` trailer for `change_id`.
    ///
    /// Returns their change IDs in the order the index returns them. Failures are reported as
    /// [`CrdError::Query`].
    fn search_dependents(&self, change_id: &ChangeId) -> Result<Vec<ChangeId>, CrdError>;
}

impl<T> ChangeIndex for &T
where
    T: ChangeIndex + ?Sized,
{
    fn search_dependents(&self, change_id: &ChangeId) -> Result<Vec<ChangeId>, CrdError> {
        (**self).search_dependents(change_id)
    }
}

/// A change that declares a dependency on another change, as returned by a query.
#[derive(serde::Deserialize, Debug)]
pub struct NeededBy {
    /// Change ID.
    pub id: ChangeId,
}

/// Finds the changes which depend on a change.
#[derive(Debug, Clone)]
pub struct NeededByFetcher<I> {
    index: I,
}

impl<I> NeededByFetcher<I>
where
    I: ChangeIndex,
{
    pub fn new(index: I) -> Self {
        Self { index }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn fetch_for_change_id(&self, change_id: &ChangeId) -> Result<Vec<ChangeId>, CrdError> {
        let needed_by = self.index.search_dependents(change_id)?;
        tracing::debug!(?needed_by, "Found dependent changes");
        Ok(needed_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::test_utils::StaticIndex;

    #[test]
    fn test_fetch_none() {
        let fetcher = NeededByFetcher::new(StaticIndex::new());
        assert_eq!(
            fetcher
                .fetch_for_change_id(&ChangeId::from("I0123456789"))
                .unwrap(),
            Vec::<ChangeId>::new()
        );
    }

    #[test]
    fn test_fetch_keeps_index_order() {
        let fetcher = NeededByFetcher::new(StaticIndex::new().with_dependents(
            "I0123456789",
            ["I00000005", "I00000001", "I00000003"],
        ));
        assert_eq!(
            fetcher
                .fetch_for_change_id(&ChangeId::from("I0123456789"))
                .unwrap(),
            vec![
                ChangeId::from("I00000005"),
                ChangeId::from("I00000001"),
                ChangeId::from("I00000003"),
            ]
        );
    }

    #[test]
    fn test_fetch_propagates_errors() {
        let fetcher = NeededByFetcher::new(StaticIndex::failing());
        let error = fetcher
            .fetch_for_change_id(&ChangeId::from("I0123456789"))
            .unwrap_err();
        assert!(
            matches!(&error, CrdError::Query { change_id, .. } if change_id.as_str() == "I0123456789"),
            "{error:?}"
        );
    }
}
