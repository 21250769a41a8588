/// Options for performing a `gerrit query`.
///
/// Only the options we need are modeled. Output is always JSON.
#[derive(Default, Debug, Clone)]
pub struct GerritQuery {
    /// The query to execute.
    query: String,
    /// Return all results, overriding the default limit
    no_limit: bool,
}

impl GerritQuery {
    /// Construct query options wrapping the given string.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            no_limit: false,
        }
    }

    /// Query for changes whose commit messages mention `Depends-On: {change_id}`.
    pub fn depends_on(change_id: &str) -> Self {
        Self::new(format!("message:\"Depends-On: {change_id}\""))
    }

    /// Convert this query into CLI options, to be appended to `gerrit`.
    pub fn into_args(self) -> Vec<String> {
        let mut args = vec!["query".to_owned(), "--format".to_owned(), "JSON".to_owned()];

        if self.no_limit {
            args.push("--no-limit".to_owned());
        }

        args.push("--".to_owned());
        args.push(self.query);

        args
    }

    /// Return all results, overriding the default limit.
    pub fn no_limit(mut self) -> Self {
        self.no_limit = true;
        self
    }
}
