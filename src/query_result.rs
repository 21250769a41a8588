use miette::IntoDiagnostic;
use serde::de::DeserializeOwned;

/// The output of `gerrit query --format=JSON`: one change per line, then a statistics line.
#[derive(Debug)]
pub struct QueryResult<T> {
    pub changes: Vec<T>,
    pub stats: Option<QueryStatistics>,
}

impl<T> QueryResult<T>
where
    T: DeserializeOwned,
{
    pub fn from_stdout(stdout: &str) -> miette::Result<Self> {
        let mut ret = Self {
            changes: Vec::new(),
            stats: None,
        };

        for line in stdout.lines().filter(|line| !line.trim().is_empty()) {
            let row = serde_json::from_str::<serde_json::Value>(line).into_diagnostic()?;
            let is_stats = row
                .as_object()
                .and_then(|object| object.get("type"))
                .and_then(|type_value| type_value.as_str())
                .map(|stats_value| stats_value == "stats")
                .unwrap_or(false);

            if is_stats {
                ret.stats = Some(serde_json::from_value::<QueryStatistics>(row).into_diagnostic()?);
            } else {
                ret.changes
                    .push(serde_json::from_value::<T>(row).into_diagnostic()?);
            }
        }

        Ok(ret)
    }
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryStatistics {
    pub row_count: usize,
    #[serde(default)]
    pub more_changes: bool,
}
