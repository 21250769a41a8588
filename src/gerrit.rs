use std::process::Command;
use std::sync::OnceLock;

use command_error::CommandExt;
use command_error::OutputContext;
use miette::miette;
use miette::Context;
use miette::IntoDiagnostic;
use regex::Regex;
use serde::de::DeserializeOwned;
use utf8_command::Utf8Output;

use crate::change_id::ChangeId;
use crate::error::CrdError;
use crate::gerrit_query::GerritQuery;
use crate::needed_by::ChangeIndex;
use crate::needed_by::NeededBy;
use crate::query_result::QueryResult;

/// Gerrit SSH client wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gerrit {
    username: String,
    host: String,
    port: u16,
    project: String,
}

impl Gerrit {
    /// Parse a Gerrit configuration from a Git remote URL.
    pub fn parse_from_remote_url(url: &str) -> miette::Result<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let captures = RE
            .get_or_init(|| {
                // ssh://USER@HOST:PORT/PROJECT
                Regex::new(
                    r"(?x)
                    ^
                    ssh://
                    (?P<user>[[:word:]-]+)
                    @
                    (?P<host>[[:word:]][[:word:].-]*)
                    :
                    (?P<port>[0-9]+)
                    /
                    (?P<project>[[:word:]./-]+?)
                    (?:\.git)?
                    /?
                    $",
                )
                .expect("Regex parses")
            })
            .captures(url);
        match captures {
            Some(captures) => {
                let port = &captures["port"];
                let port = port.parse().into_diagnostic().wrap_err_with(|| {
                    format!("Failed to parse port `{port}` from Git remote: {url}")
                })?;

                Ok(Self {
                    username: captures["user"].to_owned(),
                    host: captures["host"].to_owned(),
                    port,
                    project: captures["project"].to_owned(),
                })
            }
            None => Err(miette!("Could not parse Git remote as Gerrit URL: {url}")),
        }
    }

    /// The `ssh` destination to connect to.
    pub fn connect_to(&self) -> String {
        format!("ssh://{}@{}:{}", self.username, self.host, self.port)
    }

    /// The project this remote points at.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// A `gerrit` command to run on the remote.
    pub fn command(&self, args: impl IntoIterator<Item = impl AsRef<str>>) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.args([&self.connect_to(), "gerrit"]);
        cmd.args(
            args.into_iter()
                .map(|arg| shell_words::quote(arg.as_ref()).into_owned()),
        );
        cmd
    }

    pub fn query<T: DeserializeOwned>(&self, query: GerritQuery) -> miette::Result<QueryResult<T>> {
        self.command(query.into_args())
            .output_checked_as(|context: OutputContext<Utf8Output>| {
                if context.status().success() {
                    match QueryResult::from_stdout(&context.output().stdout) {
                        Ok(value) => Ok(value),
                        Err(error) => Err(context.error_msg(error)),
                    }
                } else {
                    Err(context.error())
                }
            })
            .into_diagnostic()
    }
}

impl ChangeIndex for Gerrit {
    #[tracing::instrument(level = "debug", skip(self), fields(host = %self.host))]
    fn search_dependents(&self, change_id: &ChangeId) -> Result<Vec<ChangeId>, CrdError> {
        let result = self
            .query::<NeededBy>(GerritQuery::depends_on(change_id).no_limit())
            .map_err(|error| query_error(change_id, error))?;
        if let Some(stats) = result.stats {
            tracing::trace!(
                rows = stats.row_count,
                more_changes = stats.more_changes,
                "Queried dependent changes"
            );
        }
        Ok(result.changes.into_iter().map(|change| change.id).collect())
    }
}

fn query_error(change_id: &ChangeId, error: miette::Report) -> CrdError {
    CrdError::Query {
        change_id: change_id.clone(),
        source: error.into(),
    }
}
