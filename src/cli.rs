use camino::Utf8PathBuf;
use clap::Parser;
use clap::Subcommand;

use crate::change_id::ChangeId;
use crate::project_name::ProjectName;

/// Resolve cross-repository `Depends-On` dependencies between Gerrit changes.
#[derive(Debug, Clone, Parser)]
#[command(version, author, about)]
#[command(max_term_width = 100, disable_help_subcommand = true)]
pub struct Opts {
    /// Log filter directives, of the form `target[span{field=value}]=level`, where all components
    /// except the level are optional.
    ///
    /// Try `debug` or `trace`.
    #[arg(long, default_value = "info", env = "GIT_CRD_LOG")]
    pub log: String,

    /// Directory containing the repositories of hosted projects.
    ///
    /// A project `foo/bar` is read from `foo/bar.git`, `foo/bar/.git`, or `foo/bar`.
    #[arg(long, default_value = ".", env = "GIT_CRD_REPOSITORIES")]
    pub repositories: Utf8PathBuf,

    /// The Git remote to query Gerrit through.
    ///
    /// Defaults to the first remote with `gerrit` in its name or URL.
    #[arg(long, env = "GIT_CRD_REMOTE")]
    pub remote: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the dependencies of a commit in a hosted project's repository.
    Revision {
        /// The project the commit belongs to.
        #[arg(long)]
        project: ProjectName,

        /// The change the commit is a revision of.
        #[arg(long)]
        change_id: ChangeId,

        /// The full commit hash.
        revision: String,
    },
    /// Show the dependencies of a commit in the local repository.
    Head {
        /// The commit to inspect.
        #[arg(default_value = "HEAD")]
        commit: String,
    },
    /// Print the `Depends-On` change IDs in a commit message, one per line.
    Extract {
        /// File to read the commit message from. Defaults to stdin.
        file: Option<Utf8PathBuf>,
    },
}
