use camino::Utf8PathBuf;

use crate::cli::Opts;
use crate::commit_message::CommitMessageFetcher;
use crate::crd::CrdComputer;
use crate::depends_on::DependsOnFetcher;
use crate::gerrit::Gerrit;
use crate::git::Git;
use crate::needed_by::NeededByFetcher;
use crate::repository::GitRepositoryManager;

/// Where repositories and the Gerrit index are found.
#[derive(Debug)]
pub struct Config {
    git: Git,
    repositories: Utf8PathBuf,
    remote: Option<String>,
}

impl Config {
    pub fn new(opts: &Opts) -> Self {
        Self {
            git: Git::new(),
            repositories: opts.repositories.clone(),
            remote: opts.remote.clone(),
        }
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    pub fn gerrit(&self) -> miette::Result<Gerrit> {
        self.git.gerrit(self.remote.as_deref())
    }

    pub fn repositories(&self) -> GitRepositoryManager {
        GitRepositoryManager::new(self.repositories.clone())
    }

    /// A [`CrdComputer`] reading from the configured repositories and querying Gerrit.
    pub fn crd_computer(&self) -> miette::Result<CrdComputer<GitRepositoryManager, Gerrit>> {
        let gerrit = self.gerrit()?;
        tracing::debug!(
            gerrit = %gerrit.connect_to(),
            project = gerrit.project(),
            repositories = %self.repositories,
            "Configured"
        );
        Ok(CrdComputer::new(
            DependsOnFetcher::new(CommitMessageFetcher::new(self.repositories())),
            NeededByFetcher::new(gerrit),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_from_opts() {
        let opts = Opts::try_parse_from([
            "git-crd",
            "--repositories",
            "/var/gerrit/git",
            "--remote",
            "review",
            "head",
        ])
        .unwrap();
        let config = Config::new(&opts);
        assert_eq!(config.repositories, Utf8PathBuf::from("/var/gerrit/git"));
        assert_eq!(config.remote.as_deref(), Some("review"));
    }
}
