use std::process::Command;
use std::sync::OnceLock;

use command_error::CommandExt;
use miette::miette;
use miette::Context;
use miette::IntoDiagnostic;
use regex::Regex;

use crate::change_id::ChangeId;
use crate::gerrit::Gerrit;

/// `git` CLI wrapper for the local checkout.
#[derive(Debug, Default)]
pub struct Git {}

impl Git {
    pub fn new() -> Self {
        Self {}
    }

    /// Get a `git` command.
    pub fn command(&self) -> Command {
        Command::new("git")
    }

    /// Get a list of all `git remote`s.
    pub fn remotes(&self) -> miette::Result<Vec<String>> {
        Ok(self
            .command()
            .arg("remote")
            .output_checked_utf8()
            .into_diagnostic()
            .wrap_err("Failed to list Git remotes")?
            .stdout
            .lines()
            .map(|line| line.to_owned())
            .collect())
    }

    /// Get the (fetch) URL for the given remote.
    pub fn remote_url(&self, remote: &str) -> miette::Result<String> {
        Ok(self
            .command()
            .args(["remote", "get-url", remote])
            .output_checked_utf8()
            .into_diagnostic()
            .wrap_err("Failed to get Git remote URL")?
            .stdout
            .trim()
            .to_owned())
    }

    /// Get the full commit message of a local commit.
    pub fn commit_message(&self, commit: &str) -> miette::Result<String> {
        Ok(self
            .command()
            .args(["show", "--no-patch", "--format=%B", commit])
            .output_checked_utf8()
            .into_diagnostic()
            .wrap_err("Failed to get commit message")?
            .stdout)
    }

    /// Find the Gerrit remote, either by name or by looking for a Gerrit-looking URL.
    pub fn gerrit(&self, gerrit_remote_name: Option<&str>) -> miette::Result<Gerrit> {
        let mut tried = Vec::new();

        if let Some(remote_name) = gerrit_remote_name {
            tracing::debug!(remote_name, "Looking for remote");
        }

        for remote in self.remotes()? {
            if let Some(remote_name) = gerrit_remote_name {
                if remote_name != remote {
                    tracing::debug!(%remote, "Skipping remote");
                    continue;
                }
            }

            let url = self.remote_url(&remote)?;

            if gerrit_remote_name.is_none() && !remote.contains("gerrit") && !url.contains("gerrit")
            {
                tracing::debug!(%remote, %url, "Skipping remote");
                continue;
            }

            tried.push(url.clone());

            match Gerrit::parse_from_remote_url(&url) {
                Ok(gerrit) => {
                    return Ok(gerrit);
                }
                Err(error) => {
                    tracing::debug!(%remote, %url, %error, "Failed to parse remote URL");
                }
            }
        }

        Err(miette!(
            "Failed to parse Gerrit configuration from Git remotes. Tried to parse these remotes:\n{}",
            tried
                .iter()
                .map(|url| format!("• {url}"))
                .collect::<Vec<_>>()
                .join("\n")
        ))
    }
}

/// Get the last `Change-Id` trailer in a commit message.
pub fn change_id_from_message(commit_message: &str) -> Option<ChangeId> {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?xm)
            ^
            Change-Id:\ (?P<change_id>I[[:xdigit:]]{40})
            \s*$
            ",
        )
        .expect("Regex parses")
    })
    .captures_iter(commit_message)
    .last()
    .map(|captures| ChangeId::from(&captures["change_id"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_change_id_from_message() {
        assert_eq!(
            change_id_from_message(indoc!(
                "
                Fix bug

                Depends-On: I0000000000000000000000000000000000000000
                Change-Id: I8473b95934b5732ac55d26311a706c9c2bde9940
                "
            )),
            Some(ChangeId::from("I8473b95934b5732ac55d26311a706c9c2bde9940"))
        );
    }

    #[test]
    fn test_change_id_from_message_missing() {
        assert_eq!(change_id_from_message("Fix bug\n"), None);
        assert_eq!(
            change_id_from_message("Fix bug\n\nChange-Id: I8473b959\n"),
            None
        );
    }
}
