use std::io::Read;

use calm_io::stdoutln;
use clap::Parser;
use git_crd::change_info::CommitInfo;
use git_crd::cli;
use git_crd::cli::Opts;
use git_crd::config::Config;
use git_crd::extract_depends_on;
use git_crd::git::change_id_from_message;
use git_crd::install_tracing::install_tracing;
use git_crd::CrdInfo;
use git_crd::Revision;
use miette::miette;
use miette::Context;
use miette::IntoDiagnostic;

fn main() -> miette::Result<()> {
    let opts = Opts::parse();
    install_tracing(&opts.log)?;
    let config = Config::new(&opts);

    match opts.command {
        cli::Command::Revision {
            project,
            change_id,
            revision,
        } => {
            let crd = config
                .crd_computer()?
                .compute(&Revision::commit(project, revision), &change_id)?;
            print_crd(&crd)?;
        }
        cli::Command::Head { commit } => {
            let message = config.git().commit_message(&commit)?;
            let change_id = change_id_from_message(&message).ok_or_else(|| {
                miette!("Could not find Change-Id in message for commit {commit}:\n{message}")
            })?;
            let crd = config
                .crd_computer()?
                .compute(&Revision::Loaded(CommitInfo::new(message)), &change_id)?;
            print_crd(&crd)?;
        }
        cli::Command::Extract { file } => {
            let message = match file {
                Some(file) => fs_err::read_to_string(file).into_diagnostic()?,
                None => {
                    let mut message = String::new();
                    std::io::stdin()
                        .read_to_string(&mut message)
                        .into_diagnostic()
                        .wrap_err("Failed to read commit message from stdin")?;
                    message
                }
            };
            for change_id in extract_depends_on(&message) {
                let _ = stdoutln!("{change_id}");
            }
        }
    }

    Ok(())
}

fn print_crd(crd: &CrdInfo) -> miette::Result<()> {
    let json = serde_json::to_string_pretty(crd).into_diagnostic()?;
    let _ = stdoutln!("{json}");
    Ok(())
}
