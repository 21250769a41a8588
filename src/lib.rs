//! Resolve cross-repository dependencies between Gerrit changes.
//!
//! A change declares that it depends on other changes with `Depends-On: <change-id>` trailers in
//! its commit message. [`CrdComputer`] finds the changes a revision depends on, the changes that
//! depend on it, and whether two changes depend on each other.

pub mod change_id;
pub mod change_info;
pub mod cli;
pub mod commit_hash;
pub mod commit_message;
pub mod config;
pub mod crd;
pub mod depends_on;
pub mod error;
pub mod gerrit;
pub mod gerrit_query;
pub mod git;
pub mod install_tracing;
pub mod needed_by;
pub mod project_name;
pub mod query_result;
pub mod repository;

#[cfg(test)]
mod test_utils;

pub use change_id::ChangeId;
pub use commit_message::Revision;
pub use crd::CrdComputer;
pub use crd::CrdInfo;
pub use depends_on::extract_depends_on;
pub use error::CrdError;
