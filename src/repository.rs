//! Read-only access to the Git object stores of hosted projects.

use std::fmt::Display;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::process::Child;
use std::process::ChildStdin;
use std::process::ChildStdout;
use std::process::Command;
use std::process::Stdio;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use command_error::ChildContext;
use command_error::ChildExt;
use command_error::CommandExt;

use crate::commit_hash::CommitHash;
use crate::error::CrdError;
use crate::project_name::ProjectName;

/// The four types of Git objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    /// Parse the type name Git prints in object headers.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Blob => write!(f, "blob"),
            ObjectKind::Tree => write!(f, "tree"),
            ObjectKind::Commit => write!(f, "commit"),
            ObjectKind::Tag => write!(f, "tag"),
        }
    }
}

/// An object's type and its uncompressed content, without the `<type> <size>\0` header.
///
/// `data` is only loaded for objects of the kind that was asked for; it's empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

/// Opens repositories by project name.
pub trait RepositoryManager {
    type Repository: Repository;

    /// Fails with [`CrdError::NotFound`] if the project has no repository.
    fn open_repository(&self, project: &ProjectName) -> Result<Self::Repository, CrdError>;
}

/// An open repository handle.
///
/// Whatever the handle holds on to is released when it's dropped.
pub trait Repository {
    /// Read an object, or `None` if it isn't in the store.
    ///
    /// The content is only loaded if the object is a `wanted`.
    fn read_object(
        &mut self,
        id: &CommitHash,
        wanted: ObjectKind,
    ) -> Result<Option<RawObject>, CrdError>;
}

/// Repositories stored on disk under a single root directory, Gerrit-style.
///
/// A project `foo/bar` lives at `<root>/foo/bar.git`, `<root>/foo/bar/.git`, or `<root>/foo/bar`.
#[derive(Debug, Clone)]
pub struct GitRepositoryManager {
    root: Utf8PathBuf,
}

impl GitRepositoryManager {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git_dir(&self, project: &ProjectName) -> Option<Utf8PathBuf> {
        let relative = project.as_relative_path()?;
        let checkout = self.root.join(relative);
        [
            self.root.join(format!("{relative}.git")),
            checkout.join(".git"),
            checkout,
        ]
        .into_iter()
        .find(|candidate| is_git_dir(candidate))
    }
}

fn is_git_dir(path: &Utf8Path) -> bool {
    path.join("objects").is_dir()
}

impl RepositoryManager for GitRepositoryManager {
    type Repository = GitRepository;

    fn open_repository(&self, project: &ProjectName) -> Result<Self::Repository, CrdError> {
        let git_dir = self.git_dir(project).ok_or_else(|| CrdError::NotFound {
            project: project.clone(),
        })?;
        GitRepository::open(project.clone(), git_dir)
    }
}

/// A repository on disk, read through a `git cat-file --batch` process.
///
/// The process lives exactly as long as this handle.
#[derive(Debug)]
pub struct GitRepository {
    project: ProjectName,
    git_dir: Utf8PathBuf,
    child: Option<ChildContext<Child>>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
}

impl GitRepository {
    fn open(project: ProjectName, git_dir: Utf8PathBuf) -> Result<Self, CrdError> {
        let mut child = Command::new("git")
            .arg("--git-dir")
            .arg(&git_dir)
            .args(["cat-file", "--batch"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn_checked()
            .map_err(|error| CrdError::Store {
                project: project.clone(),
                source: error.into(),
            })?;
        let stdin = child.child_mut().stdin.take();
        let stdout = child.child_mut().stdout.take().map(BufReader::new);
        tracing::trace!(%project, %git_dir, "Opened repository");

        Ok(Self {
            project,
            git_dir,
            child: Some(child),
            stdin,
            stdout,
        })
    }

    /// Close the pipes and wait for `git` to exit.
    ///
    /// `stdout` is closed before waiting so `git` can't block writing an object nobody reads.
    fn close(&mut self) -> Result<(), command_error::Error> {
        drop(self.stdin.take());
        drop(self.stdout.take());
        match self.child.take() {
            // Collects `stderr` so it ends up in the error.
            Some(child) => child.output_checked().map(|_| ()),
            None => Ok(()),
        }
    }

    /// Shut `git` down after a failed request.
    ///
    /// If `git` itself failed, its exit status and `stderr` are reported instead of whatever
    /// happened to the pipes.
    fn store_error(&mut self, error: std::io::Error) -> CrdError {
        let source = match self.close() {
            Ok(()) => error.into(),
            Err(git_error) => {
                tracing::debug!(%error, "`git cat-file` failed");
                git_error.into()
            }
        };
        CrdError::Store {
            project: self.project.clone(),
            source,
        }
    }

    fn request(
        &mut self,
        id: &CommitHash,
        wanted: ObjectKind,
    ) -> std::io::Result<Option<RawObject>> {
        let (stdin, stdout) = match (self.stdin.as_mut(), self.stdout.as_mut()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => return Err(std::io::ErrorKind::BrokenPipe.into()),
        };
        writeln!(stdin, "{id}")?;
        stdin.flush()?;

        let mut header = String::new();
        if stdout.read_line(&mut header)? == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }

        // `<oid> missing` or `<oid> <type> <size>`.
        let mut fields = header.split_whitespace().skip(1);
        let (kind, size) = match (fields.next(), fields.next()) {
            (Some("missing"), None) | (Some("ambiguous"), None) => return Ok(None),
            (Some(kind), Some(size)) => (kind, size),
            _ => return Err(invalid_data(format!("unexpected header: {header:?}"))),
        };
        let kind = ObjectKind::from_name(kind)
            .ok_or_else(|| invalid_data(format!("unknown object type: {kind:?}")))?;
        let size: u64 = size
            .parse()
            .map_err(|_| invalid_data(format!("bad object size: {size:?}")))?;

        let data = if kind == wanted {
            let mut data = Vec::new();
            stdout.by_ref().take(size).read_to_end(&mut data)?;
            data
        } else {
            std::io::copy(&mut stdout.by_ref().take(size), &mut std::io::sink())?;
            Vec::new()
        };
        // A short payload leaves nothing for the trailing newline.
        let mut newline = [0; 1];
        stdout.read_exact(&mut newline)?;

        Ok(Some(RawObject { kind, data }))
    }
}

fn invalid_data(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, message)
}

impl Repository for GitRepository {
    #[tracing::instrument(level = "trace", skip(self), fields(project = %self.project))]
    fn read_object(
        &mut self,
        id: &CommitHash,
        wanted: ObjectKind,
    ) -> Result<Option<RawObject>, CrdError> {
        match self.request(id, wanted) {
            Ok(object) => Ok(object),
            Err(error) => Err(self.store_error(error)),
        }
    }
}

impl Drop for GitRepository {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::debug!(git_dir = %self.git_dir, %error, "`git cat-file` failed");
        }
        tracing::trace!(project = %self.project, "Closed repository");
    }
}
