//! Fakes and fixtures shared by the unit tests.

use std::collections::BTreeMap;
use std::process::Command;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use camino::Utf8PathBuf;
use command_error::CommandExt;

use crate::change_id::ChangeId;
use crate::commit_hash::CommitHash;
use crate::error::CrdError;
use crate::needed_by::ChangeIndex;
use crate::project_name::ProjectName;
use crate::repository::GitRepositoryManager;
use crate::repository::ObjectKind;
use crate::repository::RawObject;
use crate::repository::Repository;
use crate::repository::RepositoryManager;

pub const BLOB: &str = "24c5735c3e8ce8fd18d312e9e58149a62236c01a";
pub const TREE: &str = "3faaefce19558dfc8d9c976f09ae4897f45cb242";
pub const COMMIT: &str = "95aed53c03b6d3df0912bdd9bb1d0c6eaf619f58";
pub const MISSING: &str = "0123456789012345678901234567890123456789";

/// An in-memory object store with a single project.
///
/// Counts open handles so tests can check that they're always released.
#[derive(Debug, Default)]
pub struct MemoryRepositoryManager {
    project: ProjectName,
    objects: BTreeMap<CommitHash, RawObject>,
    open_handles: Arc<AtomicUsize>,
}

impl MemoryRepositoryManager {
    /// `ProjectFoo`, with a blob, a tree, and a commit with the given message.
    pub fn with_commit_message(message: &str) -> Self {
        let mut manager = Self {
            project: ProjectName::from("ProjectFoo"),
            ..Default::default()
        };
        manager.insert(BLOB, ObjectKind::Blob, b"def\n".to_vec());
        manager.insert(TREE, ObjectKind::Tree, tree_with_entry(BLOB));
        manager.insert(
            COMMIT,
            ObjectKind::Commit,
            format!(
                "tree {TREE}\n\
                 author Author <author@example.org> 1592579853 +0200\n\
                 committer Committer <committer@example.org> 1592579853 +0200\n\
                 \n\
                 {message}"
            )
            .into_bytes(),
        );
        manager
    }

    pub fn insert(&mut self, id: &str, kind: ObjectKind, data: Vec<u8>) {
        self.objects.insert(
            CommitHash::parse(id).expect("Test object IDs are valid"),
            RawObject { kind, data },
        );
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

fn tree_with_entry(blob: &str) -> Vec<u8> {
    let mut data = b"100644 abc\0".to_vec();
    data.extend((0..blob.len()).step_by(2).map(|i| {
        u8::from_str_radix(&blob[i..i + 2], 16).expect("Test object IDs are valid")
    }));
    data
}

impl RepositoryManager for MemoryRepositoryManager {
    type Repository = MemoryRepository;

    fn open_repository(&self, project: &ProjectName) -> Result<Self::Repository, CrdError> {
        if *project != self.project {
            return Err(CrdError::NotFound {
                project: project.clone(),
            });
        }
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryRepository {
            objects: self.objects.clone(),
            open_handles: self.open_handles.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MemoryRepository {
    objects: BTreeMap<CommitHash, RawObject>,
    open_handles: Arc<AtomicUsize>,
}

impl Repository for MemoryRepository {
    fn read_object(
        &mut self,
        id: &CommitHash,
        wanted: ObjectKind,
    ) -> Result<Option<RawObject>, CrdError> {
        Ok(self.objects.get(id).map(|object| RawObject {
            kind: object.kind,
            data: if object.kind == wanted {
                object.data.clone()
            } else {
                Vec::new()
            },
        }))
    }
}

impl Drop for MemoryRepository {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A change index with canned answers.
#[derive(Debug, Default)]
pub struct StaticIndex {
    dependents: BTreeMap<String, Vec<ChangeId>>,
    fail: bool,
}

impl StaticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index where every search fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_dependents<'a>(
        mut self,
        change_id: &str,
        dependents: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.dependents.insert(
            change_id.to_owned(),
            dependents.into_iter().map(ChangeId::from).collect(),
        );
        self
    }
}

impl ChangeIndex for StaticIndex {
    fn search_dependents(&self, change_id: &ChangeId) -> Result<Vec<ChangeId>, CrdError> {
        if self.fail {
            return Err(CrdError::Query {
                change_id: change_id.clone(),
                source: "index is offline".into(),
            });
        }
        Ok(self
            .dependents
            .get(change_id.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

/// A temporary directory of bare repositories, created with the real `git`.
pub struct GitFixture {
    tempdir: tempfile::TempDir,
    git_dir: Utf8PathBuf,
}

impl GitFixture {
    pub fn new(project: &str) -> Self {
        let tempdir = tempfile::tempdir().expect("Can create temporary directory");
        let root = Utf8PathBuf::try_from(tempdir.path().to_owned()).expect("Path is UTF-8");
        let git_dir = root.join(format!("{project}.git"));
        Command::new("git")
            .args(["init", "--quiet", "--bare"])
            .arg(&git_dir)
            .status_checked()
            .expect("Can create repository");
        Self { tempdir, git_dir }
    }

    pub fn manager(&self) -> GitRepositoryManager {
        GitRepositoryManager::new(
            Utf8PathBuf::try_from(self.tempdir.path().to_owned()).expect("Path is UTF-8"),
        )
    }

    fn git(&self) -> Command {
        let mut command = Command::new("git");
        command
            .arg("--git-dir")
            .arg(&self.git_dir)
            .env("GIT_AUTHOR_NAME", "Author")
            .env("GIT_AUTHOR_EMAIL", "author@example.org")
            .env("GIT_COMMITTER_NAME", "Committer")
            .env("GIT_COMMITTER_EMAIL", "committer@example.org");
        command
    }

    fn write_file(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.git_dir.join(name);
        fs_err::write(&path, contents).expect("Can write file");
        path
    }

    fn hash(&self, command: &mut Command) -> CommitHash {
        let output = command.output_checked_utf8().expect("`git` succeeds");
        CommitHash::parse(output.stdout.trim()).expect("`git` prints object IDs")
    }

    pub fn blob(&self, contents: &str) -> CommitHash {
        let path = self.write_file("blob-contents", contents);
        self.hash(self.git().args(["hash-object", "-w"]).arg(&path))
    }

    pub fn empty_tree(&self) -> CommitHash {
        let path = self.write_file("empty", "");
        self.hash(
            self.git()
                .args(["hash-object", "-w", "-t", "tree"])
                .arg(&path),
        )
    }

    pub fn commit(&self, tree: &CommitHash, message: &str) -> CommitHash {
        let path = self.write_file("commit-message", message);
        self.hash(
            self.git()
                .args(["commit-tree", tree.as_str(), "-F"])
                .arg(&path),
        )
    }
}
