use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::errors::{Error, Result};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Name of the control directory inside the worktree
pub const GIT_DIR: &str = ".git";

const OBJECTS_DIR: &str = "objects";
const INDEX_FILE: &str = "index";

/// A worktree and the handles onto its control directory
///
/// All repository-relative paths are derived from this value; nothing reads
/// global configuration.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Index,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open (or prepare to initialize) the repository rooted at `path`
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        }
        let path = path.canonicalize().map_err(|e| Error::io(path, e))?;
        let git_dir = path.join(GIT_DIR);

        let index = Index::new(git_dir.join(INDEX_FILE).into_boxed_path());
        let database = Database::new(git_dir.join(OBJECTS_DIR).into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_dir.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index,
            database,
            workspace,
            refs,
        })
    }

    /// Find the worktree containing `start` by walking up to the first `.git` directory
    pub fn discover(start: &Path) -> Result<PathBuf> {
        let start = start.canonicalize().map_err(|e| Error::io(start, e))?;

        start
            .ancestors()
            .find(|dir| dir.join(GIT_DIR).is_dir())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                Error::NotFound(format!("no {GIT_DIR} directory above {}", start.display()))
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_dir(&self) -> PathBuf {
        self.path.join(GIT_DIR)
    }

    pub fn objects_path(&self) -> &Path {
        self.database.objects_path()
    }

    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    pub fn head_path(&self) -> PathBuf {
        self.refs.head_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }
}
