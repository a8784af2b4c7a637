use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::errors::{Error, Result};
use bytes::Bytes;
use is_executable::IsExecutable;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path};

const IGNORED_PATHS: [&str; 1] = [".git"];

/// The checked-out files next to the control directory
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_blob(&self, file_path: &Path) -> Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Raw content of a file, or the link target of a symlink
    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let full_path = self.path.join(file_path);
        let metadata = std::fs::symlink_metadata(&full_path).map_err(|e| Error::io(&full_path, e))?;

        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&full_path).map_err(|e| Error::io(&full_path, e))?;
            return Ok(Bytes::copy_from_slice(target.as_os_str().as_bytes()));
        }

        std::fs::read(&full_path)
            .map(Bytes::from)
            .map_err(|e| Error::io(&full_path, e))
    }

    /// Capture the stat fields recorded in an index entry
    ///
    /// Wide values are truncated to their low 32 bits.
    pub fn stat_file(&self, file_path: &Path) -> Result<EntryMetadata> {
        let full_path = self.path.join(file_path);
        let metadata = std::fs::symlink_metadata(&full_path).map_err(|e| Error::io(&full_path, e))?;

        let mode = if metadata.file_type().is_symlink() {
            EntryMode::Symlink
        } else if metadata.is_dir() {
            EntryMode::Directory
        } else if full_path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        Ok(EntryMetadata {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
            flags: Default::default(),
        })
    }

    /// Worktree-relative path with `/` separators, as stored in the index
    ///
    /// Relative inputs are resolved against `base`. Paths outside the
    /// worktree or inside the control directory are rejected.
    pub fn relative_path(&self, base: &Path, file_path: &Path) -> Result<String> {
        let absolute = base.join(file_path);
        let absolute = match absolute.parent() {
            // resolve the directory but keep a trailing symlink as is
            Some(parent) if !parent.as_os_str().is_empty() => parent
                .canonicalize()
                .map_err(|e| Error::io(parent, e))?
                .join(absolute.file_name().unwrap_or_default()),
            _ => absolute.clone(),
        };

        let relative = absolute.strip_prefix(&self.path).map_err(|_| {
            Error::malformed(format!("{} is outside the worktree", file_path.display()))
        })?;

        let components = relative
            .components()
            .map(|component| match component {
                Component::Normal(name) => name
                    .to_str()
                    .filter(|name| !IGNORED_PATHS.contains(name))
                    .map(str::to_string)
                    .ok_or_else(|| {
                        Error::malformed(format!("{} is not a trackable path", relative.display()))
                    }),
                _ => Err(Error::malformed(format!(
                    "{} is not a trackable path",
                    relative.display()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        if components.is_empty() {
            return Err(Error::malformed(format!(
                "{} names the worktree itself",
                file_path.display()
            )));
        }

        Ok(components.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use filetime::FileTime;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::os::unix::fs::PermissionsExt;

    #[fixture]
    fn worktree() -> TempDir {
        TempDir::new().unwrap()
    }

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().canonicalize().unwrap().into_boxed_path())
    }

    #[rstest]
    fn reads_raw_bytes(worktree: TempDir) {
        worktree.child("data.bin").write_binary(&[0, 159, 146, 150]).unwrap();

        let content = workspace(&worktree).read_file(Path::new("data.bin")).unwrap();

        assert_eq!(content.as_ref(), &[0, 159, 146, 150]);
    }

    #[rstest]
    fn missing_file_is_an_io_error(worktree: TempDir) {
        assert!(matches!(
            workspace(&worktree).read_file(Path::new("nope")),
            Err(Error::Io { .. })
        ));
    }

    #[rstest]
    fn stat_captures_times_size_and_mode(worktree: TempDir) {
        let file = worktree.child("run.sh");
        file.write_str("#!/bin/sh\n").unwrap();
        filetime::set_file_mtime(file.path(), FileTime::from_unix_time(1_700_000_000, 250)).unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        let metadata = workspace(&worktree).stat_file(Path::new("run.sh")).unwrap();

        assert_eq!(metadata.mtime, 1_700_000_000);
        assert_eq!(metadata.mtime_nsec, 250);
        assert_eq!(metadata.size, 10);
        assert_eq!(metadata.mode, EntryMode::File(FileMode::Executable));
        assert!(metadata.ino != 0);
    }

    #[rstest]
    fn symlinks_store_their_target(worktree: TempDir) {
        worktree.child("target.txt").write_str("x").unwrap();
        std::os::unix::fs::symlink("target.txt", worktree.path().join("link")).unwrap();
        let workspace = workspace(&worktree);

        assert_eq!(
            workspace.stat_file(Path::new("link")).unwrap().mode,
            EntryMode::Symlink
        );
        assert_eq!(workspace.read_file(Path::new("link")).unwrap().as_ref(), b"target.txt");
    }

    #[rstest]
    fn relative_paths_use_forward_slashes(worktree: TempDir) {
        worktree.child("a/b/c.txt").write_str("c").unwrap();
        let workspace = workspace(&worktree);

        assert_eq!(
            workspace.relative_path(workspace.path(), Path::new("a/b/c.txt")).unwrap(),
            "a/b/c.txt"
        );
        assert_eq!(
            workspace
                .relative_path(&workspace.path().join("a"), Path::new("b/c.txt"))
                .unwrap(),
            "a/b/c.txt"
        );
    }

    #[rstest]
    #[case(".git/config")]
    #[case("../elsewhere")]
    fn untrackable_paths_are_rejected(worktree: TempDir, #[case] path: &str) {
        worktree.child(".git").create_dir_all().unwrap();
        let workspace = workspace(&worktree);

        assert!(matches!(
            workspace.relative_path(workspace.path(), Path::new(path)),
            Err(Error::Malformed(_))
        ));
    }
}
