/*!
 * Git repository discovery and file listing
 */

use std::fs;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository as Git2Repository, Status, StatusOptions};
use log::debug;

use super::error::{GitError, GitResult};
use crate::tree::ROOT_PREFIX;

/// Index mode of submodule entries
const GITLINK_MODE: u32 = 0o160000;

/// A non-bare Git repository and its canonical work tree
pub struct Repository {
    /// Inner git2 repository instance
    inner: Git2Repository,
    /// Canonical work tree root
    workdir: PathBuf,
}

impl Repository {
    /// Open the repository whose work tree is exactly `path`
    pub fn open(path: &Path) -> GitResult<Self> {
        let repo = Git2Repository::open(path).map_err(GitError::OpenError)?;
        Self::from_git2(repo)?
            .ok_or_else(|| GitError::OutsideWorkdir(path.display().to_string()))
    }

    /// Find the repository containing `start`, searching parent directories.
    /// Returns `None` outside of any repository or inside a bare one.
    pub fn discover(start: &Path) -> GitResult<Option<Self>> {
        match Git2Repository::discover(start) {
            Ok(repo) => Self::from_git2(repo),
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!("No repository above {}", start.display());
                Ok(None)
            }
            Err(e) => Err(GitError::OpenError(e)),
        }
    }

    fn from_git2(repo: Git2Repository) -> GitResult<Option<Self>> {
        let workdir = match repo.workdir() {
            Some(dir) => fs::canonicalize(dir)?,
            None => return Ok(None),
        };
        Ok(Some(Self {
            inner: repo,
            workdir,
        }))
    }

    /// Canonical work tree root
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Slash-separated position of `dir` inside the work tree, `"."` for
    /// the root itself
    pub fn prefix_of(&self, dir: &Path) -> GitResult<String> {
        let dir = fs::canonicalize(dir)?;
        let rel = dir
            .strip_prefix(&self.workdir)
            .map_err(|_| GitError::OutsideWorkdir(dir.display().to_string()))?;

        let segments = rel
            .components()
            .map(|c| {
                c.as_os_str()
                    .to_str()
                    .map(str::to_string)
                    .ok_or_else(|| GitError::InvalidPath(rel.display().to_string()))
            })
            .collect::<GitResult<Vec<_>>>()?;

        if segments.is_empty() {
            Ok(ROOT_PREFIX.to_string())
        } else {
            Ok(segments.join("/"))
        }
    }

    /// Tracked files plus untracked files that are not ignored, restricted
    /// to `prefix`, sorted and deduplicated. Paths are relative to the work
    /// tree root.
    pub fn list_files(&self, prefix: &str) -> GitResult<Vec<String>> {
        let mut files = Vec::new();

        let index = self.inner.index().map_err(GitError::ListError)?;
        for entry in index.iter() {
            if entry.mode == GITLINK_MODE {
                continue;
            }
            files.push(utf8_path(&entry.path)?);
        }

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self
            .inner
            .statuses(Some(&mut opts))
            .map_err(GitError::ListError)?;
        for entry in statuses.iter() {
            if entry.status().contains(Status::WT_NEW) {
                files.push(utf8_path(entry.path_bytes())?);
            }
        }

        // Untracked nested repositories are reported as `dir/`
        files.retain(|path| !path.ends_with('/') && within_prefix(path, prefix));
        files.sort();
        files.dedup();

        debug!(
            "Listed {} files under {} in {}",
            files.len(),
            prefix,
            self.workdir.display()
        );
        Ok(files)
    }
}

fn utf8_path(bytes: &[u8]) -> GitResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| GitError::InvalidPath(String::from_utf8_lossy(bytes).into_owned()))
}

/// True when `path` lies under the slash-separated `prefix`
pub fn within_prefix(path: &str, prefix: &str) -> bool {
    if prefix == ROOT_PREFIX {
        return true;
    }
    path.strip_prefix(prefix)
        .map_or(false, |rest| rest.starts_with('/'))
}
