/*!
 * File discovery: listing candidate files and filtering out binaries
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use log::{debug, info};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::classify::BinaryClassifier;
use crate::config::Config;
use crate::error::{MkctxError, Result};
use crate::git::Repository;
use crate::tree::ROOT_PREFIX;

/// Version-control directory never descended into by [`WalkLister`]
pub const VCS_DIR: &str = ".git";

/// Produces base-relative, slash-separated file paths
pub trait FileLister {
    /// List candidate files
    fn list(&self) -> Result<Vec<String>>;
}

/// Lists tracked and untracked-but-not-ignored files of a repository
pub struct GitLister {
    repo: Repository,
    prefix: String,
}

impl GitLister {
    /// List files of `repo` under `prefix`
    pub fn new(repo: Repository, prefix: impl Into<String>) -> Self {
        Self {
            repo,
            prefix: prefix.into(),
        }
    }
}

impl FileLister for GitLister {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.repo.list_files(&self.prefix)?)
    }
}

/// Recursive walk of a plain directory, skipping `.git`
pub struct WalkLister {
    root: PathBuf,
}

impl WalkLister {
    /// Walk everything below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileLister for WalkLister {
    fn list(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == VCS_DIR));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            files.push(slash_path(&self.root, entry.path())?);
        }

        Ok(files)
    }
}

/// Path of `path` relative to `root`, joined with `/`
fn slash_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let segments = rel
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| MkctxError::InvalidPath(path.display().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("/"))
}

/// Scanner producing the file list the tree is built from
pub struct Scanner<C: BinaryClassifier> {
    /// Scanner configuration
    config: Config,
    /// Classifier used to drop binaries
    classifier: C,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl<C: BinaryClassifier> Scanner<C> {
    /// Create a new scanner
    pub fn new(config: Config, classifier: C, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            classifier,
            progress,
        }
    }

    /// Lister matching the configuration
    fn lister(&self) -> Result<Box<dyn FileLister>> {
        if self.config.in_repo {
            let repo = Repository::open(&self.config.base_dir)?;
            Ok(Box::new(GitLister::new(repo, self.config.start_prefix.clone())))
        } else {
            Ok(Box::new(WalkLister::new(&self.config.base_dir)))
        }
    }

    /// List candidate files, dropping binaries unless they are allowed.
    /// The progress bar is cleared when scanning fails.
    pub fn scan(&self) -> Result<Vec<String>> {
        let result = self.scan_files();
        if let Err(e) = &result {
            debug!("Scan failed: {}", e);
            self.progress.finish_and_clear();
        }
        result
    }

    fn scan_files(&self) -> Result<Vec<String>> {
        self.progress.set_message(format!(
            "Listing files in {}",
            self.config.base_dir.display()
        ));
        let files = self.lister()?.list()?;
        info!(
            "Found {} files ({} mode, start {})",
            files.len(),
            if self.config.in_repo { "git" } else { "fs" },
            self.config.start_prefix
        );

        if self.config.allow_binary {
            return Ok(files);
        }
        self.filter_binaries(files)
    }

    /// Keep only the files the classifier considers text
    pub fn filter_binaries(&self, files: Vec<String>) -> Result<Vec<String>> {
        self.progress.set_length(files.len() as u64);
        self.progress.set_message("Checking for binary files");

        let base = &self.config.base_dir;
        let verdicts = files
            .par_iter()
            .map(|rel| {
                let binary = self.classifier.is_binary(&base.join(rel));
                self.progress.inc(1);
                binary
            })
            .collect::<Result<Vec<bool>>>()?;

        let text: Vec<String> = files
            .into_iter()
            .zip(verdicts)
            .filter_map(|(rel, binary)| {
                if binary {
                    debug!("Skipping binary file {}", rel);
                    None
                } else {
                    Some(rel)
                }
            })
            .collect();

        Ok(text)
    }

    /// Start prefix the listed paths live under
    pub fn start_prefix(&self) -> &str {
        if self.config.in_repo {
            &self.config.start_prefix
        } else {
            // The walk always covers the whole base
            ROOT_PREFIX
        }
    }
}
