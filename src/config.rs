/*!
 * Configuration handling for mkctx
 */

use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::ensure;
use crate::error::{Result, ResultExt};
use crate::git::Repository;
use crate::tree::ROOT_PREFIX;

/// Directory, under the base, that receives generated documents
pub const OUTPUT_DIR_NAME: &str = ".mkctx";

/// Environment variable naming a debug log file
pub const LOG_ENV: &str = "MKCTX_LOG";

/// Command-line arguments for mkctx
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "mkctx",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pick project files in a terminal tree and assemble them into one Markdown document",
    long_about = "Browse the current directory (or the Git-tracked files under it), select files and \
                  write them to .mkctx/source-context-<timestamp>.md, ready to paste as LLM context."
)]
pub struct Args {
    /// Allow selecting binary files (embedded as the output of `file <path>`)
    #[clap(short = 'b', long = "binary")]
    pub allow_binary: bool,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Repository work tree, or the working directory outside a repository
    pub base_dir: PathBuf,

    /// Slash-separated directory the tree starts at, relative to `base_dir`
    pub start_prefix: String,

    /// Whether `base_dir` is a Git work tree
    pub in_repo: bool,

    /// Whether binary files may be selected
    pub allow_binary: bool,

    /// Where documents are written
    pub output_dir: PathBuf,

    /// Debug log destination
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments and the process
    /// environment (working directory, enclosing repository, `MKCTX_LOG`)
    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = env::current_dir().with_context(|| "determining working directory")?;
        let log_file = env::var_os(LOG_ENV).map(PathBuf::from);

        let mut config = Self::for_dir(&cwd, args.allow_binary)?;
        config.log_file = log_file;
        Ok(config)
    }

    /// Resolve the configuration as if mkctx was started in `dir`
    pub fn for_dir(dir: &Path, allow_binary: bool) -> Result<Self> {
        Self::resolve(dir, Repository::discover(dir)?, allow_binary)
    }

    /// Configuration for `dir` given the repository enclosing it, if any
    fn resolve(dir: &Path, repo: Option<Repository>, allow_binary: bool) -> Result<Self> {
        let (base_dir, start_prefix, in_repo) = match repo {
            Some(repo) => {
                let prefix = repo.prefix_of(dir)?;
                (repo.workdir().to_path_buf(), prefix, true)
            }
            None => (dir.to_path_buf(), ROOT_PREFIX.to_string(), false),
        };

        Ok(Self {
            output_dir: base_dir.join(OUTPUT_DIR_NAME),
            base_dir,
            start_prefix,
            in_repo,
            allow_binary,
            log_file: None,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.base_dir.is_dir(),
            Config,
            "Base directory not found: {}",
            self.base_dir.display()
        );

        if self.start_prefix != ROOT_PREFIX {
            let start = self.base_dir.join(&self.start_prefix);
            ensure!(
                start.is_dir(),
                Config,
                "Start directory not found: {}",
                start.display()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_args_binary_flag() {
        let args = Args::parse_from(["mkctx"]);
        assert!(!args.allow_binary);
        let args = Args::parse_from(["mkctx", "-b"]);
        assert!(args.allow_binary);
        let args = Args::parse_from(["mkctx", "--binary"]);
        assert!(args.allow_binary);
        assert!(Args::try_parse_from(["mkctx", "--output", "x"]).is_err());
    }

    #[test]
    fn test_plain_directory_config() {
        let dir = tempdir().unwrap();
        let config = Config::resolve(dir.path(), None, false).unwrap();

        assert!(!config.in_repo);
        assert!(!config.allow_binary);
        assert_eq!(config.base_dir, dir.path());
        assert_eq!(config.start_prefix, ".");
        assert_eq!(config.output_dir, dir.path().join(".mkctx"));
        config.validate().unwrap();
    }

    #[test]
    fn test_repository_subdirectory_config() {
        let dir = tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let sub = dir.path().join("pkg").join("api");
        fs::create_dir_all(&sub).unwrap();

        let config = Config::for_dir(&sub, true).unwrap();
        assert!(config.in_repo);
        assert!(config.allow_binary);
        assert_eq!(config.base_dir, fs::canonicalize(dir.path()).unwrap());
        assert_eq!(config.start_prefix, "pkg/api");
        assert_eq!(config.output_dir, config.base_dir.join(".mkctx"));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_missing_base() {
        let config = Config {
            base_dir: PathBuf::from("/definitely/not/here"),
            start_prefix: ".".to_string(),
            in_repo: false,
            allow_binary: false,
            output_dir: PathBuf::from("/definitely/not/here/.mkctx"),
            log_file: None,
        };
        assert!(config.validate().is_err());
    }
}
