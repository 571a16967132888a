/*!
 * Binary detection and description
 *
 * Both capabilities are traits so the scanner and the writer can be driven
 * by fakes in tests. The shipped implementations sniff file content and
 * shell out to `file(1)`.
 */

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::Command;

use log::debug;

use crate::bail;
use crate::error::{Result, ResultExt};

/// Number of leading bytes inspected by [`ContentSniffer`]
pub const SNIFF_LEN: u64 = 8192;

/// Share of control bytes above which a non-UTF-8 sample counts as binary
const CONTROL_RATIO: f64 = 0.10;

/// Decides whether a file should be treated as binary
pub trait BinaryClassifier: Sync {
    /// Classify the file at `path`
    fn is_binary(&self, path: &Path) -> Result<bool>;
}

/// Produces a human-readable description of a binary file
pub trait BinaryDescriber {
    /// Describe `rel_path`, which is relative to `base`
    fn describe(&self, base: &Path, rel_path: &str) -> Result<Vec<u8>>;
}

/// Classifies files by looking at their first [`SNIFF_LEN`] bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl ContentSniffer {
    /// Classify an in-memory sample
    pub fn is_binary_sample(sample: &[u8]) -> bool {
        if sample.is_empty() {
            return false;
        }
        if sample.contains(&0) {
            return true;
        }

        match std::str::from_utf8(sample) {
            Ok(_) => return false,
            // A multibyte sequence cut off by the sample boundary
            Err(e) if e.error_len().is_none() => return false,
            Err(_) => {}
        }

        let control = sample
            .iter()
            .filter(|&&b| !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c) && (b < 0x20 || b == 0x7f))
            .count();

        control as f64 / sample.len() as f64 > CONTROL_RATIO
    }
}

impl BinaryClassifier for ContentSniffer {
    fn is_binary(&self, path: &Path) -> Result<bool> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

        let mut sample = Vec::with_capacity(SNIFF_LEN as usize);
        file.take(SNIFF_LEN)
            .read_to_end(&mut sample)
            .with_context(|| format!("reading {}", path.display()))?;

        Ok(Self::is_binary_sample(&sample))
    }
}

/// Describes binaries with the `file` command
#[derive(Debug, Clone)]
pub struct FileCommand {
    program: String,
}

impl FileCommand {
    /// Use a different executable with the same calling convention
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FileCommand {
    fn default() -> Self {
        Self::with_program("file")
    }
}

impl BinaryDescriber for FileCommand {
    fn describe(&self, base: &Path, rel_path: &str) -> Result<Vec<u8>> {
        debug!("Running {} {} in {}", self.program, rel_path, base.display());

        let output = Command::new(&self.program)
            .arg(rel_path)
            .current_dir(base)
            .output()
            .with_context(|| format!("running {} {}", self.program, rel_path))?;

        if !output.status.success() {
            bail!(
                Command,
                "{} {} exited with status: {}: {}",
                self.program,
                rel_path,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(combined)
    }
}
