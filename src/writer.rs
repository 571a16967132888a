/*!
 * Markdown document writer for mkctx
 *
 * Each selected file becomes a level-2 heading followed by a fenced block.
 * Fences are negotiated per file so that no content can close its block
 * early. Content is streamed; nothing is buffered beyond the write buffer.
 */

use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, info};

use crate::classify::{BinaryClassifier, BinaryDescriber};
use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::fence::Fence;
use crate::language::language_for;
use crate::report::AssemblyReport;
use crate::utils::{estimate_tokens, format_file_size, output_file_name};

/// Markdown writer for selected files
pub struct MarkdownWriter<C, D> {
    /// Directory selected paths are relative to
    base_dir: PathBuf,
    /// Directory receiving documents
    output_dir: PathBuf,
    /// Whether binary files get described instead of embedded
    allow_binary: bool,
    classifier: C,
    describer: D,
}

impl<C: BinaryClassifier, D: BinaryDescriber> MarkdownWriter<C, D> {
    /// Create a new writer
    pub fn new(config: &Config, classifier: C, describer: D) -> Self {
        Self {
            base_dir: config.base_dir.clone(),
            output_dir: config.output_dir.clone(),
            allow_binary: config.allow_binary,
            classifier,
            describer,
        }
    }

    /// Write `selected` to a new timestamped document in the output
    /// directory
    pub fn write(&self, selected: &[String]) -> Result<AssemblyReport> {
        self.write_at(selected, Local::now())
    }

    /// Same as [`MarkdownWriter::write`] with an explicit timestamp
    pub fn write_at(&self, selected: &[String], now: DateTime<Local>) -> Result<AssemblyReport> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let path = self.output_dir.join(output_file_name(now));
        let file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;

        let mut writer = BufWriter::new(file);
        self.write_document(&mut writer, selected)?;
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        drop(writer);

        let bytes = fs::metadata(&path)
            .with_context(|| format!("reading metadata of {}", path.display()))?
            .len();
        let path = fs::canonicalize(&path)?;

        info!(
            "Wrote {} files to {} ({})",
            selected.len(),
            path.display(),
            format_file_size(bytes)
        );

        Ok(AssemblyReport {
            path,
            bytes,
            tokens: estimate_tokens(bytes),
            files: selected.len(),
        })
    }

    /// Write every selected file, in order, to `out`
    pub fn write_document<W: Write>(&self, out: &mut W, selected: &[String]) -> Result<()> {
        for rel in selected {
            self.write_entry(out, rel)?;
        }
        Ok(())
    }

    fn write_entry<W: Write>(&self, out: &mut W, rel: &str) -> Result<()> {
        let abs = self.base_dir.join(rel);

        writeln!(out, "## {}\n", rel)?;

        if self.allow_binary && self.classifier.is_binary(&abs)? {
            self.write_binary(out, rel)
        } else {
            self.write_text(out, rel, &abs)
        }
    }

    /// Embed the describer's output in an untagged block
    fn write_binary<W: Write>(&self, out: &mut W, rel: &str) -> Result<()> {
        let mut description = self.describer.describe(&self.base_dir, rel)?;
        while description.last() == Some(&b'\n') {
            description.pop();
        }

        let fence = Fence::for_bytes(&description);
        debug!("Describing binary {} inside a {}-backtick fence", rel, fence.width());

        writeln!(out, "{}", fence)?;
        out.write_all(&description)?;
        writeln!(out)?;
        writeln!(out, "{}\n", fence)?;
        Ok(())
    }

    /// Embed raw content: one pass to size the fence, one pass to copy
    fn write_text<W: Write>(&self, out: &mut W, rel: &str, abs: &Path) -> Result<()> {
        let mut file = File::open(abs).with_context(|| format!("opening {}", rel))?;

        let fence =
            Fence::for_reader(&mut file).with_context(|| format!("reading {}", rel))?;
        file.rewind().with_context(|| format!("rewinding {}", rel))?;
        debug!("Embedding {} inside a {}-backtick fence", rel, fence.width());

        match language_for(rel) {
            Some(lang) => writeln!(out, "{}{}", fence, lang)?,
            None => writeln!(out, "{}", fence)?,
        }
        io::copy(&mut file, out).with_context(|| format!("copying {}", rel))?;
        writeln!(out)?;
        writeln!(out, "{}\n", fence)?;
        Ok(())
    }
}
