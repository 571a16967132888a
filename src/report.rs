/*!
 * Reporting functionality for mkctx
 *
 * The report is consumed by scripts, so the default format is a fixed set
 * of `key=value` lines on stdout.
 */

use std::path::PathBuf;

/// Result of assembling a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Absolute path of the written document
    pub path: PathBuf,
    /// Final size in bytes
    pub bytes: u64,
    /// Estimated token count
    pub tokens: u64,
    /// Number of files embedded
    pub files: usize,
}

/// Format of the report output
pub enum ReportFormat {
    /// `path=`, `bytes=` and `tokens=` lines
    KeyValue,
    /// One human-readable sentence, used for log output
    Summary,
}

/// Report generator for assembly results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &AssemblyReport) -> String {
        match self.format {
            ReportFormat::KeyValue => format!(
                "path={}\nbytes={}\ntokens={}",
                report.path.display(),
                report.bytes,
                report.tokens
            ),
            ReportFormat::Summary => format!(
                "Wrote {} files to {} ({}, ~{} tokens)",
                report.files,
                report.path.display(),
                crate::utils::format_file_size(report.bytes),
                report.tokens
            ),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &AssemblyReport) {
        println!("{}", self.generate_report(report));
    }
}
