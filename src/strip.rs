//! Background stripping of files and job batches.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::backend::{self, Backend};
use crate::classify;
use crate::error::{Error, Result};
use crate::manifest::{Job, Manifest};

/// What to do with the rest of a batch after a file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and keep going.
    #[default]
    BestEffort,
    /// Stop at the first failure.
    FailFast,
}

/// Options controlling how files are processed.
#[derive(Debug, Clone, Default)]
pub struct StripOptions {
    /// Decode/encode adapter.
    pub backend: Backend,
    /// Continue-or-abort behavior for batches.
    pub policy: FailurePolicy,
    /// When set, each input is copied to `<input><suffix>` before the output
    /// is written.
    pub backup_suffix: Option<String>,
}

impl StripOptions {
    /// Options taken from a manifest's batch settings.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest, backend: Backend) -> Self {
        Self {
            backend,
            policy: manifest.policy(),
            backup_suffix: manifest.backup_suffix.clone(),
        }
    }
}

/// Outcome of stripping one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripStats {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of pixels made transparent.
    pub cleared: usize,
}

impl StripStats {
    /// Total pixel count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Status of one job after a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Stripped and written.
    Processed(StripStats),
    /// Input was missing; nothing written.
    Skipped(String),
    /// Decode, encode, backup or write failed.
    Failed(String),
}

/// Result of one job.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Input path of the job.
    pub path: PathBuf,
    /// Output path of the job.
    pub output: PathBuf,
    /// What happened.
    pub status: FileStatus,
}

/// Results of a batch, in job order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per visited job.
    pub results: Vec<FileResult>,
    /// The batch stopped early under [`FailurePolicy::FailFast`].
    pub aborted: bool,
}

impl BatchReport {
    /// Number of files stripped and written.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Processed(_)))
    }

    /// Number of files skipped because they were missing.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped(_)))
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed(_)))
    }

    /// No file failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

/// Strip the near-white background of `input` and write a PNG to `output`.
///
/// `output` may equal `input`; the whole image is decoded and re-encoded in
/// memory before the file is replaced.
///
/// # Errors
///
/// - [`Error::FileNotFound`] if `input` cannot be opened.
/// - [`Error::Decode`] if `input` is not a decodable image.
/// - [`Error::Write`] if `output` cannot be written.
pub fn strip_background(input: &Path, output: &Path, threshold: u8) -> Result<StripStats> {
    Stripper::default().strip(input, output, threshold)
}

/// Processes files one after another with fixed [`StripOptions`].
#[derive(Debug, Clone, Default)]
pub struct Stripper {
    opts: StripOptions,
}

impl Stripper {
    /// Create a stripper with the given options.
    #[must_use]
    pub fn new(opts: StripOptions) -> Self {
        Self { opts }
    }

    /// Options in use.
    #[must_use]
    pub fn options(&self) -> &StripOptions {
        &self.opts
    }

    /// Load, strip, encode, optionally back up, then write.
    ///
    /// # Errors
    ///
    /// Same as [`strip_background`], plus [`Error::Backup`] when a backup
    /// suffix is configured and the copy fails. An existing backup is never
    /// overwritten, so it keeps the first original seen.
    pub fn strip(&self, input: &Path, output: &Path, threshold: u8) -> Result<StripStats> {
        let backend = self.opts.backend;
        let decoded = backend.load(input)?;
        let (rgba, cleared) = classify::strip_image(&decoded, threshold);
        let bytes = backend.encode(&rgba)?;

        if let Some(suffix) = &self.opts.backup_suffix {
            let backup = backup_path(input, suffix);
            if backup.exists() {
                debug!("keeping existing backup {}", backup.display());
            } else {
                std::fs::copy(input, &backup).map_err(|source| Error::Backup {
                    path: backup.clone(),
                    source,
                })?;
                debug!("backed up {} to {}", input.display(), backup.display());
            }
        }

        backend::write_output(output, &bytes)?;

        Ok(StripStats {
            width: rgba.width(),
            height: rgba.height(),
            cleared,
        })
    }

    /// Run one job, turning errors into a [`FileResult`].
    ///
    /// A missing input is a skip, not a failure.
    #[must_use]
    pub fn process_job(&self, job: &Job) -> FileResult {
        let status = if job.input.exists() {
            match self.strip(&job.input, &job.output, job.threshold) {
                Ok(stats) => {
                    debug!(
                        "{}: {}x{}, cleared {} pixels (threshold {})",
                        job.output.display(),
                        stats.width,
                        stats.height,
                        stats.cleared,
                        job.threshold
                    );
                    FileStatus::Processed(stats)
                }
                Err(Error::FileNotFound { path, source }) => {
                    warn!("skipping {}: {source}", path.display());
                    FileStatus::Skipped(source.to_string())
                }
                Err(e) => {
                    error!("{e}");
                    FileStatus::Failed(e.to_string())
                }
            }
        } else {
            warn!("skipping {}: not found", job.input.display());
            FileStatus::Skipped("not found".to_string())
        };

        FileResult {
            path: job.input.clone(),
            output: job.output.clone(),
            status,
        }
    }

    /// Run every job in order, honoring the failure policy.
    #[must_use]
    pub fn run(&self, jobs: &[Job]) -> BatchReport {
        info!("processing {} file(s)", jobs.len());
        let mut report = BatchReport::default();

        for job in jobs {
            let result = self.process_job(job);
            let failed = matches!(result.status, FileStatus::Failed(_));
            report.results.push(result);

            if failed && self.opts.policy == FailurePolicy::FailFast {
                report.aborted = true;
                info!(
                    "fail-fast: stopping with {} file(s) not visited",
                    jobs.len() - report.results.len()
                );
                break;
            }
        }

        report
    }
}

/// `<input><suffix>`, e.g. `icon.png` + `.orig` = `icon.png.orig`.
#[must_use]
pub fn backup_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
