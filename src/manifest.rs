//! Job lists.
//!
//! A [`Manifest`] names the files to process, each as an
//! `(input, output, threshold)` triple. It can be loaded from TOML, built from
//! paths given on the command line, or taken from the built-in icon preset.
//!
//! ```toml
//! base_dir = "client/public"
//! threshold = 240
//! fail_fast = false
//! backup_suffix = ".orig"
//!
//! [[job]]
//! input = "mosque-icon.png"
//!
//! [[job]]
//! input = "church-icon.png"
//! output = "church-icon-clear.png"
//! threshold = 230
//! ```
//!
//! Relative paths are joined onto `base_dir` when one is given. A job without
//! `output` overwrites its input.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::classify::DEFAULT_THRESHOLD;
use crate::error::{Error, Result};
use crate::strip::FailurePolicy;

/// Directory the icon preset is resolved against by default.
pub const DEFAULT_BASE_DIR: &str = "client/public";

/// Icons processed when no other job source is given.
pub const ICON_PRESET: [&str; 3] = ["mosque-icon.png", "church-icon.png", "synagogue-icon.png"];

/// One unit of work: read `input`, strip with `threshold`, write `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Source image.
    pub input: PathBuf,
    /// Destination PNG. Equal to `input` for in-place overwrite.
    pub output: PathBuf,
    /// Per-channel brightness cutoff.
    pub threshold: u8,
}

impl Job {
    /// A job that overwrites `path` with its stripped version.
    #[must_use]
    pub fn in_place(path: impl Into<PathBuf>, threshold: u8) -> Self {
        let input = path.into();
        Self {
            output: input.clone(),
            input,
            threshold,
        }
    }
}

/// A `[[job]]` table as written in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobEntry {
    /// Source image, relative to `base_dir` if not absolute.
    pub input: PathBuf,
    /// Destination; defaults to `input`.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Overrides the manifest-wide threshold.
    #[serde(default)]
    pub threshold: Option<u8>,
}

/// A list of jobs plus batch-wide settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Directory that relative job paths are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Threshold for jobs that do not set their own.
    pub threshold: u8,
    /// Stop at the first failed file.
    pub fail_fast: bool,
    /// Copy each original to `<input><suffix>` before overwriting.
    pub backup_suffix: Option<String>,
    /// Job entries, in processing order.
    #[serde(rename = "job")]
    pub entries: Vec<JobEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            base_dir: None,
            threshold: DEFAULT_THRESHOLD,
            fail_fast: false,
            backup_suffix: None,
            entries: Vec::new(),
        }
    }
}

impl Manifest {
    /// Read and parse a TOML manifest.
    ///
    /// When the manifest has no `base_dir`, relative job paths resolve
    /// against the manifest's own directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestRead`] if the file cannot be read and
    /// [`Error::ManifestParse`] if its contents are invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_toml(&content)?;

        let manifest_dir = path.parent().unwrap_or(Path::new("."));
        manifest.base_dir = Some(match manifest.base_dir.take() {
            Some(base) => manifest_dir.join(base),
            None => manifest_dir.to_path_buf(),
        });
        Ok(manifest)
    }

    /// Parse a manifest from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestParse`] on malformed TOML, unknown keys, or
    /// thresholds outside `0..=255`.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The built-in icon list, overwritten in place under `base_dir`.
    #[must_use]
    pub fn icon_preset(base_dir: impl Into<PathBuf>, threshold: u8) -> Self {
        let mut manifest = Self::from_paths(ICON_PRESET.into_iter().map(PathBuf::from), threshold);
        manifest.base_dir = Some(base_dir.into());
        manifest
    }

    /// In-place jobs for each of `paths`, all with the same threshold.
    #[must_use]
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>, threshold: u8) -> Self {
        Self {
            threshold,
            entries: paths
                .into_iter()
                .map(|input| JobEntry {
                    input,
                    output: None,
                    threshold: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Failure policy selected by `fail_fast`.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::BestEffort
        }
    }

    /// Resolve entries into concrete jobs.
    #[must_use]
    pub fn jobs(&self) -> Vec<Job> {
        self.entries
            .iter()
            .map(|entry| {
                let input = self.resolve(&entry.input);
                let output = entry
                    .output
                    .as_deref()
                    .map_or_else(|| input.clone(), |o| self.resolve(o));
                Job {
                    input,
                    output,
                    threshold: entry.threshold.unwrap_or(self.threshold),
                }
            })
            .collect()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
