//! Make near-white icon backgrounds transparent.
//!
//! Every pixel whose red, green and blue channels all exceed a threshold
//! (240 by default) becomes fully transparent white; everything else is kept.
//! Results are always written as PNG, usually over the original file.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use icon_bg_strip::{strip_background, DEFAULT_THRESHOLD};
//!
//! let icon = Path::new("client/public/church-icon.png");
//! let stats = strip_background(icon, icon, DEFAULT_THRESHOLD).expect("strip failed");
//! println!("cleared {} of {} pixels", stats.cleared, stats.total());
//! ```
//!
//! # Batches
//!
//! A [`Manifest`] lists `(input, output, threshold)` jobs; a [`Stripper`]
//! runs them one at a time and collects a [`BatchReport`].
//!
//! ```no_run
//! use icon_bg_strip::{Backend, Manifest, StripOptions, Stripper};
//!
//! let manifest = Manifest::icon_preset("client/public", 240);
//! let stripper = Stripper::new(StripOptions::from_manifest(&manifest, Backend::Auto));
//! let report = stripper.run(&manifest.jobs());
//! println!("processed {}, skipped {}", report.processed(), report.skipped());
//! ```

#![deny(missing_docs)]

mod backend;
pub mod classify;
pub mod error;
pub mod manifest;
mod strip;

pub use backend::{write_output, Backend};
pub use classify::{is_background, strip_image, strip_pixels, DEFAULT_THRESHOLD, TRANSPARENT_WHITE};
pub use error::{Error, Result};
pub use manifest::{Job, Manifest, DEFAULT_BASE_DIR, ICON_PRESET};
pub use strip::{
    backup_path, strip_background, BatchReport, FailurePolicy, FileResult, FileStatus,
    StripOptions, StripStats, Stripper,
};
