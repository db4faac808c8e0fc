use std::path::PathBuf;
use std::process;

use clap::Parser;

use icon_bg_strip::{
    Backend, BatchReport, FileResult, FileStatus, Manifest, StripOptions, Stripper,
    DEFAULT_BASE_DIR, DEFAULT_THRESHOLD,
};

#[derive(Parser)]
#[command(
    name = "icon-bg-strip",
    about = "Make near-white icon backgrounds transparent (writes PNG, in place by default)",
    version,
    after_help = "With no FILES and no --config, the built-in icon set under --base-dir is processed:\n  \
                  mosque-icon.png, church-icon.png, synagogue-icon.png\n\n\
                  NOTE: originals are overwritten unless --output or --backup is given."
)]
struct Cli {
    /// Image files to process in place
    files: Vec<PathBuf>,

    /// TOML manifest listing jobs
    #[arg(short, long, conflicts_with = "files")]
    config: Option<PathBuf>,

    /// Directory holding the built-in icon set
    #[arg(short, long, default_value = DEFAULT_BASE_DIR)]
    base_dir: PathBuf,

    /// Output path (only with a single input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-channel cutoff (0-255); pixels brighter on R, G and B become transparent
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Decode/encode backend
    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    backend: Backend,

    /// Stop at the first failed file
    #[arg(long)]
    fail_fast: bool,

    /// Keep a copy of each original as <file><SUFFIX>
    #[arg(long, value_name = "SUFFIX")]
    backup: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.output.is_some() && cli.files.len() != 1 {
        eprintln!("Error: --output requires exactly one input file");
        process::exit(1);
    }

    let mut manifest = if let Some(path) = &cli.config {
        match Manifest::load(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else if cli.files.is_empty() {
        Manifest::icon_preset(&cli.base_dir, DEFAULT_THRESHOLD)
    } else {
        Manifest::from_paths(cli.files.iter().cloned(), DEFAULT_THRESHOLD)
    };

    // Command-line flags win over manifest settings.
    if let Some(t) = cli.threshold {
        manifest.threshold = t;
        for entry in &mut manifest.entries {
            entry.threshold = None;
        }
    }
    if cli.fail_fast {
        manifest.fail_fast = true;
    }
    if cli.backup.is_some() {
        manifest.backup_suffix.clone_from(&cli.backup);
    }

    let mut jobs = manifest.jobs();
    if let (Some(output), [job]) = (&cli.output, jobs.as_mut_slice()) {
        job.output.clone_from(output);
    }

    if !cli.quiet {
        eprintln!(
            "Stripping backgrounds (threshold: {}, backend: {:?})",
            manifest.threshold, cli.backend
        );
        if manifest.backup_suffix.is_none() && jobs.iter().any(|j| j.input == j.output) {
            eprintln!("WARNING: originals will be overwritten in place");
        }
        eprintln!();
    }

    let stripper = Stripper::new(StripOptions::from_manifest(&manifest, cli.backend));
    let report = stripper.run(&jobs);

    for r in &report.results {
        print_result(r, &cli);
    }

    if !cli.quiet {
        print_summary(&report, jobs.len());
    }

    if !report.is_success() {
        process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_result(result: &FileResult, cli: &Cli) {
    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    match &result.status {
        FileStatus::Processed(stats) => {
            if !cli.quiet {
                eprintln!(
                    "[OK] {filename} (cleared {} of {} pixels)",
                    stats.cleared,
                    stats.total()
                );
            }
            if cli.verbose {
                eprintln!("  -> {}", result.output.display());
            }
        }
        FileStatus::Skipped(reason) => {
            if !cli.quiet {
                eprintln!("[SKIP] {filename}: {reason}");
            }
        }
        FileStatus::Failed(message) => {
            eprintln!("[FAIL] {filename}: {message}");
        }
    }
}

fn print_summary(report: &BatchReport, total: usize) {
    eprintln!();
    eprint!("[Summary] Processed: {}", report.processed());
    if report.skipped() > 0 {
        eprint!(", Skipped: {}", report.skipped());
    }
    if report.failed() > 0 {
        eprint!(", Failed: {}", report.failed());
    }
    eprintln!(" (Total: {total})");

    if report.aborted {
        eprintln!(
            "Aborted after first failure; {} file(s) not processed",
            total - report.results.len()
        );
    }
}
