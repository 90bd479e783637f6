//! mirrorkit CLI
//!
//! Make DESTINATION mirror SOURCE: copy new/resized files, then delete
//! whatever SOURCE does not have.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use mirrorkit_io_fs::{
    EnumDirRetainedMode, EnumPatternMode, SinkTracing, SpecMirrorJob, SpecMirrorOptions,
    mirror_copy, mirror_tree,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// One-way directory mirroring.
#[derive(Parser, Debug)]
#[command(name = "mirrorkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to mirror from
    source: PathBuf,

    /// Directory to mirror into (created if missing)
    destination: PathBuf,

    /// Basename pattern to leave out of both trees (repeatable)
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    excludes: Vec<String>,

    /// How exclude patterns are interpreted
    #[arg(long, value_enum, default_value_t = PatternModeArg::Glob)]
    pattern_mode: PatternModeArg,

    /// Warn about orphan directories that could not be removed
    #[arg(long)]
    warn_retained_dirs: bool,

    /// Copy permissions, timestamps and extended attributes
    #[arg(long)]
    preserve_metadata: bool,

    /// Run the copy pass only, never delete
    #[arg(long)]
    copy_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PatternModeArg {
    Glob,
    Regex,
    Literal,
}

impl From<PatternModeArg> for EnumPatternMode {
    fn from(value: PatternModeArg) -> Self {
        match value {
            PatternModeArg::Glob => EnumPatternMode::Glob,
            PatternModeArg::Regex => EnumPatternMode::Regex,
            PatternModeArg::Literal => EnumPatternMode::Literal,
        }
    }
}

impl Cli {
    fn to_job(&self) -> SpecMirrorJob {
        SpecMirrorJob::new(
            self.source.to_string_lossy(),
            self.destination.to_string_lossy(),
        )
    }

    fn to_options(&self) -> SpecMirrorOptions {
        SpecMirrorOptions {
            rule_dir_retained: if self.warn_retained_dirs {
                EnumDirRetainedMode::Warn
            } else {
                EnumDirRetainedMode::Ignore
            },
            patterns_exclude: (!self.excludes.is_empty()).then(|| self.excludes.clone()),
            rule_pattern: self.pattern_mode.into(),
            if_preserve_metadata: self.preserve_metadata,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let spec_job = cli.to_job();
    let spec_options = cli.to_options();
    let mut sink = SinkTracing;

    let res = if cli.copy_only {
        mirror_copy(&spec_job, &spec_options, &mut sink)
    } else {
        mirror_tree(&spec_job, &spec_options, &mut sink)
    };

    match res {
        Ok(report) => {
            info!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
