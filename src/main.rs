use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mixwatch::model::MixVersion;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "mixwatch", version, about = "Mix version tracker")]
struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two snapshot files (first is "before", second is "after")
    Compare {
        /// Earlier snapshot
        v1: PathBuf,
        /// Later snapshot
        v2: PathBuf,

        /// Emit the diff as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Scan a version history for regressions
    Regressions {
        /// Snapshot files or directories containing them
        paths: Vec<PathBuf>,
    },

    /// List versions in chronological order with health scores
    Timeline {
        /// Snapshot files or directories containing them
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = mixwatch::config::AppConfig::load();
    let policy = config.policy;

    match cli.command {
        Commands::Compare { v1, v2, json } => {
            let before = load_version(&v1)?;
            let after = load_version(&v2)?;
            let diff = mixwatch::compare::compare_with(&policy, &before, &after)
                .context("Comparison failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&diff.to_value())?);
            } else {
                print!("{}", mixwatch::report::render_diff(&diff));
            }
        }

        Commands::Regressions { paths } => {
            let versions = load_versions(&paths)?;
            let count = versions.len();
            let diffs = mixwatch::history::find_regressions_with(&policy, versions)
                .context("History scan failed")?;
            if diffs.is_empty() {
                println!("No regressions across {count} version(s)");
            } else {
                println!("{} regression(s) across {count} version(s):", diffs.len());
                for diff in &diffs {
                    println!("  {} -> {}: {}", diff.v1_id, diff.v2_id, diff.summary);
                }
            }
        }

        Commands::Timeline { paths } => {
            let versions = load_versions(&paths)?;
            let sorted = mixwatch::history::sort_chronologically(versions);
            print!("{}", mixwatch::report::render_timeline(&sorted));
        }
    }

    Ok(())
}

/// Read one snapshot file through the canonical mapping form.
fn load_version(path: &Path) -> Result<MixVersion> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    MixVersion::from_value(value).with_context(|| format!("Failed to load {}", path.display()))
}

/// Collect snapshots from files and directories. Directories are walked
/// recursively for `.json` files; unreadable snapshots abort with context.
fn load_versions(paths: &[PathBuf]) -> Result<Vec<MixVersion>> {
    anyhow::ensure!(
        !paths.is_empty(),
        "No snapshot files or directories given. Pass paths as arguments."
    );

    let mut versions = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                let is_snapshot = p.is_file()
                    && p.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(mixwatch::SNAPSHOT_EXTENSION));
                if is_snapshot {
                    versions.push(load_version(p)?);
                }
            }
        } else {
            versions.push(load_version(path)?);
        }
    }
    log::info!("Loaded {} snapshot(s)", versions.len());
    Ok(versions)
}
