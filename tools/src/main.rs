use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use safeparcel_tools::{format_report_pretty, inspect_bytes, InspectReport};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wire::Limits;

#[derive(Parser)]
#[command(
    name = "safeparcel-tools",
    version,
    about = "safeparcel inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect the field layout of encoded objects.
    Inspect {
        /// Path to an encoded object, or a directory of them.
        path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected files.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected files (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        /// Decode limits to apply.
        #[arg(long, value_enum, default_value_t = LimitsPreset::Default)]
        limits: LimitsPreset,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LimitsPreset {
    Default,
    Testing,
    Unlimited,
}

impl LimitsPreset {
    fn limits(self) -> Limits {
        match self {
            Self::Default => Limits::default(),
            Self::Testing => Limits::for_testing(),
            Self::Unlimited => Limits::unlimited(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
            format,
            limits,
        } => {
            let limits = limits.limits();
            if path.is_dir() {
                let entries = collect_entries(&path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read object {}", entry.path.display()))?;
                    match inspect_bytes(&bytes, &limits) {
                        Ok(report) => {
                            println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                            print_report(&report, format)?;
                        }
                        Err(err) => warn!(path = %entry.path.display(), error = %err, "skipping file"),
                    }
                }
            } else {
                let bytes = fs::read(&path)
                    .with_context(|| format!("read object {}", path.display()))?;
                let report = inspect_bytes(&bytes, &limits)?;
                print_report(&report, format)?;
            }
        }
    }
    Ok(())
}

struct Entry {
    path: PathBuf,
    size: u64,
}

fn collect_entries(dir: &PathBuf, glob: Option<&str>) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                debug!(path = %path.display(), "glob filtered");
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(Entry { path, size });
    }
    Ok(entries)
}

fn maybe_sort_entries(mut entries: Vec<Entry>, sort: Option<InspectSort>) -> Vec<Entry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}

fn print_report(report: &InspectReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_report_pretty(report)),
    }
    Ok(())
}
