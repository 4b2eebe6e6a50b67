//! Cargan CLI - Command-line tool for unpacking CAR/GAN containers.
//!
//! This is the main entry point for the Cargan command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cargan::prelude::*;

/// Cargan - CAR/GAN container extraction tool
#[derive(Parser)]
#[command(name = "cargan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every payload of a container
    Extract {
        /// Path to the container file
        #[arg(short, long, env = "CARGAN_INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "CARGAN_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Keep files that already exist in the output directory
        #[arg(long)]
        no_overwrite: bool,

        /// Drop directory components from payload names
        #[arg(long)]
        flatten: bool,

        /// Decode everything first, then write files in parallel
        #[arg(long, conflicts_with = "filter")]
        parallel: bool,
    },

    /// List the payloads of a container
    List {
        /// Path to the container file
        #[arg(short, long, env = "CARGAN_INPUT")]
        input: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show offset, size and name resolution
        #[arg(short, long)]
        detailed: bool,

        /// Print the listing as JSON
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Show container header and index information
    Info {
        /// Path to the container file
        #[arg(short, long, env = "CARGAN_INPUT")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            output,
            filter,
            no_overwrite,
            flatten,
            parallel,
        } => {
            let options = ExtractOptions {
                overwrite: !no_overwrite,
                flatten,
            };
            if parallel {
                cmd_extract_parallel(&input, &output, &options)?;
            } else {
                cmd_extract(&input, &output, filter.as_deref(), &options)?;
            }
        }
        Commands::List {
            input,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&input, filter.as_deref(), detailed, json)?;
        }
        Commands::Info { input } => {
            cmd_info(&input)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_container(path: &Path) -> Result<Container> {
    Container::open(path)
        .with_context(|| format!("Failed to open container {}", path.display()))
}

/// Spinner for extraction progress. The chunk count is only known once the
/// data section has been walked, so no total is shown.
fn progress_spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} files {wide_msg}")?,
    );
    Ok(pb)
}

fn cmd_extract(
    input: &Path,
    output: &Path,
    filter: Option<&str>,
    options: &ExtractOptions,
) -> Result<()> {
    println!("Opening container: {}", input.display());

    let container = open_container(input)?;
    println!(
        "{} container, {} index entries declared",
        container.variant(),
        container.header().index_count()
    );

    let filter = name_filter(filter)?;
    let start = Instant::now();

    // Without a filter the library writes records as they are decoded.
    let Some(pattern) = filter else {
        let pb = progress_spinner()?;
        let summary = extract_all(&container, output, options, |event| {
            pb.set_message(event.record().name.clone());
            pb.inc(1);
        })
        .context("Extraction incomplete")?;
        pb.finish_with_message("Done");
        print_summary(&summary, output, start);
        return Ok(());
    };

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let pb = progress_spinner()?;
    let mut summary = ExtractSummary {
        variant: container.variant(),
        written: 0,
        skipped: 0,
        bytes: 0,
    };

    for record in container.parse()? {
        let record = record.context("Extraction incomplete")?;
        pb.inc(1);
        if !matches_filter(Some(&pattern), &record.name) {
            continue;
        }

        let (_, written) = cargan::container::extract::write_record(output, &record, options)?;
        if written {
            summary.written += 1;
            summary.bytes += record.data.len() as u64;
        } else {
            summary.skipped += 1;
        }
        pb.set_message(record.name);
    }

    pb.finish_with_message("Done");
    print_summary(&summary, output, start);

    Ok(())
}

fn cmd_extract_parallel(input: &Path, output: &Path, options: &ExtractOptions) -> Result<()> {
    println!("Opening container: {}", input.display());

    let container = open_container(input)?;
    let start = Instant::now();
    let pb = progress_spinner()?;

    let summary = extract_parallel(&container, output, options, |_| pb.inc(1))
        .context("Extraction incomplete")?;

    pb.finish_with_message("Done");
    print_summary(&summary, output, start);

    Ok(())
}

fn print_summary(summary: &ExtractSummary, output: &Path, start: Instant) {
    println!(
        "Extracted {} files ({} bytes, {} skipped, {}) to {} in {:?}",
        summary.written,
        summary.bytes,
        summary.skipped,
        summary.variant,
        output.display(),
        start.elapsed()
    );
}

fn cmd_list(input: &Path, filter: Option<&str>, detailed: bool, json: bool) -> Result<()> {
    let container = open_container(input)?;
    let filter = name_filter(filter)?;
    let rows = list_rows(&container, filter.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        if detailed {
            println!(
                "{:>10} {:>12} {} {}",
                row.offset,
                row.size,
                if row.resolved { " " } else { "?" },
                row.name
            );
        } else {
            println!("{}", row.name);
        }
    }

    println!("\nTotal: {} entries", rows.len());

    Ok(())
}

fn cmd_info(input: &Path) -> Result<()> {
    let container = open_container(input)?;
    let header = container.header();
    let index = container.index().context("Failed to read index table")?;

    let reserved: String = header
        .reserved()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();

    println!("Container:      {}", container.name());
    println!("Size:           {} bytes", container.len());
    println!(
        "Magic:          {:#010x}{}",
        header.magic(),
        if header.is_recognized() { "" } else { " (unrecognized)" }
    );
    println!("Variant:        {}", container.variant());
    println!("Reserved:       {}", reserved);
    println!("Index declared: {}", header.index_count());
    println!("Index entries:  {} ({} distinct offsets)", index.len(), index.distinct_offsets());

    Ok(())
}

/// Decoded records matching `filter`, as listing rows.
fn list_rows(container: &Container, filter: Option<&Pattern>) -> Result<Vec<RecordInfo>> {
    let mut rows = Vec::new();
    for record in container.parse()? {
        let info = record?.info();
        if matches_filter(filter, &info.name) {
            rows.push(info);
        }
    }
    Ok(rows)
}

const FILTER_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compile a `--filter` glob.
fn name_filter(pattern: Option<&str>) -> Result<Option<Pattern>> {
    pattern
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid glob pattern: {p}")))
        .transpose()
}

/// Case-insensitive glob match; backslashes in names count as `/`.
fn matches_filter(filter: Option<&Pattern>, name: &str) -> bool {
    filter.map_or(true, |p| {
        p.matches_with(&name.replace('\\', "/"), FILTER_OPTIONS)
    })
}
