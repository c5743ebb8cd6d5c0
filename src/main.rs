//! dirledger - Inventory a directory tree as a hierarchical report.
//!
//! Usage:
//!   dirledger report PATH          Scan, inspect documents and render a report
//!   dirledger export PATH          Write the interchange JSON for a folder
//!   dirledger render SCRATCH.json  Render a report from an interchange file
//!   dirledger --help               Show help

mod logging;
mod platform;
mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};

use dirledger_core::{LedgerConfig, MetadataIndex, TreeNode};
use dirledger_inspect::{CancelToken, MetadataIndexBuilder};
use dirledger_report::sink::{self, Summary};
use dirledger_report::{
    Flattener, ScratchDocument, ScratchStore, SinkFormat, render, write_document,
};
use dirledger_scan::TreeBuilder;

use crate::platform::{HostPlatform, translate_path};
use crate::settings::{Overrides, load_config};

#[derive(Parser)]
#[command(
    name = "dirledger",
    version,
    about = "Inventory a directory tree as a hierarchical, color-coded report",
    long_about = "dirledger walks a folder (or a zip archive), reads page counts from \
                  PDF and Office documents and lays the tree out as an indented \
                  table with one header row per folder."
)]
struct Cli {
    /// Log filter used when DIRLEDGER_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also append log records to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a folder and render its report
    Report {
        /// Folder or zip archive to inventory (Windows and WSL forms accepted)
        path: String,

        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Directory for the interchange file
        #[arg(long, default_value = "output")]
        scratch_dir: PathBuf,

        /// Keep the interchange file after rendering
        #[arg(long)]
        keep_scratch: bool,
    },

    /// Write the interchange JSON for a folder
    Export {
        /// Folder or zip archive to inventory
        path: String,

        #[command(flatten)]
        scan: ScanArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a report from an interchange file
    Render {
        /// Interchange file written by `export` or `report --keep-scratch`
        scratch: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Leading path segment elided from metadata keys
    #[arg(long)]
    strip_prefix: Option<String>,

    /// Maximum number of documents inspected in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Descend into symlinked folders (each target directory once)
    #[arg(long)]
    follow_symlinks: bool,
}

impl ScanArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            strip_prefix: self.strip_prefix.clone(),
            jobs: self.jobs,
            follow_symlinks: self.follow_symlinks,
        }
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: SinkFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Paint row fills with ANSI colors (text format)
    #[arg(long)]
    color: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Command::Report {
            path,
            scan,
            output,
            scratch_dir,
            keep_scratch,
        } => {
            let root = resolve_root(&path)?;
            let config = load_config(root, scan.config.as_deref(), &scan.overrides())?;
            run_report(&config, &output, &scratch_dir, keep_scratch)?;
        }
        Command::Export { path, scan, output } => {
            let root = resolve_root(&path)?;
            let config = load_config(root, scan.config.as_deref(), &scan.overrides())?;
            run_export(&config, output.as_deref())?;
        }
        Command::Render {
            scratch,
            scan,
            output,
        } => {
            let root = scratch.parent().map(Path::to_path_buf).unwrap_or_default();
            let config = load_config(root, scan.config.as_deref(), &scan.overrides())?;
            render_scratch(&config, &scratch, &output)?;
        }
    }

    Ok(())
}

/// Translate the user-supplied path for this host and check it exists.
fn resolve_root(input: &str) -> Result<PathBuf> {
    let translated =
        translate_path(input, HostPlatform::detect()).ok_or_else(|| eyre!("No folder path given"))?;
    let root = PathBuf::from(translated);
    if !root.exists() {
        return Err(eyre!("Path does not exist: {}", root.display()));
    }
    Ok(root)
}

/// Scan and inspect, producing the tree and its metadata index.
fn collect(config: &LedgerConfig) -> Result<(TreeNode, MetadataIndex)> {
    eprintln!("Scanning {}...", config.root.display());

    let tree = TreeBuilder::new(config.clone())?
        .scan()
        .context("Scan failed")?;
    if tree.has_warnings() {
        tracing::warn!(count = tree.warnings.len(), "folders could not be read");
    }

    let outcome = MetadataIndexBuilder::new(config.clone())
        .with_cancel_token(CancelToken::new())
        .build(&tree)
        .context("Indexing failed")?;

    tracing::info!(
        folders = tree.root.folder_count().saturating_sub(1),
        files = tree.root.file_count(),
        documents = outcome.inspected,
        elapsed = ?tree.scan_duration,
        "inventory collected"
    );

    Ok((tree.root, outcome.index))
}

/// Full pipeline: scan, write the scratch file, render the collected tree.
fn run_report(
    config: &LedgerConfig,
    output: &OutputArgs,
    scratch_dir: &Path,
    keep_scratch: bool,
) -> Result<()> {
    let (root, index) = collect(config)?;
    let store = ScratchStore::new(scratch_dir);
    let scratch = store
        .write(&ScratchDocument::from_tree(&root, &index))
        .context("Failed to write scratch file")?;
    eprintln!("Hierarchy processed: {}", scratch.display());

    let result = render_tree(config, &root, &index, output);

    if keep_scratch {
        eprintln!("Kept {}", scratch.display());
    } else {
        ScratchStore::remove(&scratch)?;
    }
    result
}

/// Render a report from an interchange file.
fn render_scratch(config: &LedgerConfig, scratch: &Path, output: &OutputArgs) -> Result<()> {
    let (root, index) = ScratchStore::read(scratch)?.into_parts(config.collation);
    render_tree(config, &root, &index, output)
}

fn render_tree(
    config: &LedgerConfig,
    root: &TreeNode,
    index: &MetadataIndex,
    output: &OutputArgs,
) -> Result<()> {
    let report = Flattener::new(config).flatten(root, index);

    let out = sink::open_output(output.output.as_deref())?;
    let mut report_sink = output.format.sink(out, output.color);

    match render(report_sink.as_mut(), report, index) {
        Ok(rendered) => {
            eprintln!("{}", rendered.message);
            print_summary(&rendered.summary);
            Ok(())
        }
        Err(failure) => {
            // The hierarchy itself was computed; report it with the failure.
            print_summary(&failure.summary);
            Err(failure).context("Failed to write report")
        }
    }
}

/// Write the interchange document to a file or stdout.
fn run_export(config: &LedgerConfig, output: Option<&Path>) -> Result<()> {
    let (root, index) = collect(config)?;
    let document = ScratchDocument::from_tree(&root, &index);

    match output {
        Some(path) => {
            write_document(path, &document)?;
            eprintln!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &document)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

fn print_summary(summary: &Summary) {
    eprintln!(
        " {} items, {} folders, max level {}",
        summary.total_items, summary.folders, summary.max_level
    );
    for (ext, count) in &summary.files_by_extension {
        eprintln!("   {ext}: {count}");
    }
}
