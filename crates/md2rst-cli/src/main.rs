//! md2rst: CLI tool to convert CommonMark document trees to reStructuredText

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{CONFIG_FILE_NAME, Config};
use md2rst_core::{Node, RenderOptions, render};

const DEFAULT_EXTENSION: &str = "rst";

#[derive(Parser, Debug)]
#[command(name = "md2rst")]
#[command(about = "Convert CommonMark document trees (JSON) to reStructuredText")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(after_help = "Examples:
  md2rst doc.json                   # Convert single file to doc.rst
  md2rst doc.json -o README.rst     # Convert to specific output file
  md2rst - < doc.json               # Read stdin, write stdout
  md2rst trees/ -o docs/ -r         # Convert directory recursively
  md2rst trees/ -o docs/ -j4        # Use 4 parallel jobs
  md2rst init                       # Write a sample _md2rst.toml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input JSON tree, directory of trees, or `-` for stdin
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// String used for one level of indentation (default: one space)
    #[arg(long)]
    indent: Option<String>,

    /// Configuration file (defaults to `_md2rst.toml` next to the input)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample configuration file
    Init {
        /// Output path (defaults to `_md2rst.toml` in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the configuration JSON schema to stdout instead
        #[arg(long)]
        schema: bool,
    },
}

/// Settings shared by every conversion of one run
struct Settings {
    options: RenderOptions,
    extension: String,
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    if let Some(Command::Init { output, schema }) = &cli.command {
        return init_config(output.as_deref(), *schema);
    }

    let input = cli.input.as_deref().context("No input given")?;
    let settings = load_settings(&cli, input)?;

    if input == Path::new("-") {
        convert_stdin(cli.output.as_deref(), &settings)
    } else if input.is_file() {
        convert_file(input, cli.output.as_deref(), &settings)
    } else if input.is_dir() {
        convert_directory(
            input,
            cli.output.as_deref(),
            cli.recursive,
            cli.jobs,
            &settings,
        )
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = if quiet {
        "md2rst=error"
    } else if verbose {
        "md2rst=debug,md2rst_core=trace"
    } else {
        "md2rst=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Merge CLI flags over the config file over built-in defaults
fn load_settings(cli: &Cli, input: &Path) -> Result<Settings> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            let dir = config_dir(input);
            let loaded = Config::load_from_dir(&dir)?;
            if loaded.is_some() {
                tracing::debug!("Using {}", dir.join(CONFIG_FILE_NAME).display());
            }
            loaded.unwrap_or_default()
        }
    };

    let options = match cli.indent.as_ref().or(config.render.indent.as_ref()) {
        Some(indent) => RenderOptions::with_indent(indent.as_str())
            .with_context(|| format!("Invalid indent: {:?}", indent))?,
        None => RenderOptions::default(),
    };

    let extension = config
        .output
        .extension
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    Ok(Settings {
        options,
        extension,
        quiet: cli.quiet,
    })
}

/// Directory searched for `_md2rst.toml`
fn config_dir(input: &Path) -> PathBuf {
    if input == Path::new("-") {
        PathBuf::from(".")
    } else if input.is_dir() {
        input.to_path_buf()
    } else {
        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Write a sample config, or print the config schema
fn init_config(output: Option<&Path>, schema: bool) -> Result<()> {
    if schema {
        println!("{}", Config::json_schema_string()?);
        return Ok(());
    }

    let path = output.unwrap_or(Path::new(CONFIG_FILE_NAME));
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    let content = Config::sample().to_toml_with_schema()?;
    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))?;
    tracing::info!("Created {}", path.display());

    Ok(())
}

/// Convert a tree read from stdin
fn convert_stdin(output: Option<&Path>, settings: &Settings) -> Result<()> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read stdin")?;

    let rst = convert_tree(&content, &settings.options)?;

    match output {
        Some(path) => write_output(path, &rst),
        None => io::stdout()
            .write_all(rst.as_bytes())
            .context("Failed to write stdout"),
    }
}

/// Convert a single tree file to RST
fn convert_file(input: &Path, output: Option<&Path>, settings: &Settings) -> Result<()> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension(&settings.extension),
    };

    tracing::debug!(
        "Converting: {} -> {}",
        input.display(),
        output_path.display()
    );

    convert_file_inner(input, &output_path, &settings.options)?;

    if !settings.quiet {
        println!("{}", output_path.display());
    }

    Ok(())
}

/// Convert a directory of tree files
fn convert_directory(
    input: &Path,
    output: Option<&Path>,
    recursive: bool,
    jobs: Option<usize>,
    settings: &Settings,
) -> Result<()> {
    let output_dir = output.unwrap_or(input);

    let files = collect_tree_files(input, recursive)?;

    if files.is_empty() {
        tracing::warn!("No .json files found in {}", input.display());
        return Ok(());
    }

    tracing::debug!("Found {} .json files", files.len());

    // Configure thread pool if jobs specified
    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    // Atomic counters for thread-safe progress tracking
    let success = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let errors: Vec<_> = files
        .par_iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(input).unwrap_or(file);
            let output_file = output_dir.join(relative).with_extension(&settings.extension);

            match convert_file_inner(file, &output_file, &settings.options) {
                Ok(()) => {
                    success.fetch_add(1, Ordering::Relaxed);
                    if !settings.quiet {
                        println!("{}", output_file.display());
                    }
                    None
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    Some((file.clone(), e))
                }
            }
        })
        .collect();

    for (file, e) in &errors {
        tracing::error!("Error converting {}: {:#}", file.display(), e);
    }

    let success_count = success.load(Ordering::Relaxed);
    let failed_count = failed.load(Ordering::Relaxed);

    tracing::info!("Converted {} files, {} failed", success_count, failed_count);

    if failed_count > 0 {
        anyhow::bail!("{} files failed to convert", failed_count);
    }

    Ok(())
}

/// Read, render and write one file without reporting
fn convert_file_inner(input: &Path, output: &Path, options: &RenderOptions) -> Result<()> {
    if is_same_file(input, output) {
        anyhow::bail!("Refusing to overwrite input: {}", input.display());
    }

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;

    let rst = convert_tree(&content, options)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    write_output(output, &rst)
}

/// Whether two paths name the same file (the output need not exist yet)
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))
}

/// Collect all .json files in a directory
fn collect_tree_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.eq_ignore_ascii_case("json") {
                    files.push(path);
                }
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_tree_files(&path, recursive)?);
        }
    }

    files.sort();
    Ok(files)
}

/// Core conversion function
fn convert_tree(json: &str, options: &RenderOptions) -> Result<String> {
    let tree = Node::from_json(json)?;
    Ok(render(&tree, options))
}
