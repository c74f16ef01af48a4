//! stan-docs: build and publish the versioned Stan documentation.
//!
//! Subcommands:
//!
//! - `sigs`: flat table of function signatures (`stan-functions-M_m.txt`)
//! - `index`: alphabetical function index page for the functions reference
//! - `build`: render manuals to `docs/M_m/` with quarto or bookdown
//! - `redirects`: stubs in `docs/<manual>/` pointing at the latest version
//! - `old-banner`: mark an archived version's pages as old
//! - `check-links`: verify the "view current version" links of archived pages

mod banner;
mod build;
mod linkcheck;
mod process;
mod redirects;
mod sigs;
mod version;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use version::{DocSelection, FormatSelection, Version};

const DEFAULT_SITE: &str = "https://mc-stan.org";

#[derive(Parser)]
#[command(
    name = "stan-docs",
    version,
    about = "Build, index, redirect and link-check the versioned Stan documentation"
)]
struct Cli {
    /// Repository root containing `src/` and `docs/`
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the semicolon-delimited signature table.
    /// Without a version, the latest published version is looked up online.
    Sigs {
        #[arg(requires = "minor")]
        major: Option<u32>,
        #[arg(requires = "major")]
        minor: Option<u32>,

        /// Output file [default: <root>/stan-functions-MAJOR_MINOR.txt]
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Directory scanned for signature comments
        #[arg(long)]
        source: Option<PathBuf>,

        /// Site queried for the latest version
        #[arg(long, default_value = DEFAULT_SITE)]
        site: String,
    },

    /// Generate the alphabetical function index page.
    Index {
        /// Directory scanned for signature comments
        #[arg(long)]
        source: Option<PathBuf>,

        /// Index page [default: <root>/src/functions-reference/functions_index.qmd]
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Render manuals into docs/MAJOR_MINOR.
    Build {
        major: u32,
        minor: u32,
        #[arg(value_enum, default_value = "all")]
        document: DocSelection,
        #[arg(value_enum, default_value = "all")]
        format: FormatSelection,
        #[arg(long, value_enum, default_value = "quarto")]
        engine: build::EngineKind,
    },

    /// Point the unversioned pages of a manual at MAJOR_MINOR.
    Redirects {
        major: u32,
        minor: u32,
        #[arg(value_enum)]
        document: DocSelection,
        #[arg(long, default_value = DEFAULT_SITE)]
        site: String,
    },

    /// Insert the "old version" banner into every page of a rendered manual.
    OldBanner {
        dir: PathBuf,
        #[arg(long, default_value = DEFAULT_SITE)]
        site: String,
    },

    /// Check the "view current version" links of every archived page.
    CheckLinks {
        /// Docs directory [default: <root>/docs]
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Seconds to wait before each batch of 50 requests
        #[arg(long, default_value_t = 2)]
        pause: u64,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and --version print to stdout and succeed; usage errors exit 1
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Sigs {
            major,
            minor,
            output,
            source,
            site,
        } => {
            let version = match version::from_args(major, minor) {
                Some(v) => v,
                None => {
                    let v = version::discover_latest(&site)?;
                    info!("latest published version is {}", v);
                    v
                }
            };
            let source = source.unwrap_or_else(|| cli.root.join(sigs::FUNCTIONS_REFERENCE));
            let output = output.unwrap_or_else(|| cli.root.join(sigs::table_file_name(version)));
            let found = sigs::scan(&source, &cli.root.join(sigs::INDEX_PAGE))?;
            sigs::write_table(&found, &output)
        }
        Command::Index { source, output } => {
            let source = source.unwrap_or_else(|| cli.root.join(sigs::FUNCTIONS_REFERENCE));
            let output = output.unwrap_or_else(|| cli.root.join(sigs::INDEX_PAGE));
            let found = sigs::scan(&source, &output)?;
            sigs::write_index(&found, &output)
        }
        Command::Build {
            major,
            minor,
            document,
            format,
            engine,
        } => {
            let opts = build::BuildOptions {
                root: cli.root.clone(),
                version: Version::new(major, minor),
                docs: document,
                format,
                engine,
            };
            build::run(&opts, &process::SystemShell)
        }
        Command::Redirects {
            major,
            minor,
            document,
            site,
        } => {
            let docs_root = cli.root.join("docs");
            for doc in document.expand() {
                let written = redirects::write_redirects(
                    &docs_root,
                    Version::new(major, minor),
                    doc.dir_name(),
                    &site,
                )?;
                info!("{}: {} redirect stubs", doc.dir_name(), written.len());
            }
            Ok(())
        }
        Command::OldBanner { dir, site } => {
            let rewritten = banner::mark_directory(&resolve(&cli.root, &dir), &site)?;
            info!("marked {} pages", rewritten.len());
            Ok(())
        }
        Command::CheckLinks {
            docs,
            pause,
            timeout,
        } => {
            let docs = docs.unwrap_or_else(|| cli.root.join("docs"));
            check_links(&docs, Duration::from_secs(pause), Duration::from_secs(timeout))
        }
    }
}

fn check_links(docs: &Path, pause: Duration, timeout: Duration) -> Result<()> {
    let links = linkcheck::find_links(docs)?;
    println!("Checking {} links...", links.len());
    let probe = linkcheck::HttpProbe::new(timeout);
    let broken = linkcheck::check_links(&links, &probe, pause);
    if !broken.is_empty() {
        bail!("{} broken link(s)", broken.len());
    }
    println!("Done.");
    Ok(())
}

/// Relative paths given on the command line are taken relative to `--root`.
fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
