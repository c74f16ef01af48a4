//! Build the manuals into a version directory.
//!
//! Each manual lives in `src/<manual>` and is rendered in place by an external
//! engine. Finished artifacts are moved to `docs/<MAJOR_MINOR>/`:
//!
//! | Format | Artifact |
//! |--------|----------|
//! | html   | `docs/<M_m>/<manual>/` (whole site directory) |
//! | pdf    | `docs/<M_m>/<manual>-<M_m>.pdf` |

use crate::process::{run_checked, CommandSpec, Shell};
use crate::version::{DocSelection, FormatSelection, Version};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable the manuals read to print their version.
pub const VERSION_ENV: &str = "STAN_DOCS_VERSION";

/// One manual at one version.
pub struct BuildJob {
    pub doc: DocSelection,
    pub version: Version,
    /// `src/<manual>`
    pub src_dir: PathBuf,
    /// `docs/<M_m>`
    pub docs_dir: PathBuf,
}

impl BuildJob {
    pub fn pdf_name(&self) -> String {
        format!("{}-{}.pdf", self.doc.dir_name(), self.version.dir_name())
    }

    pub fn html_target(&self) -> PathBuf {
        self.docs_dir.join(self.doc.dir_name())
    }

    fn command(&self, program: &str) -> CommandSpec {
        CommandSpec::new(program, &self.src_dir).env(VERSION_ENV, self.version.dotted())
    }
}

/// An external document renderer.
pub trait Engine {
    fn html(&self, job: &BuildJob, shell: &dyn Shell) -> Result<()>;
    fn pdf(&self, job: &BuildJob, shell: &dyn Shell) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    Quarto,
    Bookdown,
}

impl EngineKind {
    pub fn create(self) -> Box<dyn Engine> {
        match self {
            EngineKind::Quarto => Box::new(Quarto),
            EngineKind::Bookdown => Box::new(Bookdown),
        }
    }
}

/// `quarto render`, one output directory per format.
pub struct Quarto;

impl Engine for Quarto {
    fn html(&self, job: &BuildJob, shell: &dyn Shell) -> Result<()> {
        let cmd = job
            .command("quarto")
            .args(["render", "--to", "html", "--output-dir", "_html"]);
        run_checked(shell, &cmd)?;
        replace_dir(&job.src_dir.join("_html"), &job.html_target())
    }

    fn pdf(&self, job: &BuildJob, shell: &dyn Shell) -> Result<()> {
        let pdf_name = job.pdf_name();
        let cmd = job
            .command("quarto")
            .args(["render", "--output-dir", "_pdf", "--output"])
            .arg(pdf_name.as_str());
        run_checked(shell, &cmd)?;
        replace_file(
            &job.src_dir.join("_pdf").join(&pdf_name),
            &job.docs_dir.join(&pdf_name),
        )
    }
}

/// `bookdown::render_book` through Rscript; both formats share `_book/`.
pub struct Bookdown;

impl Bookdown {
    fn render(&self, job: &BuildJob, shell: &dyn Shell, output_format: &str) -> Result<()> {
        let expr = format!(
            "bookdown::render_book('index.Rmd', output_format='bookdown::{}')",
            output_format
        );
        run_checked(shell, &job.command("Rscript").arg("-e").arg(expr))?;
        Ok(())
    }

    /// Remove the intermediates bookdown leaves next to its output.
    fn clean(&self, job: &BuildJob) -> Result<()> {
        remove_if_exists(&job.src_dir.join("_main.rds"))?;
        let book = job.src_dir.join("_book");
        if book.is_dir() {
            for entry in fs::read_dir(&book)
                .with_context(|| format!("failed to read directory: {}", book.display()))?
            {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) == Some("md") {
                    remove_if_exists(&path)?;
                }
            }
        }
        Ok(())
    }
}

impl Engine for Bookdown {
    fn html(&self, job: &BuildJob, shell: &dyn Shell) -> Result<()> {
        self.render(job, shell, "gitbook")?;
        self.clean(job)?;
        replace_dir(&job.src_dir.join("_book"), &job.html_target())
    }

    fn pdf(&self, job: &BuildJob, shell: &dyn Shell) -> Result<()> {
        self.render(job, shell, "pdf_book")?;
        let book = job.src_dir.join("_book");
        replace_file(&book.join("_main.pdf"), &job.docs_dir.join(job.pdf_name()))?;
        self.clean(job)?;
        fs::remove_dir_all(&book)
            .with_context(|| format!("failed to remove {}", book.display()))
    }
}

/// What to build.
pub struct BuildOptions {
    pub root: PathBuf,
    pub version: Version,
    pub docs: DocSelection,
    pub format: FormatSelection,
    pub engine: EngineKind,
}

/// Build every selected manual in every selected format.
pub fn run(opts: &BuildOptions, shell: &dyn Shell) -> Result<()> {
    let docs_dir = opts.root.join("docs").join(opts.version.dir_name());
    if !docs_dir.is_dir() {
        fs::create_dir_all(&docs_dir)
            .with_context(|| format!("failed to create directory {}", docs_dir.display()))?;
        info!("created directory {}", docs_dir.display());
    }
    info!("versioned docs directory is {}", docs_dir.display());

    let engine = opts.engine.create();
    for doc in opts.docs.expand() {
        let src_dir = opts.root.join("src").join(doc.dir_name());
        if !src_dir.is_dir() {
            bail!("source directory not found: {}", src_dir.display());
        }
        let job = BuildJob {
            doc,
            version: opts.version,
            src_dir,
            docs_dir: docs_dir.clone(),
        };

        if opts.format.wants_html() {
            info!("render {} as html", doc.dir_name());
            engine
                .html(&job, shell)
                .with_context(|| format!("html build of {} failed", doc.dir_name()))?;
        }
        if opts.format.wants_pdf() {
            info!("render {} as {}", doc.dir_name(), job.pdf_name());
            engine
                .pdf(&job, shell)
                .with_context(|| format!("pdf build of {} failed", doc.dir_name()))?;
        }
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}

fn replace_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        bail!("expected renderer output not found: {}", from.display());
    }
    remove_if_exists(to)?;
    debug!("move {} -> {}", from.display(), to.display());
    fs::rename(from, to)
        .with_context(|| format!("failed to move {} to {}", from.display(), to.display()))
}

fn replace_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        bail!("expected renderer output not found: {}", from.display());
    }
    if to.exists() {
        fs::remove_dir_all(to).with_context(|| format!("failed to remove {}", to.display()))?;
    }
    debug!("move {} -> {}", from.display(), to.display());
    fs::rename(from, to)
        .with_context(|| format!("failed to move {} to {}", from.display(), to.display()))
}
