//! Documentation versions, the manual set, and output formats.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static RE_HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).unwrap());

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// A `MAJOR.MINOR` documentation release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Directory and file-name form: `2_35`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.major, self.minor)
    }

    /// Human form used by the renderers: `2.35`.
    pub fn dotted(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Build a version from optional positional arguments; both or neither.
pub fn from_args(major: Option<u32>, minor: Option<u32>) -> Option<Version> {
    match (major, minor) {
        (Some(major), Some(minor)) => Some(Version::new(major, minor)),
        _ => None,
    }
}

/// One manual of the documentation set. `All` selects every manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocSelection {
    FunctionsReference,
    ReferenceManual,
    StanUsersGuide,
    CmdstanGuide,
    All,
}

impl DocSelection {
    pub const MANUALS: [DocSelection; 4] = [
        DocSelection::FunctionsReference,
        DocSelection::ReferenceManual,
        DocSelection::StanUsersGuide,
        DocSelection::CmdstanGuide,
    ];

    pub fn expand(self) -> Vec<DocSelection> {
        match self {
            DocSelection::All => Self::MANUALS.to_vec(),
            doc => vec![doc],
        }
    }

    /// Source directory name under `src/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            DocSelection::FunctionsReference => "functions-reference",
            DocSelection::ReferenceManual => "reference-manual",
            DocSelection::StanUsersGuide => "stan-users-guide",
            DocSelection::CmdstanGuide => "cmdstan-guide",
            DocSelection::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatSelection {
    Html,
    Pdf,
    All,
}

impl FormatSelection {
    pub fn wants_html(self) -> bool {
        matches!(self, FormatSelection::Html | FormatSelection::All)
    }

    pub fn wants_pdf(self) -> bool {
        matches!(self, FormatSelection::Pdf | FormatSelection::All)
    }
}

/// Read the version the unversioned functions reference currently redirects to.
pub fn discover_latest(site: &str) -> Result<Version> {
    let url = format!("{}/docs/functions-reference/index.html", site.trim_end_matches('/'));
    let body = match ureq::get(&url).call() {
        Ok(resp) => resp
            .into_string()
            .with_context(|| format!("failed to read response from {}", url))?,
        Err(ureq::Error::Status(404, _)) => {
            bail!("Stan version not found at {url}; pass MAJOR MINOR version numbers")
        }
        Err(e) => bail!("failed to fetch {url}: {e}"),
    };
    parse_redirect_version(&body)
        .with_context(|| format!("no versioned link found in {}", url))
}

/// Extract `MAJOR`, `MINOR` from the first link of a redirect page.
///
/// `<a href="https://mc-stan.org/docs/2_35/functions-reference/index.html">` → 2.35
pub fn parse_redirect_version(page: &str) -> Option<Version> {
    let body = page.find("<body").map_or(page, |i| &page[i..]);
    let href = RE_HREF.captures(body)?;
    let mut numbers = RE_NUMBER
        .find_iter(&href[1])
        .filter_map(|m| m.as_str().parse::<u32>().ok());
    Some(Version::new(numbers.next()?, numbers.next()?))
}
