//! Check that "view current version" links in archived pages still resolve.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;
use tracing::debug;

static RE_CURRENT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"version,\s+<a\s+href="(.*)">view\s+current"#).unwrap());

/// Requests sent between pauses.
pub const BATCH_SIZE: usize = 50;

/// Result of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Status(u16),
    Failed(String),
}

impl ProbeResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeResult::Status(200))
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeResult::Status(code) => write!(f, "HTTP {}", code),
            ProbeResult::Failed(reason) => f.write_str(reason),
        }
    }
}

pub trait LinkProbe {
    fn probe(&self, url: &str) -> ProbeResult;
}

/// HEAD request that reports redirects instead of following them.
pub struct HttpProbe {
    agent: ureq::Agent,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .redirects(0)
            .timeout(timeout)
            .build();
        Self { agent }
    }
}

impl LinkProbe for HttpProbe {
    fn probe(&self, url: &str) -> ProbeResult {
        match self.agent.head(url).call() {
            Ok(resp) => ProbeResult::Status(resp.status()),
            Err(ureq::Error::Status(code, _)) => ProbeResult::Status(code),
            Err(e) => ProbeResult::Failed(e.to_string()),
        }
    }
}

/// All `*.html` files below each version directory of `docs_root`.
pub fn archived_pages(docs_root: &Path) -> Result<Vec<PathBuf>> {
    if !docs_root.is_dir() {
        bail!("docs directory not found: {}", docs_root.display());
    }
    let pattern = format!(
        "{}/*/**/*.html",
        glob::Pattern::escape(&docs_root.to_string_lossy())
    );
    let mut pages: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    pages.sort();
    Ok(pages)
}

/// Current-version URLs referenced by old-version banners in `page`.
pub fn current_version_links(page: &str) -> impl Iterator<Item = &str> {
    RE_CURRENT_LINK
        .captures_iter(page)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Collect the unique banner links across every archived page.
pub fn find_links(docs_root: &Path) -> Result<BTreeSet<String>> {
    let mut links = BTreeSet::new();
    for page in archived_pages(docs_root)? {
        debug!("scanning {}", page.display());
        let bytes = fs::read(&page).with_context(|| format!("failed to read {}", page.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        links.extend(current_version_links(&text).map(str::to_string));
    }
    Ok(links)
}

/// Probe every link, pausing before each batch. Returns the broken links.
pub fn check_links<'a>(
    links: impl IntoIterator<Item = &'a String>,
    probe: &dyn LinkProbe,
    pause: Duration,
) -> Vec<(String, ProbeResult)> {
    let mut broken = Vec::new();
    for (i, link) in links.into_iter().enumerate() {
        if i % BATCH_SIZE == 0 && !pause.is_zero() {
            thread::sleep(pause);
        }
        let result = probe.probe(link);
        if !result.is_ok() {
            println!("Broken link: {}", link);
            debug!("{}: {}", link, result);
            broken.push((link.clone(), result));
        }
    }
    broken
}
