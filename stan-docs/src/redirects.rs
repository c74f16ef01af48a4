//! Redirect stubs from `docs/<manual>/` to the latest `docs/<M_m>/<manual>/`.

use crate::version::Version;
use anyhow::{bail, Context, Result};
use stan_sigs::write_atomic;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en-US">
<head>
  <title>Redirecting&hellip;</title>
  <meta http-equiv="refresh" content="0; url=REDIRECTTO">
  <meta name="robots" content="noindex">
</head>
<body>
  <h1>Redirecting&hellip;</h1>
  <a href="REDIRECTTO">Click here if you are not redirected.</a>
</body>
</html>
"#;

/// HTML page that immediately navigates to `target`.
pub fn redirect_page(target: &str) -> String {
    TEMPLATE.replace("REDIRECTTO", target)
}

/// Write one stub per rendered page of `docset` at `version`.
///
/// Returns the stubs written, in sorted order.
pub fn write_redirects(
    docs_root: &Path,
    version: Version,
    docset: &str,
    site: &str,
) -> Result<Vec<PathBuf>> {
    let version_dir = docs_root.join(version.dir_name()).join(docset);
    if !version_dir.is_dir() {
        bail!("versioned directory not found: {}", version_dir.display());
    }
    let unversioned_dir = docs_root.join(docset);
    fs::create_dir_all(&unversioned_dir)
        .with_context(|| format!("failed to create directory {}", unversioned_dir.display()))?;

    let pattern = format!("{}/*.html", glob::Pattern::escape(&version_dir.to_string_lossy()));
    let mut pages: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    pages.sort();

    let site = site.trim_end_matches('/');
    let mut written = Vec::new();
    for page in pages {
        let Some(file) = page.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        let stub = unversioned_dir.join(file);
        let target = format!("{}/docs/{}/{}/{}", site, version.dir_name(), docset, file);
        info!("{} -> {}", stub.display(), target);
        write_atomic(&stub, redirect_page(&target).as_bytes())?;
        written.push(stub);
    }
    Ok(written)
}
