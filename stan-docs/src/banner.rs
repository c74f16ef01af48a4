//! Mark every page of an archived version as old.
//!
//! gitbook pages open their content with a fixed `<section>` tag; the banner
//! goes on the line after it. The book-title link is pointed at the current
//! version of the same manual.

use anyhow::{bail, Context, Result};
use stan_sigs::write_atomic;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Line marker after which the banner is inserted.
pub const SECTION_MARKER: &str = r#"<section class="normal" id="section-">"#;

/// Text that identifies an already-marked page.
pub const BANNER_TEXT: &str = "This is an old version, ";

const HOME_LINK: &str = r#"<a href="./">"#;

/// Banner linking `file` to its current-version counterpart.
pub fn banner(site: &str, dirname: &str, file: &str) -> String {
    format!(
        "\n<div>\n{}<a href=\"{}/docs/{}/{}\">view current version</a>.\n</div>\n",
        BANNER_TEXT, site, dirname, file
    )
}

fn home_link(site: &str, dirname: &str) -> String {
    format!(
        r#"<a href="{}/docs/{}/index.html" style="color:#4183C4">"#,
        site, dirname
    )
}

/// Rewrite one page. Returns `None` when the page already has a banner or
/// has nothing to rewrite.
pub fn mark_page(page: &str, site: &str, dirname: &str, file: &str) -> Option<String> {
    if page.contains(BANNER_TEXT) {
        return None;
    }
    if !page.contains(SECTION_MARKER) && !page.contains(HOME_LINK) {
        return None;
    }
    let banner = banner(site, dirname, file);
    let home = home_link(site, dirname);

    let mut out = String::with_capacity(page.len() + banner.len());
    for line in page.split_inclusive('\n') {
        out.push_str(&line.replace(HOME_LINK, &home));
        if line.trim().contains(SECTION_MARKER) {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&banner);
        }
    }
    Some(out)
}

/// Add the old-version banner to every `*.html` page directly in `dir`.
///
/// Returns the pages that were rewritten.
pub fn mark_directory(dir: &Path, site: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("directory not found: {}", dir.display());
    }
    let dirname = dir
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", dir.display()))?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("cannot take a directory name from {}", dir.display()))?;
    info!("dir: {}", dirname);

    let mut pages: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("html"))
        .collect();
    pages.sort();

    let site = site.trim_end_matches('/');
    let mut rewritten = Vec::new();
    for path in pages {
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let page = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match mark_page(&page, site, &dirname, &file) {
            Some(marked) => {
                info!("{}", file);
                write_atomic(&path, marked.as_bytes())?;
                rewritten.push(path);
            }
            None => debug!("{} unchanged", file),
        }
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PAGE: &str = "<html>\n<body>\n<li><a href=\"./\">Stan Functions Reference</a></li>\n\
                        <section class=\"normal\" id=\"section-\">\n<h1>Integer functions</h1>\n</body>\n";

    #[test]
    fn banner_after_section_marker() {
        let out = mark_page(PAGE, "https://mc-stan.org", "functions-reference", "integer.html").unwrap();
        let expected_banner = "<section class=\"normal\" id=\"section-\">\n\n<div>\n\
            This is an old version, <a href=\"https://mc-stan.org/docs/functions-reference/integer.html\">view current version</a>.\n\
            </div>\n<h1>";
        assert!(out.contains(expected_banner), "got: {out}");
    }

    #[test]
    fn home_link_points_at_current_version() {
        let out = mark_page(PAGE, "https://mc-stan.org", "functions-reference", "integer.html").unwrap();
        assert!(out.contains(
            "<a href=\"https://mc-stan.org/docs/functions-reference/index.html\" style=\"color:#4183C4\">Stan Functions Reference"
        ));
        assert!(!out.contains("<a href=\"./\">"));
    }

    #[test]
    fn already_marked_page_is_skipped() {
        let once = mark_page(PAGE, "https://mc-stan.org", "d", "f.html").unwrap();
        assert_eq!(mark_page(&once, "https://mc-stan.org", "d", "f.html"), None);
    }

    #[test]
    fn page_without_marker_is_left_alone() {
        let page = "<html><body>plain</body></html>\n";
        assert_eq!(mark_page(page, "https://mc-stan.org", "d", "f.html"), None);
    }

    #[test]
    fn home_link_alone_is_still_rewritten() {
        let page = "<li><a href=\"./\">Stan Functions Reference</a></li>\n";
        let out = mark_page(page, "https://mc-stan.org", "d", "f.html").unwrap();
        assert!(out.contains("https://mc-stan.org/docs/d/index.html"));
        assert!(!out.contains(BANNER_TEXT));
    }

    #[test]
    fn directory_pass() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("reference-manual");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("types.html"), PAGE).unwrap();
        fs::write(dir.join("notes.txt"), PAGE).unwrap();
        fs::write(dir.join("search.html"), "<html>no content section</html>\n").unwrap();

        let rewritten = mark_directory(&dir, "https://mc-stan.org/").unwrap();
        assert_eq!(rewritten, vec![dir.join("types.html")]);

        let page = fs::read_to_string(dir.join("types.html")).unwrap();
        assert!(page.contains("https://mc-stan.org/docs/reference-manual/types.html"));
        assert_eq!(fs::read_to_string(dir.join("notes.txt")).unwrap(), PAGE);

        assert!(mark_directory(&dir, "https://mc-stan.org").unwrap().is_empty());
    }
}
