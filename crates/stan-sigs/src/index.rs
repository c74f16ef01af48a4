//! Alphabetical function index.
//!
//! Each signature links to the anchor that the site's `html-index` filter
//! places on its comment. The filter names anchors `index-entry-<sha1>` where
//! the digest is taken over the comment text, so the comment is rebuilt here
//! byte-for-byte before hashing.

use crate::extract::SignatureSet;
use crate::signature::SignatureRecord;
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, BTreeSet};

/// Display text for sampling statements.
pub const STATEMENT_DISPLAY: &str = "sampling statement";

/// Prefix of the anchor ids generated by the renderer.
pub const ANCHOR_PREFIX: &str = "index-entry-";

pub const HEADER: &str = "---
pagetitle: Alphabetical Index
---

<!-- This file is generated by `stan-docs index`. Do not edit it directly. -->

# Alphabetical Index
";

/// One link under a function name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexLink {
    pub link: String,
    pub display: String,
}

/// All signatures grouped by function name.
#[derive(Debug, Default, Clone)]
pub struct FunctionIndex {
    entries: BTreeMap<String, BTreeSet<IndexLink>>,
}

/// Lowercase hex SHA-1 of the canonical comment.
pub fn anchor_digest(record: &SignatureRecord) -> String {
    let digest = Sha1::digest(record.canonical_comment().as_bytes());
    format!("{:x}", digest)
}

pub fn display_text(record: &SignatureRecord) -> String {
    if record.arguments.is_statement() {
        STATEMENT_DISPLAY.to_string()
    } else {
        format!("`{} : {}`", record.arguments, record.return_type)
    }
}

/// Escape characters that are markup in the index page.
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '\\' || c == '*' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl FunctionIndex {
    pub fn build(sigs: &SignatureSet) -> Self {
        let mut index = Self::default();
        for sig in sigs.iter() {
            let link = format!(
                "{}#{}{}",
                sig.source_file,
                ANCHOR_PREFIX,
                anchor_digest(&sig.record)
            );
            index
                .entries
                .entry(sig.record.name.clone())
                .or_default()
                .insert(IndexLink {
                    link,
                    display: display_text(&sig.record),
                });
        }
        index
    }

    pub fn get(&self, name: &str) -> Option<&BTreeSet<IndexLink>> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in page order: case-insensitive, exact name breaks ties.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_by_cached_key(|name| (name.to_lowercase(), *name));
        names
    }

    /// Render the whole index page.
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        let mut letter: Option<String> = None;

        for name in self.sorted_names() {
            let start: String = name
                .chars()
                .next()
                .map(|c| c.to_lowercase().collect())
                .unwrap_or_default();
            if letter.as_deref() != Some(start.as_str()) {
                out.push_str(&format!("\n## {}\n", start.to_uppercase()));
                letter = Some(start);
            }

            out.push_str(&format!("**{}**:\n\n", escape_name(name)));
            for entry in &self.entries[name] {
                out.push_str(&format!(" - [{}]({})\n", entry.display, entry.link));
            }
            out.push_str("\n\n");
        }

        out
    }
}
