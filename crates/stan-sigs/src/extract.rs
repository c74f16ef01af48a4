//! Scan a directory of documents for signature comments.

use crate::operators;
use crate::signature::{parse_line, LineParse, SignatureRecord};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("source directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no documents found in {}", .0.display())]
    NoDocuments(PathBuf),

    #[error("no function signatures found in {}", .0.display())]
    NoSignatures(PathBuf),
}

/// A record together with the document it was found in.
///
/// `source_file` is relative to the scanned directory and `/`-separated,
/// ready to be used as a link target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcedSignature {
    pub record: SignatureRecord,
    pub source_file: String,
}

/// Caller-owned accumulator of extracted signatures.
#[derive(Debug, Default, Clone)]
pub struct SignatureSet {
    entries: BTreeSet<SourcedSignature>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the same record was already seen in this file.
    pub fn insert(&mut self, record: SignatureRecord, source_file: impl Into<String>) -> bool {
        self.entries.insert(SourcedSignature {
            record,
            source_file: source_file.into(),
        })
    }

    /// Parse every line of `content`, adding signatures found in `source_file`.
    ///
    /// Returns how many lines were rejected as malformed.
    pub fn scan_text(&mut self, content: &str, source_file: &str) -> usize {
        let mut rejected = 0;
        for line in content.lines() {
            match parse_line(line) {
                LineParse::NotCandidate => {}
                LineParse::Signature(record) => {
                    self.insert(record, source_file);
                }
                LineParse::Rejected(reason) => {
                    rejected += 1;
                    warn!(
                        "{}: not a function signature ({}): {}",
                        source_file, reason, line
                    );
                }
            }
        }
        rejected
    }

    /// `(record, source file)` pairs, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &SourcedSignature> {
        self.entries.iter()
    }

    /// Records with file identity dropped; identical triples collapse.
    pub fn unique_records(&self) -> BTreeSet<&SignatureRecord> {
        self.entries.iter().map(|e| &e.record).collect()
    }

    /// Rows of the flat signature table, `name; arguments; return type`,
    /// with escaped operator names replaced by their symbols.
    pub fn table_rows(&self) -> BTreeSet<String> {
        self.unique_records()
            .into_iter()
            .map(|r| {
                format!(
                    "{}; {}; {}",
                    operators::display_name(&r.name),
                    r.arguments,
                    r.return_type
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extract signatures from every regular file directly inside `dir`.
///
/// Files listed in `exclude` are skipped (the generated index page lives in
/// the same directory as its sources). Files are read in sorted order.
pub fn extract_dir(dir: &Path, exclude: &[PathBuf]) -> Result<SignatureSet, ExtractError> {
    if !dir.is_dir() {
        return Err(ExtractError::MissingDirectory(dir.to_path_buf()));
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExtractError::Io { path, source }
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if !path.is_file() || exclude.iter().any(|ex| same_file(ex, &path)) {
            continue;
        }
        files.push(path);
    }
    files.sort();

    if files.is_empty() {
        return Err(ExtractError::NoDocuments(dir.to_path_buf()));
    }

    let mut sigs = SignatureSet::new();
    for path in &files {
        let bytes = fs::read(path).map_err(io_err(path))?;
        let content = String::from_utf8_lossy(&bytes);
        let source_file = relative_link(dir, path);
        debug!("scanning {}", path.display());
        sigs.scan_text(&content, &source_file);
    }

    if sigs.is_empty() {
        return Err(ExtractError::NoSignatures(dir.to_path_buf()));
    }
    Ok(sigs)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// "src/functions-reference/real-valued_basic_functions.qmd" →
/// "real-valued_basic_functions.qmd"
fn relative_link(dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(dir).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Arguments;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = extract_dir(&dir.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, ExtractError::MissingDirectory(_)));
    }

    #[test]
    fn empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = extract_dir(dir.path(), &[]).unwrap_err();
        assert!(matches!(err, ExtractError::NoDocuments(_)));
    }

    #[test]
    fn documents_without_signatures() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "intro.qmd", "# Intro\n\nNothing here.\n");
        let err = extract_dir(dir.path(), &[]).unwrap_err();
        assert!(matches!(err, ExtractError::NoSignatures(_)));
    }

    #[test]
    fn bad_lines_do_not_stop_the_scan() {
        let mut sigs = SignatureSet::new();
        let text = "<!-- real; foo -->\n\
                    <!-- real; foo; x; y; -->\n\
                    <!-- real; bar; (real x); -->\n";
        let rejected = sigs.scan_text(text, "a.qmd");
        assert_eq!(rejected, 2);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs.iter().next().unwrap().record.name, "bar");
    }

    #[test]
    fn duplicates_collapse_per_file_but_not_across_files() {
        let dir = TempDir::new().unwrap();
        let line = "<!-- real; foo; (real x); -->\n";
        write(dir.path(), "a.qmd", &format!("{line}{line}"));
        write(dir.path(), "b.Rmd", line);

        let sigs = extract_dir(dir.path(), &[]).unwrap();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs.unique_records().len(), 1);
        let files: Vec<_> = sigs.iter().map(|s| s.source_file.as_str()).collect();
        assert_eq!(files, ["a.qmd", "b.Rmd"]);
    }

    #[test]
    fn excluded_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.qmd", "<!-- real; foo; (real x); -->\n");
        let index = write(dir.path(), "functions_index.qmd", "<!-- real; bar; (real x); -->\n");

        let sigs = extract_dir(dir.path(), &[index]).unwrap();
        assert_eq!(sigs.len(), 1);
    }

    #[test]
    fn table_rows_use_operator_symbols_and_sentinel() {
        let mut sigs = SignatureSet::new();
        sigs.insert(
            SignatureRecord::new(r"operator\*", Arguments::List("(int x, int y)".into()), "int"),
            "a.qmd",
        );
        sigs.insert(SignatureRecord::new("normal", Arguments::Statement, "real"), "b.qmd");

        let rows: Vec<_> = sigs.table_rows().into_iter().collect();
        assert_eq!(rows, ["normal; ~; real", "operator*; (int x, int y); int"]);
    }
}
