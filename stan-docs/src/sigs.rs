//! Signature table and alphabetical index outputs.

use anyhow::{Context, Result};
use stan_sigs::{extract_dir, write_atomic, FunctionIndex, SignatureSet};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory holding the functions reference sources.
pub const FUNCTIONS_REFERENCE: &str = "src/functions-reference";

/// Index page, relative to the repository root.
pub const INDEX_PAGE: &str = "src/functions-reference/functions_index.qmd";

const TABLE_HEADER: &str = "# This file is semicolon delimited\nStanFunction; Arguments; ReturnType\n";

/// Flat table of every unique signature.
pub fn table_text(sigs: &SignatureSet) -> String {
    let mut out = String::from(TABLE_HEADER);
    for row in sigs.table_rows() {
        out.push_str(&row);
        out.push('\n');
    }
    out
}

/// Scan `source_dir`, leaving out the generated index page.
pub fn scan(source_dir: &Path, index_page: &Path) -> Result<SignatureSet> {
    let sigs = extract_dir(source_dir, &[index_page.to_path_buf()])
        .with_context(|| format!("failed to extract signatures from {}", source_dir.display()))?;
    info!(
        "found {} signatures ({} unique)",
        sigs.len(),
        sigs.unique_records().len()
    );
    Ok(sigs)
}

pub fn write_table(sigs: &SignatureSet, output: &Path) -> Result<()> {
    write_atomic(output, table_text(sigs).as_bytes())?;
    info!("wrote {}", output.display());
    Ok(())
}

pub fn write_index(sigs: &SignatureSet, output: &Path) -> Result<()> {
    let index = FunctionIndex::build(sigs);
    write_atomic(output, index.render().as_bytes())?;
    info!("wrote {} ({} functions)", output.display(), index.len());
    Ok(())
}

/// `stan-functions-2_35.txt`
pub fn table_file_name(version: crate::version::Version) -> PathBuf {
    PathBuf::from(format!("stan-functions-{}.txt", version.dir_name()))
}
