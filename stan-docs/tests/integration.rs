use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_stan-docs")))
}

const INTEGER: &str = "# Integer-valued basic functions\n\
    \n\
    <!-- int; abs; (int x); -->\n\
    Absolute value of `x`.\n\
    \n\
    <!-- int; operator*; (int x, int y); -->\n";

const DISTRIBUTIONS: &str = "# Normal distribution\n\
    \n\
    <!-- real; normal ~; -->\n\
    <!-- real; normal_lpdf; (reals y | reals mu, reals sigma); -->\n\
    <!-- real; Phi; (real x); -->\n\
    <!-- this is an ordinary comment -->\n";

/// A repository checkout with a small functions reference.
fn repo() -> TempDir {
    let root = TempDir::new().unwrap();
    let src = root.path().join("src/functions-reference");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("integer-valued_basic_functions.qmd"), INTEGER).unwrap();
    fs::write(src.join("normal_distribution.qmd"), DISTRIBUTIONS).unwrap();
    root
}

fn root_arg(root: &TempDir) -> [&str; 2] {
    ["--root", root.path().to_str().unwrap()]
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// -- index --

#[test]
fn index_writes_grouped_page() {
    let root = repo();
    cmd().args(root_arg(&root)).arg("index").assert().success();

    let page = read(&root.path().join("src/functions-reference/functions_index.qmd"));
    assert!(page.starts_with("---\npagetitle: Alphabetical Index\n---\n"));
    assert!(page.contains("\n## A\n**abs**:\n\n - [`(int x) : int`](integer-valued_basic_functions.qmd#index-entry-"));
    assert!(page.contains("**normal**:\n\n - [sampling statement](normal_distribution.qmd#index-entry-"));
    assert!(page.contains("**operator\\***:"));

    // case-insensitive order
    let normal = page.find("**normal**").unwrap();
    let operator = page.find("**operator").unwrap();
    let phi = page.find("**Phi**").unwrap();
    assert!(normal < operator && operator < phi);
    assert!(page.contains("\n## P\n**Phi**"));
}

#[test]
fn index_is_reproducible() {
    let root = repo();
    let index = root.path().join("src/functions-reference/functions_index.qmd");

    cmd().args(root_arg(&root)).arg("index").assert().success();
    let first = read(&index);
    // the generated page sits next to its sources and must not feed back in
    cmd().args(root_arg(&root)).arg("index").assert().success();
    assert_eq!(read(&index), first);
}

#[test]
fn index_custom_output() {
    let root = repo();
    let out = TempDir::new().unwrap();
    let target = out.path().join("idx.qmd");

    cmd()
        .args(root_arg(&root))
        .arg("index")
        .args(["-o", target.to_str().unwrap()])
        .assert()
        .success();

    assert!(read(&target).contains("**abs**"));
    assert!(!root
        .path()
        .join("src/functions-reference/functions_index.qmd")
        .exists());
}

#[test]
fn index_missing_source_fails() {
    let root = TempDir::new().unwrap();
    cmd()
        .args(root_arg(&root))
        .arg("index")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn index_without_signatures_fails() {
    let root = TempDir::new().unwrap();
    let src = root.path().join("src/functions-reference");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("intro.qmd"), "# Introduction\n<!-- a note -->\n").unwrap();

    cmd()
        .args(root_arg(&root))
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no function signatures"));
}

// -- sigs --

#[test]
fn sigs_writes_versioned_table() {
    let root = repo();
    cmd()
        .args(root_arg(&root))
        .args(["sigs", "2", "35"])
        .assert()
        .success();

    let table = read(&root.path().join("stan-functions-2_35.txt"));
    assert_eq!(
        table,
        "# This file is semicolon delimited\n\
         StanFunction; Arguments; ReturnType\n\
         Phi; (real x); real\n\
         abs; (int x); int\n\
         normal; ~; real\n\
         normal_lpdf; (reals y | reals mu, reals sigma); real\n\
         operator*; (int x, int y); int\n"
    );
}

#[test]
fn sigs_custom_output() {
    let root = repo();
    let out = TempDir::new().unwrap();
    let target = out.path().join("table.txt");

    cmd()
        .args(root_arg(&root))
        .args(["sigs", "2", "36", "-o", target.to_str().unwrap()])
        .assert()
        .success();

    assert!(read(&target).contains("abs; (int x); int\n"));
}

#[test]
fn sigs_rejects_lone_major() {
    cmd()
        .args(["sigs", "2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("<MINOR>"));
}

// -- argument handling --

#[test]
fn invalid_document_lists_choices() {
    cmd()
        .args(["build", "2", "35", "manual"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("functions-reference"))
        .stderr(predicate::str::contains("reference-manual"));
}

#[test]
fn help_succeeds() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-links"));
}

#[test]
fn build_missing_sources_fails() {
    let root = TempDir::new().unwrap();
    cmd()
        .args(root_arg(&root))
        .args(["build", "2", "35", "reference-manual", "html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference-manual"));
}

// -- redirects --

#[test]
fn redirects_point_at_versioned_pages() {
    let root = TempDir::new().unwrap();
    let rendered = root.path().join("docs/2_35/reference-manual");
    fs::create_dir_all(&rendered).unwrap();
    fs::write(rendered.join("types.html"), "<html></html>").unwrap();
    fs::write(rendered.join("search.json"), "{}").unwrap();

    cmd()
        .args(root_arg(&root))
        .args(["redirects", "2", "35", "reference-manual"])
        .assert()
        .success();

    let stub = read(&root.path().join("docs/reference-manual/types.html"));
    assert!(stub.contains("url=https://mc-stan.org/docs/2_35/reference-manual/types.html"));
    assert!(!root.path().join("docs/reference-manual/search.json").exists());
}

// -- old-banner --

#[test]
fn old_banner_marks_pages_once() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("docs/2_18/functions-reference");
    fs::create_dir_all(&dir).unwrap();
    let page = "<body>\n<section class=\"normal\" id=\"section-\">\n<h1>Title</h1>\n</body>\n";
    fs::write(dir.join("integer.html"), page).unwrap();

    cmd()
        .args(root_arg(&root))
        .args(["old-banner", "docs/2_18/functions-reference"])
        .assert()
        .success();
    let marked = read(&dir.join("integer.html"));
    assert!(marked.contains(
        "This is an old version, <a href=\"https://mc-stan.org/docs/functions-reference/integer.html\">view current version</a>."
    ));

    cmd()
        .args(root_arg(&root))
        .args(["old-banner", "docs/2_18/functions-reference"])
        .assert()
        .success();
    assert_eq!(read(&dir.join("integer.html")), marked);
}

// -- check-links --

#[test]
fn check_links_with_nothing_to_check() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("docs/2_18")).unwrap();
    fs::write(root.path().join("docs/2_18/index.html"), "<html></html>").unwrap();

    cmd()
        .args(root_arg(&root))
        .args(["check-links", "--pause", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checking 0 links..."))
        .stdout(predicate::str::contains("Done."));
}

#[test]
fn check_links_missing_docs_fails() {
    let root = TempDir::new().unwrap();
    cmd()
        .args(root_arg(&root))
        .args(["check-links", "--pause", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("docs directory not found"));
}
