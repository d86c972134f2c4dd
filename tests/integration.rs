use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn quire_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("quire");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let content = root.join("content");
    fs::create_dir_all(content.join("posts")).unwrap();

    fs::write(
        content.join("posts/rag-in-practice.md"),
        "+++\ntitle = \"RAG in Practice\"\ndate = 2023-02-14T09:00:00+01:00\ndraft = false\n+++\n\nRetrieval-augmented generation pairs a retriever with a generator.\n\n```mermaid\ngraph LR\n  Query --> Retriever --> LLM\n```\n",
    )
    .unwrap();
    fs::write(
        content.join("vector-databases.md"),
        "+++\ntitle = \"Choosing a Vector Database\"\ndate = 2023-05-02T18:30:00Z\ndraft = false\n+++\n\nIndexes trade recall for latency.\n\n```python\nindex.query(vector, top_k=5)\n```\n",
    )
    .unwrap();
    fs::write(
        content.join("data-engineering.md"),
        "+++\ntitle = \"Data Engineering Good Practice\"\ndate = 2023-08-20T07:00:00-04:00\ndraft = true\n+++\n\nIdempotent jobs first.\n",
    )
    .unwrap();

    let config_content = r#"[site]
title = "Engineering Notes"

[content]
root = "content"

[render]
output_dir = "public"
"#;

    let config_path = root.join("quire.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_quire(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    run_quire_in(&std::env::current_dir().unwrap(), config_path, args)
}

/// Run the binary from `dir`, so relative `--config` paths resolve there.
fn run_quire_in(dir: &Path, config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = quire_binary();
    let output = Command::new(&binary)
        .current_dir(dir)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run quire binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_list_excludes_drafts_newest_first() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_quire(&config_path, &["list"]);
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);
    assert!(!stdout.contains("Data Engineering Good Practice"));

    let vector = stdout.find("Choosing a Vector Database").unwrap();
    let rag = stdout.find("RAG in Practice").unwrap();
    assert!(vector < rag, "expected newest first, got: {}", stdout);
}

#[test]
fn test_list_oldest_first_override() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_quire(&config_path, &["list", "--order", "oldest-first"]);
    assert!(success);
    let vector = stdout.find("Choosing a Vector Database").unwrap();
    let rag = stdout.find("RAG in Practice").unwrap();
    assert!(rag < vector);
}

#[test]
fn test_list_with_drafts_marks_them() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_quire(&config_path, &["list", "--drafts"]);
    assert!(success);
    assert!(stdout.contains("Data Engineering Good Practice [draft]"));
}

#[test]
fn test_list_drafts_on_empty_collection() {
    let (tmp, config_path) = setup_test_env();
    let content = tmp.path().join("content");
    fs::remove_dir_all(&content).unwrap();
    fs::create_dir_all(&content).unwrap();

    let (stdout, _, success) = run_quire(&config_path, &["list", "--drafts"]);
    assert!(success);
    assert_eq!(stdout.trim(), "No documents.");

    let (stdout, _, success) = run_quire(&config_path, &["list"]);
    assert!(success);
    assert_eq!(stdout.trim(), "No published documents.");
}

#[test]
fn test_list_json() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_quire(&config_path, &["list", "--json"]);
    assert!(success);
    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["slug"], "vector-databases");
    assert_eq!(entries[1]["slug"], "posts/rag-in-practice");
    assert_eq!(entries[1]["date"], "2023-02-14T09:00:00+01:00");
}

#[test]
fn test_get_draft_by_path() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_quire(&config_path, &["get", "data-engineering.md"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("title:    Data Engineering Good Practice"));
    assert!(stdout.contains("draft:    true"));
    assert!(stdout.contains("Idempotent jobs first."));
}

#[test]
fn test_get_missing_document_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_quire(&config_path, &["get", "nope.md"]);
    assert!(!success);
    assert!(stderr.contains("document not found"));
}

#[test]
fn test_render_passes_diagram_through() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_quire(&config_path, &["render", "posts/rag-in-practice.md"]);
    assert!(success);
    assert!(stdout.contains("<pre class=\"mermaid\">graph LR\n  Query --&gt; Retriever --&gt; LLM\n</pre>"));
}

#[test]
fn test_build_skips_drafts() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_quire(&config_path, &["build", "--clean"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("pages written: 2"));
    assert!(stdout.contains("drafts skipped: 1"));

    let public = tmp.path().join("public");
    assert!(public.join("index.html").is_file());
    assert!(public.join("vector-databases/index.html").is_file());
    assert!(public.join("posts/rag-in-practice/index.html").is_file());
    assert!(!public.join("data-engineering").exists());

    let index = fs::read_to_string(public.join("index.html")).unwrap();
    assert!(!index.contains("Data Engineering Good Practice"));
}

#[test]
fn test_build_clean_refuses_output_holding_relative_content_root() {
    let (tmp, _config_path) = setup_test_env();
    let output = tmp.path().to_str().unwrap();

    let (stdout, stderr, success) = run_quire_in(
        tmp.path(),
        Path::new("./quire.toml"),
        &["build", "--clean", "--output", output],
    );
    assert!(!success, "build should refuse: stdout={}", stdout);
    assert!(stderr.contains("must not contain the content root"), "stderr={}", stderr);
    assert!(tmp.path().join("content/vector-databases.md").is_file());
    assert!(tmp.path().join("quire.toml").is_file());
}

#[test]
fn test_build_and_check_reject_duplicate_slugs() {
    let (tmp, config_path) = setup_test_env();
    fs::create_dir_all(tmp.path().join("content/vector-databases")).unwrap();
    fs::write(
        tmp.path().join("content/vector-databases/index.md"),
        "+++\ntitle = \"Vector Databases, Again\"\ndate = 2023-06-01T00:00:00Z\n+++\n\nSecond take.\n",
    )
    .unwrap();

    let (_, stderr, success) = run_quire(&config_path, &["build"]);
    assert!(!success);
    assert!(
        stderr.contains("vector-databases.md, vector-databases/index.md"),
        "stderr={}",
        stderr
    );
    assert!(!tmp.path().join("public/index.html").exists());

    let (stdout, _, success) = run_quire(&config_path, &["check", "--json"]);
    assert!(!success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let kinds: Vec<&str> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["duplicate_slug", "duplicate_slug"]);
}

#[test]
fn test_export_to_stdout() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_quire(&config_path, &["export"]);
    assert!(success);
    let data: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(data["site"]["title"], "Engineering Notes");
    let docs = data["documents"].as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|d| d["draft"] == false));
}

#[test]
fn test_check_passes_on_clean_content() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_quire(&config_path, &["check", "--strict"]);
    assert!(success, "check failed: {}", stdout);
    assert!(stdout.contains("checked 3 documents (2 published, 1 drafts): 0 issues"));
}

#[test]
fn test_check_fails_on_malformed_front_matter() {
    let (tmp, config_path) = setup_test_env();
    fs::write(
        tmp.path().join("content/broken.md"),
        "+++\ntitle = \"Broken\"\ndate = 2023-13-45\n+++\n",
    )
    .unwrap();

    let (stdout, _, success) = run_quire(&config_path, &["check"]);
    assert!(!success);
    assert!(stdout.contains("broken.md"));

    // Other commands keep working on the readable documents.
    let (stdout, _, success) = run_quire(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("RAG in Practice"));
}

#[test]
fn test_stats() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_quire(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Documents:   3"));
    assert!(stdout.contains("Drafts:      1"));
    assert!(stdout.contains("Diagrams:    1"));
    assert!(stdout.contains("python"));
}

#[test]
fn test_new_creates_draft_hidden_from_list() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_quire(
        &config_path,
        &["new", "Grammar Constrained Output", "--date", "2024-01-05T10:00:00Z"],
    );
    assert!(success, "new failed: {}", stderr);
    assert!(stdout.contains("Created draft"));
    assert!(tmp
        .path()
        .join("content/grammar-constrained-output.md")
        .is_file());

    let (stdout, _, _) = run_quire(&config_path, &["list"]);
    assert!(!stdout.contains("Grammar Constrained Output"));

    let (_, _, success) = run_quire(&config_path, &["check", "--strict"]);
    assert!(success);
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_quire(&tmp.path().join("missing.toml"), &["list"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_completions_need_no_config() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _, success) = run_quire(&tmp.path().join("missing.toml"), &["completions", "bash"]);
    assert!(success);
    assert!(stdout.contains("quire"));
}
