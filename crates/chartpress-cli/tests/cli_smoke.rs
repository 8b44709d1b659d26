use assert_cmd::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::process::Command;

fn chartpress() -> Command {
    Command::new(assert_cmd::cargo_bin!("chartpress"))
}

fn write_document(dir: &Path) -> std::path::PathBuf {
    let doc = json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "codeBlock",
                "attrs": { "language": "mermaid" },
                "content": [{ "type": "text", "text": "graph TD;A-->B" }]
            },
            {
                "type": "codeBlock",
                "attrs": { "language": "mermaid" },
                "content": [{ "type": "text", "text": "graph TD;A-->B" }]
            },
            {
                "type": "codeBlock",
                "attrs": { "language": "js" },
                "content": [{ "type": "text", "text": "let a = 1;" }]
            }
        ]
    });
    let path = dir.join("doc.json");
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    path
}

#[test]
fn extract_lists_distinct_charts() {
    let tmp = tempfile::tempdir().unwrap();
    let doc = write_document(tmp.path());

    let output = chartpress()
        .args(["extract", doc.to_string_lossy().as_ref()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let charts: Value = serde_json::from_slice(&output.stdout).unwrap();
    let charts = charts.as_array().unwrap();
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0]["source"], "graph TD;A-->B");
    let name = charts[0]["name"].as_str().unwrap();
    assert!(name.starts_with("RenderedMermaidChart-"));
    assert!(name.ends_with(".svg"));
}

#[test]
fn publish_without_a_tool_uploads_placeholders() {
    let tmp = tempfile::tempdir().unwrap();
    let doc = write_document(tmp.path());
    let assets = tmp.path().join("assets");
    let out = tmp.path().join("out.json");

    chartpress()
        .args([
            "publish",
            doc.to_string_lossy().as_ref(),
            "--backend",
            "external",
            "--mmdc",
            "/nonexistent/chartpress-test/mmdc",
            "--assets-dir",
            assets.to_string_lossy().as_ref(),
            "--collection",
            "docs",
            "--out",
            out.to_string_lossy().as_ref(),
            "--log-level",
            "off",
        ])
        .assert()
        .success();

    let stored: Vec<_> = fs::read_dir(&assets).unwrap().flatten().collect();
    assert_eq!(stored.len(), 1);
    let placeholder = fs::read_to_string(stored[0].path()).unwrap();
    assert!(placeholder.contains("Error rendering chart:"));

    let tree: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let content = tree["content"].as_array().unwrap();
    assert_eq!(content[0]["type"], "mediaSingle");
    assert_eq!(content[0]["content"][0]["attrs"]["collection"], "docs");
    assert_eq!(content[0]["content"][0]["attrs"]["width"], 400);
    assert_eq!(content[0], content[1]);
    assert_eq!(content[2]["type"], "codeBlock");
    assert_eq!(tree["version"], 1);
}

#[cfg(unix)]
#[test]
fn config_file_drives_the_external_tool() {
    let tmp = tempfile::tempdir().unwrap();
    let doc = write_document(tmp.path());
    let script = tmp.path().join("fake-mmdc.sh");
    fs::write(
        &script,
        r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
printf '<svg xmlns="http://www.w3.org/2000/svg" width="64" height="32"><rect style="fill: rgba(255, 0, 0, 0.5)"/></svg>' > "$out"
"#,
    )
    .unwrap();
    let assets = tmp.path().join("assets");
    let config = tmp.path().join("chartpress.toml");
    fs::write(
        &config,
        format!(
            "[external]\nprogram = \"sh\"\nleading-args = [{:?}]\n\n[upload]\ndir = {:?}\ncollection = \"from-file\"\n",
            script.to_string_lossy(),
            assets.to_string_lossy()
        ),
    )
    .unwrap();

    let output = chartpress()
        .args([
            "publish",
            doc.to_string_lossy().as_ref(),
            "--config",
            config.to_string_lossy().as_ref(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let tree: Value = serde_json::from_slice(&output.stdout).unwrap();
    let media = &tree["content"][0]["content"][0]["attrs"];
    assert_eq!(media["collection"], "from-file");
    assert_eq!(media["width"], 64);
    assert_eq!(media["height"], 32);

    let stored: Vec<_> = fs::read_dir(&assets).unwrap().flatten().collect();
    assert_eq!(stored.len(), 1);
    let svg = fs::read_to_string(stored[0].path()).unwrap();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("fill: #ff0000"));
}

#[test]
fn render_failure_writes_placeholder_and_exits_nonzero() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("chart.mmd");
    fs::write(&input, "graph TD;A-->B").unwrap();
    let out = tmp.path().join("chart.svg");

    chartpress()
        .args([
            "render",
            input.to_string_lossy().as_ref(),
            "--backend",
            "external",
            "--mmdc",
            "/nonexistent/chartpress-test/mmdc",
            "--out",
            out.to_string_lossy().as_ref(),
        ])
        .assert()
        .code(1);

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("Error rendering chart:"));
}

#[test]
fn bad_flag_value_is_a_usage_error() {
    chartpress()
        .args(["extract", "doc.json", "--backend", "browser"])
        .assert()
        .code(2);
}

#[test]
fn malformed_document_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let doc = tmp.path().join("doc.json");
    fs::write(&doc, "[1, 2, 3]").unwrap();

    chartpress()
        .args(["extract", doc.to_string_lossy().as_ref()])
        .assert()
        .code(1);
}
