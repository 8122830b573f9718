//! CLI integration tests for synapse
//!
//! Runs the synapse binary end-to-end using assert_cmd.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ABC: &str = r#"{
    "entities": [
        {"normalizedKey": "a", "originalName": "Alpha", "type": "GENE"},
        {"normalizedKey": "b", "originalName": "Beta", "type": "GENE"},
        {"normalizedKey": "c", "originalName": "Gamma", "type": "DISEASE"}
    ],
    "relationships": [
        {"source": "a", "target": "b", "weight": 2, "evidence": ["Alpha binds Beta."]},
        {"source": "b", "target": "c", "evidence": ["Beta drives Gamma."]}
    ]
}"#;

/// Command isolated from the user's configuration
#[allow(deprecated)]
fn synapse_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("synapse").unwrap();
    cmd.env("SYNAPSE_CONFIG_DIR", dir.path().join("config"));
    cmd.env("RUST_LOG", "off");
    cmd
}

fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_build_text_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "abc.json", ABC);

    synapse_cmd(&dir)
        .args(["build", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph: 3 nodes, 2 edges"));
}

#[test]
fn test_build_writes_graph_json_that_feeds_queries() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "abc.json", ABC);
    let output = dir.path().join("graph.json");

    synapse_cmd(&dir)
        .args(["build", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success();

    let graph: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(graph["metadata"]["totalEdges"], 2);
    assert_eq!(graph["edges"][0]["title"], "Alpha binds Beta.");

    synapse_cmd(&dir)
        .args(["path", output.to_str().unwrap(), "a", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a -> b -> c"));
}

#[test]
fn test_common_json() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "abc.json", ABC);

    let assert = synapse_cmd(&dir)
        .args(["--format", "json", "common", input.to_str().unwrap(), "a", "c"])
        .assert()
        .success();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["common"][0]["entity"], "b");
    assert_eq!(value["common"][0]["degree"], 2);
}

#[test]
fn test_hypotheses_lists_triadic_closure() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "abc.json", ABC);

    synapse_cmd(&dir)
        .args(["hypotheses", input.to_str().unwrap(), "--max", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Potential relationship between Alpha and Gamma via Beta",
        ));
}

#[test]
fn test_resolve_by_display_name() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "abc.json", ABC);

    synapse_cmd(&dir)
        .args(["resolve", input.to_str().unwrap(), "gamma"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("c (Gamma"));
}

#[test]
fn test_merge_sums_weights() {
    let dir = TempDir::new().unwrap();
    let base = write_input(&dir, "base.json", ABC);
    let incoming = write_input(
        &dir,
        "new.json",
        r#"{"relationships": [{"source": "a", "target": "b", "weight": 1}]}"#,
    );

    let assert = synapse_cmd(&dir)
        .args([
            "merge",
            base.to_str().unwrap(),
            incoming.to_str().unwrap(),
            "--format",
            "json",
        ])
        .assert()
        .success();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["edges"][0]["weight"], 3.0);
}

#[test]
fn test_invalid_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "bad.json",
        r#"{"relationships": [{"source": "a", "target": "a"}]}"#,
    );

    synapse_cmd(&dir)
        .args(["build", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid record"));
}

#[test]
fn test_extract_then_build() {
    let dir = TempDir::new().unwrap();
    let sentences = write_input(
        &dir,
        "sentences.json",
        r#"[
            {"sentence": "Gefitinib inhibits EGFR.", "entities": [
                {"text": "Gefitinib", "type": "CHEMICAL"},
                {"text": "EGFR", "type": "GENE"}
            ]}
        ]"#,
    );
    let batch = dir.path().join("batch.json");

    synapse_cmd(&dir)
        .args([
            "extract",
            sentences.to_str().unwrap(),
            "-o",
            batch.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 2 entities and 1 relationships"));

    synapse_cmd(&dir)
        .args(["build", batch.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph: 2 nodes, 1 edges"));
}

#[test]
fn test_config_set_get_roundtrip() {
    let dir = TempDir::new().unwrap();

    synapse_cmd(&dir)
        .args(["config", "set", "query.evidence_per_edge", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set query.evidence_per_edge = 5"));

    synapse_cmd(&dir)
        .args(["config", "get", "query.evidence_per_edge"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    synapse_cmd(&dir)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure();
}
