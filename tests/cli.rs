//! Command line tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COUNTER_ABI: &str = r#"[
  {"type": "function", "name": "increment", "stateMutability": "nonpayable",
   "inputs": [{"name": "by", "type": "uint256"}], "outputs": []},
  {"type": "event", "name": "Incremented", "anonymous": false,
   "inputs": [{"name": "value", "type": "uint256", "indexed": false}]}
]"#;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn cli() -> Command {
    Command::cargo_bin("abi-typegen").unwrap()
}

#[test]
fn test_generate_writes_declarations_and_index() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("abi/counters/Counter.json");
    write(&artifact, COUNTER_ABI);
    let out = dir.path().join("types");

    cli()
        .arg("generate")
        .arg(&artifact)
        .arg("--full-rebuild")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();

    let declarations = fs::read_to_string(out.join("Counter.ts")).unwrap();
    assert!(declarations.contains("export type Counter = {"));
    assert!(declarations.contains("export type IncrementedEvent = {"));
    assert_eq!(
        fs::read_to_string(out.join("index.ts")).unwrap(),
        "export type { Counter } from './Counter';"
    );
}

#[test]
fn test_generate_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("abi/Counter.json");
    write(&artifact, COUNTER_ABI);
    let out = dir.path().join("generated");
    let config = dir.path().join("typegen.toml");
    write(
        &config,
        &format!(
            "outputDirectory = {:?}\ntypeOnlyBarrels = false\ntargetIdentifier = \"ethers-v6\"\n",
            out.display().to_string()
        ),
    );

    cli()
        .arg("generate")
        .arg(&artifact)
        .arg("--full-rebuild")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out.join("index.ts")).unwrap(),
        "export { Counter } from './Counter';"
    );
    assert!(fs::read_to_string(out.join("Counter.ts"))
        .unwrap()
        .contains("inputs: [by: BigNumberish];"));
}

#[test]
fn test_generate_without_changes_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("abi/Counter.json");
    write(&artifact, COUNTER_ABI);
    let out = dir.path().join("types");

    cli()
        .arg("generate")
        .arg(&artifact)
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("No need to generate any newer typings."));

    assert!(!out.exists());
}

#[test]
fn test_generate_with_only_external_artifacts() {
    let dir = TempDir::new().unwrap();
    let external = dir.path().join("vendor/Counter.json");
    write(&external, COUNTER_ABI);
    let out = dir.path().join("types");
    let config = dir.path().join("typegen.toml");
    write(
        &config,
        &format!(
            "outputDirectory = {:?}\nexternalArtifactPaths = [{:?}]\n",
            out.display().to_string(),
            external.display().to_string()
        ),
    );

    cli()
        .arg("generate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(out.join("Counter.ts").exists());
    assert!(out.join("index.ts").exists());
}

#[test]
fn test_failed_artifact_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("abi/Counter.json");
    let bad = dir.path().join("abi/Broken.json");
    write(&good, COUNTER_ABI);
    write(&bad, "{ not json");
    let out = dir.path().join("types");

    cli()
        .arg("generate")
        .arg(&good)
        .arg(&bad)
        .arg("--full-rebuild")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Broken.json"));

    assert!(out.join("Counter.ts").exists());
    assert!(!out.join("Broken.ts").exists());
}

#[test]
fn test_unknown_target_is_rejected() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("abi/Counter.json");
    write(&artifact, COUNTER_ABI);

    cli()
        .arg("generate")
        .arg(&artifact)
        .arg("--full-rebuild")
        .arg("--target")
        .arg("web3-v1")
        .arg("--out-dir")
        .arg(dir.path().join("types"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("ethers-v5"));
}

#[test]
fn test_clean_removes_output_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("types");
    write(&out.join("index.ts"), "export {};");

    cli()
        .arg("clean")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();
    assert!(!out.exists());

    cli()
        .arg("clean")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean."));
}

#[test]
fn test_targets_lists_presets() {
    cli()
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("ethers-v5").and(predicate::str::contains("ethers-v6")));
}
