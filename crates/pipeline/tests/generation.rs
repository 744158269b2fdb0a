/// Tests for the generation run
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use typegen_core::{Error, FileDescription, Result, Target, TypegenConfig};
use typegen_ethers::TargetRegistry;
use typegen_pipeline::{clean, FileWriter, FsWriter, GenerationRequest, TypegenRunner};

const TOKEN_ABI: &str = r#"[
  {"type": "function", "name": "balanceOf", "stateMutability": "view",
   "inputs": [{"name": "account", "type": "address"}],
   "outputs": [{"name": "", "type": "uint256"}]}
]"#;

const VAULT_ARTIFACT: &str = r#"{
  "contractName": "Vault",
  "abi": [
    {"type": "function", "name": "deposit", "stateMutability": "payable",
     "inputs": [{"name": "position", "type": "tuple", "internalType": "struct Vault.Position",
                 "components": [{"name": "owner", "type": "address"}, {"name": "shares", "type": "uint128"}]}],
     "outputs": []}
  ]
}"#;

const BROKEN_ABI: &str = r#"[
  {"type": "function", "name": "bad", "inputs": [{"name": "x", "type": "uint7"}], "outputs": []}
]"#;

/// Records writes instead of touching the filesystem
#[derive(Default, Clone)]
struct RecordingWriter {
    written: Arc<Mutex<Vec<FileDescription>>>,
}

#[async_trait]
impl FileWriter for RecordingWriter {
    async fn write_file(&self, file: &FileDescription) -> Result<()> {
        self.written.lock().await.push(file.clone());
        Ok(())
    }
}

impl RecordingWriter {
    async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .written
            .lock()
            .await
            .iter()
            .map(|f| f.path.clone())
            .collect();
        paths.sort();
        paths
    }

    async fn contents(&self, path: &str) -> Option<String> {
        self.written
            .lock()
            .await
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.contents.clone())
    }
}

/// Test target that only supports full rebuilds
struct FullRebuildTarget(Box<dyn Target>);

impl Target for FullRebuildTarget {
    fn name(&self) -> &str {
        "full-only"
    }

    fn generate_contract(
        &self,
        contract: &typegen_core::ContractInfo,
        path: &str,
    ) -> Result<FileDescription> {
        self.0.generate_contract(contract, path)
    }

    fn barrel_options(&self) -> typegen_core::BarrelOptions {
        self.0.barrel_options()
    }
}

fn write_artifact(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

struct Project {
    _dir: TempDir,
    token: PathBuf,
    vault: PathBuf,
}

fn project() -> Project {
    let dir = TempDir::new().unwrap();
    let artifacts = dir.path().join("artifacts");
    let token = write_artifact(&artifacts, "token/Token.json", TOKEN_ABI);
    let vault = write_artifact(&artifacts, "Vault.json", VAULT_ARTIFACT);
    Project {
        _dir: dir,
        token,
        vault,
    }
}

#[tokio::test]
async fn test_empty_diff_short_circuits_without_writes() -> Result<()> {
    let project = project();
    let config = TypegenConfig::default();
    let target = TargetRegistry::new().create(&config)?;
    let writer = RecordingWriter::default();

    let request = GenerationRequest {
        all_artifacts: vec![project.token.clone(), project.vault.clone()],
        changed_artifacts: Vec::new(),
        full_rebuild: false,
    };
    let outcome = TypegenRunner::new(&config, target.as_ref(), &writer)
        .run(&request)
        .await?;

    assert_eq!(outcome.files_generated, 0);
    assert!(outcome.is_success());
    assert!(writer.paths().await.is_empty(), "Nothing should be written");
    Ok(())
}

#[tokio::test]
async fn test_full_rebuild_writes_declarations_and_barrels() -> Result<()> {
    let project = project();
    let config = TypegenConfig::default();
    let target = TargetRegistry::new().create(&config)?;
    let writer = RecordingWriter::default();

    let request = GenerationRequest {
        all_artifacts: vec![project.token.clone(), project.vault.clone()],
        changed_artifacts: Vec::new(),
        full_rebuild: true,
    };
    let outcome = TypegenRunner::new(&config, target.as_ref(), &writer)
        .run(&request)
        .await?;

    assert_eq!(
        writer.paths().await,
        vec!["Vault.ts", "index.ts", "token/Token.ts", "token/index.ts"]
    );
    assert_eq!(outcome.files_generated, 4);

    assert_eq!(
        writer.contents("index.ts").await.unwrap(),
        "import type * as token from './token';\nexport type { token };\nexport type { Vault } from './Vault';"
    );
    let vault = writer.contents("Vault.ts").await.unwrap();
    assert!(vault.contains("export declare namespace Vault {"));
    Ok(())
}

#[tokio::test]
async fn test_incremental_run_regenerates_changed_only_but_rebuilds_barrels() -> Result<()> {
    let project = project();
    let config = TypegenConfig::default();
    let target = TargetRegistry::new().create(&config)?;
    let writer = RecordingWriter::default();

    let request = GenerationRequest {
        all_artifacts: vec![project.token.clone(), project.vault.clone()],
        changed_artifacts: vec![project.vault.clone()],
        full_rebuild: false,
    };
    TypegenRunner::new(&config, target.as_ref(), &writer)
        .run(&request)
        .await?;

    assert_eq!(
        writer.paths().await,
        vec!["Vault.ts", "index.ts", "token/index.ts"]
    );
    Ok(())
}

#[tokio::test]
async fn test_target_without_incremental_support_rebuilds_everything() -> Result<()> {
    let project = project();
    let config = TypegenConfig::default();
    let target = FullRebuildTarget(TargetRegistry::new().create(&config)?);
    let writer = RecordingWriter::default();

    let request = GenerationRequest {
        all_artifacts: vec![project.token.clone(), project.vault.clone()],
        changed_artifacts: vec![project.vault.clone()],
        full_rebuild: false,
    };
    TypegenRunner::new(&config, &target, &writer)
        .run(&request)
        .await?;

    assert!(writer.paths().await.contains(&"token/Token.ts".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_external_artifacts_get_a_second_pass() -> Result<()> {
    let project = project();
    let external_dir = TempDir::new().unwrap();
    let external = write_artifact(external_dir.path(), "lib/Oracle.json", TOKEN_ABI);

    let config = TypegenConfig {
        external_artifact_paths: vec![external.to_string_lossy().into_owned()],
        ..Default::default()
    };
    let target = TargetRegistry::new().create(&config)?;
    let writer = RecordingWriter::default();

    // No changes, but external artifacts are always regenerated
    let request = GenerationRequest {
        all_artifacts: vec![project.token.clone(), project.vault.clone()],
        changed_artifacts: Vec::new(),
        full_rebuild: false,
    };
    let outcome = TypegenRunner::new(&config, target.as_ref(), &writer)
        .run(&request)
        .await?;

    let paths = writer.paths().await;
    assert!(paths.iter().any(|p| p.ends_with("lib/Oracle.ts")), "{:?}", paths);
    assert!(!paths.iter().any(|p| p.ends_with("token/Token.ts")), "{:?}", paths);
    assert!(outcome.files_generated > 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_contract_does_not_stop_the_others() -> Result<()> {
    let project = project();
    let broken = write_artifact(
        project.vault.parent().unwrap(),
        "Broken.json",
        BROKEN_ABI,
    );
    let config = TypegenConfig::default();
    let target = TargetRegistry::new().create(&config)?;
    let writer = RecordingWriter::default();

    let request = GenerationRequest {
        all_artifacts: vec![project.token.clone(), project.vault.clone(), broken.clone()],
        changed_artifacts: Vec::new(),
        full_rebuild: true,
    };
    let outcome = TypegenRunner::new(&config, target.as_ref(), &writer)
        .run(&request)
        .await?;

    assert!(!outcome.is_success());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].artifact, broken);
    assert!(matches!(outcome.failures[0].error, Error::MalformedAbi { .. }));

    let paths = writer.paths().await;
    assert!(paths.contains(&"Vault.ts".to_string()));
    assert!(!paths.contains(&"Broken.ts".to_string()));
    let index = writer.contents("index.ts").await.unwrap();
    assert!(!index.contains("Broken"), "Failed contracts stay out of the index");
    Ok(())
}

#[tokio::test]
async fn test_path_collision_aborts_before_writing() -> Result<()> {
    let dir = TempDir::new().unwrap();
    // Both normalize to `MyToken.ts` with different contents
    let first = write_artifact(dir.path(), "my-token.json", TOKEN_ABI);
    let second = write_artifact(dir.path(), "my token.json", VAULT_ARTIFACT);

    let config = TypegenConfig::default();
    let target = TargetRegistry::new().create(&config)?;
    let writer = RecordingWriter::default();

    let request = GenerationRequest {
        all_artifacts: vec![first, second],
        changed_artifacts: Vec::new(),
        full_rebuild: true,
    };
    let result = TypegenRunner::new(&config, target.as_ref(), &writer)
        .run(&request)
        .await;

    assert!(matches!(result, Err(Error::PathCollision(_))));
    assert!(writer.paths().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_fs_output_and_clean() -> Result<()> {
    let project = project();
    let out = TempDir::new().unwrap();
    let output_directory = out.path().join("typechain-types");

    let config = TypegenConfig {
        output_directory: output_directory.to_string_lossy().into_owned(),
        ..Default::default()
    };
    let target = TargetRegistry::new().create(&config)?;
    let writer = FsWriter::new(&output_directory);

    let request = GenerationRequest {
        all_artifacts: vec![project.token.clone(), project.vault.clone()],
        changed_artifacts: Vec::new(),
        full_rebuild: true,
    };
    TypegenRunner::new(&config, target.as_ref(), &writer)
        .run(&request)
        .await?;

    assert!(output_directory.join("token/Token.ts").exists());
    assert!(output_directory.join("index.ts").exists());

    assert!(clean(&output_directory).await?);
    assert!(!output_directory.exists());
    assert!(!clean(&output_directory).await?);
    Ok(())
}
