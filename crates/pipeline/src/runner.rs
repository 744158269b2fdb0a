//! The generation run
//!
//! Decides which artifacts to regenerate, turns each into a declaration file,
//! rebuilds the index files from the complete artifact list and writes the
//! result.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, info, warn};
use typegen_core::target::{common_inputs_root, contract_name_for, relative_output_dir};
use typegen_core::{
    create_barrel_files, AbiParser, ContractInfo, Error, FileDescription, Result, Target,
    TypegenConfig,
};

use crate::writer::{write_all, FileWriter};

/// What the host asks the generator to do
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Every artifact of the project
    pub all_artifacts: Vec<PathBuf>,
    /// Artifacts changed since the previous run
    pub changed_artifacts: Vec<PathBuf>,
    /// Regenerate everything regardless of what changed
    pub full_rebuild: bool,
}

/// An artifact whose declaration file could not be generated
#[derive(Debug)]
pub struct ArtifactFailure {
    pub artifact: PathBuf,
    pub error: Error,
}

/// Result of a run
#[derive(Debug, Default)]
pub struct GenerationOutcome {
    /// Files written, declaration and index files together
    pub files_generated: usize,
    /// Artifacts that failed; files of the other artifacts were still written
    pub failures: Vec<ArtifactFailure>,
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs generation for one configuration and target.
///
/// Each run owns its parser and every per-contract resolver; the runner itself
/// holds only borrowed, immutable state.
pub struct TypegenRunner<'a> {
    config: &'a TypegenConfig,
    target: &'a dyn Target,
    writer: &'a dyn FileWriter,
}

impl<'a> TypegenRunner<'a> {
    pub fn new(config: &'a TypegenConfig, target: &'a dyn Target, writer: &'a dyn FileWriter) -> Self {
        Self {
            config,
            target,
            writer,
        }
    }

    /// Execute one run.
    ///
    /// Contract-level failures are collected in the outcome. A path collision
    /// aborts the run before anything is written.
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let external: Vec<PathBuf> = self
            .config
            .external_artifact_paths
            .iter()
            .map(PathBuf::from)
            .collect();

        if !request.full_rebuild && request.changed_artifacts.is_empty() && external.is_empty() {
            info!("No need to generate any newer typings.");
            return Ok(GenerationOutcome::default());
        }

        let needs_full_rebuild = request.full_rebuild || !self.target.supports_incremental();

        let mut every_artifact = request.all_artifacts.clone();
        every_artifact.extend(external.iter().cloned());
        let inputs_root = common_inputs_root(&every_artifact);

        let mut passes: Vec<(&str, Vec<PathBuf>)> = Vec::new();
        if needs_full_rebuild {
            passes.push(("", every_artifact.clone()));
        } else {
            passes.push(("", request.changed_artifacts.clone()));
            if !external.is_empty() {
                passes.push((" for external artifacts", external));
            }
        }

        let mut outcome = GenerationOutcome::default();
        let mut failed: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();
        let mut generated_per_pass = Vec::with_capacity(passes.len());

        for (label, artifacts) in passes {
            info!(
                "Generating typings for: {} artifacts in dir: {} for target: {}",
                artifacts.len(),
                self.config.output_directory,
                self.target.name()
            );

            let (declarations, failures) =
                self.generate_declarations(&artifacts, &inputs_root).await;
            failed.extend(failures.iter().map(|f| f.artifact.clone()));
            outcome.failures.extend(failures);
            generated_per_pass.push((label, declarations.len()));
            files.extend(declarations);
        }

        let barrels = self.barrel_files(&every_artifact, &inputs_root, &failed)?;
        debug!("Assembled {} index files", barrels.len());
        files.extend(barrels);

        // Nothing is written if any two files claim the same path
        let files = deduplicate(files)?;
        write_all(self.writer, &files).await?;
        outcome.files_generated = files.len();

        for (label, count) in generated_per_pass {
            info!("Successfully generated {} typings{}!", count, label);
        }
        for failure in &outcome.failures {
            warn!(
                "Failed to generate typings for {}: {}",
                failure.artifact.display(),
                failure.error
            );
        }

        Ok(outcome)
    }

    /// Generate declaration files concurrently, isolating per-artifact failures
    async fn generate_declarations(
        &self,
        artifacts: &[PathBuf],
        inputs_root: &Path,
    ) -> (Vec<FileDescription>, Vec<ArtifactFailure>) {
        let results = join_all(
            artifacts
                .iter()
                .map(|artifact| self.generate_declaration(artifact, inputs_root)),
        )
        .await;

        let mut files = Vec::new();
        let mut failures = Vec::new();
        for (artifact, result) in artifacts.iter().zip(results) {
            match result {
                Ok(file) => files.push(file),
                Err(error) => failures.push(ArtifactFailure {
                    artifact: artifact.clone(),
                    error,
                }),
            }
        }
        (files, failures)
    }

    async fn generate_declaration(&self, artifact: &Path, inputs_root: &Path) -> Result<FileDescription> {
        let content = tokio::fs::read_to_string(artifact)
            .await
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", artifact.display(), e)))?;

        let name = contract_name_for(artifact)?;
        let abi = AbiParser::new()
            .parse_content(&content)
            .map_err(|e| e.within(&name))?;
        if let Some(recorded) = abi.contract_name.as_deref() {
            if recorded != name {
                debug!(
                    "{} records contract name '{}', using '{}'",
                    artifact.display(),
                    recorded,
                    name
                );
            }
        }

        let contract = ContractInfo::from_abi(&name, &abi)?;
        let path = self.output_path(artifact, inputs_root, &name)?;
        self.target.generate_contract(&contract, &path)
    }

    fn output_path(&self, artifact: &Path, inputs_root: &Path, name: &str) -> Result<String> {
        let dir = relative_output_dir(artifact, inputs_root)?;
        Ok(self.target.output_path(&dir, name))
    }

    /// Index files for every artifact that did not fail in this run
    fn barrel_files(
        &self,
        artifacts: &[PathBuf],
        inputs_root: &Path,
        failed: &HashSet<PathBuf>,
    ) -> Result<Vec<FileDescription>> {
        let mut paths = Vec::with_capacity(artifacts.len());
        for artifact in artifacts.iter().filter(|a| !failed.contains(*a)) {
            let path = contract_name_for(artifact)
                .and_then(|name| self.output_path(artifact, inputs_root, &name));
            match path {
                Ok(path) => paths.push(path),
                Err(e) => warn!("Leaving {} out of the index files: {}", artifact.display(), e),
            }
        }

        create_barrel_files(&paths, &self.target.barrel_options())
    }
}

/// Drop exact duplicates; two different contents for one path is fatal
fn deduplicate(files: Vec<FileDescription>) -> Result<Vec<FileDescription>> {
    let mut by_path: BTreeMap<String, FileDescription> = BTreeMap::new();
    for file in files {
        match by_path.get(&file.path) {
            Some(existing) if existing.contents != file.contents => {
                return Err(Error::path_collision(file.path));
            }
            Some(_) => {}
            None => {
                by_path.insert(file.path.clone(), file);
            }
        }
    }
    Ok(by_path.into_values().collect())
}

/// Remove the output directory.
///
/// Returns whether there was anything to remove.
pub async fn clean(output_directory: &Path) -> Result<bool> {
    if !tokio::fs::try_exists(output_directory).await? {
        debug!("Nothing to clean at {}", output_directory.display());
        return Ok(false);
    }

    tokio::fs::remove_dir_all(output_directory).await.map_err(|e| {
        Error::Io(format!(
            "Failed to remove {}: {}",
            output_directory.display(),
            e
        ))
    })?;
    info!("Removed {}", output_directory.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicate_tolerates_identical_files() {
        let files = vec![
            FileDescription::new("b.ts", "b"),
            FileDescription::new("a.ts", "a"),
            FileDescription::new("b.ts", "b"),
        ];
        let unique = deduplicate(files).unwrap();
        let paths: Vec<&str> = unique.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn test_deduplicate_rejects_conflicting_contents() {
        let files = vec![
            FileDescription::new("Token.ts", "export type Token = {};"),
            FileDescription::new("Token.ts", "export type Token = { x: 1 };"),
        ];
        assert!(matches!(
            deduplicate(files),
            Err(Error::PathCollision(path)) if path == "Token.ts"
        ));
    }
}
