//! Target backend interface and output layout

use std::path::{Component, Path, PathBuf};

use typegen_common::{Error, FileDescription, Result};

use crate::barrel::BarrelOptions;
use crate::contract::ContractInfo;
use crate::names::normalize_name;

/// A client-library backend.
///
/// Codegen is synchronous and pure: a target turns one contract into one
/// declaration file and describes how index files should re-export it.
pub trait Target: Send + Sync {
    /// Identifier the target is selected by (e.g. `ethers-v5`)
    fn name(&self) -> &str;

    /// Whether only changed artifacts need regenerating between runs
    fn supports_incremental(&self) -> bool {
        false
    }

    /// Relative output path of the declaration file for `contract_name`,
    /// placed in `relative_dir` (posix, empty for the output root)
    fn output_path(&self, relative_dir: &str, contract_name: &str) -> String {
        if relative_dir.is_empty() {
            format!("{}.ts", contract_name)
        } else {
            format!("{}/{}.ts", relative_dir, contract_name)
        }
    }

    /// Render the declaration file of one contract at `path`
    fn generate_contract(&self, contract: &ContractInfo, path: &str) -> Result<FileDescription>;

    /// How index files re-export the generated declarations
    fn barrel_options(&self) -> BarrelOptions;
}

/// Deepest directory containing every path in `paths`.
///
/// Returns an empty path when `paths` is empty.
pub fn common_inputs_root<P: AsRef<Path>>(paths: &[P]) -> PathBuf {
    let mut dirs = paths
        .iter()
        .map(|p| p.as_ref().parent().unwrap_or_else(|| Path::new("")));

    let Some(first) = dirs.next() else {
        return PathBuf::new();
    };
    let mut root: Vec<Component> = first.components().collect();

    for dir in dirs {
        let shared = root
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| *a == b)
            .count();
        root.truncate(shared);
    }

    root.iter().collect()
}

/// Contract name for an artifact, derived from its file stem
pub fn contract_name_for(artifact: &Path) -> Result<String> {
    let stem = artifact
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::malformed_path(artifact.display().to_string()))?;
    normalize_name(stem)
}

/// Posix directory of `artifact` relative to `inputs_root`
pub fn relative_output_dir(artifact: &Path, inputs_root: &Path) -> Result<String> {
    let dir = artifact.parent().unwrap_or_else(|| Path::new(""));
    let relative = dir
        .strip_prefix(inputs_root)
        .map_err(|_| Error::malformed_path(artifact.display().to_string()))?;

    let segments = relative
        .components()
        .filter(|c| *c != Component::CurDir)
        .map(|c| match c {
            Component::Normal(segment) => segment
                .to_str()
                .map(String::from)
                .ok_or_else(|| Error::malformed_path(artifact.display().to_string())),
            _ => Err(Error::malformed_path(artifact.display().to_string())),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_inputs_root() {
        let paths = [
            "artifacts/contracts/token/ERC20.json",
            "artifacts/contracts/Vault.json",
            "artifacts/contracts/token/extensions/Permit.json",
        ];
        assert_eq!(
            common_inputs_root(&paths),
            PathBuf::from("artifacts/contracts")
        );

        assert_eq!(
            common_inputs_root(&["abi/Token.json"]),
            PathBuf::from("abi")
        );
        assert_eq!(common_inputs_root::<&str>(&[]), PathBuf::new());
    }

    #[test]
    fn test_relative_output_dir() {
        let root = Path::new("artifacts/contracts");
        assert_eq!(
            relative_output_dir(Path::new("artifacts/contracts/token/ERC20.json"), root).unwrap(),
            "token"
        );
        assert_eq!(
            relative_output_dir(Path::new("artifacts/contracts/Vault.json"), root).unwrap(),
            ""
        );
        assert!(matches!(
            relative_output_dir(Path::new("elsewhere/Vault.json"), root),
            Err(Error::MalformedPath(_))
        ));
    }

    #[test]
    fn test_contract_name_from_file_stem() {
        assert_eq!(contract_name_for(Path::new("abi/my-token.json")).unwrap(), "MyToken");
        assert_eq!(contract_name_for(Path::new("ERC20.json")).unwrap(), "ERC20");
        assert!(contract_name_for(Path::new("abi/42.json")).is_err());
    }

    #[test]
    fn test_current_dir_segments_are_skipped() {
        assert_eq!(
            relative_output_dir(Path::new("./abi/token/ERC20.json"), Path::new("")).unwrap(),
            "abi/token"
        );
    }
}
