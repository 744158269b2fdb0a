//! Module tree ("barrel") assembly
//!
//! Given the flat list of generated files, produces one index file per
//! directory so every file is reachable from the root index.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use typegen_common::{Error, FileDescription, Result};

use crate::names::{normalize_dir_name, normalize_name};

/// Options for barrel generation, supplied by the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrelOptions {
    /// Emit type-only re-exports instead of value re-exports
    pub type_only: bool,
    /// Appended to every re-exported file identifier
    pub postfix: String,
    /// Appended to every imported module path (e.g. `.js`)
    pub module_suffix: String,
    /// File name of the index file in each directory
    pub index_file: String,
}

impl Default for BarrelOptions {
    fn default() -> Self {
        Self {
            type_only: false,
            postfix: String::new(),
            module_suffix: String::new(),
            index_file: "index.ts".to_string(),
        }
    }
}

/// Directory path as a sequence of segments; the root is empty
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirPath(Vec<String>);

impl DirPath {
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Parent directory and this directory's basename, `None` at the root
    pub fn split_last(&self) -> Option<(DirPath, &str)> {
        let (last, parent) = self.0.split_last()?;
        Some((DirPath(parent.to_vec()), last.as_str()))
    }

    /// Path of a file inside this directory
    pub fn join_file(&self, file: &str) -> String {
        if self.is_root() {
            file.to_string()
        } else {
            format!("{}/{}", self.0.join("/"), file)
        }
    }
}

/// A generated file path split into directory and stem
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedPath {
    dir: DirPath,
    file_name: String,
    stem: String,
}

fn parse_path(path: &str) -> Result<ParsedPath> {
    if path.is_empty() || path.starts_with('/') {
        return Err(Error::malformed_path(path));
    }

    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
        return Err(Error::malformed_path(path));
    }

    let (file_name, dirs) = segments
        .split_last()
        .ok_or_else(|| Error::malformed_path(path))?;
    let stem = match file_name.rfind('.') {
        Some(0) | None => file_name.to_string(),
        Some(idx) => file_name[..idx].to_string(),
    };

    Ok(ParsedPath {
        dir: DirPath(dirs.iter().map(|s| s.to_string()).collect()),
        file_name: file_name.to_string(),
        stem,
    })
}

/// Per-directory children of the module tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModuleTree {
    files: BTreeMap<DirPath, BTreeSet<String>>,
    directories: BTreeMap<DirPath, BTreeSet<String>>,
}

impl ModuleTree {
    /// Build the tree for `paths`, closing the parent relation up to the root.
    ///
    /// Duplicate paths are collapsed and paths named like the index file are
    /// ignored, so feeding the builder its own output changes nothing.
    pub fn build<S: AsRef<str>>(paths: &[S], index_file: &str) -> Result<Self> {
        let mut tree = ModuleTree::default();

        for path in paths {
            let parsed = parse_path(path.as_ref())?;
            if parsed.file_name == index_file {
                tree.directories.entry(parsed.dir).or_default();
                continue;
            }
            tree.files.entry(parsed.dir).or_default().insert(parsed.stem);
        }

        let mut worklist: Vec<DirPath> = tree
            .files
            .keys()
            .chain(tree.directories.keys())
            .cloned()
            .collect();

        while let Some(dir) = worklist.pop() {
            let Some((parent, name)) = dir.split_last() else {
                continue;
            };
            let children = tree.directories.entry(parent.clone()).or_default();
            let parent_is_new = children.is_empty() && !tree.files.contains_key(&parent);
            if children.insert(name.to_string()) && parent_is_new {
                worklist.push(parent);
            }
        }

        Ok(tree)
    }

    /// Every directory that receives an index file, sorted
    pub fn directories(&self) -> BTreeSet<&DirPath> {
        self.files.keys().chain(self.directories.keys()).collect()
    }

    /// Child directory names of `dir`, sorted
    pub fn child_directories(&self, dir: &DirPath) -> impl Iterator<Item = &str> {
        self.directories
            .get(dir)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    /// File stems directly inside `dir`, sorted
    pub fn child_files(&self, dir: &DirPath) -> impl Iterator<Item = &str> {
        self.files
            .get(dir)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }
}

/// Create the index files for every directory touched by `paths`.
///
/// The result is ordered by directory, root first.
pub fn create_barrel_files<S: AsRef<str>>(
    paths: &[S],
    options: &BarrelOptions,
) -> Result<Vec<FileDescription>> {
    let tree = ModuleTree::build(paths, &options.index_file)?;

    tree.directories()
        .into_iter()
        .map(|dir| {
            let contents = render_index(&tree, dir, options)?;
            Ok(FileDescription::new(dir.join_file(&options.index_file), contents))
        })
        .collect()
}

fn render_index(tree: &ModuleTree, dir: &DirPath, options: &BarrelOptions) -> Result<String> {
    let mut lines = Vec::new();

    for child in tree.child_directories(dir) {
        let namespace = normalize_dir_name(child);
        let module = if options.module_suffix.is_empty() {
            format!("./{}", child)
        } else {
            format!("./{}/index{}", child, options.module_suffix)
        };

        if options.type_only {
            lines.push(format!("import type * as {} from '{}';", namespace, module));
            lines.push(format!("export type {{ {} }};", namespace));
        } else {
            lines.push(format!("export * as {} from '{}';", namespace, module));
        }
    }

    // Named re-exports: two files in different directories may export the
    // same symbol, and a wildcard would hide that collision.
    let keyword = if options.type_only { "export type" } else { "export" };
    for stem in tree.child_files(dir) {
        let name = format!("{}{}", normalize_name(stem)?, options.postfix);
        lines.push(format!(
            "{} {{ {} }} from './{}{}';",
            keyword, name, name, options.module_suffix
        ));
    }

    Ok(lines.join("\n"))
}
