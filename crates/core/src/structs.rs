//! Struct discovery and namespace grouping

use std::collections::HashMap;

use typegen_common::{Error, Result};

use crate::contract::ContractInfo;
use crate::grouping::group_by_first_seen;
use crate::types::{EvmType, EvmTypeKind, StructName, StructType};

/// Collects named structs reachable from contract signatures.
///
/// Structs are keyed by `(namespace, identifier)`: two structs with the same
/// shape but different names are both kept, and one name bound to two
/// different shapes is a [`Error::NameCollision`]. Anonymous tuples are not
/// collected. Each generation pass owns its own instance.
#[derive(Debug, Default)]
pub struct StructDeduplicator {
    structs: Vec<StructType>,
    index: HashMap<StructName, usize>,
}

impl StructDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk every signature of `contract` in declaration order
    pub fn add_contract(&mut self, contract: &ContractInfo) -> Result<()> {
        for ty in contract.signature_types() {
            self.visit(ty)?;
        }
        Ok(())
    }

    /// Walk one type, depth first, registering structs on first sight
    pub fn visit(&mut self, ty: &EvmType) -> Result<()> {
        match &ty.kind {
            EvmTypeKind::Address
            | EvmTypeKind::Bool
            | EvmTypeKind::String
            | EvmTypeKind::Uinteger { .. }
            | EvmTypeKind::Integer { .. }
            | EvmTypeKind::Bytes { .. }
            | EvmTypeKind::DynamicBytes => Ok(()),
            EvmTypeKind::Array { element, .. } => self.visit(element),
            EvmTypeKind::Tuple { components, .. } => {
                if let Some(strukt) = ty.as_struct() {
                    self.register(strukt)?;
                }
                for component in components {
                    self.visit(&component.ty)?;
                }
                Ok(())
            }
        }
    }

    fn register(&mut self, strukt: StructType) -> Result<()> {
        match self.index.get(&strukt.name) {
            Some(&slot) => {
                let existing = &self.structs[slot];
                if existing.shape_signature() != strukt.shape_signature() {
                    return Err(Error::name_collision(format!(
                        "struct '{}' is declared with two different shapes: {} and {}",
                        strukt.name,
                        existing.shape_signature(),
                        strukt.shape_signature()
                    )));
                }
            }
            None => {
                self.index.insert(strukt.name.clone(), self.structs.len());
                self.structs.push(strukt);
            }
        }
        Ok(())
    }

    /// Distinct structs in first-discovery order
    pub fn structs(&self) -> &[StructType] {
        &self.structs
    }

    pub fn into_structs(self) -> Vec<StructType> {
        self.structs
    }
}

/// Structs grouped by namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceGroups {
    /// Structs without a namespace, in first-discovery order
    pub top_level: Vec<StructType>,
    /// Namespaced structs, namespaces in first-discovery order
    pub namespaces: Vec<(String, Vec<StructType>)>,
}

/// Split structs into the top level and per-namespace groups.
///
/// Duplicates by `(namespace, identifier)` are dropped, first occurrence wins.
/// Ordering is never alphabetical.
pub fn group_by_namespace(structs: &[StructType]) -> NamespaceGroups {
    let mut seen = std::collections::HashSet::new();
    let unique = structs
        .iter()
        .filter(|s| seen.insert(s.name.clone()))
        .cloned();

    let mut top_level = Vec::new();
    let mut namespaces = Vec::new();
    for (namespace, group) in group_by_first_seen(unique, |s| s.name.namespace.clone()) {
        match namespace {
            None => top_level = group,
            Some(namespace) => namespaces.push((namespace, group)),
        }
    }

    NamespaceGroups {
        top_level,
        namespaces,
    }
}
