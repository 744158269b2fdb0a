//! Identifier normalization and overload resolution

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use convert_case::{Case, Casing};
use regex::Regex;
use typegen_common::{Error, Result};

use crate::types::{EvmType, EvmTypeKind};

fn dash_letter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-([a-z])").expect("valid dash regex"))
}

/// Turn a file stem or raw contract name into a type identifier.
///
/// Whitespace and dots become word breaks, the letter after a break is
/// capitalised, leading digits are dropped and the first letter is upper-cased.
pub fn normalize_name(raw_name: &str) -> Result<String> {
    let dashed: String = raw_name
        .chars()
        .map(|c| if c.is_whitespace() || c == '.' { '-' } else { c })
        .collect();

    let capitalised = dash_letter_regex().replace_all(&dashed, |caps: &regex::Captures| {
        caps[1].to_uppercase()
    });
    let without_dashes = capitalised.replace('-', "");
    let trimmed = without_dashes.trim_start_matches(|c: char| c.is_ascii_digit());

    let mut chars = trimmed.chars();
    let normalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => {
            return Err(Error::malformed_abi(format!(
                "can't derive a type name from '{}', please rename it",
                raw_name
            )))
        }
    };

    Ok(normalized)
}

/// Turn a directory name into a namespace identifier (`Token.sol` → `tokenSol`)
pub fn normalize_dir_name(raw_name: &str) -> String {
    let spaced: String = raw_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let camel = spaced.trim().to_case(Case::Camel);
    let mut normalized: String = camel
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if normalized.starts_with(|c: char| c.is_ascii_digit()) {
        normalized.insert(0, '_');
    }
    if normalized.is_empty() {
        normalized.push('_');
    }
    normalized
}

/// Assigns unique identifiers to overloaded entries of one kind.
///
/// One resolver covers one namespace of one contract: functions, events and
/// errors each get their own instance.
#[derive(Debug)]
pub struct NameResolver {
    kind: &'static str,
}

impl NameResolver {
    /// Create a resolver for the given entry kind (used in diagnostics)
    pub fn new(kind: &'static str) -> Self {
        Self { kind }
    }

    /// Resolve identifiers for `names`, preserving declaration order.
    ///
    /// The first occurrence of a name keeps it; later ones get `_1`, `_2`, ….
    /// A synthesized identifier that is already declared verbatim is a
    /// [`Error::NameCollision`].
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>> {
        let declared: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        let mut assigned: HashSet<String> = HashSet::new();
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        let mut resolved = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let seen = occurrences.entry(name).or_insert(0);

            let identifier = if *seen == 0 {
                name.to_string()
            } else {
                let candidate = format!("{}_{}", name, seen);
                if declared.contains(candidate.as_str()) {
                    return Err(Error::name_collision(format!(
                        "overload of {} '{}' would be named '{}', which is already declared",
                        self.kind, name, candidate
                    )));
                }
                candidate
            };
            *seen += 1;

            if !assigned.insert(identifier.clone()) {
                return Err(Error::name_collision(format!(
                    "{} identifier '{}' is assigned twice",
                    self.kind, identifier
                )));
            }
            resolved.push(identifier);
        }

        Ok(resolved)
    }
}

/// Reject named structs with positional components anywhere under `types`
pub fn validate_struct_components<'a, I>(types: I) -> Result<()>
where
    I: IntoIterator<Item = &'a EvmType>,
{
    types.into_iter().try_for_each(validate_type)
}

fn validate_type(ty: &EvmType) -> Result<()> {
    match &ty.kind {
        EvmTypeKind::Address
        | EvmTypeKind::Bool
        | EvmTypeKind::String
        | EvmTypeKind::Uinteger { .. }
        | EvmTypeKind::Integer { .. }
        | EvmTypeKind::Bytes { .. }
        | EvmTypeKind::DynamicBytes => Ok(()),
        EvmTypeKind::Array { element, .. } => validate_type(element),
        EvmTypeKind::Tuple {
            components,
            struct_name,
        } => {
            if let Some(name) = struct_name {
                if let Some(idx) = components.iter().position(|c| c.name.is_empty()) {
                    return Err(Error::malformed_abi(format!(
                        "struct '{}' has an unnamed component at position {}",
                        name, idx
                    )));
                }
            }
            validate_struct_components(components.iter().map(|c| &c.ty))
        }
    }
}
