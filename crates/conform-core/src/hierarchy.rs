//! Hierarchy walker - the type registry and ancestor chains
//!
//! Every declared type gets its ancestor chain computed once, at declaration
//! time, with C3 linearization. Chains are ordered most-derived first, start
//! with the type itself and never contain the universal root `object`.
//!
//! Each type also gets a shape digest at declaration time: a SHA-256 over
//! its resolved member table, used to key the verification cache.
//!
//! Bases must already be declared, so a registry can never contain a cycle.
//! Once declared, a type is immutable: the registry only hands out shared
//! references.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::cache;
use crate::model::{MemberBody, TypeDecl, CONTRACT, OBJECT};
use crate::signature::validate_function;
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct Entry {
    decl: TypeDecl,
    ancestors: Vec<String>,
    digest: String,
}

/// All declared types, in declaration order
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: Vec<Entry>,
    index: BTreeMap<String, usize>,
}

impl TypeRegistry {
    /// Create a registry holding only the `Contract` marker
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            entries: Vec::new(),
            index: BTreeMap::new(),
        };
        registry.insert(TypeDecl::new(CONTRACT), vec![CONTRACT.to_string()]);
        // The marker has no members and no bases; its shape always resolves
        let digest = cache::shape_digest(&registry, CONTRACT).unwrap_or_default();
        if let Some(entry) = registry.entries.last_mut() {
            entry.digest = digest;
        }
        registry
    }

    /// Declare a new type
    ///
    /// # Errors
    /// - `DuplicateType` if the name is taken (including `object`/`Contract`)
    /// - `UnknownType` if a base was not declared first
    /// - `InconsistentHierarchy` for repeated bases or an unlinearizable order
    /// - `DuplicateMember` / `InvalidSignature` for malformed members
    pub fn declare(&mut self, decl: TypeDecl) -> Result<()> {
        if decl.name == OBJECT || self.index.contains_key(&decl.name) {
            return Err(Error::DuplicateType(decl.name));
        }

        let bases: Vec<String> = decl
            .bases
            .iter()
            .filter(|b| b.as_str() != OBJECT)
            .cloned()
            .collect();

        let mut seen = BTreeSet::new();
        for base in &bases {
            if !self.index.contains_key(base) {
                return Err(Error::UnknownType(base.clone()));
            }
            if !seen.insert(base.as_str()) {
                return Err(Error::InconsistentHierarchy {
                    name: decl.name.clone(),
                    bases: bases.clone(),
                });
            }
        }

        validate_members(&decl)?;

        let ancestors = self.linearize(&decl.name, &bases)?;
        trace!(name = %decl.name, ancestors = ?ancestors, "declared type");
        let name = decl.name.clone();
        self.insert(decl, ancestors);

        match cache::shape_digest(self, &name) {
            Ok(digest) => {
                if let Some(entry) = self.entries.last_mut() {
                    entry.digest = digest;
                }
                Ok(())
            }
            Err(e) => {
                self.entries.pop();
                self.index.remove(&name);
                Err(e)
            }
        }
    }

    fn insert(&mut self, decl: TypeDecl, ancestors: Vec<String>) {
        self.index.insert(decl.name.clone(), self.entries.len());
        self.entries.push(Entry {
            decl,
            ancestors,
            digest: String::new(),
        });
    }

    /// C3 merge of the bases' chains followed by the base list itself
    fn linearize(&self, name: &str, bases: &[String]) -> Result<Vec<String>> {
        let mut sequences: Vec<Vec<String>> = Vec::with_capacity(bases.len() + 1);
        for base in bases {
            sequences.push(self.ancestors(base)?.to_vec());
        }
        sequences.push(bases.to_vec());

        let mut order = vec![name.to_string()];
        loop {
            sequences.retain(|s| !s.is_empty());
            if sequences.is_empty() {
                return Ok(order);
            }

            let head = sequences
                .iter()
                .map(|s| &s[0])
                .find(|candidate| !sequences.iter().any(|s| s[1..].contains(*candidate)))
                .cloned();

            let Some(head) = head else {
                return Err(Error::InconsistentHierarchy {
                    name: name.to_string(),
                    bases: bases.to_vec(),
                });
            };

            for sequence in sequences.iter_mut() {
                if sequence[0] == head {
                    sequence.remove(0);
                }
            }
            order.push(head);
        }
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// Look up a declared type
    pub fn get(&self, name: &str) -> Result<&TypeDecl> {
        self.entry(name).map(|e| &e.decl)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Ancestor chain of `name`, most-derived first, universal root excluded
    pub fn ancestors(&self, name: &str) -> Result<&[String]> {
        self.entry(name).map(|e| e.ancestors.as_slice())
    }

    /// SHA-256 of the type's ancestors and resolved members, fixed at declaration
    pub fn digest(&self, name: &str) -> Result<&str> {
        self.entry(name).map(|e| e.digest.as_str())
    }

    /// Whether `name` derives from the `Contract` marker
    pub fn is_contract(&self, name: &str) -> bool {
        name != CONTRACT
            && self
                .ancestors(name)
                .is_ok_and(|chain| chain.iter().any(|a| a == CONTRACT))
    }

    /// Ancestors present in both chains, in `a`'s order
    pub fn shared_ancestors(&self, a: &str, b: &str) -> Result<Vec<String>> {
        let other: BTreeSet<&str> = self.ancestors(b)?.iter().map(String::as_str).collect();
        Ok(self
            .ancestors(a)?
            .iter()
            .filter(|name| other.contains(name.as_str()))
            .cloned()
            .collect())
    }

    /// Declared types in declaration order, the `Contract` marker excluded
    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.entries
            .iter()
            .map(|e| &e.decl)
            .filter(|d| d.name != CONTRACT)
    }

    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique member names and well-formed parameter lists
fn validate_members(decl: &TypeDecl) -> Result<()> {
    let mut names = BTreeSet::new();
    for member in &decl.members {
        if !names.insert(member.name.as_str()) {
            return Err(Error::DuplicateMember {
                owner: decl.name.clone(),
                member: member.name.clone(),
            });
        }

        let invalid = |reason: String| Error::InvalidSignature {
            owner: decl.name.clone(),
            member: member.name.clone(),
            reason,
        };

        match &member.body {
            MemberBody::Function(function) => validate_function(function).map_err(invalid)?,
            MemberBody::Accessor(accessor) => {
                if accessor.is_empty() {
                    return Err(invalid(
                        "accessor defines no getter, setter or deleter".to_string(),
                    ));
                }
                for (part, function) in [
                    ("getter", &accessor.getter),
                    ("setter", &accessor.setter),
                    ("deleter", &accessor.deleter),
                ] {
                    if let Some(function) = function {
                        validate_function(function)
                            .map_err(|reason| invalid(format!("{}: {}", part, reason)))?;
                    }
                }
            }
            MemberBody::Attribute(_) => {}
        }
    }
    Ok(())
}
