//! Module checking - lower a parsed declaration file and run its attachments
//!
//! Declarations are registered in source order, so a base must appear
//! before anything deriving from it. `@implements(...)` attachments are
//! checked only after the whole file is declared; a contract may therefore
//! be written after the type that attaches it.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::VerificationCache;
use crate::config::VerifyOptions;
use crate::hierarchy::TypeRegistry;
use crate::parser;
use crate::verifier::VerificationResult;
use crate::Result;

/// One `@implements(Contract)` on a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentSite {
    pub candidate: String,
    pub contract: String,
}

/// A loaded declaration file
#[derive(Debug)]
pub struct Module {
    registry: TypeRegistry,
    attachments: Vec<AttachmentSite>,
}

impl Module {
    /// Parse `source` and declare every type it contains
    ///
    /// # Errors
    /// `ParseError` for syntax, or the first declaration error
    /// (`UnknownType`, `DuplicateType`, `InvalidSignature`, ...).
    pub fn load(source: &str) -> Result<Self> {
        let ast = parser::parse(source)?;
        let mut registry = TypeRegistry::new();
        let mut attachments = Vec::new();

        for decl in &ast.declarations {
            registry.declare(decl.to_type_decl())?;
            attachments.extend(decl.implements.iter().map(|contract| AttachmentSite {
                candidate: decl.name.value.clone(),
                contract: contract.value.clone(),
            }));
        }

        debug!(
            types = registry.len(),
            attachments = attachments.len(),
            "module loaded"
        );
        Ok(Module {
            registry,
            attachments,
        })
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn attachments(&self) -> &[AttachmentSite] {
        &self.attachments
    }

    /// Check every attachment; never stops at the first failure
    pub fn check(&self, options: &VerifyOptions, cache: &VerificationCache) -> ModuleReport {
        let outcomes = self
            .attachments
            .iter()
            .map(|site| {
                let outcome = match cache.get_or_verify(
                    &self.registry,
                    &site.contract,
                    &site.candidate,
                    options,
                ) {
                    Ok(result) if result.is_valid() => Outcome::Satisfied,
                    Ok(result) => Outcome::Unsatisfied(result),
                    Err(err) => Outcome::Misconfigured(err.to_string()),
                };
                AttachmentOutcome {
                    candidate: site.candidate.clone(),
                    contract: site.contract.clone(),
                    outcome,
                }
            })
            .collect();

        let report = ModuleReport {
            types: self.registry.len(),
            outcomes,
        };
        info!(
            attachments = report.outcomes.len(),
            failures = report.failures().count(),
            "module checked"
        );
        report
    }
}

/// Load `source` and check all of its attachments with a fresh cache
pub fn check_module(source: &str, options: &VerifyOptions) -> Result<ModuleReport> {
    let module = Module::load(source)?;
    Ok(module.check(options, &VerificationCache::new()))
}

// ── Report ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Satisfied,
    Unsatisfied(VerificationResult),
    /// The pair could not be checked: unknown names, a non-contract, or
    /// overlapping hierarchies
    Misconfigured(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentOutcome {
    pub candidate: String,
    pub contract: String,
    pub outcome: Outcome,
}

impl AttachmentOutcome {
    pub fn is_satisfied(&self) -> bool {
        self.outcome == Outcome::Satisfied
    }
}

impl fmt::Display for AttachmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.outcome {
            Outcome::Satisfied => write!(
                f,
                "Class '{}' implements contract '{}'",
                self.candidate, self.contract
            ),
            Outcome::Unsatisfied(result) => write!(f, "{}", result),
            Outcome::Misconfigured(message) => write!(f, "{}", message),
        }
    }
}

/// Outcome of every attachment in a module, in source order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleReport {
    /// Declared types, the `Contract` marker excluded
    pub types: usize,
    pub outcomes: Vec<AttachmentOutcome>,
}

impl ModuleReport {
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(AttachmentOutcome::is_satisfied)
    }

    pub fn failures(&self) -> impl Iterator<Item = &AttachmentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_satisfied())
    }

    /// Member-level violations across all unsatisfied attachments
    pub fn violation_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.outcome {
                Outcome::Unsatisfied(result) => result.count(),
                _ => 0,
            })
            .sum()
    }
}
