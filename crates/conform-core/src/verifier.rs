//! Contract verifier - checks a candidate type against a contract
//!
//! The verifier walks every member the contract declares, directly or
//! through its ancestor contracts, and compares it with the candidate's
//! member of the same name. It accumulates all violations rather than
//! stopping at the first, so a caller sees every defect in one pass.
//!
//! # Verification Phases
//!
//! 1. **Preconditions** - both names resolve, the contract really is a
//!    contract, and the two types share no ancestor. Failures here are
//!    configuration errors and are returned immediately.
//! 2. **Member scan** - callables, accessors and attributes, in name order.
//! 3. **Aggregation** - an empty list means the candidate satisfies the
//!    contract.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::classify::{self, Capability, ClassifiedMember, MemberDescriptor};
use crate::config::VerifyOptions;
use crate::hierarchy::TypeRegistry;
use crate::signature::Signature;
use crate::{Error, Result};

// ── Verification Result Types ─────────────────────────────

/// Category of a member-level violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingMember,
    KindMismatch,
    SignatureMismatch,
    AccessorMismatch,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ViolationKind::MissingMember => write!(f, "missing"),
            ViolationKind::KindMismatch => write!(f, "kind"),
            ViolationKind::SignatureMismatch => write!(f, "signature"),
            ViolationKind::AccessorMismatch => write!(f, "accessor"),
        }
    }
}

/// One concrete mismatch between a contract member and the candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Member name
    pub member: String,
    /// Contract that declares the member
    pub contract: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Outcome of checking one candidate against one contract
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub contract: String,
    pub candidate: String,
    pub violations: Vec<Violation>,
}

impl VerificationResult {
    pub fn new(contract: &str, candidate: &str) -> Self {
        Self {
            contract: contract.to_string(),
            candidate: candidate.to_string(),
            violations: Vec::new(),
        }
    }

    /// Returns true if the candidate satisfies the contract
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self) -> usize {
        self.violations.len()
    }

    /// Violations of one category
    pub fn of_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.kind == kind).collect()
    }

    /// `Ok(())` when valid, otherwise the whole result as `Error::Unsatisfied`
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::Unsatisfied(self))
        }
    }

    fn add(&mut self, kind: ViolationKind, expected: &ClassifiedMember, message: String) {
        trace!(member = %expected.name, %kind, "violation");
        self.violations.push(Violation {
            kind,
            member: expected.name.clone(),
            contract: expected.owner.clone(),
            message,
        });
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_valid() {
            return write!(
                f,
                "Class '{}' implements contract '{}'",
                self.candidate, self.contract
            );
        }
        write!(
            f,
            "Class '{}' does not implement contract '{}': {} violation(s)",
            self.candidate,
            self.contract,
            self.count()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

// ── Public API ────────────────────────────────────────────

/// Verify that `candidate` structurally satisfies `contract`.
///
/// Runs the preconditions, then scans every contract member and returns the
/// accumulated violations. Does not stop at the first violation.
///
/// # Errors
/// `UnknownType`, `NotAContract` or `Configuration` when the pair cannot be
/// checked at all. Member violations are never errors here; see
/// [`VerificationResult::into_result`].
pub fn verify(
    registry: &TypeRegistry,
    contract: &str,
    candidate: &str,
    options: &VerifyOptions,
) -> Result<VerificationResult> {
    check_preconditions(registry, contract, candidate)?;

    let expected = classify::members(registry, contract)?;
    let provided = classify::members(registry, candidate)?;
    let mut result = VerificationResult::new(contract, candidate);

    for member in expected.values() {
        let found = provided.get(&member.name);
        match &member.descriptor {
            MemberDescriptor::Callable { .. } => {
                verify_callable(member, found, candidate, options, &mut result)
            }
            MemberDescriptor::Accessor { .. } => {
                verify_accessor(member, found, candidate, options, &mut result)
            }
            MemberDescriptor::Attribute { .. } => {
                verify_attribute(member, found, candidate, &mut result)
            }
        }
    }

    debug!(
        contract,
        candidate,
        members = expected.len(),
        violations = result.count(),
        "verified"
    );
    Ok(result)
}

// ── Phase 1: Preconditions ───────────────────────────────

fn check_preconditions(registry: &TypeRegistry, contract: &str, candidate: &str) -> Result<()> {
    registry.get(contract)?;
    registry.get(candidate)?;

    if !registry.is_contract(contract) {
        return Err(Error::NotAContract(contract.to_string()));
    }

    let shared = registry.shared_ancestors(contract, candidate)?;
    if !shared.is_empty() {
        return Err(Error::Configuration {
            contract: contract.to_string(),
            candidate: candidate.to_string(),
            shared,
        });
    }
    Ok(())
}

// ── Phase 2: Member Scan ─────────────────────────────────

/// Callables: presence, then kind, then signature
fn verify_callable(
    expected: &ClassifiedMember,
    found: Option<&ClassifiedMember>,
    candidate: &str,
    options: &VerifyOptions,
    result: &mut VerificationResult,
) {
    let MemberDescriptor::Callable { kind, signature } = &expected.descriptor else {
        return;
    };

    let Some(found) = found else {
        result.add(
            ViolationKind::MissingMember,
            expected,
            format!(
                "Class '{}' must implement {} '{}{}' defined in contract '{}'",
                candidate, kind, expected.name, signature, expected.owner
            ),
        );
        return;
    };

    match &found.descriptor {
        MemberDescriptor::Callable {
            kind: found_kind,
            signature: found_signature,
        } if found_kind == kind => {
            compare_signatures(expected, signature, found_signature, candidate, options, result);
        }
        other => {
            result.add(
                ViolationKind::KindMismatch,
                expected,
                format!(
                    "'{}.{}' must be a {} as defined in contract '{}', found {}",
                    candidate,
                    expected.name,
                    kind,
                    expected.owner,
                    other.describe()
                ),
            );
        }
    }
}

/// Accessors: each capability the contract defines must be present
///
/// The getter is compared like a callable. Setter and deleter only need to
/// be present with the same invocation kind.
fn verify_accessor(
    expected: &ClassifiedMember,
    found: Option<&ClassifiedMember>,
    candidate: &str,
    options: &VerifyOptions,
    result: &mut VerificationResult,
) {
    let Some(found) = found else {
        result.add(
            ViolationKind::MissingMember,
            expected,
            format!(
                "Class '{}' must implement accessor '{}' defined in contract '{}'",
                candidate, expected.name, expected.owner
            ),
        );
        return;
    };

    if !matches!(found.descriptor, MemberDescriptor::Accessor { .. }) {
        result.add(
            ViolationKind::AccessorMismatch,
            expected,
            format!(
                "'{}.{}' must be an accessor as defined in contract '{}', found {}",
                candidate,
                expected.name,
                expected.owner,
                found.descriptor.describe()
            ),
        );
        return;
    }

    for capability in Capability::ALL {
        let Some(want) = expected.descriptor.part(capability) else {
            continue;
        };
        let have = found.descriptor.part(capability);

        match (capability, have) {
            (Capability::Read, None) => result.add(
                ViolationKind::MissingMember,
                expected,
                format!(
                    "Class '{}' must implement a getter for accessor '{}' defined in contract '{}'",
                    candidate, expected.name, expected.owner
                ),
            ),
            (Capability::Read, Some(have)) if have.kind != want.kind => result.add(
                ViolationKind::KindMismatch,
                expected,
                format!(
                    "getter of '{}.{}' must be a {} as defined in contract '{}', found {}",
                    candidate, expected.name, want.kind, expected.owner, have.kind
                ),
            ),
            (Capability::Read, Some(have)) => compare_signatures(
                expected,
                &want.signature,
                &have.signature,
                candidate,
                options,
                result,
            ),
            (_, None) => result.add(
                ViolationKind::AccessorMismatch,
                expected,
                format!(
                    "Class '{}' must implement a {} for accessor '{}' defined in contract '{}'",
                    candidate, capability, expected.name, expected.owner
                ),
            ),
            (_, Some(have)) if have.kind != want.kind => result.add(
                ViolationKind::AccessorMismatch,
                expected,
                format!(
                    "{} of '{}.{}' must be a {} as defined in contract '{}', found {}",
                    capability, candidate, expected.name, want.kind, expected.owner, have.kind
                ),
            ),
            (_, Some(_)) => {}
        }
    }
}

/// Attributes: presence only
fn verify_attribute(
    expected: &ClassifiedMember,
    found: Option<&ClassifiedMember>,
    candidate: &str,
    result: &mut VerificationResult,
) {
    if found.is_none() {
        result.add(
            ViolationKind::MissingMember,
            expected,
            format!(
                "Class '{}' must define attribute '{}' defined in contract '{}'",
                candidate, expected.name, expected.owner
            ),
        );
    }
}

fn compare_signatures(
    expected: &ClassifiedMember,
    want: &Signature,
    have: &Signature,
    candidate: &str,
    options: &VerifyOptions,
    result: &mut VerificationResult,
) {
    let difference = if options.check_annotations {
        want.first_difference(have)
    } else {
        want.without_annotations()
            .first_difference(&have.without_annotations())
    };

    if let Some(difference) = difference {
        result.add(
            ViolationKind::SignatureMismatch,
            expected,
            format!(
                "'{}.{}' must have signature '{}{}' defined in contract '{}', found '{}{}' ({})",
                candidate,
                expected.name,
                expected.name,
                want,
                expected.owner,
                expected.name,
                have,
                difference
            ),
        );
    }
}

// ── Tests ─────────────────────────────────────────────────
