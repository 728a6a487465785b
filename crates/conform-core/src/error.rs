//! Error types for Conform
//!
//! All fallible operations return `Result<T, Error>`.
//! Member-level violations are never raised one at a time: a failed
//! verification carries every violation inside `Error::Unsatisfied`.

use thiserror::Error;

use crate::verifier::VerificationResult;

/// Conform error types
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Syntax or structure violation in a declaration file
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A referenced type was never declared
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// A type name was declared twice (or shadows a built-in)
    #[error("Type '{0}' is already declared")]
    DuplicateType(String),

    /// A member name appears twice in one declaration
    #[error("Member '{member}' is declared more than once in '{owner}'")]
    DuplicateMember { owner: String, member: String },

    /// Bases cannot be linearized into a single ancestor order
    #[error("Cannot create a consistent ancestor order for '{name}' (bases: {})", .bases.join(", "))]
    InconsistentHierarchy { name: String, bases: Vec<String> },

    /// Parameter list is malformed (ordering, duplicates, defaults)
    #[error("Invalid signature for '{owner}.{member}': {reason}")]
    InvalidSignature {
        owner: String,
        member: String,
        reason: String,
    },

    /// The type given as contract does not derive from `Contract`
    #[error("'{0}' is not a contract: it does not derive from Contract")]
    NotAContract(String),

    /// Contract and candidate share a non-root ancestor
    #[error(
        "Contract '{contract}' and class '{candidate}' share ancestor(s) {}; inherited members would satisfy the contract trivially",
        .shared.join(", ")
    )]
    Configuration {
        contract: String,
        candidate: String,
        shared: Vec<String>,
    },

    /// Candidate does not satisfy the contract
    #[error("{0}")]
    Unsatisfied(VerificationResult),
}

/// Result type alias for Conform operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_lists_shared_ancestors() {
        let err = Error::Configuration {
            contract: "Flyable".into(),
            candidate: "Duck".into(),
            shared: vec!["Bird".into(), "Animal".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Flyable'"));
        assert!(msg.contains("'Duck'"));
        assert!(msg.contains("Bird, Animal"));
    }

    #[test]
    fn test_inconsistent_hierarchy_message() {
        let err = Error::InconsistentHierarchy {
            name: "C".into(),
            bases: vec!["A".into(), "B".into()],
        };
        assert_eq!(
            err.to_string(),
            "Cannot create a consistent ancestor order for 'C' (bases: A, B)"
        );
    }
}
