//! Attachment entry point
//!
//! `attach(contract)` builds an [`Attachment`]; applying it to a candidate
//! returns the candidate's declaration untouched, or the aggregated failure.
//!
//! ```ignore
//! let duck = attach("Flyable").and("Quackable").to(&registry, "MallardDuck")?;
//! ```

use tracing::debug;

use crate::cache::VerificationCache;
use crate::config::VerifyOptions;
use crate::hierarchy::TypeRegistry;
use crate::model::TypeDecl;
use crate::Result;

/// Start an attachment for one contract
pub fn attach(contract: impl Into<String>) -> Attachment {
    Attachment {
        contracts: vec![contract.into()],
        options: VerifyOptions::default(),
    }
}

/// One or more contracts to check a candidate against
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    contracts: Vec<String>,
    options: VerifyOptions,
}

impl Attachment {
    /// Also require `contract`; each contract is checked independently
    pub fn and(mut self, contract: impl Into<String>) -> Self {
        self.contracts.push(contract.into());
        self
    }

    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn contracts(&self) -> &[String] {
        &self.contracts
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Check `candidate` against every attached contract, in order
    ///
    /// # Errors
    /// The first contract that fails: its configuration error, or
    /// `Unsatisfied` with that contract's full violation list.
    pub fn to<'r>(&self, registry: &'r TypeRegistry, candidate: &str) -> Result<&'r TypeDecl> {
        self.apply(registry, candidate, |contract| {
            crate::verifier::verify(registry, contract, candidate, &self.options)
        })
    }

    /// Like [`to`](Self::to), memoizing each pair in `cache`
    pub fn to_cached<'r>(
        &self,
        registry: &'r TypeRegistry,
        candidate: &str,
        cache: &VerificationCache,
    ) -> Result<&'r TypeDecl> {
        self.apply(registry, candidate, |contract| {
            cache.get_or_verify(registry, contract, candidate, &self.options)
        })
    }

    fn apply<'r, F>(&self, registry: &'r TypeRegistry, candidate: &str, mut check: F) -> Result<&'r TypeDecl>
    where
        F: FnMut(&str) -> Result<crate::verifier::VerificationResult>,
    {
        let decl = registry.get(candidate)?;
        for contract in &self.contracts {
            check(contract)?.into_result()?;
            debug!(contract = %contract, candidate, "attached");
        }
        Ok(decl)
    }
}
