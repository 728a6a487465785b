//! Conform Core - structural contract verification
//!
//! Checks that a type structurally satisfies a separately declared
//! contract: every contract member must be present on the candidate with
//! the same invocation kind and, for callables, the same parameter shape.
//!
//! # Architecture
//!
//! ```text
//! Declaration Text → Parser → AST → TypeRegistry (C3 ancestor chains)
//!                                        ↓
//!                                   Classifier → member kinds + signatures
//!                                        ↓
//!                                   Verifier → accumulated violations
//!                                        ↓
//!                            attach(..).to(..) / check_module → report
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: same declarations always produce identical reports
//! - **Pure**: the candidate is never mutated, wrapped, or copied
//! - **Complete**: every violation is collected before reporting

pub mod attach;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod module;
pub mod parser;
pub mod signature;
pub mod verifier;

pub use attach::{attach, Attachment};
pub use cache::VerificationCache;
pub use classify::{CallableKind, Capability, ClassifiedMember, MemberDescriptor};
pub use config::VerifyOptions;
pub use error::{Error, Result};
pub use hierarchy::TypeRegistry;
pub use model::{AccessorDecl, AttributeDecl, Binding, Flavor, FunctionDecl, MemberDecl, TypeDecl};
pub use module::{check_module, Module, ModuleReport, Outcome};
pub use signature::{ParamKind, ParameterSpec, Signature, TypeTag};
pub use verifier::{verify, VerificationResult, Violation, ViolationKind};
